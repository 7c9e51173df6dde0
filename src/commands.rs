mod create;
mod delete;
mod list;
mod locate;
mod validate;

pub use self::{create::*, delete::*, list::*, validate::*};
use crate::prelude::*;

/// Prints which vCenter we're talking to; doubles as a connectivity check.
fn print_endpoint(env: &mut Environment<'_>) -> Result<()> {
    let about = env.vsphere.about().context("Couldn't connect to vCenter")?;

    writeln!(env.stdout, "Connected to: {}", about.full_name.bold())?;
    writeln!(env.stdout)?;

    Ok(())
}

/// Prints error's whole cause chain, indented below the item that failed.
fn print_error(stdout: &mut dyn Write, err: &Error) -> Result<()> {
    writeln!(stdout)?;

    for line in format!("{:?}", err).lines() {
        writeln!(stdout, "  {}", line)?;
    }

    Ok(())
}
