mod commands;
mod config;
mod environment;
mod servers;
mod utils;
mod vsphere;

#[cfg(test)]
mod testing;

mod prelude {
    pub use crate::{config::*, environment::*, servers::*, utils::*, vsphere::*};
    pub use anyhow::{anyhow, bail, Context, Error, Result};
    pub use chrono::{DateTime, Utc};
    pub use colored::Colorize;
    pub use itertools::Itertools;
    pub use std::io::Write;

    #[cfg(test)]
    pub use indoc::indoc;

    #[cfg(test)]
    pub use pretty_assertions as pa;
}

use self::commands::*;
use self::prelude::*;
use clap::{Parser, Subcommand};
use std::io;
use std::ops::DerefMut;
use std::path::PathBuf;

/// Snapshots of vSphere virtual machines, taken before patching and removed
/// afterwards
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// vCenter's hostname or IP address
    #[arg(long = "vs_host", alias = "vs-host")]
    vs_host: String,

    /// User to connect as; ends up in snapshot descriptions, too
    #[arg(long = "vs_user", alias = "vs-user")]
    vs_user: String,

    /// Password of the user given in `--vs_user`
    #[arg(long = "vs_password", alias = "vs-password")]
    vs_password: String,

    /// vCenter's port
    #[arg(long, default_value_t = 443)]
    port: u16,

    /// Verifies vCenter's TLS certificate; by default the certificate is not
    /// checked
    #[arg(long)]
    secure: bool,

    /// Path to the CSV file listing virtual machines to operate on, one
    /// `VM name,cluster name` pair per line
    #[arg(short, long, default_value = "servers.ini")]
    servers: PathBuf,

    /// Path to the configuration file; when missing, the defaults are used
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// By default, vsphere-snapper tries to locate the `govc` executable
    /// inside your PATH variable - when this fails for you, using this
    /// parameter you can provide location of the `govc` executable by hand
    #[arg(long)]
    govc_path: Option<PathBuf>,

    /// Runs application in a simulated safe-mode without applying any changes
    /// to the virtual machines
    #[arg(short, long)]
    dry_run: bool,

    #[command(subcommand)]
    cmd: Command,
}

impl Args {
    fn connection(&self) -> VsConnection {
        VsConnection {
            host: self.vs_host.clone(),
            port: self.port,
            user: self.vs_user.clone(),
            password: self.vs_password.clone(),
            insecure: !self.secure,
        }
    }
}

#[derive(Clone, Copy, Debug, Subcommand)]
enum Command {
    /// Creates a snapshot for each virtual machine from the server list
    Create,

    /// Deletes the snapshot created by `create` for each virtual machine from
    /// the server list
    Delete,

    /// Shows snapshots of each virtual machine from the server list
    List,

    /// Checks configuration, server list and connection to vCenter
    Validate,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let stdout = &mut io::stdout();

    if let Command::Validate = args.cmd {
        return commands::validate(stdout, &args);
    }

    let config = load_config(&args)?;
    let servers = ServerList::load(&args.servers)?;
    let mut vsphere = init_vsphere(stdout, &args)?;

    let mut env = Environment {
        time: Utc::now,
        stdout,
        config: &config,
        servers: &servers,
        vsphere: vsphere.deref_mut(),
        user: &args.vs_user,
    };

    match args.cmd {
        Command::Create => Create::new(&mut env).run(),
        Command::Delete => Delete::new(&mut env).run(),
        Command::List => List::new(&mut env).run(),
        Command::Validate => unreachable!(),
    }
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn init_vsphere(stdout: &mut dyn Write, args: &Args) -> Result<Box<dyn VsphereClient>> {
    let connection = args.connection();

    let mut vsphere = if let Some(govc_path) = &args.govc_path {
        VsProcessClient::new(govc_path, connection)
    } else {
        VsProcessClient::find(connection)
    }
    .context("Couldn't initialize govc client")?;

    if !args.dry_run {
        return Ok(Box::new(vsphere));
    }

    writeln!(
        stdout,
        "{} --dry-run is active, no changes will be applied",
        "Note:".green(),
    )?;

    writeln!(stdout)?;

    let vsphere =
        VsFakeClient::clone_from(&mut vsphere).context("Couldn't copy vCenter's inventory")?;

    Ok(Box::new(vsphere))
}
