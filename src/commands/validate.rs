use super::locate::*;
use crate::prelude::*;
use crate::Args;
use std::ops::DerefMut;

pub fn validate(stdout: &mut dyn Write, args: &Args) -> Result<()> {
    let config = load_config(stdout, args)?;

    writeln!(stdout)?;
    let servers = load_servers(stdout, args)?;

    writeln!(stdout)?;
    let mut vsphere = init_vsphere(stdout, args)?;

    writeln!(stdout)?;
    validate_servers(stdout, &config, &servers, vsphere.deref_mut(), &args.vs_user)?;

    writeln!(stdout)?;
    writeln!(stdout, "✓ Everything seems to be fine")?;

    Ok(())
}

fn load_config(stdout: &mut dyn Write, args: &Args) -> Result<Config> {
    let config = if let Some(path) = &args.config {
        writeln!(stdout, "Loading configuration file: {}", path.display())?;

        Config::load(path)?
    } else {
        writeln!(stdout, "Using default configuration")?;

        Config::default()
    };

    writeln!(stdout, ".. [ OK ]")?;

    Ok(config)
}

fn load_servers(stdout: &mut dyn Write, args: &Args) -> Result<ServerList> {
    writeln!(stdout, "Loading server list: {}", args.servers.display())?;

    let servers = ServerList::load(&args.servers)?;

    if servers.is_empty() {
        writeln!(stdout, "{} Server list is empty", "warn:".yellow())?;
    }

    writeln!(stdout, ".. [ OK ]")?;

    Ok(servers)
}

fn init_vsphere(stdout: &mut dyn Write, args: &Args) -> Result<Box<dyn VsphereClient>> {
    writeln!(stdout, "Connecting to vCenter: {}", args.connection().url())?;

    let mut vsphere = crate::init_vsphere(stdout, args)?;

    let about = vsphere.about().context("Couldn't connect to vCenter")?;

    writeln!(stdout, ".. [ OK ] {}", about.full_name)?;

    Ok(vsphere)
}

fn validate_servers(
    stdout: &mut dyn Write,
    config: &Config,
    servers: &ServerList,
    vsphere: &mut dyn VsphereClient,
    user: &str,
) -> Result<()> {
    writeln!(stdout, "Validating server list")?;

    let now = Utc::now();

    for entry in servers.iter() {
        let located = locate(vsphere, entry)
            .with_context(|| format!("Couldn't process server: {}", entry))?;

        if located.is_empty() {
            writeln!(
                stdout,
                "{} Couldn't find virtual machine: {}",
                "warn:".yellow(),
                entry
            )?;

            continue;
        }

        if located.len() > 1 {
            writeln!(
                stdout,
                "{} Virtual machine {} matches {} machines, all of them will be affected",
                "warn:".yellow(),
                entry,
                located.len()
            )?;
        }

        let snapshot_name = config.snapshot_name(&SnapshotVars {
            vm: &entry.vm,
            cluster: &entry.cluster,
            user,
            now,
        });

        if snapshot_name.as_str().trim().is_empty() {
            writeln!(
                stdout,
                "{} Snapshot name for {} renders empty",
                "warn:".yellow(),
                entry
            )?;
        }
    }

    writeln!(stdout, ".. [ OK ]")?;

    Ok(())
}
