use super::locate::*;
use crate::prelude::*;

pub struct Create<'a, 'b> {
    env: &'a mut Environment<'b>,
    summary: Summary,
}

impl<'a, 'b> Create<'a, 'b> {
    pub fn new(env: &'a mut Environment<'b>) -> Self {
        Self {
            env,
            summary: Summary::default().with_created_snapshots(),
        }
    }

    pub fn run(mut self) -> Result<()> {
        if self.env.servers.is_empty() {
            bail!("Found no servers in the server list");
        }

        super::print_endpoint(self.env)?;

        let servers = self.env.servers;

        for entry in servers.iter() {
            self.process_entry(entry)
                .with_context(|| format!("Couldn't process server: {}", entry))?;
        }

        write!(self.env.stdout, "{}", self.summary)?;

        if self.summary.has_errors() {
            bail!("Failed to create some of the snapshots");
        }

        self.summary.as_result()
    }

    fn process_entry(&mut self, entry: &ServerEntry) -> Result<()> {
        writeln!(self.env.stdout, "{}", entry.to_string().bold())?;

        match locate(self.env.vsphere, entry) {
            Ok(located) => {
                if located.is_empty() {
                    self.summary.add_missing_vm();

                    writeln!(self.env.stdout, "  - {}", "[ NOT FOUND ]".yellow())?;
                }

                for located in located {
                    self.process_vm(entry, &located)?;
                }
            }

            Err(err) => {
                self.summary.add_error();

                writeln!(self.env.stdout, "  - {}", "[ FAILED ]".red())?;
                super::print_error(self.env.stdout, &err)?;
            }
        }

        writeln!(self.env.stdout)?;

        Ok(())
    }

    fn process_vm(&mut self, entry: &ServerEntry, located: &LocatedVm) -> Result<()> {
        writeln!(self.env.stdout, "  - found: {}", located)?;

        match self.try_process_vm(entry, located) {
            Ok(_) => {
                self.summary.add_created_snapshot();

                writeln!(self.env.stdout, " {}", "[ OK ]".green())?;

                // Snapshot exists at this point; listing it is best-effort
                match located.refresh(self.env.vsphere) {
                    Ok(vm) => self.print_snapshots(&vm)?,

                    Err(err) => writeln!(
                        self.env.stdout,
                        "  - {} Couldn't list snapshots: {:#}",
                        "warn:".yellow(),
                        err
                    )?,
                }
            }

            Err(err) => {
                self.summary.add_error();

                writeln!(self.env.stdout, " {}", "[ FAILED ]".red())?;
                super::print_error(self.env.stdout, &err)?;
            }
        }

        Ok(())
    }

    fn try_process_vm(&mut self, entry: &ServerEntry, located: &LocatedVm) -> Result<()> {
        self.summary.add_processed_vm();

        let snapshot = self
            .env
            .config
            .new_snapshot(&self.env.snapshot_vars(entry));

        write!(
            self.env.stdout,
            "  - creating snapshot: {}",
            snapshot.name.as_str().italic()
        )?;

        self.env
            .vsphere
            .create_snapshot(&located.vm, &snapshot)
            .context("Couldn't create snapshot")?;

        Ok(())
    }

    fn print_snapshots(&mut self, vm: &VsVm) -> Result<()> {
        writeln!(self.env.stdout, "  - snapshots:")?;

        for (depth, snapshot) in vm.walk_snapshots() {
            writeln!(
                self.env.stdout,
                "    {}- {}",
                "  ".repeat(depth),
                snapshot.name
            )?;
        }

        Ok(())
    }
}
