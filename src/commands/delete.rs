use super::locate::*;
use crate::prelude::*;

pub struct Delete<'a, 'b> {
    env: &'a mut Environment<'b>,
    summary: Summary,
}

impl<'a, 'b> Delete<'a, 'b> {
    pub fn new(env: &'a mut Environment<'b>) -> Self {
        Self {
            env,
            summary: Summary::default().with_deleted_snapshots(),
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
            bail!("Failed to delete some of the snapshots");
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

        if let Err(err) = self.try_process_vm(entry, located) {
            self.summary.add_error();

            writeln!(self.env.stdout, " {}", "[ FAILED ]".red())?;
            super::print_error(self.env.stdout, &err)?;
        }

        Ok(())
    }

    fn try_process_vm(&mut self, entry: &ServerEntry, located: &LocatedVm) -> Result<()> {
        self.summary.add_processed_vm();

        let remove_children = self.env.config.remove_children;
        let pattern = self
            .env
            .config
            .snapshot_pattern(&self.env.snapshot_vars(entry));

        // When children go away together with their parent, there's no point
        // in looking for matches below an already matching snapshot
        let snapshots = located
            .vm
            .find_snapshots(|name| pattern.matches(name), !remove_children);

        if snapshots.is_empty() {
            writeln!(
                self.env.stdout,
                "  - no matching snapshots: {}",
                pattern.to_string().italic()
            )?;

            return Ok(());
        }

        for snapshot in snapshots {
            write!(
                self.env.stdout,
                "  - deleting snapshot: {}",
                snapshot.name.as_str().italic()
            )?;

            self.env
                .vsphere
                .delete_snapshot(&located.vm, snapshot, remove_children)
                .context("Couldn't delete snapshot")?;

            self.summary.add_deleted_snapshot();

            writeln!(self.env.stdout, " {}", "[ OK ]".green())?;
        }

        Ok(())
    }
}
