use super::locate::*;
use crate::prelude::*;
use prettytable::{row, Table};

pub struct List<'a, 'b> {
    env: &'a mut Environment<'b>,
}

impl<'a, 'b> List<'a, 'b> {
    pub fn new(env: &'a mut Environment<'b>) -> Self {
        Self { env }
    }

    pub fn run(self) -> Result<()> {
        if self.env.servers.is_empty() {
            bail!("Found no servers in the server list");
        }

        super::print_endpoint(self.env)?;

        let servers = self.env.servers;

        for entry in servers.iter() {
            writeln!(self.env.stdout, "{}", entry.to_string().bold())?;

            let located = locate(self.env.vsphere, entry)
                .with_context(|| format!("Couldn't process server: {}", entry))?;

            if located.is_empty() {
                writeln!(self.env.stdout, "  - {}", "[ NOT FOUND ]".yellow())?;
            }

            for located in located {
                writeln!(self.env.stdout, "  - found: {}", located)?;
                write!(self.env.stdout, "{}", snapshot_table(&located.vm))?;
            }

            writeln!(self.env.stdout)?;
        }

        Ok(())
    }
}

fn snapshot_table(vm: &VsVm) -> Table {
    let mut table = Table::new();

    table.set_titles(row!["Virtual machine", "Snapshot", "Created at", "Description"]);

    if vm.snapshots.is_empty() {
        table.add_row(row![vm.name, "NONE", "", ""]);
    }

    for (depth, snapshot) in vm.walk_snapshots() {
        table.add_row(row![
            vm.name,
            format!("{}{}", "  ".repeat(depth), snapshot.name),
            snapshot.created_at.format("%Y-%m-%d %H:%M:%S"),
            snapshot.description
        ]);
    }

    table
}
