use anyhow::{bail, Result};
use colored::Colorize;
use std::fmt;

#[derive(Default)]
pub struct Summary {
    processed_vms: usize,
    created_snapshots: Option<usize>,
    deleted_snapshots: Option<usize>,
    missing_vms: usize,
    errors: usize,
}

impl Summary {
    pub fn with_created_snapshots(mut self) -> Self {
        self.created_snapshots = Some(0);
        self
    }

    pub fn with_deleted_snapshots(mut self) -> Self {
        self.deleted_snapshots = Some(0);
        self
    }

    pub fn add_processed_vm(&mut self) {
        self.processed_vms += 1;
    }

    pub fn add_created_snapshot(&mut self) {
        if let Some(n) = &mut self.created_snapshots {
            *n += 1;
        }
    }

    pub fn add_deleted_snapshot(&mut self) {
        if let Some(n) = &mut self.deleted_snapshots {
            *n += 1;
        }
    }

    pub fn add_missing_vm(&mut self) {
        self.missing_vms += 1;
    }

    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn as_result(&self) -> Result<()> {
        if self.missing_vms > 0 {
            bail!("Couldn't find some of the virtual machines");
        }

        Ok(())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Summary".bold())?;
        writeln!(f, "-------")?;
        writeln!(f, "  processed virtual machines: {}", self.processed_vms)?;

        if let Some(n) = self.created_snapshots {
            writeln!(f, "  created snapshots: {}", n)?;
        }

        if let Some(n) = self.deleted_snapshots {
            writeln!(f, "  deleted snapshots: {}", n)?;
        }

        if self.missing_vms > 0 {
            writeln!(f, "  missing virtual machines: {}", self.missing_vms)?;
        }

        Ok(())
    }
}
