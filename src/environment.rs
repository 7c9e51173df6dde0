use crate::prelude::*;

pub struct Environment<'a> {
    pub time: fn() -> DateTime<Utc>,
    pub stdout: &'a mut dyn Write,
    pub config: &'a Config,
    pub servers: &'a ServerList,
    pub vsphere: &'a mut dyn VsphereClient,

    /// Name of the user we're connected as; ends up in snapshot descriptions
    pub user: &'a str,
}

impl<'a> Environment<'a> {
    #[cfg(test)]
    pub fn test(
        stdout: &'a mut dyn Write,
        config: &'a Config,
        servers: &'a ServerList,
        vsphere: &'a mut dyn VsphereClient,
    ) -> Self {
        use chrono::TimeZone;

        colored::control::set_override(true);

        Self {
            time: || Utc.timestamp_opt(0, 0).unwrap(),
            stdout,
            config,
            servers,
            vsphere,
            user: "jdoe",
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        (self.time)()
    }

    pub fn snapshot_vars<'b>(&self, entry: &'b ServerEntry) -> SnapshotVars<'b>
    where
        'a: 'b,
    {
        SnapshotVars {
            vm: &entry.vm,
            cluster: &entry.cluster,
            user: self.user,
            now: self.time(),
        }
    }
}
