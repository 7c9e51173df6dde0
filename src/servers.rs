use crate::prelude::*;
use serde::Deserialize;
use std::{fmt, fs, path::Path};

/// Virtual machines to operate on, as listed in `servers.ini`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerList {
    entries: Vec<ServerEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServerEntry {
    pub vm: VsVmName,
    pub cluster: VsClusterName,
}

impl ServerList {
    pub fn load(file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref();

        let result: Result<_> = (|| {
            let code = fs::read_to_string(file).context("Couldn't read file")?;
            Self::parse(&code).context("Couldn't parse file")
        })();

        result.with_context(|| format!("Couldn't load server list from: {}", file.display()))
    }

    pub fn parse(code: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(code.as_bytes());

        let mut entries = Vec::new();

        for record in reader.records() {
            let record = record?;

            // Skips whitespace-only lines
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            let line = record
                .position()
                .map(|pos| pos.line())
                .unwrap_or_default();

            let entry = Self::parse_record(&record)
                .with_context(|| format!("Invalid entry at line {}", line))?;

            entries.push(entry);
        }

        Ok(Self { entries })
    }

    fn parse_record(record: &csv::StringRecord) -> Result<ServerEntry> {
        if record.len() != 2 {
            bail!(
                "Expected two fields (VM name, cluster name), found {}",
                record.len()
            );
        }

        if record.iter().any(|field| field.is_empty()) {
            bail!("VM name and cluster name must not be empty");
        }

        Ok(record.deserialize(None)?)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServerEntry> {
        self.entries.iter()
    }
}

impl fmt::Display for ServerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster, self.vm)
    }
}
