mod snapshot_name_pattern;

pub use self::snapshot_name_pattern::*;
use crate::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path};

const DATE_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default = "default_snapshot_name")]
    pub snapshot_name: String,

    #[serde(default = "default_snapshot_description")]
    pub snapshot_description: String,

    #[serde(default)]
    pub memory: bool,

    #[serde(default)]
    pub quiesce: bool,

    #[serde(default = "default_remove_children")]
    pub remove_children: bool,
}

impl Config {
    #[cfg(test)]
    pub fn parse(code: &str) -> Self {
        serde_yaml::from_str(code).unwrap()
    }

    pub fn load(file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref();

        let result: Result<_> = (|| {
            let code = fs::read_to_string(file).context("Couldn't read file")?;
            serde_yaml::from_str(&code).context("Couldn't parse file")
        })();

        result.with_context(|| format!("Couldn't load configuration from: {}", file.display()))
    }

    pub fn snapshot_name(&self, vars: &SnapshotVars<'_>) -> VsSnapshotName {
        VsSnapshotName::new(render(&self.snapshot_name, &vars.to_list()))
    }

    /// Returns a pattern matching names rendered from `snapshot-name` at any
    /// point in time, so that `delete` finds snapshots created earlier.
    pub fn snapshot_pattern(&self, vars: &SnapshotVars<'_>) -> SnapshotNamePattern {
        let variables: Vec<_> = vars
            .to_list()
            .into_iter()
            .filter(|(var_name, _)| *var_name != "date")
            .collect();

        SnapshotNamePattern::new(
            self.snapshot_name
                .split("{{date}}")
                .map(|segment| render(segment, &variables))
                .collect(),
        )
    }

    pub fn new_snapshot(&self, vars: &SnapshotVars<'_>) -> VsNewSnapshot {
        let name = self.snapshot_name(vars);

        let mut variables = vars.to_list();
        variables.push(("snapshotName", name.to_string()));

        VsNewSnapshot {
            description: render(&self.snapshot_description, &variables),
            name,
            memory: self.memory,
            quiesce: self.quiesce,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_name: default_snapshot_name(),
            snapshot_description: default_snapshot_description(),
            memory: false,
            quiesce: false,
            remove_children: default_remove_children(),
        }
    }
}

/// Values available inside the `snapshot-name` and `snapshot-description`
/// templates.
pub struct SnapshotVars<'a> {
    pub vm: &'a VsVmName,
    pub cluster: &'a VsClusterName,
    pub user: &'a str,
    pub now: DateTime<Utc>,
}

impl SnapshotVars<'_> {
    fn to_list(&self) -> Vec<(&'static str, String)> {
        vec![
            ("vmName", self.vm.to_string()),
            ("clusterName", self.cluster.to_string()),
            ("user", self.user.to_string()),
            ("date", self.now.format(DATE_FORMAT).to_string()),
        ]
    }
}

fn render(template: &str, variables: &[(&str, String)]) -> String {
    variables
        .iter()
        .fold(template.to_string(), |template, (var_name, var_value)| {
            template.replace(&format!("{{{{{}}}}}", var_name), var_value)
        })
}

fn default_snapshot_name() -> String {
    "{{vmName}}-Before-patching".into()
}

fn default_snapshot_description() -> String {
    "This {{snapshotName}} is taken by {{user}}, Before removing this snapshot contact with {{user}}"
        .into()
}

fn default_remove_children() -> bool {
    true
}
