use crate::vsphere::*;
use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use pathsearch::find_executable_in_path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Talks to vCenter through the `govc` executable.
///
/// govc waits for the tasks it starts (e.g. `snapshot.create`) to complete
/// before exiting, so every mutating call here blocks until vCenter is done.
pub struct VsProcessClient {
    govc: PathBuf,
    connection: VsConnection,
}

impl VsProcessClient {
    pub fn new(govc: impl AsRef<Path>, connection: VsConnection) -> VsResult<Self> {
        let govc = govc.as_ref();

        if !govc.exists() {
            return Err(VsError::Other(anyhow!(
                "Couldn't find the `govc` executable: {}",
                govc.display()
            )));
        }

        Ok(Self {
            govc: govc.into(),
            connection,
        })
    }

    pub fn find(connection: VsConnection) -> VsResult<Self> {
        let govc = find_executable_in_path("govc")
            .ok_or_else(|| anyhow!("Couldn't find the `govc` executable in your `PATH` - please try specifying exact location with `--govc-path`"))?;

        Self::new(govc, connection)
    }

    fn execute(&mut self, callback: impl FnOnce(&mut Command)) -> VsResult<String> {
        let mut command = Command::new(&self.govc);

        command
            .env("GOVC_URL", self.connection.url())
            .env("GOVC_USERNAME", &self.connection.user)
            .env("GOVC_PASSWORD", &self.connection.password)
            .env(
                "GOVC_INSECURE",
                if self.connection.insecure { "1" } else { "0" },
            );

        callback(&mut command);

        let output = command
            .output()
            .context("Couldn't launch the `govc` executable")?;

        if output.status.success() {
            let stdout =
                String::from_utf8(output.stdout).context("Couldn't read govc's stdout")?;

            Ok(stdout)
        } else {
            let stderr = String::from_utf8(output.stderr)
                .context("Couldn't read govc's stderr")?
                .trim()
                .to_string();

            Err(VsError::Other(anyhow!(
                "govc returned a non-zero status code and said: {}",
                stderr,
            )))
        }
    }

    /// Lists objects of given type (`d`, `c`, `h`, `m` - as in `govc find`)
    /// through a container view rooted at `root`.
    fn collect(
        &mut self,
        root: &str,
        kind: &str,
        properties: &[&str],
    ) -> VsResult<Vec<ObjectContent>> {
        let out = self.execute(|command| {
            command
                .arg("object.collect")
                .arg("-json")
                .arg(format!("-type={}", kind))
                .arg(root)
                .args(properties);
        })?;

        parse_collect(&out)
    }

    fn collect_named(
        &mut self,
        root: &str,
        kind: &str,
    ) -> VsResult<Vec<(VsObjectRef, String)>> {
        self.collect(root, kind, &["name"])?
            .into_iter()
            .map(|object| -> VsResult<_> {
                let name = object.property("name")?;
                Ok((object.obj, name))
            })
            .collect()
    }
}

impl VsphereClient for VsProcessClient {
    fn about(&mut self) -> VsResult<VsAbout> {
        let out = self.execute(|command| {
            command.arg("about").arg("-json");
        })?;

        let about: AboutOutput = parse(&out)?;

        Ok(about.about)
    }

    fn datacenters(&mut self) -> VsResult<Vec<VsDatacenter>> {
        let datacenters = self
            .collect_named("/", "d")?
            .into_iter()
            .map(|(id, name)| VsDatacenter {
                id,
                name: VsDatacenterName::new(name),
            })
            .collect();

        Ok(datacenters)
    }

    fn clusters(&mut self, datacenter: &VsDatacenter) -> VsResult<Vec<VsCluster>> {
        let clusters = self
            .collect_named(&datacenter.id.to_string(), "c")?
            .into_iter()
            .map(|(id, name)| VsCluster {
                id,
                name: VsClusterName::new(name),
            })
            .collect();

        Ok(clusters)
    }

    fn hosts(&mut self, cluster: &VsCluster) -> VsResult<Vec<VsHost>> {
        let hosts = self
            .collect_named(&cluster.id.to_string(), "h")?
            .into_iter()
            .map(|(id, name)| VsHost {
                id,
                name: VsHostName::new(name),
            })
            .collect();

        Ok(hosts)
    }

    fn vms(&mut self, host: &VsHost) -> VsResult<Vec<VsVm>> {
        self.collect(&host.id.to_string(), "m", &["name", "snapshot"])?
            .into_iter()
            .map(ObjectContent::into_vm)
            .collect()
    }

    fn create_snapshot(&mut self, vm: &VsVm, snapshot: &VsNewSnapshot) -> VsResult<()> {
        self.execute(|command| {
            command.args(snapshot_create_args(vm, snapshot));
        })?;

        Ok(())
    }

    fn delete_snapshot(
        &mut self,
        vm: &VsVm,
        snapshot: &VsSnapshot,
        remove_children: bool,
    ) -> VsResult<()> {
        self.execute(|command| {
            command.args(snapshot_remove_args(vm, snapshot, remove_children));
        })?;

        Ok(())
    }
}

fn snapshot_create_args(vm: &VsVm, snapshot: &VsNewSnapshot) -> Vec<String> {
    vec![
        "snapshot.create".into(),
        format!("-vm={}", vm.id),
        format!("-d={}", snapshot.description),
        format!("-m={}", snapshot.memory),
        format!("-q={}", snapshot.quiesce),
        // Rendered names may start with a dash
        "--".into(),
        snapshot.name.to_string(),
    ]
}

fn snapshot_remove_args(vm: &VsVm, snapshot: &VsSnapshot, remove_children: bool) -> Vec<String> {
    // Names don't have to be unique within a VM, so the snapshot is
    // addressed through its moid
    vec![
        "snapshot.remove".into(),
        format!("-vm={}", vm.id),
        format!("-r={}", remove_children),
        "--".into(),
        snapshot.id.value.clone(),
    ]
}

fn parse<T>(out: &str) -> VsResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(out)
        .context("Couldn't parse govc's stdout")
        .map_err(VsError::Other)
}

fn parse_collect(out: &str) -> VsResult<Vec<ObjectContent>> {
    // Older govc releases print a bare array, newer ones wrap it
    let out: CollectOutput = parse(out)?;

    Ok(match out {
        CollectOutput::List(objects) => objects,
        CollectOutput::Wrapped { objects } => objects,
    })
}

fn null_to_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::deserialize(d)?;
    let val = opt.unwrap_or_else(T::default);
    Ok(val)
}

#[derive(Debug, Deserialize)]
struct AboutOutput {
    #[serde(rename = "About", alias = "about")]
    about: VsAbout,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CollectOutput {
    List(Vec<ObjectContent>),

    Wrapped {
        #[serde(alias = "Objects", default, deserialize_with = "null_to_default")]
        objects: Vec<ObjectContent>,
    },
}

#[derive(Debug, Deserialize)]
struct ObjectContent {
    #[serde(rename = "Obj", alias = "obj")]
    obj: VsObjectRef,

    #[serde(
        rename = "PropSet",
        alias = "propSet",
        default,
        deserialize_with = "null_to_default"
    )]
    prop_set: Vec<DynamicProperty>,
}

impl ObjectContent {
    fn value(&self, name: &str) -> Option<&serde_json::Value> {
        self.prop_set
            .iter()
            .find(|prop| prop.name == name)
            .map(|prop| &prop.val)
            .filter(|val| !val.is_null())
    }

    fn property<T>(&self, name: &str) -> VsResult<T>
    where
        T: DeserializeOwned,
    {
        let val = self
            .value(name)
            .ok_or_else(|| anyhow!("Object `{}` has no property `{}`", self.obj, name))?;

        serde_json::from_value(val.clone())
            .with_context(|| format!("Couldn't parse property `{}` of `{}`", name, self.obj))
            .map_err(VsError::Other)
    }

    fn into_vm(self) -> VsResult<VsVm> {
        let name: String = self.property("name")?;

        // VMs without snapshots don't have this property set at all
        let snapshots = if self.value("snapshot").is_some() {
            let info: SnapshotInfo = self.property("snapshot")?;

            info.root_snapshot_list
                .into_iter()
                .map(SnapshotTree::into_snapshot)
                .collect()
        } else {
            Default::default()
        };

        Ok(VsVm {
            id: self.obj,
            name: VsVmName::new(name),
            snapshots,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DynamicProperty {
    #[serde(rename = "Name", alias = "name")]
    name: String,

    #[serde(rename = "Val", alias = "val", default)]
    val: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SnapshotInfo {
    #[serde(
        rename = "RootSnapshotList",
        alias = "rootSnapshotList",
        default,
        deserialize_with = "null_to_default"
    )]
    root_snapshot_list: Vec<SnapshotTree>,
}

#[derive(Debug, Deserialize)]
struct SnapshotTree {
    #[serde(rename = "Snapshot", alias = "snapshot")]
    snapshot: VsObjectRef,

    #[serde(rename = "Name", alias = "name")]
    name: String,

    #[serde(
        rename = "Description",
        alias = "description",
        default,
        deserialize_with = "null_to_default"
    )]
    description: String,

    #[serde(rename = "CreateTime", alias = "createTime")]
    create_time: DateTime<Utc>,

    #[serde(
        rename = "ChildSnapshotList",
        alias = "childSnapshotList",
        default,
        deserialize_with = "null_to_default"
    )]
    child_snapshot_list: Vec<SnapshotTree>,
}

impl SnapshotTree {
    fn into_snapshot(self) -> VsSnapshot {
        VsSnapshot {
            id: self.snapshot,
            name: VsSnapshotName::new(self.name),
            description: self.description,
            created_at: self.create_time,
            children: self
                .child_snapshot_list
                .into_iter()
                .map(Self::into_snapshot)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vsphere::utils::*;
    use indoc::indoc;
    use pretty_assertions as pa;

    #[test]
    fn about() {
        let out = indoc!(
            r#"
            {
              "About": {
                "Name": "VMware vCenter Server",
                "FullName": "VMware vCenter Server 7.0.3 build-19234570",
                "Version": "7.0.3"
              }
            }
            "#
        );

        let actual: AboutOutput = parse(out).unwrap();

        pa::assert_eq!(
            "VMware vCenter Server 7.0.3 build-19234570",
            actual.about.full_name
        );
    }

    #[test]
    fn collect_named() {
        let out = indoc!(
            r#"
            [
              {
                "Obj": { "Type": "ClusterComputeResource", "Value": "domain-c7" },
                "PropSet": [{ "Name": "name", "Val": "cluster-1" }]
              },
              {
                "Obj": { "Type": "ClusterComputeResource", "Value": "domain-c9" },
                "PropSet": [{ "Name": "name", "Val": "cluster-2" }]
              }
            ]
            "#
        );

        let actual: Vec<_> = parse_collect(out)
            .unwrap()
            .into_iter()
            .map(|object| {
                let name: String = object.property("name").unwrap();
                (object.obj.to_string(), name)
            })
            .collect();

        pa::assert_eq!(
            vec![
                ("ClusterComputeResource:domain-c7".to_string(), "cluster-1".to_string()),
                ("ClusterComputeResource:domain-c9".to_string(), "cluster-2".to_string()),
            ],
            actual
        );
    }

    #[test]
    fn collect_given_camel_case_output() {
        let out = indoc!(
            r#"
            {
              "objects": [
                {
                  "obj": { "type": "HostSystem", "value": "host-12" },
                  "propSet": [{ "name": "name", "val": "esx-1.local" }]
                }
              ]
            }
            "#
        );

        let actual = parse_collect(out).unwrap();

        pa::assert_eq!(1, actual.len());
        pa::assert_eq!(VsObjectRef::new("HostSystem", "host-12"), actual[0].obj);

        let name: String = actual[0].property("name").unwrap();

        pa::assert_eq!("esx-1.local", name);
    }

    #[test]
    fn into_vm() {
        let out = indoc!(
            r#"
            [
              {
                "Obj": { "Type": "VirtualMachine", "Value": "vm-42" },
                "PropSet": [
                  { "Name": "name", "Val": "web" },
                  {
                    "Name": "snapshot",
                    "Val": {
                      "CurrentSnapshot": { "Type": "VirtualMachineSnapshot", "Value": "snapshot-2" },
                      "RootSnapshotList": [
                        {
                          "Snapshot": { "Type": "VirtualMachineSnapshot", "Value": "snapshot-1" },
                          "Vm": { "Type": "VirtualMachine", "Value": "vm-42" },
                          "Name": "web-Before-patching",
                          "Description": "first",
                          "Id": 1,
                          "CreateTime": "2000-01-01T12:00:00.123456Z",
                          "State": "poweredOn",
                          "Quiesced": false,
                          "ChildSnapshotList": [
                            {
                              "Snapshot": { "Type": "VirtualMachineSnapshot", "Value": "snapshot-2" },
                              "Name": "nested",
                              "Description": "",
                              "CreateTime": "2000-01-01T13:00:00Z",
                              "ChildSnapshotList": null
                            }
                          ]
                        }
                      ]
                    }
                  }
                ]
              }
            ]
            "#
        );

        let actual = parse_collect(out)
            .unwrap()
            .into_iter()
            .map(ObjectContent::into_vm)
            .collect::<VsResult<Vec<_>>>()
            .unwrap();

        pa::assert_eq!(1, actual.len());

        let vm = &actual[0];

        pa::assert_eq!(VsObjectRef::new("VirtualMachine", "vm-42"), vm.id);
        pa::assert_eq!(vm_name("web"), vm.name);

        let snapshots: Vec<_> = vm
            .walk_snapshots()
            .into_iter()
            .map(|(depth, snapshot)| {
                (
                    depth,
                    snapshot.id.value.as_str(),
                    snapshot.name.as_str(),
                    snapshot.description.as_str(),
                )
            })
            .collect();

        pa::assert_eq!(
            vec![
                (0, "snapshot-1", "web-Before-patching", "first"),
                (1, "snapshot-2", "nested", ""),
            ],
            snapshots
        );

        pa::assert_eq!(datetime("2000-01-01 13:00:00"), vm.snapshots[0].children[0].created_at);
    }

    #[test]
    fn into_vm_given_no_snapshots() {
        let out = indoc!(
            r#"
            [
              {
                "Obj": { "Type": "VirtualMachine", "Value": "vm-43" },
                "PropSet": [{ "Name": "name", "Val": "db" }]
              }
            ]
            "#
        );

        let actual = parse_collect(out)
            .unwrap()
            .into_iter()
            .map(ObjectContent::into_vm)
            .collect::<VsResult<Vec<_>>>()
            .unwrap();

        pa::assert_eq!(vm_name("db"), actual[0].name);
        assert!(actual[0].snapshots.is_empty());
    }

    #[test]
    fn property_given_missing_property() {
        let out = r#"[{ "Obj": { "Type": "HostSystem", "Value": "host-12" }, "PropSet": [] }]"#;

        let actual = parse_collect(out).unwrap()[0]
            .property::<String>("name")
            .unwrap_err();

        pa::assert_eq!(
            "Object `HostSystem:host-12` has no property `name`",
            actual.to_string()
        );
    }

    fn vm() -> VsVm {
        VsVm {
            id: VsObjectRef::new("VirtualMachine", "vm-42"),
            name: vm_name("web"),
            snapshots: Default::default(),
        }
    }

    #[test]
    fn snapshot_create_args() {
        let snapshot = VsNewSnapshot {
            name: snapshot_name("-web-Before-patching"),
            description: "taken by jdoe".into(),
            memory: true,
            quiesce: false,
        };

        pa::assert_eq!(
            vec![
                "snapshot.create",
                "-vm=VirtualMachine:vm-42",
                "-d=taken by jdoe",
                "-m=true",
                "-q=false",
                "--",
                "-web-Before-patching",
            ],
            super::snapshot_create_args(&vm(), &snapshot)
        );
    }

    #[test]
    fn snapshot_remove_args() {
        let snapshot = snapshot("snapshot-12", "web-Before-patching", "2000-01-01 12:00:00");

        pa::assert_eq!(
            vec![
                "snapshot.remove",
                "-vm=VirtualMachine:vm-42",
                "-r=true",
                "--",
                "snapshot-12",
            ],
            super::snapshot_remove_args(&vm(), &snapshot, true)
        );
    }

    #[test]
    fn new_given_missing_executable() {
        let connection = VsConnection {
            host: "vcenter.local".into(),
            port: 443,
            user: "root".into(),
            password: "root".into(),
            insecure: true,
        };

        let actual = VsProcessClient::new("/tmp/ayy-ayy", connection)
            .err()
            .unwrap()
            .to_string();

        pa::assert_eq!("Couldn't find the `govc` executable: /tmp/ayy-ayy", actual);
    }
}
