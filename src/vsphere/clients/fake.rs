use crate::vsphere::*;
use chrono::Utc;
use itertools::Itertools;

#[cfg(test)]
use std::fmt;

#[cfg(test)]
use std::collections::HashSet;

/// In-memory vCenter inventory; used by tests and by `--dry-run`.
#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct VsFakeClient {
    about: VsAbout,
    entries: Vec<VsFakeEntry>,
    next_snapshot_id: usize,

    #[cfg(test)]
    errors: HashSet<VsFakeError<'static>>,
}

impl VsFakeClient {
    /// Copies the whole inventory reachable through `other` - datacenters,
    /// clusters, hosts, virtual machines and their snapshot trees.
    pub fn clone_from(other: &mut dyn VsphereClient) -> VsResult<Self> {
        let mut this = Self {
            about: other.about()?,
            ..Default::default()
        };

        for datacenter in other.datacenters()? {
            for cluster in other.clusters(&datacenter)? {
                for host in other.hosts(&cluster)? {
                    for vm in other.vms(&host)? {
                        this.entries.push(VsFakeEntry {
                            datacenter: datacenter.clone(),
                            cluster: cluster.clone(),
                            host: host.clone(),
                            vm,
                        });
                    }
                }
            }
        }

        this.bump_next_snapshot_id();

        Ok(this)
    }

    #[cfg(test)]
    pub fn add(&mut self, vm: VsFakeVm<'_>) {
        let vm_id = format!("vm-{}", self.entries.len() + 1);

        self.entries.push(VsFakeEntry {
            datacenter: VsDatacenter {
                id: VsObjectRef::new("Datacenter", vm.datacenter),
                name: VsDatacenterName::new(vm.datacenter),
            },
            cluster: VsCluster {
                id: VsObjectRef::new(
                    "ClusterComputeResource",
                    format!("{}/{}", vm.datacenter, vm.cluster),
                ),
                name: VsClusterName::new(vm.cluster),
            },
            host: VsHost {
                id: VsObjectRef::new(
                    "HostSystem",
                    format!("{}/{}/{}", vm.datacenter, vm.cluster, vm.host),
                ),
                name: VsHostName::new(vm.host),
            },
            vm: VsVm {
                id: VsObjectRef::new("VirtualMachine", vm_id),
                name: VsVmName::new(vm.name),
                snapshots: vm.snapshots,
            },
        });

        self.bump_next_snapshot_id();
    }

    #[cfg(test)]
    pub fn inject_error(&mut self, error: VsFakeError<'static>) {
        self.errors.insert(error);
    }

    /// Makes sure newly created snapshots don't reuse ids present in the
    /// inventory.
    fn bump_next_snapshot_id(&mut self) {
        let max_id = self
            .entries
            .iter()
            .flat_map(|entry| entry.vm.walk_snapshots())
            .filter_map(|(_, snapshot)| {
                snapshot
                    .id
                    .value
                    .strip_prefix("snapshot-")?
                    .parse::<usize>()
                    .ok()
            })
            .max();

        if let Some(max_id) = max_id {
            self.next_snapshot_id = self.next_snapshot_id.max(max_id + 1);
        }
    }

    fn get_mut(&mut self, vm: &VsVm) -> VsResult<&mut VsVm> {
        self.entries
            .iter_mut()
            .map(|entry| &mut entry.vm)
            .find(|vm_obj| vm_obj.id == vm.id)
            .ok_or_else(|| VsError::NoSuchVm {
                id: vm.id.clone(),
                vm: vm.name.clone(),
            })
    }
}

impl Default for VsFakeClient {
    fn default() -> Self {
        Self {
            about: VsAbout {
                full_name: "VMware vCenter Server 7.0.3 build-19234570".into(),
            },
            entries: Default::default(),
            next_snapshot_id: 1,

            #[cfg(test)]
            errors: Default::default(),
        }
    }
}

impl VsphereClient for VsFakeClient {
    fn about(&mut self) -> VsResult<VsAbout> {
        Ok(self.about.clone())
    }

    fn datacenters(&mut self) -> VsResult<Vec<VsDatacenter>> {
        let datacenters = self
            .entries
            .iter()
            .map(|entry| &entry.datacenter)
            .unique_by(|datacenter| datacenter.id.clone())
            .cloned()
            .collect();

        Ok(datacenters)
    }

    fn clusters(&mut self, datacenter: &VsDatacenter) -> VsResult<Vec<VsCluster>> {
        let clusters = self
            .entries
            .iter()
            .filter(|entry| entry.datacenter.id == datacenter.id)
            .map(|entry| &entry.cluster)
            .unique_by(|cluster| cluster.id.clone())
            .cloned()
            .collect();

        Ok(clusters)
    }

    fn hosts(&mut self, cluster: &VsCluster) -> VsResult<Vec<VsHost>> {
        let hosts = self
            .entries
            .iter()
            .filter(|entry| entry.cluster.id == cluster.id)
            .map(|entry| &entry.host)
            .unique_by(|host| host.id.clone())
            .cloned()
            .collect();

        Ok(hosts)
    }

    fn vms(&mut self, host: &VsHost) -> VsResult<Vec<VsVm>> {
        #[cfg(test)]
        if self.errors.contains(&VsFakeError::OnVms {
            host: host.name.as_str(),
        }) {
            return Err(VsError::InjectedError);
        }

        let vms = self
            .entries
            .iter()
            .filter(|entry| entry.host.id == host.id)
            .map(|entry| entry.vm.clone())
            .collect();

        Ok(vms)
    }

    fn create_snapshot(&mut self, vm: &VsVm, snapshot: &VsNewSnapshot) -> VsResult<()> {
        #[cfg(test)]
        if self.errors.contains(&VsFakeError::OnCreateSnapshot {
            vm: vm.name.as_str(),
            snapshot: snapshot.name.as_str(),
        }) {
            return Err(VsError::InjectedError);
        }

        let id = VsObjectRef::new(
            "VirtualMachineSnapshot",
            format!("snapshot-{}", self.next_snapshot_id),
        );

        let vm_obj = self.get_mut(vm)?;

        let snapshot_obj = VsSnapshot {
            id,
            name: snapshot.name.clone(),
            description: snapshot.description.clone(),
            created_at: Utc::now(),
            children: Default::default(),
        };

        // vCenter attaches new snapshots below the current one; the most
        // recent leaf is the closest thing we've got
        let mut parent = &mut vm_obj.snapshots;

        while !parent.is_empty() {
            let last = parent.len() - 1;
            parent = &mut parent[last].children;
        }

        parent.push(snapshot_obj);
        self.next_snapshot_id += 1;

        Ok(())
    }

    fn delete_snapshot(
        &mut self,
        vm: &VsVm,
        snapshot: &VsSnapshot,
        remove_children: bool,
    ) -> VsResult<()> {
        #[cfg(test)]
        if self.errors.contains(&VsFakeError::OnDeleteSnapshot {
            vm: vm.name.as_str(),
            snapshot: snapshot.name.as_str(),
        }) {
            return Err(VsError::InjectedError);
        }

        let vm_obj = self.get_mut(vm)?;

        if remove_snapshot(&mut vm_obj.snapshots, &snapshot.id, remove_children) {
            Ok(())
        } else {
            Err(VsError::NoSuchSnapshot {
                id: snapshot.id.clone(),
                vm: vm.name.clone(),
                snapshot: snapshot.name.clone(),
            })
        }
    }
}

fn remove_snapshot(
    snapshots: &mut Vec<VsSnapshot>,
    id: &VsObjectRef,
    remove_children: bool,
) -> bool {
    if let Some(idx) = snapshots.iter().position(|snapshot| &snapshot.id == id) {
        let snapshot = snapshots.remove(idx);

        if !remove_children {
            for (offset, child) in snapshot.children.into_iter().enumerate() {
                snapshots.insert(idx + offset, child);
            }
        }

        return true;
    }

    snapshots
        .iter_mut()
        .any(|snapshot| remove_snapshot(&mut snapshot.children, id, remove_children))
}

#[cfg(test)]
impl fmt::Display for VsFakeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }

            writeln!(
                f,
                "{}/{}/{}/{}",
                entry.datacenter.name, entry.cluster.name, entry.host.name, entry.vm.name
            )?;

            for (depth, snapshot) in entry.vm.walk_snapshots() {
                writeln!(f, "{}-> {}", "  ".repeat(depth), snapshot.name)?;
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct VsFakeEntry {
    datacenter: VsDatacenter,
    cluster: VsCluster,
    host: VsHost,
    vm: VsVm,
}

#[cfg(test)]
#[derive(Clone, Debug)]
pub struct VsFakeVm<'a> {
    pub datacenter: &'a str,
    pub cluster: &'a str,
    pub host: &'a str,
    pub name: &'a str,
    pub snapshots: Vec<VsSnapshot>,
}

#[cfg(test)]
impl Default for VsFakeVm<'static> {
    fn default() -> Self {
        Self {
            datacenter: "dc-1",
            cluster: "cluster-1",
            host: "esx-1",
            name: "",
            snapshots: Default::default(),
        }
    }
}

#[cfg(test)]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VsFakeError<'a> {
    OnCreateSnapshot { vm: &'a str, snapshot: &'a str },
    OnDeleteSnapshot { vm: &'a str, snapshot: &'a str },
    OnVms { host: &'a str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vsphere::utils::*;
    use pretty_assertions as pa;

    fn client() -> VsFakeClient {
        let mut client = VsFakeClient::default();

        client.add(VsFakeVm {
            name: "web",
            ..Default::default()
        });

        client.add(VsFakeVm {
            host: "esx-2",
            name: "db",
            snapshots: vec![snapshot("snapshot-a", "nightly", "2000-01-01 12:00:00")],
            ..Default::default()
        });

        client.add(VsFakeVm {
            cluster: "cluster-2",
            name: "web",
            ..Default::default()
        });

        client.add(VsFakeVm {
            datacenter: "dc-2",
            name: "mail",
            ..Default::default()
        });

        client
    }

    fn names<T>(items: Vec<T>, f: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|item| f(item).to_string()).collect()
    }

    fn find_vm(client: &mut VsFakeClient, cluster: &str, name: &str) -> VsVm {
        for datacenter in client.datacenters().unwrap() {
            for cluster_obj in client.clusters(&datacenter).unwrap() {
                if cluster_obj.name.as_str() != cluster {
                    continue;
                }

                for host in client.hosts(&cluster_obj).unwrap() {
                    for vm in client.vms(&host).unwrap() {
                        if vm.name.as_str() == name {
                            return vm;
                        }
                    }
                }
            }
        }

        panic!("No such vm: {}/{}", cluster, name);
    }

    fn new_snapshot(name: &str) -> VsNewSnapshot {
        VsNewSnapshot {
            name: snapshot_name(name),
            description: "test".into(),
            memory: false,
            quiesce: false,
        }
    }

    #[test]
    fn clone_from() {
        let mut client1 = client();
        let client2 = VsFakeClient::clone_from(&mut client1).unwrap();

        pa::assert_eq!(client1.to_string(), client2.to_string());
        pa::assert_eq!(client1.about, client2.about);
    }

    #[test]
    fn clone_from_doesnt_reuse_snapshot_ids() {
        let mut client1 = VsFakeClient::default();

        client1.add(VsFakeVm {
            name: "web",
            snapshots: vec![snapshot("snapshot-7", "nightly", "2000-01-01 12:00:00")],
            ..Default::default()
        });

        let mut client2 = VsFakeClient::clone_from(&mut client1).unwrap();
        let vm = find_vm(&mut client2, "cluster-1", "web");

        client2.create_snapshot(&vm, &new_snapshot("fresh")).unwrap();

        let vm = find_vm(&mut client2, "cluster-1", "web");

        pa::assert_eq!(
            VsObjectRef::new("VirtualMachineSnapshot", "snapshot-8"),
            vm.snapshots[0].children[0].id
        );
    }

    #[test]
    fn vms_given_injected_error() {
        let mut client = client();

        client.inject_error(VsFakeError::OnVms { host: "esx-2" });

        let datacenters = client.datacenters().unwrap();
        let clusters = client.clusters(&datacenters[0]).unwrap();
        let hosts = client.hosts(&clusters[0]).unwrap();

        assert!(client.vms(&hosts[0]).is_ok());
        pa::assert_eq!(VsError::InjectedError, client.vms(&hosts[1]).unwrap_err());
    }

    #[test]
    fn inventory() {
        let mut client = client();

        let datacenters = client.datacenters().unwrap();

        pa::assert_eq!(
            vec!["dc-1", "dc-2"],
            names(datacenters.clone(), |dc| dc.name.as_str())
        );

        let clusters = client.clusters(&datacenters[0]).unwrap();

        pa::assert_eq!(
            vec!["cluster-1", "cluster-2"],
            names(clusters.clone(), |cluster| cluster.name.as_str())
        );

        let hosts = client.hosts(&clusters[0]).unwrap();

        pa::assert_eq!(
            vec!["esx-1", "esx-2"],
            names(hosts.clone(), |host| host.name.as_str())
        );

        pa::assert_eq!(
            vec!["db"],
            names(client.vms(&hosts[1]).unwrap(), |vm| vm.name.as_str())
        );
    }

    mod create_snapshot {
        use super::*;
        use crate::assert_vsphere;

        #[test]
        fn ok() {
            let mut client = client();
            let vm = find_vm(&mut client, "cluster-2", "web");

            client.create_snapshot(&vm, &new_snapshot("first")).unwrap();

            let vm = find_vm(&mut client, "cluster-2", "web");

            client.create_snapshot(&vm, &new_snapshot("second")).unwrap();

            assert_vsphere!(
                r#"
                dc-1/cluster-1/esx-1/web

                dc-1/cluster-1/esx-2/db
                -> nightly

                dc-1/cluster-2/esx-1/web
                -> first
                  -> second

                dc-2/cluster-1/esx-1/mail
                "#,
                client
            );
        }

        #[test]
        fn given_unknown_vm() {
            let mut client = client();
            let mut vm = find_vm(&mut client, "cluster-1", "web");

            vm.id = VsObjectRef::new("VirtualMachine", "vm-999");

            let actual = client
                .create_snapshot(&vm, &new_snapshot("first"))
                .unwrap_err();

            let expected = VsError::NoSuchVm {
                id: VsObjectRef::new("VirtualMachine", "vm-999"),
                vm: vm_name("web"),
            };

            pa::assert_eq!(expected, actual);
        }
    }

    mod delete_snapshot {
        use super::*;
        use crate::assert_vsphere;

        fn client_with_tree() -> VsFakeClient {
            let mut a = snapshot("snapshot-a", "a", "2000-01-01 12:00:00");
            let mut b = snapshot("snapshot-b", "b", "2000-01-01 13:00:00");
            let c = snapshot("snapshot-c", "c", "2000-01-01 14:00:00");
            let d = snapshot("snapshot-d", "d", "2000-01-01 15:00:00");

            b.children = vec![c];
            a.children = vec![b, d];

            let mut client = VsFakeClient::default();

            client.add(VsFakeVm {
                name: "web",
                snapshots: vec![a],
                ..Default::default()
            });

            client
        }

        #[test]
        fn with_children() {
            let mut client = client_with_tree();
            let vm = find_vm(&mut client, "cluster-1", "web");
            let b = vm.find_snapshots(named("b"), true)[0].clone();

            client.delete_snapshot(&vm, &b, true).unwrap();

            assert_vsphere!(
                r#"
                dc-1/cluster-1/esx-1/web
                -> a
                  -> d
                "#,
                client
            );
        }

        #[test]
        fn without_children() {
            let mut client = client_with_tree();
            let vm = find_vm(&mut client, "cluster-1", "web");
            let b = vm.find_snapshots(named("b"), true)[0].clone();

            client.delete_snapshot(&vm, &b, false).unwrap();

            assert_vsphere!(
                r#"
                dc-1/cluster-1/esx-1/web
                -> a
                  -> c
                  -> d
                "#,
                client
            );
        }

        #[test]
        fn given_unknown_snapshot() {
            let mut client = client_with_tree();
            let vm = find_vm(&mut client, "cluster-1", "web");
            let snapshot = snapshot("snapshot-z", "z", "2000-01-01 12:00:00");

            let actual = client.delete_snapshot(&vm, &snapshot, true).unwrap_err();

            let expected = VsError::NoSuchSnapshot {
                id: VsObjectRef::new("VirtualMachineSnapshot", "snapshot-z"),
                vm: vm_name("web"),
                snapshot: snapshot_name("z"),
            };

            pa::assert_eq!(expected, actual);
        }
    }
}
