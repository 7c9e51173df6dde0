use crate::prelude::*;
use std::fmt;

/// A virtual machine together with the place it's been found at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatedVm {
    pub datacenter: VsDatacenter,
    pub cluster: VsCluster,
    pub host: VsHost,
    pub vm: VsVm,
}

impl LocatedVm {
    /// Fetches this VM again, so that its snapshot tree reflects changes made
    /// in the meantime.
    pub fn refresh(&self, vsphere: &mut dyn VsphereClient) -> Result<VsVm> {
        vsphere
            .vms(&self.host)
            .context("Couldn't list virtual machines")?
            .into_iter()
            .find(|vm| vm.id == self.vm.id)
            .ok_or_else(|| anyhow!("Virtual machine disappeared: {}", self))
    }
}

impl fmt::Display for LocatedVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.datacenter.name, self.cluster.name, self.host.name, self.vm.name
        )
    }
}

/// Walks datacenter → cluster → host → VM and returns every VM matching
/// given entry.
pub fn locate(vsphere: &mut dyn VsphereClient, entry: &ServerEntry) -> Result<Vec<LocatedVm>> {
    let mut located = Vec::new();

    let datacenters = vsphere
        .datacenters()
        .context("Couldn't list datacenters")?;

    for datacenter in datacenters {
        let clusters = vsphere
            .clusters(&datacenter)
            .with_context(|| format!("Couldn't list clusters of: {}", datacenter.name))?;

        for cluster in clusters {
            if cluster.name != entry.cluster {
                continue;
            }

            let hosts = vsphere
                .hosts(&cluster)
                .with_context(|| format!("Couldn't list hosts of: {}", cluster.name))?;

            for host in hosts {
                let vms = vsphere
                    .vms(&host)
                    .with_context(|| format!("Couldn't list virtual machines of: {}", host.name))?;

                for vm in vms {
                    if vm.name == entry.vm {
                        located.push(LocatedVm {
                            datacenter: datacenter.clone(),
                            cluster: cluster.clone(),
                            host: host.clone(),
                            vm,
                        });
                    }
                }
            }
        }
    }

    Ok(located)
}
