mod clients;
mod error;
mod models;

pub use self::{clients::*, error::*, models::*};

pub trait VsphereClient {
    fn about(&mut self) -> VsResult<VsAbout>;

    fn datacenters(&mut self) -> VsResult<Vec<VsDatacenter>>;

    fn clusters(&mut self, datacenter: &VsDatacenter) -> VsResult<Vec<VsCluster>>;

    fn hosts(&mut self, cluster: &VsCluster) -> VsResult<Vec<VsHost>>;

    /// Returns virtual machines registered on given host, together with their
    /// snapshot trees.
    fn vms(&mut self, host: &VsHost) -> VsResult<Vec<VsVm>>;

    /// Creates a snapshot and waits until the remote task completes.
    fn create_snapshot(&mut self, vm: &VsVm, snapshot: &VsNewSnapshot) -> VsResult<()>;

    /// Removes a snapshot and waits until the remote task completes; with
    /// `remove_children` the whole subtree goes away, otherwise children get
    /// re-attached to the removed snapshot's parent.
    fn delete_snapshot(
        &mut self,
        vm: &VsVm,
        snapshot: &VsSnapshot,
        remove_children: bool,
    ) -> VsResult<()>;
}
