use crate::vsphere::VsSnapshotName;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VsNewSnapshot {
    pub name: VsSnapshotName,
    pub description: String,

    /// Whether to include the VM's memory in the snapshot
    pub memory: bool,

    /// Whether to quiesce the guest's file system before taking the snapshot
    pub quiesce: bool,
}
