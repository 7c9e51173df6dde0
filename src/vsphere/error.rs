use crate::vsphere::{VsObjectRef, VsSnapshotName, VsVmName};
use std::result;
use thiserror::Error;

pub type VsResult<T> = result::Result<T, VsError>;

#[derive(Debug, Error)]
pub enum VsError {
    #[error("No such virtual machine: {vm} ({id})")]
    NoSuchVm { id: VsObjectRef, vm: VsVmName },

    #[error("No such snapshot: {snapshot} ({id}, on virtual machine `{vm}`)")]
    NoSuchSnapshot {
        id: VsObjectRef,
        vm: VsVmName,
        snapshot: VsSnapshotName,
    },

    #[cfg(test)]
    #[error("InjectedError")]
    InjectedError,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
impl PartialEq<VsError> for VsError {
    fn eq(&self, other: &VsError) -> bool {
        self.to_string() == other.to_string()
    }
}
