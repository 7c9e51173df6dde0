use crate::vsphere::{VsClusterName, VsObjectRef};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VsCluster {
    pub id: VsObjectRef,
    pub name: VsClusterName,
}
