use crate::vsphere::{VsDatacenterName, VsObjectRef};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VsDatacenter {
    pub id: VsObjectRef,
    pub name: VsDatacenterName,
}
