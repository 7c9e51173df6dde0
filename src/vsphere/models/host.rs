use crate::vsphere::{VsHostName, VsObjectRef};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VsHost {
    pub id: VsObjectRef,
    pub name: VsHostName,
}
