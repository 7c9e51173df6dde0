use crate::vsphere::{VsObjectRef, VsSnapshotName};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VsSnapshot {
    pub id: VsObjectRef,
    pub name: VsSnapshotName,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub children: Vec<VsSnapshot>,
}
