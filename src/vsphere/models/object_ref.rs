use serde::Deserialize;
use std::fmt;

/// Managed object reference, e.g. `VirtualMachine:vm-42`; govc accepts this
/// notation wherever it expects an inventory path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct VsObjectRef {
    #[serde(rename = "Type", alias = "type")]
    pub kind: String,

    #[serde(rename = "Value", alias = "value")]
    pub value: String,
}

impl VsObjectRef {
    pub fn new(kind: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        Self {
            kind: kind.as_ref().into(),
            value: value.as_ref().into(),
        }
    }
}

impl fmt::Display for VsObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}
