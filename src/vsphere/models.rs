mod about;
mod cluster;
mod cluster_name;
mod connection;
mod datacenter;
mod datacenter_name;
mod host;
mod host_name;
mod new_snapshot;
mod object_ref;
mod snapshot;
mod snapshot_name;
mod vm;
mod vm_name;

pub use self::{
    about::*, cluster::*, cluster_name::*, connection::*, datacenter::*, datacenter_name::*, host::*,
    host_name::*, new_snapshot::*, object_ref::*, snapshot::*, snapshot_name::*, vm::*,
    vm_name::*,
};
