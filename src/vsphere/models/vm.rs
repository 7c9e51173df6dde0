use crate::vsphere::{VsObjectRef, VsSnapshot, VsSnapshotName, VsVmName};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VsVm {
    pub id: VsObjectRef,
    pub name: VsVmName,

    /// Root snapshots; each one carries its own subtree
    pub snapshots: Vec<VsSnapshot>,
}

impl VsVm {
    /// Returns all snapshots of this VM in depth-first pre-order, paired with
    /// their depth in the tree (roots are at depth 0).
    pub fn walk_snapshots(&self) -> Vec<(usize, &VsSnapshot)> {
        fn walk<'a>(
            snapshots: &'a [VsSnapshot],
            depth: usize,
            out: &mut Vec<(usize, &'a VsSnapshot)>,
        ) {
            for snapshot in snapshots {
                out.push((depth, snapshot));
                walk(&snapshot.children, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.snapshots, 0, &mut out);
        out
    }

    /// Returns snapshots whose names satisfy `matches`.
    ///
    /// When `descend_into_matches` is `false`, children of a matching snapshot
    /// are not inspected - that's what you want when the matching snapshots
    /// are about to be removed together with their subtrees.
    pub fn find_snapshots(
        &self,
        matches: impl Fn(&VsSnapshotName) -> bool,
        descend_into_matches: bool,
    ) -> Vec<&VsSnapshot> {
        fn find<'a>(
            snapshots: &'a [VsSnapshot],
            matches: &dyn Fn(&VsSnapshotName) -> bool,
            descend_into_matches: bool,
            out: &mut Vec<&'a VsSnapshot>,
        ) {
            for snapshot in snapshots {
                if matches(&snapshot.name) {
                    out.push(snapshot);

                    if !descend_into_matches {
                        continue;
                    }
                }

                find(&snapshot.children, matches, descend_into_matches, out);
            }
        }

        let mut out = Vec::new();
        find(&self.snapshots, &matches, descend_into_matches, &mut out);
        out
    }
}
