//! Registry from group keys to share groups

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::{GlobalNameSpace, ShareGroup};

/// Opaque key a share group is reachable through. The translator uses the
/// native context handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(pub u64);

impl core::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Maps group keys to share groups.
///
/// A share group lives as long as at least one key maps to it. Removing the
/// last key clears the group, so holders of a stale `Arc` see an empty group.
pub struct ObjectNameManager {
    globals: Arc<GlobalNameSpace>,
    groups: Mutex<BTreeMap<GroupKey, Arc<ShareGroup>>>,
}

impl ObjectNameManager {
    pub fn new(globals: Arc<GlobalNameSpace>) -> Self {
        Self {
            globals,
            groups: Mutex::new(BTreeMap::new()),
        }
    }

    /// Create a share group reachable through `key`. If `key` already maps to
    /// a group, that group is returned instead.
    pub fn create_group(&self, key: GroupKey) -> Arc<ShareGroup> {
        let mut groups = self.groups.lock();
        if let Some(group) = groups.get(&key) {
            return group.clone();
        }
        let group = Arc::new(ShareGroup::new(self.globals.clone()));
        groups.insert(key, group.clone());
        debug!("share group created for key {}", key);
        group
    }

    /// Make the group behind `existing` reachable through `new_key` too.
    /// Returns `None` if `existing` maps to nothing.
    pub fn attach(&self, new_key: GroupKey, existing: GroupKey) -> Option<Arc<ShareGroup>> {
        let mut groups = self.groups.lock();
        let group = groups.get(&existing)?.clone();
        let replaced = groups.insert(new_key, group.clone());
        drop(groups);

        debug!("key {} attached to share group of {}", new_key, existing);
        if let Some(replaced) = replaced {
            self.release_if_orphaned(replaced);
        }
        Some(group)
    }

    pub fn lookup(&self, key: GroupKey) -> Option<Arc<ShareGroup>> {
        self.groups.lock().get(&key).cloned()
    }

    /// Remove `key`. When it was the last key of its group the group is
    /// cleared.
    pub fn detach(&self, key: GroupKey) {
        let removed = self.groups.lock().remove(&key);
        if let Some(group) = removed {
            debug!("key {} detached", key);
            self.release_if_orphaned(group);
        }
    }

    /// Any key currently registered, the smallest one
    pub fn get_global_context_key(&self) -> Option<GroupKey> {
        self.groups.lock().keys().next().copied()
    }

    /// Number of registered keys
    pub fn key_count(&self) -> usize {
        self.groups.lock().len()
    }

    /// Number of distinct share groups
    pub fn group_count(&self) -> usize {
        let groups = self.groups.lock();
        let mut seen: Vec<*const ShareGroup> = groups.values().map(Arc::as_ptr).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    fn release_if_orphaned(&self, group: Arc<ShareGroup>) {
        let still_reachable = self
            .groups
            .lock()
            .values()
            .any(|other| Arc::ptr_eq(other, &group));
        if !still_reachable {
            group.clear();
            debug!("share group destroyed");
        }
    }
}
