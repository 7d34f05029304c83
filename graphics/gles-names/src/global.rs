//! Process-wide allocator of host object names

use std::collections::{HashMap, HashSet};

use log::trace;
use parking_lot::Mutex;

use crate::{GlobalName, ObjectKind};

/// Allocation state of one object kind
#[derive(Debug, Default)]
struct KindNames {
    /// Last name handed out; names are never minted twice
    last: GlobalName,
    /// Names handed out and not yet freed
    live: HashSet<GlobalName>,
    /// Outstanding pins per name
    pins: HashMap<GlobalName, usize>,
    /// Pinned names whose free was deferred until the last unpin
    doomed: HashSet<GlobalName>,
}

/// Mints host-visible names, one monotonic sequence per object kind.
///
/// Every share group of every display allocates from the same instance, so
/// two groups can never receive the same host name for the same kind.
#[derive(Debug, Default)]
pub struct GlobalNameSpace {
    kinds: Mutex<[KindNames; ObjectKind::COUNT]>,
}

impl GlobalNameSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new name for `kind`
    pub fn allocate(&self, kind: ObjectKind) -> GlobalName {
        let mut kinds = self.kinds.lock();
        let names = &mut kinds[kind.index()];
        names.last = names.last.wrapping_add(1);
        if names.last == 0 {
            // Zero is "no object" on the guest side
            names.last = 1;
        }
        let name = names.last;
        names.live.insert(name);
        trace!("global {} name {} allocated", kind, name);
        name
    }

    /// Release `name`. Unknown names are ignored. A pinned name stays live
    /// until its last pin is dropped.
    pub fn free(&self, kind: ObjectKind, name: GlobalName) {
        let mut kinds = self.kinds.lock();
        let names = &mut kinds[kind.index()];
        if !names.live.contains(&name) {
            return;
        }
        if names.pins.contains_key(&name) {
            names.doomed.insert(name);
            trace!("global {} name {} free deferred", kind, name);
        } else {
            names.live.remove(&name);
            trace!("global {} name {} freed", kind, name);
        }
    }

    /// Keep `name` allocated across `free` until a matching `unpin`.
    ///
    /// Returns false if the name is not live.
    pub fn pin(&self, kind: ObjectKind, name: GlobalName) -> bool {
        let mut kinds = self.kinds.lock();
        let names = &mut kinds[kind.index()];
        if !names.live.contains(&name) {
            return false;
        }
        *names.pins.entry(name).or_insert(0) += 1;
        true
    }

    /// Drop one pin of `name`, completing a deferred free on the last one
    pub fn unpin(&self, kind: ObjectKind, name: GlobalName) {
        let mut kinds = self.kinds.lock();
        let names = &mut kinds[kind.index()];
        let Some(count) = names.pins.get_mut(&name) else {
            return;
        };
        *count -= 1;
        if *count > 0 {
            return;
        }
        names.pins.remove(&name);
        if names.doomed.remove(&name) {
            names.live.remove(&name);
            trace!("global {} name {} freed after last pin", kind, name);
        }
    }

    /// Whether `name` is currently allocated
    pub fn is_live(&self, kind: ObjectKind, name: GlobalName) -> bool {
        self.kinds.lock()[kind.index()].live.contains(&name)
    }

    /// Number of allocated names of `kind`
    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.kinds.lock()[kind.index()].live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_start_above_zero() {
        let names = GlobalNameSpace::new();
        assert_eq!(names.allocate(ObjectKind::Texture), 1);
        assert_eq!(names.allocate(ObjectKind::Texture), 2);
    }

    #[test]
    fn test_kinds_are_independent() {
        let names = GlobalNameSpace::new();
        assert_eq!(names.allocate(ObjectKind::Texture), 1);
        assert_eq!(names.allocate(ObjectKind::VertexBuffer), 1);
        assert_eq!(names.live_count(ObjectKind::Texture), 1);
        assert_eq!(names.live_count(ObjectKind::Framebuffer), 0);
    }

    #[test]
    fn test_freed_names_are_not_reissued() {
        let names = GlobalNameSpace::new();
        let first = names.allocate(ObjectKind::Renderbuffer);
        names.free(ObjectKind::Renderbuffer, first);
        assert!(!names.is_live(ObjectKind::Renderbuffer, first));

        let second = names.allocate(ObjectKind::Renderbuffer);
        assert_ne!(first, second);
        assert!(names.is_live(ObjectKind::Renderbuffer, second));
    }

    #[test]
    fn test_pinned_name_outlives_free() {
        let names = GlobalNameSpace::new();
        let name = names.allocate(ObjectKind::Texture);
        assert!(names.pin(ObjectKind::Texture, name));
        assert!(names.pin(ObjectKind::Texture, name));

        names.free(ObjectKind::Texture, name);
        assert!(names.is_live(ObjectKind::Texture, name));
        names.unpin(ObjectKind::Texture, name);
        assert!(names.is_live(ObjectKind::Texture, name));
        names.unpin(ObjectKind::Texture, name);
        assert!(!names.is_live(ObjectKind::Texture, name));
    }

    #[test]
    fn test_unpin_without_free_keeps_name() {
        let names = GlobalNameSpace::new();
        let name = names.allocate(ObjectKind::Texture);
        assert!(!names.pin(ObjectKind::Texture, name + 1));
        assert!(names.pin(ObjectKind::Texture, name));
        names.unpin(ObjectKind::Texture, name);
        assert!(names.is_live(ObjectKind::Texture, name));

        names.free(ObjectKind::Texture, name);
        assert!(!names.is_live(ObjectKind::Texture, name));
    }

    #[test]
    fn test_free_unknown_is_noop() {
        let names = GlobalNameSpace::new();
        names.free(ObjectKind::Shader, 42);
        assert_eq!(names.live_count(ObjectKind::Shader), 0);
    }
}
