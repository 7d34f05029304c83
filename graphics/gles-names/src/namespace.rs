//! Local to global name mapping for one object kind of one share group

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::{trace, warn};

use crate::{GlobalName, GlobalNameSpace, LocalName, NameRequest, ObjectKind};

/// Bidirectional map between guest names and host names.
///
/// A `NameSpace` is not synchronized on its own; the owning [`ShareGroup`]
/// serializes every access.
///
/// Global names minted here are *owned* by the name space and returned to the
/// [`GlobalNameSpace`] once no local name refers to them any more. Global names
/// bound through [`NameSpace::replace_global`] that were minted elsewhere are
/// never freed here.
///
/// [`ShareGroup`]: crate::ShareGroup
#[derive(Debug)]
pub struct NameSpace {
    kind: ObjectKind,
    globals: Arc<GlobalNameSpace>,
    /// Last local name minted for a [`NameRequest::Fresh`] request
    next_local: LocalName,
    local_to_global: BTreeMap<LocalName, GlobalName>,
    global_to_local: BTreeMap<GlobalName, BTreeSet<LocalName>>,
    owned: BTreeSet<GlobalName>,
}

impl NameSpace {
    pub fn new(kind: ObjectKind, globals: Arc<GlobalNameSpace>) -> Self {
        Self {
            kind,
            globals,
            next_local: 0,
            local_to_global: BTreeMap::new(),
            global_to_local: BTreeMap::new(),
            owned: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Number of local names currently mapped
    pub fn len(&self) -> usize {
        self.local_to_global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local_to_global.is_empty()
    }

    /// Map a local name to a freshly allocated global name.
    ///
    /// With [`NameRequest::Fresh`] the next unused non-zero local name is
    /// picked. With [`NameRequest::Exact`] the given name is used; if it is
    /// already mapped, its previous global name is released and replaced.
    /// `Exact(0)` is refused and returns 0.
    pub fn generate(&mut self, request: NameRequest) -> LocalName {
        let local = match request {
            NameRequest::Fresh => self.fresh_local(),
            NameRequest::Exact(0) => {
                warn!("{} name space: refusing to map local name 0", self.kind);
                return 0;
            }
            NameRequest::Exact(local) => local,
        };

        if let Some(previous) = self.unbind(local) {
            self.release(previous);
        }

        let global = self.globals.allocate(self.kind);
        self.owned.insert(global);
        self.bind(local, global);
        trace!("{} {} -> global {}", self.kind, local, global);
        local
    }

    /// Allocate a global name that no local name refers to
    pub fn generate_global_only(&mut self) -> GlobalName {
        let global = self.globals.allocate(self.kind);
        self.owned.insert(global);
        global
    }

    pub fn global_name_of(&self, local: LocalName) -> Option<GlobalName> {
        self.local_to_global.get(&local).copied()
    }

    /// Reverse lookup. When several local names share `global`, the smallest
    /// one is returned.
    pub fn local_name_of(&self, global: GlobalName) -> Option<LocalName> {
        self.global_to_local
            .get(&global)
            .and_then(|locals| locals.iter().next().copied())
    }

    pub fn exists(&self, local: LocalName) -> bool {
        self.local_to_global.contains_key(&local)
    }

    /// Remove the mapping of `local`. Returns whether it existed.
    pub fn delete(&mut self, local: LocalName) -> bool {
        match self.unbind(local) {
            Some(global) => {
                self.release(global);
                trace!("{} {} deleted", self.kind, local);
                true
            }
            None => false,
        }
    }

    /// Point an existing local name at `global`.
    ///
    /// Returns the global name it referred to before, or `None` if `local` is
    /// not mapped (nothing changes then). The previous global name stays
    /// allocated so the caller can restore it later; hand it to
    /// [`NameSpace::release`] when it is no longer wanted.
    pub fn replace_global(&mut self, local: LocalName, global: GlobalName) -> Option<GlobalName> {
        let previous = self.unbind(local)?;
        self.bind(local, global);
        trace!("{} {} rebound {} -> {}", self.kind, local, previous, global);
        Some(previous)
    }

    /// Free `global` if this name space minted it and no local name refers
    /// to it any more.
    pub fn release(&mut self, global: GlobalName) {
        if self.global_to_local.contains_key(&global) {
            return;
        }
        if self.owned.remove(&global) {
            self.globals.free(self.kind, global);
        }
    }

    /// Drop every mapping and free every owned global name
    pub fn clear(&mut self) {
        self.local_to_global.clear();
        self.global_to_local.clear();
        for global in core::mem::take(&mut self.owned) {
            self.globals.free(self.kind, global);
        }
    }

    /// Mapped local names in ascending order
    pub fn locals(&self) -> impl Iterator<Item = LocalName> + '_ {
        self.local_to_global.keys().copied()
    }

    fn fresh_local(&mut self) -> LocalName {
        loop {
            self.next_local = self.next_local.wrapping_add(1);
            if self.next_local != 0 && !self.local_to_global.contains_key(&self.next_local) {
                return self.next_local;
            }
        }
    }

    fn bind(&mut self, local: LocalName, global: GlobalName) {
        self.local_to_global.insert(local, global);
        self.global_to_local.entry(global).or_default().insert(local);
    }

    fn unbind(&mut self, local: LocalName) -> Option<GlobalName> {
        let global = self.local_to_global.remove(&local)?;
        if let Some(locals) = self.global_to_local.get_mut(&global) {
            locals.remove(&local);
            if locals.is_empty() {
                self.global_to_local.remove(&global);
            }
        }
        Some(global)
    }
}

impl Drop for NameSpace {
    fn drop(&mut self) {
        self.clear();
    }
}
