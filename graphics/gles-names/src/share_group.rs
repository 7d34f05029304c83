//! Objects visible to a set of sharing contexts

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::{
    GlobalName, GlobalNameSpace, LocalName, NameRequest, NameSpace, ObjectDataPtr, ObjectKind,
};

struct Inner {
    namespaces: [NameSpace; ObjectKind::COUNT],
    data: BTreeMap<(ObjectKind, LocalName), ObjectDataPtr>,
}

impl Inner {
    fn namespace(&mut self, kind: ObjectKind) -> &mut NameSpace {
        &mut self.namespaces[kind.index()]
    }
}

/// One name space per object kind plus side records, behind a single lock.
///
/// Every context created to share state with another holds the same
/// `ShareGroup`, so a name generated through one context resolves through
/// all of them.
pub struct ShareGroup {
    inner: Mutex<Inner>,
}

impl ShareGroup {
    pub fn new(globals: Arc<GlobalNameSpace>) -> Self {
        let namespaces = ObjectKind::ALL.map(|kind| NameSpace::new(kind, globals.clone()));
        Self {
            inner: Mutex::new(Inner {
                namespaces,
                data: BTreeMap::new(),
            }),
        }
    }

    /// Map a local name to a fresh global name, see [`NameSpace::generate`]
    pub fn generate(&self, kind: ObjectKind, request: NameRequest) -> LocalName {
        self.inner.lock().namespace(kind).generate(request)
    }

    pub fn generate_global_only(&self, kind: ObjectKind) -> GlobalName {
        self.inner.lock().namespace(kind).generate_global_only()
    }

    pub fn global_name_of(&self, kind: ObjectKind, local: LocalName) -> Option<GlobalName> {
        self.inner.lock().namespace(kind).global_name_of(local)
    }

    pub fn local_name_of(&self, kind: ObjectKind, global: GlobalName) -> Option<LocalName> {
        self.inner.lock().namespace(kind).local_name_of(global)
    }

    pub fn exists(&self, kind: ObjectKind, local: LocalName) -> bool {
        self.inner.lock().namespace(kind).exists(local)
    }

    /// Remove `local` and its side record. A texture that was an image
    /// sibling also gives back the global name it had before.
    pub fn delete(&self, kind: ObjectKind, local: LocalName) -> bool {
        let mut inner = self.inner.lock();
        let data = inner.data.remove(&(kind, local));
        let saved = data
            .as_deref()
            .and_then(|data| data.as_texture())
            .and_then(|tex| tex.saved_global);

        let namespace = inner.namespace(kind);
        let existed = namespace.delete(local);
        if let Some(saved) = saved {
            namespace.release(saved);
        }
        existed
    }

    /// Rebind `local` to `global`, returning the previous global name
    pub fn replace_global(
        &self,
        kind: ObjectKind,
        local: LocalName,
        global: GlobalName,
    ) -> Option<GlobalName> {
        self.inner.lock().namespace(kind).replace_global(local, global)
    }

    /// Give back a global name obtained from [`ShareGroup::replace_global`]
    /// or [`ShareGroup::generate_global_only`]
    pub fn release_global(&self, kind: ObjectKind, global: GlobalName) {
        self.inner.lock().namespace(kind).release(global);
    }

    /// Attach a side record to `local`. A record of another kind is refused.
    pub fn set_object_data(&self, kind: ObjectKind, local: LocalName, data: ObjectDataPtr) -> bool {
        if data.kind() != kind {
            warn!("refusing {} record for {} {}", data.kind(), kind, local);
            return false;
        }
        self.inner.lock().data.insert((kind, local), data);
        true
    }

    pub fn get_object_data(&self, kind: ObjectKind, local: LocalName) -> Option<ObjectDataPtr> {
        self.inner.lock().data.get(&(kind, local)).cloned()
    }

    /// Number of local names of `kind`
    pub fn object_count(&self, kind: ObjectKind) -> usize {
        self.inner.lock().namespaces[kind.index()].len()
    }

    /// Whether no local name of any kind is mapped
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.lock();
        inner.namespaces.iter().all(NameSpace::is_empty)
    }

    /// Delete every name and side record
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.data.clear();
        for namespace in inner.namespaces.iter_mut() {
            namespace.clear();
        }
        debug!("share group cleared");
    }
}

impl core::fmt::Debug for ShareGroup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.lock();
        let mut list = f.debug_struct("ShareGroup");
        for namespace in inner.namespaces.iter() {
            list.field(&namespace.kind().to_string(), &namespace.len());
        }
        list.finish()
    }
}
