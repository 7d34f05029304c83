//! Rendering contexts

use std::collections::BTreeMap;
use std::sync::Arc;

use gles_names::{GroupKey, ObjectNameManager, ShareGroup};
use log::{debug, warn};
use parking_lot::Mutex;

use crate::backend::{ClientApi, ClientContextId, NativeDisplay};
use crate::config::Config;
use crate::consts::*;
use crate::error::{EglError, Result};
use crate::image::Image;
use crate::surface::Surface;
use crate::types::{alloc_context_handle, ContextHandle, DisplayHandle, GlesVersion, ImageHandle, NativeContext};

/// Everything a context needs from the display that creates it
pub struct ContextParams {
    pub display: DisplayHandle,
    pub config: Arc<Config>,
    pub native: NativeContext,
    pub version: GlesVersion,
    pub client: Arc<dyn ClientApi>,
    pub client_context: ClientContextId,
    pub backend: Arc<dyn NativeDisplay>,
    pub manager: Arc<ObjectNameManager>,
    /// Native handle of the context to share objects with
    pub share: Option<NativeContext>,
}

/// Surfaces bound while the context is current, `(read, draw)`
type Bound = Option<(Arc<Surface>, Arc<Surface>)>;

/// A GLES context registered with a display.
///
/// The display and any thread that has the context current each hold a
/// reference. The native and client contexts are destroyed with the last
/// one.
pub struct Context {
    handle: ContextHandle,
    display: DisplayHandle,
    config: Arc<Config>,
    native: NativeContext,
    version: GlesVersion,
    share_group: Arc<ShareGroup>,
    client: Arc<dyn ClientApi>,
    client_context: ClientContextId,
    backend: Arc<dyn NativeDisplay>,
    manager: Arc<ObjectNameManager>,
    surfaces: Mutex<Bound>,
    images: Mutex<BTreeMap<ImageHandle, Arc<Image>>>,
    /// Token of the thread the context is current on
    owner: Mutex<Option<u64>>,
}

impl Context {
    /// Build a context and join it to a share group, keyed by its native
    /// handle. With `share` set the group of that context is joined,
    /// otherwise a new group is created.
    pub fn new(params: ContextParams) -> Self {
        let key = GroupKey(params.native.0);
        let share_group = params
            .share
            .and_then(|share| params.manager.attach(key, GroupKey(share.0)))
            .unwrap_or_else(|| params.manager.create_group(key));

        let handle = alloc_context_handle();
        debug!(
            "context {:?} ({}) native {:?} shared with {:?}",
            handle, params.version, params.native, params.share
        );

        Self {
            handle,
            display: params.display,
            config: params.config,
            native: params.native,
            version: params.version,
            share_group,
            client: params.client,
            client_context: params.client_context,
            backend: params.backend,
            manager: params.manager,
            surfaces: Mutex::new(None),
            images: Mutex::new(BTreeMap::new()),
            owner: Mutex::new(None),
        }
    }

    pub fn handle(&self) -> ContextHandle {
        self.handle
    }

    pub fn display(&self) -> DisplayHandle {
        self.display
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn native(&self) -> NativeContext {
        self.native
    }

    pub fn version(&self) -> GlesVersion {
        self.version
    }

    pub fn share_group(&self) -> &Arc<ShareGroup> {
        &self.share_group
    }

    pub fn client(&self) -> &Arc<dyn ClientApi> {
        &self.client
    }

    pub fn client_context(&self) -> ClientContextId {
        self.client_context
    }

    pub fn read(&self) -> Option<Arc<Surface>> {
        self.surfaces.lock().as_ref().map(|(read, _)| read.clone())
    }

    pub fn draw(&self) -> Option<Arc<Surface>> {
        self.surfaces.lock().as_ref().map(|(_, draw)| draw.clone())
    }

    /// Whether `surface` is bound as read or draw surface
    pub fn uses_surface(&self, surface: &Surface) -> bool {
        self.surfaces.lock().as_ref().map_or(false, |(read, draw)| {
            core::ptr::eq(read.as_ref(), surface) || core::ptr::eq(draw.as_ref(), surface)
        })
    }

    /// Whether exactly these surfaces are bound
    pub(crate) fn has_surfaces(&self, read: &Arc<Surface>, draw: &Arc<Surface>) -> bool {
        self.surfaces
            .lock()
            .as_ref()
            .map_or(false, |(r, d)| Arc::ptr_eq(r, read) && Arc::ptr_eq(d, draw))
    }

    /// Bind both surfaces. Returns the previous pair so the caller can drop
    /// it outside any lock.
    pub(crate) fn set_surfaces(&self, read: Arc<Surface>, draw: Arc<Surface>) -> Bound {
        self.surfaces.lock().replace((read, draw))
    }

    pub(crate) fn clear_surfaces(&self) -> Bound {
        self.surfaces.lock().take()
    }

    /// Mark the context current on `thread`. Fails if another thread holds it.
    pub(crate) fn acquire(&self, thread: u64) -> Result<()> {
        let mut owner = self.owner.lock();
        match *owner {
            Some(other) if other != thread => Err(EglError::BadAccess),
            _ => {
                *owner = Some(thread);
                Ok(())
            }
        }
    }

    pub(crate) fn release(&self, thread: u64) {
        let mut owner = self.owner.lock();
        if *owner == Some(thread) {
            *owner = None;
        }
    }

    /// Whether the context is current on some thread
    pub fn is_current(&self) -> bool {
        self.owner.lock().is_some()
    }

    /// Value of a context attribute
    pub fn attrib(&self, attrib: EGLint) -> Result<EGLint> {
        match attrib {
            EGL_CONFIG_ID => Ok(self.config.id().0),
            _ => Err(EglError::BadAttribute),
        }
    }

    /// Record that this context references `image`. Returns `false` if it
    /// already did.
    pub fn attach_image(&self, image: Arc<Image>) -> bool {
        let mut images = self.images.lock();
        if images.contains_key(&image.handle()) {
            return false;
        }
        images.insert(image.handle(), image);
        true
    }

    pub fn detach_image(&self, image: ImageHandle) -> Option<Arc<Image>> {
        self.images.lock().remove(&image)
    }

    pub fn attached_image(&self, image: ImageHandle) -> Option<Arc<Image>> {
        self.images.lock().get(&image).cloned()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // Names go back while the host context can still delete them
        self.manager.detach(GroupKey(self.native.0));
        self.client.delete_context(self.client_context);
        if !self.backend.destroy_context(self.native) {
            warn!("host refused to destroy context {:?}", self.native);
        }
        debug!("context {:?} destroyed", self.handle);
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("handle", &self.handle)
            .field("version", &self.version)
            .field("config", &self.config.id())
            .field("native", &self.native)
            .finish()
    }
}
