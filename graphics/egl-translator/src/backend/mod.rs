//! Host collaborators
//!
//! The translator never talks to a host GL stack directly. A host platform
//! provides an [`Engine`] (display connections and window surfaces), one
//! [`NativeDisplay`] per opened display, and one [`ClientApi`] per supported
//! GLES version.

use std::sync::Arc;

use gles_names::ShareGroup;

use crate::config::ConfigInfo;
use crate::surface::PbufferInfo;
use crate::types::{
    GlesVersion, NativeContext, NativeDisplayId, NativePixelFormat, NativeSurface, NativeWindow,
    RenderableType,
};

#[cfg(feature = "headless")]
pub mod headless;

/// Host display system
pub trait Engine: Send + Sync {
    /// Open a connection to a native display, `None` if it does not exist
    fn open_display(&self, id: NativeDisplayId) -> Option<Arc<dyn NativeDisplay>>;

    /// Wrap a native window into a drawable
    fn create_window_surface(&self, window: NativeWindow) -> Option<NativeSurface>;

    /// Resolve a host GL entry point
    fn proc_address(&self, name: &str) -> Option<usize>;
}

/// Host display connection
pub trait NativeDisplay: Send + Sync {
    /// Enumerate host configs usable for `renderable`
    fn query_configs(&self, renderable: RenderableType) -> Vec<ConfigInfo>;

    fn is_valid_window(&self, window: NativeWindow) -> bool;

    /// Whether a window-backed drawable still has a live window
    fn is_valid_surface(&self, surface: NativeSurface) -> bool;

    /// Check that `window` can use `format`, returning its size
    fn check_window_pixel_format(
        &self,
        window: NativeWindow,
        format: NativePixelFormat,
    ) -> Option<(u32, u32)>;

    fn create_context(
        &self,
        format: NativePixelFormat,
        share: Option<NativeContext>,
    ) -> Option<NativeContext>;

    fn destroy_context(&self, context: NativeContext) -> bool;

    fn create_pbuffer(&self, format: NativePixelFormat, info: &PbufferInfo)
        -> Option<NativeSurface>;

    fn release_pbuffer(&self, surface: NativeSurface) -> bool;

    /// Bind a context and drawables to the calling thread, or unbind with
    /// all three `None`
    fn make_current(
        &self,
        read: Option<NativeSurface>,
        draw: Option<NativeSurface>,
        context: Option<NativeContext>,
    ) -> bool;

    fn swap_buffers(&self, surface: NativeSurface);

    /// Close the connection
    fn release(&self) -> bool;
}

/// Client-side context of a GLES implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientContextId(pub u64);

/// GLES implementation for one API version
pub trait ClientApi: Send + Sync {
    fn version(&self) -> GlesVersion;

    /// One-time setup, called when the implementation is registered
    fn init(&self);

    fn create_context(&self) -> Option<ClientContextId>;

    /// Called every time a context becomes current
    fn init_context(&self, context: ClientContextId, share_group: &Arc<ShareGroup>);

    fn delete_context(&self, context: ClientContextId);

    fn flush(&self, context: ClientContextId);

    fn finish(&self, context: ClientContextId);

    /// Resolve an extension entry point
    fn proc_address(&self, name: &str) -> Option<usize>;
}
