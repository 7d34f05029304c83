//! Window and off-screen surfaces

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::backend::NativeDisplay;
use crate::config::Config;
use crate::consts::*;
use crate::error::{EglError, Result};
use crate::types::{
    alloc_surface_handle, DisplayHandle, NativeSurface, NativeWindow, SurfaceHandle,
    TextureFormat, TextureTarget,
};
use crate::validate::{attrib_pairs, is_power_of_two};

/// Native windows currently backing a surface, process-wide
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: Mutex<HashSet<NativeWindow>>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `window`. Returns `false` if it already backs a surface.
    pub fn claim(&self, window: NativeWindow) -> bool {
        self.windows.lock().insert(window)
    }

    pub fn release(&self, window: NativeWindow) {
        self.windows.lock().remove(&window);
    }

    pub fn is_claimed(&self, window: NativeWindow) -> bool {
        self.windows.lock().contains(&window)
    }
}

/// Off-screen surface description
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PbufferInfo {
    pub width: EGLint,
    pub height: EGLint,
    pub largest: bool,
    pub texture_format: TextureFormat,
    pub texture_target: TextureTarget,
    pub mipmap: bool,
}

impl PbufferInfo {
    /// Parse the attribute list of `create_pbuffer_surface` and check the
    /// combination of values
    pub fn from_attrib_list(attribs: &[EGLint]) -> Result<Self> {
        let mut info = Self::default();
        for (name, value) in attrib_pairs(attribs)? {
            info.set_attrib(name, value)?;
        }

        if info.texture_format != TextureFormat::NoTexture
            && !(is_power_of_two(info.width) && is_power_of_two(info.height))
        {
            return Err(EglError::BadAttribute);
        }
        let no_format = info.texture_format == TextureFormat::NoTexture;
        let no_target = info.texture_target == TextureTarget::NoTexture;
        if no_format != no_target {
            return Err(EglError::BadAttribute);
        }

        Ok(info)
    }

    pub(crate) fn set_attrib(&mut self, name: EGLint, value: EGLint) -> Result<()> {
        match name {
            EGL_WIDTH if value >= 0 => self.width = value,
            EGL_HEIGHT if value >= 0 => self.height = value,
            EGL_LARGEST_PBUFFER => self.largest = value != EGL_FALSE,
            EGL_TEXTURE_FORMAT => {
                self.texture_format = TextureFormat::from_code(value).ok_or(EglError::BadAttribute)?
            }
            EGL_TEXTURE_TARGET => {
                self.texture_target = TextureTarget::from_code(value).ok_or(EglError::BadAttribute)?
            }
            EGL_MIPMAP_TEXTURE => self.mipmap = value != EGL_FALSE,
            _ => return Err(EglError::BadAttribute),
        }
        Ok(())
    }
}

/// What a surface draws into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Window(NativeWindow),
    Pbuffer,
}

/// A drawable registered with a display.
///
/// Dropping the last reference gives the native resource back: off-screen
/// buffers are released and windows become free for a new surface.
pub struct Surface {
    handle: SurfaceHandle,
    display: DisplayHandle,
    config: Arc<Config>,
    native: NativeSurface,
    kind: SurfaceKind,
    /// Size and texture binding attributes; windows only fill in the size
    attribs: Mutex<PbufferInfo>,
    backend: Arc<dyn NativeDisplay>,
    windows: Arc<WindowRegistry>,
}

impl Surface {
    /// Wrap a window drawable. The caller has already claimed `window` in
    /// `windows`.
    pub fn new_window(
        display: DisplayHandle,
        config: Arc<Config>,
        window: NativeWindow,
        native: NativeSurface,
        (width, height): (u32, u32),
        backend: Arc<dyn NativeDisplay>,
        windows: Arc<WindowRegistry>,
    ) -> Self {
        let surface = Self {
            handle: alloc_surface_handle(),
            display,
            config,
            native,
            kind: SurfaceKind::Window(window),
            attribs: Mutex::new(PbufferInfo {
                width: EGLint::try_from(width).unwrap_or(EGLint::MAX),
                height: EGLint::try_from(height).unwrap_or(EGLint::MAX),
                ..PbufferInfo::default()
            }),
            backend,
            windows,
        };
        debug!("window surface {:?} for window {:?}", surface.handle, window);
        surface
    }

    pub fn new_pbuffer(
        display: DisplayHandle,
        config: Arc<Config>,
        native: NativeSurface,
        info: PbufferInfo,
        backend: Arc<dyn NativeDisplay>,
        windows: Arc<WindowRegistry>,
    ) -> Self {
        let surface = Self {
            handle: alloc_surface_handle(),
            display,
            config,
            native,
            kind: SurfaceKind::Pbuffer,
            attribs: Mutex::new(info),
            backend,
            windows,
        };
        debug!(
            "pbuffer surface {:?} {}x{}",
            surface.handle, info.width, info.height
        );
        surface
    }

    pub fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    pub fn display(&self) -> DisplayHandle {
        self.display
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn native(&self) -> NativeSurface {
        self.native
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn is_window(&self) -> bool {
        matches!(self.kind, SurfaceKind::Window(_))
    }

    /// Value of a surface attribute
    pub fn attrib(&self, attrib: EGLint) -> Result<EGLint> {
        let pbuffer = *self.attribs.lock();
        let value = match attrib {
            EGL_CONFIG_ID => self.config.id().0,
            EGL_WIDTH => pbuffer.width,
            EGL_HEIGHT => pbuffer.height,
            EGL_LARGEST_PBUFFER => pbuffer.largest as EGLint,
            EGL_TEXTURE_FORMAT => pbuffer.texture_format.code(),
            EGL_TEXTURE_TARGET => pbuffer.texture_target.code(),
            EGL_MIPMAP_TEXTURE => pbuffer.mipmap as EGLint,
            _ => return Err(EglError::BadAttribute),
        };
        Ok(value)
    }

    /// Change an off-screen attribute after creation. A rejected value
    /// leaves the surface unchanged.
    pub fn set_attrib(&self, attrib: EGLint, value: EGLint) -> Result<()> {
        if self.is_window() {
            return match attrib {
                EGL_WIDTH | EGL_HEIGHT | EGL_LARGEST_PBUFFER | EGL_TEXTURE_FORMAT
                | EGL_TEXTURE_TARGET | EGL_MIPMAP_TEXTURE => Err(EglError::BadMatch),
                _ => Err(EglError::BadAttribute),
            };
        }
        let mut attribs = self.attribs.lock();
        let mut updated = *attribs;
        updated.set_attrib(attrib, value)?;
        *attribs = updated;
        Ok(())
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        match self.kind {
            SurfaceKind::Window(window) => self.windows.release(window),
            SurfaceKind::Pbuffer => {
                if !self.backend.release_pbuffer(self.native) {
                    warn!("host refused to release pbuffer {:?}", self.native);
                }
            }
        }
        debug!("surface {:?} destroyed", self.handle);
    }
}

impl core::fmt::Debug for Surface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Surface")
            .field("handle", &self.handle)
            .field("config", &self.config.id())
            .field("kind", &self.kind)
            .field("attribs", &*self.attribs.lock())
            .finish()
    }
}
