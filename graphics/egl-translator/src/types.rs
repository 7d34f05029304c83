//! Handles, native tokens and attribute enums

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;

use crate::consts::*;

/// Next display handle
static NEXT_DISPLAY: AtomicU32 = AtomicU32::new(1);

/// Next context handle
static NEXT_CONTEXT: AtomicU32 = AtomicU32::new(1);

/// Next surface handle
static NEXT_SURFACE: AtomicU32 = AtomicU32::new(1);

/// Next image id
static NEXT_IMAGE: AtomicU32 = AtomicU32::new(1);

/// Take the next value of `counter`. Zero is the guest's "no object" and is
/// skipped when the counter wraps.
fn next_handle(counter: &AtomicU32) -> u32 {
    let bump = |id: u32| Some(id.checked_add(1).unwrap_or(1));
    match counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, bump) {
        Ok(id) | Err(id) => id,
    }
}

/// Allocate a display handle
pub fn alloc_display_handle() -> DisplayHandle {
    DisplayHandle(next_handle(&NEXT_DISPLAY))
}

/// Allocate a context handle
pub fn alloc_context_handle() -> ContextHandle {
    ContextHandle(next_handle(&NEXT_CONTEXT))
}

/// Allocate a surface handle
pub fn alloc_surface_handle() -> SurfaceHandle {
    SurfaceHandle(next_handle(&NEXT_SURFACE))
}

/// Allocate an image id
pub fn alloc_image_handle() -> ImageHandle {
    ImageHandle(next_handle(&NEXT_IMAGE))
}

/// Guest-visible display handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayHandle(pub u32);

/// Guest-visible context handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextHandle(pub u32);

/// Guest-visible surface handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceHandle(pub u32);

/// Guest-visible image handle, unique across displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageHandle(pub u32);

/// Config id, unique within its display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigId(pub EGLint);

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native display identifier chosen by the embedder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeDisplayId(pub u64);

/// Host window
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeWindow(pub u64);

/// Host rendering context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeContext(pub u64);

/// Host drawable, window-backed or off-screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeSurface(pub u64);

/// Host pixel format descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativePixelFormat(pub u64);

bitflags! {
    /// Surface kinds a config can render to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SurfaceType: u32 {
        const PBUFFER = EGL_PBUFFER_BIT as u32;
        const PIXMAP = EGL_PIXMAP_BIT as u32;
        const WINDOW = EGL_WINDOW_BIT as u32;
    }
}

bitflags! {
    /// Client APIs a config supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderableType: u32 {
        const OPENGL_ES = EGL_OPENGL_ES_BIT as u32;
        const OPENVG = EGL_OPENVG_BIT as u32;
        const OPENGL_ES2 = EGL_OPENGL_ES2_BIT as u32;
        const OPENGL = EGL_OPENGL_BIT as u32;
    }
}

/// Config caveat, declared in ascending severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Caveat {
    None,
    Slow,
    NonConformant,
}

impl Caveat {
    pub const fn code(self) -> EGLint {
        match self {
            Caveat::None => EGL_NONE,
            Caveat::Slow => EGL_SLOW_CONFIG,
            Caveat::NonConformant => EGL_NON_CONFORMANT_CONFIG,
        }
    }

    pub fn from_code(code: EGLint) -> Option<Self> {
        match code {
            EGL_NONE => Some(Caveat::None),
            EGL_SLOW_CONFIG => Some(Caveat::Slow),
            EGL_NON_CONFORMANT_CONFIG => Some(Caveat::NonConformant),
            _ => None,
        }
    }
}

/// Transparency kind of a config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransparentType {
    None,
    Rgb,
}

impl TransparentType {
    pub const fn code(self) -> EGLint {
        match self {
            TransparentType::None => EGL_NONE,
            TransparentType::Rgb => EGL_TRANSPARENT_RGB,
        }
    }

    pub fn from_code(code: EGLint) -> Option<Self> {
        match code {
            EGL_NONE => Some(TransparentType::None),
            EGL_TRANSPARENT_RGB => Some(TransparentType::Rgb),
            _ => None,
        }
    }
}

/// GLES API version a context is created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlesVersion {
    V1_1,
    V2_0,
}

impl GlesVersion {
    pub const COUNT: usize = 2;
    pub const ALL: [GlesVersion; Self::COUNT] = [GlesVersion::V1_1, GlesVersion::V2_0];

    pub const fn index(self) -> usize {
        match self {
            GlesVersion::V1_1 => 0,
            GlesVersion::V2_0 => 1,
        }
    }

    /// Renderable bit a config needs to host this version
    pub const fn renderable_bit(self) -> RenderableType {
        match self {
            GlesVersion::V1_1 => RenderableType::OPENGL_ES,
            GlesVersion::V2_0 => RenderableType::OPENGL_ES2,
        }
    }
}

impl fmt::Display for GlesVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlesVersion::V1_1 => write!(f, "GLES 1.1"),
            GlesVersion::V2_0 => write!(f, "GLES 2.0"),
        }
    }
}

/// Texture format an off-screen surface can be bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    #[default]
    NoTexture,
    Rgb,
    Rgba,
}

impl TextureFormat {
    pub const fn code(self) -> EGLint {
        match self {
            TextureFormat::NoTexture => EGL_NO_TEXTURE,
            TextureFormat::Rgb => EGL_TEXTURE_RGB,
            TextureFormat::Rgba => EGL_TEXTURE_RGBA,
        }
    }

    pub fn from_code(code: EGLint) -> Option<Self> {
        match code {
            EGL_NO_TEXTURE => Some(TextureFormat::NoTexture),
            EGL_TEXTURE_RGB => Some(TextureFormat::Rgb),
            EGL_TEXTURE_RGBA => Some(TextureFormat::Rgba),
            _ => None,
        }
    }
}

/// Texture target an off-screen surface can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureTarget {
    #[default]
    NoTexture,
    Texture2D,
}

impl TextureTarget {
    pub const fn code(self) -> EGLint {
        match self {
            TextureTarget::NoTexture => EGL_NO_TEXTURE,
            TextureTarget::Texture2D => EGL_TEXTURE_2D,
        }
    }

    pub fn from_code(code: EGLint) -> Option<Self> {
        match code {
            EGL_NO_TEXTURE => Some(TextureTarget::NoTexture),
            EGL_TEXTURE_2D => Some(TextureTarget::Texture2D),
            _ => None,
        }
    }
}

/// Selector for `get_current_surface`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadDraw {
    Read,
    Draw,
}

impl ReadDraw {
    pub fn from_code(code: EGLint) -> Option<Self> {
        match code {
            EGL_READ => Some(ReadDraw::Read),
            EGL_DRAW => Some(ReadDraw::Draw),
            _ => None,
        }
    }
}

/// Client API selected with `bind_api`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientApiKind {
    #[default]
    OpenGlEs,
}

impl ClientApiKind {
    pub const fn code(self) -> EGLint {
        match self {
            ClientApiKind::OpenGlEs => EGL_OPENGL_ES_API,
        }
    }
}
