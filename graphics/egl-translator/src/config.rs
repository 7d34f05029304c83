//! Display configurations and config selection
//!
//! A [`Config`] is immutable once built. Configs of a display are sorted once
//! with the total order implemented by [`Ord`]; selection walks the sorted
//! list and keeps every config for which [`Config::matches`] holds.

use core::cmp::Ordering;
use core::fmt;

use crate::consts::*;
use crate::error::{EglError, Result};
use crate::types::{
    Caveat, ConfigId, NativePixelFormat, RenderableType, SurfaceType, TransparentType,
};

/// Largest off-screen surface a host config is assumed to support
pub const PBUFFER_MAX_WIDTH: EGLint = 32767;
pub const PBUFFER_MAX_HEIGHT: EGLint = 32767;
pub const PBUFFER_MAX_PIXELS: EGLint = PBUFFER_MAX_WIDTH * PBUFFER_MAX_HEIGHT;

pub const MIN_SWAP_INTERVAL: EGLint = 1;
pub const MAX_SWAP_INTERVAL: EGLint = 10;

/// Host description of one supported config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigInfo {
    pub red_size: EGLint,
    pub green_size: EGLint,
    pub blue_size: EGLint,
    pub alpha_size: EGLint,
    pub caveat: Caveat,
    pub config_id: EGLint,
    pub depth_size: EGLint,
    pub frame_buffer_level: EGLint,
    pub max_pbuffer_width: EGLint,
    pub max_pbuffer_height: EGLint,
    pub max_pbuffer_size: EGLint,
    pub native_renderable: bool,
    pub renderable_type: RenderableType,
    pub native_visual_id: EGLint,
    pub native_visual_type: EGLint,
    pub samples_per_pixel: EGLint,
    pub stencil_size: EGLint,
    pub surface_type: SurfaceType,
    pub transparent_type: TransparentType,
    pub trans_red_val: EGLint,
    pub trans_green_val: EGLint,
    pub trans_blue_val: EGLint,
    pub format: NativePixelFormat,
}

/// One display configuration
#[derive(Debug, Clone)]
pub struct Config {
    id: ConfigId,
    native_id: ConfigId,
    buffer_size: EGLint,
    red_size: EGLint,
    green_size: EGLint,
    blue_size: EGLint,
    alpha_size: EGLint,
    bind_to_texture_rgb: bool,
    bind_to_texture_rgba: bool,
    caveat: Caveat,
    frame_buffer_level: EGLint,
    depth_size: EGLint,
    max_pbuffer_width: EGLint,
    max_pbuffer_height: EGLint,
    max_pbuffer_size: EGLint,
    max_swap_interval: EGLint,
    min_swap_interval: EGLint,
    native_renderable: bool,
    renderable_type: RenderableType,
    native_visual_id: EGLint,
    native_visual_type: EGLint,
    sample_buffers: EGLint,
    samples_per_pixel: EGLint,
    stencil_size: EGLint,
    surface_type: SurfaceType,
    transparent_type: TransparentType,
    trans_red_val: EGLint,
    trans_green_val: EGLint,
    trans_blue_val: EGLint,
    conformant: RenderableType,
    format: NativePixelFormat,
}

impl Config {
    pub fn from_info(info: &ConfigInfo) -> Self {
        let buffer_size = info.red_size + info.green_size + info.blue_size + info.alpha_size;
        let conformant = if buffer_size > 0 && info.caveat != Caveat::NonConformant {
            info.renderable_type
        } else {
            RenderableType::empty()
        };

        Self {
            id: ConfigId(info.config_id),
            native_id: ConfigId(info.config_id),
            buffer_size,
            red_size: info.red_size,
            green_size: info.green_size,
            blue_size: info.blue_size,
            alpha_size: info.alpha_size,
            bind_to_texture_rgb: false,
            bind_to_texture_rgba: false,
            caveat: info.caveat,
            frame_buffer_level: info.frame_buffer_level,
            depth_size: info.depth_size,
            max_pbuffer_width: info.max_pbuffer_width,
            max_pbuffer_height: info.max_pbuffer_height,
            max_pbuffer_size: info.max_pbuffer_size,
            max_swap_interval: MAX_SWAP_INTERVAL,
            min_swap_interval: MIN_SWAP_INTERVAL,
            native_renderable: info.native_renderable,
            renderable_type: info.renderable_type,
            native_visual_id: info.native_visual_id,
            native_visual_type: info.native_visual_type,
            sample_buffers: if info.samples_per_pixel > 0 { 1 } else { 0 },
            samples_per_pixel: info.samples_per_pixel,
            stencil_size: info.stencil_size,
            surface_type: info.surface_type,
            transparent_type: info.transparent_type,
            trans_red_val: info.trans_red_val,
            trans_green_val: info.trans_green_val,
            trans_blue_val: info.trans_blue_val,
            conformant,
            format: info.format,
        }
    }

    /// Copy of this config under a new id with a different color layout.
    /// The native id and pixel format stay those of `self`.
    pub fn with_color_layout(
        &self,
        id: ConfigId,
        red: EGLint,
        green: EGLint,
        blue: EGLint,
        alpha: EGLint,
    ) -> Self {
        Self {
            id,
            buffer_size: red + green + blue + alpha,
            red_size: red,
            green_size: green,
            blue_size: blue,
            alpha_size: alpha,
            ..self.clone()
        }
    }

    pub fn id(&self) -> ConfigId {
        self.id
    }

    /// Id of the host config this one was derived from
    pub fn native_id(&self) -> ConfigId {
        self.native_id
    }

    pub fn format(&self) -> NativePixelFormat {
        self.format
    }

    pub fn buffer_size(&self) -> EGLint {
        self.buffer_size
    }

    /// Red, green, blue and alpha sizes
    pub fn color_layout(&self) -> [EGLint; 4] {
        [self.red_size, self.green_size, self.blue_size, self.alpha_size]
    }

    pub fn caveat(&self) -> Caveat {
        self.caveat
    }

    pub fn surface_type(&self) -> SurfaceType {
        self.surface_type
    }

    pub fn renderable_type(&self) -> RenderableType {
        self.renderable_type
    }

    pub fn conformant(&self) -> RenderableType {
        self.conformant
    }

    pub fn is_conformant(&self) -> bool {
        !self.conformant.is_empty()
    }

    /// Value of an EGL config attribute
    pub fn attrib(&self, attrib: EGLint) -> Result<EGLint> {
        let value = match attrib {
            EGL_BUFFER_SIZE => self.buffer_size,
            EGL_RED_SIZE => self.red_size,
            EGL_GREEN_SIZE => self.green_size,
            EGL_BLUE_SIZE => self.blue_size,
            EGL_ALPHA_SIZE => self.alpha_size,
            EGL_BIND_TO_TEXTURE_RGB => self.bind_to_texture_rgb as EGLint,
            EGL_BIND_TO_TEXTURE_RGBA => self.bind_to_texture_rgba as EGLint,
            EGL_CONFIG_CAVEAT => self.caveat.code(),
            EGL_CONFIG_ID => self.id.0,
            EGL_DEPTH_SIZE => self.depth_size,
            EGL_LEVEL => self.frame_buffer_level,
            EGL_MAX_PBUFFER_WIDTH => self.max_pbuffer_width,
            EGL_MAX_PBUFFER_HEIGHT => self.max_pbuffer_height,
            EGL_MAX_PBUFFER_PIXELS => self.max_pbuffer_size,
            EGL_MAX_SWAP_INTERVAL => self.max_swap_interval,
            EGL_MIN_SWAP_INTERVAL => self.min_swap_interval,
            EGL_NATIVE_RENDERABLE => self.native_renderable as EGLint,
            EGL_NATIVE_VISUAL_ID => self.native_visual_id,
            EGL_NATIVE_VISUAL_TYPE => self.native_visual_type,
            EGL_RENDERABLE_TYPE => self.renderable_type.bits() as EGLint,
            EGL_SAMPLE_BUFFERS => self.sample_buffers,
            EGL_SAMPLES => self.samples_per_pixel,
            EGL_STENCIL_SIZE => self.stencil_size,
            EGL_SURFACE_TYPE => self.surface_type.bits() as EGLint,
            EGL_TRANSPARENT_TYPE => self.transparent_type.code(),
            EGL_TRANSPARENT_RED_VALUE => self.trans_red_val,
            EGL_TRANSPARENT_GREEN_VALUE => self.trans_green_val,
            EGL_TRANSPARENT_BLUE_VALUE => self.trans_blue_val,
            EGL_CONFORMANT => self.conformant.bits() as EGLint,
            _ => return Err(EglError::BadAttribute),
        };
        Ok(value)
    }

    /// Whether surfaces of `other` can be bound with contexts of `self`
    pub fn compatible_with(&self, other: &Config) -> bool {
        self.buffer_size == other.buffer_size
            && self.red_size == other.red_size
            && self.green_size == other.green_size
            && self.blue_size == other.blue_size
            && self.depth_size == other.depth_size
            && self.stencil_size == other.stencil_size
    }

    /// Whether this config satisfies every constraint in `request`
    pub fn matches(&self, request: &ConfigRequest) -> bool {
        fn at_least(wanted: Option<EGLint>, have: EGLint) -> bool {
            wanted.map_or(true, |wanted| have >= wanted)
        }
        fn exact<T: PartialEq>(wanted: Option<T>, have: T) -> bool {
            wanted.map_or(true, |wanted| have == wanted)
        }
        fn contains<T: bitflags::Flags + Copy>(wanted: Option<T>, have: T) -> bool {
            wanted.map_or(true, |wanted| have.contains(wanted))
        }

        at_least(request.buffer_size, self.buffer_size)
            && at_least(request.red_size, self.red_size)
            && at_least(request.green_size, self.green_size)
            && at_least(request.blue_size, self.blue_size)
            && at_least(request.alpha_size, self.alpha_size)
            && at_least(request.depth_size, self.depth_size)
            && at_least(request.stencil_size, self.stencil_size)
            && at_least(request.sample_buffers, self.sample_buffers)
            && at_least(request.samples, self.samples_per_pixel)
            && exact(request.level, self.frame_buffer_level)
            && exact(request.config_id, self.id)
            && exact(request.native_visual_type, self.native_visual_type)
            && exact(request.max_swap_interval, self.max_swap_interval)
            && exact(request.min_swap_interval, self.min_swap_interval)
            && exact(request.transparent_red, self.trans_red_val)
            && exact(request.transparent_green, self.trans_green_val)
            && exact(request.transparent_blue, self.trans_blue_val)
            && exact(request.bind_to_texture_rgb, self.bind_to_texture_rgb)
            && exact(request.bind_to_texture_rgba, self.bind_to_texture_rgba)
            && exact(request.caveat, self.caveat)
            && exact(request.native_renderable, self.native_renderable)
            && exact(request.transparent_type, self.transparent_type)
            && contains(request.surface_type, self.surface_type)
            && contains(request.conformant, self.conformant)
            && contains(request.renderable_type, self.renderable_type)
    }
}

impl Ord for Config {
    fn cmp(&self, other: &Self) -> Ordering {
        // Conformant configs first
        other
            .is_conformant()
            .cmp(&self.is_conformant())
            .then(self.caveat.cmp(&other.caveat))
            .then(self.buffer_size.cmp(&other.buffer_size))
            .then(self.sample_buffers.cmp(&other.sample_buffers))
            .then(self.samples_per_pixel.cmp(&other.samples_per_pixel))
            .then(self.depth_size.cmp(&other.depth_size))
            .then(self.stencil_size.cmp(&other.stencil_size))
            .then(self.native_visual_type.cmp(&other.native_visual_type))
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Config {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Config {}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "config {}: rgba {}{}{}{} depth {} stencil {} renderable {:#x} surface {:#x}",
            self.id,
            self.red_size,
            self.green_size,
            self.blue_size,
            self.alpha_size,
            self.depth_size,
            self.stencil_size,
            self.renderable_type.bits(),
            self.surface_type.bits(),
        )
    }
}

/// Selection criteria. `None` means "don't care".
///
/// `caveat: Some(Caveat::None)` only accepts configs without a caveat, while
/// `caveat: None` accepts every caveat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRequest {
    // At least
    pub buffer_size: Option<EGLint>,
    pub red_size: Option<EGLint>,
    pub green_size: Option<EGLint>,
    pub blue_size: Option<EGLint>,
    pub alpha_size: Option<EGLint>,
    pub depth_size: Option<EGLint>,
    pub stencil_size: Option<EGLint>,
    pub sample_buffers: Option<EGLint>,
    pub samples: Option<EGLint>,
    // Exact
    pub level: Option<EGLint>,
    pub config_id: Option<ConfigId>,
    pub native_visual_type: Option<EGLint>,
    pub max_swap_interval: Option<EGLint>,
    pub min_swap_interval: Option<EGLint>,
    pub transparent_red: Option<EGLint>,
    pub transparent_green: Option<EGLint>,
    pub transparent_blue: Option<EGLint>,
    pub bind_to_texture_rgb: Option<bool>,
    pub bind_to_texture_rgba: Option<bool>,
    pub caveat: Option<Caveat>,
    pub native_renderable: Option<bool>,
    pub transparent_type: Option<TransparentType>,
    // Mask
    pub surface_type: Option<SurfaceType>,
    pub conformant: Option<RenderableType>,
    pub renderable_type: Option<RenderableType>,
}

impl ConfigRequest {
    /// Request that every config matches
    pub fn any() -> Self {
        Self::default()
    }

    /// Request used to look for a host config close to a color layout the
    /// host does not list
    pub fn color_layout(red: EGLint, green: EGLint, blue: EGLint, alpha: EGLint) -> Self {
        Self {
            buffer_size: Some(red + green + blue + alpha),
            red_size: Some(red),
            green_size: Some(green),
            blue_size: Some(blue),
            alpha_size: Some(alpha),
            depth_size: Some(16),
            ..Self::default()
        }
    }

    /// Parse an `EGL_NONE` terminated attribute list with the defaults of
    /// config selection: window surfaces, GLES 1.x renderable, no
    /// transparency, zero minimum sizes and level 0.
    ///
    /// When `EGL_CONFIG_ID` is present parsing stops there and only
    /// `config_id` is set.
    pub fn from_attrib_list(attribs: &[EGLint]) -> Result<Self> {
        let mut request = Self {
            buffer_size: Some(0),
            red_size: Some(0),
            green_size: Some(0),
            blue_size: Some(0),
            alpha_size: Some(0),
            depth_size: Some(0),
            stencil_size: Some(0),
            sample_buffers: Some(0),
            samples: Some(0),
            level: Some(0),
            transparent_type: Some(TransparentType::None),
            surface_type: Some(SurfaceType::WINDOW),
            renderable_type: Some(RenderableType::OPENGL_ES),
            ..Self::default()
        };

        for (name, value) in crate::validate::attrib_pairs(attribs)? {
            match name {
                EGL_MAX_PBUFFER_WIDTH
                | EGL_MAX_PBUFFER_HEIGHT
                | EGL_MAX_PBUFFER_PIXELS
                | EGL_NATIVE_VISUAL_ID => {}
                EGL_CONFIG_ID => {
                    if value < 0 {
                        return Err(EglError::BadAttribute);
                    }
                    return Ok(Self {
                        config_id: Some(ConfigId(value)),
                        ..Self::default()
                    });
                }
                EGL_LEVEL => {
                    if value == EGL_DONT_CARE {
                        return Err(EglError::BadAttribute);
                    }
                    request.level = Some(value);
                }
                EGL_BUFFER_SIZE => request.buffer_size = size(value)?,
                EGL_RED_SIZE => request.red_size = size(value)?,
                EGL_GREEN_SIZE => request.green_size = size(value)?,
                EGL_BLUE_SIZE => request.blue_size = size(value)?,
                EGL_ALPHA_SIZE => request.alpha_size = size(value)?,
                EGL_DEPTH_SIZE => request.depth_size = size(value)?,
                EGL_STENCIL_SIZE => request.stencil_size = size(value)?,
                EGL_SAMPLE_BUFFERS => request.sample_buffers = size(value)?,
                EGL_SAMPLES => request.samples = size(value)?,
                EGL_MAX_SWAP_INTERVAL => request.max_swap_interval = size(value)?,
                EGL_MIN_SWAP_INTERVAL => request.min_swap_interval = size(value)?,
                EGL_BIND_TO_TEXTURE_RGB => request.bind_to_texture_rgb = boolean(value)?,
                EGL_BIND_TO_TEXTURE_RGBA => request.bind_to_texture_rgba = boolean(value)?,
                EGL_NATIVE_RENDERABLE => request.native_renderable = boolean(value)?,
                EGL_CONFIG_CAVEAT => {
                    request.caveat = match value {
                        EGL_DONT_CARE => None,
                        code => Some(Caveat::from_code(code).ok_or(EglError::BadAttribute)?),
                    }
                }
                EGL_TRANSPARENT_TYPE => {
                    request.transparent_type = match value {
                        EGL_DONT_CARE => None,
                        code => {
                            Some(TransparentType::from_code(code).ok_or(EglError::BadAttribute)?)
                        }
                    }
                }
                EGL_TRANSPARENT_RED_VALUE => request.transparent_red = wildcard(value),
                EGL_TRANSPARENT_GREEN_VALUE => request.transparent_green = wildcard(value),
                EGL_TRANSPARENT_BLUE_VALUE => request.transparent_blue = wildcard(value),
                EGL_NATIVE_VISUAL_TYPE => request.native_visual_type = wildcard(value),
                EGL_SURFACE_TYPE => {
                    request.surface_type =
                        wildcard(value).map(|bits| SurfaceType::from_bits_retain(bits as u32))
                }
                EGL_RENDERABLE_TYPE => {
                    request.renderable_type =
                        wildcard(value).map(|bits| RenderableType::from_bits_retain(bits as u32))
                }
                EGL_CONFORMANT => {
                    request.conformant =
                        wildcard(value).map(|bits| RenderableType::from_bits_retain(bits as u32))
                }
                _ => return Err(EglError::BadAttribute),
            }
        }

        Ok(request)
    }
}

fn wildcard(value: EGLint) -> Option<EGLint> {
    (value != EGL_DONT_CARE).then_some(value)
}

fn size(value: EGLint) -> Result<Option<EGLint>> {
    match value {
        EGL_DONT_CARE => Ok(None),
        v if v < 0 => Err(EglError::BadAttribute),
        v => Ok(Some(v)),
    }
}

fn boolean(value: EGLint) -> Result<Option<bool>> {
    match value {
        EGL_DONT_CARE => Ok(None),
        EGL_FALSE => Ok(Some(false)),
        EGL_TRUE => Ok(Some(true)),
        _ => Err(EglError::BadAttribute),
    }
}
