//! Side records attached to named objects

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{GlobalName, LocalName, ObjectKind};

/// Shared, immutable snapshot of an object's side record. Updates replace
/// the whole snapshot.
pub type ObjectDataPtr = Arc<ObjectData>;

/// Per-object side record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectData {
    Texture(TextureData),
    Buffer(BufferData),
    Renderbuffer(RenderbufferData),
    Framebuffer(FramebufferData),
    Shader(ShaderData),
}

impl ObjectData {
    /// Object kind this record belongs to
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectData::Texture(_) => ObjectKind::Texture,
            ObjectData::Buffer(_) => ObjectKind::VertexBuffer,
            ObjectData::Renderbuffer(_) => ObjectKind::Renderbuffer,
            ObjectData::Framebuffer(_) => ObjectKind::Framebuffer,
            ObjectData::Shader(_) => ObjectKind::Shader,
        }
    }

    pub fn as_texture(&self) -> Option<&TextureData> {
        match self {
            ObjectData::Texture(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_renderbuffer(&self) -> Option<&RenderbufferData> {
        match self {
            ObjectData::Renderbuffer(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_framebuffer(&self) -> Option<&FramebufferData> {
        match self {
            ObjectData::Framebuffer(data) => Some(data),
            _ => None,
        }
    }
}

/// Texture level 0 description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub border: i32,
    pub internal_format: u32,
    pub target: u32,
    /// Image this texture is a sibling of
    pub source_image: Option<u32>,
    /// Global name the texture had before it was bound to `source_image`
    pub saved_global: Option<GlobalName>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, internal_format: u32) -> Self {
        Self {
            width,
            height,
            internal_format,
            ..Self::default()
        }
    }

    /// Whether the texture currently samples from an image
    pub fn is_image_sibling(&self) -> bool {
        self.source_image.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferData {
    pub size: usize,
    pub usage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderbufferData {
    pub width: u32,
    pub height: u32,
    pub internal_format: u32,
    pub source_image: Option<u32>,
    /// Global texture name backing the renderbuffer storage
    pub image_texture: Option<GlobalName>,
}

/// Framebuffer attachment table, keyed by attachment point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramebufferData {
    attachments: BTreeMap<u32, (ObjectKind, LocalName)>,
}

impl FramebufferData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `name` at `point`, replacing what was there
    pub fn attach(&mut self, point: u32, kind: ObjectKind, name: LocalName) {
        self.attachments.insert(point, (kind, name));
    }

    pub fn detach(&mut self, point: u32) -> Option<(ObjectKind, LocalName)> {
        self.attachments.remove(&point)
    }

    pub fn attachment(&self, point: u32) -> Option<(ObjectKind, LocalName)> {
        self.attachments.get(&point).copied()
    }

    /// Detach `name` from every point it is attached to
    pub fn detach_object(&mut self, kind: ObjectKind, name: LocalName) {
        self.attachments.retain(|_, attached| *attached != (kind, name));
    }
}

/// Shader or program record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderData {
    pub is_program: bool,
    pub source: String,
    /// Program a shader is attached to
    pub attached_program: Option<LocalName>,
    /// Deletion was requested while still attached
    pub delete_pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_record() {
        let tex = ObjectData::Texture(TextureData::new(4, 4, 0x1908));
        assert_eq!(tex.kind(), ObjectKind::Texture);
        assert_eq!(tex.as_texture().map(|t| t.width), Some(4));
        assert!(tex.as_framebuffer().is_none());
        assert_eq!(ObjectData::Buffer(BufferData::default()).kind(), ObjectKind::VertexBuffer);
    }

    #[test]
    fn test_framebuffer_detach_object() {
        let mut fb = FramebufferData::new();
        fb.attach(0x8CE0, ObjectKind::Texture, 3);
        fb.attach(0x8D00, ObjectKind::Renderbuffer, 3);
        fb.detach_object(ObjectKind::Texture, 3);
        assert_eq!(fb.attachment(0x8CE0), None);
        assert_eq!(fb.attachment(0x8D00), Some((ObjectKind::Renderbuffer, 3)));
    }
}
