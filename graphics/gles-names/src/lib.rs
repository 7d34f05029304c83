//! GLES object name virtualization
//!
//! Guest GLES contexts name their objects (textures, buffers, renderbuffers,
//! framebuffers, shaders) with integers of their own choosing. The host
//! driver needs names that are unique across every context it serves, and
//! contexts created to share state must resolve the same guest name to the
//! same host object.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │      ObjectNameManager       │  group key ──► ShareGroup
//! └──────────────┬───────────────┘
//!                │ 1..n keys per group
//! ┌──────────────▼───────────────┐
//! │          ShareGroup          │  one lock, one NameSpace per kind,
//! │  ┌────────┐ ┌────────┐       │  side data keyed by (kind, local)
//! │  │NameSpace│ │NameSpace│ ... │
//! │  └───┬────┘ └───┬────┘       │
//! └──────┼──────────┼────────────┘
//!        │ allocate / free
//! ┌──────▼──────────▼────────────┐
//! │       GlobalNameSpace        │  process-wide, per-kind counters
//! └──────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gles_names::{GlobalNameSpace, GroupKey, NameRequest, ObjectKind, ObjectNameManager};
//!
//! let names = Arc::new(GlobalNameSpace::new());
//! let manager = ObjectNameManager::new(names);
//!
//! let group = manager.create_group(GroupKey(1));
//! let tex = group.generate(ObjectKind::Texture, NameRequest::Fresh);
//! let host_name = group.global_name_of(ObjectKind::Texture, tex);
//! ```

pub mod global;
pub mod manager;
pub mod namespace;
pub mod object_data;
pub mod share_group;

pub use global::GlobalNameSpace;
pub use manager::{GroupKey, ObjectNameManager};
pub use namespace::NameSpace;
pub use object_data::{
    BufferData, FramebufferData, ObjectData, ObjectDataPtr, RenderbufferData, ShaderData,
    TextureData,
};
pub use share_group::ShareGroup;

use core::fmt;

/// Host-visible object name. Zero never names an object.
pub type GlobalName = u32;

/// Guest-visible object name. Zero never names an object.
pub type LocalName = u64;

/// Kinds of GLES objects that live in a share group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
    /// Vertex and index buffers
    VertexBuffer = 0,
    /// Textures
    Texture = 1,
    /// Renderbuffers
    Renderbuffer = 2,
    /// Framebuffers
    Framebuffer = 3,
    /// Shaders and programs
    Shader = 4,
}

impl ObjectKind {
    /// Number of object kinds
    pub const COUNT: usize = 5;

    /// All kinds, in index order
    pub const ALL: [ObjectKind; Self::COUNT] = [
        ObjectKind::VertexBuffer,
        ObjectKind::Texture,
        ObjectKind::Renderbuffer,
        ObjectKind::Framebuffer,
        ObjectKind::Shader,
    ];

    /// Index of this kind in per-kind tables
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::VertexBuffer => write!(f, "buffer"),
            ObjectKind::Texture => write!(f, "texture"),
            ObjectKind::Renderbuffer => write!(f, "renderbuffer"),
            ObjectKind::Framebuffer => write!(f, "framebuffer"),
            ObjectKind::Shader => write!(f, "shader"),
        }
    }
}

/// How the local name of a new object is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRequest {
    /// Let the name space mint an unused, non-zero local name
    Fresh,
    /// Use exactly this local name
    Exact(LocalName),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_indices_are_dense() {
        for (i, kind) in ObjectKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ObjectKind::Texture.to_string(), "texture");
        assert_eq!(ObjectKind::VertexBuffer.to_string(), "buffer");
    }
}
