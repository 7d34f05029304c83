//! Images shared between contexts

use std::sync::Arc;

use gles_names::{GlobalName, GlobalNameSpace, ObjectKind, TextureData};

use crate::types::{alloc_image_handle, ImageHandle};

/// Snapshot of a texture taken when the image was created.
///
/// Attaching an image to a context only records a reference; the pixels
/// stay in the host texture named by `global_texture`. That name is pinned
/// for the life of the image, so deleting the source texture does not hand
/// it back to the allocator while a sibling may still sample it.
#[derive(Debug)]
pub struct Image {
    handle: ImageHandle,
    pub width: u32,
    pub height: u32,
    pub border: i32,
    pub internal_format: u32,
    /// Host name of the source texture
    pub global_texture: GlobalName,
    globals: Arc<GlobalNameSpace>,
    pinned: bool,
}

impl Image {
    pub fn from_texture(
        texture: &TextureData,
        global_texture: GlobalName,
        globals: Arc<GlobalNameSpace>,
    ) -> Self {
        let pinned = globals.pin(ObjectKind::Texture, global_texture);
        Self {
            handle: alloc_image_handle(),
            width: texture.width,
            height: texture.height,
            border: texture.border,
            internal_format: texture.internal_format,
            global_texture,
            globals,
            pinned,
        }
    }

    pub fn handle(&self) -> ImageHandle {
        self.handle
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        if self.pinned {
            self.globals.unpin(ObjectKind::Texture, self.global_texture);
        }
    }
}
