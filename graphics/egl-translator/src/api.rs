//! Guest-facing entry points
//!
//! Every operation takes the calling thread's [`EglThread`]. A failed call
//! returns the error and also records it in the thread, so a dispatcher can
//! answer with its failure sentinel and report the code on `get_error`.

use std::sync::Arc;

use gles_names::{LocalName, ObjectData, ObjectKind, TextureData};
use log::debug;

use crate::backend::{ClientApi, Engine};
use crate::config::{Config, ConfigRequest};
use crate::consts::*;
use crate::context::{Context, ContextParams};
use crate::display::Display;
use crate::error::{EglError, Result};
use crate::global::GlobalInfo;
use crate::image::Image;
use crate::options::TranslatorConfig;
use crate::surface::{PbufferInfo, Surface};
use crate::thread::{Binding, EglThread};
use crate::types::{
    ClientApiKind, ConfigId, ContextHandle, DisplayHandle, GlesVersion, ImageHandle,
    NativeDisplayId, NativeWindow, ReadDraw, RenderableType, SurfaceHandle, SurfaceType,
};
use crate::validate::{attrib_pairs, is_bad_context_match, is_release, no_attribs};

/// Reported by `initialize` and `query_string(EGL_VERSION)`
pub const EGL_VERSION_MAJOR: EGLint = 1;
pub const EGL_VERSION_MINOR: EGLint = 4;
const VERSION_STRING: &str = "1.4";

/// Extension functions implemented by the translator itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EglExtension {
    CreateImageKhr,
    DestroyImageKhr,
}

const EGL_EXTENSION_PROCS: [(&str, EglExtension); 2] = [
    ("eglCreateImageKHR", EglExtension::CreateImageKhr),
    ("eglDestroyImageKHR", EglExtension::DestroyImageKhr),
];

/// Result of `get_proc_address`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcAddress {
    /// Served by [`Egl::create_image`] or [`Egl::destroy_image`]
    Translator(EglExtension),
    /// Address resolved by a client API or the host
    Client(usize),
}

/// Entry-point facade over the process-wide [`GlobalInfo`]
#[derive(Debug, Clone)]
pub struct Egl {
    info: Arc<GlobalInfo>,
}

impl Egl {
    pub fn new(engine: Arc<dyn Engine>, options: TranslatorConfig) -> Self {
        Self {
            info: Arc::new(GlobalInfo::new(engine, options)),
        }
    }

    pub fn info(&self) -> &Arc<GlobalInfo> {
        &self.info
    }

    pub fn register_client_api(&self, client: Arc<dyn ClientApi>) {
        self.info.register_client_api(client);
    }

    // Displays

    /// Display for a native display id, `None` if the host has no such
    /// display. Never records an error.
    pub fn get_display(&self, native_id: NativeDisplayId) -> Option<DisplayHandle> {
        self.info
            .get_or_create_display(native_id)
            .map(|display| display.handle())
    }

    /// Load configs and return the supported EGL version
    pub fn initialize(&self, thread: &mut EglThread, display: DisplayHandle) -> Result<(EGLint, EGLint)> {
        let result = self.initialize_display(display);
        thread.check(result)
    }

    fn initialize_display(&self, handle: DisplayHandle) -> Result<(EGLint, EGLint)> {
        let display = self.info.display(handle)?;
        if self.info.client_api(GlesVersion::V1_1).is_none() {
            return Err(EglError::NotInitialized);
        }
        let mut renderable = RenderableType::OPENGL_ES;
        if self.info.client_api(GlesVersion::V2_0).is_some() {
            renderable |= RenderableType::OPENGL_ES2;
        }
        display.initialize(renderable);
        Ok((EGL_VERSION_MAJOR, EGL_VERSION_MINOR))
    }

    pub fn terminate(&self, thread: &mut EglThread, display: DisplayHandle) -> Result<()> {
        let result = self.info.display(display).map(|display| display.terminate());
        thread.check(result)
    }

    pub fn query_string(&self, thread: &mut EglThread, display: DisplayHandle, name: EGLint) -> Result<&str> {
        let result = self.info.initialized_display(display).and_then(|_| {
            let options = self.info.options();
            match name {
                EGL_VENDOR => Ok(options.vendor.as_str()),
                EGL_VERSION => Ok(VERSION_STRING),
                EGL_EXTENSIONS => Ok(options.extensions.as_str()),
                _ => Err(EglError::BadParameter),
            }
        });
        thread.check(result)
    }

    // Configs

    /// Ids of all configs in selection order, at most `capacity` of them.
    /// Zero means no limit.
    pub fn get_configs(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        capacity: Option<usize>,
    ) -> Result<Vec<ConfigId>> {
        let result = self
            .info
            .initialized_display(display)
            .map(|display| ids(&display.get_configs(capacity)));
        thread.check(result)
    }

    pub fn config_count(&self, thread: &mut EglThread, display: DisplayHandle) -> Result<usize> {
        let result = self
            .info
            .initialized_display(display)
            .map(|display| display.config_count());
        thread.check(result)
    }

    /// Ids of the configs matching an attribute list. A `None` or zero
    /// capacity returns every match.
    pub fn choose_config(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        attribs: &[EGLint],
        capacity: Option<usize>,
    ) -> Result<Vec<ConfigId>> {
        let result = self.choose(display, attribs, capacity);
        thread.check(result)
    }

    fn choose(&self, handle: DisplayHandle, attribs: &[EGLint], capacity: Option<usize>) -> Result<Vec<ConfigId>> {
        let display = self.info.initialized_display(handle)?;
        let request = ConfigRequest::from_attrib_list(attribs)?;

        if let Some(id) = request.config_id {
            // Any capacity, zero included, has room for the one match
            let config = display.get_config(id).ok_or(EglError::BadAttribute)?;
            return Ok(vec![config.id()]);
        }

        Ok(ids(&display.choose_configs(&request, capacity)))
    }

    pub fn get_config_attrib(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        config: ConfigId,
        attrib: EGLint,
    ) -> Result<EGLint> {
        let result = self
            .info
            .initialized_display(display)
            .and_then(|display| config_of(&display, config))
            .and_then(|config| config.attrib(attrib));
        thread.check(result)
    }

    // Surfaces

    pub fn create_window_surface(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        config: ConfigId,
        window: NativeWindow,
        attribs: &[EGLint],
    ) -> Result<SurfaceHandle> {
        let result = self.new_window_surface(display, config, window, attribs);
        thread.check(result)
    }

    fn new_window_surface(
        &self,
        handle: DisplayHandle,
        config: ConfigId,
        window: NativeWindow,
        attribs: &[EGLint],
    ) -> Result<SurfaceHandle> {
        let display = self.info.initialized_display(handle)?;
        let config = config_of(&display, config)?;
        if !config.surface_type().contains(SurfaceType::WINDOW) {
            return Err(EglError::BadMatch);
        }
        let backend = display.backend();
        if !backend.is_valid_window(window) {
            return Err(EglError::BadNativeWindow);
        }
        if !no_attribs(attribs) {
            return Err(EglError::BadAttribute);
        }

        let windows = self.info.windows();
        if !windows.claim(window) {
            return Err(EglError::BadAlloc);
        }
        let native = backend
            .check_window_pixel_format(window, config.format())
            .and_then(|size| Some((size, self.info.engine().create_window_surface(window)?)));
        let Some((size, native)) = native else {
            windows.release(window);
            return Err(EglError::BadAlloc);
        };

        let surface = Surface::new_window(
            display.handle(),
            config,
            window,
            native,
            size,
            backend.clone(),
            windows.clone(),
        );
        Ok(display.add_surface(Arc::new(surface)))
    }

    pub fn create_pbuffer_surface(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        config: ConfigId,
        attribs: &[EGLint],
    ) -> Result<SurfaceHandle> {
        let result = self.new_pbuffer_surface(display, config, attribs);
        thread.check(result)
    }

    fn new_pbuffer_surface(&self, handle: DisplayHandle, config: ConfigId, attribs: &[EGLint]) -> Result<SurfaceHandle> {
        let display = self.info.initialized_display(handle)?;
        let config = config_of(&display, config)?;
        if !config.surface_type().contains(SurfaceType::PBUFFER) {
            return Err(EglError::BadMatch);
        }
        let info = PbufferInfo::from_attrib_list(attribs)?;
        let backend = display.backend();
        let native = backend
            .create_pbuffer(config.format(), &info)
            .ok_or(EglError::BadAlloc)?;

        let surface = Surface::new_pbuffer(
            display.handle(),
            config,
            native,
            info,
            backend.clone(),
            self.info.windows().clone(),
        );
        Ok(display.add_surface(Arc::new(surface)))
    }

    /// Forget a surface. A thread that has it current keeps it alive until
    /// it binds something else.
    pub fn destroy_surface(&self, thread: &mut EglThread, display: DisplayHandle, surface: SurfaceHandle) -> Result<()> {
        let result = self.info.initialized_display(display).and_then(|display| {
            if display.remove_surface(surface) {
                Ok(())
            } else {
                Err(EglError::BadSurface)
            }
        });
        thread.check(result)
    }

    pub fn query_surface(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        surface: SurfaceHandle,
        attrib: EGLint,
    ) -> Result<EGLint> {
        let result = self
            .surface(display, surface)
            .and_then(|surface| surface.attrib(attrib));
        thread.check(result)
    }

    pub fn surface_attrib(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        surface: SurfaceHandle,
        attrib: EGLint,
        value: EGLint,
    ) -> Result<()> {
        let result = self
            .surface(display, surface)
            .and_then(|surface| surface.set_attrib(attrib, value));
        thread.check(result)
    }

    /// Present a window surface. Off-screen surfaces have nothing to present.
    pub fn swap_buffers(&self, thread: &mut EglThread, display: DisplayHandle, surface: SurfaceHandle) -> Result<()> {
        let result = self.swap(thread, display, surface);
        thread.check(result)
    }

    fn swap(&self, thread: &EglThread, handle: DisplayHandle, surface: SurfaceHandle) -> Result<()> {
        let display = self.info.initialized_display(handle)?;
        let surface = display.get_surface(surface).ok_or(EglError::BadSurface)?;
        if !surface.is_window() {
            return Ok(());
        }

        let bound = thread
            .binding()
            .map_or(false, |binding| binding.context.uses_surface(&surface));
        if !bound || !display.backend().is_valid_surface(surface.native()) {
            return Err(EglError::BadSurface);
        }
        display.backend().swap_buffers(surface.native());
        Ok(())
    }

    fn surface(&self, display: DisplayHandle, surface: SurfaceHandle) -> Result<Arc<Surface>> {
        self.info
            .initialized_display(display)?
            .get_surface(surface)
            .ok_or(EglError::BadSurface)
    }

    // Contexts

    pub fn create_context(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        config: ConfigId,
        share: Option<ContextHandle>,
        attribs: &[EGLint],
    ) -> Result<ContextHandle> {
        let result = self.new_context(display, config, share, attribs);
        thread.check(result)
    }

    fn new_context(
        &self,
        handle: DisplayHandle,
        config: ConfigId,
        share: Option<ContextHandle>,
        attribs: &[EGLint],
    ) -> Result<ContextHandle> {
        let display = self.info.initialized_display(handle)?;
        let config = config_of(&display, config)?;

        let mut version = GlesVersion::V1_1;
        for (name, value) in attrib_pairs(attribs)? {
            match name {
                EGL_CONTEXT_CLIENT_VERSION if value == 2 => version = GlesVersion::V2_0,
                EGL_CONTEXT_CLIENT_VERSION => version = GlesVersion::V1_1,
                _ => return Err(EglError::BadAttribute),
            }
        }

        let client = self.info.client_api(version).ok_or(EglError::BadAttribute)?;
        let share = match share {
            Some(share) => Some(display.get_context(share).ok_or(EglError::BadContext)?),
            None => None,
        };

        let client_context = client.create_context().ok_or(EglError::BadAlloc)?;
        let backend = display.backend();
        let global_share = display.global_shared_context();
        let Some(native) = backend.create_context(config.format(), global_share) else {
            client.delete_context(client_context);
            return Err(EglError::BadAlloc);
        };

        let context = Context::new(ContextParams {
            display: display.handle(),
            config,
            native,
            version,
            client,
            client_context,
            backend: backend.clone(),
            manager: display.manager(version).clone(),
            share: share.map(|share| share.native()),
        });
        Ok(display.add_context(Arc::new(context)))
    }

    /// Forget a context. A thread that has it current keeps using it until
    /// it binds something else.
    pub fn destroy_context(&self, thread: &mut EglThread, display: DisplayHandle, context: ContextHandle) -> Result<()> {
        let result = self.info.initialized_display(display).and_then(|display| {
            if display.remove_context(context) {
                Ok(())
            } else {
                Err(EglError::BadContext)
            }
        });
        thread.check(result)
    }

    pub fn query_context(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        context: ContextHandle,
        attrib: EGLint,
    ) -> Result<EGLint> {
        let result = self.info.initialized_display(display).and_then(|display| {
            display
                .get_context(context)
                .ok_or(EglError::BadContext)?
                .attrib(attrib)
        });
        thread.check(result)
    }

    // Binding

    /// Bind `context` with `draw` and `read` to the calling thread, or
    /// release the current context when all three are `None`
    pub fn make_current(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        draw: Option<SurfaceHandle>,
        read: Option<SurfaceHandle>,
        context: Option<ContextHandle>,
    ) -> Result<()> {
        let result = self.bind(thread, display, draw, read, context);
        thread.check(result)
    }

    fn bind(
        &self,
        thread: &mut EglThread,
        handle: DisplayHandle,
        draw: Option<SurfaceHandle>,
        read: Option<SurfaceHandle>,
        context: Option<ContextHandle>,
    ) -> Result<()> {
        let display = self.info.initialized_display(handle)?;
        if is_bad_context_match(context, draw, read) {
            return Err(EglError::BadMatch);
        }
        if is_release(context, draw, read) {
            return release_current(thread);
        }
        let (Some(context), Some(draw), Some(read)) = (context, draw, read) else {
            return Err(EglError::BadMatch);
        };

        let context = display.get_context(context).ok_or(EglError::BadContext)?;
        let draw = display.get_surface(draw).ok_or(EglError::BadSurface)?;
        let read = display.get_surface(read).ok_or(EglError::BadSurface)?;

        let was_current = thread
            .binding()
            .map_or(false, |binding| Arc::ptr_eq(&binding.context, &context));
        if was_current && context.has_surfaces(&read, &draw) {
            return Ok(());
        }

        let config = context.config();
        if !config.compatible_with(draw.config()) || !config.compatible_with(read.config()) {
            return Err(EglError::BadMatch);
        }
        let backend = display.backend();
        for surface in [&draw, &read] {
            if surface.is_window() && !backend.is_valid_surface(surface.native()) {
                return Err(EglError::BadNativeWindow);
            }
        }

        context.acquire(thread.token())?;
        if let Some(previous) = thread.binding() {
            let previous = &previous.context;
            previous.client().flush(previous.client_context());
        }
        if !backend.make_current(Some(read.native()), Some(draw.native()), Some(context.native())) {
            if !was_current {
                context.release(thread.token());
            }
            return Err(EglError::BadAccess);
        }

        let replaced = context.set_surfaces(read.clone(), draw.clone());
        context
            .client()
            .init_context(context.client_context(), context.share_group());
        self.info.init_extensions(context.version());

        let previous = thread.set_binding(Binding {
            display,
            context: context.clone(),
            read,
            draw,
        });
        if let Some(previous) = previous {
            if !Arc::ptr_eq(&previous.context, &context) {
                let surfaces = previous.context.clear_surfaces();
                previous.context.release(thread.token());
                drop(surfaces);
            }
        }
        drop(replaced);
        debug!("thread {} bound {:?}", thread.token(), context.handle());
        Ok(())
    }

    /// Current context of the thread, as long as its display still knows it
    pub fn get_current_context(&self, thread: &EglThread) -> Option<ContextHandle> {
        let binding = thread.binding()?;
        binding
            .display
            .get_context(binding.context.handle())
            .map(|context| context.handle())
    }

    /// Current read or draw surface of the thread, as long as its display
    /// still knows it
    pub fn get_current_surface(&self, thread: &mut EglThread, which: EGLint) -> Result<Option<SurfaceHandle>> {
        let result = ReadDraw::from_code(which)
            .ok_or(EglError::BadParameter)
            .map(|which| {
                let binding = thread.binding()?;
                let surface = match which {
                    ReadDraw::Read => &binding.read,
                    ReadDraw::Draw => &binding.draw,
                };
                binding
                    .display
                    .get_surface(surface.handle())
                    .map(|surface| surface.handle())
            });
        thread.check(result)
    }

    pub fn get_current_display(&self, thread: &EglThread) -> Option<DisplayHandle> {
        thread.cached_display_handle()
    }

    /// Release whatever the thread has current
    pub fn release_thread(&self, thread: &mut EglThread) -> Result<()> {
        let result = release_current(thread);
        thread.check(result)
    }

    pub fn bind_api(&self, thread: &mut EglThread, api: EGLint) -> Result<()> {
        let result = match api {
            EGL_OPENGL_ES_API => {
                thread.set_api(ClientApiKind::OpenGlEs);
                Ok(())
            }
            _ => Err(EglError::BadParameter),
        };
        thread.check(result)
    }

    pub fn query_api(&self, thread: &EglThread) -> EGLint {
        thread.api().code()
    }

    /// Wait for the current context's commands to complete
    pub fn wait_client(&self, thread: &mut EglThread) -> Result<()> {
        if let Some(binding) = thread.binding() {
            let context = &binding.context;
            context.client().finish(context.client_context());
        }
        Ok(())
    }

    /// Error recorded by the last failed call, reset to success
    pub fn get_error(&self, thread: &mut EglThread) -> EGLint {
        thread.get_error().code()
    }

    // Images

    /// Snapshot a texture of `context` into a new image
    pub fn create_image(
        &self,
        thread: &mut EglThread,
        display: DisplayHandle,
        context: ContextHandle,
        target: EGLint,
        texture: LocalName,
        attribs: &[EGLint],
    ) -> Result<ImageHandle> {
        let result = self.new_image(display, context, target, texture, attribs);
        thread.check(result)
    }

    fn new_image(
        &self,
        handle: DisplayHandle,
        context: ContextHandle,
        target: EGLint,
        texture: LocalName,
        attribs: &[EGLint],
    ) -> Result<ImageHandle> {
        let display = self.info.initialized_display(handle)?;
        let context = display.get_context(context).ok_or(EglError::BadContext)?;
        if target != EGL_GL_TEXTURE_2D_KHR {
            return Err(EglError::BadParameter);
        }
        attrib_pairs(attribs)?;

        let group = context.share_group();
        let global = group
            .global_name_of(ObjectKind::Texture, texture)
            .ok_or(EglError::BadParameter)?;
        let data = group.get_object_data(ObjectKind::Texture, texture);
        let texture_data = data
            .as_deref()
            .and_then(ObjectData::as_texture)
            .filter(|data| data.width > 0 && data.height > 0)
            .ok_or(EglError::BadMatch)?;

        let globals = self.info.globals().clone();
        let image = Image::from_texture(texture_data, global, globals);
        debug!("image {:?} from texture {} (global {})", image.handle(), texture, global);
        Ok(display.add_image(Arc::new(image)))
    }

    pub fn destroy_image(&self, thread: &mut EglThread, display: DisplayHandle, image: ImageHandle) -> Result<()> {
        let result = self.info.initialized_display(display).and_then(|display| {
            if display.remove_image(image) {
                Ok(())
            } else {
                Err(EglError::BadParameter)
            }
        });
        thread.check(result)
    }

    /// Record that the current context references `image`
    pub fn attach_image(&self, thread: &mut EglThread, image: ImageHandle) -> Result<()> {
        let result = current_image(thread, image).map(|(context, image)| {
            context.attach_image(image);
        });
        thread.check(result)
    }

    pub fn detach_image(&self, thread: &mut EglThread, image: ImageHandle) -> Result<()> {
        let result = thread
            .binding()
            .ok_or(EglError::BadContext)
            .and_then(|binding| {
                binding
                    .context
                    .detach_image(image)
                    .map(drop)
                    .ok_or(EglError::BadParameter)
            });
        thread.check(result)
    }

    /// Make `texture` of the current context sample from `image`
    pub fn image_target_texture(&self, thread: &mut EglThread, image: ImageHandle, texture: LocalName) -> Result<()> {
        let result = current_image(thread, image)
            .and_then(|(context, image)| bind_texture_image(&context, image, texture));
        thread.check(result)
    }

    /// Point `texture` of the current context back at its own storage
    pub fn release_texture_image(&self, thread: &mut EglThread, texture: LocalName) -> Result<()> {
        let result = thread
            .binding()
            .ok_or(EglError::BadContext)
            .and_then(|binding| unbind_texture_image(&binding.context, texture));
        thread.check(result)
    }

    // Procedures

    /// Resolve an extension function by name
    pub fn get_proc_address(&self, name: &str) -> Option<ProcAddress> {
        if name.starts_with("egl") {
            return EGL_EXTENSION_PROCS
                .iter()
                .find(|(proc_name, _)| *proc_name == name)
                .map(|(_, ext)| ProcAddress::Translator(*ext));
        }
        self.info
            .client_extension(name)
            .or_else(|| self.info.engine().proc_address(name))
            .map(ProcAddress::Client)
    }
}

fn ids(configs: &[Arc<Config>]) -> Vec<ConfigId> {
    configs.iter().map(|config| config.id()).collect()
}

fn config_of(display: &Display, id: ConfigId) -> Result<Arc<Config>> {
    display.get_config(id).ok_or(EglError::BadConfig)
}

/// Unbind the thread's context, flushing it first
fn release_current(thread: &mut EglThread) -> Result<()> {
    let Some(binding) = thread.binding() else {
        return Ok(());
    };
    let context = &binding.context;
    context.client().flush(context.client_context());
    if !binding.display.backend().make_current(None, None, None) {
        return Err(EglError::BadAccess);
    }

    if let Some(binding) = thread.take_binding() {
        let surfaces = binding.context.clear_surfaces();
        binding.context.release(thread.token());
        debug!("thread {} released {:?}", thread.token(), binding.context.handle());
        drop(surfaces);
    }
    Ok(())
}

/// The current context and the image behind `image`
fn current_image(thread: &EglThread, image: ImageHandle) -> Result<(Arc<Context>, Arc<Image>)> {
    let binding = thread.binding().ok_or(EglError::BadContext)?;
    let context = binding.context.clone();
    let image = binding
        .display
        .get_image(image)
        .or_else(|| context.attached_image(image))
        .ok_or(EglError::BadParameter)?;
    Ok((context, image))
}

fn bind_texture_image(context: &Context, image: Arc<Image>, texture: LocalName) -> Result<()> {
    let group = context.share_group();
    let current = group
        .get_object_data(ObjectKind::Texture, texture)
        .and_then(|data| data.as_texture().cloned());
    let previous_global = group
        .replace_global(ObjectKind::Texture, texture, image.global_texture)
        .ok_or(EglError::BadParameter)?;

    let current = current.unwrap_or_default();
    // A texture moving between images keeps the name of its own storage
    let saved_global = current.saved_global.unwrap_or(previous_global);
    if let Some(old) = current.source_image.map(ImageHandle) {
        if old != image.handle() {
            context.detach_image(old);
        }
    }

    let data = TextureData {
        width: image.width,
        height: image.height,
        border: image.border,
        internal_format: image.internal_format,
        target: current.target,
        source_image: Some(image.handle().0),
        saved_global: Some(saved_global),
    };
    group.set_object_data(ObjectKind::Texture, texture, Arc::new(ObjectData::Texture(data)));
    context.attach_image(image);
    Ok(())
}

fn unbind_texture_image(context: &Context, texture: LocalName) -> Result<()> {
    let group = context.share_group();
    let current = group
        .get_object_data(ObjectKind::Texture, texture)
        .and_then(|data| data.as_texture().cloned())
        .filter(TextureData::is_image_sibling)
        .ok_or(EglError::BadParameter)?;
    let saved = current.saved_global.ok_or(EglError::BadParameter)?;

    group.replace_global(ObjectKind::Texture, texture, saved);
    let data = TextureData {
        source_image: None,
        saved_global: None,
        ..current.clone()
    };
    group.set_object_data(ObjectKind::Texture, texture, Arc::new(ObjectData::Texture(data)));
    if let Some(image) = current.source_image {
        context.detach_image(ImageHandle(image));
    }
    Ok(())
}
