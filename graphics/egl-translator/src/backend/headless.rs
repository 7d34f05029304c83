//! In-process host backend
//!
//! Keeps every native object as an entry in a table and renders nothing.
//! Used by the test suites and as a fallback where no host GL stack exists.
//! Failure knobs let callers exercise the error paths of the translator.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use gles_names::ShareGroup;
use log::trace;
use parking_lot::Mutex;

use super::{ClientApi, ClientContextId, Engine, NativeDisplay};
use crate::config::{ConfigInfo, PBUFFER_MAX_HEIGHT, PBUFFER_MAX_PIXELS, PBUFFER_MAX_WIDTH};
use crate::surface::PbufferInfo;
use crate::types::{
    Caveat, GlesVersion, NativeContext, NativeDisplayId, NativePixelFormat, NativeSurface,
    NativeWindow, RenderableType, SurfaceType, TransparentType,
};

/// Host windows known to the backend
#[derive(Debug, Clone, Copy)]
struct WindowState {
    width: u32,
    height: u32,
    /// Pixel format fixed by the first surface created on the window
    format: Option<NativePixelFormat>,
}

#[derive(Debug, Clone, Copy)]
enum DrawableState {
    Window(NativeWindow),
    Pbuffer,
}

type DestroyHook = Box<dyn Fn(NativeContext) + Send + Sync>;

struct HostState {
    next_id: AtomicU64,
    configs: Vec<ConfigInfo>,
    refused_displays: Mutex<BTreeSet<NativeDisplayId>>,
    open_displays: AtomicUsize,
    windows: Mutex<BTreeMap<NativeWindow, WindowState>>,
    drawables: Mutex<BTreeMap<NativeSurface, DrawableState>>,
    contexts: Mutex<BTreeSet<NativeContext>>,
    /// Called with each context the translator destroys
    destroy_hook: Mutex<Option<DestroyHook>>,
    fail_contexts: AtomicBool,
    fail_pbuffers: AtomicBool,
    fail_make_current: AtomicBool,
    make_current_calls: AtomicUsize,
    swaps: AtomicUsize,
}

impl HostState {
    fn alloc_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

/// Headless host display system
#[derive(Clone)]
pub struct HeadlessEngine {
    state: Arc<HostState>,
}

impl HeadlessEngine {
    /// Engine offering [`HeadlessEngine::default_configs`]
    pub fn new() -> Self {
        Self::with_configs(Self::default_configs())
    }

    pub fn with_configs(configs: Vec<ConfigInfo>) -> Self {
        Self {
            state: Arc::new(HostState {
                next_id: AtomicU64::new(0x100),
                configs,
                refused_displays: Mutex::new(BTreeSet::new()),
                open_displays: AtomicUsize::new(0),
                windows: Mutex::new(BTreeMap::new()),
                drawables: Mutex::new(BTreeMap::new()),
                contexts: Mutex::new(BTreeSet::new()),
                destroy_hook: Mutex::new(None),
                fail_contexts: AtomicBool::new(false),
                fail_pbuffers: AtomicBool::new(false),
                fail_make_current: AtomicBool::new(false),
                make_current_calls: AtomicUsize::new(0),
                swaps: AtomicUsize::new(0),
            }),
        }
    }

    /// RGBA8888 with depth and stencil, an RGBA8888 pbuffer-only config and
    /// a multisampled RGB888 config
    pub fn default_configs() -> Vec<ConfigInfo> {
        vec![
            host_config(1, [8, 8, 8, 8], 24, 8, 0, SurfaceType::WINDOW | SurfaceType::PBUFFER),
            host_config(2, [8, 8, 8, 8], 0, 0, 0, SurfaceType::PBUFFER),
            host_config(3, [8, 8, 8, 0], 24, 8, 4, SurfaceType::WINDOW | SurfaceType::PBUFFER),
        ]
    }

    /// Make `open_display` fail for `id`
    pub fn refuse_display(&self, id: NativeDisplayId) {
        self.state.refused_displays.lock().insert(id);
    }

    pub fn open_display_count(&self) -> usize {
        self.state.open_displays.load(Ordering::SeqCst)
    }

    /// Create a host window of the given size
    pub fn create_window(&self, width: u32, height: u32) -> NativeWindow {
        let window = NativeWindow(self.state.alloc_id());
        self.state.windows.lock().insert(
            window,
            WindowState {
                width,
                height,
                format: None,
            },
        );
        window
    }

    /// Destroy a host window. Surfaces on it become invalid.
    pub fn close_window(&self, window: NativeWindow) {
        self.state.windows.lock().remove(&window);
    }

    pub fn live_context_count(&self) -> usize {
        self.state.contexts.lock().len()
    }

    pub fn is_live_context(&self, context: NativeContext) -> bool {
        self.state.contexts.lock().contains(&context)
    }

    pub fn pbuffer_count(&self) -> usize {
        self.state
            .drawables
            .lock()
            .values()
            .filter(|drawable| matches!(drawable, DrawableState::Pbuffer))
            .count()
    }

    /// Run `hook` at the start of every `destroy_context`
    pub fn on_destroy_context(&self, hook: impl Fn(NativeContext) + Send + Sync + 'static) {
        *self.state.destroy_hook.lock() = Some(Box::new(hook));
    }

    pub fn set_fail_contexts(&self, fail: bool) {
        self.state.fail_contexts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_pbuffers(&self, fail: bool) {
        self.state.fail_pbuffers.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_make_current(&self, fail: bool) {
        self.state.fail_make_current.store(fail, Ordering::SeqCst);
    }

    pub fn make_current_calls(&self) -> usize {
        self.state.make_current_calls.load(Ordering::SeqCst)
    }

    pub fn swap_count(&self) -> usize {
        self.state.swaps.load(Ordering::SeqCst)
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn host_config(
    id: i32,
    [red, green, blue, alpha]: [i32; 4],
    depth: i32,
    stencil: i32,
    samples: i32,
    surface_type: SurfaceType,
) -> ConfigInfo {
    ConfigInfo {
        red_size: red,
        green_size: green,
        blue_size: blue,
        alpha_size: alpha,
        caveat: Caveat::None,
        config_id: id,
        depth_size: depth,
        frame_buffer_level: 0,
        max_pbuffer_width: PBUFFER_MAX_WIDTH,
        max_pbuffer_height: PBUFFER_MAX_HEIGHT,
        max_pbuffer_size: PBUFFER_MAX_PIXELS,
        native_renderable: false,
        renderable_type: RenderableType::OPENGL_ES | RenderableType::OPENGL_ES2,
        native_visual_id: 0,
        native_visual_type: 0,
        samples_per_pixel: samples,
        stencil_size: stencil,
        surface_type,
        transparent_type: TransparentType::None,
        trans_red_val: 0,
        trans_green_val: 0,
        trans_blue_val: 0,
        format: NativePixelFormat(id as u64),
    }
}

impl Engine for HeadlessEngine {
    fn open_display(&self, id: NativeDisplayId) -> Option<Arc<dyn NativeDisplay>> {
        if self.state.refused_displays.lock().contains(&id) {
            return None;
        }
        self.state.open_displays.fetch_add(1, Ordering::SeqCst);
        Some(Arc::new(HeadlessDisplay {
            state: self.state.clone(),
        }))
    }

    fn create_window_surface(&self, window: NativeWindow) -> Option<NativeSurface> {
        if !self.state.windows.lock().contains_key(&window) {
            return None;
        }
        let surface = NativeSurface(self.state.alloc_id());
        self.state
            .drawables
            .lock()
            .insert(surface, DrawableState::Window(window));
        Some(surface)
    }

    fn proc_address(&self, name: &str) -> Option<usize> {
        // Core entry points only
        name.starts_with("gl").then(|| 0x1_0000 + name.len())
    }
}

/// Connection to the headless host
struct HeadlessDisplay {
    state: Arc<HostState>,
}

impl NativeDisplay for HeadlessDisplay {
    fn query_configs(&self, renderable: RenderableType) -> Vec<ConfigInfo> {
        self.state
            .configs
            .iter()
            .filter(|info| info.renderable_type.intersects(renderable))
            .cloned()
            .collect()
    }

    fn is_valid_window(&self, window: NativeWindow) -> bool {
        self.state.windows.lock().contains_key(&window)
    }

    fn is_valid_surface(&self, surface: NativeSurface) -> bool {
        let drawable = self.state.drawables.lock().get(&surface).copied();
        match drawable {
            Some(DrawableState::Window(window)) => self.is_valid_window(window),
            Some(DrawableState::Pbuffer) => true,
            None => false,
        }
    }

    fn check_window_pixel_format(
        &self,
        window: NativeWindow,
        format: NativePixelFormat,
    ) -> Option<(u32, u32)> {
        let mut windows = self.state.windows.lock();
        let state = windows.get_mut(&window)?;
        match state.format {
            Some(fixed) if fixed != format => None,
            _ => {
                state.format = Some(format);
                Some((state.width, state.height))
            }
        }
    }

    fn create_context(
        &self,
        _format: NativePixelFormat,
        share: Option<NativeContext>,
    ) -> Option<NativeContext> {
        if self.state.fail_contexts.load(Ordering::SeqCst) {
            return None;
        }
        let mut contexts = self.state.contexts.lock();
        if share.map_or(false, |share| !contexts.contains(&share)) {
            return None;
        }
        let context = NativeContext(self.state.alloc_id());
        contexts.insert(context);
        trace!("headless context {:?}", context);
        Some(context)
    }

    fn destroy_context(&self, context: NativeContext) -> bool {
        if let Some(hook) = self.state.destroy_hook.lock().as_ref() {
            hook(context);
        }
        self.state.contexts.lock().remove(&context)
    }

    fn create_pbuffer(
        &self,
        _format: NativePixelFormat,
        _info: &PbufferInfo,
    ) -> Option<NativeSurface> {
        if self.state.fail_pbuffers.load(Ordering::SeqCst) {
            return None;
        }
        let surface = NativeSurface(self.state.alloc_id());
        self.state
            .drawables
            .lock()
            .insert(surface, DrawableState::Pbuffer);
        Some(surface)
    }

    fn release_pbuffer(&self, surface: NativeSurface) -> bool {
        self.state.drawables.lock().remove(&surface).is_some()
    }

    fn make_current(
        &self,
        read: Option<NativeSurface>,
        draw: Option<NativeSurface>,
        context: Option<NativeContext>,
    ) -> bool {
        self.state.make_current_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_make_current.load(Ordering::SeqCst) {
            return false;
        }
        if let Some(context) = context {
            if !self.state.contexts.lock().contains(&context) {
                return false;
            }
        }
        let drawables = self.state.drawables.lock();
        [read, draw]
            .iter()
            .flatten()
            .all(|surface| drawables.contains_key(surface))
    }

    fn swap_buffers(&self, _surface: NativeSurface) {
        self.state.swaps.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) -> bool {
        self.state.open_displays.fetch_sub(1, Ordering::SeqCst);
        true
    }
}

#[derive(Default)]
struct ClientContext {
    flushes: usize,
    finishes: usize,
    share_group: Option<Arc<ShareGroup>>,
}

/// Headless GLES implementation for one version
pub struct HeadlessClient {
    version: GlesVersion,
    initialized: AtomicBool,
    next_id: AtomicU64,
    contexts: Mutex<BTreeMap<ClientContextId, ClientContext>>,
    extensions: &'static [&'static str],
    fail_contexts: AtomicBool,
}

impl HeadlessClient {
    pub fn new(version: GlesVersion) -> Self {
        let extensions: &'static [&'static str] = match version {
            GlesVersion::V1_1 => &[
                "glEGLImageTargetTexture2DOES",
                "glEGLImageTargetRenderbufferStorageOES",
                "glBlendEquationOES",
                "glGenFramebuffersOES",
            ],
            GlesVersion::V2_0 => &[
                "glEGLImageTargetTexture2DOES",
                "glEGLImageTargetRenderbufferStorageOES",
            ],
        };
        Self {
            version,
            initialized: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            contexts: Mutex::new(BTreeMap::new()),
            extensions,
            fail_contexts: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn set_fail_contexts(&self, fail: bool) {
        self.fail_contexts.store(fail, Ordering::SeqCst);
    }

    pub fn context_count(&self) -> usize {
        self.contexts.lock().len()
    }

    pub fn flush_count(&self, context: ClientContextId) -> usize {
        self.contexts.lock().get(&context).map_or(0, |ctx| ctx.flushes)
    }

    pub fn finish_count(&self, context: ClientContextId) -> usize {
        self.contexts.lock().get(&context).map_or(0, |ctx| ctx.finishes)
    }

    /// Share group handed over by the last `init_context`
    pub fn share_group(&self, context: ClientContextId) -> Option<Arc<ShareGroup>> {
        self.contexts
            .lock()
            .get(&context)
            .and_then(|ctx| ctx.share_group.clone())
    }
}

impl ClientApi for HeadlessClient {
    fn version(&self) -> GlesVersion {
        self.version
    }

    fn init(&self) {
        self.initialized.store(true, Ordering::SeqCst);
    }

    fn create_context(&self) -> Option<ClientContextId> {
        if self.fail_contexts.load(Ordering::SeqCst) {
            return None;
        }
        let id = ClientContextId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.contexts.lock().insert(id, ClientContext::default());
        Some(id)
    }

    fn init_context(&self, context: ClientContextId, share_group: &Arc<ShareGroup>) {
        if let Some(ctx) = self.contexts.lock().get_mut(&context) {
            ctx.share_group = Some(share_group.clone());
        }
    }

    fn delete_context(&self, context: ClientContextId) {
        self.contexts.lock().remove(&context);
    }

    fn flush(&self, context: ClientContextId) {
        if let Some(ctx) = self.contexts.lock().get_mut(&context) {
            ctx.flushes += 1;
        }
    }

    fn finish(&self, context: ClientContextId) {
        if let Some(ctx) = self.contexts.lock().get_mut(&context) {
            ctx.finishes += 1;
        }
    }

    fn proc_address(&self, name: &str) -> Option<usize> {
        let base = 0x1000 * (self.version.index() + 1);
        self.extensions
            .iter()
            .position(|ext| *ext == name)
            .map(|pos| base + pos)
    }
}
