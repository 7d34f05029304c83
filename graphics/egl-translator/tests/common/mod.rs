//! Shared setup for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use egl_translator::backend::headless::{HeadlessClient, HeadlessEngine};
use egl_translator::consts::*;
use egl_translator::{
    ConfigId, ContextHandle, DisplayHandle, Egl, EglThread, GlesVersion, NativeDisplayId,
    SurfaceHandle, TranslatorConfig,
};

/// Host config with RGBA8888, depth 24 and stencil 8 for windows and pbuffers
pub const RGBA8888: ConfigId = ConfigId(1);
/// Host config with RGBA8888 and no depth, pbuffers only
pub const RGBA8888_PBUFFER: ConfigId = ConfigId(2);
/// Host config with RGB888, depth 24, stencil 8 and 4 samples
pub const RGB888: ConfigId = ConfigId(3);
/// RGB565 copy of `RGB888` added at initialization
pub const RGB565: ConfigId = ConfigId(4);

pub struct Harness {
    pub egl: Egl,
    pub engine: HeadlessEngine,
    pub es1: Arc<HeadlessClient>,
    pub es2: Arc<HeadlessClient>,
    pub display: DisplayHandle,
}

impl Harness {
    /// Initialized display with both client APIs registered
    pub fn new() -> (Self, EglThread) {
        Self::with_options(TranslatorConfig::default())
    }

    pub fn with_options(options: TranslatorConfig) -> (Self, EglThread) {
        let (harness, mut thread) = Self::uninitialized(options);
        harness.egl.initialize(&mut thread, harness.display).unwrap();
        (harness, thread)
    }

    pub fn uninitialized(options: TranslatorConfig) -> (Self, EglThread) {
        let engine = HeadlessEngine::new();
        let egl = Egl::new(Arc::new(engine.clone()), options);
        let es1 = Arc::new(HeadlessClient::new(GlesVersion::V1_1));
        let es2 = Arc::new(HeadlessClient::new(GlesVersion::V2_0));
        egl.register_client_api(es1.clone());
        egl.register_client_api(es2.clone());

        let display = egl.get_display(NativeDisplayId(0)).unwrap();
        (
            Self {
                egl,
                engine,
                es1,
                es2,
                display,
            },
            EglThread::new(),
        )
    }

    pub fn pbuffer(&self, thread: &mut EglThread, config: ConfigId) -> SurfaceHandle {
        self.egl
            .create_pbuffer_surface(
                thread,
                self.display,
                config,
                &[EGL_WIDTH, 64, EGL_HEIGHT, 64, EGL_NONE],
            )
            .unwrap()
    }

    pub fn window(&self, thread: &mut EglThread, config: ConfigId) -> SurfaceHandle {
        let window = self.engine.create_window(320, 240);
        self.egl
            .create_window_surface(thread, self.display, config, window, &[EGL_NONE])
            .unwrap()
    }

    pub fn context(&self, thread: &mut EglThread, share: Option<ContextHandle>) -> ContextHandle {
        self.egl
            .create_context(thread, self.display, RGBA8888, share, &[EGL_NONE])
            .unwrap()
    }

    pub fn es2_context(&self, thread: &mut EglThread) -> ContextHandle {
        self.egl
            .create_context(
                thread,
                self.display,
                RGBA8888,
                None,
                &[EGL_CONTEXT_CLIENT_VERSION, 2, EGL_NONE],
            )
            .unwrap()
    }

    /// Bind `context` with one pbuffer as read and draw surface
    pub fn bind(&self, thread: &mut EglThread, surface: SurfaceHandle, context: ContextHandle) {
        self.egl
            .make_current(thread, self.display, Some(surface), Some(surface), Some(context))
            .unwrap();
    }
}
