//! EGL translator
//!
//! Guest processes call EGL against virtual handles. This crate keeps the
//! registry that maps those handles onto host resources: displays with
//! their configs, contexts, surfaces and images, plus the per-thread
//! "current" state.
//!
//! # Architecture
//!
//! ```text
//!  guest thread ──► EglThread (binding, last error, API)
//!        │
//!        ▼
//!  ┌────────────────────────────────────────────┐
//!  │ Egl ──► GlobalInfo                         │
//!  │           ├─ displays ──► Display          │
//!  │           │                 ├─ configs     │
//!  │           │                 ├─ contexts ───┼──► ShareGroup (gles-names)
//!  │           │                 ├─ surfaces    │
//!  │           │                 └─ images      │
//!  │           ├─ client APIs (GLES 1.1 / 2.0)  │
//!  │           └─ GlobalNameSpace, windows      │
//!  └───────────────────┬────────────────────────┘
//!                      ▼
//!          Engine / NativeDisplay (host)
//! ```
//!
//! Host access goes through the traits in [`backend`]; [`backend::headless`]
//! implements them in memory.
//!
//! # Usage
//!
//! ```ignore
//! use egl_translator::backend::headless::{HeadlessClient, HeadlessEngine};
//! use egl_translator::{Egl, EglThread, GlesVersion, NativeDisplayId, TranslatorConfig};
//!
//! let engine = HeadlessEngine::new();
//! let egl = Egl::new(Arc::new(engine.clone()), TranslatorConfig::from_env());
//! egl.register_client_api(Arc::new(HeadlessClient::new(GlesVersion::V1_1)));
//!
//! let mut thread = EglThread::new();
//! let display = egl.get_display(NativeDisplayId(0)).unwrap();
//! egl.initialize(&mut thread, display)?;
//!
//! let config = egl.choose_config(&mut thread, display, &[EGL_NONE], Some(1))?[0];
//! let surface = egl.create_pbuffer_surface(&mut thread, display, config, &[EGL_WIDTH, 64, EGL_HEIGHT, 64, EGL_NONE])?;
//! let context = egl.create_context(&mut thread, display, config, None, &[EGL_NONE])?;
//! egl.make_current(&mut thread, display, Some(surface), Some(surface), Some(context))?;
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod consts;
pub mod context;
pub mod display;
pub mod error;
pub mod global;
pub mod image;
pub mod options;
pub mod surface;
pub mod thread;
pub mod types;
pub mod validate;

pub use api::{Egl, EglExtension, ProcAddress, EGL_VERSION_MAJOR, EGL_VERSION_MINOR};
pub use config::{Config, ConfigInfo, ConfigRequest};
pub use context::Context;
pub use display::Display;
pub use error::{EglError, ErrorCode, Result};
pub use global::GlobalInfo;
pub use image::Image;
pub use options::{SharePolicy, TranslatorConfig};
pub use surface::{PbufferInfo, Surface, SurfaceKind, WindowRegistry};
pub use thread::{Binding, EglThread};
pub use types::*;
