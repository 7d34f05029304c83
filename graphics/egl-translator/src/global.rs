//! Process-wide translator state

use std::collections::BTreeMap;
use std::sync::Arc;

use gles_names::GlobalNameSpace;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};

use crate::backend::{ClientApi, Engine};
use crate::display::Display;
use crate::error::{EglError, Result};
use crate::options::TranslatorConfig;
use crate::surface::WindowRegistry;
use crate::types::{DisplayHandle, GlesVersion, NativeDisplayId};

/// GLES extension entry points looked up in the client APIs
const CLIENT_EXTENSIONS: &[&str] = &[
    "glEGLImageTargetTexture2DOES",
    "glEGLImageTargetRenderbufferStorageOES",
    "glBlendEquationSeparateOES",
    "glBlendFuncSeparateOES",
    "glBlendEquationOES",
    "glCurrentPaletteMatrixOES",
    "glLoadPaletteFromModelViewMatrixOES",
    "glMatrixIndexPointerOES",
    "glWeightPointerOES",
    "glDepthRangefOES",
    "glFrustumfOES",
    "glOrthofOES",
    "glClipPlanefOES",
    "glGetClipPlanefOES",
    "glClearDepthfOES",
    "glPointSizePointerOES",
    "glTexGenfOES",
    "glTexGenfvOES",
    "glTexGeniOES",
    "glTexGenivOES",
    "glGetTexGenfvOES",
    "glGetTexGenivOES",
    "glIsRenderbufferOES",
    "glBindRenderbufferOES",
    "glDeleteRenderbuffersOES",
    "glGenRenderbuffersOES",
    "glRenderbufferStorageOES",
    "glGetRenderbufferParameterivOES",
    "glIsFramebufferOES",
    "glBindFramebufferOES",
    "glDeleteFramebuffersOES",
    "glGenFramebuffersOES",
    "glCheckFramebufferStatusOES",
    "glFramebufferTexture2DOES",
    "glFramebufferRenderbufferOES",
    "glGetFramebufferAttachmentParameterivOES",
    "glGenerateMipmapOES",
];

/// Extension entry points a client API resolved
type ExtensionTable = BTreeMap<&'static str, usize>;

/// Every display, the registered client APIs and the shared allocators.
///
/// One instance serves the whole process; entry points reach it through
/// [`crate::Egl`].
pub struct GlobalInfo {
    engine: Arc<dyn Engine>,
    options: TranslatorConfig,
    globals: Arc<GlobalNameSpace>,
    windows: Arc<WindowRegistry>,
    displays: RwLock<BTreeMap<DisplayHandle, Arc<Display>>>,
    clients: RwLock<[Option<Arc<dyn ClientApi>>; GlesVersion::COUNT]>,
    extensions: Mutex<[Option<ExtensionTable>; GlesVersion::COUNT]>,
}

impl GlobalInfo {
    pub fn new(engine: Arc<dyn Engine>, options: TranslatorConfig) -> Self {
        Self {
            engine,
            options,
            globals: Arc::new(GlobalNameSpace::new()),
            windows: Arc::new(WindowRegistry::new()),
            displays: RwLock::new(BTreeMap::new()),
            clients: RwLock::new([None, None]),
            extensions: Mutex::new([None, None]),
        }
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn options(&self) -> &TranslatorConfig {
        &self.options
    }

    /// Allocator of host object names shared by every display
    pub fn globals(&self) -> &Arc<GlobalNameSpace> {
        &self.globals
    }

    pub fn windows(&self) -> &Arc<WindowRegistry> {
        &self.windows
    }

    /// Register the GLES implementation for its version, replacing an
    /// earlier one
    pub fn register_client_api(&self, client: Arc<dyn ClientApi>) {
        let version = client.version();
        client.init();
        self.clients.write()[version.index()] = Some(client);
        info!("{} client API registered", version);
    }

    pub fn client_api(&self, version: GlesVersion) -> Option<Arc<dyn ClientApi>> {
        self.clients.read()[version.index()].clone()
    }

    /// Existing display for `native_id`, or a new one if the engine can open
    /// that native display
    pub fn get_or_create_display(&self, native_id: NativeDisplayId) -> Option<Arc<Display>> {
        if let Some(display) = self.find_display(native_id) {
            return Some(display);
        }

        let backend = self.engine.open_display(native_id)?;
        let display = Arc::new(Display::new(
            native_id,
            backend,
            self.globals.clone(),
            &self.options,
        ));

        let mut displays = self.displays.write();
        if let Some(existing) = displays.values().find(|d| d.native_id() == native_id) {
            return Some(existing.clone());
        }
        displays.insert(display.handle(), display.clone());
        Some(display)
    }

    pub fn find_display(&self, native_id: NativeDisplayId) -> Option<Arc<Display>> {
        self.displays
            .read()
            .values()
            .find(|display| display.native_id() == native_id)
            .cloned()
    }

    /// Display behind `handle`, initialized or not
    pub fn display(&self, handle: DisplayHandle) -> Result<Arc<Display>> {
        self.displays
            .read()
            .get(&handle)
            .cloned()
            .ok_or(EglError::BadDisplay)
    }

    /// Display behind `handle`, which must be initialized
    pub fn initialized_display(&self, handle: DisplayHandle) -> Result<Arc<Display>> {
        let display = self.display(handle)?;
        if !display.is_initialized() {
            return Err(EglError::NotInitialized);
        }
        Ok(display)
    }

    /// Forget a display. It closes once no thread has it bound anymore.
    pub fn remove_display(&self, handle: DisplayHandle) -> bool {
        let removed = self.displays.write().remove(&handle);
        removed.is_some()
    }

    pub fn display_count(&self) -> usize {
        self.displays.read().len()
    }

    /// Resolve the client extension table of `version` once
    pub(crate) fn init_extensions(&self, version: GlesVersion) {
        if self.extensions.lock()[version.index()].is_some() {
            return;
        }
        let Some(client) = self.client_api(version) else {
            return;
        };

        let table: ExtensionTable = CLIENT_EXTENSIONS
            .iter()
            .filter_map(|name| client.proc_address(name).map(|addr| (*name, addr)))
            .collect();
        debug!("{} extension table with {} entries", version, table.len());

        let mut tables = self.extensions.lock();
        tables[version.index()].get_or_insert(table);
    }

    /// Look `name` up in the extension tables built so far
    pub fn client_extension(&self, name: &str) -> Option<usize> {
        self.extensions
            .lock()
            .iter()
            .flatten()
            .find_map(|table| table.get(name).copied())
    }
}

impl core::fmt::Debug for GlobalInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlobalInfo")
            .field("options", &self.options)
            .field("displays", &self.display_count())
            .finish()
    }
}
