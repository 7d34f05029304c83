//! Display registry
//!
//! A [`Display`] owns the sorted configs of one native display and the
//! handle-keyed collections of contexts, surfaces and images created on it.
//! The registry lock is only held while a collection is touched; objects
//! leaving a collection are dropped after the lock is released since their
//! destructors call into the host.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gles_names::{GlobalNameSpace, ObjectNameManager};
use log::{debug, info, warn};
use parking_lot::Mutex;
use spin::Once;

use crate::backend::NativeDisplay;
use crate::config::{Config, ConfigRequest};
use crate::consts::EGLint;
use crate::context::Context;
use crate::image::Image;
use crate::options::{SharePolicy, TranslatorConfig};
use crate::surface::Surface;
use crate::types::{
    alloc_display_handle, ConfigId, ContextHandle, DisplayHandle, GlesVersion, ImageHandle,
    NativeContext, NativeDisplayId, RenderableType, SurfaceHandle,
};

/// Color layouts offered even when the host lists no config for them
const SYNTHESIZED_LAYOUTS: [[EGLint; 4]; 2] = [[5, 6, 5, 0], [8, 8, 8, 0]];

#[derive(Default)]
struct Registry {
    contexts: BTreeMap<ContextHandle, Arc<Context>>,
    surfaces: BTreeMap<SurfaceHandle, Arc<Surface>>,
    images: BTreeMap<ImageHandle, Arc<Image>>,
}

/// One native display and everything created on it
pub struct Display {
    handle: DisplayHandle,
    native_id: NativeDisplayId,
    backend: Arc<dyn NativeDisplay>,
    initialized: AtomicBool,
    configs: Once<Vec<Arc<Config>>>,
    registry: Mutex<Registry>,
    /// One share universe per GLES version
    managers: [Arc<ObjectNameManager>; GlesVersion::COUNT],
    share_policy: SharePolicy,
    synthesize_configs: bool,
    dedicated_share: Mutex<Option<NativeContext>>,
}

impl Display {
    pub fn new(
        native_id: NativeDisplayId,
        backend: Arc<dyn NativeDisplay>,
        globals: Arc<GlobalNameSpace>,
        options: &TranslatorConfig,
    ) -> Self {
        let handle = alloc_display_handle();
        info!("display {:?} opened for native display {:?}", handle, native_id);
        Self {
            handle,
            native_id,
            backend,
            initialized: AtomicBool::new(false),
            configs: Once::new(),
            registry: Mutex::new(Registry::default()),
            managers: [
                Arc::new(ObjectNameManager::new(globals.clone())),
                Arc::new(ObjectNameManager::new(globals)),
            ],
            share_policy: options.share_policy,
            synthesize_configs: options.synthesize_configs,
            dedicated_share: Mutex::new(None),
        }
    }

    pub fn handle(&self) -> DisplayHandle {
        self.handle
    }

    pub fn native_id(&self) -> NativeDisplayId {
        self.native_id
    }

    pub fn backend(&self) -> &Arc<dyn NativeDisplay> {
        &self.backend
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Load the configs usable for `renderable`. Configs are loaded on the
    /// first call only; later calls just mark the display initialized again.
    pub fn initialize(&self, renderable: RenderableType) {
        self.configs.call_once(|| self.load_configs(renderable));
        self.initialized.store(true, Ordering::Release);
        info!(
            "display {:?} initialized with {} configs",
            self.handle,
            self.configs().len()
        );
    }

    fn load_configs(&self, renderable: RenderableType) -> Vec<Arc<Config>> {
        let mut configs: Vec<Config> = self
            .backend
            .query_configs(renderable)
            .iter()
            .map(Config::from_info)
            .collect();
        configs.sort();

        if self.synthesize_configs {
            for [red, green, blue, alpha] in SYNTHESIZED_LAYOUTS {
                synthesize(&mut configs, red, green, blue, alpha);
            }
        }

        #[cfg(feature = "debug-logging")]
        for config in &configs {
            debug!("{}", config);
        }

        configs.into_iter().map(Arc::new).collect()
    }

    /// Drop every context and surface. Configs and images stay.
    pub fn terminate(&self) {
        self.initialized.store(false, Ordering::Release);
        let (contexts, surfaces) = {
            let mut registry = self.registry.lock();
            (
                core::mem::take(&mut registry.contexts),
                core::mem::take(&mut registry.surfaces),
            )
        };
        info!(
            "display {:?} terminated, dropping {} contexts and {} surfaces",
            self.handle,
            contexts.len(),
            surfaces.len()
        );
        drop(contexts);
        drop(surfaces);
    }

    /// Sorted configs, empty before the first initialization
    pub fn configs(&self) -> &[Arc<Config>] {
        self.configs.get().map_or(&[], Vec::as_slice)
    }

    pub fn config_count(&self) -> usize {
        self.configs().len()
    }

    pub fn get_config(&self, id: ConfigId) -> Option<Arc<Config>> {
        self.configs().iter().find(|config| config.id() == id).cloned()
    }

    /// Configs in sorted order, at most `capacity` of them. A capacity of
    /// zero counts as no limit.
    pub fn get_configs(&self, capacity: Option<usize>) -> Vec<Arc<Config>> {
        self.configs().iter().take(limit_of(capacity)).cloned().collect()
    }

    /// Configs matching `request` in sorted order, at most `limit` of them.
    /// With no limit, or a limit of zero, every match is returned.
    pub fn choose_configs(&self, request: &ConfigRequest, limit: Option<usize>) -> Vec<Arc<Config>> {
        self.configs()
            .iter()
            .filter(|config| config.matches(request))
            .take(limit_of(limit))
            .cloned()
            .collect()
    }

    /// Register `context`. Adding a registered context returns its handle
    /// again.
    pub fn add_context(&self, context: Arc<Context>) -> ContextHandle {
        let handle = context.handle();
        self.registry.lock().contexts.entry(handle).or_insert(context);
        handle
    }

    pub fn get_context(&self, handle: ContextHandle) -> Option<Arc<Context>> {
        self.registry.lock().contexts.get(&handle).cloned()
    }

    pub fn remove_context(&self, handle: ContextHandle) -> bool {
        let removed = self.registry.lock().contexts.remove(&handle);
        removed.is_some()
    }

    pub fn context_count(&self) -> usize {
        self.registry.lock().contexts.len()
    }

    pub fn add_surface(&self, surface: Arc<Surface>) -> SurfaceHandle {
        let handle = surface.handle();
        self.registry.lock().surfaces.entry(handle).or_insert(surface);
        handle
    }

    pub fn get_surface(&self, handle: SurfaceHandle) -> Option<Arc<Surface>> {
        self.registry.lock().surfaces.get(&handle).cloned()
    }

    pub fn remove_surface(&self, handle: SurfaceHandle) -> bool {
        let removed = self.registry.lock().surfaces.remove(&handle);
        removed.is_some()
    }

    pub fn surface_count(&self) -> usize {
        self.registry.lock().surfaces.len()
    }

    pub fn add_image(&self, image: Arc<Image>) -> ImageHandle {
        let handle = image.handle();
        self.registry.lock().images.entry(handle).or_insert(image);
        handle
    }

    pub fn get_image(&self, handle: ImageHandle) -> Option<Arc<Image>> {
        self.registry.lock().images.get(&handle).cloned()
    }

    pub fn remove_image(&self, handle: ImageHandle) -> bool {
        let removed = self.registry.lock().images.remove(&handle);
        removed.is_some()
    }

    pub fn image_count(&self) -> usize {
        self.registry.lock().images.len()
    }

    /// Name manager of the share universe for `version`
    pub fn manager(&self, version: GlesVersion) -> &Arc<ObjectNameManager> {
        &self.managers[version.index()]
    }

    /// Native context every new native context shares host objects with
    pub fn global_shared_context(&self) -> Option<NativeContext> {
        match self.share_policy {
            SharePolicy::Registry => GlesVersion::ALL
                .iter()
                .find_map(|version| self.manager(*version).get_global_context_key())
                .map(|key| NativeContext(key.0)),
            SharePolicy::Dedicated => self.dedicated_context(),
        }
    }

    /// Never-current context created from the first config on first use
    fn dedicated_context(&self) -> Option<NativeContext> {
        if let Some(context) = *self.dedicated_share.lock() {
            return Some(context);
        }

        let format = self.configs().first()?.format();
        let created = self.backend.create_context(format, None)?;

        let mut slot = self.dedicated_share.lock();
        match *slot {
            Some(existing) => {
                drop(slot);
                // Lost the race to another thread
                self.backend.destroy_context(created);
                Some(existing)
            }
            None => {
                *slot = Some(created);
                debug!("display {:?} dedicated share context {:?}", self.handle, created);
                Some(created)
            }
        }
    }
}

/// Number of entries a caller-supplied limit allows. Zero is the size query
/// of the two-call convention and means "all of them".
fn limit_of(limit: Option<usize>) -> usize {
    limit.filter(|n| *n > 0).unwrap_or(usize::MAX)
}

/// Add a copy of the best config offering at least `red/green/blue/alpha`
/// under the exact layout, unless a config already has it
fn synthesize(configs: &mut Vec<Config>, red: EGLint, green: EGLint, blue: EGLint, alpha: EGLint) {
    let layout = [red, green, blue, alpha];
    if configs.iter().any(|config| config.color_layout() == layout) {
        return;
    }

    let request = ConfigRequest::color_layout(red, green, blue, alpha);
    let Some(base) = configs.iter().find(|config| config.matches(&request)) else {
        return;
    };

    let next_id = configs.iter().map(|config| config.id().0).max().unwrap_or(0) + 1;
    let synthesized = base.with_color_layout(ConfigId(next_id), red, green, blue, alpha);
    debug!(
        "synthesized config {} ({}{}{}{}) from config {}",
        next_id,
        red,
        green,
        blue,
        alpha,
        base.id()
    );
    configs.push(synthesized);
    configs.sort();
}

impl Drop for Display {
    fn drop(&mut self) {
        let registry = core::mem::take(self.registry.get_mut());
        drop(registry);

        if let Some(context) = self.dedicated_share.get_mut().take() {
            self.backend.destroy_context(context);
        }
        if !self.backend.release() {
            warn!("host refused to release display {:?}", self.native_id);
        }
        info!("display {:?} closed", self.handle);
    }
}

impl core::fmt::Debug for Display {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Display")
            .field("handle", &self.handle)
            .field("native_id", &self.native_id)
            .field("initialized", &self.is_initialized())
            .field("configs", &self.config_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::info;

    fn layouts(configs: &[Config]) -> Vec<(EGLint, [EGLint; 4])> {
        configs.iter().map(|c| (c.id().0, c.color_layout())).collect()
    }

    #[test]
    fn test_synthesize_missing_layout() {
        let mut configs = vec![Config::from_info(&info(1, [8, 8, 8, 8], 24))];
        synthesize(&mut configs, 5, 6, 5, 0);
        assert_eq!(layouts(&configs), vec![(2, [5, 6, 5, 0]), (1, [8, 8, 8, 8])]);
        assert_eq!(configs[0].native_id(), ConfigId(1));
    }

    #[test]
    fn test_synthesize_skips_present_layout() {
        let mut configs = vec![
            Config::from_info(&info(1, [5, 6, 5, 0], 16)),
            Config::from_info(&info(2, [8, 8, 8, 8], 24)),
        ];
        synthesize(&mut configs, 5, 6, 5, 0);
        assert_eq!(configs.len(), 2);
    }

    #[test]
    fn test_synthesize_needs_depth() {
        let mut configs = vec![Config::from_info(&info(1, [8, 8, 8, 8], 0))];
        synthesize(&mut configs, 8, 8, 8, 0);
        assert_eq!(configs.len(), 1);
    }
}
