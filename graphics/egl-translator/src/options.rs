//! Translator configuration

/// How a display picks the native context new contexts share with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePolicy {
    /// Share with any context already registered in the name managers
    Registry,
    /// Share with a never-current context owned by the display, for hosts
    /// that cannot share with a context current on another thread
    Dedicated,
}

/// Translator configuration
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Reported by `query_string(EGL_VENDOR)`
    pub vendor: String,
    /// Reported by `query_string(EGL_EXTENSIONS)`
    pub extensions: String,
    /// Add 5-6-5 and 8-8-8 configs the host does not list
    pub synthesize_configs: bool,
    pub share_policy: SharePolicy,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            vendor: String::from("Google"),
            extensions: String::from("EGL_KHR_image_base EGL_KHR_gl_texture_2D_image"),
            synthesize_configs: true,
            share_policy: SharePolicy::Registry,
        }
    }
}

impl TranslatorConfig {
    /// Defaults overridden by `EGL_TRANSLATOR_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("EGL_TRANSLATOR_VENDOR") {
            config.vendor = val;
        }

        if let Some(val) = lookup("EGL_TRANSLATOR_EXTENSIONS") {
            config.extensions = val;
        }

        if let Some(val) = lookup("EGL_TRANSLATOR_SYNTHESIZE_CONFIGS") {
            config.synthesize_configs = val == "1" || val.to_lowercase() == "true";
        }

        if let Some(val) = lookup("EGL_TRANSLATOR_SHARE_POLICY") {
            config.share_policy = match val.to_lowercase().as_str() {
                "dedicated" => SharePolicy::Dedicated,
                _ => SharePolicy::Registry,
            };
        }

        config
    }
}
