//! fontfind backends
//!
//! Locators for the fontfind resolver pipeline:
//! - Fonts packaged with the application (directory or compiled in)
//! - Installed system fonts, via a fontconfig list or a font folder scan
//! - Google Fonts, downloaded into a per-user disk cache
//!
//! and the composition root wiring them behind a process-wide registry.

pub mod config;
pub mod fontconfig;
pub mod google;
pub mod packaged;
pub mod system;

pub use config::BackendConfig;
pub use fontconfig::FontConfigList;
pub use google::{GoogleFonts, HostIo, SystemIo, WebFontDirectory, WebFontInfo};
pub use packaged::{EmbeddedFonts, PackagedFonts};
pub use system::{SystemFallback, SystemFonts};

use std::sync::{Arc, OnceLock};

use fontfind_core::{FallbackProducer, FontCache, FontRegistry, LocateError, Locator, ResolverPipeline, ScalableFont};

/// Backend setup error
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Fallback producers tried in order until one yields a font
#[derive(Default)]
pub struct FallbackChain {
    producers: Vec<Box<dyn FallbackProducer>>,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, producer: impl FallbackProducer + 'static) -> Self {
        self.producers.push(Box::new(producer));
        self
    }

    /// Packaged fonts if configured, then the system's sans-serif face
    pub fn from_config(config: &BackendConfig) -> Self {
        let mut chain = Self::new();
        if let Some(dir) = &config.packaged_fonts_dir {
            chain = chain.with(PackagedFonts::from_dir(dir));
        }
        chain.with(SystemFallback)
    }
}

impl FallbackProducer for FallbackChain {
    fn produce(&self) -> std::result::Result<ScalableFont, LocateError> {
        let mut last = LocateError::NoMatch("no fallback producers".into());
        for producer in &self.producers {
            match producer.produce() {
                Ok(font) => return Ok(font),
                Err(e) => {
                    tracing::debug!("fallback producer failed: {}", e);
                    last = e;
                }
            }
        }
        Err(last)
    }
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("producers", &self.producers.len())
            .finish()
    }
}

static GLOBAL_REGISTRY: OnceLock<Arc<FontRegistry>> = OnceLock::new();

/// The process-wide registry, configured from the environment on first use
pub fn global_registry() -> Arc<FontRegistry> {
    GLOBAL_REGISTRY
        .get_or_init(|| {
            let config = BackendConfig::from_env();
            Arc::new(FontRegistry::new(FallbackChain::from_config(&config)))
        })
        .clone()
}

/// Locators for `config`, in resolution order
///
/// Packaged fonts (if a directory is configured), then system fonts, then
/// Google Fonts (if an API key is configured or in the environment).
pub fn default_locators(config: &BackendConfig) -> Vec<Arc<dyn Locator>> {
    let mut locators: Vec<Arc<dyn Locator>> = Vec::new();
    if let Some(dir) = &config.packaged_fonts_dir {
        locators.push(Arc::new(PackagedFonts::from_dir(dir)));
    }
    locators.push(Arc::new(SystemFonts::new(config.clone())));
    let has_key = config.google_fonts_api_key.as_deref().is_some_and(|key| !key.is_empty())
        || std::env::var("GOOGLE_FONTS_API_KEY").is_ok_and(|key| !key.is_empty());
    if has_key {
        locators.push(Arc::new(GoogleFonts::new(config.clone())));
    }
    locators
}

/// Pipeline over the default locators and `registry`
pub fn default_pipeline(config: &BackendConfig, registry: Arc<dyn FontCache>) -> ResolverPipeline {
    ResolverPipeline::new(registry, default_locators(config))
}
