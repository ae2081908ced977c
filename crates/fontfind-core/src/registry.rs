//! Font Registry
//!
//! Caches resolved fonts under a normalized name, and holds the fallback
//! font once it has been produced.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::font::{FontStyle, FontWeight, ScalableFont};
use crate::LocateError;

/// Registry key reserved for the fallback font
pub const FALLBACK_KEY: &str = "fallback";

/// Produces the font used when no backend matches a request
pub trait FallbackProducer: Send + Sync {
    fn produce(&self) -> Result<ScalableFont, LocateError>;
}

impl<F> FallbackProducer for F
where
    F: Fn() -> Result<ScalableFont, LocateError> + Send + Sync,
{
    fn produce(&self) -> Result<ScalableFont, LocateError> {
        self()
    }
}

/// Registry error
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("fallback font unavailable: {0}")]
    FallbackUnavailable(#[source] LocateError),
}

/// Cache contract required by the resolver pipeline
pub trait FontCache: Send + Sync {
    /// Look up a font; never has side effects
    fn get_font(&self, key: &str) -> Option<ScalableFont>;

    /// Store a font unless `key` is already bound
    fn store_font(&self, key: &str, font: ScalableFont);

    /// The fallback font, produced on first use
    fn fallback_font(&self) -> Result<ScalableFont, RegistryError>;
}

/// Derive the registry key for a request
///
/// The pattern is trimmed, inner spaces become `_`, a trailing font file
/// extension is dropped and the result is lower-cased; style and weight are
/// always appended, so a request key never equals [`FALLBACK_KEY`].
///
/// Patterns are regular expressions, so any other `.` is part of the key.
pub fn normalize_font_name(pattern: &str, style: FontStyle, weight: FontWeight) -> String {
    let mut name = pattern.trim().replace(' ', "_");
    if let Some((stem, ext)) = name.rsplit_once('.') {
        if !stem.is_empty() && FONT_FILE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            name.truncate(stem.len());
        }
    }
    format!("{}-{}-{}", name.to_lowercase(), style.name(), weight.name())
}

const FONT_FILE_EXTENSIONS: [&str; 6] = ["ttf", "otf", "ttc", "otc", "woff", "woff2"];

/// Thread-safe resolution cache
pub struct FontRegistry {
    typefaces: Mutex<HashMap<String, ScalableFont>>,
    producer: Box<dyn FallbackProducer>,
    /// Serializes fallback production; never held together with `typefaces`
    producing: Mutex<()>,
}

impl FontRegistry {
    /// Create an empty registry with the given fallback producer
    pub fn new(producer: impl FallbackProducer + 'static) -> Self {
        Self {
            typefaces: Mutex::new(HashMap::new()),
            producer: Box::new(producer),
            producing: Mutex::new(()),
        }
    }

    /// Create a registry whose fallback comes from a closure
    pub fn from_fn<F>(producer: F) -> Self
    where
        F: Fn() -> Result<ScalableFont, LocateError> + Send + Sync + 'static,
    {
        Self::new(producer)
    }

    /// Look up a font by normalized name
    pub fn get_font(&self, key: &str) -> Option<ScalableFont> {
        tracing::debug!("registry searches for font {}", key);
        let found = self.typefaces.lock().unwrap().get(key).cloned();
        match &found {
            Some(_) => tracing::info!("registry found font {}", key),
            None => tracing::info!("registry does not contain font {}", key),
        }
        found
    }

    /// Push a font into the registry if `key` isn't bound yet
    ///
    /// An already bound key is never overwritten. Fonts without a name or a
    /// path are rejected.
    pub fn store_font(&self, key: &str, font: ScalableFont) {
        if !font.is_usable() {
            tracing::error!("registry cannot store null font under {}", key);
            return;
        }
        let mut typefaces = self.typefaces.lock().unwrap();
        if !typefaces.contains_key(key) {
            tracing::debug!("registry stores font {} as {}", font.name, key);
            typefaces.insert(key.to_string(), font);
        }
    }

    /// Return the fallback font, producing and caching it on first use
    ///
    /// The producer runs at most once, even with concurrent callers, unless
    /// it fails; a failed production is retried by the next call.
    pub fn fallback_font(&self) -> Result<ScalableFont, RegistryError> {
        if let Some(font) = self.cached_fallback() {
            return Ok(font);
        }
        let _producing = self.producing.lock().unwrap();
        if let Some(font) = self.cached_fallback() {
            return Ok(font);
        }
        let font = self.producer.produce().map_err(|e| {
            tracing::error!("cannot produce fallback font: {}", e);
            RegistryError::FallbackUnavailable(e)
        })?;
        if !font.is_usable() {
            tracing::error!("fallback producer returned an unusable font");
            return Err(RegistryError::FallbackUnavailable(LocateError::NoMatch(
                "fallback producer returned null font".into(),
            )));
        }
        tracing::info!("font registry caches fallback font {}", font.name);
        self.typefaces
            .lock()
            .unwrap()
            .insert(FALLBACK_KEY.to_string(), font.clone());
        Ok(font)
    }

    fn cached_fallback(&self) -> Option<ScalableFont> {
        self.typefaces.lock().unwrap().get(FALLBACK_KEY).cloned()
    }

    /// Check whether a key is bound
    pub fn contains(&self, key: &str) -> bool {
        self.typefaces.lock().unwrap().contains_key(key)
    }

    /// Number of cached entries, fallback included
    pub fn len(&self) -> usize {
        self.typefaces.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dump all cached fonts at info level
    pub fn log_font_list(&self) {
        let typefaces = self.typefaces.lock().unwrap();
        tracing::info!("--- registered fonts ---");
        let mut keys: Vec<&String> = typefaces.keys().collect();
        keys.sort();
        for key in keys {
            let font = &typefaces[key];
            tracing::info!("typeface [{}] = {} @ {}", key, font.name, font.path);
        }
        tracing::info!("------------------------");
    }
}

impl FontCache for FontRegistry {
    fn get_font(&self, key: &str) -> Option<ScalableFont> {
        FontRegistry::get_font(self, key)
    }

    fn store_font(&self, key: &str, font: ScalableFont) {
        FontRegistry::store_font(self, key, font)
    }

    fn fallback_font(&self) -> Result<ScalableFont, RegistryError> {
        FontRegistry::fallback_font(self)
    }
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
