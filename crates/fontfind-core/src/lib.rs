//! fontfind core - Font Location Engine
//!
//! This crate locates scalable fonts for a requested family pattern, style
//! and weight:
//! - Confidence matching of font variants against a request
//! - A thread-safe resolution cache with a lazily created fallback font
//! - An asynchronous resolver pipeline over pluggable backends
//! - Single-shot, cancellable promises for in-flight resolutions
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use fontfind_core::{Descriptor, FontRegistry, ResolverPipeline, Context};
//!
//! let registry = Arc::new(FontRegistry::new(my_fallback));
//! let pipeline = ResolverPipeline::new(registry, vec![Arc::new(my_locator)]);
//! let font = pipeline.resolve(&Context::background(), Descriptor::new("Go")).wait()?;
//! ```

pub mod font;
pub mod registry;
pub mod locate;

pub use font::{Descriptor, FontSource, FontStyle, FontWeight, ScalableFont};
pub use font::matching::{
    ClosestMatch, FontVariantsLocation, MatchConfidence, MatchError, WeightTag,
    closest_match, guess_style_and_weight, match_style, match_weight, matches_file_name,
};
pub use registry::{FALLBACK_KEY, FallbackProducer, FontCache, FontRegistry, RegistryError, normalize_font_name};
pub use locate::{
    Context, ContextError, ContextFree, FontPromise, Locator, ResolverPipeline, ignore_context,
    locator_fn, resolve_font_loc, resolve_font_loc_with_context,
};

/// Error reported by a single backend when it cannot satisfy a request
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("No matching font: {0}")]
    NoMatch(String),

    #[error("Invalid font name pattern: {0}")]
    InvalidPattern(String),

    #[error("Font search cancelled: {0}")]
    Cancelled(#[from] ContextError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Decoding failed: {0}")]
    Decode(String),

    #[error("Backend not configured: {0}")]
    Config(String),
}

impl From<MatchError> for LocateError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::InvalidPattern(e) => LocateError::InvalidPattern(e.to_string()),
        }
    }
}

/// Outcome of a resolution that did not produce an exact match
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid font name pattern: {0}")]
    InvalidPattern(String),

    #[error("Font resolution cancelled: {0}")]
    Cancelled(#[from] ContextError),

    /// Every backend declined; `fallback` is still usable.
    #[error("Font not found: {key}")]
    NotFound {
        key: String,
        fallback: Box<ScalableFont>,
    },

    #[error("No font found and fallback unavailable: {0}")]
    Fallback(#[from] RegistryError),

    #[error("Font promise result was already taken")]
    AlreadyConsumed,

    #[error("Font resolution ended without a result")]
    Aborted,
}

impl ResolveError {
    /// The usable font carried by a degraded resolution, if any
    pub fn font(&self) -> Option<&ScalableFont> {
        match self {
            ResolveError::NotFound { fallback, .. } => Some(fallback),
            _ => None,
        }
    }

    /// Consume the error, keeping a degraded font if there is one
    pub fn into_font(self) -> Option<ScalableFont> {
        match self {
            ResolveError::NotFound { fallback, .. } => Some(*fallback),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveError::Cancelled(_))
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
