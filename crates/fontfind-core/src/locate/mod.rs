//! Font location
//!
//! The [`Locator`] capability every backend implements, and the resolver
//! pipeline that tries locators in order behind the registry cache.

mod context;
mod pipeline;
mod promise;

pub use context::{Context, ContextError};
pub use pipeline::{ResolverPipeline, resolve_font_loc, resolve_font_loc_with_context};
pub use promise::FontPromise;

use crate::LocateError;
use crate::font::{Descriptor, ScalableFont};

/// A backend able to find a font for a descriptor
///
/// "No match" is reported as an error; every `Ok` counts as a success.
/// Implementations should check `ctx` where they can, but a call that
/// blocks is allowed to finish.
pub trait Locator: Send + Sync {
    fn locate(&self, ctx: &Context, desc: &Descriptor) -> Result<ScalableFont, LocateError>;

    /// Name used in log messages
    fn name(&self) -> &str {
        "locator"
    }
}

impl<F> Locator for F
where
    F: Fn(&Context, &Descriptor) -> Result<ScalableFont, LocateError> + Send + Sync,
{
    fn locate(&self, ctx: &Context, desc: &Descriptor) -> Result<ScalableFont, LocateError> {
        self(ctx, desc)
    }
}

/// Fix the signature of a context-aware closure locator
pub fn locator_fn<F>(f: F) -> F
where
    F: Fn(&Context, &Descriptor) -> Result<ScalableFont, LocateError> + Send + Sync,
{
    f
}

/// A context-naive locator, see [`ignore_context`]
#[derive(Debug, Clone)]
pub struct ContextFree<F>(F);

impl<F> Locator for ContextFree<F>
where
    F: Fn(&Descriptor) -> Result<ScalableFont, LocateError> + Send + Sync,
{
    fn locate(&self, _ctx: &Context, desc: &Descriptor) -> Result<ScalableFont, LocateError> {
        (self.0)(desc)
    }
}

/// Adapt a locator that knows nothing about cancellation
pub fn ignore_context<F>(f: F) -> ContextFree<F>
where
    F: Fn(&Descriptor) -> Result<ScalableFont, LocateError> + Send + Sync,
{
    ContextFree(f)
}
