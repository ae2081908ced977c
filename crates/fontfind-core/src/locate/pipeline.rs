//! Resolver Pipeline
//!
//! Registry lookup, then each locator in turn, then the fallback font.
//! Every `resolve` call runs on its own blocking task; there is no limit on
//! how many resolutions are in flight.

use std::sync::Arc;

use super::{Context, FontPromise, Locator, ignore_context};
use crate::font::{Descriptor, ScalableFont};
use crate::registry::{FontCache, normalize_font_name};
use crate::{LocateError, ResolveError, Result};

/// Orchestrates locators over a font cache
#[derive(Clone)]
pub struct ResolverPipeline {
    registry: Arc<dyn FontCache>,
    locators: Vec<Arc<dyn Locator>>,
}

impl ResolverPipeline {
    /// Create a pipeline trying `locators` in the given order
    pub fn new(registry: Arc<dyn FontCache>, locators: Vec<Arc<dyn Locator>>) -> Self {
        Self { registry, locators }
    }

    /// Append a locator, tried after all existing ones
    pub fn with_locator(mut self, locator: impl Locator + 'static) -> Self {
        self.locators.push(Arc::new(locator));
        self
    }

    pub fn registry(&self) -> &Arc<dyn FontCache> {
        &self.registry
    }

    /// Number of locators
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Resolve a font in the background
    ///
    /// Returns at once. The promise delivers the cached or located font, a
    /// `NotFound` error carrying the fallback font, or the context error if
    /// `ctx` ended before a result was found.
    pub fn resolve(&self, ctx: &Context, desc: Descriptor) -> FontPromise {
        let (fulfiller, promise) = FontPromise::pending();
        let ctx = ctx.clone();
        let registry = self.registry.clone();
        let locators = self.locators.clone();
        smol::unblock(move || {
            let result = search_scalable_font(&ctx, registry.as_ref(), &desc, &locators);
            if fulfiller.fulfil(result).is_err() {
                tracing::debug!("font promise for {} dropped before delivery", desc.pattern);
            }
        })
        .detach();
        promise
    }

    /// Resolve on the calling thread
    pub fn resolve_blocking(&self, ctx: &Context, desc: &Descriptor) -> Result<ScalableFont> {
        search_scalable_font(ctx, self.registry.as_ref(), desc, &self.locators)
    }
}

impl std::fmt::Debug for ResolverPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.locators.iter().map(|l| l.name()).collect();
        f.debug_struct("ResolverPipeline")
            .field("locators", &names)
            .finish()
    }
}

/// Resolve with context-naive locators and a background context
pub fn resolve_font_loc<F>(
    registry: Arc<dyn FontCache>,
    desc: Descriptor,
    locators: impl IntoIterator<Item = F>,
) -> FontPromise
where
    F: Fn(&Descriptor) -> std::result::Result<ScalableFont, LocateError> + Send + Sync + 'static,
{
    let locators = locators
        .into_iter()
        .map(|f| Arc::new(ignore_context(f)) as Arc<dyn Locator>)
        .collect();
    ResolverPipeline::new(registry, locators).resolve(&Context::background(), desc)
}

/// Resolve with context-aware locators under `ctx`
pub fn resolve_font_loc_with_context(
    ctx: &Context,
    registry: Arc<dyn FontCache>,
    desc: Descriptor,
    locators: Vec<Arc<dyn Locator>>,
) -> FontPromise {
    ResolverPipeline::new(registry, locators).resolve(ctx, desc)
}

fn search_scalable_font(
    ctx: &Context,
    registry: &dyn FontCache,
    desc: &Descriptor,
    locators: &[Arc<dyn Locator>],
) -> Result<ScalableFont> {
    ctx.check()?;

    let name = normalize_font_name(&desc.pattern, desc.style, desc.weight);
    if let Some(font) = registry.get_font(&name) {
        return Ok(font);
    }

    for locator in locators {
        ctx.check()?;
        match locator.locate(ctx, desc) {
            Ok(font) => {
                tracing::debug!("{} found font {} for {}", locator.name(), font.name, name);
                registry.store_font(&name, font.clone());
                return Ok(font);
            }
            Err(LocateError::InvalidPattern(msg)) => {
                return Err(ResolveError::InvalidPattern(msg));
            }
            Err(err) => {
                // Cancellation during the call wins over the backend's own error
                ctx.check()?;
                tracing::debug!("{} cannot resolve {}: {}", locator.name(), name, err);
            }
        }
    }

    tracing::info!("no locator resolved {}, using fallback font", name);
    let fallback = registry.fallback_font()?;
    Err(ResolveError::NotFound {
        key: name,
        fallback: Box::new(fallback),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontStyle, FontWeight};
    use crate::locate::{ContextError, locator_fn};
    use crate::registry::{FALLBACK_KEY, FontRegistry};

    fn font(name: &str) -> ScalableFont {
        ScalableFont::in_dir(name, FontStyle::Normal, FontWeight::Normal, "/fonts", name)
    }

    fn registry() -> Arc<FontRegistry> {
        Arc::new(FontRegistry::from_fn(|| Ok(font("Fallback.ttf"))))
    }

    fn declining() -> Arc<dyn Locator> {
        Arc::new(locator_fn(|_, desc| Err(LocateError::NoMatch(desc.pattern.clone()))))
    }

    #[test]
    fn test_first_successful_locator_wins() {
        let registry = registry();
        let pipeline = ResolverPipeline::new(registry.clone(), vec![declining()])
            .with_locator(locator_fn(|_, _| Ok(font("Go.ttf"))))
            .with_locator(locator_fn(|_, _| Ok(font("Other.ttf"))));
        let found = pipeline.resolve(&Context::background(), Descriptor::new("Go")).wait();
        assert_eq!(found.unwrap(), font("Go.ttf"));
        assert_eq!(registry.get_font("go-normal-normal"), Some(font("Go.ttf")));
    }

    #[test]
    fn test_invalid_pattern_not_masked() {
        let registry = registry();
        let pipeline = ResolverPipeline::new(registry.clone(), Vec::new())
            .with_locator(locator_fn(|_, desc| Err(LocateError::InvalidPattern(desc.pattern.clone()))))
            .with_locator(locator_fn(|_, _| Ok(font("Go.ttf"))));
        let err = pipeline.resolve(&Context::background(), Descriptor::new("Go(")).wait().unwrap_err();
        assert!(matches!(err, ResolveError::InvalidPattern(_)));
        assert!(!registry.contains(FALLBACK_KEY));
    }

    #[test]
    fn test_cancel_during_locator_call() {
        let ctx = Context::background();
        let pipeline = ResolverPipeline::new(registry(), Vec::new())
            .with_locator(locator_fn(|ctx, _| {
                ctx.cancel();
                Err(LocateError::NoMatch("gone".into()))
            }))
            .with_locator(locator_fn(|_, _| Ok(font("Go.ttf"))));
        let err = pipeline.resolve_blocking(&ctx, &Descriptor::new("Go")).unwrap_err();
        assert!(matches!(err, ResolveError::Cancelled(ContextError::Canceled)));
    }

    #[test]
    fn test_fallback_failure_yields_no_font() {
        let registry = Arc::new(FontRegistry::from_fn(|| Err(LocateError::NoMatch("none packaged".into()))));
        let pipeline = ResolverPipeline::new(registry, vec![declining()]);
        let err = pipeline.resolve_blocking(&Context::background(), &Descriptor::new("Go")).unwrap_err();
        assert!(matches!(err, ResolveError::Fallback(_)));
        assert!(err.font().is_none());
    }

    fn packaged_bold(desc: &Descriptor) -> std::result::Result<ScalableFont, LocateError> {
        Ok(ScalableFont::in_dir(&desc.pattern, desc.style, desc.weight, "/fonts", "Go-Bold.ttf"))
    }

    #[test]
    fn test_resolve_font_loc_adapts_naive_locators() {
        let registry = registry();
        let found = resolve_font_loc(registry, Descriptor::new("Go").bold(), [packaged_bold])
            .wait()
            .unwrap();
        assert_eq!(found.weight, FontWeight::Bold);
        assert_eq!(found.path, "Go-Bold.ttf");
    }
}
