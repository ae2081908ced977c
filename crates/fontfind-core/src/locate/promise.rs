//! Font Promise
//!
//! Handle to an in-flight resolution. The background task delivers exactly
//! one result; the first successful wait takes it, later waits get
//! [`ResolveError::AlreadyConsumed`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use smol::channel::{Receiver, Sender};
use smol::future;

use super::Context;
use crate::font::ScalableFont;
use crate::{ResolveError, Result};

/// Sending half of a [`FontPromise`]
#[derive(Debug)]
pub(crate) struct Fulfiller {
    tx: Sender<Result<ScalableFont>>,
    delivered: Arc<AtomicBool>,
}

impl Fulfiller {
    /// Deliver the result; gives it back if the promise was dropped
    pub(crate) fn fulfil(self, result: Result<ScalableFont>) -> std::result::Result<(), Result<ScalableFont>> {
        // Set before the value can be received, so a waiter that later finds
        // the channel drained knows another waiter took it
        self.delivered.store(true, Ordering::SeqCst);
        self.tx.send_blocking(result).map_err(|e| e.into_inner())
    }
}

/// Single-shot, cancellable result of [`super::ResolverPipeline::resolve`]
#[derive(Debug)]
pub struct FontPromise {
    rx: Receiver<Result<ScalableFont>>,
    delivered: Arc<AtomicBool>,
}

impl FontPromise {
    /// A pending promise and the handle that fulfils it
    pub(crate) fn pending() -> (Fulfiller, Self) {
        let (tx, rx) = smol::channel::bounded(1);
        let delivered = Arc::new(AtomicBool::new(false));
        let fulfiller = Fulfiller {
            tx,
            delivered: delivered.clone(),
        };
        (fulfiller, Self { rx, delivered })
    }

    /// A promise that is already fulfilled
    pub fn ready(result: Result<ScalableFont>) -> Self {
        let (fulfiller, promise) = Self::pending();
        // Capacity 1 and a live receiver: cannot block or fail
        let _ = fulfiller.fulfil(result);
        promise
    }

    /// Block until the font is resolved
    pub fn wait(&self) -> Result<ScalableFont> {
        self.wait_with_context(&Context::background())
    }

    /// Block until the font is resolved or `ctx` ends
    ///
    /// If `ctx` ends first the background resolution keeps running and its
    /// result stays available to a later wait.
    pub fn wait_with_context(&self, ctx: &Context) -> Result<ScalableFont> {
        smol::block_on(self.resolved(ctx))
    }

    /// Await the font, or the end of `ctx`
    pub async fn resolved(&self, ctx: &Context) -> Result<ScalableFont> {
        let delivered = async {
            match self.rx.recv().await {
                Ok(result) => result,
                Err(_) if self.delivered.load(Ordering::SeqCst) => Err(ResolveError::AlreadyConsumed),
                Err(_) => Err(ResolveError::Aborted),
            }
        };
        let abandoned = async { Err(ResolveError::Cancelled(ctx.done().await)) };
        future::or(delivered, abandoned).await
    }

    /// True once the background task has delivered and nobody took the result yet
    pub fn is_ready(&self) -> bool {
        !self.rx.is_empty()
    }
}
