//! Resolve a font with the default backends
//!
//! Usage: `cargo run --example resolve -- <pattern> [italic] [bold]`
//!
//! Configuration comes from the environment (`FONTFIND_APP_KEY`,
//! `FONTFIND_PACKAGED_FONTS`, `GOOGLE_FONTS_API_KEY`, ...). Set `RUST_LOG`
//! to see what the backends do.

use std::time::Duration;

use fontfind_backends::{BackendConfig, default_pipeline, global_registry};
use fontfind_core::{Context, Descriptor, ResolveError};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(pattern) = args.next() else {
        eprintln!("usage: resolve <pattern> [italic] [bold]");
        std::process::exit(2);
    };
    let mut desc = Descriptor::new(&pattern);
    for flag in args {
        desc = match flag.as_str() {
            "italic" => desc.italic(),
            "bold" => desc.bold(),
            other => {
                eprintln!("unknown flag {other}");
                std::process::exit(2);
            }
        };
    }

    let config = BackendConfig::from_env();
    let registry = global_registry();
    let pipeline = default_pipeline(&config, registry.clone());
    tracing::info!("resolving {:?} with {:?}", desc, pipeline);

    let ctx = Context::with_timeout(Duration::from_secs(60));
    match pipeline.resolve(&ctx, desc).wait_with_context(&ctx) {
        Ok(font) => println!("found {}", font),
        Err(ResolveError::NotFound { key, fallback }) => {
            println!("no font for {}, using fallback {}", key, fallback);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
    registry.log_font_list();
}
