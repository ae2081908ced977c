//! Disk cache for downloaded web fonts
//!
//! Layout: `<cache root>/<FIRST LETTER>/<Family>-<variant><ext>`. The cache
//! root is the configured fonts cache directory, or
//! `<user cache dir>/<app key>/fonts`. Files are never evicted.
//!
//! Downloads land in a hidden sibling file first and are renamed into place,
//! so a file under its final name is always complete.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use fontfind_core::LocateError;

use super::HostIo;
use crate::BackendConfig;

/// Cache folder for `subfolder`, created if missing
pub fn cache_font_dir_path(config: &BackendConfig, io: &dyn HostIo, subfolder: &str) -> Result<PathBuf, LocateError> {
    let dir = match &config.fonts_cache_dir {
        Some(root) => root.join(subfolder),
        None => {
            if config.app_key.is_empty() {
                return Err(LocateError::Config("application key is not set".into()));
            }
            let cache = io
                .user_cache_dir()
                .ok_or_else(|| LocateError::Config("no user cache directory".into()))?;
            cache.join(&config.app_key).join("fonts").join(subfolder)
        }
    };
    tracing::debug!("caching resource in {}", dir.display());
    if !io.exists(&dir) {
        io.create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Make sure `dir/name` exists, downloading it from `url` if not
pub fn cache_file(io: &dyn HostIo, dir: &Path, name: &str, url: &str) -> Result<PathBuf, LocateError> {
    let path = dir.join(name);
    if io.exists(&path) {
        tracing::info!("font already cached: {}", path.display());
        return Ok(path);
    }
    tracing::info!("caching font {} as {}", name, path.display());
    let data = io.http_get(url)?;
    let partial = dir.join(partial_name(name));
    io.write_file(&partial, &data)
        .and_then(|()| io.rename(&partial, &path))
        .inspect_err(|e| {
            tracing::warn!("failed to cache {}: {}", path.display(), e);
            let _ = io.remove_file(&partial);
        })?;
    Ok(path)
}

/// Unique temporary name for a download of `name`
fn partial_name(name: &str) -> String {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    format!(".{}.part-{}-{}", name, std::process::id(), NEXT.fetch_add(1, Ordering::Relaxed))
}
