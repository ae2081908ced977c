//! Host I/O for the web font client
//!
//! Everything the client does outside the process goes through [`HostIo`],
//! so tests can run it against an in-memory host.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fontfind_core::LocateError;

/// Environment, network and file system access
pub trait HostIo: Send + Sync {
    fn getenv(&self, key: &str) -> Option<String>;

    /// GET a URL, failing on any non-success status
    fn http_get(&self, url: &str) -> Result<Vec<u8>, LocateError>;

    fn user_cache_dir(&self) -> Option<PathBuf>;

    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and its parents (mode 0750 on unix)
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Move a file into place, replacing any file at `to`
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// The real host: process environment, `reqwest` and `std::fs`
#[derive(Debug, Clone)]
pub struct SystemIo {
    user_agent: String,
    timeout: Duration,
}

impl SystemIo {
    pub fn new() -> Self {
        Self {
            user_agent: concat!("fontfind/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SystemIo {
    fn default() -> Self {
        Self::new()
    }
}

impl HostIo for SystemIo {
    fn getenv(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn http_get(&self, url: &str) -> Result<Vec<u8>, LocateError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(|e| LocateError::Http(e.to_string()))?;

        // The error text of reqwest carries the URL, which may hold an API key
        let response = client
            .get(url)
            .send()
            .map_err(|e| LocateError::Http(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocateError::Http(format!("request not OK, status = {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .map_err(|e| LocateError::Http(e.without_url().to_string()))?;
        tracing::debug!("received {} bytes", body.len());
        Ok(body.to_vec())
    }

    fn user_cache_dir(&self) -> Option<PathBuf> {
        crate::config::user_cache_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o750);
        }
        builder.create(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        std::fs::write(path, data)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}
