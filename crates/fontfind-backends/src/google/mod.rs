//! Google Fonts locator
//!
//! Looks requests up in the Google Fonts directory, picks the closest
//! variant and downloads the font file into the disk cache. The directory
//! is fetched once per locator; an API key must be configured or set as
//! `GOOGLE_FONTS_API_KEY`.

mod cache;
mod io;

pub use cache::{cache_file, cache_font_dir_path};
pub use io::{HostIo, SystemIo};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use fontfind_core::{
    Context, Descriptor, FontStyle, FontVariantsLocation, FontWeight, LocateError, Locator, MatchConfidence,
    ScalableFont, closest_match,
};
use regex::RegexBuilder;
use serde::Deserialize;
use url::Url;

use crate::BackendConfig;

/// Google Fonts developer API endpoint
pub const GOOGLE_FONTS_API: &str = "https://www.googleapis.com/webfonts/v1/webfonts";

/// One family of the web font directory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebFontInfo {
    #[serde(flatten)]
    pub location: FontVariantsLocation,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub subsets: Vec<String>,
    /// Variant tag to download URL
    #[serde(default)]
    pub files: HashMap<String, String>,
}

#[derive(Deserialize)]
struct DirectoryResponse {
    #[serde(default)]
    items: Vec<WebFontInfo>,
}

/// The decoded web font directory
#[derive(Debug, Clone, Default)]
pub struct WebFontDirectory {
    items: Vec<WebFontInfo>,
    locations: Vec<FontVariantsLocation>,
}

impl WebFontDirectory {
    pub fn new(items: Vec<WebFontInfo>) -> Self {
        let locations = items.iter().map(|item| item.location.clone()).collect();
        Self { items, locations }
    }

    /// Decode the directory service's JSON response
    pub fn from_json(data: &[u8]) -> Result<Self, LocateError> {
        let response: DirectoryResponse = serde_json::from_slice(data)
            .map_err(|e| LocateError::Decode(format!("could not decode fonts list: {}", e)))?;
        Ok(Self::new(response.items))
    }

    pub fn items(&self) -> &[WebFontInfo] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Best family and variant for a request, if better than low confidence
    pub fn closest(
        &self,
        pattern: &str,
        style: FontStyle,
        weight: FontWeight,
    ) -> Result<Option<(&WebFontInfo, String)>, LocateError> {
        let Some(found) = closest_match(&self.locations, pattern, style, weight)? else {
            return Ok(None);
        };
        if found.confidence <= MatchConfidence::LOW {
            tracing::debug!("Google font {} matches only with {:?}", found.location.family, found.confidence);
            return Ok(None);
        }
        let index = self
            .locations
            .iter()
            .position(|location| std::ptr::eq(location, found.location));
        Ok(index.map(|i| (&self.items[i], found.variant.to_string())))
    }
}

/// Locator backed by the Google Fonts service
pub struct GoogleFonts {
    config: BackendConfig,
    io: Arc<dyn HostIo>,
    directory: OnceLock<Result<WebFontDirectory, String>>,
}

impl GoogleFonts {
    pub fn new(config: BackendConfig) -> Self {
        Self::with_io(config, Arc::new(SystemIo::new()))
    }

    /// Locator using a custom host, for tests
    pub fn with_io(config: BackendConfig, io: Arc<dyn HostIo>) -> Self {
        Self {
            config,
            io,
            directory: OnceLock::new(),
        }
    }

    fn api_key(&self) -> Option<String> {
        self.config
            .google_fonts_api_key
            .clone()
            .or_else(|| self.io.getenv("GOOGLE_FONTS_API_KEY"))
            .filter(|key| !key.is_empty())
    }

    /// The service directory, fetched on first use
    ///
    /// A failed fetch is remembered and not retried.
    pub fn directory(&self) -> Result<&WebFontDirectory, LocateError> {
        let key = self.api_key().ok_or_else(|| {
            tracing::error!("Google fonts API key not set");
            LocateError::Config(
                "Google Fonts API key must be configured or set as GOOGLE_FONTS_API_KEY; \
                 see https://developers.google.com/fonts/docs/developer_api"
                    .into(),
            )
        })?;
        self.directory
            .get_or_init(|| self.fetch_directory(&key).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| LocateError::Http(format!("Google Fonts directory unavailable: {}", e)))
    }

    fn fetch_directory(&self, key: &str) -> Result<WebFontDirectory, LocateError> {
        tracing::info!("setting up Google Fonts service directory");
        let url = Url::parse_with_params(GOOGLE_FONTS_API, &[("sort", "alpha"), ("key", key)])
            .map_err(|e| LocateError::Config(e.to_string()))?;
        let data = self.io.http_get(url.as_str()).inspect_err(|e| {
            tracing::error!("Google Fonts API request not OK: {}", e);
        })?;
        let directory = WebFontDirectory::from_json(&data)?;
        tracing::info!("transferred list of {} fonts from Google Fonts service", directory.len());
        Ok(directory)
    }

    /// Find a web font and make sure it is in the disk cache
    pub fn find(&self, ctx: &Context, desc: &Descriptor) -> Result<ScalableFont, LocateError> {
        let directory = self.directory()?;
        let (info, variant) = directory
            .closest(&desc.pattern, desc.style, desc.weight)?
            .ok_or_else(|| LocateError::NoMatch(format!("no Google font matches {}", desc.pattern)))?;
        tracing::debug!("found Google font {} ({})", info.location.family, variant);

        ctx.check()?;
        let (dir, name) = self.cache_font(info, &variant)?;
        Ok(ScalableFont::in_dir(&name, desc.style, desc.weight, dir, &name))
    }

    fn cache_font(&self, info: &WebFontInfo, variant: &str) -> Result<(PathBuf, String), LocateError> {
        let family = &info.location.family;
        let url = info.files.get(variant).ok_or_else(|| {
            LocateError::NoMatch(format!("no variant equals {}, cannot cache {}", variant, family))
        })?;
        let letter: String = family
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .ok_or_else(|| LocateError::Decode("Google font without family name".into()))?;
        let dir = cache_font_dir_path(&self.config, self.io.as_ref(), &letter)?;
        let name = format!("{}-{}{}", family, variant, file_extension(url));
        cache_file(self.io.as_ref(), &dir, &name, url)?;
        Ok((dir, name))
    }

    /// Log the directory entries whose family matches `pattern`
    pub fn log_fonts(&self, pattern: &str) {
        let directory = match self.directory() {
            Ok(directory) => directory,
            Err(e) => {
                tracing::error!("unable to list Google fonts: {}", e);
                return;
            }
        };
        let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => re,
            Err(e) => {
                tracing::error!("cannot list Google fonts: invalid pattern: {}", e);
                return;
            }
        };
        tracing::info!("{} fonts in Google font list", directory.len());
        tracing::info!("======================================");
        for (i, info) in directory.items().iter().enumerate() {
            if !re.is_match(&info.location.family) {
                continue;
            }
            tracing::info!("[{:4}] {:<20}: {}", i, info.location.family, info.version);
            tracing::info!("       subsets: {:?}", info.subsets);
            let mut files: Vec<_> = info.files.iter().collect();
            files.sort();
            for (variant, url) in files {
                tracing::info!("       - {:<18}: {}", variant, file_extension(url));
            }
        }
    }
}

impl Locator for GoogleFonts {
    fn locate(&self, ctx: &Context, desc: &Descriptor) -> Result<ScalableFont, LocateError> {
        ctx.check()?;
        self.find(ctx, desc)
    }

    fn name(&self) -> &str {
        "google-fonts"
    }
}

impl std::fmt::Debug for GoogleFonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleFonts")
            .field("app_key", &self.config.app_key)
            .field("directory_loaded", &self.directory.get().is_some())
            .finish()
    }
}

/// Extension of the file a URL points to, with the dot
fn file_extension(file_url: &str) -> String {
    let path = Url::parse(file_url)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| file_url.to_string());
    Path::new(&path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
