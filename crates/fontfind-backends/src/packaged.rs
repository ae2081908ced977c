//! Packaged fonts
//!
//! Fonts shipped with the application, either as a directory next to the
//! binary or compiled in as a static table. Files are matched by name, see
//! [`matches_file_name`].

use std::path::PathBuf;

use fontfind_core::{
    Context, Descriptor, FallbackProducer, FontStyle, FontWeight, LocateError, Locator, ScalableFont,
    guess_style_and_weight, matches_file_name,
};

/// Font files compiled into the binary: `(file name, data)`
pub type EmbeddedFonts = &'static [(&'static str, &'static [u8])];

const FONT_EXTENSIONS: [&str; 6] = ["ttf", "otf", "ttc", "otc", "woff", "woff2"];

#[derive(Debug, Clone)]
enum Storage {
    Dir(PathBuf),
    Embedded(EmbeddedFonts),
}

/// Locator and fallback producer over packaged font files
#[derive(Debug, Clone)]
pub struct PackagedFonts {
    storage: Storage,
}

impl PackagedFonts {
    /// Fonts in a directory (not searched recursively)
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            storage: Storage::Dir(dir.into()),
        }
    }

    /// Fonts compiled into the binary
    pub fn embedded(fonts: EmbeddedFonts) -> Self {
        Self {
            storage: Storage::Embedded(fonts),
        }
    }

    /// Font file names, sorted
    pub fn file_names(&self) -> Result<Vec<String>, LocateError> {
        let mut names = match &self.storage {
            Storage::Dir(dir) => {
                let mut names = Vec::new();
                for entry in std::fs::read_dir(dir)? {
                    let entry = entry?;
                    if !entry.file_type()?.is_file() {
                        continue;
                    }
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if is_font_file(&name) {
                        names.push(name);
                    }
                }
                names
            }
            Storage::Embedded(fonts) => fonts
                .iter()
                .map(|(name, _)| name.to_string())
                .filter(|name| is_font_file(name))
                .collect(),
        };
        names.sort();
        Ok(names)
    }

    /// Find the first packaged file matching a descriptor
    pub fn find(&self, desc: &Descriptor) -> Result<ScalableFont, LocateError> {
        let name = self
            .file_names()?
            .into_iter()
            .find(|name| matches_file_name(name, &desc.pattern, desc.style, desc.weight))
            .ok_or_else(|| LocateError::NoMatch(format!("no packaged font for {}", desc.pattern)))?;
        tracing::debug!("found packaged font file {}", name);
        Ok(self.font(&name, desc.style, desc.weight))
    }

    fn font(&self, name: &str, style: FontStyle, weight: FontWeight) -> ScalableFont {
        match &self.storage {
            Storage::Dir(dir) => ScalableFont::in_dir(name, style, weight, dir.clone(), name),
            Storage::Embedded(fonts) => {
                let data = fonts
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, data)| *data)
                    .unwrap_or_default();
                ScalableFont::embedded(name, style, weight, data)
            }
        }
    }
}

impl Locator for PackagedFonts {
    fn locate(&self, _ctx: &Context, desc: &Descriptor) -> Result<ScalableFont, LocateError> {
        self.find(desc)
    }

    fn name(&self) -> &str {
        "packaged"
    }
}

impl FallbackProducer for PackagedFonts {
    /// The first regular upright font, else the first font file
    fn produce(&self) -> Result<ScalableFont, LocateError> {
        let names = self.file_names()?;
        let regular = names
            .iter()
            .find(|name| guess_style_and_weight(name) == (FontStyle::Normal, FontWeight::Normal));
        let name = regular
            .or_else(|| names.first())
            .ok_or_else(|| LocateError::NoMatch("no packaged fonts".into()))?;
        let (style, weight) = guess_style_and_weight(name);
        Ok(self.font(name, style, weight))
    }
}

fn is_font_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| FONT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
