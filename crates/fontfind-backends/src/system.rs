//! System fonts
//!
//! Fonts installed on the host. A fontconfig list, when one is available,
//! is authoritative; otherwise the OS font folders are scanned with
//! `fontdb` once and the faces are ranked with the confidence matcher.

use std::path::Path;
use std::sync::OnceLock;

use fontdb::{Database, Family, Query, Source};
use fontfind_core::{
    Context, Descriptor, FallbackProducer, FontStyle, FontVariantsLocation, FontWeight, LocateError, Locator,
    MatchConfidence, ScalableFont, closest_match,
};

use crate::BackendConfig;
use crate::fontconfig::FontConfigList;

/// Locator over the host's installed fonts
#[derive(Debug)]
pub struct SystemFonts {
    config: BackendConfig,
    fontconfig: OnceLock<Option<FontConfigList>>,
    faces: OnceLock<Vec<FontVariantsLocation>>,
}

impl SystemFonts {
    /// Fonts found through `config`, loaded on first use
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            fontconfig: OnceLock::new(),
            faces: OnceLock::new(),
        }
    }

    /// Locator over an already parsed fontconfig list
    pub fn with_font_config(list: FontConfigList) -> Self {
        let fonts = Self::new(BackendConfig::default());
        let _ = fonts.fontconfig.set(Some(list));
        fonts
    }

    /// Locator over the faces of a font database
    pub fn with_database(db: &Database) -> Self {
        let fonts = Self::new(BackendConfig::default());
        let _ = fonts.fontconfig.set(None);
        let _ = fonts.faces.set(face_locations(db));
        fonts
    }

    fn font_config(&self) -> Option<&FontConfigList> {
        self.fontconfig
            .get_or_init(|| {
                let path = self.config.fontconfig_list_path()?;
                match FontConfigList::load(&path) {
                    Ok(list) => Some(list),
                    Err(e) => {
                        tracing::debug!("no fontconfig list at {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .as_ref()
    }

    fn faces(&self) -> &[FontVariantsLocation] {
        self.faces.get_or_init(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            let faces = face_locations(&db);
            tracing::info!("scanned {} system font faces", faces.len());
            faces
        })
    }

    /// Find an installed font for a descriptor
    pub fn find(&self, desc: &Descriptor) -> Result<ScalableFont, LocateError> {
        if let Some(list) = self.font_config() {
            return match list.find(&desc.pattern, desc.style, desc.weight)? {
                Some(path) => font_at(&desc.pattern, desc.style, desc.weight, &path),
                None => Err(LocateError::NoMatch(format!("no fontconfig font for {}", desc.pattern))),
            };
        }

        let found = closest_match(self.faces(), &desc.pattern, desc.style, desc.weight)?
            .filter(|m| m.confidence > MatchConfidence::LOW)
            .ok_or_else(|| LocateError::NoMatch(format!("no system font for {}", desc.pattern)))?;
        tracing::debug!("{} is a system font: {}", desc.pattern, found.location.path);
        font_at(&desc.pattern, desc.style, desc.weight, Path::new(&found.location.path))
    }
}

impl Locator for SystemFonts {
    fn locate(&self, ctx: &Context, desc: &Descriptor) -> Result<ScalableFont, LocateError> {
        ctx.check()?;
        self.find(desc)
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// Fallback producer picking the system's default sans-serif face
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFallback;

impl FallbackProducer for SystemFallback {
    fn produce(&self) -> Result<ScalableFont, LocateError> {
        let mut db = Database::new();
        db.load_system_fonts();
        let id = db
            .query(&Query {
                families: &[Family::SansSerif, Family::Serif, Family::Monospace],
                ..Default::default()
            })
            .ok_or_else(|| LocateError::NoMatch("no system fallback font".into()))?;
        let face = db
            .face(id)
            .ok_or_else(|| LocateError::NoMatch("system fallback face vanished".into()))?;
        let path = face_path(&face.source)
            .ok_or_else(|| LocateError::NoMatch("system fallback font is not a file".into()))?;
        let family = face.families.first().map(|(name, _)| name.as_str()).unwrap_or("fallback");
        let weight = FontWeight::from_css_value(face.weight.0);
        font_at(family, convert_style(face.style), weight, path)
    }
}

/// One single-variant location per file-backed face, collections skipped
fn face_locations(db: &Database) -> Vec<FontVariantsLocation> {
    db.faces()
        .filter_map(|face| {
            let path = face_path(&face.source)?;
            if face.index > 0 || is_collection(path) {
                return None;
            }
            let family = face.families.first()?.0.clone();
            Some(FontVariantsLocation {
                family,
                variants: vec![face_variant(face.style, face.weight)],
                path: path.to_string_lossy().into_owned(),
            })
        })
        .collect()
}

/// Variant tag in web font notation: "regular", "italic" or a CSS weight
fn face_variant(style: fontdb::Style, weight: fontdb::Weight) -> String {
    match style {
        fontdb::Style::Italic => "italic".to_string(),
        fontdb::Style::Oblique => "oblique".to_string(),
        fontdb::Style::Normal if weight.0 == 400 => "regular".to_string(),
        fontdb::Style::Normal => weight.0.to_string(),
    }
}

fn convert_style(style: fontdb::Style) -> FontStyle {
    match style {
        fontdb::Style::Normal => FontStyle::Normal,
        fontdb::Style::Italic => FontStyle::Italic,
        fontdb::Style::Oblique => FontStyle::Oblique,
    }
}

fn face_path(source: &Source) -> Option<&Path> {
    match source {
        Source::File(path) => Some(path),
        Source::SharedFile(path, _) => Some(path),
        Source::Binary(_) => None,
    }
}

fn is_collection(path: &Path) -> bool {
    path.extension()
        .map(|ext| matches!(ext.to_string_lossy().to_lowercase().as_str(), "ttc" | "otc"))
        .unwrap_or(false)
}

/// Font living at `path`, split into directory and file name
fn font_at(name: &str, style: FontStyle, weight: FontWeight, path: &Path) -> Result<ScalableFont, LocateError> {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(file)) => Ok(ScalableFont::in_dir(name, style, weight, dir, &file.to_string_lossy())),
        _ => Err(LocateError::NoMatch(format!("bad font file path {}", path.display()))),
    }
}
