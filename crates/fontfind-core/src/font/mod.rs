//! Font request and font reference types

pub mod matching;

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

/// Font weight, as an ordinal around `Normal`
///
/// Each level corresponds to a CSS weight value (`Thin` = 100 ... `Black` = 900).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(i8)]
pub enum FontWeight {
    Thin = -3,
    ExtraLight = -2,
    Light = -1,
    #[default]
    Normal = 0,
    Medium = 1,
    SemiBold = 2,
    Bold = 3,
    ExtraBold = 4,
    Black = 5,
}

impl FontWeight {
    /// All weights, thinnest first
    pub const ALL: [FontWeight; 9] = [
        FontWeight::Thin,
        FontWeight::ExtraLight,
        FontWeight::Light,
        FontWeight::Normal,
        FontWeight::Medium,
        FontWeight::SemiBold,
        FontWeight::Bold,
        FontWeight::ExtraBold,
        FontWeight::Black,
    ];

    /// Ordinal value (-3..=5)
    pub fn ordinal(self) -> i8 {
        self as i8
    }

    /// CSS `font-weight` value (100..=900)
    pub fn css_value(self) -> u16 {
        (i16::from(self.ordinal()) * 100 + 400) as u16
    }

    /// Closest named weight for a CSS value
    pub fn from_css_value(value: u16) -> Self {
        let value = value.clamp(100, 900);
        let ordinal = ((value + 50) / 100) as i8 - 4;
        Self::from_ordinal(ordinal).unwrap_or_default()
    }

    pub fn from_ordinal(ordinal: i8) -> Option<Self> {
        Self::ALL.iter().copied().find(|w| w.ordinal() == ordinal)
    }

    /// Lower-case name, used in cache keys
    pub fn name(self) -> &'static str {
        match self {
            FontWeight::Thin => "thin",
            FontWeight::ExtraLight => "extralight",
            FontWeight::Light => "light",
            FontWeight::Normal => "normal",
            FontWeight::Medium => "medium",
            FontWeight::SemiBold => "semibold",
            FontWeight::Bold => "bold",
            FontWeight::ExtraBold => "extrabold",
            FontWeight::Black => "black",
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn name(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A font request: family-name pattern, style and weight
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    /// Family name pattern (a regular expression for most backends)
    pub pattern: String,
    /// Desired style
    pub style: FontStyle,
    /// Desired weight
    pub weight: FontWeight,
}

impl Descriptor {
    /// Create a descriptor for a normal, regular-weight font
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            style: FontStyle::Normal,
            weight: FontWeight::Normal,
        }
    }

    /// Set font weight
    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Set font style
    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Set bold weight
    pub fn bold(self) -> Self {
        self.weight(FontWeight::Bold)
    }

    /// Set italic style
    pub fn italic(self) -> Self {
        self.style(FontStyle::Italic)
    }
}

/// Where a font's bytes live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// Directory on disk; the font's `path` is relative to it
    Dir(PathBuf),
    /// Font data compiled into the binary
    Static(&'static [u8]),
}

/// Reference to a scalable font's data, not the parsed font itself
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScalableFont {
    /// Font name as reported by the backend (usually a file name)
    pub name: String,
    pub style: FontStyle,
    pub weight: FontWeight,
    /// Virtual file system holding the font, `None` for the null font
    pub source: Option<FontSource>,
    /// Path of the font inside `source`
    pub path: String,
}

impl ScalableFont {
    /// Create a font living in a directory on disk
    pub fn in_dir(name: &str, style: FontStyle, weight: FontWeight, dir: impl Into<PathBuf>, path: &str) -> Self {
        Self {
            name: name.to_string(),
            style,
            weight,
            source: Some(FontSource::Dir(dir.into())),
            path: path.to_string(),
        }
    }

    /// Create a font from data compiled into the binary
    pub fn embedded(name: &str, style: FontStyle, weight: FontWeight, data: &'static [u8]) -> Self {
        Self {
            name: name.to_string(),
            style,
            weight,
            source: Some(FontSource::Static(data)),
            path: name.to_string(),
        }
    }

    /// The "no font" sentinel
    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.source.is_none() && self.name.is_empty() && self.path.is_empty()
    }

    /// A font can be cached only if it names its data
    pub fn is_usable(&self) -> bool {
        !self.name.is_empty() && !self.path.is_empty() && self.source.is_some()
    }

    /// Location on disk, for directory-backed fonts
    pub fn full_path(&self) -> Option<PathBuf> {
        match &self.source {
            Some(FontSource::Dir(dir)) => Some(dir.join(&self.path)),
            _ => None,
        }
    }

    /// Raw font bytes (not parsed or validated)
    pub fn load(&self) -> std::io::Result<Cow<'static, [u8]>> {
        match &self.source {
            Some(FontSource::Dir(dir)) => std::fs::read(dir.join(Path::new(&self.path))).map(Cow::Owned),
            Some(FontSource::Static(data)) => Ok(Cow::Borrowed(*data)),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "null font has no data",
            )),
        }
    }
}

impl fmt::Display for ScalableFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("<null font>");
        }
        write!(f, "{} ({} {}) @ {}", self.name, self.style, self.weight, self.path)
    }
}
