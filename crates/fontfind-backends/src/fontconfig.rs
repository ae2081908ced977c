//! fontconfig font list
//!
//! Parses the output of `fc-list` (one `path: family: style=...` record per
//! line) into variant locations the confidence matcher can rank.

use std::path::{Path, PathBuf};

use fontfind_core::{FontStyle, FontVariantsLocation, FontWeight, LocateError, closest_match};

/// Platform fonts listed by fontconfig
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontConfigList {
    fonts: Vec<FontVariantsLocation>,
}

impl FontConfigList {
    /// Parse `fc-list` output
    ///
    /// Font collections (`.ttc`) are skipped. Each record yields one family
    /// entry with at most one variant tag.
    pub fn parse(list: &str) -> Self {
        let mut fonts = Vec::new();
        let mut collections = 0;
        for line in list.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 3 {
                continue;
            }
            let path = fields[0].trim();
            if path.ends_with(".ttc") {
                collections += 1;
                continue;
            }
            let family = fields[1].trim();
            let family = family.strip_prefix('.').unwrap_or(family);
            let variants = variant_tag(&fields[2].to_lowercase())
                .map(|tag| vec![tag.to_string()])
                .unwrap_or_default();
            fonts.push(FontVariantsLocation {
                family: family.to_string(),
                variants,
                path: path.to_string(),
            });
        }
        if collections > 0 {
            tracing::info!("skipping {} platform fonts: TTC not supported", collections);
        }
        Self { fonts }
    }

    /// Read and parse a list file
    pub fn load(path: &Path) -> Result<Self, LocateError> {
        let list = std::fs::read_to_string(path)?;
        let fonts = Self::parse(&list);
        tracing::info!("loaded fontconfig list {} with {} fonts", path.display(), fonts.len());
        Ok(fonts)
    }

    pub fn fonts(&self) -> &[FontVariantsLocation] {
        &self.fonts
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// File of the best listed font, if it matches with more than low confidence
    pub fn find(&self, pattern: &str, style: FontStyle, weight: FontWeight) -> Result<Option<PathBuf>, LocateError> {
        let Some(found) = closest_match(&self.fonts, pattern, style, weight)? else {
            return Ok(None);
        };
        tracing::debug!(
            "closest fontconfig match confidence for {}|{} = {:?}",
            found.location.family,
            found.variant,
            found.confidence
        );
        if found.confidence > fontfind_core::MatchConfidence::LOW {
            Ok(Some(PathBuf::from(&found.location.path)))
        } else {
            Ok(None)
        }
    }
}

/// Map a fontconfig style field to a variant tag
///
/// Light faces are tagged with their CSS weight so they can score on weight.
fn variant_tag(style: &str) -> Option<&'static str> {
    if style.contains("regular") || style.contains("text") {
        Some("regular")
    } else if style.contains("light") {
        Some("300")
    } else if style.contains("italic") {
        Some("italic")
    } else if style.contains("bold") || style.contains("black") {
        Some("bold")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = "\
/usr/share/fonts/TTF/DejaVuSans.ttf: DejaVu Sans:style=Book
/usr/share/fonts/go/Go-Regular.ttf: Go:style=Regular
/usr/share/fonts/go/Go-Bold.ttf: Go:style=Bold
/usr/share/fonts/go/Go-Italic.ttf: Go:style=Italic
/usr/share/fonts/noto/NotoSerifCJK.ttc: Noto Serif CJK:style=Regular
/System/Library/Fonts/SFNS.ttf: .SF NS:style=Light

broken line
";

    #[test]
    fn test_parse() {
        let list = FontConfigList::parse(LIST);
        assert_eq!(list.len(), 5);
        let go_bold = &list.fonts()[2];
        assert_eq!(go_bold.family, "Go");
        assert_eq!(go_bold.variants, vec!["bold"]);
        assert_eq!(go_bold.path, "/usr/share/fonts/go/Go-Bold.ttf");
    }

    #[test]
    fn test_parse_skips_collections() {
        let list = FontConfigList::parse(LIST);
        assert!(list.fonts().iter().all(|f| !f.path.ends_with(".ttc")));
    }

    #[test]
    fn test_parse_strips_hidden_prefix() {
        let list = FontConfigList::parse(LIST);
        let sf = list.fonts().iter().find(|f| f.family == "SF NS").unwrap();
        assert_eq!(sf.variants, vec!["300"]);
    }

    #[test]
    fn test_unknown_style_has_no_variant() {
        let list = FontConfigList::parse(LIST);
        assert!(list.fonts()[0].variants.is_empty());
    }

    #[test]
    fn test_variant_tags() {
        assert_eq!(variant_tag("style=regular"), Some("regular"));
        assert_eq!(variant_tag("style=text"), Some("regular"));
        assert_eq!(variant_tag("style=light"), Some("300"));
        assert_eq!(variant_tag("style=extralight"), Some("300"));
        assert_eq!(variant_tag("style=bold italic"), Some("italic"));
        assert_eq!(variant_tag("style=black"), Some("bold"));
        assert_eq!(variant_tag("style=book"), None);
    }

    #[test]
    fn test_find() {
        let list = FontConfigList::parse(LIST);
        let path = list.find("go", FontStyle::Normal, FontWeight::Normal).unwrap();
        assert_eq!(path, Some(PathBuf::from("/usr/share/fonts/go/Go-Regular.ttf")));

        let path = list.find("sf", FontStyle::Normal, FontWeight::Light).unwrap();
        assert_eq!(path, Some(PathBuf::from("/System/Library/Fonts/SFNS.ttf")));

        let path = list.find("go", FontStyle::Italic, FontWeight::Normal).unwrap();
        assert_eq!(path, Some(PathBuf::from("/usr/share/fonts/go/Go-Italic.ttf")));
    }

    #[test]
    fn test_find_upright_bold_scores_low() {
        // "bold" has no upright style score, so it only reaches LOW
        let list = FontConfigList::parse(LIST);
        assert_eq!(list.find("go", FontStyle::Normal, FontWeight::Bold).unwrap(), None);
    }

    #[test]
    fn test_find_low_confidence_is_none() {
        let list = FontConfigList::parse(LIST);
        assert_eq!(list.find("dejavu", FontStyle::Normal, FontWeight::Normal).unwrap(), None);
        assert_eq!(list.find("helvetica", FontStyle::Normal, FontWeight::Normal).unwrap(), None);
    }

    #[test]
    fn test_find_invalid_pattern() {
        let list = FontConfigList::parse(LIST);
        assert!(matches!(
            list.find("go(", FontStyle::Normal, FontWeight::Normal),
            Err(LocateError::InvalidPattern(_))
        ));
    }
}
