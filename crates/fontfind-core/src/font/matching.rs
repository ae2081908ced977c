//! Font variant matching
//!
//! Scores backend-supplied variant tags ("regular", "700", "italic", ...)
//! against a requested style and weight, and picks the best variant across
//! a list of candidate families.

use std::path::Path;

use regex::RegexBuilder;
use serde::Deserialize;

use super::{FontStyle, FontWeight};

/// Known style/weight variants of one font family, and where to find it
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FontVariantsLocation {
    pub family: String,
    pub variants: Vec<String>,
    /// Only meaningful if the family has a single variant
    #[serde(default)]
    pub path: String,
}

impl FontVariantsLocation {
    pub fn new(family: &str, variants: &[&str], path: &str) -> Self {
        Self {
            family: family.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
            path: path.to_string(),
        }
    }
}

/// Confidence of a variant match
///
/// Ordinal scale. Combining a style and a weight score may yield the
/// in-between value 1, which ranks above `NONE` and below `LOW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MatchConfidence(pub u8);

impl MatchConfidence {
    pub const NONE: MatchConfidence = MatchConfidence(0);
    pub const LOW: MatchConfidence = MatchConfidence(2);
    pub const HIGH: MatchConfidence = MatchConfidence(3);
    pub const PERFECT: MatchConfidence = MatchConfidence(4);

    /// `floor((style + weight) / 2)`
    pub fn combine(style: MatchConfidence, weight: MatchConfidence) -> MatchConfidence {
        MatchConfidence((style.0 + weight.0) / 2)
    }
}

/// Variant tag categories understood by the weight table
///
/// Only exact, single-purpose tags are categorized. Compound tags such as
/// "700italic" have no category and never score on weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightTag {
    /// "regular", "400", "italic", "oblique", "normal", "text"
    Regular,
    /// "100", "200", "300"
    Light,
    /// "500"
    Medium,
    /// "bold", "700"
    Bold,
    /// "extrabold", "600", "800", "900"
    Heavy,
}

impl WeightTag {
    /// Categorize a lower-cased variant tag
    pub fn parse(tag: &str) -> Option<WeightTag> {
        match tag {
            "regular" | "400" | "italic" | "oblique" | "normal" | "text" => Some(WeightTag::Regular),
            "100" | "200" | "300" => Some(WeightTag::Light),
            "500" => Some(WeightTag::Medium),
            "bold" | "700" => Some(WeightTag::Bold),
            "extrabold" | "600" | "800" | "900" => Some(WeightTag::Heavy),
            _ => None,
        }
    }

    /// Weight table lookup
    pub fn confidence(self, weight: FontWeight) -> MatchConfidence {
        use FontWeight::*;
        match (self, weight) {
            (WeightTag::Regular, Normal | Medium) => MatchConfidence::PERFECT,
            (WeightTag::Regular, Thin | ExtraLight | Light) => MatchConfidence::LOW,
            (WeightTag::Light, Thin | ExtraLight | Light) => MatchConfidence::PERFECT,
            (WeightTag::Light, Normal | Medium) => MatchConfidence::LOW,
            (WeightTag::Medium, Medium) => MatchConfidence::PERFECT,
            (WeightTag::Medium, SemiBold) => MatchConfidence::HIGH,
            (WeightTag::Medium, Normal | Bold) => MatchConfidence::LOW,
            (WeightTag::Bold, Bold) => MatchConfidence::PERFECT,
            (WeightTag::Bold, SemiBold | ExtraBold) => MatchConfidence::HIGH,
            (WeightTag::Heavy, Bold) => MatchConfidence::HIGH,
            (WeightTag::Heavy, SemiBold) => MatchConfidence::LOW,
            _ => MatchConfidence::NONE,
        }
    }
}

/// Score a variant tag against a requested style
pub fn match_style(variant: &str, style: FontStyle) -> MatchConfidence {
    let variant = variant.to_lowercase();
    match style {
        FontStyle::Normal => match variant.as_str() {
            "regular" | "400" => MatchConfidence::PERFECT,
            "100" | "200" | "300" | "500" => MatchConfidence::HIGH,
            _ => MatchConfidence::NONE,
        },
        FontStyle::Italic => {
            if variant.contains("italic") {
                MatchConfidence::PERFECT
            } else if variant.contains("obliq") {
                MatchConfidence::HIGH
            } else {
                MatchConfidence::NONE
            }
        }
        FontStyle::Oblique => {
            if variant.contains("obliq") {
                MatchConfidence::PERFECT
            } else if variant.contains("italic") {
                MatchConfidence::HIGH
            } else {
                MatchConfidence::NONE
            }
        }
    }
}

/// Score a variant tag against a requested weight
pub fn match_weight(variant: &str, weight: FontWeight) -> MatchConfidence {
    let variant = variant.to_lowercase();
    if variant == (i16::from(weight.ordinal()) + 400).to_string() {
        return MatchConfidence::PERFECT;
    }
    WeightTag::parse(&variant)
        .map(|tag| tag.confidence(weight))
        .unwrap_or(MatchConfidence::NONE)
}

/// Error compiling a family-name pattern
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("invalid font name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Best variant found by [`closest_match`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosestMatch<'a> {
    pub location: &'a FontVariantsLocation,
    pub variant: &'a str,
    pub confidence: MatchConfidence,
}

/// Find the variant that best matches `style` and `weight` among the
/// families whose name matches `pattern`
///
/// Candidates are visited in order and a later variant replaces the current
/// best only with a strictly higher confidence. Returns `Ok(None)` if no
/// family matches or no variant scores above `NONE`.
pub fn closest_match<'a>(
    candidates: &'a [FontVariantsLocation],
    pattern: &str,
    style: FontStyle,
    weight: FontWeight,
) -> Result<Option<ClosestMatch<'a>>, MatchError> {
    let re = RegexBuilder::new(&pattern.to_lowercase())
        .case_insensitive(true)
        .build()
        .inspect_err(|e| tracing::error!("invalid font name pattern {:?}: {}", pattern, e))?;

    let mut best: Option<ClosestMatch<'a>> = None;
    for location in candidates {
        if !re.is_match(&location.family.to_lowercase()) {
            continue;
        }
        for variant in &location.variants {
            let confidence = MatchConfidence::combine(
                match_style(variant, style),
                match_weight(variant, weight),
            );
            let current = best.as_ref().map(|b| b.confidence).unwrap_or(MatchConfidence::NONE);
            if confidence > current {
                best = Some(ClosestMatch {
                    location,
                    variant: variant.as_str(),
                    confidence,
                });
            }
        }
    }
    Ok(best)
}

/// Lower-cased file name without directory and extension
fn base_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Guess a font's style and weight from its file name
pub fn guess_style_and_weight(file_name: &str) -> (FontStyle, FontWeight) {
    let name = base_name(file_name);
    let parts: Vec<&str> = name.split('-').collect();
    if parts.len() > 1 {
        let weight = match parts[parts.len() - 1] {
            "light" | "xlight" => Some(FontWeight::Light),
            "normal" | "medium" | "regular" | "r" => Some(FontWeight::Normal),
            "bold" | "b" => Some(FontWeight::Bold),
            "xbold" | "black" => Some(FontWeight::ExtraBold),
            _ => None,
        };
        if let Some(weight) = weight {
            return (FontStyle::Normal, weight);
        }
    }

    let mut style = FontStyle::Normal;
    let mut weight = FontWeight::Normal;
    if name.contains("italic") {
        style = FontStyle::Italic;
    }
    if name.contains("light") {
        weight = FontWeight::Light;
    }
    if name.contains("bold") {
        weight = FontWeight::Bold;
    }
    (style, weight)
}

/// Check whether a font file name contains `pattern` and indicates the
/// given style and weight
pub fn matches_file_name(file_name: &str, pattern: &str, style: FontStyle, weight: FontWeight) -> bool {
    let name = base_name(file_name);
    if !name.contains(&pattern.to_lowercase()) {
        return false;
    }
    guess_style_and_weight(&name) == (style, weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_table() {
        assert_eq!(match_style("regular", FontStyle::Normal), MatchConfidence::PERFECT);
        assert_eq!(match_style("400", FontStyle::Normal), MatchConfidence::PERFECT);
        assert_eq!(match_style("300", FontStyle::Normal), MatchConfidence::HIGH);
        assert_eq!(match_style("bold", FontStyle::Normal), MatchConfidence::NONE);
        assert_eq!(match_style("700italic", FontStyle::Italic), MatchConfidence::PERFECT);
        assert_eq!(match_style("Oblique", FontStyle::Italic), MatchConfidence::HIGH);
        assert_eq!(match_style("oblique", FontStyle::Oblique), MatchConfidence::PERFECT);
        assert_eq!(match_style("italic", FontStyle::Oblique), MatchConfidence::HIGH);
        assert_eq!(match_style("regular", FontStyle::Italic), MatchConfidence::NONE);
    }

    #[test]
    fn test_weight_table() {
        assert_eq!(match_weight("regular", FontWeight::Normal), MatchConfidence::PERFECT);
        assert_eq!(match_weight("text", FontWeight::Medium), MatchConfidence::PERFECT);
        assert_eq!(match_weight("italic", FontWeight::Light), MatchConfidence::LOW);
        assert_eq!(match_weight("regular", FontWeight::Bold), MatchConfidence::NONE);
        assert_eq!(match_weight("200", FontWeight::Thin), MatchConfidence::PERFECT);
        assert_eq!(match_weight("300", FontWeight::Medium), MatchConfidence::LOW);
        assert_eq!(match_weight("500", FontWeight::SemiBold), MatchConfidence::HIGH);
        assert_eq!(match_weight("500", FontWeight::Bold), MatchConfidence::LOW);
        assert_eq!(match_weight("Bold", FontWeight::Bold), MatchConfidence::PERFECT);
        assert_eq!(match_weight("bold", FontWeight::ExtraBold), MatchConfidence::HIGH);
        assert_eq!(match_weight("extrabold", FontWeight::Bold), MatchConfidence::HIGH);
        assert_eq!(match_weight("extrabold", FontWeight::SemiBold), MatchConfidence::LOW);
        assert_eq!(match_weight("extrabold", FontWeight::Black), MatchConfidence::NONE);
    }

    #[test]
    fn test_numeric_tags_follow_the_table() {
        assert_eq!(match_weight("700", FontWeight::Bold), MatchConfidence::PERFECT);
        assert_eq!(match_weight("600", FontWeight::SemiBold), MatchConfidence::LOW);
        assert_eq!(match_weight("800", FontWeight::ExtraBold), MatchConfidence::NONE);
        assert_eq!(match_weight("900", FontWeight::Black), MatchConfidence::NONE);
        assert_eq!(match_weight("200", FontWeight::Thin), MatchConfidence::PERFECT);
        // Ordinal offset, not the CSS value
        assert_eq!(match_weight("400", FontWeight::Normal), MatchConfidence::PERFECT);
        assert_eq!(match_weight("403", FontWeight::Bold), MatchConfidence::PERFECT);
    }

    #[test]
    fn test_closest_match_black_prefers_regular_over_900() {
        let fonts = vec![FontVariantsLocation::new("Go", &["900", "regular"], "")];
        let m = closest_match(&fonts, "Go", FontStyle::Normal, FontWeight::Black)
            .unwrap()
            .unwrap();
        assert_eq!(m.variant, "regular");
        assert_eq!(m.confidence, MatchConfidence::LOW);
    }

    #[test]
    fn test_compound_tags_never_weight_match() {
        assert_eq!(match_weight("700italic", FontWeight::Bold), MatchConfidence::NONE);
        assert_eq!(match_weight("300italic", FontWeight::Light), MatchConfidence::NONE);
        assert_eq!(WeightTag::parse("700italic"), None);
    }

    #[test]
    fn test_combine_floors() {
        let c = MatchConfidence::combine(MatchConfidence::NONE, MatchConfidence::HIGH);
        assert_eq!(c, MatchConfidence(1));
        assert!(c > MatchConfidence::NONE && c < MatchConfidence::LOW);
        let c = MatchConfidence::combine(MatchConfidence::HIGH, MatchConfidence::PERFECT);
        assert_eq!(c, MatchConfidence::HIGH);
    }

    #[test]
    fn test_closest_match_regular_beats_bold() {
        let fonts = vec![FontVariantsLocation::new("Go", &["regular", "bold"], "")];
        let m = closest_match(&fonts, "go", FontStyle::Normal, FontWeight::Normal)
            .unwrap()
            .unwrap();
        assert_eq!(m.variant, "regular");
        assert_eq!(m.confidence, MatchConfidence::PERFECT);
    }

    #[test]
    fn test_closest_match_compound_tag_only_scores_style() {
        // "regular" gets nothing for Italic/Bold; "700italic" only its style half
        for variants in [["regular", "700italic"], ["700italic", "regular"]] {
            let fonts = vec![FontVariantsLocation::new("Go", &variants, "")];
            let m = closest_match(&fonts, "Go", FontStyle::Italic, FontWeight::Bold)
                .unwrap()
                .unwrap();
            assert_eq!(m.variant, "700italic");
            assert_eq!(m.confidence, MatchConfidence::LOW);
        }
    }

    #[test]
    fn test_closest_match_tie_keeps_first_seen() {
        let fonts = vec![FontVariantsLocation::new("Go", &["italic", "700italic"], "")];
        let m = closest_match(&fonts, "Go", FontStyle::Italic, FontWeight::Bold)
            .unwrap()
            .unwrap();
        assert_eq!(m.confidence, MatchConfidence::LOW);
        assert_eq!(m.variant, "italic");

        let fonts = vec![FontVariantsLocation::new("Go", &["700italic", "italic"], "")];
        let m = closest_match(&fonts, "Go", FontStyle::Italic, FontWeight::Bold)
            .unwrap()
            .unwrap();
        assert_eq!(m.variant, "700italic");
    }

    #[test]
    fn test_closest_match_across_families() {
        let fonts = vec![
            FontVariantsLocation::new("Noto Sans", &["bold"], "a"),
            FontVariantsLocation::new("Noto Serif", &["regular"], "b"),
            FontVariantsLocation::new("Roboto", &["regular"], "c"),
        ];
        let m = closest_match(&fonts, "noto", FontStyle::Normal, FontWeight::Normal)
            .unwrap()
            .unwrap();
        assert_eq!(m.location.family, "Noto Serif");
        assert_eq!(m.location.path, "b");
    }

    #[test]
    fn test_closest_match_no_family() {
        let fonts = vec![FontVariantsLocation::new("Roboto", &["regular"], "")];
        let m = closest_match(&fonts, "Helvetica", FontStyle::Normal, FontWeight::Normal).unwrap();
        assert!(m.is_none());
    }

    #[test]
    fn test_closest_match_no_scoring_variant() {
        let fonts = vec![FontVariantsLocation::new("Roboto", &["900italic"], "")];
        let m = closest_match(&fonts, "Roboto", FontStyle::Normal, FontWeight::Normal).unwrap();
        assert!(m.is_none());
    }

    #[test]
    fn test_closest_match_invalid_pattern() {
        let fonts = vec![FontVariantsLocation::new("Roboto", &["regular"], "")];
        let err = closest_match(&fonts, "Rob(oto", FontStyle::Normal, FontWeight::Normal);
        assert!(matches!(err, Err(MatchError::InvalidPattern(_))));
    }

    #[test]
    fn test_guess_suffix_token() {
        assert_eq!(guess_style_and_weight("fonts/Go-Bold.ttf"), (FontStyle::Normal, FontWeight::Bold));
        assert_eq!(guess_style_and_weight("Inter-XLight.otf"), (FontStyle::Normal, FontWeight::Light));
        assert_eq!(guess_style_and_weight("Inter-Black.otf"), (FontStyle::Normal, FontWeight::ExtraBold));
        assert_eq!(guess_style_and_weight("Go-R.ttf"), (FontStyle::Normal, FontWeight::Normal));
    }

    #[test]
    fn test_guess_substrings() {
        assert_eq!(guess_style_and_weight("Go-BoldItalic.ttf"), (FontStyle::Italic, FontWeight::Bold));
        assert_eq!(guess_style_and_weight("/usr/share/SourceLightItalic.ttf"), (FontStyle::Italic, FontWeight::Light));
        assert_eq!(guess_style_and_weight("Go.ttf"), (FontStyle::Normal, FontWeight::Normal));
    }

    #[test]
    fn test_matches_file_name() {
        assert!(matches_file_name("packaged/Go-Regular.ttf", "go", FontStyle::Normal, FontWeight::Normal));
        assert!(matches_file_name("Go-Bold.ttf", "Go", FontStyle::Normal, FontWeight::Bold));
        assert!(!matches_file_name("Go-Bold.ttf", "Go", FontStyle::Normal, FontWeight::Normal));
        assert!(!matches_file_name("Roboto-Regular.ttf", "Go", FontStyle::Normal, FontWeight::Normal));
    }
}
