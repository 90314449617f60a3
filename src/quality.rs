use crate::error::Error;
use crate::provider::TorrentVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Coarse video resolution used to choose among the variants of one movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    P720,
    P1080,
    P2160,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::P720, Quality::P1080, Quality::P2160];

    /// Position of this tier in the provider's historical variant ordering.
    ///
    /// The ordering is not guaranteed by the provider. If it changes, positional
    /// selection silently picks the wrong variant unless the index is out of bounds.
    pub fn index(self) -> usize {
        match self {
            Quality::P720 => 0,
            Quality::P1080 => 1,
            Quality::P2160 => 2,
        }
    }

    /// Whether a provider-supplied label names this tier.
    pub fn matches_label(self, label: &str) -> bool {
        let label = label.trim();
        match self {
            Quality::P720 => label.eq_ignore_ascii_case("720p"),
            Quality::P1080 => label.eq_ignore_ascii_case("1080p"),
            Quality::P2160 => {
                label.eq_ignore_ascii_case("2160p") || label.eq_ignore_ascii_case("4k")
            }
        }
    }
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "720p" => Ok(Quality::P720),
            "1080p" => Ok(Quality::P1080),
            "4k" | "2160p" => Ok(Quality::P2160),
            _ => Err(Error::InvalidQuality(s.to_string())),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::P720 => write!(f, "720p"),
            Quality::P1080 => write!(f, "1080p"),
            Quality::P2160 => write!(f, "2160p"),
        }
    }
}

/// How a quality tier is mapped onto the provider's variant list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    /// Match the variant's quality label, using position only when no variant is labelled.
    #[default]
    Label,
    /// Trust the provider's ordering: 720p, 1080p, 2160p.
    Positional,
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStrategy::Label => write!(f, "label"),
            SelectionStrategy::Positional => write!(f, "positional"),
        }
    }
}

/// Pick the variant for `quality` out of a provider's list.
///
/// `movie` only names the movie in a `QualityUnavailable` error.
pub fn select_variant<'a>(
    variants: &'a [TorrentVariant],
    quality: Quality,
    strategy: SelectionStrategy,
    movie: &str,
) -> crate::Result<&'a TorrentVariant> {
    let labelled = variants.iter().any(|v| !v.quality_label.trim().is_empty());

    let selected = match strategy {
        SelectionStrategy::Label if labelled => {
            debug!("Selecting {} by label among {} variants", quality, variants.len());
            variants
                .iter()
                .find(|v| quality.matches_label(&v.quality_label))
        }
        _ => {
            debug!(
                "Selecting {} at position {} among {} variants",
                quality,
                quality.index(),
                variants.len()
            );
            variants.get(quality.index())
        }
    };

    selected.ok_or_else(|| Error::QualityUnavailable {
        quality: quality.to_string(),
        movie: movie.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(label: &str, hash_char: char) -> TorrentVariant {
        TorrentVariant::new(label, &hash_char.to_string().repeat(40))
    }

    #[test]
    fn test_quality_strings_map_to_fixed_indices() {
        assert_eq!("720p".parse::<Quality>().unwrap().index(), 0);
        assert_eq!("1080p".parse::<Quality>().unwrap().index(), 1);
        assert_eq!("4k".parse::<Quality>().unwrap().index(), 2);
        assert_eq!("2160p".parse::<Quality>().unwrap().index(), 2);
        assert_eq!("4K".parse::<Quality>().unwrap(), Quality::P2160);
    }

    #[test]
    fn test_unknown_quality_is_rejected() {
        for input in ["480p", "3D", "", "1080", "hd"] {
            match input.parse::<Quality>() {
                Err(Error::InvalidQuality(q)) => assert_eq!(q, input),
                other => panic!("expected InvalidQuality for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_positional_selection() {
        let variants = vec![variant("720p", 'a'), variant("1080p", 'b'), variant("2160p", 'c')];
        for quality in Quality::ALL {
            let selected =
                select_variant(&variants, quality, SelectionStrategy::Positional, "Movie")
                    .unwrap();
            assert_eq!(selected, &variants[quality.index()]);
        }
    }

    #[test]
    fn test_two_variants_have_no_4k() {
        let variants = vec![variant("720p", 'a'), variant("1080p", 'b')];
        for strategy in [SelectionStrategy::Positional, SelectionStrategy::Label] {
            let err = select_variant(&variants, Quality::P2160, strategy, "Inception")
                .unwrap_err();
            match err {
                Error::QualityUnavailable { quality, movie } => {
                    assert_eq!(quality, "2160p");
                    assert_eq!(movie, "Inception");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_label_selection_ignores_provider_order() {
        let variants = vec![variant("1080p", 'b'), variant("2160p", 'c'), variant("720p", 'a')];
        let selected =
            select_variant(&variants, Quality::P720, SelectionStrategy::Label, "Movie").unwrap();
        assert_eq!(selected.quality_label, "720p");

        // Positional keeps the historical (here wrong) behaviour.
        let selected =
            select_variant(&variants, Quality::P720, SelectionStrategy::Positional, "Movie")
                .unwrap();
        assert_eq!(selected.quality_label, "1080p");
    }

    #[test]
    fn test_label_selection_takes_first_match() {
        let variants = vec![variant("1080p", 'b'), variant("1080p", 'd')];
        let selected =
            select_variant(&variants, Quality::P1080, SelectionStrategy::Label, "Movie").unwrap();
        assert_eq!(selected.content_hash, "b".repeat(40));
    }

    #[test]
    fn test_label_selection_does_not_fall_back_when_labelled() {
        let variants = vec![variant("3D", 'a'), variant("1080p", 'b'), variant("480p", 'c')];
        assert!(matches!(
            select_variant(&variants, Quality::P2160, SelectionStrategy::Label, "Movie"),
            Err(Error::QualityUnavailable { .. })
        ));
    }

    #[test]
    fn test_unlabelled_variants_fall_back_to_position() {
        let variants = vec![variant("", 'a'), variant("", 'b')];
        let selected =
            select_variant(&variants, Quality::P1080, SelectionStrategy::Label, "Movie").unwrap();
        assert_eq!(selected.content_hash, "b".repeat(40));
    }
}
