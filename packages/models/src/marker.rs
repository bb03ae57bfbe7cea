//! Marker styling rules and label overlays.
//!
//! Search markers are small circles whose fill distinguishes highly
//! rated places; ranked markers (recommendation handoffs) are larger,
//! numbered, and drop in with an entrance animation.

use crate::entry::ResultEntry;

/// Rating at or above which a search marker gets the distinguished fill.
pub const RATING_DISTINGUISHED_CUTOFF: f64 = 4.5;

/// Fill for search markers rated at or above the cutoff.
pub const FILL_DISTINGUISHED: &str = "#9B87F5";

/// Fill for ordinary search markers.
pub const FILL_STANDARD: &str = "#60A5FA";

/// Fill for ranked (recommendation handoff) markers.
pub const FILL_RANKED: &str = "#7C3AED";

/// Character budget for a name label before truncation.
pub const LABEL_MAX_CHARS: usize = 15;

/// Visual style for a map marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Circle fill color, as a CSS hex string.
    pub fill_color: &'static str,
    /// Circle radius scale.
    pub scale: f64,
    /// Circle stroke color.
    pub stroke_color: &'static str,
    /// Circle stroke weight.
    pub stroke_weight: f64,
    /// Whether the marker should play a drop-in entrance animation.
    pub entrance_animation: bool,
}

impl MarkerStyle {
    /// Style rule for a live-search marker, keyed on rating.
    #[must_use]
    pub fn for_rating(rating: Option<f64>) -> Self {
        let distinguished = rating.is_some_and(|r| r >= RATING_DISTINGUISHED_CUTOFF);
        Self {
            fill_color: if distinguished {
                FILL_DISTINGUISHED
            } else {
                FILL_STANDARD
            },
            scale: 6.0,
            stroke_color: "#ffffff",
            stroke_weight: 2.0,
            entrance_animation: false,
        }
    }

    /// Style rule for a ranked (handoff) marker.
    #[must_use]
    pub const fn ranked() -> Self {
        Self {
            fill_color: FILL_RANKED,
            scale: 18.0,
            stroke_color: "#ffffff",
            stroke_weight: 3.0,
            entrance_animation: true,
        }
    }

    /// Style rule for `entry` in live-search mode.
    #[must_use]
    pub fn for_entry(entry: &ResultEntry) -> Self {
        Self::for_rating(entry.rating)
    }
}

/// Text overlay attached to a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerLabel {
    /// The place name, truncated to the character budget.
    Name(String),
    /// The 1-based rank of a ranked-set member.
    Rank(u32),
}

impl MarkerLabel {
    /// Builds a name label, truncating beyond [`LABEL_MAX_CHARS`] with
    /// an ellipsis.
    #[must_use]
    pub fn name(full: &str) -> Self {
        if full.chars().count() > LABEL_MAX_CHARS {
            let truncated: String = full.chars().take(LABEL_MAX_CHARS).collect();
            Self::Name(format!("{truncated}…"))
        } else {
            Self::Name(full.to_string())
        }
    }

    /// Returns the display text for this label.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Rank(rank) => rank.to_string(),
        }
    }
}
