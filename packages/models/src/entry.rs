//! Search result entries and their detail-augmented counterparts.
//!
//! A [`ResultEntry`] is the lightweight record a text search returns;
//! a [`DetailedResult`] is the same place after an on-demand detail
//! fetch. Identity is the provider-assigned `id` in both cases: two
//! records with the same id are the same physical place, and later
//! data is merged into the existing record rather than duplicated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// A search result as returned by a provider text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    /// Opaque provider-assigned id, unique within a session.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Formatted street address.
    pub address: String,
    /// Position, absent until resolved via a detail fetch.
    pub coordinates: Option<Coordinate>,
    /// Star rating, typically 1.0–5.0.
    pub rating: Option<f64>,
    /// Price level, typically 1–4.
    pub price_level: Option<u8>,
    /// Category tags (e.g. "italian_restaurant", "cafe").
    pub category_tags: BTreeSet<String>,
    /// Opaque photo references, in provider order.
    pub photo_refs: Vec<String>,
    /// One-line opening-hours summary, when known.
    pub hours_summary: Option<String>,
}

impl ResultEntry {
    /// Creates a minimal entry with only an id and name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            coordinates: None,
            rating: None,
            price_level: None,
            category_tags: BTreeSet::new(),
            photo_refs: Vec::new(),
            hours_summary: None,
        }
    }

    /// Folds later-arriving data for the same place into this entry.
    ///
    /// Fields already populated are kept; empty or absent fields take
    /// the incoming value. The id is never changed.
    pub fn merge(&mut self, incoming: &Self) {
        if self.name.is_empty() {
            self.name.clone_from(&incoming.name);
        }
        if self.address.is_empty() {
            self.address.clone_from(&incoming.address);
        }
        if self.coordinates.is_none() {
            self.coordinates = incoming.coordinates;
        }
        if self.rating.is_none() {
            self.rating = incoming.rating;
        }
        if self.price_level.is_none() {
            self.price_level = incoming.price_level;
        }
        if self.category_tags.is_empty() {
            self.category_tags.clone_from(&incoming.category_tags);
        }
        if self.photo_refs.is_empty() {
            self.photo_refs.clone_from(&incoming.photo_refs);
        }
        if self.hours_summary.is_none() {
            self.hours_summary.clone_from(&incoming.hours_summary);
        }
    }
}

/// A single user review on a detailed result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review author display name.
    pub author: String,
    /// Star rating given by this review.
    pub rating: f64,
    /// Review body text.
    pub text: String,
}

/// A fully augmented place record, produced by an on-demand detail
/// fetch. Every detailed result has exactly one backing [`ResultEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedResult {
    /// The backing search entry, with coordinates resolved.
    pub entry: ResultEntry,
    /// Formatted phone number.
    pub phone: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Provider-hosted page URL for this place.
    pub external_url: Option<String>,
    /// User reviews, in provider order.
    pub reviews: Vec<Review>,
    /// Opening hours, one line per weekday (7 entries when present).
    pub weekday_hours: Vec<String>,
    /// Serves breakfast.
    pub serves_breakfast: bool,
    /// Serves lunch.
    pub serves_lunch: bool,
    /// Serves dinner.
    pub serves_dinner: bool,
    /// Serves brunch.
    pub serves_brunch: bool,
    /// Serves vegetarian options.
    pub serves_vegetarian: bool,
}

impl DetailedResult {
    /// Creates a detail record around a backing entry with no extras.
    #[must_use]
    pub const fn from_entry(entry: ResultEntry) -> Self {
        Self {
            entry,
            phone: None,
            website: None,
            external_url: None,
            reviews: Vec::new(),
            weekday_hours: Vec::new(),
            serves_breakfast: false,
            serves_lunch: false,
            serves_dinner: false,
            serves_brunch: false,
            serves_vegetarian: false,
        }
    }
}

/// A result handed off from another screen, possibly without
/// coordinates, carrying its upstream ranking position implicitly by
/// list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadedEntry {
    /// Provider-assigned place id.
    pub place_id: String,
    /// Display name.
    pub name: String,
    /// Formatted address, when the upstream screen had one.
    pub address: Option<String>,
    /// Latitude, when the upstream screen had coordinates.
    pub latitude: Option<f64>,
    /// Longitude, when the upstream screen had coordinates.
    pub longitude: Option<f64>,
    /// Star rating, when known upstream.
    pub rating: Option<f64>,
    /// Upstream recommendation match score, carried for display only.
    pub match_score: Option<f64>,
}

impl PreloadedEntry {
    /// Converts the handoff record into a [`ResultEntry`].
    #[must_use]
    pub fn into_entry(self) -> ResultEntry {
        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };
        ResultEntry {
            id: self.place_id,
            name: self.name,
            address: self.address.unwrap_or_default(),
            coordinates,
            rating: self.rating,
            price_level: None,
            category_tags: BTreeSet::new(),
            photo_refs: Vec::new(),
            hours_summary: None,
        }
    }
}

/// The current user selection on the map.
///
/// Transitions only via explicit selection or resolver completion.
/// Selecting a new id while another is resolving supersedes the old
/// interest: the stale resolution's completion is ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    /// Nothing selected.
    #[default]
    None,
    /// A place is selected and its detail fetch is in flight.
    Resolving(String),
    /// A place is selected and fully resolved.
    Resolved(DetailedResult),
}

impl SelectionState {
    /// Returns `true` if this state is an in-flight resolution for `id`.
    #[must_use]
    pub fn is_resolving(&self, id: &str) -> bool {
        matches!(self, Self::Resolving(current) if current == id)
    }
}
