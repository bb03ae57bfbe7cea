#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Viewport-synchronized map result engine.
//!
//! Keeps an interactively pannable/zoomable map's visible marker set
//! consistent with a dynamic collection of search results, augments
//! individual results with on-demand detail data, and derives average
//! walking/driving distance between the user location and a result
//! set.
//!
//! The map surface, place search, geocoding, distance, and marker
//! providers are consumed through the capability traits in
//! [`providers`]; the engine owns only state and consistency logic:
//!
//! - [`store::ResultStore`] — the full result collection and its
//!   viewport-visible subset.
//! - [`markers::MarkerLifecycleManager`] — reconciles on-map markers
//!   against the visible subset.
//! - [`details::DetailResolver`] — coalesced, cached detail fetches.
//! - [`distance::DistanceAggregator`] — the two-phase walking/driving
//!   distance chain.
//! - [`session::SearchSession`] — orchestrates query submission,
//!   preloaded bootstraps, selection, and viewport changes.

pub mod details;
pub mod distance;
pub mod handoff;
pub mod markers;
pub mod providers;
pub mod pulse;
pub mod session;
pub mod store;

use thiserror::Error;

/// Errors surfaced by the engine and its provider capabilities.
///
/// `Clone` so that a coalesced detail resolution can hand the same
/// outcome to every attached caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The backing provider was unreachable or rejected the request.
    #[error("Provider unavailable: {message}")]
    ProviderUnavailable {
        /// Description of the provider failure.
        message: String,
    },

    /// The request was valid but matched no entity.
    #[error("Not found")]
    NotFound,

    /// A batch operation where some items failed and others succeeded.
    #[error("Partial data: {ok} ok, {failed} failed")]
    PartialData {
        /// Number of items that succeeded.
        ok: usize,
        /// Number of items that failed.
        failed: usize,
    },

    /// An operation was requested before its dependency was ready.
    #[error("Precondition unmet: {what}")]
    PreconditionUnmet {
        /// Description of the missing dependency.
        what: String,
    },
}

impl EngineError {
    /// Shorthand for a [`Self::ProviderUnavailable`] with a message.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }
}
