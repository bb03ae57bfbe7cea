#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line host that drives the dine-map engine against scripted
//! in-memory providers.
//!
//! Useful for watching the engine's behavior without a real map SDK:
//! run a text search, bootstrap from a preloaded ranked list, or
//! exercise the cross-screen handoff path, and see the marker
//! lifecycle and distance summaries in the log.

mod fixtures;
mod providers;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dine_map_engine::handoff::{SELECTED_RESULTS_KEY, USER_LOCATION_KEY};
use dine_map_engine::providers::KeyValueStore;
use dine_map_engine::session::{SearchSession, SessionConfig, SessionProviders};
use dine_map_geo::{estimate_travel_time, haversine_miles};
use dine_map_models::{Coordinate, MapType, PreloadedEntry, ResultEntry, SelectionState};

use crate::providers::{
    ConsoleMarkers, FixturePlaces, LandmarkGeocoder, MemoryKv, SimulatedMap, StraightLineDistances,
};

#[derive(Parser)]
#[command(name = "dine_map_simulator", about = "Scripted host for the dine-map engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a text search and print the viewport-visible results
    Search {
        /// Query text; "near X" / "on X" re-centers on a known landmark
        query: String,
        /// User latitude, enabling distance summaries
        #[arg(long, requires = "lng")]
        lat: Option<f64>,
        /// User longitude
        #[arg(long, requires = "lat")]
        lng: Option<f64>,
        /// Base map type: roadmap, satellite, or 3d
        #[arg(long)]
        map_type: Option<String>,
    },
    /// Bootstrap from a preloaded ranked list with coordinate backfill
    Preload {
        /// Number of entries handed off without coordinates
        #[arg(long, default_value = "2")]
        backfill: usize,
    },
    /// Write a handoff payload to storage, then consume it
    Handoff,
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let kv = Arc::new(MemoryKv::default());
    let config = SessionConfig {
        pulse_sink: Some(Arc::new(|radius: f64| {
            log::trace!("pulse radius {radius:.0}");
        })),
        ..SessionConfig::default()
    };
    let providers = SessionProviders {
        map: SimulatedMap::new(config.default_anchor),
        search: Arc::new(FixturePlaces),
        geocoder: Arc::new(LandmarkGeocoder),
        distance: Arc::new(StraightLineDistances),
        markers: Arc::new(ConsoleMarkers),
        kv: Arc::clone(&kv) as Arc<dyn KeyValueStore>,
    };
    let session = SearchSession::new(
        providers,
        config,
        Arc::new(|entry: ResultEntry| log::info!("marker clicked: {}", entry.name)),
    );

    match cli.command {
        Commands::Search {
            query,
            lat,
            lng,
            map_type,
        } => {
            if let Some(name) = map_type {
                let parsed = MapType::parse(&name)
                    .ok_or_else(|| format!("unknown map type \"{name}\""))?;
                session.set_map_type(parsed);
            }
            if let (Some(lat), Some(lng)) = (lat, lng) {
                session.set_user_location(Coordinate::new(lat, lng));
            }

            let count = session.submit(&query).await?;
            println!("{count} result(s) in view for \"{query}\":");
            print_visible(&session);
            print_distance_summary(&session);

            // Select the top result to show the detail resolution path.
            let visible = session.visible();
            if let Some(first) = visible.first() {
                session.select(first).await?;
                if let SelectionState::Resolved(detail) = session.selection() {
                    println!();
                    println!("Selected: {}", detail.entry.name);
                    if let Some(phone) = detail.phone {
                        println!("  {phone}");
                    }
                    if let Some(website) = detail.website {
                        println!("  {website}");
                    }
                }
            }
        }
        Commands::Preload { backfill } => {
            let picks = &fixtures::ALL[..5.min(fixtures::ALL.len())];
            let handed_off: Vec<PreloadedEntry> = picks
                .iter()
                .enumerate()
                .map(|(rank, fixture)| {
                    fixture.preloaded(rank < picks.len().saturating_sub(backfill))
                })
                .collect();

            let rendered = session
                .load_preloaded(handed_off, Some(Coordinate::new(42.3601, -71.0589)))
                .await;
            println!("{rendered} ranked marker(s) rendered immediately");

            // Give the coordinate backfills a beat to land.
            tokio::time::sleep(Duration::from_millis(100)).await;
            println!(
                "{} marker(s) after backfill:",
                session.live_marker_count()
            );
            print_visible(&session);
            print_distance_summary(&session);
        }
        Commands::Handoff => {
            let handed_off: Vec<PreloadedEntry> = fixtures::ALL[..3]
                .iter()
                .map(|fixture| fixture.preloaded(true))
                .collect();
            kv.set(SELECTED_RESULTS_KEY, &serde_json::to_string(&handed_off)?);
            kv.set(
                USER_LOCATION_KEY,
                &serde_json::to_string(&Coordinate::new(42.3601, -71.0589))?,
            );

            match session.bootstrap_from_handoff().await {
                Some(rendered) => {
                    println!("Consumed handoff: {rendered} marker(s) rendered");
                    print_visible(&session);
                    print_distance_summary(&session);
                }
                None => println!("No handoff payload pending"),
            }
            // The payload is consume-once.
            if kv.get(SELECTED_RESULTS_KEY).is_none() {
                println!("Handoff storage cleared after read");
            }
        }
    }

    Ok(())
}

fn print_visible(session: &SearchSession) {
    let user_location = session.user_location();
    for entry in session.visible() {
        let rating = entry
            .rating
            .map_or_else(|| "  -".to_string(), |r| format!("{r:.1}"));
        print!("  {rating}  {:<20} {}", entry.name, entry.address);
        if let (Some(user), Some(coords)) = (user_location, entry.coordinates) {
            print!("  ({})", estimate_travel_time(haversine_miles(user, coords)));
        }
        println!();
    }
}

fn print_distance_summary(session: &SearchSession) {
    let Some(summary) = session.distance_summary() else {
        return;
    };
    println!();
    if let Some(miles) = summary.walking_miles {
        println!("Average walking distance: {miles} mi");
    }
    if let Some(miles) = summary.driving_miles {
        println!("Average driving distance: {miles} mi");
    }
}
