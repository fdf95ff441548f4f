//! # popscope
//!
//! Reactive analytics over a table of music tracks. A shared
//! [`FilterState`](data::filter::FilterState) drives thirteen derived,
//! chart-ready views (grouped aggregates, correlations, smoothed yearly
//! series, a genre → subgenre tree), all rebuilt together whenever the
//! filters change or the viewport is resized.
//!
//! ```no_run
//! use std::sync::Arc;
//! use popscope::config::DashboardConfig;
//! use popscope::data::store::RowStore;
//! use popscope::state::Dashboard;
//!
//! # async fn demo() {
//! let store = Arc::new(RowStore::from_path("spotify_songs.csv"));
//! let mut dashboard = Dashboard::new(store, &DashboardConfig::default());
//! dashboard.load().await;
//! let views = dashboard.toggle_genre("pop").await;
//! for row in views.genre_rollup().unwrap_or_default() {
//!     println!("{} {} {:.1}", row.genre, row.track_count, row.avg_popularity);
//! }
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod hierarchy;
pub mod scheduler;
pub mod smoothing;
pub mod state;
pub mod stats;
pub mod views;
