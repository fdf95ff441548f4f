//! Track-level charts: the energy/danceability scatter, the hit split, and
//! the headline counts.

use serde::Serialize;

use super::genre::GenreType;
use super::{is_focus_genre, ViewKind, DIVERSITY_FEATURES};
use crate::data::filter::{select, FilterState};
use crate::data::model::{HitFlag, Row};
use crate::stats::is_usable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub genre: String,
    pub danceability: f64,
    pub energy: f64,
    pub track_name: String,
    pub track_artist: String,
    pub popularity: f64,
    /// Drawn emphasised when the genre passes the current genre selection.
    pub highlighted: bool,
}

/// One point per focus-genre track with usable danceability and energy.
pub fn energy_danceability(rows: &[Row], filters: &FilterState) -> Vec<ScatterPoint> {
    let scoped = ViewKind::EnergyDanceability.scope(filters);
    select(rows, &scoped)
        .into_iter()
        .filter(|r| is_focus_genre(&r.genre))
        .filter(|r| is_usable(r.danceability) && is_usable(r.energy))
        .map(|r| ScatterPoint {
            genre: r.genre.clone(),
            danceability: r.danceability,
            energy: r.energy,
            track_name: r.track_name.clone(),
            track_artist: r.track_artist.clone(),
            popularity: r.popularity,
            highlighted: filters.genre_selected(&r.genre),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HitCount {
    pub key: HitFlag,
    pub count: usize,
}

/// Hit and Non-Hit counts, always both and in that order.
pub fn hit_distribution(rows: &[Row], filters: &FilterState) -> Vec<HitCount> {
    let scoped = ViewKind::HitDistribution.scope(filters);
    let (hits, misses) = select(rows, &scoped)
        .into_iter()
        .fold((0, 0), |(h, n), r| match r.hit_flag() {
            HitFlag::Hit => (h + 1, n),
            HitFlag::NonHit => (h, n + 1),
        });
    vec![
        HitCount {
            key: HitFlag::Hit,
            count: hits,
        },
        HitCount {
            key: HitFlag::NonHit,
            count: misses,
        },
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackCounts {
    pub total: usize,
    pub filtered: usize,
    pub focus_points: usize,
    pub modern: usize,
    pub traditional: usize,
    /// Filtered tracks with every diversity feature present.
    pub complete_features: usize,
}

pub fn track_counts(rows: &[Row], filters: &FilterState) -> TrackCounts {
    let scoped = ViewKind::TrackCounts.scope(filters);
    let filtered = select(rows, &scoped);

    let mut counts = TrackCounts {
        total: rows.len(),
        filtered: filtered.len(),
        ..TrackCounts::default()
    };
    for row in &filtered {
        if is_focus_genre(&row.genre) {
            counts.focus_points += 1;
        }
        match GenreType::classify(&row.genre) {
            GenreType::Modern => counts.modern += 1,
            GenreType::Traditional => counts.traditional += 1,
        }
        if DIVERSITY_FEATURES.iter().all(|f| is_usable(row.feature(*f))) {
            counts.complete_features += 1;
        }
    }
    counts
}
