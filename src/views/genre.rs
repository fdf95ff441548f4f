//! Per-genre charts: volume and appeal, genre type split, diversity, and the
//! subgenre tree.

use serde::Serialize;

use super::{ViewKind, DIVERSITY_FEATURES};
use crate::aggregate::group_by;
use crate::data::filter::{select, FilterState};
use crate::data::model::Row;
use crate::hierarchy::{self, GenreTree};
use crate::stats::{is_usable, mean, or_zero, stddev, usable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreRollup {
    pub genre: String,
    pub track_count: usize,
    pub avg_popularity: f64,
    /// Whether the genre passes the current genre selection.
    pub selected: bool,
}

/// Track count and mean popularity per genre, largest first.
pub fn genre_rollup(rows: &[Row], filters: &FilterState) -> Vec<GenreRollup> {
    let scoped = ViewKind::GenreRollup.scope(filters);
    let mut out: Vec<GenreRollup> = group_by(
        select(rows, &scoped),
        |r| r.genre.clone(),
        |members| {
            let pops = usable(members.iter().map(|r| r.popularity));
            (members.len(), or_zero(mean(&pops)))
        },
    )
    .into_iter()
    .map(|(genre, (track_count, avg_popularity))| GenreRollup {
        selected: filters.genre_selected(&genre),
        genre,
        track_count,
        avg_popularity,
    })
    .collect();
    out.sort_by(|a, b| b.track_count.cmp(&a.track_count));
    out
}

// ---------------------------------------------------------------------------
// Genre type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GenreType {
    Modern,
    Traditional,
}

const TRADITIONAL_KEYWORDS: [&str; 10] = [
    "classical", "folk", "jazz", "blues", "country", "opera", "traditional", "world",
    "religious", "gospel",
];

impl GenreType {
    /// Keyword classification; anything not recognisably traditional is modern.
    pub fn classify(genre: &str) -> Self {
        let g = genre.to_lowercase();
        if TRADITIONAL_KEYWORDS.iter().any(|kw| g.contains(kw)) {
            GenreType::Traditional
        } else {
            GenreType::Modern
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreTypeProfile {
    pub genre_type: GenreType,
    pub acousticness_mean: f64,
    pub instrumentalness_mean: f64,
}

/// Mean acousticness and instrumentalness for modern vs traditional genres.
pub fn genre_type_profile(rows: &[Row], filters: &FilterState) -> Vec<GenreTypeProfile> {
    let scoped = ViewKind::GenreTypeProfile.scope(filters);
    group_by(
        select(rows, &scoped),
        |r| GenreType::classify(&r.genre),
        |members| {
            let acoustic = usable(members.iter().map(|r| r.acousticness));
            let instrumental = usable(members.iter().map(|r| r.instrumentalness));
            (or_zero(mean(&acoustic)), or_zero(mean(&instrumental)))
        },
    )
    .into_iter()
    .map(|(genre_type, (acousticness_mean, instrumentalness_mean))| GenreTypeProfile {
        genre_type,
        acousticness_mean,
        instrumentalness_mean,
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Diversity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreDiversity {
    pub genre: String,
    pub feature_diversity: f64,
}

/// Mean of the per-feature standard deviations within each genre, most
/// diverse first.
pub fn feature_diversity(rows: &[Row], filters: &FilterState) -> Vec<GenreDiversity> {
    let scoped = ViewKind::FeatureDiversity.scope(filters);
    let mut out: Vec<GenreDiversity> = group_by(
        select(rows, &scoped),
        |r| {
            if r.genre.is_empty() {
                "Unknown".to_string()
            } else {
                r.genre.clone()
            }
        },
        |members| {
            let spreads: Vec<f64> = DIVERSITY_FEATURES
                .iter()
                .map(|f| stddev(&usable(members.iter().map(|r| r.feature(*f)))))
                .filter(|s| is_usable(*s))
                .collect();
            or_zero(mean(&spreads))
        },
    )
    .into_iter()
    .map(|(genre, feature_diversity)| GenreDiversity {
        genre,
        feature_diversity,
    })
    .collect();
    out.sort_by(|a, b| b.feature_diversity.total_cmp(&a.feature_diversity));
    out
}

/// Genre → subgenre tree, heaviest branches first.
pub fn subgenre_tree(rows: &[Row], filters: &FilterState) -> GenreTree {
    let scoped = ViewKind::SubgenreTree.scope(filters);
    let mut tree = hierarchy::build(select(rows, &scoped));
    tree.sort_by_weight();
    tree
}
