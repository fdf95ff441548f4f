//! Derived, chart-ready views.
//!
//! Every builder is a pure function of the row table and a [`FilterState`]:
//! ```text
//!   rows + FilterState
//!        │  scope (axes the chart ignores are switched off)
//!        ▼
//!   filter::select ──► aggregate / stats / smoothing / hierarchy
//!        │
//!        ▼
//!   DerivedView  (fresh every pass, never patched)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::data::filter::{Axis, FilterState};
use crate::data::model::{Feature, Row};
use crate::error::ViewError;
use crate::hierarchy::GenreTree;

pub mod correlation;
pub mod genre;
pub mod tracks;
pub mod trend;

pub use correlation::{FeatureCorrelation, FeatureImportance, MatrixCell};
pub use genre::{GenreDiversity, GenreRollup, GenreType, GenreTypeProfile};
pub use tracks::{HitCount, ScatterPoint, TrackCounts};
pub use trend::{FeatureEvolutionPoint, TempoEnergyPoint, TimelinePoint};

/// Genres plotted individually by the scatter and timeline charts.
pub const FOCUS_GENRES: [&str; 6] = ["edm", "latin", "pop", "r&b", "rap", "rock"];

/// Earliest year shown on the yearly trend charts.
pub const MIN_TREND_YEAR: i32 = 1960;

/// Latest year shown on the feature evolution chart.
pub const MAX_EVOLUTION_YEAR: i32 = 2023;

/// Features correlated against popularity and against each other.
pub const CORRELATED_FEATURES: [Feature; 6] = [
    Feature::Valence,
    Feature::Tempo,
    Feature::Energy,
    Feature::Danceability,
    Feature::Acousticness,
    Feature::Instrumentalness,
];

/// Features whose spread measures a genre's diversity.
pub const DIVERSITY_FEATURES: [Feature; 5] = [
    Feature::Energy,
    Feature::Danceability,
    Feature::Valence,
    Feature::Tempo,
    Feature::Acousticness,
];

pub(crate) fn is_focus_genre(genre: &str) -> bool {
    FOCUS_GENRES.contains(&genre)
}

// ---------------------------------------------------------------------------
// ViewKind – one per chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewKind {
    GenreRollup,
    EnergyDanceability,
    PopularityCorrelation,
    GenreTypeProfile,
    TempoEnergyTrend,
    HitDistribution,
    FeatureDiversity,
    PopularityTimeline,
    CorrelationMatrix,
    FeatureImportance,
    FeatureEvolution,
    SubgenreTree,
    TrackCounts,
}

impl ViewKind {
    pub const ALL: [ViewKind; 13] = [
        ViewKind::GenreRollup,
        ViewKind::EnergyDanceability,
        ViewKind::PopularityCorrelation,
        ViewKind::GenreTypeProfile,
        ViewKind::TempoEnergyTrend,
        ViewKind::HitDistribution,
        ViewKind::FeatureDiversity,
        ViewKind::PopularityTimeline,
        ViewKind::CorrelationMatrix,
        ViewKind::FeatureImportance,
        ViewKind::FeatureEvolution,
        ViewKind::SubgenreTree,
        ViewKind::TrackCounts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::GenreRollup => "genre_rollup",
            ViewKind::EnergyDanceability => "energy_danceability",
            ViewKind::PopularityCorrelation => "popularity_correlation",
            ViewKind::GenreTypeProfile => "genre_type_profile",
            ViewKind::TempoEnergyTrend => "tempo_energy_trend",
            ViewKind::HitDistribution => "hit_distribution",
            ViewKind::FeatureDiversity => "feature_diversity",
            ViewKind::PopularityTimeline => "popularity_timeline",
            ViewKind::CorrelationMatrix => "correlation_matrix",
            ViewKind::FeatureImportance => "feature_importance",
            ViewKind::FeatureEvolution => "feature_evolution",
            ViewKind::SubgenreTree => "subgenre_tree",
            ViewKind::TrackCounts => "track_counts",
        }
    }

    /// Filter axes this chart does not honour. A chart that acts as the
    /// selector for an axis ignores it so the other choices stay visible.
    pub fn ignored_axes(self) -> &'static [Axis] {
        match self {
            ViewKind::GenreRollup => &[Axis::Genre, Axis::Subgenre],
            ViewKind::EnergyDanceability => &[Axis::Genre, Axis::Subgenre, Axis::Year, Axis::Hit],
            ViewKind::HitDistribution => &[Axis::Hit],
            ViewKind::SubgenreTree | ViewKind::TrackCounts => &[Axis::Subgenre],
            _ => &[],
        }
    }

    /// The filters this chart actually applies.
    pub fn scope(self, filters: &FilterState) -> FilterState {
        self.ignored_axes()
            .iter()
            .fold(filters.clone(), |acc, axis| acc.ignoring(*axis))
    }

    /// Run this chart's builder.
    pub fn build(self, rows: &[Row], filters: &FilterState) -> DerivedView {
        match self {
            ViewKind::GenreRollup => DerivedView::GenreRollup(genre::genre_rollup(rows, filters)),
            ViewKind::EnergyDanceability => {
                DerivedView::EnergyDanceability(tracks::energy_danceability(rows, filters))
            }
            ViewKind::PopularityCorrelation => {
                DerivedView::PopularityCorrelation(correlation::popularity_correlation(rows, filters))
            }
            ViewKind::GenreTypeProfile => {
                DerivedView::GenreTypeProfile(genre::genre_type_profile(rows, filters))
            }
            ViewKind::TempoEnergyTrend => {
                DerivedView::TempoEnergyTrend(trend::tempo_energy_trend(rows, filters))
            }
            ViewKind::HitDistribution => {
                DerivedView::HitDistribution(tracks::hit_distribution(rows, filters))
            }
            ViewKind::FeatureDiversity => {
                DerivedView::FeatureDiversity(genre::feature_diversity(rows, filters))
            }
            ViewKind::PopularityTimeline => {
                DerivedView::PopularityTimeline(trend::popularity_timeline(rows, filters))
            }
            ViewKind::CorrelationMatrix => {
                DerivedView::CorrelationMatrix(correlation::correlation_matrix(rows, filters))
            }
            ViewKind::FeatureImportance => {
                DerivedView::FeatureImportance(correlation::feature_importance(rows, filters))
            }
            ViewKind::FeatureEvolution => {
                DerivedView::FeatureEvolution(trend::feature_evolution(rows, filters))
            }
            ViewKind::SubgenreTree => DerivedView::SubgenreTree(genre::subgenre_tree(rows, filters)),
            ViewKind::TrackCounts => DerivedView::TrackCounts(tracks::track_counts(rows, filters)),
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        ViewKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| format!("unknown view '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// DerivedView – the output of one builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DerivedView {
    GenreRollup(Vec<GenreRollup>),
    EnergyDanceability(Vec<ScatterPoint>),
    PopularityCorrelation(Vec<FeatureCorrelation>),
    GenreTypeProfile(Vec<GenreTypeProfile>),
    TempoEnergyTrend(Vec<TempoEnergyPoint>),
    HitDistribution(Vec<HitCount>),
    FeatureDiversity(Vec<GenreDiversity>),
    PopularityTimeline(Vec<TimelinePoint>),
    CorrelationMatrix(Vec<MatrixCell>),
    FeatureImportance(Vec<FeatureImportance>),
    FeatureEvolution(Vec<FeatureEvolutionPoint>),
    SubgenreTree(GenreTree),
    TrackCounts(TrackCounts),
}

// ---------------------------------------------------------------------------
// ViewSet – one recompute pass worth of views
// ---------------------------------------------------------------------------

/// What caused a recompute pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Load,
    FilterChange,
    Resize,
}

/// All views produced by one pass, each with its own success or error state.
#[derive(Debug, Clone)]
pub struct ViewSet {
    pub pass: u64,
    pub trigger: Trigger,
    /// The filter state every view in this set was built from.
    pub filters: FilterState,
    views: BTreeMap<ViewKind, Result<DerivedView, ViewError>>,
}

impl ViewSet {
    /// Placeholder published before the first pass.
    pub fn empty() -> Self {
        Self {
            pass: 0,
            trigger: Trigger::Load,
            filters: FilterState::default(),
            views: BTreeMap::new(),
        }
    }

    pub fn new(
        pass: u64,
        trigger: Trigger,
        filters: FilterState,
        views: BTreeMap<ViewKind, Result<DerivedView, ViewError>>,
    ) -> Self {
        Self {
            pass,
            trigger,
            filters,
            views,
        }
    }

    /// Every view result in [`ViewKind`] order.
    pub fn results(&self) -> impl Iterator<Item = (ViewKind, &Result<DerivedView, ViewError>)> {
        self.views.iter().map(|(k, v)| (*k, v))
    }

    pub fn view(&self, kind: ViewKind) -> Result<&DerivedView, ViewError> {
        match self.views.get(&kind) {
            Some(Ok(view)) => Ok(view),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ViewError::NotComputed),
        }
    }

    pub fn genre_rollup(&self) -> Result<&[GenreRollup], ViewError> {
        let DerivedView::GenreRollup(v) = self.view(ViewKind::GenreRollup)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn energy_danceability(&self) -> Result<&[ScatterPoint], ViewError> {
        let DerivedView::EnergyDanceability(v) = self.view(ViewKind::EnergyDanceability)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn popularity_correlation(&self) -> Result<&[FeatureCorrelation], ViewError> {
        let DerivedView::PopularityCorrelation(v) = self.view(ViewKind::PopularityCorrelation)?
        else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn genre_type_profile(&self) -> Result<&[GenreTypeProfile], ViewError> {
        let DerivedView::GenreTypeProfile(v) = self.view(ViewKind::GenreTypeProfile)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn tempo_energy_trend(&self) -> Result<&[TempoEnergyPoint], ViewError> {
        let DerivedView::TempoEnergyTrend(v) = self.view(ViewKind::TempoEnergyTrend)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn hit_distribution(&self) -> Result<&[HitCount], ViewError> {
        let DerivedView::HitDistribution(v) = self.view(ViewKind::HitDistribution)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn feature_diversity(&self) -> Result<&[GenreDiversity], ViewError> {
        let DerivedView::FeatureDiversity(v) = self.view(ViewKind::FeatureDiversity)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn popularity_timeline(&self) -> Result<&[TimelinePoint], ViewError> {
        let DerivedView::PopularityTimeline(v) = self.view(ViewKind::PopularityTimeline)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn correlation_matrix(&self) -> Result<&[MatrixCell], ViewError> {
        let DerivedView::CorrelationMatrix(v) = self.view(ViewKind::CorrelationMatrix)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn feature_importance(&self) -> Result<&[FeatureImportance], ViewError> {
        let DerivedView::FeatureImportance(v) = self.view(ViewKind::FeatureImportance)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn feature_evolution(&self) -> Result<&[FeatureEvolutionPoint], ViewError> {
        let DerivedView::FeatureEvolution(v) = self.view(ViewKind::FeatureEvolution)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn subgenre_tree(&self) -> Result<&GenreTree, ViewError> {
        let DerivedView::SubgenreTree(v) = self.view(ViewKind::SubgenreTree)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }

    pub fn track_counts(&self) -> Result<&TrackCounts, ViewError> {
        let DerivedView::TrackCounts(v) = self.view(ViewKind::TrackCounts)? else {
            return Err(ViewError::NotComputed);
        };
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterUpdate, YearRange};
    use crate::data::model::HitFlag;

    /// The three-track table used throughout the view tests.
    pub(crate) fn scenario_rows() -> Vec<Row> {
        vec![
            Row::new("pop", "dance pop")
                .with_year(2019)
                .with_popularity(75.0)
                .with_feature(Feature::Energy, 0.8),
            Row::new("pop", "dance pop")
                .with_year(2019)
                .with_popularity(60.0)
                .with_feature(Feature::Energy, 0.6),
            Row::new("rock", "classic rock")
                .with_year(2005)
                .with_popularity(40.0)
                .with_feature(Feature::Energy, 0.5),
        ]
    }

    fn build_all(rows: &[Row], filters: &FilterState) -> ViewSet {
        let views = ViewKind::ALL
            .into_iter()
            .map(|k| (k, Ok(k.build(rows, filters))))
            .collect();
        ViewSet::new(1, Trigger::FilterChange, filters.clone(), views)
    }

    #[test]
    fn hit_filter_leaves_hit_distribution_whole() {
        let rows = scenario_rows();
        let filters = FilterState::default().apply(FilterUpdate::Hit(Some(HitFlag::Hit)));
        let set = build_all(&rows, &filters);
        let counts = set.hit_distribution().unwrap();
        assert_eq!(counts[0], HitCount { key: HitFlag::Hit, count: 1 });
        assert_eq!(counts[1], HitCount { key: HitFlag::NonHit, count: 2 });
    }

    #[test]
    fn unfiltered_genre_rollup() {
        let rows = scenario_rows();
        let set = build_all(&rows, &FilterState::default());
        let rollup = set.genre_rollup().unwrap();
        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].genre, "pop");
        assert_eq!(rollup[0].track_count, 2);
        assert_eq!(rollup[0].avg_popularity, 67.5);
        assert_eq!(rollup[1].genre, "rock");
        assert_eq!(rollup[1].track_count, 1);
        assert_eq!(rollup[1].avg_popularity, 40.0);
    }

    #[test]
    fn year_range_drops_rock_everywhere_it_applies() {
        let rows = scenario_rows();
        let filters =
            FilterState::default().apply(FilterUpdate::YearRange(Some(YearRange::new(2010, 2023))));
        let set = build_all(&rows, &filters);

        assert!(set.genre_rollup().unwrap().iter().all(|g| g.genre != "rock"));
        assert!(set
            .subgenre_tree()
            .unwrap()
            .children
            .iter()
            .all(|g| g.name != "rock"));
        assert!(set.feature_diversity().unwrap().iter().all(|g| g.genre != "rock"));
        let hits: usize = set.hit_distribution().unwrap().iter().map(|h| h.count).sum();
        assert_eq!(hits, 2);
        assert_eq!(set.track_counts().unwrap().filtered, 2);
    }

    #[test]
    fn empty_subset_builds_empty_views() {
        let rows = scenario_rows();
        let filters = FilterState::default().toggle_genre("jazz");
        let set = build_all(&rows, &filters);

        assert!(set.tempo_energy_trend().unwrap().is_empty());
        assert!(set.popularity_timeline().unwrap().is_empty());
        assert!(set.subgenre_tree().unwrap().children.is_empty());
        assert!(set
            .popularity_correlation()
            .unwrap()
            .iter()
            .all(|c| c.correlation == 0.0));
        assert!(set.feature_importance().unwrap().iter().all(|c| c.importance == 0.0));
    }

    #[test]
    fn same_filters_same_views() {
        let rows = scenario_rows();
        let filters = FilterState::default().toggle_genre("pop");
        for kind in ViewKind::ALL {
            // NaN summaries serialise as null, so compare the JSON form.
            let first = serde_json::to_string(&kind.build(&rows, &filters)).unwrap();
            let second = serde_json::to_string(&kind.build(&rows, &filters)).unwrap();
            assert_eq!(first, second, "{kind}");
        }
    }

    #[test]
    fn missing_view_is_not_computed() {
        let set = ViewSet::empty();
        assert_eq!(set.genre_rollup().unwrap_err(), ViewError::NotComputed);
    }

    #[test]
    fn view_kind_names_round_trip() {
        for kind in ViewKind::ALL {
            assert_eq!(kind.name().parse::<ViewKind>(), Ok(kind));
        }
        assert_eq!("hit-distribution".parse::<ViewKind>(), Ok(ViewKind::HitDistribution));
    }

    #[test]
    fn scope_switches_off_ignored_axes() {
        let filters = FilterState::default()
            .toggle_genre("pop")
            .toggle_subgenre("dance pop")
            .apply(FilterUpdate::Hit(Some(HitFlag::Hit)));
        let tree = ViewKind::SubgenreTree.scope(&filters);
        assert!(tree.genres().is_some());
        assert!(tree.subgenres().is_none());
        assert!(ViewKind::EnergyDanceability.scope(&filters).is_empty());
        assert_eq!(ViewKind::CorrelationMatrix.scope(&filters), filters);
    }
}
