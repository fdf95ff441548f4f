//! Yearly trend charts.

use serde::Serialize;

use super::{is_focus_genre, ViewKind, MAX_EVOLUTION_YEAR, MIN_TREND_YEAR};
use crate::aggregate::{group_by, group_by2, groups};
use crate::data::filter::{select, FilterState};
use crate::data::model::Row;
use crate::smoothing::smooth_series;
use crate::stats::{is_usable, mean, usable};

fn yearly_mean(members: &[&Row], value: impl Fn(&Row) -> f64) -> f64 {
    mean(&usable(members.iter().map(|&r| value(r))))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempoEnergyPoint {
    pub year: i32,
    pub avg_tempo: f64,
    pub avg_energy: f64,
}

/// Mean tempo and energy per year, for tracks with both values.
pub fn tempo_energy_trend(rows: &[Row], filters: &FilterState) -> Vec<TempoEnergyPoint> {
    let scoped = ViewKind::TempoEnergyTrend.scope(filters);
    let dated = select(rows, &scoped).into_iter().filter_map(|r| match r.year {
        Some(year) if year >= MIN_TREND_YEAR && is_usable(r.tempo) && is_usable(r.energy) => {
            Some((year, r))
        }
        _ => None,
    });

    let mut out: Vec<TempoEnergyPoint> = group_by(
        dated,
        |(year, _)| *year,
        |members| {
            let rows: Vec<&Row> = members.iter().map(|(_, r)| *r).collect();
            (yearly_mean(&rows, |r| r.tempo), yearly_mean(&rows, |r| r.energy))
        },
    )
    .into_iter()
    .map(|(year, (avg_tempo, avg_energy))| TempoEnergyPoint {
        year,
        avg_tempo,
        avg_energy,
    })
    .collect();
    out.sort_by_key(|p| p.year);
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub year: i32,
    pub genre: String,
    /// Smoothed mean popularity.
    pub popularity: f64,
    pub raw_popularity: f64,
}

/// Mean popularity per year for each focus genre, smoothed over a centered
/// five-year window.
pub fn popularity_timeline(rows: &[Row], filters: &FilterState) -> Vec<TimelinePoint> {
    let scoped = ViewKind::PopularityTimeline.scope(filters);
    let dated = select(rows, &scoped).into_iter().filter_map(|r| match r.year {
        Some(year) if year >= MIN_TREND_YEAR && is_focus_genre(&r.genre) => Some((year, r)),
        _ => None,
    });

    let yearly = group_by2(
        dated,
        |(year, _)| *year,
        |(_, r)| r.genre.clone(),
        |members| mean(&usable(members.iter().map(|(_, r)| r.popularity))),
    );

    // Years where no track had a usable popularity have nothing to plot.
    let points = yearly.into_iter().flat_map(|(year, genres)| {
        genres
            .into_iter()
            .filter(|(_, popularity)| is_usable(*popularity))
            .map(move |(genre, popularity)| (year, genre, popularity))
    });

    let mut out = Vec::new();
    for (_, mut series) in groups(points, |(_, genre, _)| genre.clone()) {
        series.sort_by_key(|(year, _, _)| *year);
        let smoothed = smooth_series(&series, |(_, _, popularity)| *popularity);
        for ((year, genre, raw), popularity) in series.into_iter().zip(smoothed) {
            out.push(TimelinePoint {
                year,
                genre,
                popularity,
                raw_popularity: raw,
            });
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureEvolutionPoint {
    pub year: i32,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
}

/// Yearly means of energy, danceability and valence.
pub fn feature_evolution(rows: &[Row], filters: &FilterState) -> Vec<FeatureEvolutionPoint> {
    let scoped = ViewKind::FeatureEvolution.scope(filters);
    let dated = select(rows, &scoped).into_iter().filter(|r| {
        r.year
            .is_some_and(|y| (MIN_TREND_YEAR..=MAX_EVOLUTION_YEAR).contains(&y))
    });

    let mut out: Vec<FeatureEvolutionPoint> = group_by(
        dated,
        |r| r.year.unwrap_or_default(),
        |members| {
            (
                yearly_mean(members, |r| r.energy),
                yearly_mean(members, |r| r.danceability),
                yearly_mean(members, |r| r.valence),
            )
        },
    )
    .into_iter()
    .map(|(year, (energy, danceability, valence))| FeatureEvolutionPoint {
        year,
        energy,
        danceability,
        valence,
    })
    .collect();
    out.sort_by_key(|p| p.year);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Feature;

    fn track(genre: &str, year: i32, popularity: f64) -> Row {
        Row::new(genre, "").with_year(year).with_popularity(popularity)
    }

    #[test]
    fn tempo_energy_requires_both_features() {
        let rows = vec![
            track("pop", 2001, 50.0)
                .with_feature(Feature::Tempo, 120.0)
                .with_feature(Feature::Energy, 0.6),
            track("pop", 2000, 50.0)
                .with_feature(Feature::Tempo, 100.0)
                .with_feature(Feature::Energy, 0.4),
            track("pop", 2000, 50.0)
                .with_feature(Feature::Tempo, 140.0)
                .with_feature(Feature::Energy, 0.8),
            track("pop", 2000, 50.0).with_feature(Feature::Tempo, 1.0),
            track("pop", 1950, 50.0)
                .with_feature(Feature::Tempo, 90.0)
                .with_feature(Feature::Energy, 0.1),
        ];
        let trend = tempo_energy_trend(&rows, &FilterState::default());
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].year, 2000);
        assert_eq!(trend[0].avg_tempo, 120.0);
        assert!((trend[0].avg_energy - 0.6).abs() < 1e-12);
        assert_eq!(trend[1].year, 2001);
    }

    #[test]
    fn timeline_smooths_each_genre_separately() {
        let rows = vec![
            track("pop", 2003, 40.0),
            track("pop", 2001, 20.0),
            track("pop", 2002, 30.0),
            track("pop", 2000, 10.0),
            track("pop", 2004, 50.0),
            track("rock", 2000, 90.0),
            track("jazz", 2000, 10.0),
            track("rap", 1959, 10.0),
        ];
        let timeline = popularity_timeline(&rows, &FilterState::default());
        let pop: Vec<&TimelinePoint> = timeline.iter().filter(|p| p.genre == "pop").collect();
        assert_eq!(pop.len(), 5);
        assert_eq!(pop[0].year, 2000);
        assert_eq!(pop[0].popularity, 20.0); // (10 + 20 + 30) / 3
        assert_eq!(pop[2].popularity, 30.0); // all five
        assert_eq!(pop[2].raw_popularity, 30.0);

        let rock: Vec<&TimelinePoint> = timeline.iter().filter(|p| p.genre == "rock").collect();
        assert_eq!(rock.len(), 1);
        assert_eq!(rock[0].popularity, 90.0);
        assert!(timeline.iter().all(|p| p.genre != "jazz" && p.genre != "rap"));
    }

    #[test]
    fn timeline_drops_years_without_popularity() {
        let rows = vec![track("pop", 2000, f64::NAN), track("pop", 2001, 60.0)];
        let timeline = popularity_timeline(&rows, &FilterState::default());
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].year, 2001);
    }

    #[test]
    fn evolution_window_and_order() {
        let rows = vec![
            track("pop", 2024, 0.0).with_feature(Feature::Energy, 0.9),
            track("pop", 2010, 0.0).with_feature(Feature::Energy, 0.5),
            track("pop", 1990, 0.0).with_feature(Feature::Energy, 0.3),
            Row::new("pop", "").with_feature(Feature::Energy, 0.1),
        ];
        let evolution = feature_evolution(&rows, &FilterState::default());
        let years: Vec<i32> = evolution.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![1990, 2010]);
        assert_eq!(evolution[1].energy, 0.5);
        assert!(evolution[1].valence.is_nan());
    }
}
