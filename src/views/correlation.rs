//! Correlation charts. Every pair is aligned per row and dropped when either
//! side is missing before [`pearson`] sees it.

use serde::Serialize;

use super::{ViewKind, CORRELATED_FEATURES};
use crate::data::filter::{select, FilterState};
use crate::data::model::{Feature, Row};
use crate::stats::{pearson, usable_pairs};

fn correlate(rows: &[&Row], x: impl Fn(&Row) -> f64, y: impl Fn(&Row) -> f64) -> f64 {
    let (xs, ys) = usable_pairs(rows.iter().map(|&r| (x(r), y(r))));
    pearson(&xs, &ys)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCorrelation {
    pub feature: Feature,
    pub correlation: f64,
}

/// Correlation of each audio feature with popularity.
pub fn popularity_correlation(rows: &[Row], filters: &FilterState) -> Vec<FeatureCorrelation> {
    let scoped = ViewKind::PopularityCorrelation.scope(filters);
    let subset = select(rows, &scoped);
    CORRELATED_FEATURES
        .iter()
        .map(|&feature| FeatureCorrelation {
            feature,
            correlation: correlate(&subset, |r| r.feature(feature), |r| r.popularity),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixCell {
    pub row: Feature,
    pub column: Feature,
    pub correlation: f64,
}

/// Feature × feature correlations, row-major.
pub fn correlation_matrix(rows: &[Row], filters: &FilterState) -> Vec<MatrixCell> {
    let scoped = ViewKind::CorrelationMatrix.scope(filters);
    let subset = select(rows, &scoped);
    let mut cells = Vec::with_capacity(CORRELATED_FEATURES.len() * CORRELATED_FEATURES.len());
    for &row in &CORRELATED_FEATURES {
        for &column in &CORRELATED_FEATURES {
            cells.push(MatrixCell {
                row,
                column,
                correlation: correlate(&subset, |r| r.feature(row), |r| r.feature(column)),
            });
        }
    }
    cells
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: Feature,
    /// Absolute correlation with popularity.
    pub importance: f64,
}

/// All features ranked by the strength of their popularity correlation.
pub fn feature_importance(rows: &[Row], filters: &FilterState) -> Vec<FeatureImportance> {
    let scoped = ViewKind::FeatureImportance.scope(filters);
    let subset = select(rows, &scoped);
    let mut out: Vec<FeatureImportance> = Feature::ALL
        .iter()
        .map(|&feature| FeatureImportance {
            feature,
            importance: correlate(&subset, |r| r.feature(feature), |r| r.popularity).abs(),
        })
        .collect();
    out.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    out
}
