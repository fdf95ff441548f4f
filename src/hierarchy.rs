//! Genre → subgenre tree of track counts for the packed-circle view.

use serde::Serialize;

use crate::aggregate::group_by2;
use crate::data::model::Row;
use crate::stats::{is_usable, mean};

/// Leaf name used when a track has no subgenre.
pub const UNKNOWN_SUBGENRE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgenreLeaf {
    pub name: String,
    /// Tracks in this subgenre within the filtered subset.
    pub weight: usize,
    /// Mean over tracks with positive popularity; 0 when there are none.
    pub avg_popularity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreNode {
    pub name: String,
    /// Sum of the leaf weights.
    pub weight: usize,
    pub children: Vec<SubgenreLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreTree {
    pub name: String,
    pub weight: usize,
    pub children: Vec<GenreNode>,
}

impl GenreTree {
    pub fn leaves(&self) -> impl Iterator<Item = &SubgenreLeaf> {
        self.children.iter().flat_map(|g| g.children.iter())
    }

    /// Order genres and their leaves by descending weight (stable).
    pub fn sort_by_weight(&mut self) {
        self.children.sort_by(|a, b| b.weight.cmp(&a.weight));
        for genre in &mut self.children {
            genre.children.sort_by(|a, b| b.weight.cmp(&a.weight));
        }
    }
}

fn subgenre_key(row: &Row) -> String {
    let sub = row.subgenre.trim();
    if sub.is_empty() {
        UNKNOWN_SUBGENRE.to_string()
    } else {
        sub.to_string()
    }
}

/// Build the tree from an already filtered subset.
///
/// Tracks with a blank genre are left out. Genres and leaves appear in first
/// occurrence order. Every group holds at least one track, so no genre is
/// emitted without leaves.
pub fn build<'a, I>(rows: I) -> GenreTree
where
    I: IntoIterator<Item = &'a Row>,
{
    let grouped = group_by2(
        rows.into_iter().filter(|r| !r.genre.trim().is_empty()),
        |r| r.genre.trim().to_lowercase(),
        |r| subgenre_key(r),
        |members| {
            let positive: Vec<f64> = members
                .iter()
                .map(|r| r.popularity)
                .filter(|p| is_usable(*p) && *p > 0.0)
                .collect();
            let avg = if positive.is_empty() { 0.0 } else { mean(&positive) };
            (members.len(), avg)
        },
    );

    let children: Vec<GenreNode> = grouped
        .into_iter()
        .map(|(genre, subgenres)| {
            let leaves: Vec<SubgenreLeaf> = subgenres
                .into_iter()
                .map(|(name, (weight, avg_popularity))| SubgenreLeaf {
                    name,
                    weight,
                    avg_popularity,
                })
                .collect();
            GenreNode {
                name: genre,
                weight: leaves.iter().map(|l| l.weight).sum(),
                children: leaves,
            }
        })
        .collect();

    GenreTree {
        name: "Genres".to_string(),
        weight: children.iter().map(|g| g.weight).sum(),
        children,
    }
}
