use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{HitFlag, Row};

// ---------------------------------------------------------------------------
// Filter state: the shared selection every view is derived from
// ---------------------------------------------------------------------------

/// Inclusive release-year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// One filter axis. Used both to address updates and to tell a view which
/// axes it ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Genre,
    Subgenre,
    Year,
    Hit,
}

/// A `setFilter(axis, value)` call: replace one axis wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    Genres(Option<Vec<String>>),
    Subgenres(Option<Vec<String>>),
    YearRange(Option<YearRange>),
    Hit(Option<HitFlag>),
}

impl FilterUpdate {
    pub fn axis(&self) -> Axis {
        match self {
            FilterUpdate::Genres(_) => Axis::Genre,
            FilterUpdate::Subgenres(_) => Axis::Subgenre,
            FilterUpdate::YearRange(_) => Axis::Year,
            FilterUpdate::Hit(_) => Axis::Hit,
        }
    }
}

/// Four independent selectors. `None` means "no constraint"; an empty set is
/// never stored, so `None` is the only inactive representation.
///
/// Values are immutable: every mutation returns a new state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    genres: Option<BTreeSet<String>>,
    subgenres: Option<BTreeSet<String>>,
    year_range: Option<YearRange>,
    hit: Option<HitFlag>,
}

/// Shared normalisation for genre and subgenre names.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn name_set<I, S>(names: I) -> Option<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set: BTreeSet<String> = names
        .into_iter()
        .map(|n| normalize_name(n.as_ref()))
        .collect();
    (!set.is_empty()).then_some(set)
}

fn toggled(current: &Option<BTreeSet<String>>, name: &str) -> Option<BTreeSet<String>> {
    let name = normalize_name(name);
    let mut set = current.clone().unwrap_or_default();
    if !set.remove(&name) {
        set.insert(name);
    }
    (!set.is_empty()).then_some(set)
}

impl FilterState {
    pub fn genres(&self) -> Option<&BTreeSet<String>> {
        self.genres.as_ref()
    }

    pub fn subgenres(&self) -> Option<&BTreeSet<String>> {
        self.subgenres.as_ref()
    }

    pub fn year_range(&self) -> Option<YearRange> {
        self.year_range
    }

    pub fn hit(&self) -> Option<HitFlag> {
        self.hit
    }

    /// Whether no axis is active.
    pub fn is_empty(&self) -> bool {
        self.genres.is_none()
            && self.subgenres.is_none()
            && self.year_range.is_none()
            && self.hit.is_none()
    }

    /// Apply a single-axis update.
    pub fn apply(&self, update: FilterUpdate) -> Self {
        let mut next = self.clone();
        match update {
            FilterUpdate::Genres(names) => next.genres = names.and_then(name_set),
            FilterUpdate::Subgenres(names) => next.subgenres = names.and_then(name_set),
            FilterUpdate::YearRange(range) => next.year_range = range,
            FilterUpdate::Hit(flag) => next.hit = flag,
        }
        next
    }

    /// Add the genre if absent, remove it if present; removing the last one
    /// deactivates the axis.
    pub fn toggle_genre(&self, name: &str) -> Self {
        Self {
            genres: toggled(&self.genres, name),
            ..self.clone()
        }
    }

    pub fn toggle_subgenre(&self, name: &str) -> Self {
        Self {
            subgenres: toggled(&self.subgenres, name),
            ..self.clone()
        }
    }

    /// The same state with one axis switched off.
    pub fn ignoring(&self, axis: Axis) -> Self {
        let mut next = self.clone();
        match axis {
            Axis::Genre => next.genres = None,
            Axis::Subgenre => next.subgenres = None,
            Axis::Year => next.year_range = None,
            Axis::Hit => next.hit = None,
        }
        next
    }

    /// Whether a genre name passes the genre axis alone. Views use this to
    /// highlight instead of filter.
    pub fn genre_selected(&self, genre: &str) -> bool {
        match &self.genres {
            Some(set) => set.contains(&normalize_name(genre)),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// Whether `row` passes every active axis of `filters`.
///
/// A row without a parseable year fails any active year range.
pub fn passes(row: &Row, filters: &FilterState) -> bool {
    if let Some(genres) = &filters.genres {
        if !genres.contains(&normalize_name(&row.genre)) {
            return false;
        }
    }
    if let Some(subgenres) = &filters.subgenres {
        if !subgenres.contains(&normalize_name(&row.subgenre)) {
            return false;
        }
    }
    if let Some(range) = filters.year_range {
        match row.year {
            Some(year) if range.contains(year) => {}
            _ => return false,
        }
    }
    if let Some(flag) = filters.hit {
        if row.hit_flag() != flag {
            return false;
        }
    }
    true
}

/// Rows passing all active filters, in table order.
pub fn select<'a>(rows: &'a [Row], filters: &FilterState) -> Vec<&'a Row> {
    rows.iter().filter(|row| passes(row, filters)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;

    fn rows() -> Vec<Row> {
        vec![
            Row::new("pop", "Dance Pop").with_year(2019).with_popularity(75.0),
            Row::new("rock", "classic rock").with_year(2005).with_popularity(40.0),
            Row::new("rap", "trap").with_popularity(f64::NAN),
        ]
    }

    #[test]
    fn empty_state_passes_everything() {
        let rows = rows();
        assert_eq!(select(&rows, &FilterState::default()).len(), 3);
    }

    #[test]
    fn genre_match_is_case_insensitive() {
        let filters = FilterState::default()
            .apply(FilterUpdate::Genres(Some(vec!["  POP".into()])));
        let rows = rows();
        let hits = select(&rows, &filters);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].genre, "pop");
    }

    #[test]
    fn subgenre_match_is_case_insensitive() {
        let filters = FilterState::default().toggle_subgenre("dance pop ");
        assert_eq!(select(&rows(), &filters).len(), 1);
    }

    #[test]
    fn unknown_year_fails_active_range() {
        let filters = FilterState::default()
            .apply(FilterUpdate::YearRange(Some(YearRange::new(1900, 2100))));
        let rows = rows();
        let kept = select(&rows, &filters);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.year.is_some()));
    }

    #[test]
    fn nan_popularity_counts_as_non_hit() {
        let filters = FilterState::default().apply(FilterUpdate::Hit(Some(HitFlag::NonHit)));
        let rows = rows();
        let kept = select(&rows, &filters);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().any(|r| r.genre == "rap"));
    }

    #[test]
    fn empty_set_becomes_inactive() {
        let filters = FilterState::default().apply(FilterUpdate::Genres(Some(vec![])));
        assert!(filters.genres().is_none());
        assert!(filters.is_empty());
    }

    #[test]
    fn toggling_last_genre_deactivates_axis() {
        let on = FilterState::default().toggle_genre("Pop");
        assert_eq!(on.genres().map(|s| s.len()), Some(1));
        let off = on.toggle_genre("pop");
        assert!(off.genres().is_none());
    }

    #[test]
    fn year_range_orders_bounds() {
        let range = YearRange::new(2023, 2010);
        assert_eq!((range.min, range.max), (2010, 2023));
        assert!(range.contains(2010) && range.contains(2023));
        assert!(!range.contains(2005));
    }

    #[test]
    fn ignoring_switches_off_one_axis() {
        let filters = FilterState::default()
            .toggle_genre("pop")
            .apply(FilterUpdate::Hit(Some(HitFlag::Hit)));
        let relaxed = filters.ignoring(Axis::Hit);
        assert_eq!(relaxed.hit(), None);
        assert!(relaxed.genres().is_some());
    }
}
