use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Popularity at or above this value makes a track a "Hit".
pub const HIT_THRESHOLD: f64 = 70.0;

// ---------------------------------------------------------------------------
// Cell – a single raw value read from a source table
// ---------------------------------------------------------------------------

/// A dynamically-typed source cell, before normalisation into a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl Cell {
    /// Guess a cell type from CSV text.
    pub fn from_text(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Cell::Float(f);
        }
        Cell::String(s.to_string())
    }

    /// Numeric view of the cell; anything non-numeric or infinite is NaN.
    pub fn as_f64(&self) -> f64 {
        let v = match self {
            Cell::Float(v) => *v,
            Cell::Integer(i) => *i as f64,
            Cell::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            Cell::Null => f64::NAN,
        };
        if v.is_finite() {
            v
        } else {
            f64::NAN
        }
    }

    /// Textual view of the cell; `None` for null and empty strings.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::String(s) if s.is_empty() => None,
            Cell::String(s) => Some(s.clone()),
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Float(v) => Some(v.to_string()),
            Cell::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Feature – the numeric audio features carried by every row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Energy,
    Danceability,
    Valence,
    Tempo,
    Acousticness,
    Instrumentalness,
    Loudness,
    Speechiness,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Energy,
        Feature::Danceability,
        Feature::Valence,
        Feature::Tempo,
        Feature::Acousticness,
        Feature::Instrumentalness,
        Feature::Loudness,
        Feature::Speechiness,
    ];

    /// Source column name.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Energy => "energy",
            Feature::Danceability => "danceability",
            Feature::Valence => "valence",
            Feature::Tempo => "tempo",
            Feature::Acousticness => "acousticness",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Loudness => "loudness",
            Feature::Speechiness => "speechiness",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// HitFlag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HitFlag {
    #[serde(rename = "Hit")]
    Hit,
    #[serde(rename = "Non-Hit")]
    NonHit,
}

impl HitFlag {
    /// Classify a popularity value. NaN is never a hit.
    pub fn of(popularity: f64) -> Self {
        if popularity.is_finite() && popularity >= HIT_THRESHOLD {
            HitFlag::Hit
        } else {
            HitFlag::NonHit
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HitFlag::Hit => "Hit",
            HitFlag::NonHit => "Non-Hit",
        }
    }
}

impl fmt::Display for HitFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HitFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hit" => Ok(HitFlag::Hit),
            "non-hit" | "nonhit" | "non_hit" => Ok(HitFlag::NonHit),
            other => Err(format!("expected 'Hit' or 'Non-Hit', got '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one track of the table
// ---------------------------------------------------------------------------

/// A single track, normalised once at load time.
///
/// `genre` is lower-cased and trimmed, `subgenre` is trimmed. Numeric fields
/// are either finite or NaN; a missing value is never read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub track_name: String,
    pub track_artist: String,
    pub genre: String,
    pub subgenre: String,
    /// Release year, `None` when no four-digit year could be found.
    pub year: Option<i32>,
    pub popularity: f64,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    pub tempo: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub loudness: f64,
    pub speechiness: f64,
}

impl Default for Row {
    fn default() -> Self {
        Self {
            track_name: String::new(),
            track_artist: String::new(),
            genre: String::new(),
            subgenre: String::new(),
            year: None,
            popularity: f64::NAN,
            energy: f64::NAN,
            danceability: f64::NAN,
            valence: f64::NAN,
            tempo: f64::NAN,
            acousticness: f64::NAN,
            instrumentalness: f64::NAN,
            loudness: f64::NAN,
            speechiness: f64::NAN,
        }
    }
}

impl Row {
    /// Build a row with normalised genre and subgenre; everything else unset.
    pub fn new(genre: &str, subgenre: &str) -> Self {
        Self {
            genre: genre.trim().to_lowercase(),
            subgenre: subgenre.trim().to_string(),
            ..Self::default()
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = popularity;
        self
    }

    pub fn with_feature(mut self, feature: Feature, value: f64) -> Self {
        *self.feature_mut(feature) = value;
        self
    }

    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Energy => self.energy,
            Feature::Danceability => self.danceability,
            Feature::Valence => self.valence,
            Feature::Tempo => self.tempo,
            Feature::Acousticness => self.acousticness,
            Feature::Instrumentalness => self.instrumentalness,
            Feature::Loudness => self.loudness,
            Feature::Speechiness => self.speechiness,
        }
    }

    fn feature_mut(&mut self, feature: Feature) -> &mut f64 {
        match feature {
            Feature::Energy => &mut self.energy,
            Feature::Danceability => &mut self.danceability,
            Feature::Valence => &mut self.valence,
            Feature::Tempo => &mut self.tempo,
            Feature::Acousticness => &mut self.acousticness,
            Feature::Instrumentalness => &mut self.instrumentalness,
            Feature::Loudness => &mut self.loudness,
            Feature::Speechiness => &mut self.speechiness,
        }
    }

    pub fn hit_flag(&self) -> HitFlag {
        HitFlag::of(self.popularity)
    }

    /// Build a row from a column lookup over any source format.
    ///
    /// `get` returns [`Cell::Null`] for columns the source does not have.
    pub fn from_cells(get: impl Fn(&str) -> Cell) -> Self {
        let first_text = |names: &[&str]| names.iter().find_map(|n| get(n).as_text());
        let first_number = |names: &[&str]| {
            names
                .iter()
                .map(|n| get(n).as_f64())
                .find(|v| !v.is_nan())
                .unwrap_or(f64::NAN)
        };

        let genre = first_text(&["playlist_genre", "genre"]).unwrap_or_default();
        let subgenre = first_text(&["playlist_subgenre", "subgenre"]).unwrap_or_default();

        let mut row = Row::new(&genre, &subgenre);
        row.track_name = first_text(&["track_name", "name"]).unwrap_or_default();
        row.track_artist = first_text(&["track_artist", "artist"]).unwrap_or_default();
        row.year = first_text(&[
            "track_album_release_date",
            "album_release_date",
            "release_date",
            "year",
        ])
        .and_then(|date| parse_year(&date));
        row.popularity = first_number(&["track_popularity", "popularity"]);
        for feature in Feature::ALL {
            *row.feature_mut(feature) = get(feature.name()).as_f64();
        }
        row
    }
}

/// Extract the first run of four ASCII digits as a year.
pub fn parse_year(s: &str) -> Option<i32> {
    s.as_bytes()
        .windows(4)
        .find(|w| w.iter().all(u8::is_ascii_digit))
        .and_then(|w| std::str::from_utf8(w).ok())
        .and_then(|y| y.parse().ok())
}
