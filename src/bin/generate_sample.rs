use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// `value` with probability `1 - missing`, otherwise `None`.
    fn sometimes(&mut self, missing: f64, value: f64) -> Option<f64> {
        (self.next_f64() >= missing).then_some(value)
    }
}

#[derive(Debug, Serialize)]
struct SampleTrack {
    track_name: String,
    track_artist: String,
    track_popularity: Option<i64>,
    track_album_release_date: String,
    playlist_genre: String,
    playlist_subgenre: String,
    danceability: Option<f64>,
    energy: Option<f64>,
    loudness: Option<f64>,
    speechiness: Option<f64>,
    acousticness: Option<f64>,
    instrumentalness: Option<f64>,
    valence: Option<f64>,
    tempo: Option<f64>,
}

/// (genre, subgenres, mean energy, mean popularity)
const GENRES: [(&str, &[&str], f64, f64); 6] = [
    ("pop", &["dance pop", "post-teen pop", "electropop", "indie poptimism"], 0.70, 48.0),
    ("rap", &["hip hop", "southern hip hop", "gangster rap", "trap"], 0.65, 43.0),
    ("rock", &["album rock", "classic rock", "permanent wave", "hard rock"], 0.73, 41.0),
    ("latin", &["tropical", "latin pop", "reggaeton", "latin hip hop"], 0.71, 47.0),
    ("r&b", &["urban contemporary", "hip pop", "new jack swing", "neo soul"], 0.59, 41.0),
    ("edm", &["electro house", "big room", "pop edm", "progressive electro house"], 0.80, 34.0),
];

const ARTISTS: [&str; 8] = [
    "Alice", "Bob", "The Carols", "DJ Dave", "Eve & Co", "Frank", "Grace", "Heidi",
];

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn generate(rng: &mut SimpleRng, count: usize) -> Vec<SampleTrack> {
    (0..count)
        .map(|i| {
            let (genre, subgenres, energy_mu, pop_mu) = GENRES[i % GENRES.len()];
            let year = 1965 + (rng.next_u64() % 58) as i64;
            let energy = clamp01(rng.gauss(energy_mu, 0.15));
            let popularity = rng.gauss(pop_mu + (year - 1965) as f64 * 0.2, 18.0);
            let release = if rng.next_f64() < 0.02 {
                String::new()
            } else {
                format!("{year}-{:02}-{:02}", 1 + rng.next_u64() % 12, 1 + rng.next_u64() % 28)
            };
            let danceability = clamp01(rng.gauss(0.65, 0.14));
            let acousticness = clamp01(rng.gauss(0.18, 0.2));
            let instrumentalness = clamp01(rng.gauss(0.08, 0.15));
            let valence = clamp01(rng.gauss(0.5, 0.23));
            let tempo = rng.gauss(121.0, 27.0).max(40.0);
            let loudness = rng.gauss(-6.7, 3.0).min(0.0);
            let speechiness = clamp01(rng.gauss(0.1, 0.1));

            SampleTrack {
                track_name: format!("Track {i:05}"),
                track_artist: rng.pick(&ARTISTS).to_string(),
                track_popularity: rng
                    .sometimes(0.01, popularity.clamp(0.0, 100.0))
                    .map(|p| p.round() as i64),
                track_album_release_date: release,
                playlist_genre: genre.to_string(),
                playlist_subgenre: if rng.next_f64() < 0.01 {
                    String::new()
                } else {
                    rng.pick(subgenres).to_string()
                },
                danceability: rng.sometimes(0.01, danceability),
                energy: rng.sometimes(0.01, energy),
                loudness: Some(loudness),
                speechiness: Some(speechiness),
                acousticness: rng.sometimes(0.01, acousticness),
                instrumentalness: Some(instrumentalness),
                valence: rng.sometimes(0.01, valence),
                tempo: rng.sometimes(0.01, tempo),
            }
        })
        .collect()
}

fn write_csv(path: &Path, tracks: &[SampleTrack]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create output file");
    for track in tracks {
        writer.serialize(track).expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush writer");
}

fn write_parquet(path: &Path, tracks: &[SampleTrack]) {
    let text = |f: fn(&SampleTrack) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(tracks.iter().map(f).collect::<Vec<_>>()))
    };
    let number = |f: fn(&SampleTrack) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(tracks.iter().map(f).collect::<Vec<_>>()))
    };

    let float_columns: [(&str, fn(&SampleTrack) -> Option<f64>); 8] = [
        ("danceability", |t| t.danceability),
        ("energy", |t| t.energy),
        ("loudness", |t| t.loudness),
        ("speechiness", |t| t.speechiness),
        ("acousticness", |t| t.acousticness),
        ("instrumentalness", |t| t.instrumentalness),
        ("valence", |t| t.valence),
        ("tempo", |t| t.tempo),
    ];

    let mut fields = vec![
        Field::new("track_name", DataType::Utf8, false),
        Field::new("track_artist", DataType::Utf8, false),
        Field::new("track_popularity", DataType::Int64, true),
        Field::new("track_album_release_date", DataType::Utf8, false),
        Field::new("playlist_genre", DataType::Utf8, false),
        Field::new("playlist_subgenre", DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        text(|t| &t.track_name),
        text(|t| &t.track_artist),
        Arc::new(Int64Array::from(
            tracks.iter().map(|t| t.track_popularity).collect::<Vec<_>>(),
        )),
        text(|t| &t.track_album_release_date),
        text(|t| &t.playlist_genre),
        text(|t| &t.playlist_subgenre),
    ];
    for (name, getter) in float_columns {
        fields.push(Field::new(name, DataType::Float64, true));
        columns.push(number(getter));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "sample_tracks.csv".to_string());
    let count: usize = args
        .next()
        .map(|n| n.parse().expect("track count must be a number"))
        .unwrap_or(5_000);

    let mut rng = SimpleRng::new(42);
    let tracks = generate(&mut rng, count);

    let path = Path::new(&output_path);
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") | Some("pq") => write_parquet(path, &tracks),
        _ => write_csv(path, &tracks),
    }

    println!("Wrote {} tracks to {output_path}", tracks.len());
}
