use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, Row};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a track table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one track per line (the usual spotify export)
/// * `.json`    – `[{ "playlist_genre": "pop", "energy": 0.8, ... }, ...]`
/// * `.parquet` – flat scalar columns with the same names as the CSV
pub fn load_file(path: &Path) -> Result<Vec<Row>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::info!("loaded {} tracks from {}", rows.len(), path.display());
    Ok(rows)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Row>> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Row>> {
    let columns: HashMap<String, usize> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(Row::from_cells(|name| {
            columns
                .get(name)
                .and_then(|&i| record.get(i))
                .map(Cell::from_text)
                .unwrap_or(Cell::Null)
        }));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, as `df.to_json(orient='records')`
/// writes it). Numbers may also arrive as strings.
fn load_json(path: &Path) -> Result<Vec<Row>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<Vec<Row>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(Row::from_cells(|name| {
                obj.get(name).map(json_to_cell).unwrap_or(Cell::Null)
            }))
        })
        .collect()
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::from_text(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::String(n.to_string())
            }
        }
        JsonValue::Null => Cell::Null,
        other => Cell::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per track field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Row>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        for row in 0..batch.num_rows() {
            rows.push(Row::from_cells(|name| match schema.index_of(name) {
                Ok(idx) => extract_cell(batch.column(idx), row),
                Err(_) => Cell::Null,
            }));
        }
    }
    Ok(rows)
}

/// Extract a single scalar value from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|s| Cell::String(s.value(row).to_string()))
            .unwrap_or(Cell::Null),
        DataType::LargeUtf8 => Cell::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| Cell::Integer(a.value(row) as i64))
            .unwrap_or(Cell::Null),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| Cell::Integer(a.value(row)))
            .unwrap_or(Cell::Null),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| Cell::Float(a.value(row) as f64))
            .unwrap_or(Cell::Null),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| Cell::Float(a.value(row)))
            .unwrap_or(Cell::Null),
        other => {
            log::debug!("ignoring parquet column of type {other:?}");
            Cell::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
track_name,track_artist,track_popularity,track_album_release_date,playlist_genre,playlist_subgenre,energy,danceability,tempo
Song A,Artist,75,2019-06-14,Pop,dance pop,0.8,0.7,120.5
Song B,Artist,,,rock,  classic rock ,0.5,,98
";

    #[test]
    fn csv_rows_are_normalised() {
        let rows = read_csv(csv::Reader::from_reader(CSV.as_bytes())).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].genre, "pop");
        assert_eq!(rows[0].year, Some(2019));
        assert_eq!(rows[0].popularity, 75.0);
        assert_eq!(rows[1].subgenre, "classic rock");
        assert_eq!(rows[1].year, None);
        assert!(rows[1].popularity.is_nan());
        assert!(rows[1].danceability.is_nan());
        assert!(rows[1].valence.is_nan());
    }

    #[test]
    fn json_accepts_numbers_and_strings() {
        let rows = parse_json(
            r#"[{"playlist_genre": "latin", "track_popularity": "81", "energy": 0.9, "year": 2015},
                {"playlist_genre": null, "energy": null}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].popularity, 81.0);
        assert_eq!(rows[0].year, Some(2015));
        assert_eq!(rows[1].genre, "");
        assert!(rows[1].energy.is_nan());
    }

    #[test]
    fn json_rejects_non_array() {
        assert!(parse_json(r#"{"playlist_genre": "pop"}"#).is_err());
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let rows = load_file(file.path()).unwrap();
        assert_eq!(rows.len(), 2);

        let other = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(load_file(other.path()).is_err());
    }
}
