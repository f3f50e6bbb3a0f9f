use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::temporal_conversions::date32_to_datetime;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Diagnostics, FigureDataset, FigureRecord};

// ---------------------------------------------------------------------------
// Source schema
// ---------------------------------------------------------------------------

// Canonical rename table: source column → normalized field.
const COL_CATEGORY: &str = "console-name";
const COL_NAME: &str = "product-name";
const COL_PRICE: &str = "new-price";
const COL_VOLUME: &str = "sales-volume";
const COL_RELEASE_DATE: &str = "release-date";

/// Accepted release-date format.
const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Options & errors
// ---------------------------------------------------------------------------

/// Coercion and exclusion policy for a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// When true, price and volume must parse as plain numerics; no
    /// currency-symbol or thousands-separator stripping is attempted.
    /// Residue still degrades to null, never to an error.
    pub strict_numeric_coercion: bool,
    /// Drop records with non-null `volume <= threshold` at load time.
    /// `None` disables the baseline exclusion. Null-volume records are
    /// always retained through this step.
    pub exclude_low_volume_threshold: Option<i64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            strict_numeric_coercion: false,
            exclude_low_volume_threshold: Some(1),
        }
    }
}

/// Structural load failures. Value-level malformation is not represented
/// here: it degrades to null on the record and is tallied in
/// [`Diagnostics`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not a well-formed table.
    #[error("could not parse {format} input: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// A required source column is absent after renaming. Carries the
    /// columns actually present to aid diagnosis.
    #[error("required column '{missing}' not found (columns present: {})", .present.join(", "))]
    Schema {
        missing: &'static str,
        present: Vec<String>,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a figure-sale dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the source column names
/// * `.json`    – records-oriented array, `[{ "console-name": ..., ... }]`
/// * `.parquet` – flat scalar columns named like the CSV header
///
/// Deterministic for a given input: no caching, no global state. Extra
/// columns in any format are ignored.
pub fn load_file(
    path: &Path,
    options: &LoadOptions,
) -> Result<(FigureDataset, Diagnostics), LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)?;
            load_csv_from_reader(file, options)
        }
        "json" => {
            let text = std::fs::read_to_string(path)?;
            load_json_str(&text, options)
        }
        "parquet" | "pq" => load_parquet(path, options),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Raw cells – one untyped value from any source format
// ---------------------------------------------------------------------------

/// A raw cell before coercion. CSV produces only `Str`/`Null`; JSON and
/// Parquet can carry typed numerics and (Parquet) native dates.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Str(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Null,
}

/// The five source cells of one row, pre-rename.
#[derive(Debug, Clone)]
struct RawRow {
    category: Cell,
    name: Cell,
    price: Cell,
    volume: Cell,
    release_date: Cell,
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

fn coerce_text(cell: &Cell) -> String {
    match cell {
        Cell::Str(s) => s.trim().to_string(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Date(d) => d.to_string(),
        Cell::Null => String::new(),
    }
}

fn coerce_price(cell: &Cell, options: &LoadOptions) -> Option<f64> {
    match cell {
        Cell::Float(f) if f.is_finite() => Some(*f),
        Cell::Int(i) => Some(*i as f64),
        Cell::Str(s) => parse_price_str(s, options.strict_numeric_coercion),
        _ => None,
    }
}

fn coerce_volume(cell: &Cell, options: &LoadOptions) -> Option<i64> {
    match cell {
        Cell::Int(i) => Some(*i),
        Cell::Float(f) if f.is_finite() => Some(f.round() as i64),
        Cell::Str(s) => parse_volume_str(s, options.strict_numeric_coercion),
        _ => None,
    }
}

fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Str(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok(),
        _ => None,
    }
}

/// Parse a price cell. Lenient mode strips currency symbols and
/// thousands-separator commas before the numeric parse.
fn parse_price_str(s: &str, strict: bool) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = if strict {
        trimmed.to_string()
    } else {
        trimmed
            .chars()
            .filter(|c| !matches!(c, '$' | '€' | '£' | ','))
            .collect()
    };
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a volume cell. Integer-valued floats are accepted; fractional
/// values round.
fn parse_volume_str(s: &str, strict: bool) -> Option<i64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = if strict {
        trimmed.to_string()
    } else {
        trimmed.chars().filter(|c| *c != ',').collect()
    };
    let cleaned = cleaned.trim();
    if let Ok(v) = cleaned.parse::<i64>() {
        return Some(v);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
}

/// Rename + coerce one raw row into a normalized record.
fn normalize(row: &RawRow, options: &LoadOptions) -> FigureRecord {
    FigureRecord::new(
        coerce_text(&row.category),
        coerce_text(&row.name),
        coerce_price(&row.price, options),
        coerce_volume(&row.volume, options),
        coerce_date(&row.release_date),
    )
}

/// Apply baseline exclusion and compute diagnostics over the retained
/// records.
fn finish(
    records: Vec<FigureRecord>,
    options: &LoadOptions,
) -> (FigureDataset, Diagnostics) {
    let total_rows = records.len();
    let retained: Vec<FigureRecord> = match options.exclude_low_volume_threshold {
        Some(threshold) => records
            .into_iter()
            .filter(|r| r.volume.map_or(true, |v| v > threshold))
            .collect(),
        None => records,
    };

    let mut diagnostics = Diagnostics {
        total_rows,
        dropped_low_volume: total_rows - retained.len(),
        ..Diagnostics::default()
    };
    for rec in &retained {
        if rec.price.is_none() {
            diagnostics.null_price += 1;
        }
        if rec.volume.is_none() {
            diagnostics.null_volume += 1;
        }
        if rec.release_date.is_none() {
            diagnostics.null_release_date += 1;
        }
    }

    (FigureDataset::from_records(retained), diagnostics)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv_from_reader<R: Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<(FigureDataset, Diagnostics), LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Parse {
            format: "CSV",
            message: format!("reading headers: {e}"),
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);

    // Only the price column is schema-mandatory; the rest degrade to
    // empty/null per record.
    let price_idx = position(COL_PRICE).ok_or_else(|| LoadError::Schema {
        missing: COL_PRICE,
        present: headers.clone(),
    })?;
    let category_idx = position(COL_CATEGORY);
    let name_idx = position(COL_NAME);
    let volume_idx = position(COL_VOLUME);
    let date_idx = position(COL_RELEASE_DATE);

    let cell = |record: &csv::StringRecord, idx: Option<usize>| -> Cell {
        match idx.and_then(|i| record.get(i)) {
            Some(v) if !v.trim().is_empty() => Cell::Str(v.to_string()),
            _ => Cell::Null,
        }
    };

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Parse {
            format: "CSV",
            message: format!("row {row_no}: {e}"),
        })?;

        let raw = RawRow {
            category: cell(&record, category_idx),
            name: cell(&record, name_idx),
            price: cell(&record, Some(price_idx)),
            volume: cell(&record, volume_idx),
            release_date: cell(&record, date_idx),
        };
        records.push(normalize(&raw, options));
    }

    Ok(finish(records, options))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "console-name": "Animation",
///     "product-name": "Kitsune",
///     "new-price": "$12.50",
///     "sales-volume": 4,
///     "release-date": "2020-06-01"
///   },
///   ...
/// ]
/// ```
fn load_json_str(
    text: &str,
    options: &LoadOptions,
) -> Result<(FigureDataset, Diagnostics), LoadError> {
    let root: JsonValue = serde_json::from_str(text).map_err(|e| LoadError::Parse {
        format: "JSON",
        message: e.to_string(),
    })?;

    let rows = root.as_array().ok_or_else(|| LoadError::Parse {
        format: "JSON",
        message: "expected top-level array of records".to_string(),
    })?;

    let mut present: BTreeSet<String> = BTreeSet::new();
    let mut raws = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or_else(|| LoadError::Parse {
            format: "JSON",
            message: format!("row {i} is not an object"),
        })?;
        present.extend(obj.keys().cloned());

        let cell = |key: &str| -> Cell {
            obj.get(key).map(cell_from_json).unwrap_or(Cell::Null)
        };
        raws.push(RawRow {
            category: cell(COL_CATEGORY),
            name: cell(COL_NAME),
            price: cell(COL_PRICE),
            volume: cell(COL_VOLUME),
            release_date: cell(COL_RELEASE_DATE),
        });
    }

    if !raws.is_empty() && !present.contains(COL_PRICE) {
        return Err(LoadError::Schema {
            missing: COL_PRICE,
            present: present.into_iter().collect(),
        });
    }

    let records = raws.iter().map(|raw| normalize(raw, options)).collect();
    Ok(finish(records, options))
}

fn cell_from_json(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Str(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Int(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Str(n.to_string())
            }
        }
        JsonValue::Null => Cell::Null,
        other => Cell::Str(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of sale records.
///
/// Expected schema: flat scalar columns named like the CSV header. Numeric
/// columns (Int32/Int64/Float32/Float64) feed coercion directly; string
/// columns go through the same parsers as CSV cells; `release-date` may
/// also be a native Date32 column. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(
    path: &Path,
    options: &LoadOptions,
) -> Result<(FigureDataset, Diagnostics), LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
        LoadError::Parse {
            format: "Parquet",
            message: format!("reading metadata: {e}"),
        }
    })?;
    // Schema check runs on the file schema, before any batch is read, so
    // an empty file with a missing price column still fails the same way.
    let schema = builder.schema().clone();
    let index_of = |name: &str| schema.index_of(name).ok();
    let price_idx = index_of(COL_PRICE).ok_or_else(|| LoadError::Schema {
        missing: COL_PRICE,
        present: schema.fields().iter().map(|f| f.name().clone()).collect(),
    })?;
    let category_idx = index_of(COL_CATEGORY);
    let name_idx = index_of(COL_NAME);
    let volume_idx = index_of(COL_VOLUME);
    let date_idx = index_of(COL_RELEASE_DATE);

    let reader = builder.build().map_err(|e| LoadError::Parse {
        format: "Parquet",
        message: format!("building reader: {e}"),
    })?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| LoadError::Parse {
            format: "Parquet",
            message: format!("reading record batch: {e}"),
        })?;

        for row in 0..batch.num_rows() {
            let cell = |idx: Option<usize>| -> Cell {
                idx.map(|i| cell_from_column(batch.column(i), row))
                    .unwrap_or(Cell::Null)
            };
            let raw = RawRow {
                category: cell(category_idx),
                name: cell(name_idx),
                price: cell_from_column(batch.column(price_idx), row),
                volume: cell(volume_idx),
                release_date: cell(date_idx),
            };
            records.push(normalize(&raw, options));
        }
    }

    Ok(finish(records, options))
}

/// Extract a single scalar cell from an Arrow column at a given row.
fn cell_from_column(col: &Arc<dyn Array>, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                Cell::Str(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                Cell::Str(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Cell::Int(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Cell::Int(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Cell::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Cell::Float(arr.value(row))
        }
        DataType::Date32 => {
            let arr = col.as_any().downcast_ref::<Date32Array>().unwrap();
            match date32_to_datetime(arr.value(row)) {
                Some(dt) => Cell::Date(dt.date()),
                None => Cell::Null,
            }
        }
        _ => Cell::Str(format!("{:?}", col.data_type())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_csv_str(
        text: &str,
        options: &LoadOptions,
    ) -> Result<(FigureDataset, Diagnostics), LoadError> {
        load_csv_from_reader(text.as_bytes(), options)
    }

    const SAMPLE_CSV: &str = "\
console-name,product-name,new-price,sales-volume,release-date
Animation,Kitsune,\"$1,250.00\",5,2020-01-01
Games,Knight,50,1,2019-06-15
Movies,Captain,2,20,bad-date
";

    #[test]
    fn csv_load_normalizes_and_excludes() {
        let (dataset, diagnostics) =
            load_csv_str(SAMPLE_CSV, &LoadOptions::default()).unwrap();

        // The volume<=1 row is dropped at load time.
        assert_eq!(dataset.len(), 2);
        assert!(dataset
            .records
            .iter()
            .all(|r| r.volume.map_or(true, |v| v > 1)));

        let kitsune = &dataset.records[0];
        assert_eq!(kitsune.price, Some(1250.0));
        assert_eq!(kitsune.market_cap, Some(6250.0));
        assert_eq!(kitsune.release_year, Some(2020));

        let captain = &dataset.records[1];
        assert_eq!(captain.release_date, None);
        assert_eq!(captain.release_year, None);
        assert_eq!(captain.market_cap, Some(40.0));

        assert_eq!(diagnostics.total_rows, 3);
        assert_eq!(diagnostics.dropped_low_volume, 1);
        assert_eq!(diagnostics.null_release_date, 1);
        assert!(!diagnostics.all_prices_missing());
    }

    #[test]
    fn missing_price_column_is_schema_failure() {
        let csv = "console-name,product-name,sales-volume\nGames,Knight,5\n";
        let err = load_csv_str(csv, &LoadOptions::default()).unwrap_err();
        match err {
            LoadError::Schema { missing, present } => {
                assert_eq!(missing, COL_PRICE);
                assert_eq!(present.len(), 3);
            }
            other => panic!("expected Schema failure, got {other:?}"),
        }
    }

    #[test]
    fn malformed_row_is_parse_failure() {
        let csv = "console-name,product-name,new-price\nGames,Knight,5,extra,fields\n";
        let err = load_csv_str(csv, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: "CSV", .. }));
    }

    #[test]
    fn all_text_prices_degrade_to_all_missing() {
        let csv = "\
console-name,product-name,new-price,sales-volume,release-date
Games,Knight,sold out,5,2019-06-15
Movies,Captain,call us,20,2020-01-01
";
        let (dataset, diagnostics) =
            load_csv_str(csv, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(diagnostics.all_prices_missing());
        assert_eq!(dataset.price_bounds(), None);
    }

    #[test]
    fn strict_coercion_rejects_currency_strings() {
        assert_eq!(parse_price_str("$1,250.00", false), Some(1250.0));
        assert_eq!(parse_price_str("$1,250.00", true), None);
        assert_eq!(parse_price_str("12.5", true), Some(12.5));
        assert_eq!(parse_price_str("twelve", false), None);
        assert_eq!(parse_price_str("", false), None);
    }

    #[test]
    fn volume_accepts_integer_like_values() {
        assert_eq!(parse_volume_str("20", false), Some(20));
        assert_eq!(parse_volume_str("1,024", false), Some(1024));
        assert_eq!(parse_volume_str("20.0", false), Some(20));
        assert_eq!(parse_volume_str("n/a", false), None);
        assert_eq!(parse_volume_str("1,024", true), None);
    }

    #[test]
    fn exclusion_threshold_is_configurable() {
        let keep_all = LoadOptions {
            exclude_low_volume_threshold: None,
            ..LoadOptions::default()
        };
        let (dataset, diagnostics) = load_csv_str(SAMPLE_CSV, &keep_all).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(diagnostics.dropped_low_volume, 0);
    }

    #[test]
    fn null_volume_survives_baseline_exclusion() {
        let csv = "\
console-name,product-name,new-price,sales-volume,release-date
Games,Knight,10,,2019-06-15
";
        let (dataset, diagnostics) =
            load_csv_str(csv, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].volume, None);
        assert!(diagnostics.all_volumes_missing());
    }

    #[test]
    fn json_records_load() {
        let json = r#"[
            {"console-name": "Animation", "product-name": "Kitsune",
             "new-price": "$12.50", "sales-volume": 4,
             "release-date": "2020-06-01"},
            {"console-name": "Games", "product-name": "Knight",
             "new-price": 50.0, "sales-volume": null,
             "release-date": "not a date"}
        ]"#;
        let (dataset, diagnostics) =
            load_json_str(json, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].price, Some(12.5));
        assert_eq!(dataset.records[0].market_cap, Some(50.0));
        assert_eq!(dataset.records[1].volume, None);
        assert_eq!(dataset.records[1].release_year, None);
        assert_eq!(diagnostics.null_release_date, 1);
    }

    #[test]
    fn json_without_price_key_is_schema_failure() {
        let json = r#"[{"console-name": "Games", "product-name": "Knight"}]"#;
        let err = load_json_str(json, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Schema { .. }));
    }

    #[test]
    fn json_non_array_is_parse_failure() {
        let err = load_json_str("{\"rows\": []}", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: "JSON", .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("figures.xlsx"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn parquet_round_trip() {
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new(COL_CATEGORY, DataType::Utf8, false),
            Field::new(COL_NAME, DataType::Utf8, false),
            Field::new(COL_PRICE, DataType::Float64, true),
            Field::new(COL_VOLUME, DataType::Int64, true),
            Field::new(COL_RELEASE_DATE, DataType::Date32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Animation", "Games"])),
                Arc::new(StringArray::from(vec!["Kitsune", "Knight"])),
                Arc::new(Float64Array::from(vec![Some(12.5), None])),
                Arc::new(Int64Array::from(vec![Some(4), Some(7)])),
                // 18262 days after the epoch = 2020-01-01
                Arc::new(Date32Array::from(vec![Some(18262), None])),
            ],
        )
        .unwrap();

        let tmp = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .unwrap();
        let file = std::fs::File::create(tmp.path()).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let (dataset, diagnostics) =
            load_file(tmp.path(), &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].release_year, Some(2020));
        assert_eq!(dataset.records[0].market_cap, Some(50.0));
        assert_eq!(dataset.records[1].price, None);
        assert_eq!(diagnostics.null_price, 1);
    }
}
