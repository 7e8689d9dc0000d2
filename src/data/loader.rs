use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
    Int8Array, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, ColumnType, Dataset};

/// Lines inspected when guessing the CSV delimiter.
const SNIFF_LINES: usize = 20;

/// Delimiters tried by [`detect_delimiter`], in tie-break order.
const DELIMITER_CANDIDATES: [u8; 5] = [b',', b';', b'\t', b'|', b':'];

/// Cell texts read as missing values.
const NA_TOKENS: [&str; 11] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Loader knobs coming from the settings file.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub drop_empty_columns: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            drop_empty_columns: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – delimited text, delimiter auto-detected
/// * `.json`    – records orientation: `[{ "col": value, ... }, ...]`
/// * `.parquet` – any flat Parquet table
pub fn load_file(path: &Path, options: LoadOptions) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "tsv" | "txt" => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_csv(&String::from_utf8_lossy(&bytes), options)?
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_json(&text, options)?
        }
        "parquet" | "pq" => load_parquet(path, options)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    Ok(dataset.with_source(path))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Most frequent candidate delimiter in the first lines of `text`.
///
/// Falls back to a comma when none of the candidates occur.
pub fn detect_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text.lines().take(SNIFF_LINES).collect();
    let mut best = (b',', 0usize);
    for &candidate in &DELIMITER_CANDIDATES {
        let count = sample
            .iter()
            .map(|line| line.bytes().filter(|&b| b == candidate).count())
            .sum();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Parse delimited text with a header row.
///
/// Header names are trimmed; blank names become `Unnamed: <index>`. Short
/// rows are padded with nulls, long rows are an error.
pub fn parse_csv(text: &str, options: LoadOptions) -> Result<Dataset> {
    let delimiter = detect_delimiter(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .enumerate()
        .map(|(i, h)| match h.trim() {
            "" => format!("Unnamed: {i}"),
            name => name.to_string(),
        })
        .collect();

    if headers.is_empty() {
        bail!("The file is empty or has no valid CSV format");
    }

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if record.len() > headers.len() {
            bail!(
                "CSV row {}: expected {} fields, found {}",
                row_no + 1,
                headers.len(),
                record.len()
            );
        }
        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(col_idx).map_or(CellValue::Null, parse_cell));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| Column::inferred(name, cells))
        .collect();

    finish(columns, options)
}

/// Read a raw CSV field as the narrowest value it represents.
fn parse_cell(s: &str) -> CellValue {
    let trimmed = s.trim();
    if NA_TOKENS.contains(&trimmed) {
        return CellValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }
    match trimmed {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "region": "North", "units": 12, "revenue": 340.5 },
///   { "region": "South", "units": 7,  "revenue": null }
/// ]
/// ```
///
/// Keys missing from a record become nulls.
pub fn parse_json(text: &str, options: LoadOptions) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let cells = records
                .iter()
                .map(|rec| rec.get(&name).map_or(CellValue::Null, json_to_cell))
                .collect();
            Column::inferred(name, cells)
        })
        .collect();

    finish(columns, options)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table; column types come from the Arrow schema.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, options: LoadOptions) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), arrow_column_type(f.data_type()), Vec::new()))
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (column, array) in columns.iter_mut().zip(batch.columns()) {
            for row in 0..batch.num_rows() {
                column.cells.push(arrow_cell(array, row)?);
            }
        }
    }

    finish(columns, options)
}

fn arrow_column_type(dtype: &DataType) -> ColumnType {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnType::Integer,
        DataType::Float32 | DataType::Float64 => ColumnType::Float,
        DataType::Boolean => ColumnType::Boolean,
        _ => ColumnType::Text,
    }
}

/// Downcast helper: `value(row)` of a primitive Arrow array.
macro_rules! arrow_value {
    ($col:expr, $ty:ty, $row:expr) => {
        $col.as_any()
            .downcast_ref::<$ty>()
            .context(concat!("expected ", stringify!($ty)))?
            .value($row)
    };
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Int8 => CellValue::Integer(arrow_value!(col, Int8Array, row).into()),
        DataType::Int16 => CellValue::Integer(arrow_value!(col, Int16Array, row).into()),
        DataType::Int32 => CellValue::Integer(arrow_value!(col, Int32Array, row).into()),
        DataType::Int64 => CellValue::Integer(arrow_value!(col, Int64Array, row)),
        DataType::UInt8 => CellValue::Integer(arrow_value!(col, UInt8Array, row).into()),
        DataType::UInt16 => CellValue::Integer(arrow_value!(col, UInt16Array, row).into()),
        DataType::UInt32 => CellValue::Integer(arrow_value!(col, UInt32Array, row).into()),
        DataType::UInt64 => {
            let v = arrow_value!(col, UInt64Array, row);
            i64::try_from(v).map_or(CellValue::Float(v as f64), CellValue::Integer)
        }
        DataType::Float32 => CellValue::Float(arrow_value!(col, Float32Array, row).into()),
        DataType::Float64 => CellValue::Float(arrow_value!(col, Float64Array, row)),
        DataType::Boolean => CellValue::Bool(arrow_value!(col, BooleanArray, row)),
        _ => CellValue::Text(
            array_value_to_string(col, row).context("formatting parquet value")?,
        ),
    };
    Ok(cell)
}

// ---------------------------------------------------------------------------
// Shared post-processing
// ---------------------------------------------------------------------------

fn finish(mut columns: Vec<Column>, options: LoadOptions) -> Result<Dataset> {
    if options.drop_empty_columns {
        let before = columns.len();
        columns.retain(|c| c.is_empty() || !c.is_all_null());
        if columns.len() < before {
            log::debug!("Dropped {} empty columns", before - columns.len());
        }
    }

    dedupe_names(&mut columns);

    let dataset = Dataset::new(columns)?;
    if dataset.is_empty() {
        bail!("The file contains no columns");
    }
    if dataset.height() == 0 {
        bail!("The file contains a header but no data rows");
    }
    Ok(dataset)
}

/// Rename repeated column names to `name.1`, `name.2`, …; the first
/// occurrence keeps its name and no rename reuses a name from the file.
fn dedupe_names(columns: &mut [Column]) {
    let original: HashSet<String> = columns.iter().map(|c| c.name.clone()).collect();
    let mut taken: HashSet<String> = HashSet::new();
    for column in columns.iter_mut() {
        if taken.insert(column.name.clone()) {
            continue;
        }
        let mut k = 1;
        let renamed = loop {
            let candidate = format!("{}.{k}", column.name);
            if !original.contains(&candidate) && !taken.contains(&candidate) {
                break candidate;
            }
            k += 1;
        };
        log::debug!("Renamed duplicate column {:?} to {renamed:?}", column.name);
        taken.insert(renamed.clone());
        column.name = renamed;
    }
}
