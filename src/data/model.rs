use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text used when the cell acts as a category label.
    pub fn label(&self) -> String {
        match self {
            CellValue::Null => BLANK_LABEL.to_string(),
            other => other.to_string(),
        }
    }
}

/// Label given to null cells when grouping by category.
pub const BLANK_LABEL: &str = "(blank)";

// ---------------------------------------------------------------------------
// Column – one named, typed column
// ---------------------------------------------------------------------------

/// Declared (Parquet) or inferred (CSV / JSON) element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnType {
    /// Infer the narrowest type that holds every non-null cell.
    ///
    /// An all-null column is typed as `Text`.
    pub fn infer(cells: &[CellValue]) -> Self {
        let mut seen_any = false;
        let mut all_int = true;
        let mut all_number = true;
        let mut all_bool = true;

        for cell in cells {
            match cell {
                CellValue::Null => continue,
                CellValue::Integer(_) => all_bool = false,
                CellValue::Float(_) => {
                    all_int = false;
                    all_bool = false;
                }
                CellValue::Bool(_) => {
                    all_int = false;
                    all_number = false;
                }
                CellValue::Text(_) => return ColumnType::Text,
            }
            seen_any = true;
        }

        match (seen_any, all_int, all_number, all_bool) {
            (false, ..) => ColumnType::Text,
            (true, true, _, _) => ColumnType::Integer,
            (true, _, true, _) => ColumnType::Float,
            (true, _, _, true) => ColumnType::Boolean,
            _ => ColumnType::Text,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "int",
            ColumnType::Float => "float",
            ColumnType::Boolean => "bool",
            ColumnType::Text => "text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub cells: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType, cells: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            dtype,
            cells,
        }
    }

    /// Build a column whose type is inferred from its cells.
    pub fn inferred(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        let dtype = ColumnType::infer(&cells);
        Self::new(name, dtype, cells)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether every cell is null (vacuously true for zero rows).
    pub fn is_all_null(&self) -> bool {
        self.cells.iter().all(CellValue::is_null)
    }

    /// Stringified cells for grouping.
    pub fn labels(&self) -> Vec<String> {
        self.cells.iter().map(CellValue::label).collect()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Ordered, equal-length columns plus the file they came from.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Assemble a dataset, rejecting columns of unequal length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
                bail!(
                    "column '{}' has {} rows but '{}' has {}",
                    bad.name,
                    bad.len(),
                    first.name,
                    rows
                );
            }
        }
        Ok(Self {
            columns,
            source: None,
        })
    }

    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_narrowest_type() {
        let ints = vec![CellValue::Integer(1), CellValue::Null, CellValue::Integer(3)];
        assert_eq!(ColumnType::infer(&ints), ColumnType::Integer);

        let mixed = vec![CellValue::Integer(1), CellValue::Float(2.5)];
        assert_eq!(ColumnType::infer(&mixed), ColumnType::Float);

        let bools = vec![CellValue::Bool(true), CellValue::Bool(false)];
        assert_eq!(ColumnType::infer(&bools), ColumnType::Boolean);

        let text = vec![CellValue::Integer(1), CellValue::Text("x".into())];
        assert_eq!(ColumnType::infer(&text), ColumnType::Text);

        assert_eq!(ColumnType::infer(&[CellValue::Null]), ColumnType::Text);
    }

    #[test]
    fn rejects_ragged_columns() {
        let a = Column::inferred("a", vec![CellValue::Integer(1)]);
        let b = Column::inferred("b", vec![CellValue::Integer(1), CellValue::Integer(2)]);
        let err = Dataset::new(vec![a, b]).unwrap_err();
        assert!(err.to_string().contains("column 'b'"));
    }

    #[test]
    fn null_cells_get_blank_label() {
        let col = Column::inferred(
            "k",
            vec![CellValue::Text("A".into()), CellValue::Null, CellValue::Integer(7)],
        );
        assert_eq!(col.labels(), vec!["A", BLANK_LABEL, "7"]);
    }

    #[test]
    fn empty_dataset_has_no_shape() {
        let ds = Dataset::default();
        assert_eq!(ds.height(), 0);
        assert_eq!(ds.width(), 0);
        assert!(ds.is_empty());
    }
}
