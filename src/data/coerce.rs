use super::model::{CellValue, Column};

/// Best-effort numeric value of one cell.
///
/// Unparseable text, nulls, NaN and infinities all map to `None`.
pub fn coerce_cell(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Integer(i) => *i as f64,
        CellValue::Float(v) => *v,
        CellValue::Bool(b) => f64::from(u8::from(*b)),
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        CellValue::Null => return None,
    };
    value.is_finite().then_some(value)
}

/// Coerce every cell, keeping row positions.
pub fn coerce_cells(cells: &[CellValue]) -> Vec<Option<f64>> {
    cells.iter().map(coerce_cell).collect()
}

pub fn coerce_column(column: &Column) -> Vec<Option<f64>> {
    coerce_cells(&column.cells)
}

/// Number of cells that survived coercion.
pub fn valid_count(values: &[Option<f64>]) -> usize {
    values.iter().filter(|v| v.is_some()).count()
}
