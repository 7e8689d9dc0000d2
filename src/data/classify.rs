use super::model::Dataset;

/// Partition of a dataset's columns into plotting roles.
///
/// Both lists keep dataset column order. Every column lands in exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnInfo {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.is_numeric(column) || self.categorical.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Integer and float columns are numeric, everything else is categorical.
pub fn classify(dataset: &Dataset) -> ColumnInfo {
    let (numeric, categorical) = dataset
        .columns()
        .iter()
        .partition::<Vec<_>, _>(|c| c.dtype.is_numeric());

    ColumnInfo {
        numeric: numeric.into_iter().map(|c| c.name.clone()).collect(),
        categorical: categorical.into_iter().map(|c| c.name.clone()).collect(),
    }
}
