use std::fmt;

/// Default percentile ranks, in percent.
pub const DEFAULT_PERCENTILES: [f64; 3] = [25.0, 50.0, 75.0];

/// One requested percentile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentile {
    /// Rank in percent, 0..=100.
    pub rank: f64,
    pub value: Option<f64>,
}

/// Descriptive statistics of one numeric column.
///
/// Every statistic is `None` when there are no valid values; `std` is also
/// `None` for a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    pub percentiles: Vec<Percentile>,
}

impl StatsSummary {
    pub fn percentile(&self, rank: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| p.rank == rank)
            .and_then(|p| p.value)
    }
}

/// Compute the summary of `values`, skipping missing entries.
///
/// Values are sorted before any arithmetic, so row order never changes the
/// result.
pub fn describe(values: &[Option<f64>], percentiles: &[f64]) -> StatsSummary {
    let mut sorted: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let percentiles = percentiles
        .iter()
        .map(|&rank| Percentile {
            rank,
            value: quantile(&sorted, rank / 100.0),
        })
        .collect();

    if count == 0 {
        return StatsSummary {
            count,
            mean: None,
            std: None,
            min: None,
            max: None,
            median: None,
            percentiles,
        };
    }

    let n = count as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    // sample standard deviation, ddof = 1
    let std = (count >= 2).then(|| {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });

    StatsSummary {
        count,
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        max: sorted.last().copied(),
        median: quantile(&sorted, 0.5),
        percentiles,
    }
}

/// Linear interpolation between order statistics of an ascending slice.
///
/// `q` is clamped to `0..=1`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Number formatting for the details pane: `NA` for undefined.
pub struct Num(pub Option<f64>);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            None => f.write_str("NA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::coerce::coerce_cells;
    use crate::data::model::CellValue;

    #[test]
    fn mixed_column_uses_only_valid_values() {
        let cells: Vec<CellValue> = ["1", "2", "3", "4", "x", ""]
            .iter()
            .map(|s| CellValue::Text(s.to_string()))
            .collect();
        let stats = describe(&coerce_cells(&cells), &DEFAULT_PERCENTILES);

        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Some(2.5));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(4.0));
        let std = stats.std.unwrap();
        assert!((std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.median, Some(2.5));
        assert_eq!(stats.percentile(25.0), Some(1.75));
        assert_eq!(stats.percentile(75.0), Some(3.25));
    }

    #[test]
    fn no_valid_values_is_fully_undefined() {
        let stats = describe(&[None, None], &DEFAULT_PERCENTILES);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.std, None);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
        assert_eq!(stats.median, None);
        assert!(stats.percentiles.iter().all(|p| p.value.is_none()));
        assert_eq!(format!("{:.3}", Num(stats.mean)), "NA");
    }

    #[test]
    fn single_value_has_no_std() {
        let stats = describe(&[Some(7.0)], &DEFAULT_PERCENTILES);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, Some(7.0));
        assert_eq!(stats.std, None);
        assert_eq!(stats.percentile(25.0), Some(7.0));
    }

    #[test]
    fn row_order_does_not_matter() {
        let a = [Some(0.1), Some(0.2), Some(0.3), None, Some(1e16), Some(-3.0)];
        let mut b = a;
        b.reverse();
        assert_eq!(describe(&a, &DEFAULT_PERCENTILES), describe(&b, &DEFAULT_PERCENTILES));
    }

    #[test]
    fn quantile_interpolates() {
        let v = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(quantile(&v, 0.0), Some(10.0));
        assert_eq!(quantile(&v, 0.25), Some(20.0));
        assert_eq!(quantile(&v, 0.375), Some(25.0));
        assert_eq!(quantile(&v, 1.0), Some(50.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn num_formats_precision() {
        assert_eq!(format!("{:.2}", Num(Some(1.0 / 3.0))), "0.33");
        assert_eq!(format!("{}", Num(Some(4.0))), "4");
    }
}
