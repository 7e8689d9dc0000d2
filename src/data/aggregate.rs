use std::collections::HashMap;

use crate::error::AppError;

/// Label of the synthetic bucket that collects everything past the top N.
pub const OTHER_LABEL: &str = "Other";

/// Options for [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Number of groups kept before folding the rest into "Other".
    pub top_n: usize,
    /// Drop zero and negative values before grouping (pie charts).
    pub positive_only: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            top_n: 8,
            positive_only: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub sum: f64,
    /// Set only on the synthetic "Other" bucket.
    pub is_other: bool,
    /// Distinct labels summed into this bucket.
    pub groups: usize,
}

impl Bucket {
    /// Label for legends and text; the synthetic bucket carries its group count.
    pub fn display_label(&self) -> String {
        match (self.is_other, self.groups) {
            (false, _) => self.label.clone(),
            (true, 1) => format!("{OTHER_LABEL} (1 group)"),
            (true, n) => format!("{OTHER_LABEL} ({n} groups)"),
        }
    }
}

/// Grouped sums, largest first, with an optional trailing "Other".
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub buckets: Vec<Bucket>,
    /// Distinct labels before top-N folding.
    pub group_count: usize,
    /// Sum of every value that passed the filter.
    pub total: f64,
}

impl Aggregation {
    pub fn other(&self) -> Option<&Bucket> {
        self.buckets.last().filter(|b| b.is_other)
    }

    /// Buckets for named groups only.
    pub fn top(&self) -> &[Bucket] {
        match self.other() {
            Some(_) => &self.buckets[..self.buckets.len() - 1],
            None => &self.buckets,
        }
    }
}

/// Group `values` by `labels`, sum, sort descending and fold the tail.
///
/// Rows are paired positionally; a missing value drops its row. Ties keep the
/// order in which labels were first seen.
pub fn aggregate(
    labels: &[String],
    values: &[Option<f64>],
    options: AggregateOptions,
    value_column: &str,
) -> Result<Aggregation, AppError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64)> = Vec::new();

    for (label, value) in labels.iter().zip(values) {
        let Some(v) = *value else { continue };
        if options.positive_only && v <= 0.0 {
            continue;
        }
        match index.get(label.as_str()) {
            Some(&i) => groups[i].1 += v,
            None => {
                index.insert(label.as_str(), groups.len());
                groups.push((label.as_str(), v));
            }
        }
    }

    if groups.is_empty() {
        return Err(AppError::EmptyAggregation {
            column: value_column.to_string(),
            positive_only: options.positive_only,
        });
    }

    // Stable sort: equal sums stay in first-seen order.
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));

    let group_count = groups.len();
    let total: f64 = groups.iter().map(|(_, s)| s).sum();

    let mut buckets: Vec<Bucket> = groups
        .iter()
        .take(options.top_n)
        .map(|(label, sum)| Bucket {
            label: (*label).to_string(),
            sum: *sum,
            is_other: false,
            groups: 1,
        })
        .collect();

    if group_count > options.top_n {
        let rest: f64 = groups[options.top_n..].iter().map(|(_, s)| s).sum();
        buckets.push(Bucket {
            label: OTHER_LABEL.to_string(),
            sum: rest,
            is_other: true,
            groups: group_count - options.top_n,
        });
    }

    Ok(Aggregation {
        buckets,
        group_count,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn pairs(agg: &Aggregation) -> Vec<(&str, f64)> {
        agg.buckets.iter().map(|b| (b.label.as_str(), b.sum)).collect()
    }

    fn opts(top_n: usize, positive_only: bool) -> AggregateOptions {
        AggregateOptions {
            top_n,
            positive_only,
        }
    }

    #[test]
    fn folds_tail_into_other() {
        let agg = aggregate(
            &labels(&["A", "B", "C"]),
            &[Some(10.0), Some(30.0), Some(5.0)],
            opts(2, true),
            "value",
        )
        .unwrap();

        assert_eq!(pairs(&agg), vec![("B", 30.0), ("A", 10.0), ("Other", 5.0)]);
        assert_eq!(agg.group_count, 3);
        assert_eq!(agg.other().map(|b| b.sum), Some(5.0));
        assert_eq!(agg.top().len(), 2);
    }

    #[test]
    fn sums_repeated_labels() {
        let agg = aggregate(
            &labels(&["x", "y", "x", "y", "z"]),
            &[Some(1.0), Some(2.0), Some(3.0), None, Some(4.0)],
            opts(8, true),
            "v",
        )
        .unwrap();
        assert_eq!(pairs(&agg), vec![("x", 4.0), ("z", 4.0), ("y", 2.0)]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let agg = aggregate(
            &labels(&["c", "a", "b"]),
            &[Some(1.0), Some(1.0), Some(1.0)],
            opts(8, true),
            "v",
        )
        .unwrap();
        assert_eq!(pairs(&agg), vec![("c", 1.0), ("a", 1.0), ("b", 1.0)]);
    }

    #[test]
    fn no_other_when_top_n_covers_all_labels() {
        let agg = aggregate(
            &labels(&["a", "b", "c"]),
            &[Some(1.0), Some(2.0), Some(3.0)],
            opts(3, true),
            "v",
        )
        .unwrap();
        assert!(agg.other().is_none());
        assert_eq!(agg.buckets.len(), 3);
    }

    #[test]
    fn total_is_conserved_for_any_top_n() {
        let ls = labels(&["a", "b", "c", "d", "a", "e", "f", "b"]);
        let vs = [
            Some(4.0),
            Some(7.0),
            Some(1.0),
            None,
            Some(2.0),
            Some(9.0),
            Some(3.0),
            Some(5.0),
        ];
        let expected: f64 = vs.iter().flatten().sum();
        for top_n in 0..10 {
            let agg = aggregate(&ls, &vs, opts(top_n, true), "v").unwrap();
            let bucket_sum: f64 = agg.buckets.iter().map(|b| b.sum).sum();
            assert_eq!(bucket_sum, expected, "top_n = {top_n}");
            assert_eq!(agg.total, expected);
        }
    }

    #[test]
    fn top_zero_puts_everything_in_other() {
        let agg = aggregate(&labels(&["a", "b"]), &[Some(1.0), Some(2.0)], opts(0, true), "v")
            .unwrap();
        assert_eq!(pairs(&agg), vec![("Other", 3.0)]);
        assert_eq!(agg.buckets[0].display_label(), "Other (2 groups)");
    }

    #[test]
    fn real_other_category_stays_distinct_from_folded_tail() {
        let agg = aggregate(
            &labels(&["Other", "a", "b", "c"]),
            &[Some(50.0), Some(20.0), Some(5.0), Some(1.0)],
            opts(2, true),
            "v",
        )
        .unwrap();
        assert_eq!(pairs(&agg), vec![("Other", 50.0), ("a", 20.0), ("Other", 6.0)]);

        let shown: Vec<String> = agg.buckets.iter().map(Bucket::display_label).collect();
        assert_eq!(shown, vec!["Other", "a", "Other (2 groups)"]);
        assert_eq!(agg.other().map(|b| b.groups), Some(2));
    }

    #[test]
    fn positive_filter_applies_only_when_asked() {
        let ls = labels(&["a", "b", "c"]);
        let vs = [Some(5.0), Some(0.0), Some(-2.0)];

        let pie = aggregate(&ls, &vs, opts(8, true), "v").unwrap();
        assert_eq!(pairs(&pie), vec![("a", 5.0)]);

        let polar = aggregate(&ls, &vs, opts(8, false), "v").unwrap();
        assert_eq!(pairs(&polar), vec![("a", 5.0), ("b", 0.0), ("c", -2.0)]);
        assert_eq!(polar.total, 3.0);
    }

    #[test]
    fn nothing_left_is_an_empty_aggregation() {
        let err = aggregate(&labels(&["a", "b"]), &[Some(-1.0), None], opts(8, true), "sales")
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyAggregation { ref column, .. } if column == "sales"));
    }
}
