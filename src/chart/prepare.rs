use std::f64::consts::{FRAC_PI_2, TAU};

use super::validate::{validate, Rejection, Selection};
use super::{ChartKind, Grouping};
use crate::data::aggregate::{aggregate, AggregateOptions, Aggregation};
use crate::data::classify::classify;
use crate::data::coerce::{coerce_column, valid_count};
use crate::data::model::{Column, Dataset};
use crate::data::stats::quantile;
use crate::error::AppError;
use crate::settings::{BinRule, HistogramBins, Settings};

/// Upper bound on histogram bins, fixed or computed.
pub const MAX_BINS: usize = 10_000;

// ---------------------------------------------------------------------------
// Render-ready chart data
// ---------------------------------------------------------------------------

/// Horizontal positions shared by all series of a line or area chart.
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    /// Numeric X column, coerced.
    Numeric(Vec<Option<f64>>),
    /// Anything else: row `i` sits at position `i`, labelled by its text.
    Categorical(Vec<String>),
}

impl XAxis {
    fn from_column(column: &Column) -> Self {
        if column.dtype.is_numeric() {
            XAxis::Numeric(coerce_column(column))
        } else {
            XAxis::Categorical(column.labels())
        }
    }

    pub fn position(&self, row: usize) -> Option<f64> {
        match self {
            XAxis::Numeric(values) => values.get(row).copied().flatten(),
            XAxis::Categorical(labels) => (row < labels.len()).then_some(row as f64),
        }
    }

    /// Tick label for a categorical position; `None` between rows.
    pub fn label_at(&self, position: f64) -> Option<&str> {
        match self {
            XAxis::Numeric(_) => None,
            XAxis::Categorical(labels) => {
                let rounded = position.round();
                if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
                    return None;
                }
                labels.get(rounded as usize).map(String::as_str)
            }
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, XAxis::Categorical(_))
    }
}

/// One coerced Y column.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    /// Runs of consecutive drawable points; a missing X or Y ends a run.
    pub fn segments(&self, x: &XAxis) -> Vec<Vec<[f64; 2]>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (row, value) in self.values.iter().enumerate() {
            match (x.position(row), value) {
                (Some(xv), Some(yv)) => current.push([xv, *yv]),
                _ => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// One layer of a stacked area chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub name: String,
    pub lower: Vec<[f64; 2]>,
    pub upper: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub fraction: f64,
    /// Radians, counter-clockwise from the positive X axis.
    pub start_angle: f64,
    pub end_angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolarPoint {
    pub label: String,
    pub angle: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Line {
        x_name: String,
        x: XAxis,
        series: Vec<Series>,
    },
    StackedArea {
        x_name: String,
        x: XAxis,
        series: Vec<Series>,
        bands: Vec<Band>,
    },
    Pie {
        label_column: String,
        value_column: String,
        slices: Vec<Slice>,
        aggregation: Aggregation,
    },
    Histogram {
        column: String,
        values: Vec<Option<f64>>,
        bins: Vec<HistBin>,
    },
    Polar {
        column: String,
        points: Vec<PolarPoint>,
        aggregation: Option<Aggregation>,
    },
}

impl ChartData {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::Line { .. } => ChartKind::Line,
            ChartData::StackedArea { .. } => ChartKind::StackedArea,
            ChartData::Pie { .. } => ChartKind::Pie,
            ChartData::Histogram { .. } => ChartKind::Histogram,
            ChartData::Polar { .. } => ChartKind::Polar,
        }
    }
}

// ---------------------------------------------------------------------------
// Preparation
// ---------------------------------------------------------------------------

/// Validate `selection` against `dataset` and compute what the renderer draws.
pub fn prepare(
    dataset: &Dataset,
    selection: &Selection,
    settings: &Settings,
) -> Result<ChartData, AppError> {
    let info = classify(dataset);
    validate(Some(&info), selection)?;
    let kind = selection.kind.ok_or(Rejection::NoChartKind)?;
    let column = |name: &str| {
        dataset.column(name).ok_or_else(|| Rejection::UnknownColumn {
            kind,
            column: name.to_string(),
        })
    };

    let x = selection.x.as_deref().map(column).transpose()?;
    let ys = selection
        .ys
        .iter()
        .map(|y| column(y))
        .collect::<Result<Vec<_>, _>>()?;

    match (kind, x, ys.as_slice()) {
        (ChartKind::Line, Some(x), ys) => {
            let series = coerce_all(ys)?;
            Ok(ChartData::Line {
                x_name: x.name.clone(),
                x: XAxis::from_column(x),
                series,
            })
        }
        (ChartKind::StackedArea, Some(x), ys) => {
            let series = coerce_all(ys)?;
            let x_axis = XAxis::from_column(x);
            Ok(ChartData::StackedArea {
                x_name: x.name.clone(),
                bands: stack(&x_axis, &series),
                x: x_axis,
                series,
            })
        }
        (ChartKind::Pie, Some(x), [y]) => {
            let options = grouping_options(kind, settings);
            let aggregation = aggregate(&x.labels(), &coerce_column(y), options, &y.name)?;
            Ok(ChartData::Pie {
                label_column: x.name.clone(),
                value_column: y.name.clone(),
                slices: pie_slices(&aggregation, &y.name)?,
                aggregation,
            })
        }
        (ChartKind::Histogram, _, [y]) => {
            let values = coerce_column(y);
            let finite: Vec<f64> = values.iter().flatten().copied().collect();
            if finite.is_empty() {
                return Err(AppError::NoValidData {
                    column: y.name.clone(),
                });
            }
            Ok(ChartData::Histogram {
                column: y.name.clone(),
                bins: histogram(&finite, settings.histogram_bins),
                values,
            })
        }
        (ChartKind::Polar, x, [y]) => {
            let values = coerce_column(y);
            let (points, aggregation) = match x {
                Some(x) => {
                    let options = grouping_options(kind, settings);
                    let agg = aggregate(&x.labels(), &values, options, &y.name)?;
                    let labelled = agg.buckets.iter().map(|b| (b.display_label(), b.sum));
                    (polar_points(labelled), Some(agg))
                }
                None => {
                    let labelled = values
                        .iter()
                        .enumerate()
                        .filter_map(|(row, v)| v.map(|v| (format!("#{}", row + 1), v)));
                    (polar_points(labelled), None)
                }
            };
            if points.is_empty() {
                return Err(AppError::NoValidData {
                    column: y.name.clone(),
                });
            }
            Ok(ChartData::Polar {
                column: y.name.clone(),
                points,
                aggregation,
            })
        }
        // validate() has already enforced the arity rules
        _ => Err(Rejection::NoChartKind.into()),
    }
}

/// Aggregation options for kinds that group by the X column.
fn grouping_options(kind: ChartKind, settings: &Settings) -> AggregateOptions {
    match kind.requirements().grouping {
        Grouping::PositiveSums => settings.pie_options(),
        _ => settings.polar_options(),
    }
}

/// Coerce every Y column; fails only when none of them has a value.
fn coerce_all(columns: &[&Column]) -> Result<Vec<Series>, AppError> {
    let series: Vec<Series> = columns
        .iter()
        .map(|c| Series {
            name: c.name.clone(),
            values: coerce_column(c),
        })
        .collect();

    if series.iter().all(|s| valid_count(&s.values) == 0) {
        return Err(AppError::NoValidData {
            column: series.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", "),
        });
    }
    Ok(series)
}

/// Cumulative bands in Y order; missing values stack as zero.
///
/// Rows without an X position are skipped.
pub fn stack(x: &XAxis, series: &[Series]) -> Vec<Band> {
    let rows: Vec<(usize, f64)> = (0..series.first().map_or(0, |s| s.values.len()))
        .filter_map(|row| x.position(row).map(|xv| (row, xv)))
        .collect();

    let mut floor = vec![0.0; rows.len()];
    series
        .iter()
        .map(|s| {
            let lower: Vec<[f64; 2]> = rows
                .iter()
                .zip(&floor)
                .map(|(&(_, xv), &base)| [xv, base])
                .collect();
            for (base, &(row, _)) in floor.iter_mut().zip(&rows) {
                *base += s.values[row].unwrap_or(0.0);
            }
            let upper = rows
                .iter()
                .zip(&floor)
                .map(|(&(_, xv), &top)| [xv, top])
                .collect();
            Band {
                name: s.name.clone(),
                lower,
                upper,
            }
        })
        .collect()
}

/// Wedges starting at 90° and running counter-clockwise.
fn pie_slices(aggregation: &Aggregation, column: &str) -> Result<Vec<Slice>, AppError> {
    let total = aggregation.total;
    if total <= 0.0 || aggregation.buckets.iter().any(|b| b.sum < 0.0) {
        return Err(AppError::NegativeWedge {
            column: column.to_string(),
        });
    }

    let mut angle = FRAC_PI_2;
    Ok(aggregation
        .buckets
        .iter()
        .map(|b| {
            let fraction = b.sum / total;
            let start_angle = angle;
            angle += fraction * TAU;
            Slice {
                label: b.display_label(),
                value: b.sum,
                fraction,
                start_angle,
                end_angle: angle,
            }
        })
        .collect())
}

/// Equally spaced angles over `0..2π`, values as radius.
pub fn polar_points(values: impl IntoIterator<Item = (String, f64)>) -> Vec<PolarPoint> {
    let labelled: Vec<(String, f64)> = values.into_iter().collect();
    let n = labelled.len() as f64;
    labelled
        .into_iter()
        .enumerate()
        .map(|(i, (label, radius))| PolarPoint {
            label,
            angle: TAU * i as f64 / n,
            radius,
        })
        .collect()
}

/// Bin `values` (all finite, at least one) into equal-width bins.
pub fn histogram(values: &[f64], bins: HistogramBins) -> Vec<HistBin> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };

    let (first, last) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let count = match bins {
        HistogramBins::Fixed(n) => n.clamp(1, MAX_BINS),
        HistogramBins::Rule(rule) => bin_count(&sorted, rule, max - min),
    };

    let width = (last - first) / count as f64;
    let mut out: Vec<HistBin> = (0..count)
        .map(|i| HistBin {
            start: first + width * i as f64,
            end: if i + 1 == count { last } else { first + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for &v in &sorted {
        let idx = (((v - first) / (last - first)) * count as f64) as usize;
        out[idx.min(count - 1)].count += 1;
    }
    out
}

/// Bin count for a rule; one bin when the data has no spread.
fn bin_count(sorted: &[f64], rule: BinRule, range: f64) -> usize {
    if range <= 0.0 {
        return 1;
    }
    let n = sorted.len() as f64;
    let sturges = range / (n.log2() + 1.0);
    let iqr = match (quantile(sorted, 0.75), quantile(sorted, 0.25)) {
        (Some(hi), Some(lo)) => hi - lo,
        _ => 0.0,
    };
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);

    let width = match rule {
        BinRule::Sturges => sturges,
        BinRule::Fd if fd > 0.0 => fd,
        BinRule::Fd => sturges,
        BinRule::Auto if fd > 0.0 => fd.min(sturges),
        BinRule::Auto => sturges,
    };
    ((range / width).ceil() as usize).clamp(1, MAX_BINS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{parse_csv, LoadOptions};
    use crate::data::model::{CellValue, ColumnType};

    fn dataset(text: &str) -> Dataset {
        parse_csv(text, LoadOptions::default()).unwrap()
    }

    fn select(kind: ChartKind, x: Option<&str>, ys: &[&str]) -> Selection {
        Selection {
            kind: Some(kind),
            x: x.map(str::to_string),
            ys: ys.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn pie_from_csv_folds_into_other() {
        let ds = dataset("label,value\nA,10\nB,30\nC,5\n");
        let settings = Settings {
            top_n: 2,
            ..Settings::default()
        };
        let data = prepare(&ds, &select(ChartKind::Pie, Some("label"), &["value"]), &settings)
            .unwrap();

        let ChartData::Pie { slices, aggregation, .. } = data else {
            panic!("expected a pie");
        };
        let pairs: Vec<(&str, f64)> = aggregation
            .buckets
            .iter()
            .map(|b| (b.label.as_str(), b.sum))
            .collect();
        assert_eq!(pairs, vec![("B", 30.0), ("A", 10.0), ("Other", 5.0)]);

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[2].label, "Other (1 group)");
        assert!((slices[0].start_angle - FRAC_PI_2).abs() < 1e-12);
        assert!((slices[2].end_angle - (FRAC_PI_2 + TAU)).abs() < 1e-9);
        let fractions: f64 = slices.iter().map(|s| s.fraction).sum();
        assert!((fractions - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pie_without_positive_values_is_empty_aggregation() {
        let ds = dataset("k,v\na,0\nb,-4\nc,\n");
        let err = prepare(&ds, &select(ChartKind::Pie, Some("k"), &["v"]), &Settings::default())
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyAggregation { .. }));
    }

    #[test]
    fn pie_with_negative_sums_is_refused_when_unfiltered() {
        let ds = dataset("k,v\na,5\nb,-4\n");
        let settings = Settings {
            pie_positive_only: false,
            ..Settings::default()
        };
        let err = prepare(&ds, &select(ChartKind::Pie, Some("k"), &["v"]), &settings).unwrap_err();
        assert!(matches!(err, AppError::NegativeWedge { .. }));
    }

    #[test]
    fn invalid_selection_is_a_validation_error() {
        let ds = dataset("k,v\na,1\n");
        let err = prepare(&ds, &select(ChartKind::Pie, Some("k"), &["k"]), &Settings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(Rejection::NonNumericY { .. })
        ));
    }

    #[test]
    fn line_over_categorical_x_breaks_at_gaps() {
        let ds = dataset("month,a,b\njan,1,2\nfeb,,3\nmar,4,x5\napr,5,6\n");
        let data = prepare(&ds, &select(ChartKind::Line, Some("month"), &["a"]), &Settings::default())
            .unwrap();
        let ChartData::Line { x, series, .. } = data else {
            panic!("expected a line chart");
        };
        assert!(x.is_categorical());
        assert_eq!(x.label_at(2.0), Some("mar"));
        assert_eq!(x.label_at(2.5), None);
        assert_eq!(
            series[0].segments(&x),
            vec![vec![[0.0, 1.0]], vec![[2.0, 4.0], [3.0, 5.0]]]
        );
    }

    #[test]
    fn line_with_no_numbers_at_all_is_no_valid_data() {
        let ds = Dataset::new(vec![
            Column::inferred("t", vec![CellValue::Integer(1)]),
            Column::new("v", ColumnType::Float, vec![CellValue::Null]),
        ])
        .unwrap();
        let err = prepare(&ds, &select(ChartKind::Line, Some("t"), &["v"]), &Settings::default())
            .unwrap_err();
        assert!(matches!(err, AppError::NoValidData { ref column } if column == "v"));
    }

    #[test]
    fn stacked_bands_accumulate_with_missing_as_zero() {
        let x = XAxis::Numeric(vec![Some(1.0), Some(2.0), None, Some(4.0)]);
        let series = vec![
            Series {
                name: "a".into(),
                values: vec![Some(1.0), None, Some(9.0), Some(2.0)],
            },
            Series {
                name: "b".into(),
                values: vec![Some(3.0), Some(1.0), Some(9.0), None],
            },
        ];
        let bands = stack(&x, &series);
        assert_eq!(bands[0].lower, vec![[1.0, 0.0], [2.0, 0.0], [4.0, 0.0]]);
        assert_eq!(bands[0].upper, vec![[1.0, 1.0], [2.0, 0.0], [4.0, 2.0]]);
        assert_eq!(bands[1].lower, bands[0].upper);
        assert_eq!(bands[1].upper, vec![[1.0, 4.0], [2.0, 1.0], [4.0, 2.0]]);
    }

    #[test]
    fn histogram_auto_bins() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let bins = histogram(&values, HistogramBins::default());
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 10);
        assert_eq!(bins[0].start, 1.0);
        assert_eq!(bins[4].end, 10.0);
    }

    #[test]
    fn histogram_fixed_bins_include_max() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], HistogramBins::Fixed(4));
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn histogram_fixed_bins_are_capped() {
        let bins = histogram(&[0.0, 1.0], HistogramBins::Fixed(usize::MAX));
        assert_eq!(bins.len(), MAX_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(histogram(&[0.0, 1.0], HistogramBins::Fixed(0)).len(), 1);
    }

    #[test]
    fn histogram_of_constant_values_is_one_bin() {
        let bins = histogram(&[3.0, 3.0, 3.0], HistogramBins::default());
        assert_eq!(
            bins,
            vec![HistBin {
                start: 2.5,
                end: 3.5,
                count: 3
            }]
        );
    }

    #[test]
    fn histogram_ignores_x_and_needs_values() {
        let ds = dataset("name,age\na,31\nb,\nc,45\n");
        let sel = select(ChartKind::Histogram, None, &["age"]);
        let data = prepare(&ds, &sel, &Settings::default()).unwrap();
        assert_eq!(data.kind(), ChartKind::Histogram);

        let unreadable = Dataset::new(vec![Column::new(
            "age",
            ColumnType::Float,
            vec![CellValue::Text("?".into())],
        )])
        .unwrap();
        let err = prepare(&unreadable, &sel, &Settings::default()).unwrap_err();
        assert!(matches!(err, AppError::NoValidData { .. }));
    }

    #[test]
    fn polar_spaces_points_evenly() {
        let points = polar_points(vec![
            ("a".to_string(), 1.0),
            ("b".to_string(), 2.0),
            ("c".to_string(), 3.0),
            ("d".to_string(), 4.0),
        ]);
        let angles: Vec<f64> = points.iter().map(|p| p.angle).collect();
        assert_eq!(angles, vec![0.0, FRAC_PI_2, 2.0 * FRAC_PI_2, 3.0 * FRAC_PI_2]);
        assert_eq!(points[3].radius, 4.0);
    }

    #[test]
    fn polar_raw_and_grouped() {
        let ds = dataset("dir,speed\nN,3\nE,-1\nN,2\nS,\n");

        let raw = prepare(&ds, &select(ChartKind::Polar, None, &["speed"]), &Settings::default())
            .unwrap();
        let ChartData::Polar { points, aggregation, .. } = raw else {
            panic!("expected polar");
        };
        assert!(aggregation.is_none());
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["#1", "#2", "#3"]);

        let grouped =
            prepare(&ds, &select(ChartKind::Polar, Some("dir"), &["speed"]), &Settings::default())
                .unwrap();
        let ChartData::Polar { points, aggregation, .. } = grouped else {
            panic!("expected polar");
        };
        let radii: Vec<(&str, f64)> = points.iter().map(|p| (p.label.as_str(), p.radius)).collect();
        assert_eq!(radii, vec![("N", 5.0), ("E", -1.0)]);
        assert_eq!(aggregation.unwrap().total, 4.0);
    }
}
