use std::fmt::{self, Display, Formatter};

use super::prepare::{ChartData, Series};
use crate::data::aggregate::Aggregation;
use crate::data::classify::ColumnInfo;
use crate::data::coerce::valid_count;
use crate::data::model::Dataset;
use crate::data::stats::{describe, Num};

/// Values listed for an ungrouped polar chart.
const POLAR_TOP_VALUES: usize = 8;

/// Details text shown right after a successful load.
pub fn dataset_overview(dataset: &Dataset, info: &ColumnInfo) -> String {
    Overview { dataset, info }.to_string()
}

struct Overview<'a> {
    dataset: &'a Dataset,
    info: &'a ColumnInfo,
}

impl Display for Overview<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "DATASET")?;
        writeln!(f, "  rows: {}", self.dataset.height())?;
        writeln!(f, "  cols: {}", self.dataset.width())?;
        writeln!(f, "  #numeric: {}", self.info.numeric.len())?;
        writeln!(f, "  #categorical: {}", self.info.categorical.len())?;
        writeln!(f)?;
        for column in self.dataset.columns() {
            writeln!(f, "  {} ({})", column.name, column.dtype)?;
        }
        writeln!(f)?;
        f.write_str("Choose a chart type and columns, then press Plot.")
    }
}

/// One-line description of what was drawn, for the status bar.
pub fn status_line(data: &ChartData) -> String {
    let names = |series: &[Series]| {
        series
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    match data {
        ChartData::Line { x_name, series, .. } => {
            format!("Line: X={x_name}; Y={}", names(series))
        }
        ChartData::StackedArea { x_name, series, .. } => {
            format!("Stacked Area: X={x_name}; Y={}", names(series))
        }
        ChartData::Pie {
            label_column,
            value_column,
            ..
        } => format!("Pie: labels={label_column}; value={value_column}"),
        ChartData::Histogram { column, .. } => format!("Histogram: Y={column}"),
        ChartData::Polar { column, .. } => format!("Polar: Y={column}"),
    }
}

/// Statistics text for the details pane after a plot.
pub fn plot_summary(data: &ChartData, percentiles: &[f64]) -> String {
    PlotSummary { data, percentiles }
        .to_string()
        .trim_end()
        .to_string()
}

struct PlotSummary<'a> {
    data: &'a ChartData,
    percentiles: &'a [f64],
}

impl Display for PlotSummary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.data {
            ChartData::Line { series, .. } | ChartData::StackedArea { series, .. } => {
                writeln!(f, "PLOT STATISTICS")?;
                for s in series {
                    column_stats(f, &s.name, &s.values, self.percentiles)?;
                }
                Ok(())
            }
            ChartData::Histogram {
                column,
                values,
                bins,
            } => {
                writeln!(f, "PLOT STATISTICS")?;
                column_stats(f, column, values, self.percentiles)?;
                let stats = describe(values, &[]);
                let missing = values.len() - valid_count(values);
                writeln!(
                    f,
                    "Histogram: range=[{}, {}], bins={}, missing={}/{}",
                    Num(stats.min),
                    Num(stats.max),
                    bins.len(),
                    missing,
                    values.len()
                )
            }
            ChartData::Pie { aggregation, .. } => {
                writeln!(f, "PIE STATISTICS")?;
                aggregation_stats(f, aggregation)
            }
            ChartData::Polar {
                points,
                aggregation: Some(aggregation),
                ..
            } => {
                writeln!(f, "POLAR STATISTICS")?;
                writeln!(f, "  points: {}", points.len())?;
                aggregation_stats(f, aggregation)
            }
            ChartData::Polar {
                points,
                aggregation: None,
                ..
            } => {
                writeln!(f, "POLAR STATISTICS")?;
                let values: Vec<Option<f64>> = points.iter().map(|p| Some(p.radius)).collect();
                let stats = describe(&values, &[]);
                writeln!(f, "  values: {}", stats.count)?;
                writeln!(f, "  sum: {}", points.iter().map(|p| p.radius).sum::<f64>())?;
                writeln!(f, "  mean: {:.3}", Num(stats.mean))?;

                let mut radii: Vec<f64> = points.iter().map(|p| p.radius).collect();
                radii.sort_by(|a, b| b.total_cmp(a));
                writeln!(f, "  top {POLAR_TOP_VALUES} values:")?;
                for r in radii.iter().take(POLAR_TOP_VALUES) {
                    writeln!(f, "    {r}")?;
                }
                Ok(())
            }
        }
    }
}

fn column_stats(
    f: &mut Formatter<'_>,
    name: &str,
    values: &[Option<f64>],
    percentiles: &[f64],
) -> fmt::Result {
    let stats = describe(values, percentiles);
    writeln!(f, "[{name}]")?;
    writeln!(f, "  count={}", stats.count)?;
    writeln!(f, "  mean={:.3}, std={:.3}", Num(stats.mean), Num(stats.std))?;
    write!(f, "  min={}", Num(stats.min))?;
    for p in &stats.percentiles {
        write!(f, ", {}%={}", p.rank, Num(p.value))?;
    }
    writeln!(f, ", max={}", Num(stats.max))?;
    writeln!(f, "  median={}", Num(stats.median))?;
    writeln!(f)
}

fn aggregation_stats(f: &mut Formatter<'_>, aggregation: &Aggregation) -> fmt::Result {
    let top = aggregation.top();
    writeln!(f, "  categories: {}", aggregation.group_count)?;
    writeln!(f, "  top-N: {}", top.len())?;
    writeln!(f, "  total: {}", aggregation.total)?;
    writeln!(f, "  top categories (by sum):")?;
    for bucket in top {
        writeln!(f, "    {}: {}", bucket.label, bucket.sum)?;
    }
    if let Some(other) = aggregation.other() {
        writeln!(f, "    {}: {}", other.display_label(), other.sum)?;
    }
    Ok(())
}
