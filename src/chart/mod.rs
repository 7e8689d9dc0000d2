/// Chart layer: kinds, selection rules, data preparation, text summaries.
///
/// ```text
///   Selection ──► validate ──► prepare ──► ChartData ──► ui::plot
///                                 │
///                                 └──────► summary ──► details pane
/// ```
///
/// Every stage reads the per-kind rules from [`ChartKind::requirements`].
pub mod prepare;
pub mod summary;
pub mod validate;

use std::fmt;
use std::str::FromStr;

use validate::Rejection;

/// The five supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Line,
    StackedArea,
    Pie,
    Histogram,
    Polar,
}

/// How many Y columns a kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YArity {
    AtLeastOne,
    ExactlyOne,
}

/// Whether and how the Y values are grouped by the X column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Values are drawn row by row.
    None,
    /// Sum per X label, positive values only (subject to settings).
    PositiveSums,
    /// Sum per X label when X is selected, any sign.
    SignedSums,
}

/// Selection rules for one chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub needs_x: bool,
    pub y_arity: YArity,
    /// Y columns must be classified numeric.
    pub numeric_y: bool,
    pub grouping: Grouping,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Histogram,
        ChartKind::StackedArea,
        ChartKind::Polar,
    ];

    pub fn requirements(self) -> Requirements {
        match self {
            ChartKind::Line | ChartKind::StackedArea => Requirements {
                needs_x: true,
                y_arity: YArity::AtLeastOne,
                numeric_y: true,
                grouping: Grouping::None,
            },
            ChartKind::Pie => Requirements {
                needs_x: true,
                y_arity: YArity::ExactlyOne,
                numeric_y: true,
                grouping: Grouping::PositiveSums,
            },
            ChartKind::Histogram => Requirements {
                needs_x: false,
                y_arity: YArity::ExactlyOne,
                numeric_y: true,
                grouping: Grouping::None,
            },
            ChartKind::Polar => Requirements {
                needs_x: false,
                y_arity: YArity::ExactlyOne,
                numeric_y: true,
                grouping: Grouping::SignedSums,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::StackedArea => "Stacked Area",
            ChartKind::Pie => "Pie",
            ChartKind::Histogram => "Histogram",
            ChartKind::Polar => "Polar",
        }
    }

    /// Caption of the X selector for this kind.
    pub fn x_caption(self) -> &'static str {
        match self.requirements() {
            Requirements {
                grouping: Grouping::PositiveSums,
                ..
            } => "Labels",
            Requirements {
                grouping: Grouping::SignedSums,
                ..
            } => "Categories (optional)",
            Requirements { needs_x: false, .. } => "X (unused)",
            _ => "X",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartKind {
    type Err = Rejection;

    /// Accepts the display label or a compact form, case-insensitively
    /// (`"Stacked Area"`, `"stacked_area"`, `"stackedarea"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "line" => Ok(ChartKind::Line),
            "stackedarea" | "area" => Ok(ChartKind::StackedArea),
            "pie" => Ok(ChartKind::Pie),
            "histogram" | "hist" => Ok(ChartKind::Histogram),
            "polar" => Ok(ChartKind::Polar),
            _ => Err(Rejection::UnknownChartKind(s.to_string())),
        }
    }
}
