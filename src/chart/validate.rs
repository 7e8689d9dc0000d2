use thiserror::Error;

use super::{ChartKind, YArity};
use crate::data::classify::ColumnInfo;

/// The user's chart form: kind, X column and ordered, unique Y columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub kind: Option<ChartKind>,
    pub x: Option<String>,
    pub ys: Vec<String>,
}

impl Selection {
    /// Add or remove a Y column, keeping insertion order.
    pub fn toggle_y(&mut self, column: &str) {
        if let Some(pos) = self.ys.iter().position(|c| c == column) {
            self.ys.remove(pos);
        } else {
            self.ys.push(column.to_string());
        }
    }

    /// Forget column choices that the current dataset does not have.
    pub fn retain_columns(&mut self, info: &ColumnInfo) {
        if self.x.as_deref().is_some_and(|x| !info.contains(x)) {
            self.x = None;
        }
        self.ys.retain(|y| info.contains(y));
    }
}

/// Why a selection cannot be plotted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Load data first")]
    NoData,

    #[error("Choose a chart type")]
    NoChartKind,

    #[error("Unknown chart type '{0}'")]
    UnknownChartKind(String),

    #[error("{kind}: select an X column")]
    MissingX { kind: ChartKind },

    #[error("{kind}: column '{column}' does not exist")]
    UnknownColumn { kind: ChartKind, column: String },

    #[error("{kind}: select at least one Y column")]
    NoY { kind: ChartKind },

    #[error("{kind}: select exactly one Y column ({count} selected)")]
    NotExactlyOneY { kind: ChartKind, count: usize },

    #[error("{kind}: Y column '{column}' is selected twice")]
    DuplicateY { kind: ChartKind, column: String },

    #[error("{kind}: Y column '{column}' is not numeric")]
    NonNumericY { kind: ChartKind, column: String },
}

/// Decide whether `selection` can be plotted.
///
/// `info` is `None` while no dataset is loaded. Pure; cheap enough to call
/// every frame.
pub fn validate(info: Option<&ColumnInfo>, selection: &Selection) -> Result<(), Rejection> {
    let info = info.ok_or(Rejection::NoData)?;
    let kind = selection.kind.ok_or(Rejection::NoChartKind)?;
    let req = kind.requirements();

    match selection.x.as_deref() {
        None if req.needs_x => return Err(Rejection::MissingX { kind }),
        Some(x) if !info.contains(x) => {
            return Err(Rejection::UnknownColumn {
                kind,
                column: x.to_string(),
            })
        }
        _ => {}
    }

    let count = selection.ys.len();
    match req.y_arity {
        YArity::AtLeastOne if count == 0 => return Err(Rejection::NoY { kind }),
        YArity::ExactlyOne if count != 1 => {
            return Err(Rejection::NotExactlyOneY { kind, count })
        }
        _ => {}
    }

    for (i, y) in selection.ys.iter().enumerate() {
        if selection.ys[..i].contains(y) {
            return Err(Rejection::DuplicateY {
                kind,
                column: y.clone(),
            });
        }
        if req.numeric_y && !info.is_numeric(y) {
            return Err(Rejection::NonNumericY {
                kind,
                column: y.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(numeric: &[&str], categorical: &[&str]) -> ColumnInfo {
        ColumnInfo {
            numeric: numeric.iter().map(|s| s.to_string()).collect(),
            categorical: categorical.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn sel(kind: ChartKind, x: Option<&str>, ys: &[&str]) -> Selection {
        Selection {
            kind: Some(kind),
            x: x.map(str::to_string),
            ys: ys.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn histogram_ignores_x() {
        let cols = info(&["age"], &[]);
        assert_eq!(validate(Some(&cols), &sel(ChartKind::Histogram, None, &["age"])), Ok(()));

        let cols = info(&["age"], &["name"]);
        assert_eq!(
            validate(Some(&cols), &sel(ChartKind::Histogram, Some("name"), &["age"])),
            Ok(())
        );
    }

    #[test]
    fn pie_needs_exactly_one_y() {
        let cols = info(&["a", "b"], &["category"]);
        let err = validate(Some(&cols), &sel(ChartKind::Pie, Some("category"), &["a", "b"]))
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::NotExactlyOneY {
                kind: ChartKind::Pie,
                count: 2
            }
        );
        assert!(err.to_string().contains("exactly one Y column"));
    }

    #[test]
    fn pie_and_line_need_x() {
        let cols = info(&["v"], &["k"]);
        assert_eq!(
            validate(Some(&cols), &sel(ChartKind::Pie, None, &["v"])),
            Err(Rejection::MissingX {
                kind: ChartKind::Pie
            })
        );
        assert_eq!(
            validate(Some(&cols), &sel(ChartKind::Line, None, &["v"])),
            Err(Rejection::MissingX {
                kind: ChartKind::Line
            })
        );
    }

    #[test]
    fn line_and_area_take_many_numeric_ys() {
        let cols = info(&["a", "b", "c"], &["month"]);
        for kind in [ChartKind::Line, ChartKind::StackedArea] {
            assert_eq!(validate(Some(&cols), &sel(kind, Some("month"), &["a", "b", "c"])), Ok(()));
            assert_eq!(
                validate(Some(&cols), &sel(kind, Some("month"), &[])),
                Err(Rejection::NoY { kind })
            );
            assert_eq!(
                validate(Some(&cols), &sel(kind, Some("month"), &["a", "month"])),
                Err(Rejection::NonNumericY {
                    kind,
                    column: "month".to_string()
                })
            );
        }
    }

    #[test]
    fn precedence_no_data_then_no_kind() {
        let empty = Selection::default();
        assert_eq!(validate(None, &empty), Err(Rejection::NoData));
        assert_eq!(
            validate(None, &sel(ChartKind::Line, Some("x"), &["y"])),
            Err(Rejection::NoData)
        );
        assert_eq!(validate(None, &empty).unwrap_err().to_string(), "Load data first");

        let no_columns = ColumnInfo::default();
        assert_eq!(validate(Some(&no_columns), &empty), Err(Rejection::NoChartKind));
        assert_eq!(
            validate(Some(&no_columns), &sel(ChartKind::Histogram, None, &[])),
            Err(Rejection::NotExactlyOneY {
                kind: ChartKind::Histogram,
                count: 0
            })
        );
    }

    #[test]
    fn unknown_and_duplicate_columns() {
        let cols = info(&["v"], &["k"]);
        assert_eq!(
            validate(Some(&cols), &sel(ChartKind::Line, Some("nope"), &["v"])),
            Err(Rejection::UnknownColumn {
                kind: ChartKind::Line,
                column: "nope".to_string()
            })
        );
        assert_eq!(
            validate(Some(&cols), &sel(ChartKind::Line, Some("k"), &["v", "v"])),
            Err(Rejection::DuplicateY {
                kind: ChartKind::Line,
                column: "v".to_string()
            })
        );
        assert_eq!(
            validate(Some(&cols), &sel(ChartKind::Polar, None, &["ghost"])),
            Err(Rejection::NonNumericY {
                kind: ChartKind::Polar,
                column: "ghost".to_string()
            })
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let cols = info(&["a"], &["k"]);
        let selections = [
            Selection::default(),
            sel(ChartKind::Pie, Some("k"), &["a"]),
            sel(ChartKind::Pie, Some("k"), &["k"]),
            sel(ChartKind::Polar, None, &[]),
        ];
        for s in &selections {
            let first = validate(Some(&cols), s);
            let second = validate(Some(&cols), s);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn toggle_and_retain() {
        let mut s = Selection::default();
        s.toggle_y("a");
        s.toggle_y("b");
        s.toggle_y("a");
        s.toggle_y("c");
        assert_eq!(s.ys, vec!["b", "c"]);

        s.x = Some("gone".to_string());
        s.retain_columns(&info(&["c"], &[]));
        assert_eq!(s.x, None);
        assert_eq!(s.ys, vec!["c"]);
    }
}
