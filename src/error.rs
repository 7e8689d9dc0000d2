//! Error types surfaced at the load / plot / save action boundaries.

use thiserror::Error;

use crate::chart::validate::Rejection;

#[derive(Error, Debug)]
pub enum AppError {
    /// File unreadable, unsupported or empty after parsing.
    #[error("Could not load data: {0:#}")]
    Load(anyhow::Error),

    /// Selection rejected before any chart work.
    #[error("{0}")]
    Validation(#[from] Rejection),

    /// A column had no numeric values after coercion.
    #[error("Column '{column}' has no valid numeric data")]
    NoValidData { column: String },

    /// Every row was filtered out before grouping.
    #[error("Column '{column}' has no {} values to aggregate", qualifier(.positive_only))]
    EmptyAggregation { column: String, positive_only: bool },

    /// Pie group sums that cannot form wedges.
    #[error("Column '{column}' has negative group sums; a pie needs non-negative values")]
    NegativeWedge { column: String },

    /// Screenshot or image write failure.
    #[error("Could not save image: {0:#}")]
    Export(anyhow::Error),
}

fn qualifier(positive_only: &bool) -> &'static str {
    if *positive_only {
        "positive"
    } else {
        "numeric"
    }
}

impl AppError {
    /// Short heading for the status line and log records.
    pub fn title(&self) -> &'static str {
        match self {
            AppError::Load(_) => "Load failed",
            AppError::Validation(_) => "Check selection",
            AppError::NoValidData { .. } => "No valid data",
            AppError::EmptyAggregation { .. } => "Nothing to aggregate",
            AppError::NegativeWedge { .. } => "Cannot draw pie",
            AppError::Export(_) => "Save failed",
        }
    }

    /// Message suitable for display in the UI.
    pub fn user_message(&self) -> String {
        format!("{}: {self}", self.title())
    }
}
