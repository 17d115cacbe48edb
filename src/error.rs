//! Error taxonomy for the scoring engine.

use thiserror::Error;

use crate::scoring::types::Category;
use crate::scoring::validate::ValidationReport;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("unknown letter grade {0:?}")]
    UnknownGrade(String),

    #[error("invalid population base {total}: {reason}")]
    InvalidPopulation { total: u64, reason: &'static str },

    #[error("{field} = {value} is outside [0, 10]")]
    OutOfRange { field: String, value: f64 },

    #[error("area {area_id} has no {category} data")]
    MissingCategory { area_id: String, category: Category },

    #[error("invalid land area for {area_id}: {area_sq_mi}")]
    InvalidArea { area_id: String, area_sq_mi: f64 },

    #[error("division by zero computing {metric} for area {area_id}")]
    DivisionByZero { area_id: String, metric: &'static str },

    #[error("invalid measurement {field} = {value} for area {area_id}")]
    InvalidMeasurement {
        area_id: String,
        field: &'static str,
        value: f64,
    },

    #[error("validation failed with {} violation(s)", .0.violations.len())]
    ValidationFailure(ValidationReport),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
