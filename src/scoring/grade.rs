use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, ScoringError};

/// Default numeric anchors for letter grades.
///
/// | Grade | Score | Grade | Score | Grade | Score |
/// |-------|-------|-------|-------|-------|-------|
/// | A+    | 10.0  | B-    | 6.0   | D+    | 2.5   |
/// | A     | 9.0   | C+    | 5.0   | D     | 1.5   |
/// | A-    | 8.5   | C     | 4.0   | D-    | 1.0   |
/// | B+    | 7.5   | C-    | 3.5   | F     | 0.5   |
/// | B     | 6.5   |       |       |       |       |
static DEFAULT_ANCHORS: &[(&str, f64)] = &[
    ("A+", 10.0),
    ("A", 9.0),
    ("A-", 8.5),
    ("B+", 7.5),
    ("B", 6.5),
    ("B-", 6.0),
    ("C+", 5.0),
    ("C", 4.0),
    ("C-", 3.5),
    ("D+", 2.5),
    ("D", 1.5),
    ("D-", 1.0),
    ("F", 0.5),
];

/// Maps letter grades to numeric scores.
///
/// Lookups are exact: callers are expected to trim and upper-case grades
/// before converting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeScale {
    anchors: BTreeMap<String, f64>,
}

impl Default for GradeScale {
    fn default() -> Self {
        Self {
            anchors: DEFAULT_ANCHORS
                .iter()
                .map(|&(grade, score)| (grade.to_string(), score))
                .collect(),
        }
    }
}

impl GradeScale {
    /// Converts a letter grade into its numeric anchor.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::UnknownGrade`] if the grade is not on the scale.
    pub fn convert(&self, grade: &str) -> Result<f64> {
        self.anchors
            .get(grade)
            .copied()
            .ok_or_else(|| ScoringError::UnknownGrade(grade.to_string()))
    }

    /// Grades and their anchors, in grade order.
    pub fn anchors(&self) -> impl Iterator<Item = (&str, f64)> {
        self.anchors.iter().map(|(grade, &value)| (grade.as_str(), value))
    }
}
