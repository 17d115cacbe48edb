//! Schools: grade-converted school quality, averaged when an area has several.

use serde::Deserialize;

use crate::config::SchoolAveraging;
use crate::error::Result;
use crate::scoring::category::{CategoryScorer, require};
use crate::scoring::grade::GradeScale;
use crate::scoring::normalize::MAX_SCORE;
use crate::scoring::types::{Area, AreaInputs, Category, CategoryScore, Metric, SubScore};
use crate::scoring::utility::mean;

pub const COMPONENTS: &[&str] = &["school_score"];

pub const METRICS: &[(&str, &str)] = &[
    ("schools_graded", "Graded schools in the area"),
    ("school_grades", "Letter grades of those schools, separated by ';'"),
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchoolGrade {
    pub grade: String,
    pub enrollment: Option<u32>,
}

/// All graded schools in one area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchoolGrades {
    pub schools: Vec<SchoolGrade>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchoolMetrics {
    /// Averaged numeric grade.
    pub average: f64,
    pub grades: Vec<String>,
}

pub struct SchoolScorer<'a> {
    pub scale: &'a GradeScale,
    pub averaging: SchoolAveraging,
}

impl SchoolScorer<'_> {
    fn average(&self, converted: &[(f64, Option<u32>)]) -> Option<f64> {
        if converted.is_empty() {
            return None;
        }

        if self.averaging == SchoolAveraging::EnrollmentWeighted {
            let (weighted, enrolled) = converted
                .iter()
                .filter_map(|&(score, enrollment)| enrollment.map(|e| (score, f64::from(e))))
                .fold((0.0, 0.0), |(sum, n), (score, e)| (sum + score * e, n + e));
            if enrolled > 0.0 {
                return Some(weighted / enrolled);
            }
        }

        let scores: Vec<f64> = converted.iter().map(|&(score, _)| score).collect();
        Some(mean(&scores))
    }
}

impl CategoryScorer for SchoolScorer<'_> {
    type Raw = SchoolGrades;
    type Metrics = SchoolMetrics;
    type Bounds = ();

    const CATEGORY: Category = Category::Schools;

    fn raw<'b>(&self, inputs: &'b AreaInputs) -> Option<&'b SchoolGrades> {
        inputs.schools.as_ref()
    }

    fn derive(&self, area: &Area, raw: &SchoolGrades) -> Result<SchoolMetrics> {
        let converted = raw
            .schools
            .iter()
            .map(|s| Ok((self.scale.convert(&s.grade)?, s.enrollment)))
            .collect::<Result<Vec<_>>>()?;

        let average = require(self.average(&converted), area, Self::CATEGORY)?;
        Ok(SchoolMetrics {
            average,
            grades: raw.schools.iter().map(|s| s.grade.clone()).collect(),
        })
    }

    fn bounds(&self, _metrics: &[&SchoolMetrics]) {}

    fn score(&self, metrics: &SchoolMetrics, _bounds: &()) -> CategoryScore {
        CategoryScore::from_components(
            Self::CATEGORY,
            vec![SubScore {
                name: COMPONENTS[0],
                value: metrics.average.clamp(0.0, MAX_SCORE),
                weight: 1.0,
            }],
        )
        .with_metrics(vec![
            Metric::count(METRICS[0].0, metrics.grades.len() as u64),
            Metric::text(METRICS[1].0, metrics.grades.join(";")),
        ])
    }
}
