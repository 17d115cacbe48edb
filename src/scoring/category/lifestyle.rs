//! Lifestyle: mean of the nightlife, health & fitness and outdoor grades.

use serde::Deserialize;

use crate::error::Result;
use crate::scoring::category::{CategoryScorer, require};
use crate::scoring::grade::GradeScale;
use crate::scoring::normalize::MAX_SCORE;
use crate::scoring::types::{Area, AreaInputs, Category, CategoryScore, Metric, SubScore};

pub const COMPONENTS: &[&str] = &["nightlife_score", "health_score", "outdoor_score"];

/// Raw letter grades, one per component.
pub const METRICS: &[(&str, &str)] = &[
    ("nightlife_grade", "Nightlife letter grade"),
    ("health_grade", "Health & fitness letter grade"),
    ("outdoor_grade", "Outdoor activities letter grade"),
];

/// Letter grades for one area. Grades are already trimmed and upper-cased.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LifestyleGrades {
    pub nightlife: Option<String>,
    pub health: Option<String>,
    pub outdoor: Option<String>,
}

/// One present grade and its numeric anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedGrade {
    /// Position in [`COMPONENTS`] and [`METRICS`].
    pub index: usize,
    pub grade: String,
    pub points: f64,
}

pub struct LifestyleScorer<'a> {
    pub scale: &'a GradeScale,
}

impl CategoryScorer for LifestyleScorer<'_> {
    type Raw = LifestyleGrades;
    type Metrics = Vec<ConvertedGrade>;
    type Bounds = ();

    const CATEGORY: Category = Category::Lifestyle;

    fn raw<'b>(&self, inputs: &'b AreaInputs) -> Option<&'b LifestyleGrades> {
        inputs.lifestyle.as_ref()
    }

    fn derive(&self, area: &Area, raw: &LifestyleGrades) -> Result<Vec<ConvertedGrade>> {
        let grades = [&raw.nightlife, &raw.health, &raw.outdoor];

        let mut converted = Vec::with_capacity(grades.len());
        for (index, grade) in grades.into_iter().enumerate() {
            if let Some(grade) = grade {
                converted.push(ConvertedGrade {
                    index,
                    grade: grade.clone(),
                    points: self.scale.convert(grade)?,
                });
            }
        }

        let present = (!converted.is_empty()).then_some(converted);
        require(present, area, Self::CATEGORY)
    }

    fn bounds(&self, _metrics: &[&Vec<ConvertedGrade>]) {}

    /// Equal-weight mean over the grades that were present.
    fn score(&self, metrics: &Vec<ConvertedGrade>, _bounds: &()) -> CategoryScore {
        let weight = 1.0 / metrics.len() as f64;
        CategoryScore::from_components(
            Self::CATEGORY,
            metrics
                .iter()
                .map(|g| SubScore {
                    name: COMPONENTS[g.index],
                    value: g.points.clamp(0.0, MAX_SCORE),
                    weight,
                })
                .collect(),
        )
        .with_metrics(
            metrics
                .iter()
                .map(|g| Metric::text(METRICS[g.index].0, g.grade.as_str()))
                .collect(),
        )
    }
}
