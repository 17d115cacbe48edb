//! Post-scoring invariant checks over a full scored table.
//!
//! Validation never fails fast: every violation in the batch is collected
//! into a [`ValidationReport`] so one run gives the full diagnostic.

use serde::Serialize;
use std::fmt;

use crate::config::{ScoringConfig, WEIGHT_TOLERANCE};
use crate::error::ScoringError;
use crate::scoring::aggregate::renormalize;
use crate::scoring::normalize::MAX_SCORE;
use crate::scoring::tier::classify;
use crate::scoring::types::{Category, ScoredAreaRecord};
use crate::scoring::utility::approx_eq;

/// Tolerance when recombining stored scores.
pub const RECOMBINATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// `None` for violations in the configuration rather than a row.
    pub area_id: Option<String>,
    pub field: String,
    pub expected: String,
    pub actual: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} expected {}, got {}",
            self.area_id.as_deref().unwrap_or("<config>"),
            self.field,
            self.expected,
            self.actual
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub areas_checked: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Turns a report with violations into [`ScoringError::ValidationFailure`].
    pub fn into_result(self) -> Result<Self, ScoringError> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(ScoringError::ValidationFailure(self))
        }
    }

    fn push(
        &mut self,
        area_id: Option<&str>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: f64,
    ) {
        self.violations.push(Violation {
            area_id: area_id.map(str::to_string),
            field: field.into(),
            expected: expected.into(),
            actual,
        });
    }

    fn check_range(&mut self, area_id: &str, field: &str, value: f64) {
        if value.is_nan() || !(0.0..=MAX_SCORE).contains(&value) {
            self.push(Some(area_id), field, "value in [0, 10]", value);
        }
    }

    fn check_weights<'a, I>(&mut self, area_id: Option<&str>, table: &str, weights: I)
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut sum = 0.0;
        for (name, w) in weights {
            if w.is_nan() || w < 0.0 {
                self.push(area_id, format!("{table}.{name}"), "non-negative weight", w);
            }
            sum += w;
        }
        if !approx_eq(sum, 1.0, WEIGHT_TOLERANCE) {
            self.push(
                area_id,
                format!("{table} weights"),
                format!("sum of 1.0 ± {WEIGHT_TOLERANCE:e}"),
                sum,
            );
        }
    }
}

/// Checks the configured weight tables and grade-scale anchors.
pub fn validate_config(config: &ScoringConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (table, pairs) in config.weight_tables() {
        report.check_weights(None, table, pairs);
    }
    for (grade, value) in config.grade_scale.anchors() {
        if value.is_nan() || !(0.0..=MAX_SCORE).contains(&value) {
            report.push(None, format!("grade_scale.{grade}"), "value in [0, 10]", value);
        }
    }
    report
}

/// Checks every record of a scored table, plus the configuration it was scored with.
pub fn validate(records: &[ScoredAreaRecord], config: &ScoringConfig) -> ValidationReport {
    let mut report = validate_config(config);
    report.areas_checked = records.len();

    for record in records {
        validate_record(&mut report, record, config);
    }

    report
}

fn validate_record(
    report: &mut ValidationReport,
    record: &ScoredAreaRecord,
    config: &ScoringConfig,
) {
    let id = record.area_id.as_str();

    for (category, score) in &record.categories {
        let column = category.score_column();

        for component in &score.components {
            report.check_range(id, component.name, component.value);
        }
        report.check_weights(
            Some(id),
            category.as_str(),
            score.components.iter().map(|c| (c.name, c.weight)),
        );

        report.check_range(id, &column, score.value);
        let recombined: f64 = score.components.iter().map(|c| c.value * c.weight).sum();
        if !approx_eq(score.value, recombined, RECOMBINATION_TOLERANCE) {
            report.push(
                Some(id),
                column,
                format!("weighted sum of sub-scores {recombined:.6}"),
                score.value,
            );
        }
    }

    let available: Vec<Category> = record.categories.keys().copied().collect();
    let expected = renormalize(&config.category_weights, &available);

    match (&record.composite, expected) {
        (Some(composite), Some(expected)) => {
            report.check_range(id, "composite_score", composite.value);

            let recombined: f64 = expected
                .weights
                .iter()
                .filter_map(|(c, w)| record.categories.get(c).map(|s| s.value * w))
                .sum();
            if !approx_eq(composite.value, recombined, RECOMBINATION_TOLERANCE) {
                report.push(
                    Some(id),
                    "composite_score",
                    format!("weighted sum of category scores {recombined:.6}"),
                    composite.value,
                );
            }

            if composite.partial != expected.partial {
                report.push(
                    Some(id),
                    "partial",
                    format!("{}", expected.partial),
                    f64::from(u8::from(composite.partial)),
                );
            }

            if let Ok(tier) = classify(composite.value) {
                if record.tier != Some(tier) {
                    report.push(Some(id), "tier", tier.label(), composite.value);
                }
            }
        }
        (Some(composite), None) => {
            report.push(
                Some(id),
                "composite_score",
                "absent, no weighted categories",
                composite.value,
            );
        }
        (None, Some(_)) => {
            report.push(Some(id), "composite_score", "present", f64::NAN);
        }
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrimeWeights;
    use crate::scoring::aggregate::aggregate;
    use crate::scoring::types::{CategoryScore, SubScore};
    use std::collections::BTreeMap;

    fn record(scores: Vec<CategoryScore>, config: &ScoringConfig) -> ScoredAreaRecord {
        let categories: BTreeMap<_, _> = scores.into_iter().map(|s| (s.category, s)).collect();
        let composite = aggregate(&categories, &config.category_weights);
        let tier = composite.as_ref().and_then(|c| classify(c.value).ok());
        ScoredAreaRecord {
            area_id: "02118".to_string(),
            area_sq_mi: 1.2,
            categories,
            composite,
            tier,
            errors: vec![],
        }
    }

    fn single(category: Category, value: f64) -> CategoryScore {
        CategoryScore::from_components(
            category,
            vec![SubScore {
                name: "component",
                value,
                weight: 1.0,
            }],
        )
    }

    fn full(value: f64) -> Vec<CategoryScore> {
        Category::ALL.iter().map(|&c| single(c, value)).collect()
    }

    #[test]
    fn test_clean_table() {
        let config = ScoringConfig::default();
        let records = vec![record(full(7.2), &config)];
        let report = validate(&records, &config);
        assert!(report.is_clean(), "{:?}", report.violations);
        assert_eq!(report.areas_checked, 1);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_detects_out_of_range_sub_score() {
        let config = ScoringConfig::default();
        let mut r = record(full(5.0), &config);
        if let Some(crime) = r.categories.get_mut(&Category::Crime) {
            crime.components[0].value = 10.5;
        }

        let report = validate(&[r], &config);
        assert!(
            report
                .violations
                .iter()
                .any(|v| v.field == "component" && v.actual == 10.5)
        );
        assert!(matches!(
            report.into_result(),
            Err(ScoringError::ValidationFailure(_))
        ));
    }

    #[test]
    fn test_detects_weight_table_summing_to_099() {
        let config = ScoringConfig {
            crime: CrimeWeights {
                total: 0.39,
                violent: 0.35,
                property: 0.25,
            },
            ..Default::default()
        };

        let report = validate_config(&config);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].field, "crime weights");
        assert!((report.violations[0].actual - 0.99).abs() < 1e-9);
        assert!(report.violations[0].area_id.is_none());
    }

    #[test]
    fn test_detects_grade_anchor_outside_score_range() {
        let config = ScoringConfig {
            grade_scale: serde_json::from_str(r#"{"A": 12.0, "B": 6.5, "F": -1.0}"#).unwrap(),
            ..Default::default()
        };

        let report = validate_config(&config);
        let fields: Vec<_> = report.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["grade_scale.A", "grade_scale.F"]);
        assert!(validate_config(&ScoringConfig::default()).is_clean());
    }

    #[test]
    fn test_detects_component_weights_summing_to_099() {
        let config = ScoringConfig::default();
        let mut r = record(full(5.0), &config);
        if let Some(schools) = r.categories.get_mut(&Category::Schools) {
            schools.components[0].weight = 0.99;
        }

        let report = validate(&[r], &config);
        assert!(report.violations.iter().any(|v| v.field == "schools weights"));
    }

    #[test]
    fn test_detects_nan_and_negative() {
        let config = ScoringConfig::default();
        let mut r = record(full(5.0), &config);
        if let Some(h) = r.categories.get_mut(&Category::Housing) {
            h.value = f64::NAN;
        }
        if let Some(d) = r.categories.get_mut(&Category::Diversity) {
            d.components[0].value = -1.0;
        }

        let report = validate(&[r], &config);
        assert!(report.violations.iter().any(|v| v.field == "housing_score"));
        assert!(report.violations.iter().any(|v| v.actual == -1.0));
    }

    #[test]
    fn test_detects_tampered_composite() {
        let config = ScoringConfig::default();
        let mut r = record(full(5.0), &config);
        if let Some(c) = r.composite.as_mut() {
            c.value = 9.0;
        }

        let report = validate(&[r], &config);
        assert!(
            report
                .violations
                .iter()
                .any(|v| v.field == "composite_score" && v.actual == 9.0)
        );
        // tier no longer matches the tampered composite either
        assert!(report.violations.iter().any(|v| v.field == "tier"));
    }

    #[test]
    fn test_partial_flag_consistency() {
        let config = ScoringConfig::default();
        let mut r = record(vec![single(Category::Crime, 6.0)], &config);
        assert!(r.is_partial());
        if let Some(c) = r.composite.as_mut() {
            c.partial = false;
        }

        let report = validate(&[r], &config);
        assert!(report.violations.iter().any(|v| v.field == "partial"));
    }

    #[test]
    fn test_reports_every_violation() {
        let config = ScoringConfig::default();
        let mut a = record(full(5.0), &config);
        let mut b = record(full(5.0), &config);
        b.area_id = "02119".to_string();
        for r in [&mut a, &mut b] {
            if let Some(t) = r.categories.get_mut(&Category::Transit) {
                t.components[0].value = 11.0;
            }
        }

        let report = validate(&[a, b], &config);
        let ids: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.actual == 11.0)
            .filter_map(|v| v.area_id.clone())
            .collect();
        assert_eq!(ids, vec!["02118".to_string(), "02119".to_string()]);
    }
}
