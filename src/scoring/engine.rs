//! Runs every category scorer over a full set of areas and assembles the
//! scored table.
//!
//! Per-area work runs on the rayon pool. The only state shared between areas
//! is each category's normalization bounds, computed once every area's
//! metrics have been derived.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::{ErrorPolicy, ScoringConfig};
use crate::error::{Result, ScoringError};
use crate::scoring::aggregate::aggregate;
use crate::scoring::category::{
    CategoryScorer, crime::CrimeScorer, diversity::DiversityScorer,
    healthcare::HealthcareScorer, housing::HousingScorer, lifestyle::LifestyleScorer,
    schools::SchoolScorer, transit::TransitScorer,
};
use crate::scoring::tier::classify;
use crate::scoring::types::{AreaInputs, Category, CategoryScore, ScoredAreaRecord};

/// Result of scoring one category for one area.
#[derive(Debug)]
enum Outcome {
    Scored(CategoryScore),
    Missing,
    /// Tolerated error under [`ErrorPolicy::MarkPartial`].
    Failed(String),
}

/// Scores every area in `inputs`.
///
/// Records come back in input order.
///
/// # Errors
///
/// Under [`ErrorPolicy::Abort`], returns the first per-area error found.
/// Categories run in [`Category::ALL`] order and, within a category, areas in
/// input order, so a lifestyle error in the last area wins over a schools error in
/// the first. Missing categories never fail the run.
#[tracing::instrument(skip_all, fields(areas = inputs.len(), policy = ?config.error_policy))]
pub fn score_areas(inputs: &[AreaInputs], config: &ScoringConfig) -> Result<Vec<ScoredAreaRecord>> {
    let policy = config.error_policy;
    let scale = &config.grade_scale;

    let columns = vec![
        (
            Category::Crime,
            run_category(&CrimeScorer { weights: config.crime }, inputs, policy)?,
        ),
        (
            Category::Lifestyle,
            run_category(&LifestyleScorer { scale }, inputs, policy)?,
        ),
        (
            Category::Schools,
            run_category(
                &SchoolScorer {
                    scale,
                    averaging: config.school_averaging,
                },
                inputs,
                policy,
            )?,
        ),
        (
            Category::Transit,
            run_category(&TransitScorer { weights: config.transit }, inputs, policy)?,
        ),
        (
            Category::Healthcare,
            run_category(&HealthcareScorer { weights: config.healthcare }, inputs, policy)?,
        ),
        (
            Category::Housing,
            run_category(&HousingScorer { weights: config.housing }, inputs, policy)?,
        ),
        (
            Category::Diversity,
            run_category(
                &DiversityScorer {
                    min_population: config.min_population,
                },
                inputs,
                policy,
            )?,
        ),
    ];

    let mut categories: Vec<BTreeMap<Category, CategoryScore>> = vec![BTreeMap::new(); inputs.len()];
    let mut errors: Vec<Vec<String>> = vec![Vec::new(); inputs.len()];

    for (category, outcomes) in columns {
        for ((scores, errs), outcome) in categories.iter_mut().zip(errors.iter_mut()).zip(outcomes) {
            match outcome {
                Outcome::Scored(score) => {
                    scores.insert(category, score);
                }
                Outcome::Missing => {}
                Outcome::Failed(e) => errs.push(e),
            }
        }
    }

    let records = inputs
        .par_iter()
        .zip(categories.into_par_iter())
        .zip(errors.into_par_iter())
        .map(|((input, scores), errs)| build_record(input, scores, errs, config))
        .collect::<Result<Vec<_>>>()?;

    let partial = records
        .iter()
        .filter(|r| r.composite.as_ref().is_some_and(|c| c.partial))
        .count();
    let no_data = records.iter().filter(|r| r.composite.is_none()).count();
    info!(
        scored = records.len() - no_data,
        partial, no_data, "Scoring complete"
    );

    Ok(records)
}

/// Derives, normalizes and scores one category across every area.
fn run_category<S: CategoryScorer>(
    scorer: &S,
    inputs: &[AreaInputs],
    policy: ErrorPolicy,
) -> Result<Vec<Outcome>> {
    let category = S::CATEGORY;

    let derived: Vec<Result<S::Metrics>> = inputs
        .par_iter()
        .map(|input| match scorer.raw(input) {
            Some(raw) => scorer.derive(&input.area, raw),
            None => Err(ScoringError::MissingCategory {
                area_id: input.area.id.clone(),
                category,
            }),
        })
        .collect();

    let mut metrics = Vec::with_capacity(derived.len());
    let mut failures = Vec::with_capacity(derived.len());
    for (input, result) in inputs.iter().zip(derived) {
        match result {
            Ok(m) => {
                metrics.push(Some(m));
                failures.push(None);
            }
            Err(ScoringError::MissingCategory { .. }) => {
                debug!(area_id = %input.area.id, %category, "Category missing");
                metrics.push(None);
                failures.push(None);
            }
            Err(e) => match policy {
                ErrorPolicy::Abort => return Err(e),
                ErrorPolicy::MarkPartial => {
                    warn!(area_id = %input.area.id, %category, error = %e, "Dropping category");
                    metrics.push(None);
                    failures.push(Some(format!("{category}: {e}")));
                }
            },
        }
    }

    let present: Vec<&S::Metrics> = metrics.iter().flatten().collect();
    let bounds = scorer.bounds(&present);
    debug!(%category, present = present.len(), "Normalization bounds computed");

    let outcomes = metrics
        .par_iter()
        .zip(failures.into_par_iter())
        .map(|(m, failure)| match (m, failure) {
            (Some(m), _) => Outcome::Scored(scorer.score(m, &bounds)),
            (None, Some(e)) => Outcome::Failed(e),
            (None, None) => Outcome::Missing,
        })
        .collect();

    Ok(outcomes)
}

fn build_record(
    input: &AreaInputs,
    categories: BTreeMap<Category, CategoryScore>,
    errors: Vec<String>,
    config: &ScoringConfig,
) -> Result<ScoredAreaRecord> {
    let composite = aggregate(&categories, &config.category_weights);
    let tier = composite.as_ref().map(|c| classify(c.value)).transpose()?;

    Ok(ScoredAreaRecord {
        area_id: input.area.id.clone(),
        area_sq_mi: input.area.area_sq_mi,
        categories,
        composite,
        tier,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::category::crime::CrimeCounts;
    use crate::scoring::category::diversity::Demographics;
    use crate::scoring::category::healthcare::HospitalAccess;
    use crate::scoring::category::housing::HousingCosts;
    use crate::scoring::category::lifestyle::LifestyleGrades;
    use crate::scoring::category::schools::{SchoolGrade, SchoolGrades};
    use crate::scoring::category::transit::TransitStops;
    use crate::scoring::tier::Tier;
    use crate::scoring::types::Area;
    use crate::scoring::validate::validate;

    fn full_inputs(id: &str, sq_mi: f64, crimes: u64, stops: u64, home: f64, grade: &str) -> AreaInputs {
        AreaInputs {
            area: Area::new(id, sq_mi).unwrap(),
            crime: Some(CrimeCounts {
                total_crimes: Some(crimes),
                violent_crimes: Some(crimes / 5),
                property_crimes: Some(crimes / 2),
            }),
            lifestyle: Some(LifestyleGrades {
                nightlife: Some(grade.to_string()),
                health: Some(grade.to_string()),
                outdoor: Some(grade.to_string()),
            }),
            schools: Some(SchoolGrades {
                schools: vec![SchoolGrade {
                    grade: grade.to_string(),
                    enrollment: None,
                }],
            }),
            transit: Some(TransitStops {
                total_stops: Some(stops),
            }),
            housing: Some(HousingCosts {
                median_home_value: Some(home),
                median_rent: Some(home / 300.0),
                median_household_income: Some(90_000.0),
            }),
            healthcare: Some(HospitalAccess {
                nearest_tier1_dist: Some(sq_mi),
                nearest_hospital_dist: Some(sq_mi / 2.0),
                hospitals_within_radius: Some(stops as u32 / 4),
                tier1_within_radius: Some(1),
            }),
            diversity: Some(Demographics {
                total_pop: Some(10_000),
                white: Some(4_000),
                black: Some(3_000),
                asian: Some(1_500),
                other: Some(1_000),
                two_or_more: Some(500),
            }),
        }
    }

    fn sample() -> Vec<AreaInputs> {
        vec![
            full_inputs("02108", 0.5, 400, 60, 900_000.0, "A"),
            full_inputs("02124", 2.5, 900, 40, 550_000.0, "B"),
            full_inputs("02136", 4.0, 300, 12, 480_000.0, "C+"),
        ]
    }

    #[test]
    fn test_scores_every_area_in_order() {
        let config = ScoringConfig::default();
        let records = score_areas(&sample(), &config).unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.area_id.as_str()).collect();
        assert_eq!(ids, vec!["02108", "02124", "02136"]);
        for r in &records {
            assert_eq!(r.categories.len(), 7);
            assert!(!r.is_partial());
            assert!(r.tier.is_some());
        }
    }

    #[test]
    fn test_output_passes_validation() {
        let config = ScoringConfig::default();
        let records = score_areas(&sample(), &config).unwrap();
        let report = validate(&records, &config);
        assert!(report.is_clean(), "{:?}", report.violations);
    }

    #[test]
    fn test_deterministic() {
        let config = ScoringConfig::default();
        let a = score_areas(&sample(), &config).unwrap();
        let b = score_areas(&sample(), &config).unwrap();
        let composites = |rs: &[ScoredAreaRecord]| rs.iter().map(|r| r.composite_value()).collect::<Vec<_>>();
        assert_eq!(composites(&a), composites(&b));
    }

    #[test]
    fn test_missing_category_marks_partial() {
        let config = ScoringConfig::default();
        let mut inputs = sample();
        inputs[1].lifestyle = None;

        let records = score_areas(&inputs, &config).unwrap();
        assert!(records[1].is_partial());
        assert!(records[1].category(Category::Lifestyle).is_none());
        assert!(!records[0].is_partial());

        let weights = &records[1].composite.as_ref().unwrap().weights;
        assert!((weights.values().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_without_any_data_has_no_tier() {
        let config = ScoringConfig::default();
        let mut inputs = sample();
        inputs.push(AreaInputs::new(Area::new("02133", 0.01).unwrap()));

        let records = score_areas(&inputs, &config).unwrap();
        let empty = &records[3];
        assert!(empty.composite.is_none());
        assert_eq!(empty.tier_label(), "No Data");
    }

    #[test]
    fn test_abort_policy_propagates_unknown_grade() {
        let config = ScoringConfig::default();
        let mut inputs = sample();
        inputs[2].schools = Some(SchoolGrades {
            schools: vec![SchoolGrade {
                grade: "Z".to_string(),
                enrollment: None,
            }],
        });

        assert!(matches!(
            score_areas(&inputs, &config),
            Err(ScoringError::UnknownGrade(g)) if g == "Z"
        ));
    }

    #[test]
    fn test_abort_reports_earlier_category_before_earlier_area() {
        let config = ScoringConfig::default();
        let mut inputs = sample();
        inputs[0].schools = Some(SchoolGrades {
            schools: vec![SchoolGrade {
                grade: "Z".to_string(),
                enrollment: None,
            }],
        });
        if let Some(lifestyle) = inputs[2].lifestyle.as_mut() {
            lifestyle.outdoor = Some("Q".to_string());
        }

        // lifestyle runs before schools, so the last area's error wins
        assert!(matches!(
            score_areas(&inputs, &config),
            Err(ScoringError::UnknownGrade(g)) if g == "Q"
        ));
    }

    #[test]
    fn test_records_carry_land_area() {
        let records = score_areas(&sample(), &ScoringConfig::default()).unwrap();
        let areas: Vec<_> = records.iter().map(|r| r.area_sq_mi).collect();
        assert_eq!(areas, vec![0.5, 2.5, 4.0]);
        let transit = records[0].category(Category::Transit).unwrap();
        assert_eq!(transit.metric("stops_per_sq_mi").map(|v| v.to_string()), Some("120.00".to_string()));
    }

    #[test]
    fn test_mark_partial_policy_drops_failing_category() {
        let config = ScoringConfig {
            error_policy: ErrorPolicy::MarkPartial,
            ..Default::default()
        };
        let mut inputs = sample();
        if let Some(housing) = inputs[0].housing.as_mut() {
            housing.median_household_income = Some(0.0);
        }

        let records = score_areas(&inputs, &config).unwrap();
        assert!(records[0].category(Category::Housing).is_none());
        assert!(records[0].is_partial());
        assert_eq!(records[0].errors.len(), 1);
        assert!(records[0].errors[0].starts_with("housing:"));
        // remaining areas are normalized among themselves
        assert!(records[1].category(Category::Housing).is_some());
    }

    #[test]
    fn test_identical_areas_score_neutral() {
        let config = ScoringConfig::default();
        let inputs = vec![
            full_inputs("a", 1.0, 100, 10, 500_000.0, "B"),
            full_inputs("b", 1.0, 100, 10, 500_000.0, "B"),
        ];

        let records = score_areas(&inputs, &config).unwrap();
        for r in &records {
            let crime = r.category(Category::Crime).unwrap();
            assert!(crime.components.iter().all(|c| c.value == 5.0));
            assert_eq!(r.category(Category::Transit).unwrap().value, 5.0);
        }
        assert_eq!(records[0].tier, records[1].tier);
        assert_ne!(records[0].tier, Some(Tier::Excellent));
    }
}
