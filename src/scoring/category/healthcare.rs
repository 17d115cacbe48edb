//! Healthcare access: hospital distances (closer is better) and hospital
//! counts within a fixed radius of the area centroid (more is better).
//!
//! The radius is fixed upstream when the counts are computed; the engine only
//! sees the resulting counts.

use serde::Deserialize;

use crate::config::HealthcareWeights;
use crate::error::Result;
use crate::scoring::category::{CategoryScorer, measurement, require, scale};
use crate::scoring::normalize::Bounds;
use crate::scoring::types::{Area, AreaInputs, Category, CategoryScore, Metric, SubScore};

pub const COMPONENTS: &[&str] = &[
    "nearest_tier1_score",
    "nearest_hospital_score",
    "hospital_density_score",
    "tier1_access_score",
];

pub const METRICS: &[(&str, &str)] = &[
    ("nearest_tier1_dist", "Miles to the nearest Tier-1 hospital"),
    ("nearest_hospital_dist", "Miles to the nearest hospital of any tier"),
    ("hospitals_within_radius", "Hospitals within the access radius"),
    ("tier1_within_radius", "Tier-1 hospitals within the access radius"),
];

/// Distances are in miles from the area centroid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HospitalAccess {
    pub nearest_tier1_dist: Option<f64>,
    pub nearest_hospital_dist: Option<f64>,
    #[serde(alias = "hospitals_within_5mi")]
    pub hospitals_within_radius: Option<u32>,
    #[serde(alias = "tier1_within_5mi")]
    pub tier1_within_radius: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthcareMetrics {
    pub nearest_tier1_dist: f64,
    pub nearest_hospital_dist: f64,
    pub hospitals_within_radius: u32,
    pub tier1_within_radius: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct HealthcareBounds {
    nearest_tier1: Option<Bounds>,
    nearest_any: Option<Bounds>,
    density: Option<Bounds>,
    tier1_access: Option<Bounds>,
}

pub struct HealthcareScorer {
    pub weights: HealthcareWeights,
}

impl CategoryScorer for HealthcareScorer {
    type Raw = HospitalAccess;
    type Metrics = HealthcareMetrics;
    type Bounds = HealthcareBounds;

    const CATEGORY: Category = Category::Healthcare;

    fn raw<'a>(&self, inputs: &'a AreaInputs) -> Option<&'a HospitalAccess> {
        inputs.healthcare.as_ref()
    }

    fn derive(&self, area: &Area, raw: &HospitalAccess) -> Result<HealthcareMetrics> {
        let tier1 = require(raw.nearest_tier1_dist, area, Self::CATEGORY)?;
        let any = require(raw.nearest_hospital_dist, area, Self::CATEGORY)?;
        let within = require(raw.hospitals_within_radius, area, Self::CATEGORY)?;
        let tier1_within = require(raw.tier1_within_radius, area, Self::CATEGORY)?;

        Ok(HealthcareMetrics {
            nearest_tier1_dist: measurement(area, "nearest_tier1_dist", tier1)?,
            nearest_hospital_dist: measurement(area, "nearest_hospital_dist", any)?,
            hospitals_within_radius: within,
            tier1_within_radius: tier1_within,
        })
    }

    fn bounds(&self, metrics: &[&HealthcareMetrics]) -> HealthcareBounds {
        HealthcareBounds {
            nearest_tier1: Bounds::from_values(metrics.iter().map(|m| m.nearest_tier1_dist)),
            nearest_any: Bounds::from_values(metrics.iter().map(|m| m.nearest_hospital_dist)),
            density: Bounds::from_values(
                metrics.iter().map(|m| f64::from(m.hospitals_within_radius)),
            ),
            tier1_access: Bounds::from_values(
                metrics.iter().map(|m| f64::from(m.tier1_within_radius)),
            ),
        }
    }

    fn score(&self, metrics: &HealthcareMetrics, bounds: &HealthcareBounds) -> CategoryScore {
        CategoryScore::from_components(
            Self::CATEGORY,
            vec![
                SubScore {
                    name: COMPONENTS[0],
                    value: scale(bounds.nearest_tier1, metrics.nearest_tier1_dist, true),
                    weight: self.weights.nearest_tier1,
                },
                SubScore {
                    name: COMPONENTS[1],
                    value: scale(bounds.nearest_any, metrics.nearest_hospital_dist, true),
                    weight: self.weights.nearest_any,
                },
                SubScore {
                    name: COMPONENTS[2],
                    value: scale(
                        bounds.density,
                        f64::from(metrics.hospitals_within_radius),
                        false,
                    ),
                    weight: self.weights.density,
                },
                SubScore {
                    name: COMPONENTS[3],
                    value: scale(
                        bounds.tier1_access,
                        f64::from(metrics.tier1_within_radius),
                        false,
                    ),
                    weight: self.weights.tier1_access,
                },
            ],
        )
        .with_metrics(vec![
            Metric::number(METRICS[0].0, metrics.nearest_tier1_dist),
            Metric::number(METRICS[1].0, metrics.nearest_hospital_dist),
            Metric::count(METRICS[2].0, u64::from(metrics.hospitals_within_radius)),
            Metric::count(METRICS[3].0, u64::from(metrics.tier1_within_radius)),
        ])
    }
}
