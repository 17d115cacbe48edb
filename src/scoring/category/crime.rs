//! Crime: incident densities, inverted so safer areas score higher.

use serde::Deserialize;

use crate::config::CrimeWeights;
use crate::error::Result;
use crate::scoring::category::{CategoryScorer, density, require, scale};
use crate::scoring::normalize::Bounds;
use crate::scoring::types::{Area, AreaInputs, Category, CategoryScore, Metric, SubScore};

pub const COMPONENTS: &[&str] = &[
    "total_density_score",
    "violent_density_score",
    "property_density_score",
];

/// Published measurements as `(column, description)`.
pub const METRICS: &[(&str, &str)] = &[
    ("crimes_per_sq_mi", "Reported incidents per square mile"),
    ("violent_per_sq_mi", "Violent incidents per square mile"),
    ("property_per_sq_mi", "Property incidents per square mile"),
];

/// Incident counts attributed to one area.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CrimeCounts {
    pub total_crimes: Option<u64>,
    pub violent_crimes: Option<u64>,
    pub property_crimes: Option<u64>,
}

/// Incidents per square mile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrimeDensities {
    pub total: f64,
    pub violent: f64,
    pub property: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CrimeBounds {
    total: Option<Bounds>,
    violent: Option<Bounds>,
    property: Option<Bounds>,
}

pub struct CrimeScorer {
    pub weights: CrimeWeights,
}

impl CategoryScorer for CrimeScorer {
    type Raw = CrimeCounts;
    type Metrics = CrimeDensities;
    type Bounds = CrimeBounds;

    const CATEGORY: Category = Category::Crime;

    fn raw<'a>(&self, inputs: &'a AreaInputs) -> Option<&'a CrimeCounts> {
        inputs.crime.as_ref()
    }

    fn derive(&self, area: &Area, raw: &CrimeCounts) -> Result<CrimeDensities> {
        let total = require(raw.total_crimes, area, Self::CATEGORY)?;
        let violent = require(raw.violent_crimes, area, Self::CATEGORY)?;
        let property = require(raw.property_crimes, area, Self::CATEGORY)?;

        Ok(CrimeDensities {
            total: density(area, "crimes_per_sq_mi", total as f64)?,
            violent: density(area, "violent_per_sq_mi", violent as f64)?,
            property: density(area, "property_per_sq_mi", property as f64)?,
        })
    }

    fn bounds(&self, metrics: &[&CrimeDensities]) -> CrimeBounds {
        CrimeBounds {
            total: Bounds::from_values(metrics.iter().map(|m| m.total)),
            violent: Bounds::from_values(metrics.iter().map(|m| m.violent)),
            property: Bounds::from_values(metrics.iter().map(|m| m.property)),
        }
    }

    fn score(&self, metrics: &CrimeDensities, bounds: &CrimeBounds) -> CategoryScore {
        CategoryScore::from_components(
            Self::CATEGORY,
            vec![
                SubScore {
                    name: COMPONENTS[0],
                    value: scale(bounds.total, metrics.total, true),
                    weight: self.weights.total,
                },
                SubScore {
                    name: COMPONENTS[1],
                    value: scale(bounds.violent, metrics.violent, true),
                    weight: self.weights.violent,
                },
                SubScore {
                    name: COMPONENTS[2],
                    value: scale(bounds.property, metrics.property, true),
                    weight: self.weights.property,
                },
            ],
        )
        .with_metrics(vec![
            Metric::number(METRICS[0].0, metrics.total),
            Metric::number(METRICS[1].0, metrics.violent),
            Metric::number(METRICS[2].0, metrics.property),
        ])
    }
}
