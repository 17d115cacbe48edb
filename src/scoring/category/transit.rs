//! Transit: stop count and stop density, more is better.

use serde::Deserialize;

use crate::config::TransitWeights;
use crate::error::Result;
use crate::scoring::category::{CategoryScorer, density, require, scale};
use crate::scoring::normalize::Bounds;
use crate::scoring::types::{Area, AreaInputs, Category, CategoryScore, Metric, SubScore};

pub const COMPONENTS: &[&str] = &["stop_count_score", "stop_density_score"];

pub const METRICS: &[(&str, &str)] = &[
    ("total_stops", "Transit stops inside the area"),
    ("stops_per_sq_mi", "Transit stops per square mile"),
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransitStops {
    pub total_stops: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitMetrics {
    pub total_stops: u64,
    pub stops_per_sq_mi: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct TransitBounds {
    stop_count: Option<Bounds>,
    density: Option<Bounds>,
}

pub struct TransitScorer {
    pub weights: TransitWeights,
}

impl CategoryScorer for TransitScorer {
    type Raw = TransitStops;
    type Metrics = TransitMetrics;
    type Bounds = TransitBounds;

    const CATEGORY: Category = Category::Transit;

    fn raw<'a>(&self, inputs: &'a AreaInputs) -> Option<&'a TransitStops> {
        inputs.transit.as_ref()
    }

    fn derive(&self, area: &Area, raw: &TransitStops) -> Result<TransitMetrics> {
        let total_stops = require(raw.total_stops, area, Self::CATEGORY)?;
        Ok(TransitMetrics {
            total_stops,
            stops_per_sq_mi: density(area, "stops_per_sq_mi", total_stops as f64)?,
        })
    }

    fn bounds(&self, metrics: &[&TransitMetrics]) -> TransitBounds {
        TransitBounds {
            stop_count: Bounds::from_values(metrics.iter().map(|m| m.total_stops as f64)),
            density: Bounds::from_values(metrics.iter().map(|m| m.stops_per_sq_mi)),
        }
    }

    fn score(&self, metrics: &TransitMetrics, bounds: &TransitBounds) -> CategoryScore {
        CategoryScore::from_components(
            Self::CATEGORY,
            vec![
                SubScore {
                    name: COMPONENTS[0],
                    value: scale(bounds.stop_count, metrics.total_stops as f64, false),
                    weight: self.weights.stop_count,
                },
                SubScore {
                    name: COMPONENTS[1],
                    value: scale(bounds.density, metrics.stops_per_sq_mi, false),
                    weight: self.weights.stop_density,
                },
            ],
        )
        .with_metrics(vec![
            Metric::count(METRICS[0].0, metrics.total_stops),
            Metric::number(METRICS[1].0, metrics.stops_per_sq_mi),
        ])
    }
}
