//! Per-category scorers.
//!
//! Each scorer runs in three steps so the engine can put a synchronization
//! point between them: derive raw metrics for one area, reduce every area's
//! metrics into normalization bounds, then score one area against those bounds.
//! A scorer only ever sees its own category's measurements.

pub mod crime;
pub mod diversity;
pub mod healthcare;
pub mod housing;
pub mod lifestyle;
pub mod schools;
pub mod transit;

use crate::error::{Result, ScoringError};
use crate::scoring::normalize::{Bounds, NEUTRAL_SCORE};
use crate::scoring::types::{Area, AreaInputs, Category, CategoryScore};

pub trait CategoryScorer: Sync {
    /// Unprocessed measurements for one area.
    type Raw: Sync;
    /// Derived, pre-normalization metrics for one area.
    type Metrics: Send + Sync;
    /// Read-only normalization state shared by every area in the run.
    type Bounds: Send + Sync;

    const CATEGORY: Category;

    fn raw<'a>(&self, inputs: &'a AreaInputs) -> Option<&'a Self::Raw>;

    /// Computes the derived metrics for one area.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::MissingCategory`] when a required field is
    /// absent, or a numeric error when the measurements cannot be used.
    fn derive(&self, area: &Area, raw: &Self::Raw) -> Result<Self::Metrics>;

    fn bounds(&self, metrics: &[&Self::Metrics]) -> Self::Bounds;

    fn score(&self, metrics: &Self::Metrics, bounds: &Self::Bounds) -> CategoryScore;
}

/// Sub-score names of `category`, in export order.
pub fn components(category: Category) -> &'static [&'static str] {
    match category {
        Category::Crime => crime::COMPONENTS,
        Category::Lifestyle => lifestyle::COMPONENTS,
        Category::Schools => schools::COMPONENTS,
        Category::Transit => transit::COMPONENTS,
        Category::Healthcare => healthcare::COMPONENTS,
        Category::Housing => housing::COMPONENTS,
        Category::Diversity => diversity::COMPONENTS,
    }
}

/// Published metric names and their descriptions, in export order.
pub fn metrics(category: Category) -> &'static [(&'static str, &'static str)] {
    match category {
        Category::Crime => crime::METRICS,
        Category::Lifestyle => lifestyle::METRICS,
        Category::Schools => schools::METRICS,
        Category::Transit => transit::METRICS,
        Category::Healthcare => healthcare::METRICS,
        Category::Housing => housing::METRICS,
        Category::Diversity => diversity::METRICS,
    }
}

pub(crate) fn require<T>(value: Option<T>, area: &Area, category: Category) -> Result<T> {
    value.ok_or_else(|| ScoringError::MissingCategory {
        area_id: area.id.clone(),
        category,
    })
}

/// Rejects negative and non-finite raw values.
pub(crate) fn measurement(area: &Area, field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScoringError::InvalidMeasurement {
            area_id: area.id.clone(),
            field,
            value,
        });
    }
    Ok(value)
}

pub(crate) fn ratio(
    area: &Area,
    metric: &'static str,
    numerator: f64,
    denominator: f64,
) -> Result<f64> {
    if denominator == 0.0 {
        return Err(ScoringError::DivisionByZero {
            area_id: area.id.clone(),
            metric,
        });
    }
    Ok(numerator / denominator)
}

/// Count per square mile of the area's land.
pub(crate) fn density(area: &Area, metric: &'static str, count: f64) -> Result<f64> {
    if !area.area_sq_mi.is_finite() || area.area_sq_mi < 0.0 {
        return Err(ScoringError::InvalidArea {
            area_id: area.id.clone(),
            area_sq_mi: area.area_sq_mi,
        });
    }
    ratio(area, metric, count, area.area_sq_mi)
}

pub(crate) fn scale(bounds: Option<Bounds>, value: f64, invert: bool) -> f64 {
    bounds.map_or(NEUTRAL_SCORE, |b| b.scale(value, invert))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(sq_mi: f64) -> Area {
        Area {
            id: "02118".to_string(),
            area_sq_mi: sq_mi,
        }
    }

    #[test]
    fn test_density_divides_by_land_area() {
        assert_eq!(density(&area(2.0), "stops", 30.0).unwrap(), 15.0);
    }

    #[test]
    fn test_density_with_zero_area_is_an_error() {
        assert!(matches!(
            density(&area(0.0), "stops", 30.0),
            Err(ScoringError::DivisionByZero { metric: "stops", .. })
        ));
        assert!(matches!(
            density(&area(-1.0), "stops", 30.0),
            Err(ScoringError::InvalidArea { .. })
        ));
    }

    #[test]
    fn test_measurement_rejects_negative_and_nan() {
        let a = area(1.0);
        assert!(measurement(&a, "rent", -1.0).is_err());
        assert!(measurement(&a, "rent", f64::NAN).is_err());
        assert_eq!(measurement(&a, "rent", 1800.0).unwrap(), 1800.0);
    }

    #[test]
    fn test_every_category_has_components() {
        for category in Category::ALL {
            assert!(!components(category).is_empty(), "{category}");
        }
    }

    #[test]
    fn test_metric_and_component_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for category in Category::ALL {
            let names = metrics(category)
                .iter()
                .map(|&(name, _)| name)
                .chain(components(category).iter().copied());
            for name in names {
                assert!(seen.insert(name), "duplicate column {name}");
            }
        }
    }
}
