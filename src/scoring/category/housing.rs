//! Housing affordability: lower cost scores higher.

use serde::Deserialize;

use crate::config::HousingWeights;
use crate::error::Result;
use crate::scoring::category::{CategoryScorer, measurement, ratio, require, scale};
use crate::scoring::normalize::Bounds;
use crate::scoring::types::{Area, AreaInputs, Category, CategoryScore, Metric, SubScore};

pub const COMPONENTS: &[&str] = &["home_value_score", "rent_score", "price_to_income_score"];

pub const METRICS: &[(&str, &str)] = &[
    ("median_home_value", "Median owner-occupied home value, dollars"),
    ("median_rent", "Median gross monthly rent, dollars"),
    ("median_household_income", "Median annual household income, dollars"),
    ("price_to_income_ratio", "Median home value over median household income"),
    ("rent_to_income_ratio", "Annual median rent over median household income"),
];

/// Census housing statistics, in dollars. Rent is monthly, income annual.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HousingCosts {
    pub median_home_value: Option<f64>,
    pub median_rent: Option<f64>,
    pub median_household_income: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HousingMetrics {
    pub home_value: f64,
    pub rent: f64,
    pub income: f64,
    /// Median home value over median household income.
    pub price_to_income: f64,
    /// Twelve months of median rent over median household income.
    pub rent_to_income: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct HousingBounds {
    home_value: Option<Bounds>,
    rent: Option<Bounds>,
    price_to_income: Option<Bounds>,
}

pub struct HousingScorer {
    pub weights: HousingWeights,
}

impl CategoryScorer for HousingScorer {
    type Raw = HousingCosts;
    type Metrics = HousingMetrics;
    type Bounds = HousingBounds;

    const CATEGORY: Category = Category::Housing;

    fn raw<'a>(&self, inputs: &'a AreaInputs) -> Option<&'a HousingCosts> {
        inputs.housing.as_ref()
    }

    fn derive(&self, area: &Area, raw: &HousingCosts) -> Result<HousingMetrics> {
        let home_value = require(raw.median_home_value, area, Self::CATEGORY)?;
        let rent = require(raw.median_rent, area, Self::CATEGORY)?;
        let income = require(raw.median_household_income, area, Self::CATEGORY)?;

        let home_value = measurement(area, "median_home_value", home_value)?;
        let rent = measurement(area, "median_rent", rent)?;
        let income = measurement(area, "median_household_income", income)?;

        Ok(HousingMetrics {
            home_value,
            rent,
            income,
            price_to_income: ratio(area, "price_to_income_ratio", home_value, income)?,
            rent_to_income: ratio(area, "rent_to_income_ratio", rent * 12.0, income)?,
        })
    }

    fn bounds(&self, metrics: &[&HousingMetrics]) -> HousingBounds {
        HousingBounds {
            home_value: Bounds::from_values(metrics.iter().map(|m| m.home_value)),
            rent: Bounds::from_values(metrics.iter().map(|m| m.rent)),
            price_to_income: Bounds::from_values(metrics.iter().map(|m| m.price_to_income)),
        }
    }

    fn score(&self, metrics: &HousingMetrics, bounds: &HousingBounds) -> CategoryScore {
        CategoryScore::from_components(
            Self::CATEGORY,
            vec![
                SubScore {
                    name: COMPONENTS[0],
                    value: scale(bounds.home_value, metrics.home_value, true),
                    weight: self.weights.home_value,
                },
                SubScore {
                    name: COMPONENTS[1],
                    value: scale(bounds.rent, metrics.rent, true),
                    weight: self.weights.rent,
                },
                SubScore {
                    name: COMPONENTS[2],
                    value: scale(bounds.price_to_income, metrics.price_to_income, true),
                    weight: self.weights.price_to_income,
                },
            ],
        )
        .with_metrics(vec![
            Metric::number(METRICS[0].0, metrics.home_value),
            Metric::number(METRICS[1].0, metrics.rent),
            Metric::number(METRICS[2].0, metrics.income),
            Metric::number(METRICS[3].0, metrics.price_to_income),
            Metric::number(METRICS[4].0, metrics.rent_to_income),
        ])
    }
}
