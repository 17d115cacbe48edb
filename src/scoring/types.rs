//! Data types shared by the scoring pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, ScoringError};
use crate::scoring::category::{
    crime::CrimeCounts, diversity::Demographics, healthcare::HospitalAccess,
    housing::HousingCosts, lifestyle::LifestyleGrades, schools::SchoolGrades,
    transit::TransitStops,
};
use crate::scoring::tier::Tier;

/// The seven livability variables, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crime,
    Lifestyle,
    Schools,
    Transit,
    Healthcare,
    Housing,
    Diversity,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Crime,
        Category::Lifestyle,
        Category::Schools,
        Category::Transit,
        Category::Healthcare,
        Category::Housing,
        Category::Diversity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Crime => "crime",
            Category::Lifestyle => "lifestyle",
            Category::Schools => "schools",
            Category::Transit => "transit",
            Category::Healthcare => "healthcare",
            Category::Housing => "housing",
            Category::Diversity => "diversity",
        }
    }

    /// Column name of the category score in exported tables.
    pub fn score_column(&self) -> String {
        format!("{}_score", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of geographic analysis, typically a ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub area_sq_mi: f64,
}

impl Area {
    /// Builds an area, rejecting non-positive or non-finite land areas.
    pub fn new(id: impl Into<String>, area_sq_mi: f64) -> Result<Self> {
        let id = id.into();
        if !area_sq_mi.is_finite() || area_sq_mi <= 0.0 {
            return Err(ScoringError::InvalidArea {
                area_id: id,
                area_sq_mi,
            });
        }
        Ok(Self { id, area_sq_mi })
    }
}

/// Every raw measurement collected for one area. A `None` category means the
/// upstream dataset had no record for this area at all.
#[derive(Debug, Clone)]
pub struct AreaInputs {
    pub area: Area,
    pub crime: Option<CrimeCounts>,
    pub lifestyle: Option<LifestyleGrades>,
    pub schools: Option<SchoolGrades>,
    pub transit: Option<TransitStops>,
    pub housing: Option<HousingCosts>,
    pub healthcare: Option<HospitalAccess>,
    pub diversity: Option<Demographics>,
}

impl AreaInputs {
    /// An area with no category data attached yet.
    pub fn new(area: Area) -> Self {
        Self {
            area,
            crime: None,
            lifestyle: None,
            schools: None,
            transit: None,
            housing: None,
            healthcare: None,
            diversity: None,
        }
    }
}

/// A normalized 0–10 value for one measured dimension within a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubScore {
    pub name: &'static str,
    pub value: f64,
    /// Intra-category weight this component carried in its category score.
    pub weight: f64,
}

/// Value of a published measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Number(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{n}"),
            MetricValue::Number(v) => write!(f, "{v:.2}"),
            MetricValue::Text(t) => f.write_str(t),
        }
    }
}

/// A raw or derived measurement behind a category score, kept for export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub value: MetricValue,
}

impl Metric {
    pub fn count(name: &'static str, value: u64) -> Self {
        Self {
            name,
            value: MetricValue::Count(value),
        }
    }

    pub fn number(name: &'static str, value: f64) -> Self {
        Self {
            name,
            value: MetricValue::Number(value),
        }
    }

    pub fn text(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: MetricValue::Text(value.into()),
        }
    }
}

/// Weighted combination of a category's sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    pub value: f64,
    pub components: Vec<SubScore>,
    /// Measurements the sub-scores were computed from.
    pub metrics: Vec<Metric>,
}

impl CategoryScore {
    /// Combines `(name, value, weight)` components into a category score.
    pub fn from_components(category: Category, components: Vec<SubScore>) -> Self {
        let value = components
            .iter()
            .map(|c| c.value * c.weight)
            .sum::<f64>()
            .clamp(0.0, 10.0);
        Self {
            category,
            value,
            components,
            metrics: Vec::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn component(&self, name: &str) -> Option<&SubScore> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn metric(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.iter().find(|m| m.name == name).map(|m| &m.value)
    }
}

/// Final weighted score for an area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    pub value: f64,
    /// Set when one or more categories were missing and weights were renormalized.
    pub partial: bool,
    /// Effective weights after renormalization, one per contributing category.
    pub weights: BTreeMap<Category, f64>,
}

/// The scored row for one area.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredAreaRecord {
    pub area_id: String,
    pub area_sq_mi: f64,
    pub categories: BTreeMap<Category, CategoryScore>,
    pub composite: Option<CompositeScore>,
    pub tier: Option<Tier>,
    /// Per-category errors tolerated under [`ErrorPolicy::MarkPartial`](crate::config::ErrorPolicy).
    pub errors: Vec<String>,
}

impl ScoredAreaRecord {
    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.categories.get(&category)
    }

    pub fn composite_value(&self) -> Option<f64> {
        self.composite.as_ref().map(|c| c.value)
    }

    pub fn is_partial(&self) -> bool {
        self.composite.as_ref().is_none_or(|c| c.partial)
    }

    /// Tier label, or `"No Data"` when no category could be scored.
    pub fn tier_label(&self) -> &'static str {
        self.tier.map_or("No Data", |t| t.label())
    }
}
