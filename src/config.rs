//! Scoring configuration: weight tables, grade scale and pipeline knobs.
//!
//! Stored as a JSON object on disk. Every key is optional and falls back to
//! the default weighting:
//! ```json
//! {
//!   "category_weights": { "crime": 0.225, "lifestyle": 0.17, "schools": 0.15,
//!                         "transit": 0.15, "healthcare": 0.13, "housing": 0.10,
//!                         "diversity": 0.075 },
//!   "school_averaging": "enrollment_weighted",
//!   "error_policy": "mark_partial"
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scoring::grade::GradeScale;
use crate::scoring::types::Category;

/// Tolerance used when checking that a weight table sums to 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Cross-category weights for the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub crime: f64,
    pub lifestyle: f64,
    pub schools: f64,
    pub transit: f64,
    pub healthcare: f64,
    pub housing: f64,
    pub diversity: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            crime: 0.225,
            lifestyle: 0.170,
            schools: 0.150,
            transit: 0.150,
            healthcare: 0.130,
            housing: 0.100,
            diversity: 0.075,
        }
    }
}

impl CategoryWeights {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Crime => self.crime,
            Category::Lifestyle => self.lifestyle,
            Category::Schools => self.schools,
            Category::Transit => self.transit,
            Category::Healthcare => self.healthcare,
            Category::Housing => self.housing,
            Category::Diversity => self.diversity,
        }
    }

    pub fn as_pairs(&self) -> Vec<(&'static str, f64)> {
        Category::ALL
            .iter()
            .map(|&c| (c.as_str(), self.get(c)))
            .collect()
    }
}

/// Crime: total 0.40, violent 0.35, property 0.25.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrimeWeights {
    pub total: f64,
    pub violent: f64,
    pub property: f64,
}

impl Default for CrimeWeights {
    fn default() -> Self {
        Self {
            total: 0.40,
            violent: 0.35,
            property: 0.25,
        }
    }
}

impl CrimeWeights {
    pub fn as_pairs(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("total", self.total),
            ("violent", self.violent),
            ("property", self.property),
        ]
    }
}

/// Transit: stop count 0.60, stop density 0.40.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitWeights {
    pub stop_count: f64,
    pub stop_density: f64,
}

impl Default for TransitWeights {
    fn default() -> Self {
        Self {
            stop_count: 0.60,
            stop_density: 0.40,
        }
    }
}

impl TransitWeights {
    pub fn as_pairs(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("stop_count", self.stop_count),
            ("stop_density", self.stop_density),
        ]
    }
}

/// Housing: home value 0.40, rent 0.35, price-to-income 0.25.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HousingWeights {
    pub home_value: f64,
    pub rent: f64,
    pub price_to_income: f64,
}

impl Default for HousingWeights {
    fn default() -> Self {
        Self {
            home_value: 0.40,
            rent: 0.35,
            price_to_income: 0.25,
        }
    }
}

impl HousingWeights {
    pub fn as_pairs(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("home_value", self.home_value),
            ("rent", self.rent),
            ("price_to_income", self.price_to_income),
        ]
    }
}

/// Healthcare: nearest tier-1 0.40, nearest any 0.25, density 0.20, tier-1 access 0.15.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthcareWeights {
    pub nearest_tier1: f64,
    pub nearest_any: f64,
    pub density: f64,
    pub tier1_access: f64,
}

impl Default for HealthcareWeights {
    fn default() -> Self {
        Self {
            nearest_tier1: 0.40,
            nearest_any: 0.25,
            density: 0.20,
            tier1_access: 0.15,
        }
    }
}

impl HealthcareWeights {
    pub fn as_pairs(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("nearest_tier1", self.nearest_tier1),
            ("nearest_any", self.nearest_any),
            ("density", self.density),
            ("tier1_access", self.tier1_access),
        ]
    }
}

/// How multiple school grades for one area are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolAveraging {
    #[default]
    Simple,
    /// Weights each school by enrollment; schools without enrollment are skipped
    /// unless none report it, in which case the simple mean is used.
    EnrollmentWeighted,
}

/// What the engine does when scoring one category of one area fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Fail the whole run with the first error.
    #[default]
    Abort,
    /// Drop the failing category for that area and mark its composite partial.
    MarkPartial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub category_weights: CategoryWeights,
    pub crime: CrimeWeights,
    pub transit: TransitWeights,
    pub housing: HousingWeights,
    pub healthcare: HealthcareWeights,
    pub grade_scale: GradeScale,
    pub school_averaging: SchoolAveraging,
    /// Areas with fewer residents get no diversity score.
    pub min_population: u64,
    pub error_policy: ErrorPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            category_weights: CategoryWeights::default(),
            crime: CrimeWeights::default(),
            transit: TransitWeights::default(),
            housing: HousingWeights::default(),
            healthcare: HealthcareWeights::default(),
            grade_scale: GradeScale::default(),
            school_averaging: SchoolAveraging::default(),
            min_population: 100,
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl ScoringConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scoring config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing scoring config {}", path.display()))?;
        Ok(config)
    }

    /// Every weight table that must sum to 1.0, keyed by table name.
    pub fn weight_tables(&self) -> Vec<(&'static str, Vec<(&'static str, f64)>)> {
        vec![
            ("category_weights", self.category_weights.as_pairs()),
            ("crime", self.crime.as_pairs()),
            ("transit", self.transit.as_pairs()),
            ("housing", self.housing.as_pairs()),
            ("healthcare", self.healthcare.as_pairs()),
        ]
    }
}
