//! Diversity: Shannon index of the race/ethnicity mix, scaled to 0–10.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ScoringError};
use crate::scoring::category::CategoryScorer;
use crate::scoring::shannon::{PopulationCounts, diversity_score, shannon_index};
use crate::scoring::types::{Area, AreaInputs, Category, CategoryScore, Metric, SubScore};

pub const COMPONENTS: &[&str] = &["shannon_score"];

pub const METRICS: &[(&str, &str)] = &[
    ("total_pop", "Total population"),
    ("diversity_index", "Shannon diversity index H"),
    ("pct_white", "White share of the population, percent"),
    ("pct_black", "Black share of the population, percent"),
    ("pct_asian", "Asian share of the population, percent"),
    ("pct_other", "Other single-race share of the population, percent"),
    ("pct_two_or_more", "Two-or-more-races share of the population, percent"),
];

/// Census population counts. Absent group counts are treated as zero; an
/// absent total falls back to the sum of the groups.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Demographics {
    pub total_pop: Option<u64>,
    pub white: Option<u64>,
    pub black: Option<u64>,
    pub asian: Option<u64>,
    pub other: Option<u64>,
    pub two_or_more: Option<u64>,
}

impl Demographics {
    pub fn counts(&self) -> PopulationCounts {
        PopulationCounts {
            white: self.white.unwrap_or(0),
            black: self.black.unwrap_or(0),
            asian: self.asian.unwrap_or(0),
            other: self.other.unwrap_or(0),
            two_or_more: self.two_or_more.unwrap_or(0),
        }
    }

    fn has_groups(&self) -> bool {
        [
            self.white,
            self.black,
            self.asian,
            self.other,
            self.two_or_more,
        ]
        .iter()
        .any(Option::is_some)
    }

    /// Population base, or `None` when it must be summed and the sum overflows.
    pub fn total(&self) -> Option<u64> {
        self.total_pop.or_else(|| self.counts().sum())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiversityMetrics {
    pub total: u64,
    pub counts: PopulationCounts,
    /// Shannon index `H`.
    pub index: f64,
}

pub struct DiversityScorer {
    /// Areas below this population are treated as non-residential.
    pub min_population: u64,
}

impl CategoryScorer for DiversityScorer {
    type Raw = Demographics;
    type Metrics = DiversityMetrics;
    type Bounds = ();

    const CATEGORY: Category = Category::Diversity;

    fn raw<'a>(&self, inputs: &'a AreaInputs) -> Option<&'a Demographics> {
        inputs.diversity.as_ref()
    }

    fn derive(&self, area: &Area, raw: &Demographics) -> Result<DiversityMetrics> {
        let total = raw.total().ok_or(ScoringError::InvalidPopulation {
            total: u64::MAX,
            reason: "group counts overflow",
        })?;
        if !raw.has_groups() || total < self.min_population {
            debug!(area_id = %area.id, total, "Non-residential area, no diversity score");
            return Err(ScoringError::MissingCategory {
                area_id: area.id.clone(),
                category: Self::CATEGORY,
            });
        }

        let counts = raw.counts();
        Ok(DiversityMetrics {
            total,
            counts,
            index: shannon_index(&counts, total)?,
        })
    }

    fn bounds(&self, _metrics: &[&DiversityMetrics]) {}

    fn score(&self, metrics: &DiversityMetrics, _bounds: &()) -> CategoryScore {
        let mut published = vec![
            Metric::count(METRICS[0].0, metrics.total),
            Metric::number(METRICS[1].0, metrics.index),
        ];
        published.extend(
            METRICS[2..]
                .iter()
                .zip(metrics.counts.percentages(metrics.total))
                .map(|(&(name, _), pct)| Metric::number(name, pct)),
        );

        CategoryScore::from_components(
            Self::CATEGORY,
            vec![SubScore {
                name: COMPONENTS[0],
                value: diversity_score(metrics.index),
                weight: 1.0,
            }],
        )
        .with_metrics(published)
    }
}
