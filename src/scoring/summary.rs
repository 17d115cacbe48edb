//! Run-level statistics over a scored table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::scoring::tier::Tier;
use crate::scoring::types::{Category, ScoredAreaRecord};
use crate::scoring::utility::{mean, stddev};

pub const NO_DATA_LABEL: &str = "No Data";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedArea {
    pub area_id: String,
    pub composite_score: f64,
    pub tier: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub scored: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub total_areas: usize,
    pub scored_areas: usize,
    pub partial_areas: usize,
    pub no_data_areas: usize,
    pub composite_mean: f64,
    pub composite_stddev: f64,
    pub best: Option<RankedArea>,
    pub worst: Option<RankedArea>,
    /// Area count per tier label, including `"No Data"`.
    pub tier_counts: BTreeMap<&'static str, usize>,
    pub categories: BTreeMap<Category, CategoryStats>,
    pub top: Vec<RankedArea>,
    pub bottom: Vec<RankedArea>,
}

impl RunSummary {
    pub fn from_records(records: &[ScoredAreaRecord], top_n: usize, bottom_n: usize) -> Self {
        let composites: Vec<f64> = records.iter().filter_map(|r| r.composite_value()).collect();
        let composite_mean = mean(&composites);

        let mut tier_counts: BTreeMap<&'static str, usize> = Tier::ALL
            .iter()
            .map(|t| (t.label(), 0))
            .chain(std::iter::once((NO_DATA_LABEL, 0)))
            .collect();
        for record in records {
            *tier_counts.entry(record.tier_label()).or_default() += 1;
        }

        let categories = Category::ALL
            .iter()
            .filter_map(|&c| {
                let values: Vec<f64> = records
                    .iter()
                    .filter_map(|r| r.category(c).map(|s| s.value))
                    .collect();
                category_stats(&values).map(|s| (c, s))
            })
            .collect();

        let partial_areas = records
            .iter()
            .filter(|r| r.composite.as_ref().is_some_and(|c| c.partial))
            .count();

        Self {
            generated_at: Utc::now(),
            total_areas: records.len(),
            scored_areas: composites.len(),
            partial_areas,
            no_data_areas: records.len() - composites.len(),
            composite_mean,
            composite_stddev: stddev(&composites, composite_mean),
            best: rank(records, 1, true).into_iter().next(),
            worst: rank(records, 1, false).into_iter().next(),
            tier_counts,
            categories,
            top: rank(records, top_n, true),
            bottom: rank(records, bottom_n, false),
        }
    }
}

fn category_stats(values: &[f64]) -> Option<CategoryStats> {
    if values.is_empty() {
        return None;
    }
    Some(CategoryStats {
        scored: values.len(),
        mean: mean(values),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// The `n` highest (or lowest) composite scores. Ties are broken by area id
/// so the ranking is stable across runs. Areas without a composite are skipped.
pub fn rank(records: &[ScoredAreaRecord], n: usize, descending: bool) -> Vec<RankedArea> {
    let mut scored: Vec<(&ScoredAreaRecord, f64)> = records
        .iter()
        .filter_map(|r| r.composite_value().map(|v| (r, v)))
        .collect();

    scored.sort_by(|(a, av), (b, bv)| {
        let by_score = if descending {
            bv.total_cmp(av)
        } else {
            av.total_cmp(bv)
        };
        by_score.then_with(|| a.area_id.cmp(&b.area_id))
    });

    scored
        .into_iter()
        .take(n)
        .map(|(r, v)| RankedArea {
            area_id: r.area_id.clone(),
            composite_score: v,
            tier: r.tier_label(),
        })
        .collect()
}
