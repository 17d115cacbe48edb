use std::collections::BTreeMap;

use crate::config::CategoryWeights;
use crate::scoring::normalize::MAX_SCORE;
use crate::scoring::types::{Category, CategoryScore, CompositeScore};

/// Category weights rescaled over the categories an area actually has.
#[derive(Debug, Clone, PartialEq)]
pub struct Renormalized {
    pub weights: BTreeMap<Category, f64>,
    /// True when at least one category was unavailable.
    pub partial: bool,
}

/// Rescales the weights of `available` categories so they sum to 1.0.
///
/// Missing categories are dropped rather than imputed. Returns `None` when no
/// available category carries any weight.
pub fn renormalize(weights: &CategoryWeights, available: &[Category]) -> Option<Renormalized> {
    let selected: BTreeMap<Category, f64> = available
        .iter()
        .map(|&c| (c, weights.get(c)))
        .filter(|&(_, w)| w > 0.0)
        .collect();

    let total: f64 = selected.values().sum();
    if selected.is_empty() || total <= 0.0 {
        return None;
    }

    let partial = Category::ALL.iter().any(|c| !available.contains(c));

    Some(Renormalized {
        weights: selected.into_iter().map(|(c, w)| (c, w / total)).collect(),
        partial,
    })
}

/// Combines an area's category scores into its composite score.
pub fn aggregate(
    scores: &BTreeMap<Category, CategoryScore>,
    weights: &CategoryWeights,
) -> Option<CompositeScore> {
    let available: Vec<Category> = scores.keys().copied().collect();
    let renormalized = renormalize(weights, &available)?;

    let value = renormalized
        .weights
        .iter()
        .filter_map(|(c, w)| scores.get(c).map(|s| s.value * w))
        .sum::<f64>()
        .clamp(0.0, MAX_SCORE);

    Some(CompositeScore {
        value,
        partial: renormalized.partial,
        weights: renormalized.weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(category: Category, value: f64) -> (Category, CategoryScore) {
        (
            category,
            CategoryScore {
                category,
                value,
                components: vec![],
                metrics: vec![],
            },
        )
    }

    #[test]
    fn test_full_composite_is_weighted_sum() {
        let weights = CategoryWeights::default();
        let scores: BTreeMap<_, _> = [
            score(Category::Crime, 8.0),
            score(Category::Lifestyle, 6.0),
            score(Category::Schools, 7.5),
            score(Category::Transit, 9.0),
            score(Category::Healthcare, 5.0),
            score(Category::Housing, 2.0),
            score(Category::Diversity, 7.0),
        ]
        .into_iter()
        .collect();

        let composite = aggregate(&scores, &weights).unwrap();
        let expected = 8.0 * 0.225
            + 6.0 * 0.17
            + 7.5 * 0.15
            + 9.0 * 0.15
            + 5.0 * 0.13
            + 2.0 * 0.10
            + 7.0 * 0.075;

        assert!((composite.value - expected).abs() < 1e-9);
        assert!(!composite.partial);
        assert!((composite.weights.values().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_one_missing_category_renormalizes() {
        let weights = CategoryWeights::default();
        let available: Vec<_> = Category::ALL
            .into_iter()
            .filter(|&c| c != Category::Lifestyle)
            .collect();

        let r = renormalize(&weights, &available).unwrap();
        assert!(r.partial);
        assert_eq!(r.weights.len(), 6);
        assert!(!r.weights.contains_key(&Category::Lifestyle));
        assert!((r.weights.values().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((r.weights[&Category::Crime] - 0.225 / 0.83).abs() < 1e-12);
    }

    #[test]
    fn test_missing_category_is_not_imputed() {
        let weights = CategoryWeights::default();
        let scores: BTreeMap<_, _> = [score(Category::Crime, 6.0), score(Category::Schools, 6.0)]
            .into_iter()
            .collect();

        let composite = aggregate(&scores, &weights).unwrap();
        assert!(composite.partial);
        assert!((composite.value - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_categories_has_no_composite() {
        let weights = CategoryWeights::default();
        assert!(aggregate(&BTreeMap::new(), &weights).is_none());
        assert!(renormalize(&weights, &[]).is_none());
    }

    #[test]
    fn test_duplicate_available_entries_are_ignored() {
        let weights = CategoryWeights::default();
        let r = renormalize(&weights, &[Category::Crime, Category::Crime]).unwrap();
        assert_eq!(r.weights.len(), 1);
        assert!((r.weights[&Category::Crime] - 1.0).abs() < 1e-12);
    }
}
