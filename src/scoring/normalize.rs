//! Min-max rescaling of raw measurements to the 0–10 score range.
//!
//! Bounds are always taken over every area in the run, so a score is relative
//! to the population of areas being scored rather than an absolute scale.

/// Score assigned to every area when a metric shows no variation.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Upper end of the score range.
pub const MAX_SCORE: f64 = 10.0;

/// Observed range of one metric across all areas in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Computes bounds over the finite values in `values`.
    ///
    /// Returns `None` when no finite value is present.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Bounds { min: v, max: v }),
                Some(b) => Some(Bounds {
                    min: b.min.min(v),
                    max: b.max.max(v),
                }),
            })
    }

    /// Rescales `value` into [0, 10]. With `invert`, lower raw values score higher.
    pub fn scale(&self, value: f64, invert: bool) -> f64 {
        if self.max == self.min {
            return NEUTRAL_SCORE;
        }
        let span = self.max - self.min;

        let score = (value - self.min) / span * MAX_SCORE;
        let score = if invert { MAX_SCORE - score } else { score };

        // clamp absorbs floating-point drift at the extremes
        score.clamp(0.0, MAX_SCORE)
    }
}

/// Normalizes a full run of raw values in one pass.
pub fn min_max_normalize(values: &[f64], invert: bool) -> Vec<f64> {
    match Bounds::from_values(values.iter().copied()) {
        Some(bounds) => values.iter().map(|&v| bounds.scale(v, invert)).collect(),
        None => vec![NEUTRAL_SCORE; values.len()],
    }
}
