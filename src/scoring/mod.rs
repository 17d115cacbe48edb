//! Livability scoring: per-category scorers, composite aggregation, tier
//! classification and post-run validation.

pub mod aggregate;
pub mod category;
pub mod engine;
pub mod grade;
pub mod normalize;
pub mod shannon;
pub mod summary;
pub mod tier;
pub mod types;
pub mod utility;
pub mod validate;
