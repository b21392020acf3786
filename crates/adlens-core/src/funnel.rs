//! Funnel-stage constants shared across crates.

/// Stage order used when an ad account has no configured stage list.
pub const DEFAULT_FUNNEL_STAGES: [&str; 3] = ["Evaluation", "Consideration", "Conversion"];

/// Bucket assigned to ad sets with no funnel-stage mapping. Rendered after
/// the configured stages, and only when non-empty.
pub const UNCATEGORIZED_STAGE: &str = "Uncategorized";
