//! Aggregation, normalization and research orchestration for adlens.
//!
//! Everything here is in-memory logic over small collections: ad rows are
//! grouped and folded per ad set, loosely-typed research output is coerced
//! into the canonical competitor shape, and the research orchestrator fans
//! prompts out to the Gemini client with partial-failure tolerance.

pub mod aggregate;
pub mod funnel;
pub mod normalize;
pub mod pillars;
pub mod research;

pub use aggregate::{aggregate_ad_sets, AdRecord, AdSetAggregate, AdThumbnail, Metric};
pub use funnel::{group_by_stage, StageGroup};
pub use normalize::{normalize_competitor, normalize_competitors, RawCompetitor};
pub use pillars::{tally_pillars, PillarShare};
pub use research::{
    GroundedInsight, ParseFailure, ResearchError, ResearchOutcome, ResearchReport,
    ResearchRequest, Researcher,
};
