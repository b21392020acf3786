//! Shared domain types and application configuration for adlens.

pub mod app_config;
pub mod competitor;
pub mod config;
pub mod funnel;
pub mod lookup;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use competitor::{
    CompetitorProfile, SeoProfile, SocialMetrics, WebsiteQuality, NOT_AVAILABLE,
    UNKNOWN_COMPETITOR,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use funnel::{DEFAULT_FUNNEL_STAGES, UNCATEGORIZED_STAGE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
