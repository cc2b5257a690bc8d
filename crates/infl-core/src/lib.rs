//! Shared domain records, data-source seam, and configuration for the
//! influencer feature-extraction workspace.

pub mod activity;
pub mod app_config;
pub mod config;
pub mod source;

use thiserror::Error;

pub use activity::{Comment, ImageSource, Post, PostActivity, UserActivity, UserProfile};
pub use app_config::{AppConfig, Environment, ScoringParams};
pub use config::{load_app_config, load_app_config_from_env};
pub use source::{DataSource, SourceError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
