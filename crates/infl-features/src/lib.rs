//! Feature extraction for influencer classification.
//!
//! Turns one account's raw activity into a fixed-order numeric vector:
//! engagement and recency, comment quality against a corpus word model,
//! visual style from post images, and brand mentions. Also persists the
//! word model and a per-user feature cache.

pub mod brand;
pub mod cache;
pub mod color;
pub mod comment;
pub mod engagement;
pub mod error;
pub mod kmeans;
pub mod pipeline;
pub mod stats;
pub mod tokenize;
pub mod types;
pub mod visual;
pub mod word_model;

mod persist;

pub use cache::{ExportRow, FeatureCache};
pub use comment::{aggregate_comment_scores, CommentScorer};
pub use error::{CacheError, FeatureError, ModelError};
pub use pipeline::{extract_user_features, MIN_ENGAGEMENT_SAMPLES};
pub use types::{FeatureVector, UserFeatures, FEATURE_NAMES};
pub use word_model::{WordModel, WordModelStore};
