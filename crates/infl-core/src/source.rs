//! The read contract shared by the live API and the archived store.

use std::future::Future;

use thiserror::Error;

use crate::activity::UserActivity;

/// Errors surfaced by a [`DataSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("user not found: {username}")]
    UserNotFound { username: String },

    #[error("account {username} is private")]
    PrivateAccount { username: String },

    /// Throttling or an intermittent server failure. Worth retrying.
    #[error("transient failure during {context}: {reason}")]
    Transient { context: String, reason: String },

    #[error("gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("remote API error: {0}")]
    Api(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("image fetch failed for {url}: {reason}")]
    Image { url: String, reason: String },
}

impl SourceError {
    /// `true` for user-level failures that no retry can fix.
    #[must_use]
    pub fn is_fatal_for_user(&self) -> bool {
        matches!(
            self,
            SourceError::UserNotFound { .. } | SourceError::PrivateAccount { .. }
        )
    }
}

/// Uniform read access to an account's activity.
///
/// Implemented by the live API client and by the relational store. The
/// feature pipeline is generic over this trait.
pub trait DataSource {
    /// Fetch the profile, posts, and per-post comments for `username`.
    fn fetch_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<UserActivity, SourceError>> + Send;

    /// Look up the business category of an account, if it has one.
    fn account_category(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<String>, SourceError>> + Send;

    /// Download the bytes behind an image URL.
    fn fetch_image(&self, url: &str)
        -> impl Future<Output = Result<Vec<u8>, SourceError>> + Send;
}
