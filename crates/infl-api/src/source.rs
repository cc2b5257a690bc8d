//! [`DataSource`] backed by the live remote API.

use std::time::Duration;

use infl_core::{
    AppConfig, Comment, DataSource, ImageSource, Post, PostActivity, SourceError, UserActivity,
    UserProfile,
};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::{ApiComment, ApiUser, FeedItem};

/// Live account reader.
///
/// A throttled or failing request anywhere in a user's extraction restarts
/// that user from scratch under [`RetryPolicy`].
pub struct LiveSource {
    client: ApiClient,
    retry: RetryPolicy,
    feed_limit: usize,
    comments_per_post: usize,
}

impl LiveSource {
    #[must_use]
    pub fn new(
        client: ApiClient,
        retry: RetryPolicy,
        feed_limit: usize,
        comments_per_post: usize,
    ) -> Self {
        Self {
            client,
            retry,
            feed_limit,
            comments_per_post,
        }
    }

    /// Builds the client and policies from application config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the HTTP client cannot be built or the base
    /// URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let client = ApiClient::with_base_url(
            &config.api_base_url,
            config.api_token.as_deref(),
            config.api_timeout_secs,
            &config.api_user_agent,
            Duration::from_millis(config.api_request_delay_ms),
        )?;
        let retry = RetryPolicy {
            max_retries: config.api_max_retries,
            backoff_base_secs: config.api_retry_backoff_base_secs,
        };
        Ok(Self::new(
            client,
            retry,
            config.feed_limit,
            config.comments_per_post,
        ))
    }

    async fn fetch_user_once(&self, username: &str) -> Result<UserActivity, ApiError> {
        let user = self.client.search_user(username).await?;
        if user.is_private {
            return Err(ApiError::PrivateAccount {
                username: username.to_owned(),
            });
        }

        let items = self.client.user_feed(user.pk, self.feed_limit).await?;
        let mut posts = Vec::with_capacity(items.len());
        for item in items {
            let mut comments = self.client.media_comments(&item.id).await?;
            comments.truncate(self.comments_per_post);
            tracing::debug!(
                username,
                post_id = %item.id,
                comments = comments.len(),
                "fetched post comments"
            );
            posts.push(post_activity(&user.username, item, comments));
        }

        Ok(UserActivity {
            profile: profile_from_user(&user),
            posts,
        })
    }
}

impl DataSource for LiveSource {
    async fn fetch_user(&self, username: &str) -> Result<UserActivity, SourceError> {
        let activity = retry_with_backoff(self.retry, || self.fetch_user_once(username))
            .await
            .map_err(source_error)?;
        tracing::info!(username, posts = activity.posts.len(), "fetched user from live API");
        Ok(activity)
    }

    async fn account_category(&self, username: &str) -> Result<Option<String>, SourceError> {
        let user = retry_with_backoff(self.retry, || self.client.search_user(username))
            .await
            .map_err(source_error)?;
        Ok(user.category)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.client
            .fetch_bytes(url)
            .await
            .map_err(|e| SourceError::Image {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }
}

fn profile_from_user(user: &ApiUser) -> UserProfile {
    UserProfile {
        username: user.username.clone(),
        followers: user.follower_count,
        followings: user.following_count,
        media_count: user.media_count,
        usertags_count: user.usertags_count,
        category: user.category.clone(),
        biography: user.biography.clone(),
        label: None,
    }
}

fn post_activity(owner: &str, item: FeedItem, comments: Vec<ApiComment>) -> PostActivity {
    let comments = comments
        .into_iter()
        .map(|c| Comment {
            post_id: item.id.clone(),
            author: c.user.username,
            text: c.text,
        })
        .collect();
    let image = item
        .smallest_image_url()
        .map(|url| ImageSource::Url(url.to_owned()));
    let tagged_users = item.tagged_usernames();
    PostActivity {
        post: Post {
            id: item.id,
            owner: owner.to_owned(),
            timestamp: item.taken_at,
            like_count: item.like_count,
            comment_count: item.comment_count,
            caption: item.caption.map(|c| c.text),
            tagged_users,
            image,
        },
        comments,
    }
}

pub(crate) fn source_error(err: ApiError) -> SourceError {
    match err {
        ApiError::UserNotFound { username } => SourceError::UserNotFound { username },
        ApiError::PrivateAccount { username } => SourceError::PrivateAccount { username },
        ApiError::RetriesExhausted { attempts, last } => SourceError::RetriesExhausted {
            attempts,
            last_error: last.to_string(),
        },
        ApiError::RateLimited { url } => SourceError::Transient {
            context: url,
            reason: "rate limited".to_owned(),
        },
        ApiError::ServerError { status, url } => SourceError::Transient {
            context: url,
            reason: format!("HTTP {status}"),
        },
        other => SourceError::Api(other.to_string()),
    }
}
