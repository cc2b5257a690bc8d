//! HTTP client for the remote social API.
//!
//! Wraps `reqwest` with status-to-error mapping and typed response
//! deserialization. Every request is followed by a fixed pause so that a
//! sequential caller never exceeds the API's request rate.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::ApiError;
use crate::types::{ApiComment, ApiUser, CommentsResponse, FeedItem, FeedResponse, UserInfoResponse};

/// Hard stop on feed pagination, independent of the requested limit.
const MAX_FEED_PAGES: usize = 100;

/// Client for the remote social API.
///
/// Use [`ApiClient::with_base_url`] to point at a mock server in tests.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    request_delay: Duration,
}

impl ApiClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// `request_delay` is slept after every request, successful or not.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        base_url: &str,
        token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        request_delay: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Ensure exactly one trailing slash so path segments append under
        // the base rather than replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            token: token.map(str::to_owned),
            request_delay,
        })
    }

    /// Looks up an account by username.
    ///
    /// # Errors
    ///
    /// - [`ApiError::UserNotFound`] on HTTP 404.
    /// - [`ApiError::RateLimited`] / [`ApiError::ServerError`] on 429 / 5xx.
    /// - [`ApiError::Deserialize`] if the body does not match.
    pub async fn search_user(&self, username: &str) -> Result<ApiUser, ApiError> {
        let url = self.endpoint(&["users", username, "usernameinfo"]);
        let body = match self.request_json(url).await {
            Err(ApiError::UnexpectedStatus { status: 404, .. }) => {
                return Err(ApiError::UserNotFound {
                    username: username.to_owned(),
                })
            }
            other => other?,
        };
        let response: UserInfoResponse =
            serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
                context: format!("usernameinfo({username})"),
                source: e,
            })?;
        Ok(response.user)
    }

    /// Fetches one page of a user's feed.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::search_user`], minus the 404 mapping.
    pub async fn user_feed_page(
        &self,
        user_pk: i64,
        max_id: Option<&str>,
    ) -> Result<FeedResponse, ApiError> {
        let pk = user_pk.to_string();
        let mut url = self.endpoint(&["feed", "user", &pk]);
        if let Some(cursor) = max_id {
            url.query_pairs_mut().append_pair("max_id", cursor);
        }
        let body = self.request_json(url).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
            context: format!("feed(user={user_pk})"),
            source: e,
        })
    }

    /// Fetches the `limit` most recent posts of a user, following
    /// `next_max_id` cursors across pages.
    ///
    /// # Errors
    ///
    /// Propagates the first page error.
    pub async fn user_feed(&self, user_pk: i64, limit: usize) -> Result<Vec<FeedItem>, ApiError> {
        let mut items: Vec<FeedItem> = Vec::new();
        let mut cursor: Option<String> = None;

        for page in 0..MAX_FEED_PAGES {
            let response = self.user_feed_page(user_pk, cursor.as_deref()).await?;
            let fetched = response.items.len();
            items.extend(response.items);
            tracing::debug!(user_pk, page, fetched, total = items.len(), "fetched feed page");

            if items.len() >= limit || !response.more_available || fetched == 0 {
                break;
            }
            match response.next_max_id {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        items.truncate(limit);
        Ok(items)
    }

    /// Fetches the first page of comments on a post.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::user_feed_page`].
    pub async fn media_comments(&self, media_id: &str) -> Result<Vec<ApiComment>, ApiError> {
        let url = self.endpoint(&["media", media_id, "comments"]);
        let body = self.request_json(url).await?;
        let response: CommentsResponse =
            serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
                context: format!("comments(media={media_id})"),
                source: e,
            })?;
        Ok(response.comments)
    }

    /// Downloads raw bytes, e.g. an image rendition from the CDN.
    ///
    /// # Errors
    ///
    /// Returns a status-mapped [`ApiError`] on non-2xx responses.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(url).send().await;
        self.pause().await;
        let response = check_status(response?, url)?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Builds `<base>/<segments...>/` with each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    /// Sends a GET request, pauses, maps the status, and parses the body as JSON.
    async fn request_json(&self, url: Url) -> Result<serde_json::Value, ApiError> {
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await;
        self.pause().await;

        let response = check_status(response?, url.as_str())?;
        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;
        check_api_error(&value)?;
        Ok(value)
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }
}

fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::RateLimited { url: url.to_owned() });
    }
    if status.is_server_error() {
        return Err(ApiError::ServerError {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    Err(ApiError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_owned(),
    })
}

/// Checks the top-level `"status"` field and returns an error if it
/// indicates failure.
fn check_api_error(body: &serde_json::Value) -> Result<(), ApiError> {
    if body.get("status").and_then(serde_json::Value::as_str) == Some("fail") {
        let msg = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(ApiError::Api(msg));
    }
    Ok(())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
