//! Remote API response types.
//!
//! Only the fields the feature pipeline reads are modelled. Everything
//! optional on the wire is `Option` or `#[serde(default)]`, so sparse
//! payloads never fail deserialization.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// users/{username}/usernameinfo
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UserInfoResponse {
    pub user: ApiUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub pk: i64,
    pub username: String,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub media_count: u64,
    #[serde(default)]
    pub usertags_count: u64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

// ---------------------------------------------------------------------------
// feed/user/{pk}
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub items: Vec<FeedItem>,
    #[serde(default)]
    pub next_max_id: Option<String>,
    #[serde(default)]
    pub more_available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(default)]
    pub taken_at: Option<i64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub caption: Option<Caption>,
    #[serde(default)]
    pub usertags: Option<Usertags>,
    #[serde(default)]
    pub image_versions2: Option<ImageVersions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Caption {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usertags {
    #[serde(rename = "in", default)]
    pub tags: Vec<Usertag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usertag {
    pub user: TaggedUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaggedUser {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageVersions {
    #[serde(default)]
    pub candidates: Vec<ImageCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageCandidate {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl FeedItem {
    /// URL of the smallest image rendition, which is all the colour
    /// analysis needs.
    #[must_use]
    pub fn smallest_image_url(&self) -> Option<&str> {
        self.image_versions2
            .as_ref()?
            .candidates
            .iter()
            .min_by_key(|c| u64::from(c.width) * u64::from(c.height))
            .map(|c| c.url.as_str())
    }

    #[must_use]
    pub fn tagged_usernames(&self) -> Vec<String> {
        self.usertags
            .as_ref()
            .map(|u| u.tags.iter().map(|t| t.user.username.clone()).collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// media/{id}/comments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CommentsResponse {
    #[serde(default)]
    pub comments: Vec<ApiComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiComment {
    pub user: CommentAuthor,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentAuthor {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_item_tolerates_missing_counts() {
        let item: FeedItem = serde_json::from_value(serde_json::json!({
            "id": "1_2",
            "taken_at": 1_530_000_000
        }))
        .unwrap();
        assert!(item.like_count.is_none());
        assert!(item.comment_count.is_none());
        assert!(item.smallest_image_url().is_none());
        assert!(item.tagged_usernames().is_empty());
    }

    #[test]
    fn smallest_image_url_picks_lowest_area() {
        let item: FeedItem = serde_json::from_value(serde_json::json!({
            "id": "1_2",
            "image_versions2": {
                "candidates": [
                    { "url": "https://cdn/big.jpg", "width": 1080, "height": 1080 },
                    { "url": "https://cdn/small.jpg", "width": 150, "height": 150 },
                    { "url": "https://cdn/mid.jpg", "width": 480, "height": 480 }
                ]
            }
        }))
        .unwrap();
        assert_eq!(item.smallest_image_url(), Some("https://cdn/small.jpg"));
    }

    #[test]
    fn usertags_read_from_in_field() {
        let item: FeedItem = serde_json::from_value(serde_json::json!({
            "id": "1_2",
            "usertags": { "in": [ { "user": { "username": "acme" } } ] }
        }))
        .unwrap();
        assert_eq!(item.tagged_usernames(), vec!["acme".to_string()]);
    }
}
