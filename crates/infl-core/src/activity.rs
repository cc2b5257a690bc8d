//! Raw activity records for one account, as read from either data source.

use serde::{Deserialize, Serialize};

/// Profile snapshot taken once per extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub followers: u64,
    pub followings: u64,
    pub media_count: u64,
    /// Number of posts by other accounts that tag this user.
    pub usertags_count: u64,
    /// Business category, only known for business accounts.
    pub category: Option<String>,
    pub biography: Option<String>,
    /// Ground-truth label from the archived store (`1` = influencer).
    pub label: Option<i32>,
}

/// Where a post's image bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Raw encoded image bytes, as archived in the store.
    Bytes(Vec<u8>),
    /// A URL the live source can fetch.
    Url(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    /// Author id, compared against [`Comment::author`] to drop self-replies.
    pub owner: String,
    /// Unix seconds. `None` when the source returned no usable timestamp.
    pub timestamp: Option<i64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub caption: Option<String>,
    pub tagged_users: Vec<String>,
    pub image: Option<ImageSource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub post_id: String,
    pub author: String,
    pub text: String,
}

/// A post together with the comments fetched for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PostActivity {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// Everything one extraction run needs about one account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserActivity {
    pub profile: UserProfile,
    pub posts: Vec<PostActivity>,
}

impl UserActivity {
    /// Iterate over the posts without their comments.
    pub fn iter_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().map(|p| &p.post)
    }
}
