//! [`DataSource`] backed by the archived relational store.
//!
//! One batched post read per user plus one comment read per post. No pacing
//! and no cap on comments: the store is local and fast.

use infl_core::{
    Comment, DataSource, ImageSource, Post, PostActivity, SourceError, UserActivity, UserProfile,
};
use sqlx::PgPool;

use crate::comments::{list_all_comment_texts, list_comments_for_post, CommentRow};
use crate::posts::{list_posts_for_user, PostRow};
use crate::DbError;

/// Read-only view of the archived store.
#[derive(Debug, Clone)]
pub struct StoreSource {
    pool: PgPool,
}

impl StoreSource {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Every comment text in the store, for building the word model.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Store`] if the query fails.
    pub async fn comment_corpus(&self) -> Result<Vec<String>, SourceError> {
        let texts = list_all_comment_texts(&self.pool).await.map_err(store_error)?;
        tracing::info!(comments = texts.len(), "loaded comment corpus");
        Ok(texts)
    }
}

impl DataSource for StoreSource {
    async fn fetch_user(&self, username: &str) -> Result<UserActivity, SourceError> {
        let rows = list_posts_for_user(&self.pool, username)
            .await
            .map_err(store_error)?;

        let Some(first) = rows.first() else {
            return Err(SourceError::UserNotFound {
                username: username.to_owned(),
            });
        };
        let profile = profile_from_row(first);

        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            let comment_rows = list_comments_for_post(&self.pool, row.id_post)
                .await
                .map_err(store_error)?;
            let comments = comment_rows
                .into_iter()
                .map(|c| comment_from_row(row.id_post, c))
                .collect();
            posts.push(PostActivity {
                post: post_from_row(row),
                comments,
            });
        }

        tracing::debug!(username, posts = posts.len(), "loaded user from store");
        Ok(UserActivity { profile, posts })
    }

    async fn account_category(&self, _username: &str) -> Result<Option<String>, SourceError> {
        // The archive does not record business categories.
        Ok(None)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::Image {
            url: url.to_owned(),
            reason: "the store only holds inline image bytes".to_owned(),
        })
    }
}

fn store_error(err: DbError) -> SourceError {
    SourceError::Store(err.to_string())
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Build the profile snapshot from the counters stored on a post row.
#[must_use]
pub fn profile_from_row(row: &PostRow) -> UserProfile {
    UserProfile {
        username: row.user_name.clone(),
        followers: count(row.n_follower),
        followings: count(row.n_following),
        media_count: count(row.n_media),
        usertags_count: count(row.n_usertags),
        category: None,
        biography: row.biography.clone(),
        label: row.label,
    }
}

#[must_use]
pub fn post_from_row(row: PostRow) -> Post {
    Post {
        id: row.id_post.to_string(),
        owner: row.id_user.to_string(),
        timestamp: row.timestamp,
        like_count: row.n_likes.map(count),
        comment_count: row.n_comments.map(count),
        caption: None,
        tagged_users: Vec::new(),
        image: row
            .image
            .filter(|bytes| !bytes.is_empty())
            .map(ImageSource::Bytes),
    }
}

fn comment_from_row(id_post: i64, row: CommentRow) -> Comment {
    Comment {
        post_id: id_post.to_string(),
        author: row.user_id.to_string(),
        text: row.comment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> PostRow {
        PostRow {
            id_post: 77,
            id_user: 12,
            user_name: "alice".to_owned(),
            timestamp: Some(1_530_000_000),
            n_likes: Some(10),
            n_comments: None,
            n_follower: 100,
            n_following: 50,
            n_usertags: 3,
            n_media: 40,
            image: Some(vec![0xff, 0xd8]),
            label: Some(1),
            biography: Some("coffee & travel".to_owned()),
        }
    }

    #[test]
    fn profile_copies_counters_and_label() {
        let profile = profile_from_row(&row());
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.followers, 100);
        assert_eq!(profile.followings, 50);
        assert_eq!(profile.media_count, 40);
        assert_eq!(profile.usertags_count, 3);
        assert_eq!(profile.label, Some(1));
        assert!(profile.category.is_none());
    }

    #[test]
    fn negative_counters_clamp_to_zero() {
        let mut r = row();
        r.n_follower = -5;
        assert_eq!(profile_from_row(&r).followers, 0);
    }

    #[test]
    fn post_keeps_missing_counts_as_none() {
        let post = post_from_row(row());
        assert_eq!(post.id, "77");
        assert_eq!(post.owner, "12");
        assert_eq!(post.like_count, Some(10));
        assert_eq!(post.comment_count, None);
        assert_eq!(post.image, Some(ImageSource::Bytes(vec![0xff, 0xd8])));
    }

    #[test]
    fn empty_image_blob_is_treated_as_absent() {
        let mut r = row();
        r.image = Some(Vec::new());
        assert!(post_from_row(r).image.is_none());
    }

    #[test]
    fn comment_author_is_the_numeric_user_id() {
        let c = comment_from_row(
            77,
            CommentRow {
                user_id: 12,
                comment: "nice".to_owned(),
            },
        );
        assert_eq!(c.author, "12");
        assert_eq!(c.post_id, "77");
    }
}
