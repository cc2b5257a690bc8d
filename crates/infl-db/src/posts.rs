//! Database operations for the archived `posts` table.

use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// One archived post, joined with its author's account row.
///
/// Account counters (`n_follower`, `n_following`, ...) are snapshotted on
/// every post row at crawl time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id_post: i64,
    pub id_user: i64,
    pub user_name: String,
    pub timestamp: Option<i64>,
    pub n_likes: Option<i64>,
    pub n_comments: Option<i64>,
    pub n_follower: i64,
    pub n_following: i64,
    pub n_usertags: i64,
    pub n_media: i64,
    pub image: Option<Vec<u8>>,
    pub label: Option<i32>,
    pub biography: Option<String>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Return every archived post of `username`, in crawl order.
///
/// An unknown user yields an empty `Vec`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts_for_user(pool: &PgPool, username: &str) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(
        "SELECT p.id_post, p.id_user, u.user_name, p.timestamp, p.n_likes, p.n_comments, \
                p.n_follower, p.n_following, p.n_usertags, p.n_media, p.image, \
                u.label, u.biography \
         FROM posts p \
         JOIN users u ON u.id_user = p.id_user \
         WHERE u.user_name = $1 \
         ORDER BY p.id_post",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
