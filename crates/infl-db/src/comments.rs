//! Database operations for the archived `comments` table.

use sqlx::PgPool;

use crate::DbError;

/// A row from the `comments` table, reduced to what scoring needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub user_id: i64,
    pub comment: String,
}

/// Return all comments left on one post.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_comments_for_post(pool: &PgPool, id_post: i64) -> Result<Vec<CommentRow>, DbError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        "SELECT user_id, comment \
         FROM comments \
         WHERE id_post = $1 \
         ORDER BY id_comment",
    )
    .bind(id_post)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Return the text of every archived comment. Used to build the word model.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_all_comment_texts(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>("SELECT comment FROM comments WHERE comment IS NOT NULL")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
