//! Database operations for the archived `users` table.

use sqlx::PgPool;

use crate::DbError;

/// List archived usernames, ordered by name.
///
/// With `labeled_only`, accounts without a ground-truth label are skipped.
/// A `limit` of `None` returns every matching user.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_usernames(
    pool: &PgPool,
    limit: Option<i64>,
    labeled_only: bool,
) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT user_name \
         FROM users \
         WHERE ($1 = false OR label IS NOT NULL) \
         ORDER BY user_name \
         LIMIT $2",
    )
    .bind(labeled_only)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
