//! Database operations for the `feedbacks` table.

use akaun_core::{Feedback, FeedbackInput};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `feedbacks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackRow {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: row.id,
            name: row.name,
            message: row.message,
            image: row.image,
            created_at: Some(row.created_at),
        }
    }
}

/// Returns all feedback, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_feedbacks(pool: &PgPool) -> Result<Vec<Feedback>, DbError> {
    let rows = sqlx::query_as::<_, FeedbackRow>(
        "SELECT id, name, message, image, created_at \
         FROM feedbacks \
         ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Feedback::from).collect())
}

/// Returns a single feedback entry, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_feedback(pool: &PgPool, id: i64) -> Result<Option<Feedback>, DbError> {
    let row = sqlx::query_as::<_, FeedbackRow>(
        "SELECT id, name, message, image, created_at FROM feedbacks WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Feedback::from))
}

/// Inserts a feedback entry. A missing name is stored as the column default.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_feedback(pool: &PgPool, input: &FeedbackInput) -> Result<Feedback, DbError> {
    let row = sqlx::query_as::<_, FeedbackRow>(
        "INSERT INTO feedbacks (name, message, image) \
         VALUES (COALESCE($1, 'Anonymous'), $2, $3) \
         RETURNING id, name, message, image, created_at",
    )
    .bind(input.name.as_deref())
    .bind(&input.message)
    .bind(input.image.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Whether any feedback row still points at `image`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn feedback_image_in_use(pool: &PgPool, image: &str) -> Result<bool, DbError> {
    let in_use = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM feedbacks WHERE image = $1)",
    )
    .bind(image)
    .fetch_one(pool)
    .await?;

    Ok(in_use)
}

/// Deletes a feedback entry and returns the removed row, so the caller can
/// clean up its stored image.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`] if
/// the delete fails.
pub async fn delete_feedback(pool: &PgPool, id: i64) -> Result<Feedback, DbError> {
    let row = sqlx::query_as::<_, FeedbackRow>(
        "DELETE FROM feedbacks WHERE id = $1 \
         RETURNING id, name, message, image, created_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Feedback::from).ok_or(DbError::NotFound)
}
