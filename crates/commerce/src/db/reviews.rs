//! Review repository for database operations.
//!
//! Owns the `review` and `helpful` tables plus the cached `product.rating`
//! aggregate. Every write that can move the aggregate recomputes it inside
//! the same transaction by re-scanning all reviews for the product - a full
//! scan, not a running average, so it stays correct under concurrent inserts.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use marigold_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

const REVIEW_COLUMNS: &str =
    "id, product_id, user_id, rating, body, helpful_count, created_at, updated_at";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a review by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// List all reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review \
             WHERE product_id = ? \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Insert a review and refresh the product's rating aggregate.
    ///
    /// Both statements run in one transaction: the aggregate on the product
    /// row always reflects a set of reviews that includes the new one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the
    /// product. Returns `RepositoryError::Database` for other failures.
    pub async fn insert_recomputing_rating(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: f64,
        body: &str,
    ) -> Result<Review, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO review (product_id, user_id, rating, body, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(rating)
        .bind(body)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "user already reviewed this product".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        recompute_product_rating(&mut tx, product_id, now).await?;

        tx.commit().await?;

        Ok(review)
    }

    /// Apply a partial update to a review, refreshing `updated_at`.
    ///
    /// When `rating` is present the product aggregate is recomputed in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn update_recomputing_rating(
        &self,
        id: ReviewId,
        product_id: ProductId,
        rating: Option<f64>,
        body: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(&format!(
            "UPDATE review \
             SET rating = COALESCE(?, rating), \
                 body = COALESCE(?, body), \
                 updated_at = ? \
             WHERE id = ? \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(rating)
        .bind(body)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if rating.is_some() {
            recompute_product_rating(&mut tx, product_id, now).await?;
        }

        tx.commit().await?;

        Ok(review)
    }

    /// Record a helpful vote and bump the review's counter atomically.
    ///
    /// The vote insert and the counter increment commit or roll back
    /// together; a duplicate vote rolls the whole unit back and the counter
    /// never moves.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already voted on this
    /// review. Returns `RepositoryError::NotFound` if the review vanished
    /// between lookup and increment.
    pub async fn insert_helpful_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO helpful (review_id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(review_id)
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "user already voted on this review".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        let result = sqlx::query(
            "UPDATE review SET helpful_count = helpful_count + 1, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(review_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

/// Recompute the cached rating aggregate for a product.
///
/// Re-reads all reviews for the product, averages their ratings, rounds to
/// one decimal, and writes the result with a fresh `updated_at`.
async fn recompute_product_rating(
    tx: &mut SqliteConnection,
    product_id: ProductId,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    let average: Option<f64> =
        sqlx::query_scalar("SELECT AVG(rating) FROM review WHERE product_id = ?")
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;

    let rounded = average.map_or(0.0, |avg| (avg * 10.0).round() / 10.0);

    sqlx::query("UPDATE product SET rating = ?, updated_at = ? WHERE id = ?")
        .bind(rounded)
        .bind(now)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    Ok(())
}
