//! Review consistency service.
//!
//! Adds and updates reviews, keeps the cached product rating equal to the
//! mean of its review ratings, and guards helpful-vote idempotency.

use sqlx::SqlitePool;

use marigold_core::{ProductId, ReviewId, UserId};

use crate::auth::Caller;
use crate::db::{ProductRepository, RepositoryError, ReviewRepository, UserRepository};
use crate::error::{CommerceError, Result};
use crate::models::Review;
use crate::revalidate::Revalidator;

/// Minimum review body length after trimming.
const MIN_BODY_LENGTH: usize = 10;

/// Partial update for an existing review.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPatch {
    pub rating: Option<f64>,
    pub body: Option<String>,
}

/// Service for review writes and the derived state they maintain.
pub struct ReviewService<'a> {
    reviews: ReviewRepository<'a>,
    products: ProductRepository<'a>,
    users: UserRepository<'a>,
    revalidator: &'a dyn Revalidator,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, revalidator: &'a dyn Revalidator) -> Self {
        Self {
            reviews: ReviewRepository::new(pool),
            products: ProductRepository::new(pool),
            users: UserRepository::new(pool),
            revalidator,
        }
    }

    /// Add a review and refresh the product's rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an out-of-range rating or short body,
    /// `NotFound` when the product or user is missing, and
    /// `DuplicateReview` when this user has already reviewed the product.
    pub async fn add_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: f64,
        body: &str,
    ) -> Result<Review> {
        validate_rating(rating)?;
        validate_body(body)?;

        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(CommerceError::NotFound("user"));
        }
        if self.products.get_by_id(product_id).await?.is_none() {
            return Err(CommerceError::NotFound("product"));
        }

        let review = self
            .reviews
            .insert_recomputing_rating(product_id, user_id, rating, body.trim())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CommerceError::DuplicateReview,
                other => log_repository(other),
            })?;

        tracing::info!(%product_id, %user_id, rating, "review added");
        self.revalidator.revalidate(&format!("/product/{product_id}"));
        self.revalidator.revalidate("/account/reviews");

        Ok(review)
    }

    /// Apply a partial update to the caller's own review.
    ///
    /// A rating change recomputes the product aggregate in the same
    /// transaction, so the cached mean never trails an edited rating.
    ///
    /// # Errors
    ///
    /// Returns `NotOwner` when the review belongs to someone else and
    /// `NotFound` when the review or its product is missing.
    pub async fn update_review(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        patch: ReviewPatch,
    ) -> Result<Review> {
        if let Some(rating) = patch.rating {
            validate_rating(rating)?;
        }
        if let Some(ref body) = patch.body {
            validate_body(body)?;
        }

        let review = self
            .reviews
            .get_by_id(review_id)
            .await
            .map_err(log_repository)?
            .ok_or(CommerceError::NotFound("review"))?;

        if review.user_id != user_id {
            return Err(CommerceError::NotOwner("review"));
        }

        // Defensive: the product should always resolve for a live review.
        if self.products.get_by_id(review.product_id).await?.is_none() {
            return Err(CommerceError::NotFound("product"));
        }

        let updated = self
            .reviews
            .update_recomputing_rating(
                review_id,
                review.product_id,
                patch.rating,
                patch.body.as_deref().map(str::trim),
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CommerceError::NotFound("review"),
                other => log_repository(other),
            })?;

        self.revalidator
            .revalidate(&format!("/product/{}", review.product_id));

        Ok(updated)
    }

    /// Record one helpful vote per user per review.
    ///
    /// The vote row and the counter increment are a single atomic unit; a
    /// duplicate vote rolls both back and the counter never moves.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for anonymous callers, `NotFound` for a
    /// missing review, and `AlreadyVoted` on a repeat vote.
    pub async fn mark_review_helpful(&self, review_id: ReviewId, caller: Caller) -> Result<()> {
        let user_id = caller.require()?;

        if self
            .reviews
            .get_by_id(review_id)
            .await
            .map_err(log_repository)?
            .is_none()
        {
            return Err(CommerceError::NotFound("review"));
        }

        self.reviews
            .insert_helpful_vote(review_id, user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CommerceError::AlreadyVoted,
                RepositoryError::NotFound => CommerceError::NotFound("review"),
                other => log_repository(other),
            })?;

        tracing::debug!(%review_id, %user_id, "helpful vote recorded");

        Ok(())
    }

    /// List all reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns a wrapped repository error if the query fails.
    pub async fn reviews_for_product(&self, product_id: ProductId) -> Result<Vec<Review>> {
        Ok(self.reviews.list_for_product(product_id).await?)
    }
}

fn validate_rating(rating: f64) -> Result<()> {
    if !(0.5..=5.0).contains(&rating) {
        return Err(CommerceError::Validation(
            "rating must be between 0.5 and 5".to_owned(),
        ));
    }
    if (rating * 2.0).fract() != 0.0 {
        return Err(CommerceError::Validation(
            "rating must be a multiple of 0.5".to_owned(),
        ));
    }
    Ok(())
}

fn validate_body(body: &str) -> Result<()> {
    if body.trim().chars().count() < MIN_BODY_LENGTH {
        return Err(CommerceError::Validation(format!(
            "review must be at least {MIN_BODY_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Log a repository failure and pass it through wrapped.
fn log_repository(err: RepositoryError) -> CommerceError {
    tracing::error!(error = %err, "repository error in review service");
    CommerceError::Repository(err)
}
