//! Unified error handling for the commerce services.
//!
//! Every service call returns `Result<T, CommerceError>`. All variants are
//! recoverable and carry a human-readable message; repository internals are
//! logged and surfaced only as a generic failure through
//! [`CommerceError::user_message`].

use thiserror::Error;

use crate::db::RepositoryError;

/// Domain error surfaced by the commerce services.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Missing or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The user already reviewed this product.
    #[error("you have already reviewed this product")]
    DuplicateReview,

    /// The user already marked this review helpful.
    #[error("you have already marked this review helpful")]
    AlreadyVoted,

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller does not own the entity being mutated.
    #[error("{0} belongs to another user")]
    NotOwner(&'static str),

    /// The operation requires a signed-in caller.
    #[error("you must be signed in")]
    Unauthenticated,

    /// The cart exists but is not in the `active` state.
    #[error("cart is not active")]
    CartNotActive,

    /// Underlying store failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CommerceError {
    /// Client-safe message for this error.
    ///
    /// Store-level failures are deliberately collapsed to a generic message;
    /// the detailed cause has already been logged.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Repository(_) => "Something went wrong. Please try again.".to_owned(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for `CommerceError`.
pub type Result<T> = std::result::Result<T, CommerceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_are_not_exposed() {
        let err = CommerceError::Repository(RepositoryError::NotFound);
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_domain_errors_keep_their_message() {
        assert_eq!(
            CommerceError::DuplicateReview.user_message(),
            "you have already reviewed this product"
        );
        assert_eq!(
            CommerceError::NotFound("product").user_message(),
            "product not found"
        );
    }
}
