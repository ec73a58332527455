//! Caller identity passed explicitly into service calls.
//!
//! The services never reach for an ambient session; whoever invokes them
//! (the presentation layer, a test, the CLI) resolves the session first and
//! hands the result in as a [`Caller`].

use marigold_core::UserId;

use crate::error::CommerceError;

/// The identity behind a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// No session.
    Anonymous,
    /// A signed-in user.
    User(UserId),
}

impl Caller {
    /// The caller's user id, if signed in.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }

    /// The caller's user id, or `Unauthenticated`.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Unauthenticated` for anonymous callers.
    pub const fn require(&self) -> Result<UserId, CommerceError> {
        match self {
            Self::Anonymous => Err(CommerceError::Unauthenticated),
            Self::User(id) => Ok(*id),
        }
    }
}

impl From<UserId> for Caller {
    fn from(id: UserId) -> Self {
        Self::User(id)
    }
}
