//! Address default service.
//!
//! Maintains the single-default invariant: a user's default reference is
//! null iff they own zero addresses, otherwise it points at an address they
//! own. Every mutation here restores that invariant before returning.

use sqlx::SqlitePool;

use marigold_core::{AddressId, UserId};

use crate::auth::Caller;
use crate::db::{AddressRepository, RepositoryError};
use crate::error::{CommerceError, Result};
use crate::models::{Address, NewAddress};

/// Service for address writes and default-reference maintenance.
pub struct AddressService<'a> {
    addresses: AddressRepository<'a>,
}

impl<'a> AddressService<'a> {
    /// Create a new address service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            addresses: AddressRepository::new(pool),
        }
    }

    /// Add an address owned by the caller.
    ///
    /// A caller with no default reference gets this address as their
    /// default.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for anonymous callers.
    pub async fn add_address(&self, caller: Caller, new: &NewAddress) -> Result<Address> {
        let user_id = caller.require()?;

        let address = self
            .addresses
            .insert_promoting_default(user_id, new)
            .await
            .map_err(log_repository)?;

        tracing::info!(%user_id, address_id = %address.id, "address added");

        Ok(address)
    }

    /// List a user's addresses, oldest update first.
    ///
    /// # Errors
    ///
    /// Returns a wrapped repository error if the query fails.
    pub async fn list_addresses(&self, user_id: UserId) -> Result<Vec<Address>> {
        Ok(self.addresses.list_for_user(user_id).await?)
    }

    /// Delete a user's address, re-electing their default if needed.
    ///
    /// - Non-default target: deleted, default untouched.
    /// - Sole address: deleted, default reference cleared.
    /// - Default with siblings: the remaining address with the oldest
    ///   `updated_at` becomes the new default.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing address and `NotOwner` when it
    /// belongs to someone else.
    pub async fn delete_address(&self, address_id: AddressId, user_id: UserId) -> Result<()> {
        self.check_ownership(address_id, user_id).await?;

        let new_default = self
            .addresses
            .delete_reelecting_default(address_id, user_id)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent delete.
                RepositoryError::NotFound => CommerceError::NotFound("address"),
                other => log_repository(other),
            })?;

        tracing::info!(%user_id, %address_id, ?new_default, "address deleted");

        Ok(())
    }

    /// Point the user's default reference at one of their own addresses.
    ///
    /// Ownership is checked first; a caller can never adopt a foreign
    /// address as their default.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing address or user, and `NotOwner`
    /// when the address belongs to someone else.
    pub async fn set_default_address(&self, address_id: AddressId, user_id: UserId) -> Result<()> {
        self.check_ownership(address_id, user_id).await?;

        self.addresses
            .set_default(address_id, user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CommerceError::NotFound("user"),
                other => log_repository(other),
            })?;

        Ok(())
    }

    async fn check_ownership(&self, address_id: AddressId, user_id: UserId) -> Result<()> {
        let address = self
            .addresses
            .get_by_id(address_id)
            .await
            .map_err(log_repository)?
            .ok_or(CommerceError::NotFound("address"))?;

        if address.user_id != user_id {
            return Err(CommerceError::NotOwner("address"));
        }

        Ok(())
    }
}

/// Log a repository failure and pass it through wrapped.
fn log_repository(err: RepositoryError) -> CommerceError {
    tracing::error!(error = %err, "repository error in address service");
    CommerceError::Repository(err)
}
