//! Address repository for database operations.
//!
//! Owns the `address` table and the weak `user.default_address_id`
//! reference. Every write path here restores the invariant: the reference is
//! null iff the user owns zero addresses, otherwise it points at an address
//! the user owns.

use chrono::Utc;
use sqlx::SqlitePool;

use marigold_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, NewAddress};

const ADDRESS_COLUMNS: &str =
    "id, user_id, line1, line2, city, region, postal_code, country, kind, created_at, updated_at";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an address by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM address WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// List all addresses owned by a user, oldest update first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM address \
             WHERE user_id = ? \
             ORDER BY updated_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(addresses)
    }

    /// Insert an address; if the owner has no default yet, make it theirs.
    ///
    /// The insert and the default promotion run in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn insert_promoting_default(
        &self,
        user_id: UserId,
        new: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let address = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO address \
             (user_id, line1, line2, city, region, postal_code, country, kind, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&new.line1)
        .bind(&new.line2)
        .bind(&new.city)
        .bind(&new.region)
        .bind(&new.postal_code)
        .bind(&new.country)
        .bind(new.kind)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE user SET default_address_id = ?, updated_at = ? \
             WHERE id = ? AND default_address_id IS NULL",
        )
        .bind(address.id)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(address)
    }

    /// Delete an address, re-electing the owner's default if needed.
    ///
    /// Runs the whole read-delete-update sequence in one transaction so a
    /// concurrent add or delete for the same user cannot leave a stale
    /// default reference. Election rule: among the remaining addresses, the
    /// one with the oldest `updated_at` (ties broken by lowest id).
    ///
    /// Returns the owner's default reference after the call.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no address with this id is
    /// owned by this user. Returns `RepositoryError::Database` for other
    /// failures.
    pub async fn delete_reelecting_default(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<AddressId>, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let current_default: Option<Option<AddressId>> =
            sqlx::query_scalar("SELECT default_address_id FROM user WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let current_default = current_default.ok_or(RepositoryError::NotFound)?;

        let deleted = sqlx::query("DELETE FROM address WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        if current_default != Some(id) {
            tx.commit().await?;
            return Ok(current_default);
        }

        // The default was deleted: elect the remaining address with the
        // oldest updated_at, or clear the reference when none remain.
        let new_default: Option<AddressId> = sqlx::query_scalar(
            "SELECT id FROM address WHERE user_id = ? ORDER BY updated_at ASC, id ASC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        sqlx::query("UPDATE user SET default_address_id = ?, updated_at = ? WHERE id = ?")
            .bind(new_default)
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(new_default)
    }

    /// Point a user's default reference at an address.
    ///
    /// Ownership is checked by the address service before this runs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn set_default(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE user SET default_address_id = ?, updated_at = ? WHERE id = ?")
                .bind(id)
                .bind(Utc::now())
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
