//! Integration tests for the address default service.

mod common;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use marigold_commerce::{AddressService, Caller, CommerceError};
use marigold_core::{AddressId, UserId};

use common::{create_user, reload_user, sample_address, test_pool};

/// Assert the default-reference invariant for a user: null iff they own no
/// addresses, otherwise pointing at an address they own.
async fn assert_default_invariant(pool: &SqlitePool, user_id: UserId) {
    let service = AddressService::new(pool);
    let addresses = service.list_addresses(user_id).await.expect("list");
    let default: Option<AddressId> =
        sqlx::query_scalar("SELECT default_address_id FROM user WHERE id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .expect("user row");

    match default {
        None => assert!(addresses.is_empty(), "default is null but addresses exist"),
        Some(id) => assert!(
            addresses.iter().any(|a| a.id == id),
            "default points at an address the user does not own"
        ),
    }
}

#[tokio::test]
async fn test_first_address_becomes_default() {
    let pool = test_pool().await;
    let service = AddressService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;

    let first = service
        .add_address(Caller::User(user.id), &sample_address("1 Oak St"))
        .await
        .expect("add");
    assert_eq!(reload_user(&pool, &user).await.default_address_id, Some(first.id));

    // A second address does not steal the default.
    service
        .add_address(Caller::User(user.id), &sample_address("2 Elm St"))
        .await
        .expect("add");
    assert_eq!(reload_user(&pool, &user).await.default_address_id, Some(first.id));

    assert_default_invariant(&pool, user.id).await;
}

#[tokio::test]
async fn test_add_address_requires_signed_in_caller() {
    let pool = test_pool().await;
    let service = AddressService::new(&pool);

    let err = service
        .add_address(Caller::Anonymous, &sample_address("1 Oak St"))
        .await
        .expect_err("anonymous add must fail");
    assert!(matches!(err, CommerceError::Unauthenticated));
}

#[tokio::test]
async fn test_delete_non_default_keeps_default() {
    let pool = test_pool().await;
    let service = AddressService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;

    let first = service
        .add_address(Caller::User(user.id), &sample_address("1 Oak St"))
        .await
        .expect("add");
    let second = service
        .add_address(Caller::User(user.id), &sample_address("2 Elm St"))
        .await
        .expect("add");

    service
        .delete_address(second.id, user.id)
        .await
        .expect("delete non-default");

    assert_eq!(reload_user(&pool, &user).await.default_address_id, Some(first.id));
    assert_default_invariant(&pool, user.id).await;
}

#[tokio::test]
async fn test_delete_sole_address_clears_default() {
    let pool = test_pool().await;
    let service = AddressService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;

    let only = service
        .add_address(Caller::User(user.id), &sample_address("1 Oak St"))
        .await
        .expect("add");

    service.delete_address(only.id, user.id).await.expect("delete");

    assert_eq!(reload_user(&pool, &user).await.default_address_id, None);
    assert_default_invariant(&pool, user.id).await;
}

#[tokio::test]
async fn test_delete_default_elects_oldest_updated_sibling() {
    let pool = test_pool().await;
    let service = AddressService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;

    let default = service
        .add_address(Caller::User(user.id), &sample_address("1 Oak St"))
        .await
        .expect("add");
    let second = service
        .add_address(Caller::User(user.id), &sample_address("2 Elm St"))
        .await
        .expect("add");
    let third = service
        .add_address(Caller::User(user.id), &sample_address("3 Pine St"))
        .await
        .expect("add");

    // Make the third address the stalest so election is driven by
    // updated_at, not insertion order.
    sqlx::query("UPDATE address SET updated_at = ? WHERE id = ?")
        .bind(Utc::now() - Duration::days(7))
        .bind(third.id)
        .execute(&pool)
        .await
        .expect("age third address");

    service
        .delete_address(default.id, user.id)
        .await
        .expect("delete default");

    assert_eq!(reload_user(&pool, &user).await.default_address_id, Some(third.id));
    assert_default_invariant(&pool, user.id).await;

    // Deleting the new default falls back to the remaining address.
    service
        .delete_address(third.id, user.id)
        .await
        .expect("delete again");
    assert_eq!(reload_user(&pool, &user).await.default_address_id, Some(second.id));
    assert_default_invariant(&pool, user.id).await;
}

#[tokio::test]
async fn test_election_tie_on_updated_at_prefers_lowest_id() {
    let pool = test_pool().await;
    let service = AddressService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;

    let default = service
        .add_address(Caller::User(user.id), &sample_address("1 Oak St"))
        .await
        .expect("add");
    let second = service
        .add_address(Caller::User(user.id), &sample_address("2 Elm St"))
        .await
        .expect("add");
    let third = service
        .add_address(Caller::User(user.id), &sample_address("3 Pine St"))
        .await
        .expect("add");

    // Give both siblings the same last-touched instant so updated_at alone
    // cannot decide the election.
    sqlx::query("UPDATE address SET updated_at = ? WHERE id IN (?, ?)")
        .bind(Utc::now() - Duration::days(1))
        .bind(second.id)
        .bind(third.id)
        .execute(&pool)
        .await
        .expect("equalize timestamps");

    service
        .delete_address(default.id, user.id)
        .await
        .expect("delete default");

    assert!(second.id < third.id);
    assert_eq!(reload_user(&pool, &user).await.default_address_id, Some(second.id));
    assert_default_invariant(&pool, user.id).await;
}

#[tokio::test]
async fn test_delete_address_ownership_and_existence() {
    let pool = test_pool().await;
    let service = AddressService::new(&pool);
    let alice = create_user(&pool, "alice@example.com").await;
    let bob = create_user(&pool, "bob@example.com").await;

    let address = service
        .add_address(Caller::User(alice.id), &sample_address("1 Oak St"))
        .await
        .expect("add");

    let err = service
        .delete_address(address.id, bob.id)
        .await
        .expect_err("foreign delete must fail");
    assert!(matches!(err, CommerceError::NotOwner("address")));

    let err = service
        .delete_address(AddressId::new(404), alice.id)
        .await
        .expect_err("missing address");
    assert!(matches!(err, CommerceError::NotFound("address")));

    // Alice's address survived both attempts.
    assert_eq!(service.list_addresses(alice.id).await.expect("list").len(), 1);
}

#[tokio::test]
async fn test_set_default_address_checks_ownership() {
    let pool = test_pool().await;
    let service = AddressService::new(&pool);
    let alice = create_user(&pool, "alice@example.com").await;
    let bob = create_user(&pool, "bob@example.com").await;

    let alices = service
        .add_address(Caller::User(alice.id), &sample_address("1 Oak St"))
        .await
        .expect("add");
    let bobs = service
        .add_address(Caller::User(bob.id), &sample_address("9 Birch St"))
        .await
        .expect("add");

    let err = service
        .set_default_address(bobs.id, alice.id)
        .await
        .expect_err("foreign default must fail");
    assert!(matches!(err, CommerceError::NotOwner("address")));
    assert_eq!(reload_user(&pool, &alice).await.default_address_id, Some(alices.id));

    // Switching between own addresses works.
    let second = service
        .add_address(Caller::User(alice.id), &sample_address("2 Elm St"))
        .await
        .expect("add");
    service
        .set_default_address(second.id, alice.id)
        .await
        .expect("set default");
    assert_eq!(reload_user(&pool, &alice).await.default_address_id, Some(second.id));
    assert_default_invariant(&pool, alice.id).await;
}
