//! Integration tests for the cart/order lifecycle service.

mod common;

use marigold_commerce::{CartService, Checkout, CommerceError};
use marigold_core::{CartId, CartStatus, Money, ProductId};

use common::{create_product, create_user, test_pool};

#[tokio::test]
async fn test_checkout_is_empty_without_active_cart() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;

    assert_eq!(service.checkout(user.id).await.expect("checkout"), Checkout::Empty);
}

#[tokio::test]
async fn test_checkout_is_empty_with_zero_items() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;

    service
        .get_or_create_active_cart(user.id)
        .await
        .expect("create cart");

    assert_eq!(service.checkout(user.id).await.expect("checkout"), Checkout::Empty);
}

#[tokio::test]
async fn test_one_active_cart_per_user() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;

    let first = service
        .get_or_create_active_cart(user.id)
        .await
        .expect("create");
    let second = service
        .get_or_create_active_cart(user.id)
        .await
        .expect("get");

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_add_item_accumulates_quantity() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;
    let product = create_product(&pool, 2_500, 0).await;

    service.add_item(user.id, product.id, 2).await.expect("add");
    service.add_item(user.id, product.id, 1).await.expect("add again");

    let Checkout::Ready { priced, .. } = service.checkout(user.id).await.expect("checkout") else {
        panic!("expected a priced cart");
    };
    assert_eq!(priced.lines.len(), 1);
    assert_eq!(priced.lines[0].quantity, 3);
}

#[tokio::test]
async fn test_add_item_validation() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;
    let product = create_product(&pool, 2_500, 0).await;

    let err = service
        .add_item(user.id, product.id, 0)
        .await
        .expect_err("zero quantity");
    assert!(matches!(err, CommerceError::Validation(_)));

    let err = service
        .add_item(user.id, ProductId::new(404), 1)
        .await
        .expect_err("missing product");
    assert!(matches!(err, CommerceError::NotFound("product")));
}

#[tokio::test]
async fn test_checkout_prices_the_worked_example() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;

    // {price:100, discount:25, qty:2} and {price:50, discount:0, qty:1}
    let discounted = create_product(&pool, 10_000, 25).await;
    let plain = create_product(&pool, 5_000, 0).await;

    service.add_item(user.id, discounted.id, 2).await.expect("add");
    service.add_item(user.id, plain.id, 1).await.expect("add");

    let Checkout::Ready { priced, .. } = service.checkout(user.id).await.expect("checkout") else {
        panic!("expected a priced cart");
    };

    assert_eq!(priced.totals.subtotal, Money::from_units(200));
    assert_eq!(priced.totals.shipping, Money::ZERO);
    assert_eq!(priced.totals.total, Money::from_units(200));
}

#[tokio::test]
async fn test_checkout_charges_flat_fee_below_threshold() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;
    let product = create_product(&pool, 1_000, 0).await;

    service.add_item(user.id, product.id, 2).await.expect("add");

    let Checkout::Ready { priced, .. } = service.checkout(user.id).await.expect("checkout") else {
        panic!("expected a priced cart");
    };

    assert_eq!(priced.totals.subtotal, Money::from_units(20));
    assert_eq!(priced.totals.shipping, Money::from_units(5));
    assert_eq!(priced.totals.total, Money::from_units(25));
}

#[tokio::test]
async fn test_pricing_reads_live_product_data() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;
    let product = create_product(&pool, 10_000, 0).await;

    service.add_item(user.id, product.id, 1).await.expect("add");

    // A discount introduced after add-to-cart shows up at checkout; no
    // price is snapshotted on the line.
    sqlx::query("UPDATE product SET discount_percent = 50 WHERE id = ?")
        .bind(product.id)
        .execute(&pool)
        .await
        .expect("apply discount");

    let Checkout::Ready { priced, .. } = service.checkout(user.id).await.expect("checkout") else {
        panic!("expected a priced cart");
    };
    assert_eq!(priced.totals.subtotal, Money::from_units(50));
}

#[tokio::test]
async fn test_set_quantity_and_remove_item() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;
    let product = create_product(&pool, 2_500, 0).await;

    service.add_item(user.id, product.id, 2).await.expect("add");
    service
        .set_item_quantity(user.id, product.id, 5)
        .await
        .expect("set quantity");

    let Checkout::Ready { priced, .. } = service.checkout(user.id).await.expect("checkout") else {
        panic!("expected a priced cart");
    };
    assert_eq!(priced.lines[0].quantity, 5);

    service
        .remove_item(user.id, product.id)
        .await
        .expect("remove");
    assert_eq!(service.checkout(user.id).await.expect("checkout"), Checkout::Empty);

    let err = service
        .remove_item(user.id, product.id)
        .await
        .expect_err("already removed");
    assert!(matches!(err, CommerceError::NotFound("cart item")));
}

#[tokio::test]
async fn test_order_cart_transitions_once() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;
    let product = create_product(&pool, 10_000, 0).await;

    service.add_item(user.id, product.id, 1).await.expect("add");
    let cart = service
        .active_cart(user.id)
        .await
        .expect("lookup")
        .expect("active cart");

    service.order_cart(cart.id).await.expect("order");

    let status: CartStatus = sqlx::query_scalar("SELECT status FROM cart WHERE id = ?")
        .bind(cart.id)
        .fetch_one(&pool)
        .await
        .expect("status");
    assert_eq!(status, CartStatus::Ordered);

    // Double submission fails loudly instead of transitioning twice.
    let err = service
        .order_cart(cart.id)
        .await
        .expect_err("second order must fail");
    assert!(matches!(err, CommerceError::CartNotActive));

    let err = service
        .order_cart(CartId::new(404))
        .await
        .expect_err("missing cart");
    assert!(matches!(err, CommerceError::NotFound("cart")));
}

#[tokio::test]
async fn test_ordered_cart_frees_the_active_slot() {
    let pool = test_pool().await;
    let service = CartService::new(&pool);
    let user = create_user(&pool, "alice@example.com").await;
    let product = create_product(&pool, 10_000, 0).await;

    service.add_item(user.id, product.id, 1).await.expect("add");
    let ordered = service
        .active_cart(user.id)
        .await
        .expect("lookup")
        .expect("active cart");
    service.order_cart(ordered.id).await.expect("order");

    // With the old cart ordered, a fresh active cart can be created.
    let next = service
        .get_or_create_active_cart(user.id)
        .await
        .expect("new cart");
    assert_ne!(next.id, ordered.id);
    assert_eq!(next.status, CartStatus::Active);
}
