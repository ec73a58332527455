//! Database seeding command for local development.
//!
//! Creates a handful of demo users, products, and addresses through the same
//! repositories and services the application uses, so seeded data satisfies
//! every invariant the services maintain.

use thiserror::Error;

use marigold_commerce::config::{CommerceConfig, ConfigError};
use marigold_commerce::db::{self, ProductRepository, RepositoryError, UserRepository};
use marigold_commerce::models::NewAddress;
use marigold_commerce::{AddressService, Caller, CommerceError};
use marigold_core::{AddressKind, UserRole};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("service error: {0}")]
    Service(#[from] CommerceError),
}

const DEMO_PRODUCTS: &[(&str, i64, i64, i64)] = &[
    ("Walnut Serving Board", 6_500, 0, 40),
    ("Stoneware Mug Set", 4_200, 15, 120),
    ("Linen Tea Towels", 2_400, 0, 200),
    ("Cast Iron Trivet", 1_800, 25, 75),
];

/// Seed the configured database with demo data.
///
/// # Errors
///
/// Returns `SeedError` if configuration, connection, or any insert fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let config = CommerceConfig::from_env()?;
    let pool = db::create_pool(&config.database_url, config.max_connections).await?;

    let users = UserRepository::new(&pool);
    let products = ProductRepository::new(&pool);
    let addresses = AddressService::new(&pool);

    tracing::info!("Seeding demo users...");
    let demo = match users.create("Demo Customer", "demo@marigold.dev", UserRole::Customer).await {
        Ok(user) => user,
        Err(RepositoryError::Conflict(_)) => {
            tracing::info!("Demo data already present, nothing to do");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    users
        .create("Demo Admin", "admin@marigold.dev", UserRole::Admin)
        .await?;

    tracing::info!("Seeding demo products...");
    for (name, price_cents, discount_percent, stock) in DEMO_PRODUCTS {
        products
            .create(name, *price_cents, *discount_percent, *stock)
            .await?;
    }

    tracing::info!("Seeding a demo address...");
    addresses
        .add_address(
            Caller::User(demo.id),
            &NewAddress {
                line1: "100 Market St".to_owned(),
                line2: None,
                city: "Portland".to_owned(),
                region: "OR".to_owned(),
                postal_code: "97201".to_owned(),
                country: "US".to_owned(),
                kind: AddressKind::Home,
            },
        )
        .await?;

    tracing::info!("Seeding complete!");
    Ok(())
}
