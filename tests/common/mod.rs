#![allow(dead_code)]

use std::{str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, Statement};
use sqlx::postgres::PgPoolOptions;
use storefront::{
    cart::Cart,
    config::{AppConfig, SessionBackend},
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{categories::ActiveModel as CategoryActive, products::ActiveModel as ProductActive},
    models::Product,
    services::cart_service,
    session::MemorySessionStore,
    state::AppState,
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

/// State whose database is unreachable: any query fails, so a passing
/// test proves the code path never touched persistence.
pub fn offline_state() -> anyhow::Result<AppState> {
    let pool = PgPoolOptions::new().connect_lazy("postgres://offline@127.0.0.1:1/none")?;
    Ok(AppState {
        pool,
        orm: DatabaseConnection::Disconnected,
        sessions: Arc::new(MemorySessionStore::new()),
        jwt_secret: Arc::from(JWT_SECRET),
    })
}

pub fn product(id: i32, price: &str) -> Product {
    Product {
        id,
        uuid: Uuid::new_v4(),
        name: format!("Product {id}"),
        description: None,
        price: Decimal::from_str(price).expect("decimal literal"),
        stock: 5,
        image_url: None,
        category_id: 1,
    }
}

pub fn cart_with(products: &[Product]) -> Cart {
    products
        .iter()
        .fold(Cart::init(), |cart, p| cart_service::add(&cart, p))
}

/// Database used by the end-to-end flows; `None` skips them.
pub fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

/// Migrated, emptied database with the `database` session backend.
pub async fn db_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    let orm = create_orm_conn(database_url).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, sessions, audit_logs, products, categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        session_backend: SessionBackend::Database,
        session_ttl: chrono::Duration::hours(1),
    };
    Ok(AppState::new(&config, pool, orm))
}

pub async fn seed_product(state: &AppState, price: &str) -> anyhow::Result<i32> {
    let category = CategoryActive {
        id: NotSet,
        uuid: Set(Uuid::new_v4()),
        name: Set(format!("Test {}", Uuid::new_v4())),
    }
    .insert(&state.orm)
    .await?;

    let product = ProductActive {
        id: NotSet,
        uuid: Set(Uuid::new_v4()),
        name: Set(format!("Test Widget {}", Uuid::new_v4())),
        description: Set(Some("A product for testing".into())),
        price: Set(Decimal::from_str(price)?),
        stock: Set(10),
        image_url: Set(None),
        category_id: Set(category.id),
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}
