use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use storefront::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
    },
};
use uuid::Uuid;

const CATALOG: &[(&str, &[(&str, &str, &str, i32)])] = &[
    (
        "Apparel",
        &[
            ("Ferris Hoodie", "Warm hoodie for Rustaceans", "54.99", 50),
            ("Borrow Checker Tee", "Compiles on the first try", "19.99", 120),
        ],
    ),
    (
        "Kitchen",
        &[
            ("Ferris Mug", "Coffee tastes better with Ferris", "12.00", 100),
            ("Unsafe Block Coaster", "Handle with care", "4.50", 300),
        ],
    ),
    (
        "Books",
        &[("Async Patterns", "Futures, pinning and executors", "25.00", 75)],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let orm = create_orm_conn(&database_url).await?;

    for (category, products) in CATALOG {
        let category_id = ensure_category(&orm, category).await?;
        for (name, description, price, stock) in products.iter() {
            seed_product(&orm, category_id, name, description, price, *stock).await?;
        }
    }

    println!("Seed completed");
    Ok(())
}

async fn ensure_category(orm: &DatabaseConnection, name: &str) -> anyhow::Result<i32> {
    if let Some(existing) = Categories::find()
        .filter(CategoryCol::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let category = CategoryActive {
        id: NotSet,
        uuid: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
    };
    let inserted = Categories::insert(category).exec(orm).await?;
    println!("Seeded category {name}");
    Ok(inserted.last_insert_id)
}

async fn seed_product(
    orm: &DatabaseConnection,
    category_id: i32,
    name: &str,
    description: &str,
    price: &str,
    stock: i32,
) -> anyhow::Result<()> {
    let product = ProductActive {
        id: NotSet,
        uuid: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(Some(description.to_string())),
        price: Set(Decimal::from_str(price)?),
        stock: Set(stock),
        image_url: Set(Some(format!(
            "/static/img/{}.png",
            name.to_lowercase().replace(' ', "-")
        ))),
        category_id: Set(category_id),
    };
    Products::insert(product)
        .on_conflict(OnConflict::column(ProductCol::Name).do_nothing().to_owned())
        .do_nothing()
        .exec(orm)
        .await?;
    Ok(())
}
