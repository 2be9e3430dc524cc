use storefront::{config::AppConfig, db::{create_pool, run_migrations}};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Only the database is needed here; JWT_SECRET may be absent.
    let database_url = match AppConfig::from_env() {
        Ok(config) => config.database_url,
        Err(_) => std::env::var("DATABASE_URL")?,
    };
    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    println!("Migrations applied");
    Ok(())
}
