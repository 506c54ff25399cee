use ecommerce_web::{
    config::AppConfig,
    db::create_orm_conn,
    seed::{initialize, seed_catalog},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ecommerce_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    initialize(&orm, &config).await?;
    seed_catalog(&orm).await?;

    println!("Seed completed. Admin login: {}", config.admin_email);
    Ok(())
}
