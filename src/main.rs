use anyhow::{anyhow, Context};
use chrono::Duration;
use log::info;
use tracing_subscriber::EnvFilter;

use recipe_api::{
    api,
    config::Config,
    connection::{establish_pool, run_migrations},
    jwt::SessionKeys,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let pool = establish_pool(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    run_migrations(&pool).await?;

    let keys = SessionKeys::new(
        config.jwt_secret.as_bytes(),
        Duration::hours(config.token_lifetime_hours),
    )
    .map_err(|e| anyhow!("Invalid JWT_SECRET: {e}"))?;

    let (address, server) = warp::serve(api(pool, keys)).try_bind_with_graceful_shutdown(
        config.address(),
        async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        },
    )?;

    info!("Listening on http://{address}");
    server.await;

    Ok(())
}
