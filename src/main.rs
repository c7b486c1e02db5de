use std::{sync::Arc, time::Duration};

use anyhow::Result;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use private_theatre_api::{
    api::RazorpayClient,
    app_state::AppState,
    auth::JwtService,
    bootstrap, config, db,
    repositories::Repositories,
    routes,
};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let config = config::load()?;

    tracing::info!("Running migrations...");
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    tracing::info!("Bootstrapping...");
    let pool = db::create_pool(&config.database).await?;
    let state = AppState::new(
        Repositories::postgres(pool),
        Arc::new(RazorpayClient::new(&config.razorpay)?),
        JwtService::new(&config.jwt),
        config.razorpay.secret.clone(),
    );
    let app = routes::app(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    bootstrap::serve(app, &config.server).await?;
    tracing::info!("Server stopped, closing DB pool");
    Ok(())
}
