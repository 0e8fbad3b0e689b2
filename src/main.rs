// src/main.rs

// --- Modules ---
mod config;
mod db;
mod error;
mod forms;
mod models;
mod services;
mod state;
mod templates;
mod web;

// --- Imports ---
use crate::{config::Config, state::AppState};
use axum::serve;
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Logging ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "campus_portal=debug,tower_http=info,sqlx=warn,tower_sessions=info".into())
                .into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Starting campus portal...");

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // --- Database ---
    let db_pool = match db::create_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Could not initialise the database: {}", e);
            return Err(anyhow::anyhow!("Failed to connect/migrate DB: {}", e));
        }
    };

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    tracing::info!("📁 Uploads stored in {}", config.upload_dir.display());

    // --- Sessions ---
    let session_store = SqliteStore::new(db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| anyhow::anyhow!("Failed to create session store: {}", e))?;
    session_store.migrate().await?;

    let cleanup_store = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = cleanup_store
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Session cleanup task failed: {:?}", e);
        }
    });
    tracing::info!("🧹 Session cleanup task started.");

    let key = config.session_key();
    let bind_addr = config.bind_addr;

    let app_state = AppState {
        db_pool,
        config: Arc::new(config),
    };

    // --- Listener ---
    let listener = match TcpListener::bind(bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Could not listen on {}: {}", bind_addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("📡 Listening on http://{}", bind_addr);

    let app = web::routes::create_app(app_state, session_store, key);

    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
