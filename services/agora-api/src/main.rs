//! Agora API
//!
//! Social backend service: accounts, sessions, follows, likes, posts and
//! the paginated feed over REST.

use std::net::SocketAddr;
use std::sync::Arc;

use agora_api::{router, AppState, Config};
use agora_auth_core::{LogMailer, QueuedNotifier};
use agora_db::{create_pool_with_options, run_migrations, PoolOptions};
use agora_social_core::LocalBlobStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Agora API");

    let config = Config::from_env()?;

    // Database
    let pool = create_pool_with_options(
        &config.database_url,
        PoolOptions {
            max_connections: config.db_max_connections,
            ..PoolOptions::default()
        },
    )
    .await?;
    run_migrations(&pool).await?;

    // Collaborators
    let (notifier, _mail_worker) = QueuedNotifier::spawn(LogMailer, config.public_base_url.clone());
    let blobs = LocalBlobStore::new(config.media_root.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(pool, config, Arc::new(notifier), Arc::new(blobs));

    spawn_session_sweeper(state.clone());

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Periodically delete expired refresh sessions and unverified accounts
fn spawn_session_sweeper(state: AppState) {
    let period = state.config.sweep_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match state.auth.sweep_expired().await {
                Ok(report) => tracing::debug!(
                    refresh_sessions = report.refresh_sessions,
                    unverified_users = report.unverified_users,
                    "session sweep finished"
                ),
                Err(e) => tracing::warn!(error = %e, "session sweep failed"),
            }
        }
    });
}
