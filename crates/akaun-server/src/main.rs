mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use akaun_core::{AppConfig, Environment};
use akaun_storage::StorageClient;

use crate::{
    api::{build_app, default_rate_limit_state, AppState, CheckoutSettings},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = akaun_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = akaun_db::PoolConfig::from_app_config(&config);
    let pool = akaun_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = akaun_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations up to date");

    let checkout = CheckoutSettings::from_app_config(&config)?;
    let (storage, product_storage) = build_storage(&config)?;
    let auth = AuthState::from_env(matches!(config.env, Environment::Development))?;
    let state = AppState {
        pool,
        storage,
        product_storage,
        checkout: Arc::new(checkout),
    };
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "akaun-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

type StorageClients = (Option<Arc<StorageClient>>, Option<Arc<StorageClient>>);

/// Feedback and product bucket clients, both `None` without `AKAUN_STORAGE_URL`.
fn build_storage(config: &AppConfig) -> anyhow::Result<StorageClients> {
    let Some(storage) = &config.storage else {
        tracing::warn!("AKAUN_STORAGE_URL not set; image upload disabled");
        return Ok((None, None));
    };

    let client = |bucket: &str| {
        StorageClient::new(
            &storage.url,
            &storage.service_key,
            bucket,
            storage.timeout_secs,
        )
        .map(Arc::new)
    };
    let feedbacks = client(&storage.bucket)?;
    let products = client(&storage.product_bucket)?;
    tracing::info!(
        bucket = %storage.bucket,
        product_bucket = %storage.product_bucket,
        "image storage enabled"
    );
    Ok((Some(feedbacks), Some(products)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
