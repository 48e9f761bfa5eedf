use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::{
    api,
    auth::AuthManager,
    catalog::Catalog,
    config::{Config, StorageBackend},
    object_store as obj,
    object_store::StorageGateway,
    storage::Database,
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "storefront starting");

    // Load configuration
    let config = Config::load()?;

    // Initialize database
    let db = Database::open(&config.data_dir)?;
    info!("Database opened at: {}", config.data_dir);

    // Initialize object store backend
    let store: Arc<dyn obj::ObjectStore> = match config.storage.backend {
        StorageBackend::Local => {
            let store =
                obj::LocalStore::new(&config.storage.local_storage_path, &config.storage.bucket)?;
            info!(
                "Using local storage backend at: {}/{}",
                config.storage.local_storage_path, config.storage.bucket
            );
            Arc::new(store)
        }
        StorageBackend::Remote => {
            let api_url = config
                .storage
                .remote_api_url
                .as_deref()
                .expect("STORAGE_API_URL validated in config");
            let service_key = config
                .storage
                .remote_service_key
                .as_deref()
                .expect("STORAGE_SERVICE_KEY validated in config");
            let store = obj::RemoteStore::new(api_url, &config.storage.bucket, service_key)?;
            info!(
                "Using remote storage backend, bucket: {}",
                config.storage.bucket
            );
            Arc::new(store)
        }
    };

    let gateway = StorageGateway::new(
        store,
        config.storage.bucket.clone(),
        config.storage.public_base_url.clone(),
        config.storage.url_signing_key.clone(),
    );

    let auth = AuthManager::new(db.clone(), config.session_ttl_secs);

    // Prime the catalog snapshot before accepting traffic
    let catalog = Catalog::new();
    catalog.load_categories(&db);

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        auth,
        catalog,
        gateway,
    });

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on: {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
