#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use jwt_auth::auth::{StaticCredentials, TokenEngine};
use jwt_auth::config::ServerConfig;
use jwt_auth::crypto::Envelope;
use jwt_auth::routes::{AppState, router};
use jwt_auth::settings;
use jwt_auth::store::{FileConfigStore, drop_configs, provision_defaults};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwt_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: config_path={}, listen_port={}, issuer={}",
        config.config_path.display(),
        config.listen_port,
        config.issuer
    );
    if config.encrypt_key.is_none() {
        tracing::warn!("JWT_AUTH_ENCRYPT_KEY is not set; stored keys cannot be sealed or opened");
    }

    let envelope = Envelope::new(config.encrypt_key.as_deref());

    let store = match FileConfigStore::open(config.config_path.clone()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open config store: {e}");
            std::process::exit(1);
        }
    };

    if config.drop_configs {
        match drop_configs(store.as_ref()) {
            Ok(_) => std::process::exit(0),
            Err(e) => {
                tracing::error!("Failed to drop config entries: {e}");
                std::process::exit(1);
            }
        }
    }

    // First run: write the defaults without touching existing values.
    match provision_defaults(store.as_ref()) {
        Ok(0) => {}
        Ok(count) => tracing::info!("Provisioned {count} default settings"),
        Err(e) => {
            tracing::error!("Failed to provision default settings: {e}");
            std::process::exit(1);
        }
    }

    if let Some(bootstrap) = &config.bootstrap {
        let applied = bootstrap
            .to_update()
            .map_err(|e| e.to_string())
            .and_then(|update| {
                settings::apply(&update, &envelope, store.as_ref()).map_err(|e| e.to_string())
            });
        if let Err(e) = applied {
            tracing::error!("Failed to apply start-up settings: {e}");
            std::process::exit(1);
        }
    }

    let credentials = match &config.users_path {
        Some(path) => match StaticCredentials::load(path) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::error!("Failed to load users: {e}");
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("JWT_AUTH_USERS_PATH is not set; every login will be rejected");
            StaticCredentials::default()
        }
    };

    let engine = TokenEngine::new(store, envelope, Arc::new(credentials), config.issuer.clone());
    let state = AppState {
        engine: Arc::new(engine),
        api_prefix: config.api_prefix.clone(),
    };
    let app = router(state, &config.endpoint, config.api_version);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
