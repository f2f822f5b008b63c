//! Warden Gateway - HTTP API for token issuance and account management
//!
//! This is the main entry point for the gateway service.
//!
//! # Environment
//!
//! | Variable                   | Default           |
//! |----------------------------|-------------------|
//! | `LISTEN_ADDR`              | `0.0.0.0:8080`    |
//! | `DATA_DIR`                 | `/data/warden`    |
//! | `JWT_SECRET`               | required (base64) |
//! | `JWT_ACCESS_TTL_SECONDS`   | `300`             |
//! | `JWT_REFRESH_TTL_SECONDS`  | `86400`           |
//! | `CREATE_DEFAULT_ACCOUNTS`  | `false`           |
//! | `CORS_ORIGINS`             | `*`               |
//! | `MAX_BODY_BYTES`           | `65536`           |
//! | `REQUEST_TIMEOUT_SECONDS`  | `30`              |

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warden_auth::{
    AuthConfig, TokenCodec, DEFAULT_ACCESS_TTL_SECONDS, DEFAULT_REFRESH_TTL_SECONDS,
};
use warden_control::{AccountService, ControlConfig};
use warden_gateway::{create_router, env_var, GatewayConfig, GatewayState};
use warden_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,warden=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Warden Gateway");

    // Load configuration from environment
    let gateway_config = GatewayConfig::from_env()?;
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/warden".into());
    let secret_key = std::env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set")?;
    let access_ttl_seconds = env_var("JWT_ACCESS_TTL_SECONDS", DEFAULT_ACCESS_TTL_SECONDS)?;
    let refresh_ttl_seconds = env_var("JWT_REFRESH_TTL_SECONDS", DEFAULT_REFRESH_TTL_SECONDS)?;
    let create_default_accounts = env_var("CREATE_DEFAULT_ACCOUNTS", false)?;

    tracing::info!(
        listen_addr = %gateway_config.listen_addr,
        data_dir = %data_dir,
        access_ttl_seconds,
        refresh_ttl_seconds,
        create_default_accounts,
        cors_origins = ?gateway_config.cors_origins,
        max_body_bytes = gateway_config.max_body_bytes,
        request_timeout_seconds = gateway_config.request_timeout_seconds,
        "Gateway configuration loaded"
    );

    // Initialize RocksDB store
    tracing::info!(path = %data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&data_dir)?);

    // Initialize token codec
    let auth_config =
        AuthConfig::new(secret_key).with_ttls(access_ttl_seconds, refresh_ttl_seconds);
    let codec = Arc::new(TokenCodec::with_system_clock(&auth_config)?);
    tracing::info!("Token codec initialized");

    // Initialize account service
    let accounts = Arc::new(AccountService::new(
        Arc::clone(&store),
        ControlConfig {
            create_default_accounts,
        },
    ));
    accounts.initialize()?;
    if create_default_accounts {
        tracing::warn!("Default accounts enabled - change their passwords before exposing this service");
    }

    // Build gateway state
    let listen_addr = gateway_config.listen_addr.clone();
    let state = GatewayState::new(store, codec, accounts, gateway_config);

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
