//! Serve command - Run the tutor HTTP server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use tutor_api::{AppState, RouterOptions, build_router_with_options};
use tutor_auth::{
    KavenegarGateway, LogGateway, MemoryCache, OtpCache, OtpService, RedisCache, SmsGateway,
};
use tutor_config::{CacheBackend, Config, SmsProvider};
use tutor_store::Store;

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file (defaults to configs/tutor.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config_path = args
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(default)".to_string());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        config = %config_path,
        "Tutor starting"
    );

    let config = load_config(args.config)?;

    if let Err(e) = run_server(config).await {
        error!(error = %e, "server error");
        return Err(e);
    }

    info!("Tutor shutdown complete");
    Ok(())
}

/// Load the configuration file, or fall back to defaults
///
/// An explicit path must exist. Without one the default locations are
/// tried in order.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Config::from_file(&path).context("failed to load configuration");
    }

    let default_paths = [PathBuf::from("configs/tutor.toml"), PathBuf::from("tutor.toml")];
    for path in &default_paths {
        if path.exists() {
            info!(config = %path.display(), "using config file");
            return Config::from_file(path).context("failed to load configuration");
        }
    }

    info!("no config file found, using defaults");
    Ok(Config::default())
}

async fn run_server(config: Config) -> Result<()> {
    let db_path = config.database.db_path();
    let store = Store::open(&db_path, config.database.max_connections)
        .await
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    let otp = OtpService::new(&config.otp, init_cache(&config).await?, init_sms(&config)?);
    let jwt_secret = init_jwt_secret(&config);

    let state = AppState::new(
        store,
        otp,
        &jwt_secret,
        config.auth.jwt_expires_in,
        config.pagination,
    );
    let app = build_router_with_options(
        state,
        RouterOptions {
            allowed_origins: config.server.allowed_origins.clone(),
        },
    );

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(addr = %addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .context("server error")?;

    info!("shutdown signal received, server stopped");
    Ok(())
}

/// Build the OTP cache for the configured backend
async fn init_cache(config: &Config) -> Result<Arc<dyn OtpCache>> {
    match config.cache.backend {
        CacheBackend::Redis => {
            let cache = RedisCache::connect(
                &config.cache.url,
                config.cache.connect_timeout,
                config.cache.command_timeout,
            )
            .await
            .context("failed to connect to redis")?;
            Ok(Arc::new(cache))
        }
        CacheBackend::Memory => {
            warn!("using in-memory OTP cache, codes are lost on restart");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

/// Build the SMS gateway for the configured provider
fn init_sms(config: &Config) -> Result<Arc<dyn SmsGateway>> {
    match config.sms.provider {
        SmsProvider::Kavenegar => {
            let gateway =
                KavenegarGateway::new(&config.sms).context("failed to build SMS gateway")?;
            Ok(Arc::new(gateway))
        }
        SmsProvider::Log => {
            info!("SMS provider is log, codes are written to the log only");
            Ok(Arc::new(LogGateway))
        }
    }
}

/// Configured JWT secret, or a random one for this process
fn init_jwt_secret(config: &Config) -> Vec<u8> {
    config
        .auth
        .jwt_secret
        .as_ref()
        .map(|s| s.as_bytes().to_vec())
        .unwrap_or_else(|| {
            warn!("no JWT secret configured, generating random secret");
            let secret: [u8; 32] = rand::random();
            secret.to_vec()
        })
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
