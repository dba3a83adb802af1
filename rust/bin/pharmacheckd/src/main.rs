//! `pharmacheckd`: the PharmaCheck server binary.
//!
//! Usage:
//!   pharmacheckd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/pharmacheck/<name>.toml`.
//! If a path with `/` or `.toml` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use clap::Parser;
use pharmacheck_core::Module;
use tracing::info;

use config::ServerConfig;

/// PharmaCheck server.
#[derive(Parser, Debug)]
#[command(name = "pharmacheckd", about = "PharmaCheck medicine verification server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let mut server_config = ServerConfig::load(&config_path)?;
    server_config.apply_env(|key| std::env::var(key).ok());

    bootstrap::verify_config(&server_config)?;

    let stores = bootstrap::open_stores(&server_config.store)?;

    let auth_config = auth::service::AuthConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        session_ttl: server_config.jwt.expire_secs,
        allow_admin_signup: server_config.auth.allow_admin_signup,
        secure_cookie: server_config.auth.secure_cookie,
    };
    let auth_module = auth::AuthModule::new(stores.identities, auth_config);
    info!("Auth module initialized");

    let verify_service =
        verify::service::VerifyService::new(stores.records, server_config.verify.clone());
    let verify_module = verify::VerifyModule::new(verify_service);
    info!("Verify module initialized");

    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (verify_module.name(), verify_module.routes()),
    ];

    let cors = routes::cors_layer(&server_config.cors)?;
    let app = routes::build_router(&auth_module, module_routes, cors);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("PharmaCheck server listening on {}", cli.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
