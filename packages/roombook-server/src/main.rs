mod app;
mod bootstrap;
mod db;
mod error;
mod extract;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use crate::state::AppState;
use clap::Parser;
use dotenvy::dotenv;
use sea_orm::Database;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(clap::Parser)]
#[command(name = "roombook-server", about = "Roombook room booking server")]
struct CliArgs {
    /// 监听地址, 覆盖 ROOMBOOK_ADDR
    #[arg(long)]
    addr: Option<SocketAddr>,
    /// 数据库地址, 覆盖 ROOMBOOK_DB_URL
    #[arg(long)]
    db_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut config = bootstrap::config::server_config_from_env()?;
    if let Some(addr) = args.addr {
        config.addr = addr;
    }
    if let Some(db_url) = args.db_url {
        config.db_url = db_url;
    }

    let db_cnn = Database::connect(&config.db_url).await?;
    db::initialize::initial(&db_cnn).await?;

    let state = Arc::new(AppState {
        db: db_cnn,
        auth: config.auth,
    });

    if let Some(seed) = &config.admin {
        services::auth::user::ensure_admin(&state, seed)
            .await
            .map_err(|e| anyhow::anyhow!("failed to seed administrator: {e}"))?;
    }

    match db::token_ops::cleanup_expired_tokens(&state.db).await {
        Ok(removed) => info!(removed, "expired refresh tokens cleaned up"),
        Err(e) => warn!(error = %e, "failed to clean up expired refresh tokens"),
    }

    let app = app::axum_app(state);

    info!(addr = %config.addr, "roombook started");
    println!(
        "roombook started at http://{}",
        config.addr.to_string().replace("0.0.0.0", "127.0.0.1")
    );
    let tcp_listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(tcp_listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_overrides() {
        let args = CliArgs::try_parse_from([
            "roombook-server",
            "--addr",
            "127.0.0.1:8080",
            "--db-url",
            "sqlite::memory:",
        ])
        .unwrap();
        assert_eq!(args.addr, Some("127.0.0.1:8080".parse().unwrap()));
        assert_eq!(args.db_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn test_cli_args_defaults() {
        let args = CliArgs::try_parse_from(["roombook-server"]).unwrap();
        assert!(args.addr.is_none());
        assert!(args.db_url.is_none());
        assert!(CliArgs::try_parse_from(["roombook-server", "--addr", "nope"]).is_err());
    }
}
