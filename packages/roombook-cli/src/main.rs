use clap::{Parser, Subcommand};
use roombook_sdk::{RoombookClient, SdkError};

mod auth_commands;
mod booking_commands;
mod room_commands;

pub(crate) const ACCESS_TOKEN_ENV: &str = "ROOMBOOK_ACCESS_TOKEN";
pub(crate) const REFRESH_TOKEN_ENV: &str = "ROOMBOOK_REFRESH_TOKEN";
const SERVER_ENV: &str = "ROOMBOOK_SERVER";
const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

#[derive(Parser)]
#[command(name = "roombook-cli")]
#[command(about = "Roombook CLI client")]
struct Cli {
    /// Server address (default: $ROOMBOOK_SERVER or http://127.0.0.1:3000)
    #[arg(short, long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Server health check
    Health,
    /// Room catalog
    Rooms {
        #[command(subcommand)]
        action: room_commands::RoomAction,
    },
    /// My bookings
    Bookings {
        #[command(subcommand)]
        action: booking_commands::BookingAction,
    },
    /// User authentication
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
}

fn resolve_server(server: Option<String>) -> String {
    server
        .or_else(|| std::env::var(SERVER_ENV).ok())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string())
}

/// 使用 ROOMBOOK_ACCESS_TOKEN 构建已认证的客户端
pub(crate) fn authed_client(server: &str) -> RoombookClient {
    let token = std::env::var(ACCESS_TOKEN_ENV).unwrap_or_else(|_| {
        eprintln!("❌ {} environment variable not set", ACCESS_TOKEN_ENV);
        eprintln!("💡 Please login first: roombook-cli auth login <email> <password>");
        std::process::exit(1);
    });
    RoombookClient::new(server).with_token(&token)
}

pub(crate) fn fail(context: &str, error: SdkError) -> ! {
    eprintln!("❌ {}: {}", context, error);
    if error.status() == Some(401) {
        eprintln!("💡 Your session may have expired: roombook-cli auth refresh");
    }
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let server = resolve_server(cli.server);

    match cli.command {
        Commands::Health => match RoombookClient::new(&server).health().await {
            Ok(status) if status.status == "ok" => {
                println!("✅ Server is healthy and responsive");
            }
            Ok(status) => {
                eprintln!("❌ Server reported status: {}", status.status);
                std::process::exit(1);
            }
            Err(e) => fail("Server health check failed", e),
        },
        Commands::Rooms { action } => {
            room_commands::handle_room_command(&server, action).await?;
        }
        Commands::Bookings { action } => {
            booking_commands::handle_booking_command(&server, action).await?;
        }
        Commands::Auth { action } => {
            auth_commands::handle_auth_command(&server, action).await?;
        }
    }

    Ok(())
}
