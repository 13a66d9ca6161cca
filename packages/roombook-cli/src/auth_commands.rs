use anyhow::Result;
use clap::Subcommand;
use roombook_sdk::{LoginRequest, RegisterRequest, RoombookClient, TokenPair};

use crate::{ACCESS_TOKEN_ENV, REFRESH_TOKEN_ENV, authed_client, fail};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Register a new user
    Register {
        /// Email
        email: String,
        /// Display name
        name: String,
        /// Password
        password: String,
        /// Accept the terms of service
        #[arg(long)]
        accept_terms: bool,
    },
    /// Login with email and password
    Login {
        /// Email
        email: String,
        /// Password
        password: String,
    },
    /// Exchange a refresh token for a new access token
    Refresh {
        /// Refresh token (default: $ROOMBOOK_REFRESH_TOKEN)
        #[arg(long)]
        refresh: Option<String>,
    },
    /// Logout and revoke the refresh token
    Logout {
        /// Refresh token (default: $ROOMBOOK_REFRESH_TOKEN)
        #[arg(long)]
        refresh: Option<String>,
    },
    /// Get current user profile
    Profile,
}

fn print_token_pair(tokens: &TokenPair) {
    println!("⏰ Access expires at: {}", tokens.access_expires_at);
    println!("⏰ Refresh expires at: {}", tokens.refresh_expires_at);
    println!();
    println!("💡 Save these tokens for future API calls:");
    println!("   export {}=\"{}\"", ACCESS_TOKEN_ENV, tokens.access);
    println!("   export {}=\"{}\"", REFRESH_TOKEN_ENV, tokens.refresh);
}

fn resolve_refresh(refresh: Option<String>) -> String {
    refresh
        .or_else(|| std::env::var(REFRESH_TOKEN_ENV).ok())
        .unwrap_or_else(|| {
            eprintln!("❌ No refresh token given and {} not set", REFRESH_TOKEN_ENV);
            std::process::exit(1);
        })
}

pub async fn handle_auth_command(server: &str, action: AuthAction) -> Result<()> {
    let client = RoombookClient::new(server);

    match action {
        AuthAction::Register {
            email,
            name,
            password,
            accept_terms,
        } => {
            println!("🔐 Registering new user...");

            let request = RegisterRequest {
                email: email.clone(),
                name,
                password: password.clone(),
                password_confirm: password,
                terms_accepted: accept_terms,
            };

            match client.register(&request).await {
                Ok(tokens) => {
                    println!("✅ User '{}' registered successfully!", email);
                    print_token_pair(&tokens);
                }
                Err(e) => fail("Registration failed", e),
            }
        }

        AuthAction::Login { email, password } => {
            println!("🔑 Logging in...");

            match client.login(&LoginRequest { email, password }).await {
                Ok(tokens) => {
                    println!("✅ Login successful!");
                    print_token_pair(&tokens);
                }
                Err(e) => fail("Login failed", e),
            }
        }

        AuthAction::Refresh { refresh } => {
            let refresh = resolve_refresh(refresh);
            match client.refresh(&refresh).await {
                Ok(token) => {
                    println!("✅ Access token refreshed!");
                    println!("⏰ Expires at: {}", token.access_expires_at);
                    println!("   export {}=\"{}\"", ACCESS_TOKEN_ENV, token.access);
                }
                Err(e) => fail("Refresh failed", e),
            }
        }

        AuthAction::Logout { refresh } => {
            let refresh = resolve_refresh(refresh);
            let client = authed_client(server);
            match client.logout(&refresh).await {
                Ok(_) => println!("👋 Logged out, refresh token revoked"),
                Err(e) => fail("Logout failed", e),
            }
        }

        AuthAction::Profile => {
            let client = authed_client(server);
            println!("👤 Getting user profile...");

            match client.profile().await {
                Ok(profile) => {
                    println!("✅ User Profile:");
                    println!("  🆔 ID: {}", profile.id);
                    println!("  📧 Email: {}", profile.email);
                    println!("  📝 Name: {}", profile.name);
                }
                Err(e) => fail("Failed to get profile", e),
            }
        }
    }

    Ok(())
}
