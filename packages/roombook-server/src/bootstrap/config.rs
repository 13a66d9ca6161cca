use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use std::net::SocketAddr;
use tracing::warn;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_URL: &str = "sqlite://roombook.db?mode=rwc";
const DEFAULT_JWT_SECRET: &str = "roombook_default_jwt_secret_change_in_production";
const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;
const MAX_ACCESS_TTL_MINUTES: i64 = 365 * 24 * 60;
const MAX_REFRESH_TTL_DAYS: i64 = 10 * 365;
const MIN_SECRET_LEN: usize = 32;
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// 令牌签发参数
#[derive(Clone, Debug)]
pub(crate) struct AuthConfig {
    pub(crate) jwt_secret: String,
    pub(crate) access_ttl: chrono::Duration,
    pub(crate) refresh_ttl: chrono::Duration,
    pub(crate) bcrypt_cost: u32,
}

/// 启动时确保存在的管理员账号
#[derive(Clone, Debug)]
pub(crate) struct AdminSeed {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ServerConfig {
    pub(crate) addr: SocketAddr,
    pub(crate) db_url: String,
    pub(crate) auth: AuthConfig,
    pub(crate) admin: Option<AdminSeed>,
}

pub(crate) fn server_config_from_env() -> Result<ServerConfig> {
    server_config_from_lookup(|key| std::env::var(key).ok())
}

pub(crate) fn server_config_from_lookup<F>(lookup: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let addr_text = lookup("ROOMBOOK_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = addr_text
        .parse()
        .with_context(|| format!("invalid ROOMBOOK_ADDR: {addr_text}"))?;

    let db_url = lookup("ROOMBOOK_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_string());

    let jwt_secret = lookup("ROOMBOOK_JWT_SECRET").unwrap_or_else(|| {
        warn!("Using default JWT secret. Please set ROOMBOOK_JWT_SECRET in production!");
        DEFAULT_JWT_SECRET.to_string()
    });
    if jwt_secret.len() < MIN_SECRET_LEN {
        bail!("ROOMBOOK_JWT_SECRET must be at least {MIN_SECRET_LEN} characters long");
    }

    let access_ttl = parse_ttl(
        &lookup,
        "ROOMBOOK_ACCESS_TTL_MINUTES",
        DEFAULT_ACCESS_TTL_MINUTES,
        MAX_ACCESS_TTL_MINUTES,
        TimeDelta::try_minutes,
    )?;
    let refresh_ttl = parse_ttl(
        &lookup,
        "ROOMBOOK_REFRESH_TTL_DAYS",
        DEFAULT_REFRESH_TTL_DAYS,
        MAX_REFRESH_TTL_DAYS,
        TimeDelta::try_days,
    )?;

    let bcrypt_cost = match lookup("ROOMBOOK_BCRYPT_COST") {
        Some(text) => text
            .parse::<u32>()
            .with_context(|| format!("invalid ROOMBOOK_BCRYPT_COST: {text}"))?,
        None => bcrypt::DEFAULT_COST,
    };
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
        bail!("ROOMBOOK_BCRYPT_COST must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}");
    }

    let admin = match (lookup("ROOMBOOK_ADMIN_EMAIL"), lookup("ROOMBOOK_ADMIN_PASSWORD")) {
        (Some(email), Some(password)) => Some(AdminSeed { email, password }),
        (None, None) => None,
        _ => bail!("ROOMBOOK_ADMIN_EMAIL and ROOMBOOK_ADMIN_PASSWORD must be set together"),
    };

    Ok(ServerConfig {
        addr,
        db_url,
        auth: AuthConfig {
            jwt_secret,
            access_ttl,
            refresh_ttl,
            bcrypt_cost,
        },
        admin,
    })
}

/// 解析 TTL, 取值范围 1..=max
fn parse_ttl<F>(
    lookup: &F,
    key: &str,
    default: i64,
    max: i64,
    to_delta: fn(i64) -> Option<TimeDelta>,
) -> Result<TimeDelta>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(text) => text
            .parse::<i64>()
            .with_context(|| format!("invalid {key}: {text}"))?,
        None => default,
    };
    if !(1..=max).contains(&value) {
        bail!("{key} must be between 1 and {max}, got {value}");
    }
    match to_delta(value) {
        Some(ttl) => Ok(ttl),
        None => bail!("{key} is out of range: {value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = server_config_from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert_eq!(config.auth.access_ttl, chrono::Duration::minutes(15));
        assert_eq!(config.auth.refresh_ttl, chrono::Duration::days(7));
        assert_eq!(config.auth.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_custom_values() {
        let config = server_config_from_lookup(lookup_from(&[
            ("ROOMBOOK_ADDR", "127.0.0.1:8080"),
            ("ROOMBOOK_ACCESS_TTL_MINUTES", "5"),
            ("ROOMBOOK_ADMIN_EMAIL", "admin@example.com"),
            ("ROOMBOOK_ADMIN_PASSWORD", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.auth.access_ttl, chrono::Duration::minutes(5));
        assert_eq!(config.admin.unwrap().email, "admin@example.com");
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = server_config_from_lookup(lookup_from(&[("ROOMBOOK_JWT_SECRET", "short")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_invalid_addr_and_ttl() {
        assert!(server_config_from_lookup(lookup_from(&[("ROOMBOOK_ADDR", "nope")])).is_err());
        assert!(
            server_config_from_lookup(lookup_from(&[("ROOMBOOK_REFRESH_TTL_DAYS", "0")])).is_err()
        );
        assert!(server_config_from_lookup(lookup_from(&[("ROOMBOOK_BCRYPT_COST", "2")])).is_err());
    }

    #[test]
    fn test_rejects_oversized_ttls() {
        let huge_minutes = server_config_from_lookup(lookup_from(&[(
            "ROOMBOOK_ACCESS_TTL_MINUTES",
            "10000000000000",
        )]));
        assert!(huge_minutes.is_err());

        let huge_days = server_config_from_lookup(lookup_from(&[(
            "ROOMBOOK_REFRESH_TTL_DAYS",
            "9000000000000000",
        )]));
        assert!(huge_days.is_err());

        let year = MAX_ACCESS_TTL_MINUTES.to_string();
        let pairs = [("ROOMBOOK_ACCESS_TTL_MINUTES", year.as_str())];
        let config = server_config_from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.auth.access_ttl, TimeDelta::days(365));

        let too_long = (MAX_REFRESH_TTL_DAYS + 1).to_string();
        let pairs = [("ROOMBOOK_REFRESH_TTL_DAYS", too_long.as_str())];
        assert!(server_config_from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_admin_seed_requires_both_values() {
        let result =
            server_config_from_lookup(lookup_from(&[("ROOMBOOK_ADMIN_EMAIL", "a@example.com")]));
        assert!(result.is_err());
    }
}
