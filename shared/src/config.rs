use anyhow::{Context, Result};
use std::{env, str::FromStr};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub identity: IdentityConfig,
    pub mail: MailConfig,
    pub lending: LendingConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: env::var("DATABASE_HOST").context("DATABASE_HOST is not set")?,
            port: parse_var("DATABASE_PORT")?.unwrap_or(5432),
            username: env::var("DATABASE_USERNAME").context("DATABASE_USERNAME is not set")?,
            password: env::var("DATABASE_PASSWORD").context("DATABASE_PASSWORD is not set")?,
            database: env::var("DATABASE_NAME").context("DATABASE_NAME is not set")?,
        };
        let redis = RedisConfig {
            host: env::var("REDIS_HOST").context("REDIS_HOST is not set")?,
            port: parse_var("REDIS_PORT")?.unwrap_or(6379),
        };
        let auth = AuthConfig {
            ttl: parse_var("AUTH_TOKEN_TTL")?.unwrap_or(300),
        };
        let identity = IdentityConfig {
            userinfo_url: env::var("IDENTITY_USERINFO_URL")
                .context("IDENTITY_USERINFO_URL is not set")?,
        };
        // MAIL_API_URL が無い場合はメールを送らずログにだけ残す
        let mail = MailConfig {
            api_url: env::var("MAIL_API_URL").ok().filter(|v| !v.is_empty()),
            access_token: env::var("MAIL_ACCESS_TOKEN").unwrap_or_default(),
            sender: env::var("MAIL_SENDER").unwrap_or_else(|_| "no-reply@library-hub.local".into()),
        };
        let lending = LendingConfig {
            loan_period_days: parse_var("LOAN_PERIOD_DAYS")?.unwrap_or(14),
        };
        let server = ServerConfig {
            port: parse_var("SERVER_PORT")?.unwrap_or(8080),
        };

        Ok(Self {
            database,
            redis,
            auth,
            identity,
            mail,
            lending,
            server,
        })
    }
}

fn parse_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Err(_) => Ok(None),
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value: {v}")),
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

pub struct AuthConfig {
    // 検証済みトークンをキャッシュする秒数
    pub ttl: u64,
}

pub struct IdentityConfig {
    pub userinfo_url: String,
}

pub struct MailConfig {
    pub api_url: Option<String>,
    pub access_token: String,
    pub sender: String,
}

pub struct LendingConfig {
    pub loan_period_days: i64,
}

pub struct ServerConfig {
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::parse_var;

    #[test]
    fn parse_var_missing_is_none() {
        let v: Option<u16> = parse_var("LIBRARY_HUB_SURELY_UNSET_VARIABLE").unwrap();
        assert!(v.is_none());
    }
}
