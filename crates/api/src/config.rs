//! Process configuration.
//!
//! Read once at startup; immutable afterwards. A missing token-signing secret
//! is a hard startup error; there is deliberately no built-in fallback
//! secret.

use anyhow::Context;

use mealbridge_notify::SmtpConfig;

#[derive(Debug, Clone)]
pub struct SuperadminConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HS256 signing secret for session tokens. Required, non-empty.
    pub jwt_secret: String,
    pub bind_addr: String,
    /// When set (and the `postgres` feature is enabled), Postgres stores are
    /// used instead of the in-memory ones.
    pub database_url: Option<String>,
    pub smtp: Option<SmtpConfig>,
    /// Bootstrap credentials for the initial SUPERADMIN account.
    pub superadmin: Option<SuperadminConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET must be set to a non-empty value")?;

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let smtp = match (
            std::env::var("SMTP_HOST").ok(),
            std::env::var("SMTP_USER").ok(),
            std::env::var("SMTP_PASS").ok(),
        ) {
            (Some(host), Some(username), Some(password)) => {
                let port = match std::env::var("SMTP_PORT") {
                    Ok(raw) => raw
                        .parse()
                        .with_context(|| format!("SMTP_PORT is not a port number: {raw}"))?,
                    Err(_) => 587,
                };
                let from = std::env::var("SMTP_FROM").unwrap_or_else(|_| username.clone());
                Some(SmtpConfig {
                    host,
                    port,
                    username,
                    password,
                    from,
                })
            }
            _ => None,
        };

        let superadmin = match (
            std::env::var("SUPERADMIN_EMAIL").ok(),
            std::env::var("SUPERADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(SuperadminConfig { email, password })
            }
            _ => None,
        };

        Ok(Self {
            jwt_secret,
            bind_addr,
            database_url,
            smtp,
            superadmin,
        })
    }
}
