use std::{env, path::PathBuf};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    /// The one account allowed to use admin endpoints.
    pub admin_email: String,
    /// Recipient of new-order notifications.
    pub store_email: String,
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let admin_email = env::var("ADMIN_EMAIL").context("ADMIN_EMAIL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let store_email = env::var("STORE_EMAIL").unwrap_or_else(|_| admin_email.clone());

        Ok(Self {
            host,
            port,
            data_dir: PathBuf::from(data_dir),
            jwt_secret,
            admin_email,
            store_email,
            mail: MailConfig::from_env()?,
        })
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        email == self.admin_email
    }
}

impl MailConfig {
    /// `None` when `SMTP_HOST` is unset; the remaining variables are then
    /// ignored.
    fn from_env() -> anyhow::Result<Option<Self>> {
        let Ok(smtp_host) = env::var("SMTP_HOST") else {
            return Ok(None);
        };
        let smtp_port = env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(587);
        let smtp_username = env::var("SMTP_USERNAME").context("SMTP_USERNAME is not set")?;
        let smtp_password = env::var("SMTP_PASSWORD").context("SMTP_PASSWORD is not set")?;
        let from_address = env::var("MAIL_FROM").unwrap_or_else(|_| smtp_username.clone());

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_address,
        }))
    }
}
