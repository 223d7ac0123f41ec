//! Configuration module for the blog backend.
//!
//! All configuration is loaded from environment variables (and an optional `.env`)
//! with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Directory holding posts and settings files
    pub data_dir: PathBuf,
    /// Directory holding uploaded images
    pub images_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// First-run operator login
    pub admin_login: Option<String>,
    /// First-run operator password
    pub admin_password: Option<String>,
    /// First-run token signing secret
    pub secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let data_dir: PathBuf = env::var("BLOG_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let images_dir = env::var("BLOG_IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("images"));

        let bind_addr = env::var("BLOG_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid BLOG_BIND_ADDR: {}", bind_addr)))?;

        let log_level = env::var("BLOG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            data_dir,
            images_dir,
            bind_addr,
            log_level,
            admin_login: env::var("BLOG_ADMIN_LOGIN").ok(),
            admin_password: env::var("BLOG_ADMIN_PASSWORD").ok(),
            secret: env::var("BLOG_SECRET").ok(),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &self.data_dir)
            .field("images_dir", &self.images_dir)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("admin_login", &self.admin_login)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
