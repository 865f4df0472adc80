//! Configuration module
//!
//! Settings are read from the process environment (and an optional `.env` file).
//! Every value has a default so a bare `cargo run` starts a usable development server.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SERVER_PORT: u16 = 5000;
const CORS_ORIGINS: &str = "http://localhost:5000";
const UPLOAD_FOLDER: &str = "static/uploads";
const MAX_CONTENT_LENGTH_MB: usize = 16;
const ALLOWED_EXTENSIONS: &str = "docx";
const SESSION_LIFETIME_SECS: u64 = 3600;
const SESSION_COOKIE_NAME: &str = "smartdoc_session";
const FILE_CLEANUP_AFTER_SECS: u64 = 86_400;
const CLEANUP_INTERVAL_SECS: u64 = 3600;
const HTTP_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Root directory holding every uploaded and processed document.
    pub upload_folder: PathBuf,
    pub max_content_length_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub session_lifetime_secs: u64,
    pub session_cookie_name: String,
    pub session_cookie_secure: bool,
    /// Files older than this are removed by the reaper.
    pub file_cleanup_after_secs: u64,
    /// Interval between reaper runs. 0 = disabled.
    pub cleanup_interval_secs: u64,
    pub http_rate_limit_per_minute: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec![CORS_ORIGINS.to_string()],
            upload_folder: PathBuf::from(UPLOAD_FOLDER),
            max_content_length_bytes: MAX_CONTENT_LENGTH_MB * 1024 * 1024,
            allowed_extensions: vec![ALLOWED_EXTENSIONS.to_string()],
            session_lifetime_secs: SESSION_LIFETIME_SECS,
            session_cookie_name: SESSION_COOKIE_NAME.to_string(),
            session_cookie_secure: false,
            file_cleanup_after_secs: FILE_CLEANUP_AFTER_SECS,
            cleanup_interval_secs: CLEANUP_INTERVAL_SECS,
            http_rate_limit_per_minute: HTTP_RATE_LIMIT_PER_MINUTE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());
        let is_production = is_production_name(&environment);

        let cors_origins_str =
            env::var("CORS_ORIGINS").unwrap_or_else(|_| CORS_ORIGINS.to_string());
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_content_length_mb = env::var("MAX_CONTENT_LENGTH_MB")
            .unwrap_or_else(|_| MAX_CONTENT_LENGTH_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_CONTENT_LENGTH_MB);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| ALLOWED_EXTENSIONS.to_string())
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let session_cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(is_production);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .unwrap_or(SERVER_PORT),
            environment,
            cors_origins,
            upload_folder: PathBuf::from(
                env::var("UPLOAD_FOLDER").unwrap_or_else(|_| UPLOAD_FOLDER.to_string()),
            ),
            max_content_length_bytes: max_content_length_mb * 1024 * 1024,
            allowed_extensions,
            session_lifetime_secs: env::var("SESSION_LIFETIME_SECS")
                .unwrap_or_else(|_| SESSION_LIFETIME_SECS.to_string())
                .parse()
                .unwrap_or(SESSION_LIFETIME_SECS),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| SESSION_COOKIE_NAME.to_string()),
            session_cookie_secure,
            file_cleanup_after_secs: env::var("FILE_CLEANUP_AFTER_SECS")
                .unwrap_or_else(|_| FILE_CLEANUP_AFTER_SECS.to_string())
                .parse()
                .unwrap_or(FILE_CLEANUP_AFTER_SECS),
            cleanup_interval_secs: env::var("CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|_| CLEANUP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(CLEANUP_INTERVAL_SECS),
            http_rate_limit_per_minute: env::var("HTTP_RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| HTTP_RATE_LIMIT_PER_MINUTE.to_string())
                .parse()
                .unwrap_or(HTTP_RATE_LIMIT_PER_MINUTE),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("PORT must be greater than 0"));
        }

        if self.max_content_length_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONTENT_LENGTH_MB must be greater than 0"
            ));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        if self.upload_folder.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_FOLDER must not be empty"));
        }

        if self.session_cookie_name.trim().is_empty() {
            return Err(anyhow::anyhow!("SESSION_COOKIE_NAME must not be empty"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.environment)
    }

    pub fn session_lifetime(&self) -> Duration {
        Duration::from_secs(self.session_lifetime_secs)
    }

    pub fn file_cleanup_after(&self) -> Duration {
        Duration::from_secs(self.file_cleanup_after_secs)
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upload_policy() {
        let config = Config::default();
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.max_content_length_bytes, 16 * 1024 * 1024);
        assert_eq!(config.allowed_extensions, vec!["docx".to_string()]);
        assert_eq!(config.session_lifetime(), Duration::from_secs(3600));
        assert_eq!(config.file_cleanup_after(), Duration::from_secs(86_400));
        assert_eq!(config.http_rate_limit_per_minute, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_extension_list() {
        let config = Config {
            allowed_extensions: vec![],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_size_limit() {
        let config = Config {
            max_content_length_bytes: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let mut config = Config::default();
        assert!(!config.is_production());
        config.environment = "Prod".to_string();
        assert!(config.is_production());
    }
}
