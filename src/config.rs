//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::models::UploadMode;

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 4050;
    pub const DEV_STORAGE_DIR: &str = "./uploads";
    pub const DEV_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB per file
    pub const DEV_MAX_REQUEST_SIZE: usize = 64 * 1024 * 1024; // 64MB per multipart body
    pub const DEV_DEFAULT_MODE: &str = "simple";
    pub const DEV_MAX_CONCURRENT_UPLOADS: usize = 32;
    pub const DEV_TEMP_RETENTION_SECS: u64 = 3600;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Accept/reject rules applied to every submitted file.
///
/// Extensions are stored lowercase without a leading dot; MIME types are
/// stored lowercase. Empty allow-lists mean "allow everything not blocked".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySettings {
    /// Per-file size limit in bytes; `None` disables the check
    pub max_file_size: Option<u64>,
    pub allowed_extensions: Vec<String>,
    pub blocked_extensions: Vec<String>,
    pub allowed_mime_types: Vec<String>,
    pub blocked_mime_types: Vec<String>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory receiving accepted files
    pub storage_dir: PathBuf,
    /// Maximum multipart body size in bytes (default: 64MB)
    pub max_request_size: usize,
    /// Mode used when the request carries no `action` field
    pub default_mode: UploadMode,
    /// Maximum upload requests processed at once (default: 32)
    pub max_concurrent_uploads: usize,
    /// Age in seconds after which abandoned temp files are removed
    pub temp_retention_secs: u64,
    /// Validation rules
    pub policy: PolicySettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `UPL_HOST`: Server host (default: 127.0.0.1)
    /// - `UPL_PORT`: Server port (default: 4050)
    /// - `UPL_STORAGE_DIR`: Upload directory (default: ./uploads, must be set in production)
    /// - `UPL_MAX_FILE_SIZE`: Per-file limit in bytes, 0 disables (default: 10MB)
    /// - `UPL_MAX_REQUEST_SIZE`: Multipart body limit in bytes (default: 64MB)
    /// - `UPL_ALLOWED_EXTENSIONS` / `UPL_BLOCKED_EXTENSIONS`: comma-separated lists
    /// - `UPL_ALLOWED_MIME_TYPES` / `UPL_BLOCKED_MIME_TYPES`: comma-separated lists
    /// - `UPL_DEFAULT_MODE`: simple, multiple or info (default: simple)
    /// - `UPL_MAX_CONCURRENT_UPLOADS`: Concurrent upload requests (default: 32)
    /// - `UPL_TEMP_RETENTION_SECS`: Temp file retention in seconds (default: 3600)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_str = lookup("RUST_ENV").ok_or(ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = lookup("UPL_HOST").unwrap_or_else(|| defaults::DEV_HOST.to_string());

        let port = lookup("UPL_PORT")
            .unwrap_or_else(|| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("UPL_PORT must be a valid port number"))?;

        let storage_dir = PathBuf::from(
            lookup("UPL_STORAGE_DIR").unwrap_or_else(|| defaults::DEV_STORAGE_DIR.to_string()),
        );

        let max_file_size = lookup("UPL_MAX_FILE_SIZE")
            .unwrap_or_else(|| defaults::DEV_MAX_FILE_SIZE.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("UPL_MAX_FILE_SIZE must be a valid number"))?;

        let max_request_size = lookup("UPL_MAX_REQUEST_SIZE")
            .unwrap_or_else(|| defaults::DEV_MAX_REQUEST_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| {
                ConfigError::InvalidValue("UPL_MAX_REQUEST_SIZE must be a valid number")
            })?;

        let default_mode = UploadMode::parse(
            &lookup("UPL_DEFAULT_MODE").unwrap_or_else(|| defaults::DEV_DEFAULT_MODE.to_string()),
        )
        .ok_or(ConfigError::InvalidValue(
            "UPL_DEFAULT_MODE must be 'simple', 'multiple' or 'info'",
        ))?;

        let max_concurrent_uploads = lookup("UPL_MAX_CONCURRENT_UPLOADS")
            .unwrap_or_else(|| defaults::DEV_MAX_CONCURRENT_UPLOADS.to_string())
            .parse::<usize>()
            .map_err(|_| {
                ConfigError::InvalidValue("UPL_MAX_CONCURRENT_UPLOADS must be a valid number")
            })?;

        let temp_retention_secs = lookup("UPL_TEMP_RETENTION_SECS")
            .unwrap_or_else(|| defaults::DEV_TEMP_RETENTION_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("UPL_TEMP_RETENTION_SECS must be a valid number")
            })?;

        let policy = PolicySettings {
            max_file_size: (max_file_size > 0).then_some(max_file_size),
            allowed_extensions: parse_extension_list(lookup("UPL_ALLOWED_EXTENSIONS")),
            blocked_extensions: parse_extension_list(lookup("UPL_BLOCKED_EXTENSIONS")),
            allowed_mime_types: parse_mime_list(lookup("UPL_ALLOWED_MIME_TYPES")),
            blocked_mime_types: parse_mime_list(lookup("UPL_BLOCKED_MIME_TYPES")),
        };

        let config = Config {
            environment,
            host,
            port,
            storage_dir,
            max_request_size,
            default_mode,
            max_concurrent_uploads,
            temp_retention_secs,
            policy,
        };

        config.validate()?;

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Reject combinations that can never accept a request.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_request_size == 0 {
            return Err(ConfigError::InvalidValue(
                "UPL_MAX_REQUEST_SIZE must be greater than zero",
            ));
        }
        if self.max_concurrent_uploads == 0 {
            return Err(ConfigError::InvalidValue(
                "UPL_MAX_CONCURRENT_UPLOADS must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.storage_dir == PathBuf::from(defaults::DEV_STORAGE_DIR) {
            errors.push(format!(
                "UPL_STORAGE_DIR is using development default '{}'. Set a dedicated upload directory.",
                defaults::DEV_STORAGE_DIR
            ));
        }

        if !self.storage_dir.is_absolute() {
            errors.push(format!(
                "UPL_STORAGE_DIR '{}' must be an absolute path in production.",
                self.storage_dir.display()
            ));
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Split a comma-separated extension list into normalized entries.
fn parse_extension_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Split a comma-separated MIME type list into normalized entries.
fn parse_mime_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(|mime| mime.trim().to_lowercase())
            .filter(|mime| !mime.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
