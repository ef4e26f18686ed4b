use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "EyeClinic";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overrides the data directory (database + uploads).
pub const DATA_DIR_ENV: &str = "EYECLINIC_DATA_DIR";
/// Overrides the HTTP bind address.
pub const BIND_ENV: &str = "EYECLINIC_BIND";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8765";
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

const DATABASE_FILE: &str = "clinic.db";
const UPLOADS_DIR: &str = "uploads";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,eyeclinic_lib=debug"
}

/// Get the application data directory
/// ~/EyeClinic/ unless overridden by `EYECLINIC_DATA_DIR`.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub slot_minutes: u32,
}

impl AppConfig {
    /// Resolve configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind = std::env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind.clone()))?;
        Ok(Self {
            data_dir: app_data_dir(),
            bind_addr,
            slot_minutes: DEFAULT_SLOT_MINUTES,
        })
    }

    /// Configuration rooted at an explicit directory (tests, embedding).
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join(UPLOADS_DIR)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidBindAddr(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_data_dir() {
        let config = AppConfig::with_data_dir("/tmp/clinic");
        assert!(config.db_path().starts_with("/tmp/clinic"));
        assert!(config.db_path().ends_with("clinic.db"));
        assert!(config.upload_dir().ends_with("uploads"));
    }

    #[test]
    fn default_bind_addr_parses() {
        let addr: SocketAddr = DEFAULT_BIND_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 8765);
    }

    #[test]
    fn app_name_is_eyeclinic() {
        assert_eq!(APP_NAME, "EyeClinic");
    }
}
