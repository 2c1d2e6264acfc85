//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Fixed directory on the local filesystem (created if absent).
    Directory {
        /// Root directory for stored uploads.
        path: PathBuf,
    },
    /// Throwaway directory removed when the process exits. Useful for
    /// development and tests; stored uploads do not survive a restart.
    Temp,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Temp
    }
}

/// Slot negotiation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Maximum accepted file size in bytes. Zero or negative disables the
    /// limit.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: i64,
    /// Seconds an unconsumed slot stays valid.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_max_file_size() -> i64 {
    crate::DEFAULT_MAX_FILE_SIZE
}

fn default_ttl_secs() -> u64 {
    crate::DEFAULT_SLOT_TTL_SECS
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl SlotConfig {
    /// Slot time-to-live as a Duration.
    pub fn ttl(&self) -> Duration {
        // Saturate at i64::MAX to prevent overflow wrapping to negative.
        let secs = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs)
    }
}

/// Purge scheduling configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Seconds between recurring purge passes.
    #[serde(default = "default_purge_interval_secs")]
    pub interval_secs: u64,
}

fn default_purge_interval_secs() -> u64 {
    crate::DEFAULT_PURGE_INTERVAL_SECS
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_purge_interval_secs(),
        }
    }
}

impl PurgeConfig {
    /// Purge interval as a std Duration (for tokio timers).
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}

/// Externally announced URL components.
///
/// Transfer URLs handed to clients are built from these, not from the bind
/// address, so the service can sit behind a reverse proxy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnnounceConfig {
    /// URL scheme, "http" or "https".
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Hostname clients should connect to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port clients should connect to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path prefix under which transfer routes are mounted.
    #[serde(default = "default_context_root")]
    pub context_root: String,
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_context_root() -> String {
    "/".to_string()
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            port: default_port(),
            context_root: default_context_root(),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Slot negotiation configuration.
    #[serde(default)]
    pub slots: SlotConfig,
    /// Purge scheduling configuration.
    #[serde(default)]
    pub purge: PurgeConfig,
    /// Externally announced URL components.
    #[serde(default)]
    pub announce: AnnounceConfig,
}

impl AppConfig {
    /// Create a test configuration with temp storage and short timers.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::Temp,
            slots: SlotConfig::default(),
            purge: PurgeConfig::default(),
            announce: AnnounceConfig::default(),
        }
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.slots.ttl_secs == 0 {
            return Err("slots.ttl_secs must be at least 1 second".to_string());
        }
        if self.slots.ttl_secs > i64::MAX as u64 {
            return Err(format!(
                "slots.ttl_secs {} exceeds maximum value {} (would overflow Duration)",
                self.slots.ttl_secs,
                i64::MAX
            ));
        }
        if self.purge.interval_secs == 0 {
            return Err("purge.interval_secs cannot be 0. \
                 This would cause a panic when creating the purge timer. \
                 Use a value >= 1 second."
                .to_string());
        }
        match self.announce.scheme.as_str() {
            "http" | "https" => {}
            other => {
                return Err(format!(
                    "announce.scheme must be \"http\" or \"https\", got {other:?}"
                ));
            }
        }
        if self.announce.context_root.is_empty() || !self.announce.context_root.starts_with('/') {
            return Err("announce.context_root must start with '/'".to_string());
        }
        let context_root = self.announce.context_root.trim_end_matches('/');
        if context_root == "/v1" || context_root.starts_with("/v1/") {
            return Err(
                "announce.context_root must not use the reserved /v1 prefix".to_string(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slots.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.slots.ttl_secs, 300);
        assert_eq!(config.purge.interval_secs, 300);
    }

    #[test]
    fn test_deserialize_empty_config() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(matches!(config.storage, StorageConfig::Temp));
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_storage_config_directory_roundtrip() {
        let config = StorageConfig::Directory {
            path: PathBuf::from("/var/lib/dropslot"),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"type\":\"directory\""));
        let decoded: StorageConfig = serde_json::from_str(&json).unwrap();
        match decoded {
            StorageConfig::Directory { path } => {
                assert_eq!(path, PathBuf::from("/var/lib/dropslot"));
            }
            _ => panic!("expected directory config"),
        }
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = AppConfig::default();
        config.slots.ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_purge_interval() {
        let mut config = AppConfig::default();
        config.purge.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_context_root() {
        let mut config = AppConfig::default();
        config.announce.context_root = "upload".to_string();
        assert!(config.validate().is_err());
        config.announce.context_root = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_reserved_context_root() {
        let mut config = AppConfig::default();
        config.announce.context_root = "/v1".to_string();
        assert!(config.validate().is_err());
        config.announce.context_root = "/v1/".to_string();
        assert!(config.validate().is_err());
        config.announce.context_root = "/v1/files".to_string();
        assert!(config.validate().is_err());
        // Only the exact segment is reserved.
        config.announce.context_root = "/v1x".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_scheme() {
        let mut config = AppConfig::default();
        config.announce.scheme = "ftp".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_max_file_size_allowed() {
        let mut config = AppConfig::default();
        config.slots.max_file_size = -1;
        assert!(config.validate().is_ok());
    }
}
