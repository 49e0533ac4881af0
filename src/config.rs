//! ShardStore Configuration
//!
//! Configuration structures for the partitioned store: how many
//! partitions to spawn, how large each partition may grow, and how much
//! result text a single SELECT may return.

use serde::{Deserialize, Serialize};

/// Main ShardStore configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardStoreConfig {
    /// Cluster layout configuration
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Per-partition store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cluster layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Number of partition workers (records shard by field3 mod this)
    #[serde(default = "default_partitions")]
    pub partitions: usize,

    /// Depth of each worker's request channel
    #[serde(default = "default_channel_depth")]
    pub channel_depth: usize,
}

/// Per-partition store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum records per partition; inserts beyond this are dropped
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Maximum bytes of formatted rows a single scan may return
    #[serde(default = "default_max_result_bytes")]
    pub max_result_bytes: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_partitions() -> usize {
    3
}

fn default_channel_depth() -> usize {
    64
}

fn default_capacity() -> usize {
    100
}

fn default_max_result_bytes() -> usize {
    4096
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            partitions: default_partitions(),
            channel_depth: default_channel_depth(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_result_bytes: default_max_result_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ShardStoreConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ShardStoreConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> crate::Result<Self> {
        let config: ShardStoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.cluster.partitions == 0 {
            return Err(crate::Error::Config(
                "cluster.partitions must be at least 1".into(),
            ));
        }

        if self.cluster.channel_depth == 0 {
            return Err(crate::Error::Config(
                "cluster.channel_depth must be at least 1".into(),
            ));
        }

        if self.store.max_result_bytes == 0 {
            return Err(crate::Error::Config(
                "store.max_result_bytes must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Render a starter configuration file
    pub fn starter_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).expect("default config serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[cluster]
partitions = 5
channel_depth = 32

[store]
capacity = 250
max_result_bytes = 8192
"#;

        let config = ShardStoreConfig::from_str(toml).unwrap();
        assert_eq!(config.cluster.partitions, 5);
        assert_eq!(config.store.capacity, 250);
        assert_eq!(config.logging.level, "info"); // defaulted
    }

    #[test]
    fn test_defaults() {
        let config = ShardStoreConfig::from_str("").unwrap();
        assert_eq!(config.cluster.partitions, 3);
        assert_eq!(config.store.capacity, 100);
        assert_eq!(config.store.max_result_bytes, 4096);
    }

    #[test]
    fn test_zero_partitions_rejected() {
        let toml = "[cluster]\npartitions = 0\n";
        assert!(ShardStoreConfig::from_str(toml).is_err());
    }

    #[test]
    fn test_starter_toml_round_trips() {
        let rendered = ShardStoreConfig::starter_toml();
        let config = ShardStoreConfig::from_str(&rendered).unwrap();
        assert_eq!(config.cluster.partitions, 3);
    }
}
