//! Configuration management for CLI, environment variables, and config files.

use crate::error::{PathRankError, ValidationIssue};
use crate::sampler::SampleSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for pathrank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub sampler: SampleSpec,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the HTTP listener and self-probe target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the service binds to.
    pub bind: String,
    /// Base URL the load generator probes; points back at this service.
    pub base_url: String,
}

/// Configuration for the counter store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Fixed deadline for a single store operation, in milliseconds.
    /// Past it the operation fails with StoreUnavailable.
    pub op_timeout_ms: u64,
}

/// Configuration for the probe runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum probes in flight at once. 0 means unbounded.
    pub concurrency_limit: usize,
    /// Independent timeout per probe, in milliseconds.
    pub timeout_ms: u64,
    /// Optional seed for the path sampler; unset draws from entropy.
    pub sample_seed: Option<u64>,
}

/// Configuration for logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { op_timeout_ms: 250 }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 32,
            timeout_ms: 5000,
            sample_seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &PathBuf) -> Result<Self, PathRankError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PathRankError::IoError(e.to_string()))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| PathRankError::ParseError(e.to_string()))
            }
            _ => toml::from_str(&content).map_err(|e| PathRankError::ParseError(e.to_string())),
        }
    }

    pub fn from_default_locations() -> Result<Self, PathRankError> {
        let config_dirs = [
            dirs::config_dir().map(|d| d.join("pathrank/config.toml")),
            Some(PathBuf::from("/etc/pathrank/config.toml")),
            Some(PathBuf::from("./pathrank.toml")),
        ];

        for path in config_dirs.iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    pub fn merge_from_env(mut self) -> Result<Self, PathRankError> {
        if let Ok(val) = std::env::var("PATHRANK_BIND") {
            self.server.bind = val;
        }
        if let Ok(val) = std::env::var("PATHRANK_BASE_URL") {
            self.server.base_url = val;
        }
        if let Ok(val) = std::env::var("PATHRANK_STORE_OP_TIMEOUT_MS") {
            self.store.op_timeout_ms = val.parse().map_err(|_| {
                PathRankError::ParseError("PATHRANK_STORE_OP_TIMEOUT_MS has invalid format".into())
            })?;
        }
        if let Ok(val) = std::env::var("PATHRANK_PROBE_CONCURRENCY") {
            self.probe.concurrency_limit = val.parse().map_err(|_| {
                PathRankError::ParseError("PATHRANK_PROBE_CONCURRENCY has invalid format".into())
            })?;
        }
        if let Ok(val) = std::env::var("PATHRANK_PROBE_TIMEOUT_MS") {
            self.probe.timeout_ms = val.parse().map_err(|_| {
                PathRankError::ParseError("PATHRANK_PROBE_TIMEOUT_MS has invalid format".into())
            })?;
        }
        if let Ok(val) = std::env::var("PATHRANK_SAMPLE_SEED") {
            self.probe.sample_seed = Some(val.parse().map_err(|_| {
                PathRankError::ParseError("PATHRANK_SAMPLE_SEED has invalid format".into())
            })?);
        }
        if let Ok(val) = std::env::var("PATHRANK_LOG_LEVEL") {
            self.logging.level = val;
        }

        Ok(self)
    }

    pub fn merge_from_cli(mut self, cli: &CliArgs) -> Self {
        if let Some(ref bind) = cli.bind {
            self.server.bind = bind.clone();
        }
        if let Some(ref base_url) = cli.base_url {
            self.server.base_url = base_url.clone();
        }
        if let Some(concurrency) = cli.probe_concurrency {
            self.probe.concurrency_limit = concurrency;
        }
        if let Some(seed) = cli.sample_seed {
            self.probe.sample_seed = Some(seed);
        }
        self
    }

    pub fn load() -> Result<Self, PathRankError> {
        Self::from_default_locations()?.merge_from_env()
    }

    pub fn load_with_cli(cli: &CliArgs) -> Result<Self, PathRankError> {
        Ok(Self::from_default_locations()?
            .merge_from_env()?
            .merge_from_cli(cli))
    }

    pub fn validate(&self) -> Result<(), PathRankError> {
        let mut issues = Vec::new();

        if self.server.base_url.is_empty() {
            issues.push(ValidationIssue {
                field: "server.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if let Err(e) = reqwest::Url::parse(&self.server.base_url) {
            issues.push(ValidationIssue {
                field: "server.base_url".to_string(),
                message: format!("Invalid URL format: {}", e),
            });
        }

        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            issues.push(ValidationIssue {
                field: "server.bind".to_string(),
                message: format!("Invalid socket address: {}", self.server.bind),
            });
        }

        if self.store.op_timeout_ms == 0 {
            issues.push(ValidationIssue {
                field: "store.op_timeout_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if self.probe.timeout_ms == 0 {
            issues.push(ValidationIssue {
                field: "probe.timeout_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if self.sampler.max_segments == 0 {
            issues.push(ValidationIssue {
                field: "sampler.max_segments".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.sampler.pool_size == 0 {
            issues.push(ValidationIssue {
                field: "sampler.pool_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            issues.push(ValidationIssue {
                field: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(PathRankError::ValidationError(issues))
        }
    }
}

/// Command-line arguments that override configuration values.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub bind: Option<String>,
    pub base_url: Option<String>,
    pub config_file: Option<PathBuf>,
    pub probe_concurrency: Option<usize>,
    pub sample_seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.store.op_timeout_ms, 250);
        assert_eq!(config.probe.concurrency_limit, 32);
        assert_eq!(config.probe.timeout_ms, 5000);
        assert_eq!(config.sampler.max_segments, 6);
        assert_eq!(config.sampler.pool_size, 3);
        assert_eq!(config.sampler.segment_length, 3);
    }

    fn parse_config_content(content: &str, ext: &str) -> Config {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        let mut path = temp_file.path().to_path_buf();
        path.set_extension(ext);
        std::fs::rename(temp_file.path(), &path).unwrap();
        Config::from_file(&path).unwrap()
    }

    #[test]
    fn test_toml_config_parsing() {
        let c = parse_config_content(
            r#"[server]
bind = "0.0.0.0:8080"
base_url = "http://localhost:8080"

[store]
op_timeout_ms = 100

[probe]
concurrency_limit = 8
timeout_ms = 2000
sample_seed = 42

[sampler]
max_segments = 4
pool_size = 5
segment_length = 2"#,
            "toml",
        );
        assert_eq!(c.server.bind, "0.0.0.0:8080");
        assert_eq!(c.server.base_url, "http://localhost:8080");
        assert_eq!(c.store.op_timeout_ms, 100);
        assert_eq!(c.probe.concurrency_limit, 8);
        assert_eq!(c.probe.sample_seed, Some(42));
        assert_eq!(c.sampler.max_segments, 4);
        assert_eq!(c.sampler.pool_size, 5);
    }

    #[test]
    fn test_json_config_parsing() {
        let c = parse_config_content(
            r#"{"server": {"base_url": "http://localhost:9090"}, "probe": {"concurrency_limit": 4}}"#,
            "json",
        );
        assert_eq!(c.server.base_url, "http://localhost:9090");
        assert_eq!(c.probe.concurrency_limit, 4);
        // untouched sections fall back to defaults
        assert_eq!(c.store.op_timeout_ms, 250);
    }

    #[test]
    fn test_merge_from_cli() {
        let config = Config::default();
        let cli = CliArgs {
            bind: Some("0.0.0.0:9000".to_string()),
            base_url: Some("http://custom:9000".to_string()),
            config_file: None,
            probe_concurrency: Some(2),
            sample_seed: Some(7),
        };

        let merged = config.merge_from_cli(&cli);

        assert_eq!(merged.server.bind, "0.0.0.0:9000");
        assert_eq!(merged.server.base_url, "http://custom:9000");
        assert_eq!(merged.probe.concurrency_limit, 2);
        assert_eq!(merged.probe.sample_seed, Some(7));
    }

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.server.base_url = "".to_string();
        let result = config.validate();
        assert!(matches!(
            result.unwrap_err(),
            PathRankError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_bad_bind_addr() {
        let mut config = Config::default();
        config.server.bind = "not-an-addr".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = Config::default();
        config.store.op_timeout_ms = 0;
        config.probe.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        match err {
            PathRankError::ValidationError(issues) => {
                assert!(issues.iter().any(|i| i.field == "store.op_timeout_ms"));
                assert!(issues.iter().any(|i| i.field == "probe.timeout_ms"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_degenerate_sampler() {
        let mut config = Config::default();
        config.sampler.pool_size = 0;
        config.sampler.max_segments = 0;
        let err = config.validate().unwrap_err();
        match err {
            PathRankError::ValidationError(issues) => assert_eq!(issues.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_log_level() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            let mut config = Config::default();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "level {} should be valid", level);
        }

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
