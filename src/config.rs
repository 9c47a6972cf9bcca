use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

// =============================================================================
// Pipeline configuration
// =============================================================================

/// Settings for one producer/consumer run.
///
/// Every field is optional in the TOML source; missing fields fall back to
/// the values of the reference demo (5 items through a 2-slot queue).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Number of values the producer emits (`0..count`).
    pub count: u64,
    /// Fixed queue capacity, at least 1.
    pub capacity: usize,
    /// Pause after each send, in milliseconds.
    pub produce_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            count: 5,
            capacity: 2,
            produce_interval_ms: 0,
        }
    }
}

impl PipelineConfig {
    pub fn new(count: u64, capacity: usize) -> Self {
        Self {
            count,
            capacity,
            ..Self::default()
        }
    }

    pub fn with_produce_interval(mut self, interval: Duration) -> Self {
        self.produce_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn produce_interval(&self) -> Duration {
        Duration::from_millis(self.produce_interval_ms)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::invalid("capacity", "must be at least 1"));
        }
        Ok(())
    }
}

// =============================================================================
// Deadline demo configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeadlineConfig {
    /// Simulated work duration.
    pub work_ms: u64,
    /// Deadline the work races against.
    pub deadline_ms: u64,
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            work_ms: 2_000,
            deadline_ms: 5_000,
        }
    }
}

impl DeadlineConfig {
    pub fn work(&self) -> Duration {
        Duration::from_millis(self.work_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config(path)?;
        Self::from_toml_str(&content)
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_reference_demo() {
        let config = PipelineConfig::default();
        assert_eq!(config.count, 5);
        assert_eq!(config.capacity, 2);
        assert_eq!(config.produce_interval(), Duration::ZERO);
    }

    #[test]
    fn test_parse_partial_toml_fills_defaults() {
        let config = PipelineConfig::from_toml_str("count = 3\n").unwrap();
        assert_eq!(config, PipelineConfig::new(3, 2));
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = "count = 10\ncapacity = 4\nproduce_interval_ms = 100\n";
        let config = PipelineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.count, 10);
        assert_eq!(config.capacity, 4);
        assert_eq!(config.produce_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = PipelineConfig::from_toml_str("capacity = 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { ref field, .. }) if field == "capacity"
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = PipelineConfig::from_toml_str("capacty = 3\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_negative_count_rejected() {
        let result = PipelineConfig::from_toml_str("count = -1\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "count = 7").unwrap();
        writeln!(file, "capacity = 1").unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config, PipelineConfig::new(7, 1));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let result = PipelineConfig::from_file(Path::new("/definitely/not/here.toml"));
        match result {
            Err(ConfigError::Read { path, .. }) => {
                assert_eq!(path, Path::new("/definitely/not/here.toml"));
            }
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn test_with_produce_interval() {
        let config = PipelineConfig::new(1, 1).with_produce_interval(Duration::from_millis(25));
        assert_eq!(config.produce_interval_ms, 25);
    }

    #[test]
    fn test_huge_produce_interval_saturates() {
        let config = PipelineConfig::new(1, 1).with_produce_interval(Duration::MAX);
        assert_eq!(config.produce_interval_ms, u64::MAX);
    }

    #[test]
    fn test_deadline_defaults_and_parse() {
        let defaults = DeadlineConfig::default();
        assert_eq!(defaults.work(), Duration::from_secs(2));
        assert_eq!(defaults.deadline(), Duration::from_secs(5));

        let config = DeadlineConfig::from_toml_str("deadline_ms = 500\n").unwrap();
        assert_eq!(config.work_ms, 2_000);
        assert_eq!(config.deadline(), Duration::from_millis(500));
    }
}
