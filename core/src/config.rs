use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::delay::{WAIT, millis};
use crate::errors::{ConfigError, Result};

/// Environment variable holding an inline YAML configuration.
pub const CONFIG_ENV: &str = "GREETER_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GreeterConfig {
    pub version: u32,
    pub telemetry: TelemetryConfig,
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG` when set.
    pub filter: String,
    pub format: LogFormat,
    pub ansi: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Plain,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Upper bound for a single invocation. `None` leaves it unbounded.
    pub timeout_ms: Option<u64>,
    /// How many events the local runner invokes at once.
    pub max_concurrency: usize,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            telemetry: TelemetryConfig::default(),
            runner: RunnerConfig::default(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Plain,
            ansi: true,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            max_concurrency: 16,
        }
    }
}

/// Loads from `config_path` when given, otherwise from [`CONFIG_ENV`],
/// otherwise falls back to defaults. The result is validated.
pub fn load_config(config_path: Option<&Path>) -> Result<GreeterConfig> {
    let config = match config_path {
        Some(path) => GreeterConfig::from_file(path)?,
        None => match GreeterConfig::from_env()? {
            Some(config) => config,
            None => GreeterConfig::default(),
        },
    };
    config.validate()?;
    Ok(config)
}

impl GreeterConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            origin: path.display().to_string(),
            error: Box::new(e),
        })?;
        Self::from_yaml(&content)
    }

    /// Returns `Ok(None)` when the variable is unset.
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(CONFIG_ENV) {
            Ok(content) => Self::from_yaml(&content).map(Some),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::LoadFailed {
                origin: CONFIG_ENV.to_string(),
                error: Box::new(e),
            }
            .into()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document is a valid "all defaults" configuration.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: GreeterConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ConfigError::ValidationFailed {
                reason: format!("unsupported config version {}", self.version),
            }
            .into());
        }
        if self.telemetry.filter.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "telemetry.filter".to_string(),
            }
            .into());
        }
        if self.runner.max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                message: "runner.max_concurrency must be at least 1".to_string(),
            }
            .into());
        }
        if let Some(timeout_ms) = self.runner.timeout_ms {
            let wait_ms = millis(WAIT);
            if timeout_ms <= wait_ms {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "runner.timeout_ms ({timeout_ms}) must exceed the {wait_ms} ms delay"
                    ),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GreeterError;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
version: 1
telemetry:
  filter: "greeter_core=debug"
  format: json
  ansi: false
runner:
  timeout_ms: 500
  max_concurrency: 4
"#;
        let config = GreeterConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.telemetry.filter, "greeter_core=debug");
        assert_eq!(config.telemetry.format, LogFormat::Json);
        assert!(!config.telemetry.ansi);
        assert_eq!(config.runner.timeout_ms, Some(500));
        assert_eq!(config.runner.max_concurrency, 4);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = GreeterConfig::from_yaml("runner:\n  timeout_ms: 250\n").unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.telemetry, TelemetryConfig::default());
        assert_eq!(config.runner.max_concurrency, 16);
        assert_eq!(config.runner.timeout_ms, Some(250));
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(GreeterConfig::from_yaml("").unwrap(), GreeterConfig::default());
    }

    #[test]
    fn test_validate_rejects_timeout_within_delay() {
        let mut config = GreeterConfig::default();
        config.runner.timeout_ms = Some(100);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GreeterError::Config(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut config = GreeterConfig::default();
        config.version = 2;
        assert!(config.validate().is_err());

        let mut config = GreeterConfig::default();
        config.runner.max_concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = GreeterConfig::default();
        config.telemetry.filter = "  ".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            GreeterError::Config(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "runner:\n  max_concurrency: 2").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.runner.max_concurrency, 2);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(
            err,
            GreeterError::Config(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml_is_serialization_error() {
        let err = GreeterConfig::from_yaml("runner: [").unwrap_err();
        assert!(matches!(err, GreeterError::Serialization(_)));
    }

    // Single test so nothing else in this binary touches CONFIG_ENV concurrently.
    #[test]
    fn test_load_config_from_env() {
        // SAFETY: no other test in this crate reads or writes CONFIG_ENV.
        unsafe { std::env::set_var(CONFIG_ENV, "runner:\n  max_concurrency: 3\n") };
        let config = load_config(None).unwrap();
        assert_eq!(config.runner.max_concurrency, 3);
        assert_eq!(config.telemetry, TelemetryConfig::default());

        unsafe { std::env::set_var(CONFIG_ENV, "runner:\n  max_concurrency: 0\n") };
        assert!(matches!(
            load_config(None).unwrap_err(),
            GreeterError::Config(ConfigError::Invalid { .. })
        ));

        unsafe { std::env::set_var(CONFIG_ENV, "  ") };
        assert_eq!(load_config(None).unwrap(), GreeterConfig::default());

        unsafe { std::env::remove_var(CONFIG_ENV) };
        assert_eq!(GreeterConfig::from_env().unwrap(), None);
        assert_eq!(load_config(None).unwrap(), GreeterConfig::default());

        #[cfg(unix)]
        {
            use std::ffi::OsString;
            use std::os::unix::ffi::OsStringExt;

            unsafe { std::env::set_var(CONFIG_ENV, OsString::from_vec(vec![0x66, 0x80])) };
            let err = GreeterConfig::from_env().unwrap_err();
            assert!(matches!(
                err,
                GreeterError::Config(ConfigError::LoadFailed { ref origin, .. }) if origin == CONFIG_ENV
            ));
            unsafe { std::env::remove_var(CONFIG_ENV) };
        }
    }
}
