//! Run configuration: built-in defaults, an optional TOML file, CLI overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "paperpulse.toml";

pub const DEFAULT_ALPHA: f64 = 1.7;
pub const DEFAULT_TOP_K: usize = 200;
pub const DEFAULT_WINDOW_YEARS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub scoring: Option<ScoringSection>,
    pub forecast: Option<ForecastSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringSection {
    pub alpha: Option<f64>,
    pub top_k: Option<usize>,
    pub window_years: Option<u32>,
    pub newest_year: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastSection {
    pub forecast_year: Option<i64>,
}

/// Hot-index scoring parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Weight of the normalised trend slope.
    pub alpha: f64,
    /// Keywords kept per conference.
    pub top_k: usize,
    /// Number of years in the observation window, ending at `newest_year`.
    pub window_years: u32,
    /// Last year of the window; `None` means the newest year in the data.
    pub newest_year: Option<i64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            top_k: DEFAULT_TOP_K,
            window_years: DEFAULT_WINDOW_YEARS,
            newest_year: None,
        }
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub scoring: ScoringConfig,
    /// Year stamped on synthesized forecast rows; `None` means newest observed + 1.
    pub forecast_year: Option<i64>,
}

impl PipelineConfig {
    /// Apply a config file on top of the built-in defaults.
    pub fn from_file(file: &ConfigFile) -> Self {
        let mut config = Self::default();
        if let Some(s) = &file.scoring {
            if let Some(alpha) = s.alpha {
                config.scoring.alpha = alpha;
            }
            if let Some(top_k) = s.top_k {
                config.scoring.top_k = top_k;
            }
            if let Some(window) = s.window_years {
                config.scoring.window_years = window;
            }
            if s.newest_year.is_some() {
                config.scoring.newest_year = s.newest_year;
            }
        }
        if let Some(f) = &file.forecast
            && f.forecast_year.is_some()
        {
            config.forecast_year = f.forecast_year;
        }
        config
    }

    /// Reject values the scorer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scoring.alpha.is_finite() {
            return Err(ConfigError::Invalid {
                field: "alpha",
                reason: format!("must be finite, got {}", self.scoring.alpha),
            });
        }
        if self.scoring.top_k == 0 {
            return Err(ConfigError::Invalid {
                field: "top_k",
                reason: "must be at least 1".into(),
            });
        }
        if self.scoring.window_years == 0 {
            return Err(ConfigError::Invalid {
                field: "window_years",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Load a config file from a specific path.
pub fn load_from_path(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the explicit config if given (it must exist), else `./paperpulse.toml`
/// when present, else an empty config.
pub fn load_config(explicit: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    match explicit {
        Some(path) => load_from_path(path),
        None => {
            let cwd = Path::new(DEFAULT_CONFIG_FILE);
            if cwd.exists() {
                load_from_path(cwd)
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_published_parameters() {
        let config = PipelineConfig::default();
        assert_eq!(config.scoring.alpha, 1.7);
        assert_eq!(config.scoring.top_k, 200);
        assert_eq!(config.scoring.window_years, 5);
        assert!(config.scoring.newest_year.is_none());
        assert!(config.forecast_year.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let file: ConfigFile = toml::from_str(
            r#"
            [scoring]
            alpha = 2.5
            newest_year = 2024
            "#,
        )
        .unwrap();
        let config = PipelineConfig::from_file(&file);
        assert_eq!(config.scoring.alpha, 2.5);
        assert_eq!(config.scoring.newest_year, Some(2024));
        assert_eq!(config.scoring.top_k, 200);
        assert!(config.forecast_year.is_none());
    }

    #[test]
    fn forecast_section_sets_year() {
        let file: ConfigFile = toml::from_str("[forecast]\nforecast_year = 2026\n").unwrap();
        assert_eq!(PipelineConfig::from_file(&file).forecast_year, Some(2026));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.scoring.alpha = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "alpha", .. })
        ));

        let mut config = PipelineConfig::default();
        config.scoring.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.scoring.window_years = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_path_reads_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("paperpulse.toml");
        std::fs::write(&path, "[scoring]\ntop_k = 50\n").unwrap();
        let file = load_from_path(&path).unwrap();
        assert_eq!(file.scoring.unwrap().top_k, Some(50));
    }

    #[test]
    fn explicit_missing_config_errors() {
        let err = load_config(Some(Path::new("/nonexistent/paperpulse.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "[scoring\nalpha = ").unwrap();
        assert!(matches!(
            load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
