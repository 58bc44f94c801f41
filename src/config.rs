use std::path::Path;

use crate::error::ConfigError;
use crate::training::trainer::TrainerConfig;

/// Q-learning hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub alpha: f64,
    pub gamma: f64,
    pub epsilon: f64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        QLearningConfig {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.2,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub qlearning: QLearningConfig,
    pub training: TrainerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!(
                "Warning: config file '{}' not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("qlearning.alpha", self.qlearning.alpha),
            ("qlearning.gamma", self.qlearning.gamma),
            ("qlearning.epsilon", self.qlearning.epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be in [0, 1]"
                )));
            }
        }
        if self.training.num_episodes == 0 {
            return Err(ConfigError::Validation(
                "training.num_episodes must be > 0".into(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
        assert!((config.qlearning.alpha - 0.1).abs() < 1e-12);
        assert!((config.qlearning.gamma - 0.9).abs() < 1e-12);
        assert!((config.qlearning.epsilon - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[qlearning]
alpha = 0.05
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!((config.qlearning.alpha - 0.05).abs() < 1e-12);
        assert!((config.qlearning.gamma - 0.9).abs() < 1e-12);
        assert_eq!(config.training.num_episodes, 5_000);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        let default = AppConfig::default();
        assert!((config.qlearning.alpha - default.qlearning.alpha).abs() < 1e-12);
        assert_eq!(config.training.num_episodes, default.training.num_episodes);
        assert_eq!(config.training.wildcard_count, None);
    }

    #[test]
    fn test_validation_rejects_alpha_out_of_range() {
        let mut config = AppConfig::default();
        config.qlearning.alpha = 1.5;
        assert!(config.validate().is_err());
        config.qlearning.alpha = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_gamma_out_of_range() {
        let mut config = AppConfig::default();
        config.qlearning.gamma = 1.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_epsilon_out_of_range() {
        let mut config = AppConfig::default();
        config.qlearning.epsilon = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_episodes() {
        let mut config = AppConfig::default();
        config.training.num_episodes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_log_interval() {
        let mut config = AppConfig::default();
        config.training.log_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.training.num_episodes, 5_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[training]
num_episodes = 500
wildcard_count = 3
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.training.num_episodes, 500);
        assert_eq!(config.training.wildcard_count, Some(3));
        // Others are defaults
        assert!((config.qlearning.alpha - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        std::fs::write(&path, "[qlearning]\nepsilon = 1.5\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config
            .validate()
            .expect("roundtripped config should be valid");
    }
}
