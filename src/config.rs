//! Configuration for networks, training runs and the CLI.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::neural::{ActivationFunction, ErrorFunction, InputFunction, MutationConfig, NetworkError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Everything needed to build a [`Network`](crate::neural::Network)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Layer specs, input layer first and output layer last
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub settings: NetworkSettings,
    #[serde(default)]
    pub mutation: MutationConfig,
}

/// One layer of the network
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Number of neurons in the layer
    pub neurons: usize,
    #[serde(default)]
    pub activation: ActivationFunction,
    #[serde(default)]
    pub input_function: InputFunction,
}

/// Global network settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Loss used for output-layer gradients and validation
    pub error_function: ErrorFunction,
    /// RNG seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Trailing fraction of each sample set held back for validation
    pub validation_fraction: f64,
}

/// Training run settings used by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Epochs per `train` invocation
    pub epochs: usize,
    /// Min-max normalize samples before training
    pub normalize: bool,
}

/// Logging and checkpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Mutation rounds between checkpoints
    pub checkpoint_interval: u64,
    /// Checkpoint files kept on disk
    pub max_checkpoints: usize,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl LayerSpec {
    pub fn new(neurons: usize, activation: ActivationFunction) -> Self {
        Self {
            neurons,
            activation,
            input_function: InputFunction::WeightedSum,
        }
    }

    /// Input layer spec; its activation is never consulted
    pub fn input(neurons: usize) -> Self {
        Self::new(neurons, ActivationFunction::default())
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.02,
            error_function: ErrorFunction::PowerDifference,
            seed: None,
            validation_fraction: 0.2,
        }
    }
}

impl Default for NetworkConfig {
    /// 3 inputs, one rectified hidden layer of 3, one sigmoid output
    fn default() -> Self {
        Self {
            layers: vec![
                LayerSpec::input(3),
                LayerSpec::new(3, ActivationFunction::Rectified),
                LayerSpec::new(1, ActivationFunction::Sigmoid),
            ],
            settings: NetworkSettings::default(),
            mutation: MutationConfig::default(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 400,
            normalize: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: 50,
            max_checkpoints: 10,
            log_level: "info".to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn new(layers: Vec<LayerSpec>, settings: NetworkSettings) -> Self {
        Self {
            layers,
            settings,
            mutation: MutationConfig::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.settings.learning_rate = learning_rate;
        self
    }

    pub fn with_mutation(mut self, mutation: MutationConfig) -> Self {
        self.mutation = mutation;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.layers.len() < 2 {
            return Err(NetworkError::Configuration(
                "at least two layers (input & output) are required".to_string(),
            ));
        }
        if let Some(i) = self.layers.iter().position(|l| l.neurons == 0) {
            return Err(NetworkError::Configuration(format!("layer {} has no neurons", i)));
        }
        let lr = self.settings.learning_rate;
        if !lr.is_finite() || lr <= 0.0 {
            return Err(NetworkError::Configuration(
                "learning_rate must be a positive finite number".to_string(),
            ));
        }
        let fraction = self.settings.validation_fraction;
        if !(0.0..1.0).contains(&fraction) {
            return Err(NetworkError::Configuration(
                "validation_fraction must be in [0, 1)".to_string(),
            ));
        }
        self.mutation.validate()
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), NetworkError> {
        self.network.validate()?;
        if self.logging.checkpoint_interval == 0 {
            return Err(NetworkError::Configuration(
                "checkpoint_interval must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network.layers.len(), 3);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.network.layers, loaded.network.layers);
        assert_eq!(config.network.settings, loaded.network.settings);
    }

    #[test]
    fn test_single_layer_rejected() {
        let config = NetworkConfig::new(vec![LayerSpec::input(3)], NetworkSettings::default());
        assert!(matches!(config.validate(), Err(NetworkError::Configuration(_))));
    }

    #[test]
    fn test_empty_layer_rejected() {
        let config = NetworkConfig::new(
            vec![LayerSpec::input(3), LayerSpec::new(0, ActivationFunction::Sigmoid)],
            NetworkSettings::default(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_learning_rate_rejected() {
        let config = NetworkConfig::default().with_learning_rate(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r#"
network:
  layers:
    - neurons: 2
    - neurons: 1
      activation: sigmoid
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.network.layers[1].activation, ActivationFunction::Sigmoid);
        assert_eq!(config.network.settings.learning_rate, 0.02);
        assert_eq!(config.training.epochs, 400);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.network.settings.seed = Some(7);
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.network.settings.seed, Some(7));
    }
}
