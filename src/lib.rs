//! # evonet
//!
//! Feed-forward neural networks that learn by backpropagation and evolve by
//! random mutation.
//!
//! ## Features
//!
//! - **Graph based**: neurons and synapses are explicit nodes and edges, so
//!   the topology can be edited at runtime
//! - **Lazy**: neuron outputs are cached until an input changes
//! - **Evolvable**: weight/bias perturbation and hidden-layer insertion
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: one seeded random number generator per network
//!
//! ## Quick Start
//!
//! ```rust
//! use evonet::config::{LayerSpec, NetworkConfig, NetworkSettings};
//! use evonet::data::TrainingSample;
//! use evonet::neural::{ActivationFunction, Network};
//!
//! let config = NetworkConfig::new(
//!     vec![
//!         LayerSpec::input(3),
//!         LayerSpec::new(3, ActivationFunction::Rectified),
//!         LayerSpec::new(1, ActivationFunction::Sigmoid),
//!     ],
//!     NetworkSettings::default(),
//! )
//! .with_seed(1)
//! .with_learning_rate(0.5);
//!
//! let mut network = Network::build(&config).unwrap();
//! let samples = vec![
//!     TrainingSample::new(vec![0.0, 0.0, 0.0], vec![0.0]),
//!     TrainingSample::new(vec![0.0, 0.0, 1.0], vec![1.0]),
//!     TrainingSample::new(vec![1.0, 1.0, 1.0], vec![1.0]),
//! ];
//! network.train(&samples, 100).unwrap();
//!
//! let prediction = network.predict(&[1.0, 1.0, 1.0]).unwrap();
//! assert_eq!(prediction.len(), 1);
//! ```
//!
//! ## Checkpoints
//!
//! ```rust,no_run
//! use evonet::checkpoint::Checkpoint;
//! use evonet::config::NetworkConfig;
//! use evonet::neural::Network;
//!
//! let mut network = Network::build(&NetworkConfig::default()).unwrap();
//! network.mutate();
//!
//! // Save checkpoint
//! Checkpoint::new(&network, 1, None).save("network.bin").unwrap();
//!
//! // Load checkpoint
//! let loaded = Checkpoint::load("network.bin").unwrap();
//! let restored = loaded.restore_network().unwrap();
//! ```

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod neural;
pub mod stats;

// Re-export main types
pub use config::{Config, LayerSpec, NetworkConfig, NetworkSettings};
pub use data::TrainingSample;
pub use neural::{Network, NetworkError, NetworkSnapshot};
pub use stats::TrainingStats;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
