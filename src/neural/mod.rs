//! Neural network engine.
//!
//! Implements an evolvable feed-forward network with:
//! - Arena-backed neuron/synapse graph with lazily cached outputs
//! - Backpropagation training
//! - Weight mutations and structural mutations (layer insertion)
//! - Parameter snapshots

mod activation;
mod error;
mod layer;
mod loss;
mod mutations;
mod network;
mod neuron;
mod snapshot;
mod synapse;
mod training;

pub use activation::{ActivationFunction, InputFunction, LEAKY_SLOPE};
pub use error::NetworkError;
pub use layer::Layer;
pub use loss::ErrorFunction;
pub use mutations::{MutationConfig, MutationOutcome};
pub use network::{Network, INIT_HIGH, INIT_LOW};
pub use neuron::{Neuron, NeuronId};
pub use snapshot::{LayerSnapshot, NetworkSnapshot, NeuronSnapshot};
pub use synapse::{Synapse, SynapseId};
