//! Evolutionary mutations: weight/bias perturbation and layer insertion.
//!
//! Every random decision is drawn from the network's own RNG so that a fixed
//! seed reproduces the same sequence of mutations.

use super::activation::{ActivationFunction, InputFunction};
use super::error::NetworkError;
use super::network::{Network, INIT_HIGH, INIT_LOW};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for mutation operations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Probability that a layer is visited at all
    pub layer_rate: f64,
    /// Probability of perturbing a visited neuron's bias
    pub neuron_rate: f64,
    /// Probability of perturbing each input/output synapse of a visited neuron
    pub synapse_rate: f64,
    /// Probability of inserting a new hidden layer
    pub add_layer_rate: f64,
    /// Maximum hidden layers allowed
    pub max_hidden_layers: usize,
    /// Activation of inserted layers
    pub inserted_activation: ActivationFunction,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            layer_rate: 0.5,
            neuron_rate: 0.5,
            synapse_rate: 0.2,
            add_layer_rate: 0.05,
            max_hidden_layers: 8,
            inserted_activation: ActivationFunction::Rectified,
        }
    }
}

impl MutationConfig {
    /// Settings that never touch the network
    pub fn disabled() -> Self {
        Self {
            layer_rate: 0.0,
            neuron_rate: 0.0,
            synapse_rate: 0.0,
            add_layer_rate: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        let rates = [
            ("layer_rate", self.layer_rate),
            ("neuron_rate", self.neuron_rate),
            ("synapse_rate", self.synapse_rate),
            ("add_layer_rate", self.add_layer_rate),
        ];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(NetworkError::Configuration(format!(
                    "{} must be in [0, 1], got {}",
                    name, rate
                )));
            }
        }
        Ok(())
    }
}

/// What a single [`Network::mutate`] call changed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    pub biases_perturbed: usize,
    pub weights_perturbed: usize,
    /// Index of the inserted layer, if any
    pub inserted_layer: Option<usize>,
}

impl Network {
    /// Apply one round of weight and structural mutation
    pub fn mutate(&mut self) -> MutationOutcome {
        let (biases_perturbed, weights_perturbed) = self.mutate_weights();
        let inserted_layer = self.maybe_insert_layer();

        let outcome = MutationOutcome {
            biases_perturbed,
            weights_perturbed,
            inserted_layer,
        };
        log::debug!("Mutation: {:?}", outcome);
        outcome
    }

    /// Perturb biases and weights; returns (biases, weights) touched
    pub fn mutate_weights(&mut self) -> (usize, usize) {
        let MutationConfig {
            layer_rate,
            neuron_rate,
            synapse_rate,
            ..
        } = self.mutation;

        let mut biases = 0;
        let mut weights = 0;
        for layer in 0..self.layers.len() {
            if self.rng.gen::<f64>() >= layer_rate {
                continue;
            }

            for i in 0..self.layers[layer].neurons.len() {
                let id = self.layers[layer].neurons[i];

                if self.rng.gen::<f64>() < neuron_rate {
                    self.neurons[id.0].bias += self.rng.gen_range(INIT_LOW..INIT_HIGH);
                    biases += 1;
                }

                let edges = self.neurons[id.0].input_synapses.len()
                    + self.neurons[id.0].output_synapses.len();
                for k in 0..edges {
                    let neuron = &self.neurons[id.0];
                    let synapse = if k < neuron.input_synapses.len() {
                        neuron.input_synapses[k]
                    } else {
                        neuron.output_synapses[k - neuron.input_synapses.len()]
                    };
                    if self.rng.gen::<f64>() < synapse_rate {
                        let delta = self.rng.gen_range(INIT_LOW..INIT_HIGH);
                        self.synapse_mut(synapse).adjust_weight(delta);
                        weights += 1;
                    }
                }
            }
        }

        if biases + weights > 0 {
            self.mark_dirty();
        }
        (biases, weights)
    }

    /// With `add_layer_rate` probability, insert a hidden layer of random
    /// width (1 to input width) at a random position between input and output
    pub fn maybe_insert_layer(&mut self) -> Option<usize> {
        if self.rng.gen::<f64>() >= self.mutation.add_layer_rate {
            return None;
        }
        if self.layers.len() - 2 >= self.mutation.max_hidden_layers {
            log::debug!("Layer insertion skipped: {} hidden layers", self.layers.len() - 2);
            return None;
        }

        let size = self.rng.gen_range(1..=self.input_layer().len());
        let index = self.rng.gen_range(1..self.layers.len());
        let activation = self.mutation.inserted_activation;
        match self.insert_layer(index, size, activation) {
            Ok(()) => Some(index),
            Err(e) => {
                log::warn!("Layer insertion failed: {}", e);
                None
            }
        }
    }

    /// Insert a fully connected hidden layer of `size` neurons at `index`.
    ///
    /// The new layer reads from the layer at `index - 1`. The layer that was
    /// at `index` loses all of its incoming synapses and is reconnected
    /// densely to the new layer.
    pub fn insert_layer(
        &mut self,
        index: usize,
        size: usize,
        activation: ActivationFunction,
    ) -> Result<(), NetworkError> {
        if index == 0 || index >= self.layers.len() {
            return Err(NetworkError::Configuration(format!(
                "layer index {} is not between the input and output layers",
                index
            )));
        }
        if size == 0 {
            return Err(NetworkError::Configuration(
                "inserted layer needs at least one neuron".to_string(),
            ));
        }

        let layer = self.create_layer(size, activation, InputFunction::WeightedSum);
        let predecessor = self.layers[index - 1].neurons.clone();
        let successor = self.layers[index].neurons.clone();

        self.connect_dense(&predecessor, &layer.neurons);
        for &id in &successor {
            self.sever_inputs(id);
        }
        self.connect_dense(&layer.neurons, &successor);

        self.layers.insert(index, layer);
        self.mark_dirty();

        log::info!(
            "Inserted {}-neuron {} layer at index {}: {:?}",
            size,
            activation.name(),
            index,
            self.layer_sizes()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayerSpec, NetworkConfig, NetworkSettings};

    fn network(mutation: MutationConfig, seed: u64) -> Network {
        let config = NetworkConfig::new(
            vec![
                LayerSpec::input(4),
                LayerSpec::new(3, ActivationFunction::Rectified),
                LayerSpec::new(2, ActivationFunction::Sigmoid),
            ],
            NetworkSettings::default(),
        )
        .with_mutation(mutation)
        .with_seed(seed);
        Network::build(&config).unwrap()
    }

    fn weights(net: &Network) -> Vec<f64> {
        net.synapses().map(|(_, s)| s.weight()).collect()
    }

    #[test]
    fn test_weight_mutation() {
        let config = MutationConfig {
            layer_rate: 1.0,
            neuron_rate: 1.0,
            synapse_rate: 1.0,
            add_layer_rate: 0.0,
            ..MutationConfig::default()
        };
        let mut net = network(config, 1);
        let original = weights(&net);

        let outcome = net.mutate();
        assert_eq!(outcome.biases_perturbed, 9);
        // every synapse is reached once from each endpoint
        assert_eq!(outcome.weights_perturbed, 2 * original.len());
        assert_eq!(outcome.inserted_layer, None);

        let changed = weights(&net)
            .iter()
            .zip(original.iter())
            .any(|(a, b)| (a - b).abs() > 1e-10);
        assert!(changed, "Weights should change after mutation");

        for (_, synapse) in net.synapses() {
            assert!(synapse.previous_weight().is_finite());
        }
    }

    #[test]
    fn test_disabled_mutation_is_noop() {
        let mut net = network(MutationConfig::disabled(), 1);
        let original = weights(&net);
        let outcome = net.mutate();
        assert_eq!(outcome, MutationOutcome::default());
        assert_eq!(weights(&net), original);
    }

    #[test]
    fn test_mutation_invalidates_cache() {
        let config = MutationConfig {
            layer_rate: 1.0,
            neuron_rate: 1.0,
            add_layer_rate: 0.0,
            ..MutationConfig::default()
        };
        let mut net = network(config, 2);
        net.predict(&[1.0, 0.0, 1.0, 0.0]).unwrap();
        net.mutate();
        let out = net.output_layer().neurons()[0];
        assert!(net.neuron(out).is_dirty());
    }

    #[test]
    fn test_insert_layer_rewires() {
        let mut net = network(MutationConfig::disabled(), 3);
        net.insert_layer(2, 5, ActivationFunction::LeakyRelu).unwrap();

        assert_eq!(net.layer_sizes(), vec![4, 3, 5, 2]);
        assert_eq!(net.synapse_count(), 4 * 3 + 3 * 5 + 5 * 2);
        assert!(net.has_valid_topology());
        assert_eq!(net.layers()[2].activation(), ActivationFunction::LeakyRelu);

        // The output layer now reads only from the inserted layer
        let inserted = net.layers()[2].neurons().to_vec();
        for &out in net.output_layer().neurons() {
            for &s in net.neuron(out).input_synapses() {
                assert!(inserted.contains(&net.synapse(s).input()));
            }
        }
        for &h in net.layers()[1].neurons() {
            assert_eq!(net.neuron(h).output_synapses().len(), 5);
        }

        let outputs = net.predict(&[0.5, 0.5, 0.5, 0.5]).unwrap();
        assert_eq!(outputs.len(), 2);
    }

    #[test]
    fn test_insert_directly_after_input() {
        let mut net = network(MutationConfig::disabled(), 4);
        net.insert_layer(1, 2, ActivationFunction::Sigmoid).unwrap();
        assert_eq!(net.layer_sizes(), vec![4, 2, 3, 2]);
        assert!(net.has_valid_topology());
    }

    #[test]
    fn test_insert_layer_bounds() {
        let mut net = network(MutationConfig::disabled(), 4);
        assert!(net.insert_layer(0, 2, ActivationFunction::Sigmoid).is_err());
        assert!(net.insert_layer(3, 2, ActivationFunction::Sigmoid).is_err());
        assert!(net.insert_layer(1, 0, ActivationFunction::Sigmoid).is_err());
        assert_eq!(net.layer_sizes(), vec![4, 3, 2]);
    }

    #[test]
    fn test_mutation_preserves_validity() {
        let config = MutationConfig {
            layer_rate: 0.5,
            neuron_rate: 0.5,
            synapse_rate: 0.5,
            add_layer_rate: 0.5,
            max_hidden_layers: 6,
            inserted_activation: ActivationFunction::Rectified,
        };
        let mut net = network(config, 5);

        // Apply many mutations
        for _ in 0..100 {
            let outcome = net.mutate();
            assert!(net.has_valid_topology());
            if let Some(index) = outcome.inserted_layer {
                let size = net.layers()[index].len();
                assert!((1..=4).contains(&size));
            }
        }

        assert!(net.is_valid(), "Network should remain valid after mutations");
        assert!(net.layers().len() > 3);
        assert!(net.layers().len() <= 2 + 6);

        // Forward pass should still work
        let outputs = net.predict(&[0.5; 4]).unwrap();
        assert!(outputs.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_validate_rates() {
        let mut config = MutationConfig::default();
        assert!(config.validate().is_ok());
        config.synapse_rate = 1.5;
        assert!(config.validate().is_err());
    }
}
