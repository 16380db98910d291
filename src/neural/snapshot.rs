//! Learned-parameter snapshots.
//!
//! A snapshot is the nested ordered list of layers, neurons and each neuron's
//! bias plus input weights. Strategies (activation, error function) are not
//! part of it; the network a snapshot is restored into supplies them.

use super::error::NetworkError;
use super::layer::Layer;
use super::network::Network;
use super::neuron::Neuron;
use serde::{Deserialize, Serialize};

/// Parameters of one neuron
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeuronSnapshot {
    pub bias: f64,
    /// Input synapse weights in edge-list order
    pub weights: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub neurons: Vec<NeuronSnapshot>,
}

/// Complete learned state of a network
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub layers: Vec<LayerSnapshot>,
}

impl NetworkSnapshot {
    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.neurons.len()).collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check that the snapshot describes a densely layered network
    fn validate_shape(&self) -> Result<(), NetworkError> {
        if self.layers.len() < 2 {
            return Err(NetworkError::StructuralMismatch(format!(
                "snapshot has {} layers, at least 2 are required",
                self.layers.len()
            )));
        }

        let mut previous = 0;
        for (l, layer) in self.layers.iter().enumerate() {
            if layer.neurons.is_empty() {
                return Err(NetworkError::StructuralMismatch(format!(
                    "snapshot layer {} has no neurons",
                    l
                )));
            }
            for (n, neuron) in layer.neurons.iter().enumerate() {
                if neuron.weights.len() != previous {
                    return Err(NetworkError::StructuralMismatch(format!(
                        "neuron {} of layer {} has {} weights, expected {}",
                        n,
                        l,
                        neuron.weights.len(),
                        previous
                    )));
                }
            }
            previous = layer.neurons.len();
        }
        Ok(())
    }
}

impl Network {
    /// Capture every bias and input weight in layer/neuron/synapse order
    pub fn snapshot(&self) -> NetworkSnapshot {
        let layers = self
            .layers
            .iter()
            .map(|layer| LayerSnapshot {
                neurons: layer
                    .neurons
                    .iter()
                    .map(|&id| {
                        let neuron = self.neuron(id);
                        NeuronSnapshot {
                            bias: neuron.bias(),
                            weights: neuron
                                .input_synapses()
                                .iter()
                                .map(|&s| self.synapse(s).weight())
                                .collect(),
                        }
                    })
                    .collect(),
            })
            .collect();
        NetworkSnapshot { layers }
    }

    /// Replace every bias and weight with those of `snapshot`.
    ///
    /// The snapshot is validated in full before anything is touched: its
    /// layer and neuron counts must equal the live network's, and every
    /// neuron must carry one weight per neuron of the previous layer. On
    /// error the network is unchanged. Layers keep their strategies.
    pub fn restore(&mut self, snapshot: &NetworkSnapshot) -> Result<(), NetworkError> {
        snapshot.validate_shape()?;

        let sizes = snapshot.layer_sizes();
        let live = self.layer_sizes();
        if sizes != live {
            return Err(NetworkError::StructuralMismatch(format!(
                "snapshot layers {:?} do not match network layers {:?}",
                sizes, live
            )));
        }

        let strategies: Vec<_> = self
            .layers
            .iter()
            .map(|l| (l.activation(), l.input_function()))
            .collect();
        self.clear_topology();

        for (layer_snapshot, (activation, input_function)) in
            snapshot.layers.iter().zip(strategies)
        {
            let mut layer = Layer::new(activation, input_function);
            let previous = self.layers.last().map(|l| l.neurons.clone());

            for neuron_snapshot in &layer_snapshot.neurons {
                let id = self.push_neuron(Neuron::new(
                    activation,
                    input_function,
                    neuron_snapshot.bias,
                ));
                if let Some(previous) = &previous {
                    for (&input, &weight) in previous.iter().zip(&neuron_snapshot.weights) {
                        self.connect(input, id, weight);
                    }
                }
                layer.neurons.push(id);
            }
            self.layers.push(layer);
        }

        log::info!("Restored network {:?}", self.layer_sizes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayerSpec, NetworkConfig, NetworkSettings};
    use crate::neural::{ActivationFunction, MutationConfig};

    fn config(seed: u64) -> NetworkConfig {
        NetworkConfig::new(
            vec![
                LayerSpec::input(3),
                LayerSpec::new(4, ActivationFunction::LeakyRelu),
                LayerSpec::new(2, ActivationFunction::Sigmoid),
            ],
            NetworkSettings::default(),
        )
        .with_mutation(MutationConfig::disabled())
        .with_seed(seed)
    }

    #[test]
    fn test_snapshot_shape() {
        let net = Network::build(&config(1)).unwrap();
        let snapshot = net.snapshot();
        assert_eq!(snapshot.layer_sizes(), vec![3, 4, 2]);
        assert!(snapshot.layers[0].neurons.iter().all(|n| n.weights.is_empty()));
        assert!(snapshot.layers[1].neurons.iter().all(|n| n.weights.len() == 3));
        assert!(snapshot.layers[2].neurons.iter().all(|n| n.weights.len() == 4));
    }

    #[test]
    fn test_roundtrip_reproduces_predictions() {
        let mut source = Network::build(&config(1)).unwrap();
        let mut target = Network::build(&config(2)).unwrap();
        let inputs = [0.3, -0.2, 0.9];

        target.restore(&source.snapshot()).unwrap();

        let a = source.predict(&inputs).unwrap();
        let b = target.predict(&inputs).unwrap();
        assert_eq!(
            a.iter().map(|x| x.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|x| x.to_bits()).collect::<Vec<_>>()
        );
        assert_eq!(source.snapshot(), target.snapshot());
    }

    #[test]
    fn test_restore_keeps_layer_strategies() {
        let source = Network::build(&config(1)).unwrap();
        let mut target = Network::build(&config(2)).unwrap();
        target.restore(&source.snapshot()).unwrap();
        assert_eq!(target.layers()[1].activation(), ActivationFunction::LeakyRelu);
        assert_eq!(target.layers()[2].activation(), ActivationFunction::Sigmoid);
    }

    #[test]
    fn test_restore_rejects_different_hidden_shape() {
        let mut grown = Network::build(&config(1)).unwrap();
        grown.insert_layer(2, 2, ActivationFunction::Sigmoid).unwrap();
        let mut net = Network::build(&config(3)).unwrap();
        let before = net.snapshot();

        let err = net.restore(&grown.snapshot()).unwrap_err();
        assert!(matches!(err, NetworkError::StructuralMismatch(_)));

        let mut wider = Network::build(&config(2)).unwrap().snapshot();
        wider.layers[1].neurons.push(NeuronSnapshot {
            bias: 0.0,
            weights: vec![0.1; 3],
        });
        for neuron in &mut wider.layers[2].neurons {
            neuron.weights.push(0.1);
        }
        let err = net.restore(&wider).unwrap_err();
        assert!(matches!(err, NetworkError::StructuralMismatch(_)));

        assert_eq!(net.snapshot(), before);
        assert_eq!(net.layers()[1].activation(), ActivationFunction::LeakyRelu);
    }

    #[test]
    fn test_grown_topology_restores_through_its_config() {
        let mut grown = Network::build(&config(1)).unwrap();
        grown.insert_layer(2, 2, ActivationFunction::Sigmoid).unwrap();

        let mut rebuilt = Network::build(&grown.config()).unwrap();
        rebuilt.restore(&grown.snapshot()).unwrap();
        assert_eq!(rebuilt.layer_sizes(), vec![3, 4, 2, 2]);
        assert_eq!(rebuilt.layers()[2].activation(), ActivationFunction::Sigmoid);
        assert!(rebuilt.has_valid_topology());
        assert_eq!(rebuilt.snapshot(), grown.snapshot());
    }

    #[test]
    fn test_bad_synapse_count_leaves_network_untouched() {
        let mut net = Network::build(&config(1)).unwrap();
        let before = net.snapshot();

        let mut broken = Network::build(&config(2)).unwrap().snapshot();
        broken.layers[2].neurons[1].weights.pop();

        let err = net.restore(&broken).unwrap_err();
        assert!(matches!(err, NetworkError::StructuralMismatch(_)));
        assert_eq!(net.snapshot(), before);
    }

    #[test]
    fn test_wrong_io_width_rejected() {
        let mut net = Network::build(&config(1)).unwrap();
        let other = NetworkConfig::new(
            vec![LayerSpec::input(2), LayerSpec::new(2, ActivationFunction::Sigmoid)],
            NetworkSettings::default(),
        );
        let snapshot = Network::build(&other).unwrap().snapshot();
        assert!(net.restore(&snapshot).is_err());

        let single = NetworkSnapshot {
            layers: vec![snapshot.layers[0].clone()],
        };
        assert!(net.restore(&single).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let net = Network::build(&config(4)).unwrap();
        let snapshot = net.snapshot();
        let json = snapshot.to_json().unwrap();
        assert_eq!(NetworkSnapshot::from_json(&json).unwrap(), snapshot);
    }
}
