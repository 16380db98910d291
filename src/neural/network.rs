//! Network structure, graph wiring and forward propagation.

use super::activation::{ActivationFunction, InputFunction};
use super::error::NetworkError;
use super::layer::Layer;
use super::mutations::MutationConfig;
use super::neuron::{Neuron, NeuronId};
use super::synapse::{Synapse, SynapseId};
use crate::config::{LayerSpec, NetworkConfig, NetworkSettings};
use crate::stats::TrainingStats;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Low end of the uniform range used for fresh weights, biases and perturbations
pub const INIT_LOW: f64 = -0.5;
/// High end (exclusive) of the same range
pub const INIT_HIGH: f64 = 0.5;

/// Layered feed-forward network.
///
/// Neurons and synapses live in two arenas and refer to each other by index.
/// Layers only list the ids of their neurons. The first layer is the input
/// layer and the last one is the output layer; a built network always has at
/// least two.
#[derive(Debug)]
pub struct Network {
    pub(crate) layers: Vec<Layer>,
    pub(crate) neurons: Vec<Neuron>,
    pub(crate) synapses: Vec<Option<Synapse>>,
    free_synapses: Vec<usize>,
    pub(crate) settings: NetworkSettings,
    pub(crate) mutation: MutationConfig,
    /// The only source of randomness for this network
    pub(crate) rng: ChaCha8Rng,
    seed: u64,
    pub(crate) stats: Vec<TrainingStats>,
    pub(crate) errors: Vec<f64>,
}

impl Network {
    /// Build a network from `config`, seeding from `settings.seed` or entropy
    pub fn build(config: &NetworkConfig) -> Result<Self, NetworkError> {
        let seed = match config.settings.seed {
            Some(seed) => seed,
            None => rand::thread_rng().gen(),
        };
        Self::build_with_seed(config, seed)
    }

    /// Build a network with a specific seed for reproducibility
    pub fn build_with_seed(config: &NetworkConfig, seed: u64) -> Result<Self, NetworkError> {
        config.validate()?;

        let mut net = Self {
            layers: Vec::with_capacity(config.layers.len()),
            neurons: Vec::new(),
            synapses: Vec::new(),
            free_synapses: Vec::new(),
            settings: config.settings.clone(),
            mutation: config.mutation.clone(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            stats: Vec::new(),
            errors: Vec::new(),
        };

        for spec in &config.layers {
            let layer = net.create_layer(spec.neurons, spec.activation, spec.input_function);
            if let Some(previous) = net.layers.last() {
                let previous = previous.neurons.clone();
                net.connect_dense(&previous, &layer.neurons);
            }
            net.layers.push(layer);
        }

        log::debug!(
            "Built network {:?} (seed {}, {} synapses)",
            net.layer_sizes(),
            seed,
            net.synapse_count()
        );
        Ok(net)
    }

    /// Build `count` independent networks.
    ///
    /// With a fixed seed `s`, member `i` is seeded with `s + i` so members
    /// start from different weights and evolve independently.
    pub fn build_population(config: &NetworkConfig, count: usize) -> Result<Vec<Self>, NetworkError> {
        (0..count)
            .map(|i| match config.settings.seed {
                Some(seed) => Self::build_with_seed(config, seed.wrapping_add(i as u64)),
                None => Self::build(config),
            })
            .collect()
    }

    // --- graph wiring -----------------------------------------------------

    /// Allocate a layer of fresh neurons (not yet inserted or connected)
    pub(crate) fn create_layer(
        &mut self,
        size: usize,
        activation: ActivationFunction,
        input_function: InputFunction,
    ) -> Layer {
        let mut layer = Layer::new(activation, input_function);
        for _ in 0..size {
            let bias = self.rng.gen_range(INIT_LOW..INIT_HIGH);
            layer.neurons.push(self.push_neuron(Neuron::new(activation, input_function, bias)));
        }
        layer
    }

    pub(crate) fn push_neuron(&mut self, neuron: Neuron) -> NeuronId {
        self.neurons.push(neuron);
        NeuronId(self.neurons.len() - 1)
    }

    /// Connect every neuron of `to` to every neuron of `from` with random weights
    pub(crate) fn connect_dense(&mut self, from: &[NeuronId], to: &[NeuronId]) {
        for &output in to {
            for &input in from {
                let weight = self.rng.gen_range(INIT_LOW..INIT_HIGH);
                self.connect(input, output, weight);
            }
        }
    }

    /// Create a synapse and register it on both endpoints
    pub(crate) fn connect(&mut self, input: NeuronId, output: NeuronId, weight: f64) -> SynapseId {
        let synapse = Synapse::new(input, output, weight);
        let id = match self.free_synapses.pop() {
            Some(slot) => {
                self.synapses[slot] = Some(synapse);
                SynapseId(slot)
            }
            None => {
                self.synapses.push(Some(synapse));
                SynapseId(self.synapses.len() - 1)
            }
        };
        self.neurons[output.0].input_synapses.push(id);
        self.neurons[input.0].output_synapses.push(id);
        id
    }

    /// Remove a synapse from both endpoints' edge lists and free its slot
    pub(crate) fn sever(&mut self, id: SynapseId) {
        if let Some(synapse) = self.synapses[id.0].take() {
            self.neurons[synapse.input().0].remove_synapse(id);
            self.neurons[synapse.output().0].remove_synapse(id);
            self.free_synapses.push(id.0);
        }
    }

    /// Sever every incoming synapse of `neuron`
    pub(crate) fn sever_inputs(&mut self, neuron: NeuronId) {
        let incoming = std::mem::take(&mut self.neurons[neuron.0].input_synapses);
        for id in incoming {
            self.sever(id);
        }
    }

    /// Drop every layer, neuron and synapse
    pub(crate) fn clear_topology(&mut self) {
        self.layers.clear();
        self.neurons.clear();
        self.synapses.clear();
        self.free_synapses.clear();
    }

    pub(crate) fn synapse_mut(&mut self, id: SynapseId) -> &mut Synapse {
        match self.synapses.get_mut(id.0).and_then(Option::as_mut) {
            Some(synapse) => synapse,
            None => panic!("dangling synapse id {:?}", id),
        }
    }

    // --- forward propagation ----------------------------------------------

    /// Assign input values.
    ///
    /// Cached outputs are invalidated only when at least one value differs
    /// (bitwise) from what the input neuron already holds, so repeated
    /// predictions on the same inputs are served from the cache.
    pub fn set_inputs(&mut self, values: &[f64]) -> Result<(), NetworkError> {
        let expected = self.input_layer().len();
        if values.len() != expected {
            return Err(NetworkError::DimensionMismatch {
                context: "inputs",
                expected,
                found: values.len(),
            });
        }

        let mut changed = false;
        for (i, &value) in values.iter().enumerate() {
            let id = self.layers[0].neurons[i];
            let neuron = &mut self.neurons[id.0];
            if neuron.value.to_bits() != value.to_bits() {
                neuron.value = value;
                changed = true;
            }
        }
        if changed {
            self.mark_dirty();
        }
        Ok(())
    }

    /// Flag every neuron for recomputation on its next read
    pub fn mark_dirty(&mut self) {
        for neuron in &mut self.neurons {
            neuron.dirty = true;
        }
    }

    /// Output of one neuron, recomputing it (and its inputs) only if dirty
    pub fn output(&mut self, id: NeuronId) -> f64 {
        let neuron = &self.neurons[id.0];
        if neuron.is_input() {
            return neuron.value;
        }
        if !neuron.dirty {
            return neuron.cached_output;
        }

        let input_function = neuron.input_function;
        let count = neuron.input_synapses.len();
        let mut terms = Vec::with_capacity(count);
        for k in 0..count {
            let (weight, source) = {
                let synapse = self.synapse(self.neurons[id.0].input_synapses[k]);
                (synapse.weight(), synapse.input())
            };
            terms.push((weight, self.output(source)));
        }
        let acc = input_function.aggregate(terms);

        let neuron = &mut self.neurons[id.0];
        neuron.cached_output = neuron.activation.activate(acc + neuron.bias);
        neuron.dirty = false;
        neuron.cached_output
    }

    /// Outputs of the output layer for the current inputs
    pub fn outputs(&mut self) -> Vec<f64> {
        let count = self.output_layer().len();
        let mut outputs = Vec::with_capacity(count);
        for i in 0..count {
            let id = self.output_layer().neurons[i];
            outputs.push(self.output(id));
        }
        outputs
    }

    /// Set the inputs and read every output neuron in order
    pub fn predict(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        self.set_inputs(inputs)?;
        Ok(self.outputs())
    }

    // --- read-only inspection ---------------------------------------------

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn input_layer(&self) -> &Layer {
        &self.layers[0]
    }

    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    pub fn neuron(&self, id: NeuronId) -> &Neuron {
        &self.neurons[id.0]
    }

    /// Panics if `id` was severed
    pub fn synapse(&self, id: SynapseId) -> &Synapse {
        match self.synapses.get(id.0).and_then(Option::as_ref) {
            Some(synapse) => synapse,
            None => panic!("dangling synapse id {:?}", id),
        }
    }

    /// Live synapses in arena order
    pub fn synapses(&self) -> impl Iterator<Item = (SynapseId, &Synapse)> {
        self.synapses
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (SynapseId(i), s)))
    }

    /// Specs describing the current (possibly grown) topology
    pub fn layer_specs(&self) -> Vec<LayerSpec> {
        self.layers
            .iter()
            .map(|l| LayerSpec {
                neurons: l.len(),
                activation: l.activation(),
                input_function: l.input_function(),
            })
            .collect()
    }

    /// Configuration that rebuilds this network's current shape
    pub fn config(&self) -> NetworkConfig {
        NetworkConfig {
            layers: self.layer_specs(),
            settings: NetworkSettings {
                seed: Some(self.seed),
                ..self.settings.clone()
            },
            mutation: self.mutation.clone(),
        }
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::len).collect()
    }

    pub fn synapse_count(&self) -> usize {
        self.synapses.len() - self.free_synapses.len()
    }

    /// Number of hidden neurons (complexity metric)
    pub fn complexity(&self) -> usize {
        let n = self.layers.len();
        self.layers[1..n - 1].iter().map(Layer::len).sum()
    }

    /// Total number of parameters (weights + biases of non-input neurons)
    pub fn parameter_count(&self) -> usize {
        self.synapse_count() + self.neurons.len() - self.input_layer().len()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &NetworkSettings {
        &self.settings
    }

    pub fn learning_rate(&self) -> f64 {
        self.settings.learning_rate
    }

    pub fn mutation_config(&self) -> &MutationConfig {
        &self.mutation
    }

    /// Training history, one entry per epoch
    pub fn stats(&self) -> &[TrainingStats] {
        &self.stats
    }

    /// Per-output losses of the last [`calculate_error`](Self::calculate_error)
    pub fn last_errors(&self) -> &[f64] {
        &self.errors
    }

    /// Check that no parameter is NaN/Inf and the topology invariants hold
    pub fn is_valid(&self) -> bool {
        let finite = self.neurons.iter().all(|n| n.bias.is_finite())
            && self.synapses().all(|(_, s)| s.weight().is_finite());
        finite && self.has_valid_topology()
    }

    /// Every non-input neuron has an input, every non-output neuron has an
    /// output, and edge lists agree with synapse endpoints.
    pub fn has_valid_topology(&self) -> bool {
        let last = self.layers.len() - 1;
        for (index, layer) in self.layers.iter().enumerate() {
            for &id in &layer.neurons {
                let neuron = &self.neurons[id.0];
                if (index > 0) == neuron.input_synapses.is_empty() {
                    return false;
                }
                if (index < last) == neuron.output_synapses.is_empty() {
                    return false;
                }
                let inputs_agree = neuron.input_synapses.iter().all(|&s| {
                    matches!(self.synapses.get(s.0), Some(Some(syn)) if syn.output() == id)
                });
                let outputs_agree = neuron.output_synapses.iter().all(|&s| {
                    matches!(self.synapses.get(s.0), Some(Some(syn)) if syn.input() == id)
                });
                if !inputs_agree || !outputs_agree {
                    return false;
                }
            }
        }
        true
    }
}
