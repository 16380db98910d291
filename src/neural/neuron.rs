//! Network nodes.

use super::activation::{ActivationFunction, InputFunction};
use super::synapse::SynapseId;
use serde::{Deserialize, Serialize};

/// Index of a neuron in the network's neuron arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeuronId(pub usize);

/// A single node of the graph.
///
/// Output evaluation needs the rest of the graph, so it lives on
/// [`Network::output`](super::Network::output). The neuron itself only holds
/// state and its edge lists.
#[derive(Clone, Debug)]
pub struct Neuron {
    pub(crate) activation: ActivationFunction,
    pub(crate) input_function: InputFunction,
    pub(crate) bias: f64,
    /// Only meaningful for neurons without input synapses
    pub(crate) value: f64,
    pub(crate) cached_output: f64,
    pub(crate) dirty: bool,
    /// Last backpropagated gradient signal
    pub(crate) delta: f64,
    pub(crate) input_synapses: Vec<SynapseId>,
    pub(crate) output_synapses: Vec<SynapseId>,
}

impl Neuron {
    pub fn new(activation: ActivationFunction, input_function: InputFunction, bias: f64) -> Self {
        Self {
            activation,
            input_function,
            bias,
            value: 0.0,
            cached_output: 0.0,
            dirty: true,
            delta: 0.0,
            input_synapses: Vec::new(),
            output_synapses: Vec::new(),
        }
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn input_function(&self) -> InputFunction {
        self.input_function
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Last computed output. Stale while [`is_dirty`](Self::is_dirty) is true.
    pub fn cached_output(&self) -> f64 {
        self.cached_output
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn input_synapses(&self) -> &[SynapseId] {
        &self.input_synapses
    }

    pub fn output_synapses(&self) -> &[SynapseId] {
        &self.output_synapses
    }

    /// Neurons without incoming edges just echo their assigned value
    #[inline]
    pub fn is_input(&self) -> bool {
        self.input_synapses.is_empty()
    }

    /// Drop `id` from whichever edge list holds it
    pub(crate) fn remove_synapse(&mut self, id: SynapseId) {
        self.input_synapses.retain(|&s| s != id);
        self.output_synapses.retain(|&s| s != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_neuron_is_dirty() {
        let neuron = Neuron::new(ActivationFunction::Sigmoid, InputFunction::WeightedSum, 0.1);
        assert!(neuron.is_dirty());
        assert!(neuron.is_input());
        assert_eq!(neuron.bias(), 0.1);
        assert_eq!(neuron.delta(), 0.0);
    }

    #[test]
    fn test_remove_synapse() {
        let mut neuron = Neuron::new(ActivationFunction::Rectified, InputFunction::WeightedSum, 0.0);
        neuron.input_synapses = vec![SynapseId(1), SynapseId(2)];
        neuron.output_synapses = vec![SynapseId(3)];

        neuron.remove_synapse(SynapseId(2));
        neuron.remove_synapse(SynapseId(3));

        assert_eq!(neuron.input_synapses(), &[SynapseId(1)]);
        assert!(neuron.output_synapses().is_empty());
    }
}
