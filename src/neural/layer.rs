//! Ordered groups of neurons sharing one activation strategy.

use super::activation::{ActivationFunction, InputFunction};
use super::neuron::NeuronId;

/// A layer of the network.
///
/// Neuron ids are stable for the life of the layer; the neurons themselves
/// live in the network arena.
#[derive(Clone, Debug)]
pub struct Layer {
    pub(crate) neurons: Vec<NeuronId>,
    pub(crate) activation: ActivationFunction,
    pub(crate) input_function: InputFunction,
}

impl Layer {
    pub(crate) fn new(activation: ActivationFunction, input_function: InputFunction) -> Self {
        Self {
            neurons: Vec::new(),
            activation,
            input_function,
        }
    }

    pub fn neurons(&self) -> &[NeuronId] {
        &self.neurons
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn input_function(&self) -> InputFunction {
        self.input_function
    }
}
