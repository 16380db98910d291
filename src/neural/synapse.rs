//! Weighted directed edges between neurons.

use super::neuron::NeuronId;
use serde::{Deserialize, Serialize};

/// Index of a synapse in the network's synapse arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SynapseId(pub usize);

/// A directed, weighted connection from `input` to `output`.
///
/// The synapse is referenced from both endpoints' edge lists but is owned by
/// the network's arena, never by either neuron.
#[derive(Clone, Debug)]
pub struct Synapse {
    weight: f64,
    previous_weight: f64,
    input: NeuronId,
    output: NeuronId,
}

impl Synapse {
    pub fn new(input: NeuronId, output: NeuronId, weight: f64) -> Self {
        Self {
            weight,
            previous_weight: 0.0,
            input,
            output,
        }
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Weight held immediately before the last write
    #[inline]
    pub fn previous_weight(&self) -> f64 {
        self.previous_weight
    }

    /// Neuron this synapse reads from
    #[inline]
    pub fn input(&self) -> NeuronId {
        self.input
    }

    /// Neuron this synapse feeds
    #[inline]
    pub fn output(&self) -> NeuronId {
        self.output
    }

    /// Overwrite the weight, archiving the old value into `previous_weight`
    #[inline]
    pub fn set_weight(&mut self, weight: f64) {
        self.previous_weight = self.weight;
        self.weight = weight;
    }

    #[inline]
    pub fn adjust_weight(&mut self, delta: f64) {
        self.set_weight(self.weight + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_weight_archives_previous() {
        let mut synapse = Synapse::new(NeuronId(0), NeuronId(1), 0.25);
        assert_eq!(synapse.previous_weight(), 0.0);

        synapse.set_weight(0.75);
        assert_eq!(synapse.weight(), 0.75);
        assert_eq!(synapse.previous_weight(), 0.25);

        synapse.adjust_weight(-0.5);
        assert_eq!(synapse.weight(), 0.25);
        assert_eq!(synapse.previous_weight(), 0.75);
    }

    #[test]
    fn test_endpoints() {
        let synapse = Synapse::new(NeuronId(3), NeuronId(7), 0.0);
        assert_eq!(synapse.input(), NeuronId(3));
        assert_eq!(synapse.output(), NeuronId(7));
    }
}
