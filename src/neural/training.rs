//! Backpropagation training.
//!
//! Output deltas come from the error function; hidden deltas are propagated
//! backwards using each downstream synapse's `previous_weight`, since the
//! downstream layer has already been rewritten by the time a hidden neuron
//! is visited.

use super::error::NetworkError;
use super::network::Network;
use super::neuron::NeuronId;
use crate::data::TrainingSample;
use crate::stats::TrainingStats;

impl Network {
    /// Run one forward/backward pass on a single sample.
    ///
    /// Returns the summed output loss measured before the update.
    pub fn train_one(&mut self, sample: &TrainingSample) -> Result<f64, NetworkError> {
        self.check_sample(sample)?;
        self.set_inputs(&sample.inputs)?;

        let error = self.train_output_layer(&sample.expected_outputs);
        self.train_hidden_layers();

        // Parameters changed, so every cached output is stale
        self.mark_dirty();
        Ok(error)
    }

    /// Train for `epochs` passes over `samples` and return the full history.
    ///
    /// The trailing `validation_fraction` of the samples is held back: each
    /// epoch trains on the leading part (in caller order) and then records
    /// the mean loss over the held-back part. When the held-back part would be
    /// empty every sample is used for both.
    pub fn train(
        &mut self,
        samples: &[TrainingSample],
        epochs: usize,
    ) -> Result<&[TrainingStats], NetworkError> {
        if samples.is_empty() {
            return Err(NetworkError::EmptyTrainingSet);
        }
        for sample in samples {
            self.check_sample(sample)?;
        }

        let validation_count =
            (samples.len() as f64 * self.settings.validation_fraction).floor() as usize;
        let (training, validation) = if validation_count == 0 {
            log::warn!(
                "{} samples leave no validation slice; validating on the training set",
                samples.len()
            );
            (samples, samples)
        } else {
            samples.split_at(samples.len() - validation_count)
        };

        let first_epoch = self.stats.last().map_or(0, |s| s.epoch) + 1;
        for epoch in first_epoch..first_epoch + epochs {
            for sample in training {
                self.train_one(sample)?;
            }

            let mut total = 0.0;
            for sample in validation {
                self.set_inputs(&sample.inputs)?;
                total += self.calculate_error(&sample.expected_outputs)?;
            }
            let error = total / validation.len() as f64;

            log::debug!("Epoch {:04}\terror {:.6}", epoch, error);
            self.stats.push(TrainingStats { epoch, error });
        }

        if let Some(last) = self.stats.last() {
            log::info!(
                "Trained {} epochs on {} samples ({} held back), error {:.6}",
                epochs,
                training.len(),
                if validation_count == 0 { 0 } else { validation.len() },
                last.error
            );
        }
        Ok(self.stats.as_slice())
    }

    /// Loss of every output neuron against `expected` for the current inputs.
    ///
    /// The per-output losses are kept in [`last_errors`](Self::last_errors);
    /// the mean is returned.
    pub fn calculate_error(&mut self, expected: &[f64]) -> Result<f64, NetworkError> {
        let width = self.output_layer().len();
        if expected.len() != width {
            return Err(NetworkError::DimensionMismatch {
                context: "expected outputs",
                expected: width,
                found: expected.len(),
            });
        }

        let error_function = self.settings.error_function;
        let actual = self.outputs();
        self.errors.clear();
        self.errors.extend(
            actual
                .iter()
                .zip(expected)
                .map(|(&a, &e)| error_function.loss(a, e)),
        );
        Ok(self.errors.iter().sum::<f64>() / width as f64)
    }

    fn check_sample(&self, sample: &TrainingSample) -> Result<(), NetworkError> {
        let inputs = self.input_layer().len();
        if sample.inputs.len() != inputs {
            return Err(NetworkError::DimensionMismatch {
                context: "sample inputs",
                expected: inputs,
                found: sample.inputs.len(),
            });
        }
        let outputs = self.output_layer().len();
        if sample.expected_outputs.len() != outputs {
            return Err(NetworkError::DimensionMismatch {
                context: "sample expected outputs",
                expected: outputs,
                found: sample.expected_outputs.len(),
            });
        }
        Ok(())
    }

    fn train_output_layer(&mut self, expected: &[f64]) -> f64 {
        let error_function = self.settings.error_function;
        let learning_rate = self.settings.learning_rate;
        let last = self.layers.len() - 1;

        let mut total = 0.0;
        for (i, &target) in expected.iter().enumerate() {
            let id = self.layers[last].neurons[i];
            assert!(
                self.neurons[id.0].output_synapses.is_empty(),
                "attempting to train {:?} as an output neuron but it has downstream synapses",
                id
            );

            let actual = self.output(id);
            total += error_function.loss(actual, target);
            let delta = error_function.derivative(actual, target)
                * self.neurons[id.0].activation.derivative(actual);
            self.apply_delta(id, delta, learning_rate);
        }
        total
    }

    fn train_hidden_layers(&mut self) {
        let learning_rate = self.settings.learning_rate;
        let n = self.layers.len();

        for layer in (1..n - 1).rev() {
            for i in 0..self.layers[layer].neurons.len() {
                let id = self.layers[layer].neurons[i];
                let downstream: f64 = self.neurons[id.0]
                    .output_synapses
                    .iter()
                    .map(|&s| {
                        let synapse = self.synapse(s);
                        synapse.previous_weight() * self.neurons[synapse.output().0].delta
                    })
                    .sum();
                let output = self.output(id);
                let delta = downstream * self.neurons[id.0].activation.derivative(output);
                self.apply_delta(id, delta, learning_rate);
            }
        }
    }

    /// Store `delta` and step the neuron's bias and incoming weights
    fn apply_delta(&mut self, id: NeuronId, delta: f64, learning_rate: f64) {
        let neuron = &mut self.neurons[id.0];
        neuron.delta = delta;
        neuron.bias -= delta * learning_rate;

        for k in 0..self.neurons[id.0].input_synapses.len() {
            let synapse = self.neurons[id.0].input_synapses[k];
            let source = self.synapse(synapse).input();
            let input = self.output(source);
            let weight = self.synapse(synapse).weight();
            self.synapse_mut(synapse)
                .set_weight(weight - delta * input * learning_rate);
        }
    }
}
