//! Activation and input-aggregation strategies.

use serde::{Deserialize, Serialize};

/// Slope used by [`ActivationFunction::LeakyRelu`] for negative inputs
pub const LEAKY_SLOPE: f64 = 0.01;

/// Maps a neuron's pre-activation to its output.
///
/// `derivative` is always expressed in terms of the *activated output*, never
/// the raw pre-activation. Callers pass the value previously returned by
/// `activate`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    /// max(0, x)
    #[default]
    Rectified,
    /// x for x >= 0, 0.01x otherwise
    LeakyRelu,
    /// 1 / (1 + e^-x)
    Sigmoid,
}

impl ActivationFunction {
    #[inline]
    pub fn activate(self, x: f64) -> f64 {
        match self {
            Self::Rectified => x.max(0.0),
            Self::LeakyRelu => {
                if x >= 0.0 {
                    x
                } else {
                    LEAKY_SLOPE * x
                }
            }
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }

    /// Derivative evaluated at an already activated `output`
    #[inline]
    pub fn derivative(self, output: f64) -> f64 {
        match self {
            Self::Rectified => {
                if output > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::LeakyRelu => {
                if output > 0.0 {
                    1.0
                } else {
                    LEAKY_SLOPE
                }
            }
            Self::Sigmoid => output * (1.0 - output),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rectified => "rectified",
            Self::LeakyRelu => "leaky_relu",
            Self::Sigmoid => "sigmoid",
        }
    }
}

/// Combines a neuron's weighted inputs into a single pre-activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFunction {
    /// Σ weight * input
    #[default]
    WeightedSum,
}

impl InputFunction {
    /// Starting value of the fold
    #[inline]
    pub fn identity(self) -> f64 {
        match self {
            Self::WeightedSum => 0.0,
        }
    }

    /// Fold one `(weight, input)` term into the accumulator
    #[inline]
    pub fn accumulate(self, acc: f64, weight: f64, input: f64) -> f64 {
        match self {
            Self::WeightedSum => acc + weight * input,
        }
    }

    /// Aggregate a full set of `(weight, input)` pairs
    pub fn aggregate<I>(self, terms: I) -> f64
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        terms
            .into_iter()
            .fold(self.identity(), |acc, (w, x)| self.accumulate(acc, w, x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_rectified() {
        let f = ActivationFunction::Rectified;
        assert_eq!(f.activate(-3.0), 0.0);
        assert_eq!(f.activate(2.5), 2.5);
        assert_eq!(f.derivative(f.activate(2.5)), 1.0);
        assert_eq!(f.derivative(f.activate(-1.0)), 0.0);
    }

    #[test]
    fn test_leaky_relu() {
        let f = ActivationFunction::LeakyRelu;
        assert_eq!(f.activate(4.0), 4.0);
        assert!((f.activate(-2.0) + 0.02).abs() < EPSILON);
        assert_eq!(f.derivative(f.activate(4.0)), 1.0);
        assert_eq!(f.derivative(f.activate(-2.0)), LEAKY_SLOPE);
    }

    #[test]
    fn test_sigmoid() {
        let f = ActivationFunction::Sigmoid;
        assert!((f.activate(0.0) - 0.5).abs() < EPSILON);
        assert!(f.activate(10.0) > 0.99);
        assert!(f.activate(-10.0) < 0.01);
        // derivative takes the output, so sigmoid'(0) = 0.5 * 0.5
        assert!((f.derivative(0.5) - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_sigmoid_derivative_matches_numeric() {
        let f = ActivationFunction::Sigmoid;
        let x = 0.3;
        let h = 1e-6;
        let numeric = (f.activate(x + h) - f.activate(x - h)) / (2.0 * h);
        assert!((f.derivative(f.activate(x)) - numeric).abs() < 1e-8);
    }

    #[test]
    fn test_weighted_sum() {
        let f = InputFunction::WeightedSum;
        let sum = f.aggregate([(0.5, 2.0), (-1.0, 1.0), (2.0, 0.25)]);
        assert!((sum - 0.5).abs() < EPSILON);
        assert_eq!(f.aggregate(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_serde_names() {
        let yaml = serde_yaml::to_string(&ActivationFunction::LeakyRelu).unwrap();
        assert_eq!(yaml.trim(), "leaky_relu");
        let parsed: ActivationFunction = serde_yaml::from_str("sigmoid").unwrap();
        assert_eq!(parsed, ActivationFunction::Sigmoid);
    }
}
