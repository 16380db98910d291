//! Error (loss) functions used during training and validation.

use serde::{Deserialize, Serialize};

/// Scalar loss between an actual and an expected output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFunction {
    /// (actual - expected)^2 / 2
    #[default]
    PowerDifference,
}

impl ErrorFunction {
    #[inline]
    pub fn loss(self, actual: f64, expected: f64) -> f64 {
        match self {
            Self::PowerDifference => {
                let diff = actual - expected;
                diff * diff / 2.0
            }
        }
    }

    /// d(loss)/d(actual)
    #[inline]
    pub fn derivative(self, actual: f64, expected: f64) -> f64 {
        match self {
            Self::PowerDifference => actual - expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_difference() {
        let f = ErrorFunction::PowerDifference;
        assert_eq!(f.loss(1.0, 1.0), 0.0);
        assert_eq!(f.loss(3.0, 1.0), 2.0);
        assert_eq!(f.loss(1.0, 3.0), 2.0);
        assert_eq!(f.derivative(3.0, 1.0), 2.0);
        assert_eq!(f.derivative(1.0, 3.0), -2.0);
    }
}
