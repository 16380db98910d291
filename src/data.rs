//! Training samples and min-max normalization.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One input vector with its expected outputs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub inputs: Vec<f64>,
    pub expected_outputs: Vec<f64>,
}

impl TrainingSample {
    pub fn new(inputs: Vec<f64>, expected_outputs: Vec<f64>) -> Self {
        Self {
            inputs,
            expected_outputs,
        }
    }
}

/// Load samples from a YAML file, or JSON when the extension is `.json`
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingSample>, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let samples = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&contents)?,
        _ => serde_yaml::from_str(&contents)?,
    };
    Ok(samples)
}

/// Scale `value` from [min, max] into [0, 1]; a degenerate range maps to 1
#[inline]
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if min == max {
        return 1.0;
    }
    (value - min) / (max - min)
}

/// Inverse of [`normalize`]; a degenerate range maps back to `min`
#[inline]
pub fn denormalize(value: f64, min: f64, max: f64) -> f64 {
    if min == max {
        return min;
    }
    value * (max - min) + min
}

/// Input and output ranges observed over a sample set
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    pub input_min: f64,
    pub input_max: f64,
    pub output_min: f64,
    pub output_max: f64,
}

impl Normalizer {
    /// Scan every input and expected output. Returns `None` for an empty set.
    pub fn fit(samples: &[TrainingSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut n = Self {
            input_min: f64::MAX,
            input_max: f64::MIN,
            output_min: f64::MAX,
            output_max: f64::MIN,
        };
        for sample in samples {
            for &x in &sample.inputs {
                n.input_min = n.input_min.min(x);
                n.input_max = n.input_max.max(x);
            }
            for &y in &sample.expected_outputs {
                n.output_min = n.output_min.min(y);
                n.output_max = n.output_max.max(y);
            }
        }
        Some(n)
    }

    pub fn normalize_inputs(&self, inputs: &[f64]) -> Vec<f64> {
        inputs
            .iter()
            .map(|&x| normalize(x, self.input_min, self.input_max))
            .collect()
    }

    pub fn denormalize_outputs(&self, outputs: &[f64]) -> Vec<f64> {
        outputs
            .iter()
            .map(|&y| denormalize(y, self.output_min, self.output_max))
            .collect()
    }

    /// Normalized copy of a sample set
    pub fn apply(&self, samples: &[TrainingSample]) -> Vec<TrainingSample> {
        samples
            .iter()
            .map(|s| TrainingSample {
                inputs: self.normalize_inputs(&s.inputs),
                expected_outputs: s
                    .expected_outputs
                    .iter()
                    .map(|&y| normalize(y, self.output_min, self.output_max))
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn samples() -> Vec<TrainingSample> {
        vec![
            TrainingSample::new(vec![-10.0, 0.0], vec![10.0]),
            TrainingSample::new(vec![10.0, 5.0], vec![30.0]),
        ]
    }

    #[test]
    fn test_normalize_bounds() {
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(3.0, 3.0, 3.0), 1.0);
        assert_eq!(denormalize(0.5, 0.0, 10.0), 5.0);
    }

    #[test]
    fn test_fit_and_apply() {
        let normalizer = Normalizer::fit(&samples()).unwrap();
        assert_eq!(normalizer.input_min, -10.0);
        assert_eq!(normalizer.input_max, 10.0);
        assert_eq!(normalizer.output_min, 10.0);
        assert_eq!(normalizer.output_max, 30.0);

        let scaled = normalizer.apply(&samples());
        assert_eq!(scaled[0].inputs, vec![0.0, 0.5]);
        assert_eq!(scaled[1].expected_outputs, vec![1.0]);

        let restored = normalizer.denormalize_outputs(&[0.5]);
        assert_relative_eq!(restored[0], 20.0);
    }

    #[test]
    fn test_constant_outputs_denormalize_to_constant() {
        let constant = vec![
            TrainingSample::new(vec![0.0], vec![5.0]),
            TrainingSample::new(vec![1.0], vec![5.0]),
        ];
        let normalizer = Normalizer::fit(&constant).unwrap();

        let scaled = normalizer.apply(&constant);
        assert_eq!(scaled[0].expected_outputs, vec![1.0]);
        assert_eq!(normalizer.denormalize_outputs(&scaled[0].expected_outputs), vec![5.0]);
        assert_eq!(denormalize(0.3, 3.0, 3.0), 3.0);
    }

    #[test]
    fn test_fit_empty() {
        assert!(Normalizer::fit(&[]).is_none());
    }

    #[test]
    fn test_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("samples.yaml");
        std::fs::write(&yaml_path, serde_yaml::to_string(&samples()).unwrap()).unwrap();
        assert_eq!(load_samples(&yaml_path).unwrap(), samples());

        let json_path = dir.path().join("samples.json");
        std::fs::write(&json_path, serde_json::to_string(&samples()).unwrap()).unwrap();
        assert_eq!(load_samples(&json_path).unwrap(), samples());
    }
}
