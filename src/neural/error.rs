//! Errors surfaced by network construction, evaluation and restore.

/// Errors that can occur while building or driving a [`Network`](super::Network)
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// The configuration cannot describe a usable network
    Configuration(String),
    /// A vector's length disagrees with the layer it feeds
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    /// A snapshot's shape cannot be loaded into this network
    StructuralMismatch(String),
    /// `train` was called without any samples
    EmptyTrainingSet,
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Self::DimensionMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "Dimension mismatch for {}: expected {}, found {}",
                context, expected, found
            ),
            Self::StructuralMismatch(msg) => write!(f, "Structural mismatch: {}", msg),
            Self::EmptyTrainingSet => write!(f, "Training requires at least one sample"),
        }
    }
}

impl std::error::Error for NetworkError {}
