//! Checkpoint system for saving and loading trained networks.

use crate::config::NetworkConfig;
use crate::data::Normalizer;
use crate::neural::{Network, NetworkError, NetworkSnapshot};
use crate::stats::TrainingStats;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 4] = b"EVNT";

/// Everything needed to bring a network back to life
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Version for compatibility checking
    pub version: u32,
    /// Mutation rounds applied when the checkpoint was taken
    pub generation: u64,
    /// Configuration describing the current topology and settings
    pub config: NetworkConfig,
    /// Random seed (for reproducibility)
    pub random_seed: u64,
    /// Learned parameters
    pub snapshot: NetworkSnapshot,
    /// Training history
    pub stats: Vec<TrainingStats>,
    /// Normalization applied to training samples, if any
    pub normalizer: Option<Normalizer>,
}

impl Checkpoint {
    /// Current checkpoint version
    pub const VERSION: u32 = 1;

    /// Capture `network` as it is now
    pub fn new(network: &Network, generation: u64, normalizer: Option<Normalizer>) -> Self {
        Self {
            version: Self::VERSION,
            generation,
            config: network.config(),
            random_seed: network.seed(),
            snapshot: network.snapshot(),
            stats: network.stats().to_vec(),
            normalizer,
        }
    }

    /// Save checkpoint to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;
        writer.flush()?;

        Ok(())
    }

    /// Load checkpoint from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(CheckpointError::InvalidFormat("Invalid magic bytes".to_string()));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let checkpoint: Checkpoint = bincode::deserialize(&buffer)?;

        if checkpoint.version != Self::VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: Self::VERSION,
                found: checkpoint.version,
            });
        }

        Ok(checkpoint)
    }

    /// Rebuild the network: same topology, parameters and history.
    ///
    /// The RNG is reseeded from `random_seed`, so mutations after a reload
    /// replay the sequence of a freshly built network rather than continuing
    /// the original stream.
    pub fn restore_network(&self) -> Result<Network, CheckpointError> {
        let mut network = Network::build_with_seed(&self.config, self.random_seed)?;
        network.restore(&self.snapshot)?;
        network.stats = self.stats.clone();
        Ok(network)
    }

    /// Get approximate size in bytes
    pub fn size_bytes(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }
}

impl Network {
    /// Checkpoint of the current state without normalization data
    pub fn create_checkpoint(&self, generation: u64) -> Checkpoint {
        Checkpoint::new(self, generation, None)
    }

    /// Rebuild a network from a checkpoint
    pub fn from_checkpoint(checkpoint: &Checkpoint) -> Result<Self, CheckpointError> {
        checkpoint.restore_network()
    }
}

/// Errors that can occur during checkpoint operations
#[derive(Debug)]
pub enum CheckpointError {
    Io(std::io::Error),
    Serialization(bincode::Error),
    InvalidFormat(String),
    VersionMismatch { expected: u32, found: u32 },
    Network(NetworkError),
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Self::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
            Self::Network(e) => write!(f, "Network error: {}", e),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<std::io::Error> for CheckpointError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bincode::Error> for CheckpointError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e)
    }
}

impl From<NetworkError> for CheckpointError {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

/// Checkpoint manager for periodic saving during evolution
pub struct CheckpointManager {
    /// Base directory for checkpoints
    pub base_dir: String,
    /// Generations between checkpoints
    pub interval: u64,
    /// Maximum checkpoints to keep
    pub max_checkpoints: usize,
    /// Last checkpointed generation
    last_checkpoint: Option<u64>,
}

impl CheckpointManager {
    /// Create a new checkpoint manager
    pub fn new(base_dir: String, interval: u64, max_checkpoints: usize) -> Result<Self, CheckpointError> {
        std::fs::create_dir_all(&base_dir)?;

        Ok(Self {
            base_dir,
            interval,
            max_checkpoints,
            last_checkpoint: None,
        })
    }

    /// Check if a checkpoint should be saved
    pub fn should_save(&self, generation: u64) -> bool {
        generation > 0
            && generation % self.interval == 0
            && self.last_checkpoint != Some(generation)
    }

    /// Generate checkpoint filename
    pub fn checkpoint_path(&self, generation: u64) -> String {
        format!("{}/checkpoint_{:08}.bin", self.base_dir, generation)
    }

    /// Save checkpoint and update state
    pub fn save(&mut self, checkpoint: &Checkpoint) -> Result<String, CheckpointError> {
        let path = self.checkpoint_path(checkpoint.generation);
        checkpoint.save(&path)?;
        self.last_checkpoint = Some(checkpoint.generation);
        log::info!("Saved checkpoint {} ({} bytes)", path, checkpoint.size_bytes());

        self.cleanup()?;

        Ok(path)
    }

    /// Remove old checkpoints beyond max limit
    fn cleanup(&self) -> Result<(), CheckpointError> {
        let mut checkpoints: Vec<_> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("checkpoint_")
            })
            .collect();

        if checkpoints.len() > self.max_checkpoints {
            // Names embed the zero-padded generation, so they sort by age
            checkpoints.sort_by_key(|e| e.file_name());

            let to_remove = checkpoints.len() - self.max_checkpoints;
            for entry in checkpoints.into_iter().take(to_remove) {
                log::debug!("Removing old checkpoint {:?}", entry.path());
                std::fs::remove_file(entry.path())?;
            }
        }

        Ok(())
    }

    /// Find latest checkpoint in directory
    pub fn find_latest(&self) -> Option<String> {
        std::fs::read_dir(&self.base_dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("checkpoint_")
            })
            .max_by_key(|e| e.file_name())
            .map(|e| e.path().to_string_lossy().to_string())
    }
}
