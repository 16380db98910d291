//! evonet - CLI entry point
//!
//! Train, evolve and query feed-forward networks.

use clap::{Parser, Subcommand};
use evonet::checkpoint::{Checkpoint, CheckpointManager};
use evonet::data::{load_samples, Normalizer};
use evonet::neural::Network;
use evonet::stats::{self, TrainingSummary};
use evonet::Config;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "evonet")]
#[command(version)]
#[command(about = "Feed-forward neural networks trained by backpropagation and evolved by mutation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new network on a sample file
    Train {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Training samples (YAML, or JSON with a .json extension)
        #[arg(short = 'd', long)]
        samples: PathBuf,

        /// Number of epochs (overrides the configuration)
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Checkpoint file to write
        #[arg(short, long, default_value = "network.bin")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Write the per-epoch error history as JSON
        #[arg(long)]
        stats: Option<PathBuf>,
    },

    /// Apply rounds of random mutation, checkpointing periodically
    Evolve {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Continue from this checkpoint instead of a fresh network
        #[arg(long)]
        from: Option<PathBuf>,

        /// Number of mutation rounds
        #[arg(short, long, default_value = "400")]
        rounds: u64,

        /// Output directory for checkpoints
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Predict outputs for one input vector
    Predict {
        /// Checkpoint to load
        #[arg(short, long)]
        checkpoint: PathBuf,

        /// Comma separated input values
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        inputs: Vec<f64>,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Analyze a checkpoint file
    Analyze {
        /// Checkpoint file
        checkpoint: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            config,
            samples,
            epochs,
            output,
            seed,
            stats,
        } => run_training(config, samples, epochs, output, seed, stats),

        Commands::Evolve {
            config,
            from,
            rounds,
            output,
            seed,
        } => run_evolution(config, from, rounds, output, seed),

        Commands::Predict { checkpoint, inputs } => {
            init_logging("info");
            run_prediction(checkpoint, inputs)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }

        Commands::Analyze { checkpoint } => {
            init_logging("info");
            analyze_checkpoint(checkpoint)
        }
    }
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Load the config file, or fall back to defaults when it does not exist
fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        Config::from_file(path)
    } else {
        Ok(Config::default())
    }
}

fn run_training(
    config_path: PathBuf,
    samples_path: PathBuf,
    epochs: Option<usize>,
    output: PathBuf,
    seed: Option<u64>,
    stats_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&config_path)?;
    init_logging(&config.logging.log_level);
    if !config_path.exists() {
        log::info!("{:?} not found, using default configuration", config_path);
    }
    if seed.is_some() {
        config.network.settings.seed = seed;
    }
    let epochs = epochs.unwrap_or(config.training.epochs);

    let mut samples = load_samples(&samples_path)?;
    log::info!("Loaded {} samples from {:?}", samples.len(), samples_path);

    let normalizer = if config.training.normalize {
        let normalizer = Normalizer::fit(&samples);
        if let Some(n) = &normalizer {
            samples = n.apply(&samples);
        }
        normalizer
    } else {
        None
    };

    let mut network = Network::build(&config.network)?;
    println!("Training network {:?}", network.layer_sizes());
    println!("  Seed: {}", network.seed());
    println!("  Learning rate: {}", network.learning_rate());
    println!("  Epochs: {}", epochs);
    println!();

    let start = Instant::now();
    let history = network.train(&samples, epochs)?;
    let elapsed = start.elapsed();

    if let Some(summary) = TrainingSummary::from_history(history) {
        println!("{}", summary);
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    if let Some(path) = stats_path {
        stats::save_json(network.stats(), &path.to_string_lossy())?;
        println!("Stats history: {:?}", path);
    }

    Checkpoint::new(&network, 0, normalizer).save(&output)?;
    println!("Checkpoint: {:?}", output);

    Ok(())
}

fn run_evolution(
    config_path: PathBuf,
    from: Option<PathBuf>,
    rounds: u64,
    output: PathBuf,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&config_path)?;
    init_logging(&config.logging.log_level);
    if seed.is_some() {
        config.network.settings.seed = seed;
    }

    let (mut network, first_generation, normalizer) = match from {
        Some(path) => {
            println!("Loading checkpoint: {:?}", path);
            let checkpoint = Checkpoint::load(&path)?;
            let network = checkpoint.restore_network()?;
            (network, checkpoint.generation, checkpoint.normalizer)
        }
        None => (Network::build(&config.network)?, 0, None),
    };

    println!("Evolving network {:?}", network.layer_sizes());
    println!("  Seed: {}", network.seed());
    println!("  Rounds: {}", rounds);
    println!();

    let mut checkpoint_mgr = CheckpointManager::new(
        output.to_string_lossy().to_string(),
        config.logging.checkpoint_interval,
        config.logging.max_checkpoints,
    )?;

    let start = Instant::now();
    let mut insertions = 0;
    let mut generation = first_generation;
    for _ in 0..rounds {
        generation += 1;
        let outcome = network.mutate();
        if let Some(index) = outcome.inserted_layer {
            insertions += 1;
            println!(
                "  Generation {}: inserted layer at {} -> {:?}",
                generation,
                index,
                network.layer_sizes()
            );
        }

        if checkpoint_mgr.should_save(generation) {
            let checkpoint = Checkpoint::new(&network, generation, normalizer);
            match checkpoint_mgr.save(&checkpoint) {
                Ok(path) => println!("  Checkpoint saved: {}", path),
                Err(e) => eprintln!("  Checkpoint error: {}", e),
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("=== Evolution Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generation: {}", generation);
    println!("Layers inserted: {}", insertions);
    println!("Final topology: {:?}", network.layer_sizes());
    println!("Valid: {}", network.is_valid());

    let final_path = output.join("checkpoint_final.bin");
    Checkpoint::new(&network, generation, normalizer).save(&final_path)?;
    println!("Final checkpoint: {:?}", final_path);

    let snapshot_path = output.join("snapshot_final.json");
    std::fs::write(&snapshot_path, network.snapshot().to_json()?)?;
    println!("Final snapshot: {:?}", snapshot_path);

    Ok(())
}

fn run_prediction(checkpoint_path: PathBuf, inputs: Vec<f64>) -> Result<(), Box<dyn std::error::Error>> {
    let checkpoint = Checkpoint::load(&checkpoint_path)?;
    let mut network = checkpoint.restore_network()?;

    let predictions = match &checkpoint.normalizer {
        Some(n) => {
            let outputs = network.predict(&n.normalize_inputs(&inputs))?;
            n.denormalize_outputs(&outputs)
        }
        None => network.predict(&inputs)?,
    };

    println!("Inputs: {:?}", inputs);
    println!("Predictions: {:?}", predictions);
    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn analyze_checkpoint(checkpoint_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Checkpoint Analysis ===");
    println!("File: {:?}", checkpoint_path);
    println!();

    let checkpoint = Checkpoint::load(&checkpoint_path)?;
    let network = checkpoint.restore_network()?;

    println!("Generation: {}", checkpoint.generation);
    println!("Seed: {}", checkpoint.random_seed);
    println!("Layer count: {}", network.layers().len());
    for (index, layer) in network.layers().iter().enumerate() {
        let neurons: Vec<String> = layer
            .neurons()
            .iter()
            .map(|&id| {
                let neuron = network.neuron(id);
                format!(
                    "(IS: {}, OS: {})",
                    neuron.input_synapses().len(),
                    neuron.output_synapses().len()
                )
            })
            .collect();
        println!("  {} {:<10} [{}]", index, layer.activation().name(), neurons.join(","));
    }
    println!("Hidden neurons: {}", network.complexity());
    println!("Parameters: {}", network.parameter_count());
    println!("Valid: {}", network.is_valid());

    println!();
    match TrainingSummary::from_history(&checkpoint.stats) {
        Some(summary) => println!("{}", summary),
        None => println!("No training history"),
    }

    println!(
        "Checkpoint size: {:.2} KB",
        checkpoint.size_bytes() as f64 / 1_000.0
    );

    Ok(())
}
