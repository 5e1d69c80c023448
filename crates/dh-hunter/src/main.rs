//! Duck Hunt HMM drivers.
//!
//! Standalone entry points for exercising the HMM engine over the text
//! protocol: a model is three whitespace-separated blocks (`A`, `B`, `pi`)
//! and a sequence is `length o_1 … o_length`. stdout carries the payload;
//! logs go to stderr.

use clap::{Args, Parser, Subcommand};
use dh_hmm::{encode_model, parse_model, parse_model_then_sequence, parse_sequence, CodecError, Hmm};
use dh_hunter::logging;
use dh_math::format_vector;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Duck Hunt - HMM evaluation, decoding, and training drivers
#[derive(Parser)]
#[command(name = "duckhunt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the next-symbol distribution implied by the prior alone
    NextDist(InputArgs),

    /// Print the log-likelihood of a sequence under a model
    Evaluate(InputArgs),

    /// Print the most likely hidden state path for a sequence
    Decode(InputArgs),

    /// Re-estimate a model from an observation file
    Train(TrainArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Read from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Observation sequence file
    #[arg(long)]
    observations: PathBuf,

    /// Fixed initial model file; omit for random initialization
    #[arg(long)]
    model: Option<PathBuf>,

    /// State count for random initialization
    #[arg(long, default_value = "3")]
    states: usize,

    /// Symbol count for random initialization
    #[arg(long, default_value = "4")]
    symbols: usize,

    /// RNG seed for reproducible initialization
    #[arg(long)]
    seed: Option<u64>,

    /// Baum-Welch iteration cap
    #[arg(long, default_value = "1000")]
    max_iters: usize,

    /// Reference generating model; reports the length-normalized
    /// log-likelihood gap of the trained model against it
    #[arg(long)]
    reference: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => read_file(path),
        None => std::io::read_to_string(std::io::stdin()).map_err(|source| CliError::Io {
            path: "<stdin>".to_string(),
            source,
        }),
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn cmd_next_dist(args: &InputArgs) -> Result<(), CliError> {
    let model = parse_model(&read_input(args.input.as_deref())?)?;
    println!("{}", format_vector(&model.next_distribution()));
    Ok(())
}

fn cmd_evaluate(args: &InputArgs) -> Result<(), CliError> {
    let (model, seq) = parse_model_then_sequence(&read_input(args.input.as_deref())?)?;
    println!("{}", model.evaluate(&seq));
    Ok(())
}

fn cmd_decode(args: &InputArgs) -> Result<(), CliError> {
    let (model, seq) = parse_model_then_sequence(&read_input(args.input.as_deref())?)?;
    let path: Vec<String> = model.decode(&seq).iter().map(usize::to_string).collect();
    println!("{}", path.join(" "));
    Ok(())
}

fn cmd_train(args: &TrainArgs) -> Result<(), CliError> {
    let observations = parse_sequence(&read_file(&args.observations)?)?;

    let mut model = match &args.model {
        Some(path) => parse_model(&read_file(path)?)?,
        None => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            Hmm::randomized(args.states, args.symbols, &mut rng)
        }
    };

    info!(
        len = observations.len(),
        states = model.n_states(),
        symbols = model.n_symbols(),
        max_iters = args.max_iters,
        "re-estimating model"
    );
    model.learn(&observations, args.max_iters);
    println!("{}", encode_model(&model));

    if let Some(path) = &args.reference {
        let reference = parse_model(&read_file(path)?)?;
        let gap = (model.evaluate(&observations) - reference.evaluate(&observations))
            / observations.len() as f64;
        println!("distance: {gap}");
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Commands::NextDist(args) => cmd_next_dist(args),
        Commands::Evaluate(args) => cmd_evaluate(args),
        Commands::Decode(args) => cmd_decode(args),
        Commands::Train(args) => cmd_train(args),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.global.verbose, cli.global.quiet);

    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
