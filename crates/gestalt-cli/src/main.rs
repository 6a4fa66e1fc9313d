mod config;
mod logging;

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use gestalt_core::{default_output_path, reconstruct_file, sort_feature_file};
use gestalt_error::{GestaltError, Result};
use gestalt_types::FeatureKind;
use tracing::{debug, info};

use crate::config::{Command, ReconstructArgs, SortArgs, parse_args};

fn run_reconstruct(args: &ReconstructArgs) -> Result<()> {
    let kind = args
        .kind
        .unwrap_or_else(|| FeatureKind::detect(&args.input));
    let reconstruction = reconstruct_file(&args.input, kind)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            reconstruction.write_feature_file(BufWriter::new(file))?;
            info!(output = %path.display(), "wrote merged feature file");
        }
        None => {
            let stdout = io::stdout().lock();
            reconstruction.write_feature_file(BufWriter::new(stdout))?;
        }
    }

    if args.dump_failed {
        reconstruction.write_failed_merges(io::stderr().lock())?;
    }
    if args.summary_json {
        let json = serde_json::to_string_pretty(reconstruction.summary())
            .map_err(io::Error::from)?;
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{json}")?;
    }
    Ok(())
}

fn run_sort(args: &SortArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    sort_feature_file(&args.input, &output)?;
    Ok(())
}

fn run(args: &[String]) -> Result<()> {
    let config = match parse_args(args) {
        Ok(config) => config,
        Err(message) if message.is_empty() => return Ok(()),
        Err(message) => return Err(GestaltError::usage(message)),
    };
    logging::init(config.verbosity);

    match &config.command {
        Command::Reconstruct(reconstruct) => run_reconstruct(reconstruct),
        Command::Sort(sort) => run_sort(sort),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ GestaltError::Usage(_)) => {
            eprintln!("gestalt: {err}");
            eprintln!("Run with --help for usage");
            ExitCode::from(err.exit_code())
        }
        Err(err) => {
            debug!(error = ?err, "gestalt failed");
            if err.is_data_error() {
                eprintln!("gestalt: invalid input: {err}");
            } else {
                eprintln!("gestalt: {err}");
            }
            if let Some(hint) = err.suggestion() {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
