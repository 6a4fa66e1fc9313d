//! Command-line parsing.

use std::path::PathBuf;

use gestalt_types::FeatureKind;

/// Log verbosity requested on the command line. `RUST_LOG` overrides it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    #[must_use]
    pub const fn default_directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReconstructArgs {
    pub input: PathBuf,
    /// `None` means detect from the file name.
    pub kind: Option<FeatureKind>,
    /// `None` means stdout.
    pub output: Option<PathBuf>,
    pub summary_json: bool,
    pub dump_failed: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SortArgs {
    pub input: PathBuf,
    /// `None` means `sorted_<basename>` in the working directory.
    pub output: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Reconstruct(ReconstructArgs),
    Sort(SortArgs),
}

#[derive(Debug, PartialEq, Eq)]
pub struct CliConfig {
    pub command: Command,
    pub verbosity: Verbosity,
}

pub fn print_help() {
    let help = "\
gestalt - reassemble fragmented bulk_extractor features

USAGE:
    gestalt reconstruct [OPTIONS] <FEATURE_FILE>
    gestalt sort [OPTIONS] <FEATURE_FILE>

COMMANDS:
    reconstruct    Merge overlapping features and write the merged feature file
    sort           Sort a feature file by address (reconstruct expects sorted input)

OPTIONS:
    --kind <KIND>          Feature kind: generic|httpheader (default: detect from file name)
    -o, --output <PATH>    Output path (reconstruct: stdout; sort: sorted_<basename>)
    --summary-json         Print a JSON run summary to stderr (reconstruct)
    --dump-failed          Write features that failed to merge to stderr (reconstruct)
    -v, --verbose          Debug logging
    -q, --quiet            Warnings only
    -h, --help             Show this help

RUST_LOG overrides -v/-q.
";
    println!("{help}");
}

/// Parse arguments (without the program name).
///
/// `Err` with an empty message means help was printed and the process
/// should exit successfully.
pub fn parse_args(args: &[String]) -> Result<CliConfig, String> {
    let Some(command) = args.first() else {
        return Err("missing command (expected reconstruct|sort); see --help".to_owned());
    };
    let is_reconstruct = match command.as_str() {
        "reconstruct" => true,
        "sort" => false,
        "-h" | "--help" => {
            print_help();
            return Err(String::new());
        }
        unknown => return Err(format!("unknown command: {unknown}")),
    };

    let mut verbosity = Verbosity::Normal;
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut kind: Option<FeatureKind> = None;
    let mut summary_json = false;
    let mut dump_failed = false;

    let mut index = 1;
    while index < args.len() {
        match args[index].as_str() {
            "-o" | "--output" => {
                index += 1;
                if index >= args.len() {
                    return Err("--output requires a value".to_owned());
                }
                output = Some(PathBuf::from(&args[index]));
            }
            "--kind" if is_reconstruct => {
                index += 1;
                if index >= args.len() {
                    return Err("--kind requires a value".to_owned());
                }
                let parsed = args[index].parse::<FeatureKind>().map_err(|_| {
                    format!(
                        "invalid --kind value: {} (expected generic|httpheader)",
                        args[index]
                    )
                })?;
                kind = Some(parsed);
            }
            "--summary-json" if is_reconstruct => summary_json = true,
            "--dump-failed" if is_reconstruct => dump_failed = true,
            "-v" | "--verbose" => verbosity = Verbosity::Verbose,
            "-q" | "--quiet" => verbosity = Verbosity::Quiet,
            "-h" | "--help" => {
                print_help();
                return Err(String::new());
            }
            unknown if unknown.starts_with('-') && unknown.len() > 1 => {
                return Err(format!("unknown option for {command}: {unknown}"));
            }
            positional => {
                if input.is_some() {
                    return Err(format!("unexpected argument: {positional}"));
                }
                input = Some(PathBuf::from(positional));
            }
        }
        index += 1;
    }

    let input = input
        .ok_or_else(|| format!("{command} requires a FEATURE_FILE argument"))?;
    let command = if is_reconstruct {
        Command::Reconstruct(ReconstructArgs {
            input,
            kind,
            output,
            summary_json,
            dump_failed,
        })
    } else {
        Command::Sort(SortArgs { input, output })
    };
    Ok(CliConfig { command, verbosity })
}
