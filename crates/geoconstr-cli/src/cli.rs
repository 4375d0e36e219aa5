use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use geoconstr::core::utils::units::LengthUnit;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "geoconstr - Compile geometric constraint files into coordinate lists and target-value grids for constrained geometry optimization.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a constraint file and print the coordinates and the target-value grid.
    Compile(CompileArgs),
    /// Compare the current value of every constrained coordinate with its target.
    Check(CheckArgs),
}

/// Inputs and overrides shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the input structure in XYZ format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub structure: PathBuf,

    /// Path to the constraint file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub constraints: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the length unit of compiled values ('bohr' or 'angstrom').
    #[arg(short = 'u', long, value_name = "UNIT")]
    pub length_unit: Option<LengthUnit>,

    /// Override the output format.
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Override the number of decimals printed in text output.
    #[arg(short, long, value_name = "INT")]
    pub precision: Option<usize>,

    /// Write the report to a file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S output.precision=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `compile` subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Zero-based grid step whose targets are compared.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub step: usize,
}
