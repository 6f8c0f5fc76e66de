//! CLI argument definitions for the mass decomposer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use decomp_validate::FilterLevel;

#[derive(Parser)]
#[command(
    name = "decomp",
    version,
    about = "Decompose measured masses into molecular formulas",
    long_about = "Enumerate every molecular formula over a bounded element alphabet whose\n\
                  monoisotopic mass lies within the given tolerance of a measured mass.\n\n\
                  Alphabets use the compact syntax CH[min-max]N[min-]O[-max]P[max]."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// TOML file with default tolerances, alphabet, filter and presets.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decompose one or more masses.
    Decompose(DecomposeArgs),

    /// List the elements available in alphabets and formulas.
    Elements,
}

#[derive(Args)]
pub struct DecomposeArgs {
    /// Measured masses in Dalton (ion masses unless --neutral is given).
    #[arg(value_name = "MASS", required = true, num_args = 1..)]
    pub masses: Vec<f64>,

    /// Relative tolerance in parts per million.
    #[arg(short = 'p', long = "ppm", value_name = "PPM")]
    pub ppm: Option<f64>,

    /// Absolute tolerance in Dalton; the larger of both tolerances applies.
    #[arg(short = 'a', long = "absolute", value_name = "DALTON")]
    pub absolute: Option<f64>,

    /// Decimal digits kept when rounding masses onto the integer lattice.
    #[arg(long = "precision", value_name = "DIGITS")]
    pub precision: Option<u32>,

    /// Element alphabet with optional bounds, e.g. "CHN[0-5]O[-10]".
    #[arg(short = 'e', long = "alphabet", value_name = "ALPHABET")]
    pub alphabet: Option<String>,

    /// Only report subformulas of this formula.
    #[arg(long = "parent", value_name = "FORMULA")]
    pub parent: Option<String>,

    /// Chemical plausibility filter.
    #[arg(long = "filter", value_enum)]
    pub filter: Option<FilterArg>,

    /// Report every formula, without filtering.
    #[arg(long = "no-filter")]
    pub no_filter: bool,

    /// Ion type of the measured masses, e.g. "[M+H]+" or "[M-H]-".
    #[arg(long = "ion", value_name = "ION", conflicts_with = "neutral")]
    pub ion: Option<String>,

    /// The masses are neutral molecule masses.
    #[arg(long = "neutral")]
    pub neutral: bool,

    /// Show the mass error of each formula.
    #[arg(long = "errors")]
    pub errors: bool,

    /// Result format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Worker threads used when several masses are given.
    #[arg(long = "threads", value_name = "N", default_value_t = 1)]
    pub threads: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FilterArg {
    Strict,
    Common,
    Permissive,
    Rdbe,
    None,
}

impl From<FilterArg> for FilterLevel {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Strict => FilterLevel::Strict,
            FilterArg::Common => FilterLevel::Common,
            FilterArg::Permissive => FilterLevel::Permissive,
            FilterArg::Rdbe => FilterLevel::Rdbe,
            FilterArg::None => FilterLevel::None,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Plain,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
