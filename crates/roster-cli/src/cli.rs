//! CLI argument definitions for the roster column mapper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

/// Directory holding learned mappings when `--knowledge-dir` is not given.
pub const DEFAULT_KNOWLEDGE_DIR: &str = ".roster-knowledge";
/// Knowledge profile used when `--profile` is not given.
pub const DEFAULT_PROFILE: &str = "default";
/// Data rows sampled from each CSV file.
pub const DEFAULT_SAMPLE_ROWS: usize = 25;

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Map provider roster columns onto the canonical template fields",
    long_about = "Detect which spreadsheet column holds each canonical provider roster field \
                  (NPI, names, gender, credentials, languages, locations, addresses).\n\n\
                  Learned header mappings are kept per profile and consulted before any \
                  heuristic on later runs."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Detect the column for every canonical field in a CSV file.
    Classify(ClassifyArgs),

    /// Rank the columns of a CSV file by NPI confidence.
    Rank(RankArgs),

    /// Write a copy of a CSV file with its columns renamed to template labels.
    Apply(ApplyArgs),

    /// Record an operator-confirmed mapping in the knowledge base.
    Confirm(ConfirmArgs),

    /// Show the learned mappings of a profile.
    Knowledge(KnowledgeArgs),

    /// List the canonical fields.
    Fields,
}

/// Where learned mappings are read from and written to.
#[derive(Args, Clone)]
pub struct KnowledgeArgs {
    /// Directory holding one knowledge file per profile.
    #[arg(long = "knowledge-dir", value_name = "DIR", default_value = DEFAULT_KNOWLEDGE_DIR)]
    pub knowledge_dir: PathBuf,

    /// Knowledge profile, e.g. one per client.
    #[arg(long = "profile", value_name = "NAME", default_value = DEFAULT_PROFILE)]
    pub profile: String,
}

/// Input file and sampling options.
#[derive(Args, Clone)]
pub struct InputArgs {
    /// CSV file with a header row.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Number of data rows sampled per column.
    #[arg(long = "sample", value_name = "N", default_value_t = DEFAULT_SAMPLE_ROWS)]
    pub sample: usize,

    /// Custom lexicon TOML replacing the built-in keyword tables.
    #[arg(long = "lexicon", value_name = "PATH")]
    pub lexicon: Option<PathBuf>,
}

#[derive(Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub knowledge: KnowledgeArgs,

    /// Do not save identifier mappings learned during this run.
    #[arg(long = "no-learn")]
    pub no_learn: bool,

    /// Print mapping records as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,

    /// Also write the mappings as CSV (Column Name, Detected As, Raw Type).
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Args)]
pub struct RankArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub knowledge: KnowledgeArgs,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub knowledge: KnowledgeArgs,

    /// Mappings CSV written by `classify --export`; classifies the input when omitted.
    #[arg(long = "mappings", value_name = "PATH")]
    pub mappings: Option<PathBuf>,

    /// Destination of the mapped CSV.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ConfirmArgs {
    /// Canonical field, by raw key or template label.
    #[arg(long = "field", value_name = "FIELD")]
    pub field: String,

    /// Source column header.
    #[arg(long = "column", value_name = "NAME")]
    pub column: String,

    /// Confidence stored with the mapping.
    #[arg(long = "confidence", value_name = "N", default_value_t = 100.0)]
    pub confidence: f64,

    #[command(flatten)]
    pub knowledge: KnowledgeArgs,
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
