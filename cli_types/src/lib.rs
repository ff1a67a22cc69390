use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report sections
    #[default]
    Text,
    /// A single JSON document with all reports
    Json,
}

#[derive(Parser)]
#[command(version, name = "bikeshare")]
pub struct Cli {
    /// Increase verbosity level (can be specified multiple times.) The first level sets level
    /// "info", second sets level "debug", and third sets level "trace" for the logger.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding the per-city trip files. Overrides `data.directory` from the
    /// configuration files and the BIKESHARE_DATA__DIRECTORY environment variable.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Runs the interactive session when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args)]
pub struct CliSelection {
    /// City to analyze: chicago, new york city or washington
    #[arg(short, long)]
    pub city: String,

    /// Month to filter by (january..june), or "all" to apply no month filter
    #[arg(short, long, default_value = "all")]
    pub month: String,

    /// Day of week to filter by (monday..sunday), or "all" to apply no day filter
    #[arg(short, long, default_value = "all")]
    pub day: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactively pick a city, month and day, page through raw trips and print
    /// the statistics. Asks to restart after every run.
    Explore {},

    /// Print the statistics for one selection without prompting.
    ///
    /// Time of travel, station popularity, trip duration and user demographics
    /// are computed over the trips left after filtering. The command fails when
    /// no trip matches the selection.
    Report {
        #[command(flatten)]
        selection: CliSelection,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also print this many raw trips, starting at the first matching one
        #[arg(short = 'n', long, default_value = "0")]
        preview: usize,
    },

    /// Show the effective configuration and where each city's data resolves to
    Config {},
}
