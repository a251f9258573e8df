//! CLI argument definitions for the `pacer` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "pacer",
    version,
    about = "Device report extraction - turn programmer printouts into patient timelines",
    long_about = "Convert cardiac device programmer report spreadsheets (.xls/.xlsx)\n\
                  into one JSON timeline per patient.\n\n\
                  Stages: match (filename classification), extract (section, field,\n\
                  table and footer extraction), reconcile (identity check, grouping\n\
                  by registration number, date ordering) and bundle (dashboard data)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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

    /// Allow patient names and registration numbers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Full run: match, extract, reconcile, write patient files and index.
    Run(RunArgs),

    /// Classify spreadsheets against the template catalog only.
    Match(MatchArgs),

    /// Extract the documents selected by the matching report and report counts.
    Extract(ExtractArgs),

    /// Package patient files into the dashboard data bundle.
    Bundle(BundleArgs),

    /// Record content hashes of the input tree.
    Index(IndexArgs),

    /// List spreadsheets added or modified since the last index.
    Changes(IndexArgs),
}

#[derive(Args)]
pub struct OutputArgs {
    /// Directory for patient files, the matching report and the file index.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "patient_records")]
    pub output_dir: PathBuf,

    /// Matching report CSV (default: <OUTPUT_DIR>/matching_report.csv).
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Root of the report spreadsheet tree.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Template catalog JSON (template file name -> brand and type).
    #[arg(long = "templates", value_name = "FILE")]
    pub templates: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,

    /// TOML file overriding section markers and table layouts.
    #[arg(long = "schema", value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Also write the dashboard bundle to this path.
    #[arg(long = "bundle", value_name = "FILE")]
    pub bundle: Option<PathBuf>,
}

#[derive(Parser)]
pub struct MatchArgs {
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: PathBuf,

    #[arg(long = "templates", value_name = "FILE")]
    pub templates: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long = "schema", value_name = "FILE")]
    pub schema: Option<PathBuf>,
}

#[derive(Parser)]
pub struct BundleArgs {
    /// Directory holding the patient JSON files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "patient_records")]
    pub output_dir: PathBuf,

    #[arg(
        long = "bundle",
        value_name = "FILE",
        default_value = "dashboard_ui/data/data_bundle.js"
    )]
    pub bundle: PathBuf,
}

#[derive(Parser)]
pub struct IndexArgs {
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Directory holding processed_files.json.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "patient_records")]
    pub output_dir: PathBuf,
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
