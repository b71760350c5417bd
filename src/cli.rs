use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze locality trends in tabular real-estate data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a free-text locality query and print the analysis payload as JSON
    Analyze(AnalyzeArgs),
    /// Export the filtered rows for a query as CSV
    Export(ExportArgs),
    /// Stage a dataset file in the transient upload area
    Upload(UploadArgs),
    /// Print the endpoint schema document
    Schema(SchemaArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Free-text locality query (blank browses the dataset head)
    #[arg(short, long, default_value = "")]
    pub query: String,
    /// Maximum rows in the filtered result
    #[arg(long, default_value_t = 200)]
    pub top: usize,
    /// Ask the external text-generation service for the summary
    #[arg(long = "use-llm")]
    pub use_llm: bool,
    /// Dataset file to analyze (defaults to the built-in sample)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Pretty-print the JSON payload
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Free-text locality query (blank exports the dataset head)
    #[arg(short, long, default_value = "")]
    pub query: String,
    /// Dataset file to export from (defaults to the built-in sample)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Dataset file to stage
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Pretty-print the schema document
    #[arg(long)]
    pub pretty: bool,
}
