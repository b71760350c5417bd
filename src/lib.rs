pub mod api;
pub mod chart;
pub mod cli;
pub mod columns;
pub mod data;
pub mod error;
pub mod filter;
pub mod io_utils;
pub mod llm;
pub mod loader;
pub mod resolve;
pub mod summary;
pub mod table;

use std::{env, fs, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("realty_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Export(args) => handle_export(&args),
        Commands::Upload(args) => handle_upload(&args),
        Commands::Schema(args) => handle_schema(&args),
    }
}

fn handle_analyze(args: &cli::AnalyzeArgs) -> Result<()> {
    let options = api::AnalyzeOptions {
        query: args.query.clone(),
        top: args.top,
        use_llm: args.use_llm,
        source: args.input.clone(),
    };
    let summarizer = llm::summarizer_from_env();
    let response = api::analyze(&options, summarizer.as_ref())
        .with_context(|| format!("Analyzing query '{}'", args.query))?;
    let payload = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{payload}");
    Ok(())
}

fn handle_export(args: &cli::ExportArgs) -> Result<()> {
    let (filename, bytes) = api::download(&args.query, args.input.as_deref())
        .with_context(|| format!("Exporting rows for query '{}'", args.query))?;
    match &args.output {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("Writing export to {path:?}"))?;
            info!("Wrote {} byte(s) of '{}' to {:?}", bytes.len(), filename, path);
        }
        None => {
            std::io::stdout()
                .write_all(&bytes)
                .context("Writing export to stdout")?;
        }
    }
    Ok(())
}

fn handle_upload(args: &cli::UploadArgs) -> Result<()> {
    let staged = api::upload(&args.input)
        .with_context(|| format!("Staging upload from {:?}", args.input))?;
    println!("{}", staged.display());
    Ok(())
}

fn handle_schema(args: &cli::SchemaArgs) -> Result<()> {
    let doc = api::schema_doc();
    let payload = if args.pretty {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };
    println!("{payload}");
    Ok(())
}
