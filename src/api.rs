//! Transport-agnostic request/response contract.
//!
//! `analyze` runs the full pipeline (load → resolve/filter → aggregate →
//! summarize) and assembles the payload; `download` reuses the same
//! resolution and filtering for CSV export; `upload` stages a dataset in the
//! transient spool; `schema_doc` is the static endpoint description. An HTTP
//! layer, when present, is a thin shim over these functions.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};

use crate::{
    chart::{self, ChartSeries},
    columns,
    error::AnalysisError,
    filter, loader,
    llm::Summarizer,
    summary,
};

/// Hard cap on rows rendered into the `table` payload field and on exported
/// CSV rows.
pub const TABLE_PAYLOAD_CAP: usize = 500;

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Free-text locality query; blank browses the dataset head.
    pub query: String,
    /// Bound on the filtered row set.
    pub top: usize,
    /// Ask the external text-generation service for the summary.
    pub use_llm: bool,
    /// Dataset location; `None` loads the built-in sample.
    pub source: Option<PathBuf>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        AnalyzeOptions {
            query: String::new(),
            top: filter::DEFAULT_TOP,
            use_llm: false,
            source: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub mode: String,
    pub summary: String,
    pub chart: ChartSeries,
    pub table: Vec<Map<String, JsonValue>>,
    pub query: String,
}

pub fn analyze(
    options: &AnalyzeOptions,
    summarizer: &dyn Summarizer,
) -> Result<AnalyzeResponse, AnalysisError> {
    let table = loader::load_table(options.source.as_deref(), loader::LOAD_CEILING)?;
    let mut filtered = filter::filter_table(&table, &options.query, options.top)?;

    let roles = columns::resolve_roles(&mut filtered);
    if let Some(year_col) = roles.year.as_deref() {
        filtered.coerce_column_to_year(year_col);
    }
    let chart = chart::aggregate(&filtered, &roles);

    let summary_text = if options.use_llm {
        summarizer.summarize(&summary::llm_prompt(&chart, filtered.len(), &options.query))
    } else {
        None
    };
    let summary_text =
        summary_text.unwrap_or_else(|| summary::make_summary(&filtered, &chart, &options.query));

    info!(
        "Analyzed query '{}': {} filtered row(s), {} chart point(s)",
        options.query,
        filtered.len(),
        chart.labels.len()
    );
    Ok(AnalyzeResponse {
        mode: summary::classify_mode(&options.query).to_string(),
        summary: summary_text,
        chart,
        table: filtered.to_json_records(TABLE_PAYLOAD_CAP),
        query: options.query.clone(),
    })
}

/// Filtered rows for `query` serialized as CSV bytes, with the
/// content-disposition filename derived from the query.
pub fn download(query: &str, source: Option<&Path>) -> Result<(String, Vec<u8>)> {
    let table = loader::load_table(source, loader::LOAD_CEILING)?;
    let filtered = filter::filter_table(&table, query, TABLE_PAYLOAD_CAP)?;

    let mut bytes = Vec::new();
    filtered
        .write_csv(&mut bytes)
        .context("Serializing filtered rows to CSV")?;
    let stem = query.trim();
    let filename = format!(
        "filtered_{}.csv",
        if stem.is_empty() { "dataset" } else { stem }
    );
    debug!("Prepared download '{filename}' ({} bytes)", bytes.len());
    Ok((filename, bytes))
}

/// Stages a dataset file into the OS temp dir for reuse by analyze/download.
pub fn upload(source: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| anyhow!("Upload source {source:?} has no file name"))?;
    let destination = std::env::temp_dir().join(name);
    fs::copy(source, &destination)
        .with_context(|| format!("Staging {source:?} into {destination:?}"))?;
    info!("Staged upload at {:?}", destination);
    Ok(destination)
}

/// Static description of the logical endpoints, their parameters, and
/// examples. Pure metadata.
pub fn schema_doc() -> JsonValue {
    json!({
        "endpoints": {
            "/api/upload/ (POST)": {
                "description": "Upload CSV/XLSX file. Returns { path } to pass to analyze.",
                "form_field": "file (multipart/form-data)",
            },
            "/api/analyze/ (GET)": {
                "description": "Analyze dataset for a query (area).",
                "params": {
                    "query": "text query, e.g., 'Wakad' or 'Compare A,B'",
                    "top": "max rows to consider (int)",
                    "use_llm": "true/false - whether to call the external text-generation service",
                    "file": "optional path returned by upload endpoint to analyze uploaded file",
                },
                "example": "/api/analyze/?query=wakad&use_llm=false",
            },
            "/api/download/ (GET)": {
                "description": "Download filtered CSV",
                "example": "/api/download/?query=wakad",
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_browse_the_sample_dataset() {
        let options = AnalyzeOptions::default();
        assert_eq!(options.top, 200);
        assert!(!options.use_llm);
        assert!(options.source.is_none());
        assert!(options.query.is_empty());
    }

    #[test]
    fn schema_doc_lists_all_endpoints() {
        let doc = schema_doc();
        let endpoints = doc["endpoints"].as_object().unwrap();
        assert!(endpoints.contains_key("/api/analyze/ (GET)"));
        assert!(endpoints.contains_key("/api/upload/ (POST)"));
        assert!(endpoints.contains_key("/api/download/ (GET)"));
    }

    #[test]
    fn download_serializes_filtered_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "Final Location,year,price\nWakad,2022,8500\nBaner,2023,9100\n",
        )
        .expect("write csv");

        let (filename, bytes) = download("wakad", Some(&path)).expect("download");
        assert_eq!(filename, "filtered_wakad.csv");
        let text = String::from_utf8(bytes).expect("utf-8 csv");
        assert!(text.contains("\"Wakad\",\"2022\",\"8500\""));
        assert!(!text.contains("Baner"));

        let (fallback, _) = download("  ", Some(&path)).expect("download blank");
        assert_eq!(fallback, "filtered_dataset.csv");
    }
}
