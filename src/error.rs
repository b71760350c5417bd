use thiserror::Error;

/// Terminal failures surfaced to the caller. Anything softer (unresolved
/// column roles, zero matches, external summarizer trouble) degrades to a
/// well-formed payload instead of landing here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Requested or default source file is missing or unreadable.
    #[error("dataset unavailable: {0}")]
    DataUnavailable(String),
    /// Source file exists but its content could not be parsed as a table.
    #[error("failed to load dataset: {0}")]
    LoadFailure(anyhow::Error),
    /// Unexpected fault while building the row mask.
    #[error("filtering failed: {0}")]
    FilterFailure(anyhow::Error),
}
