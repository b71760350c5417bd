//! Row filtering against a resolved locality match.

use log::debug;

use crate::{error::AnalysisError, resolve, table::Table};

/// Default bound on the filtered row set when the caller does not supply one.
pub const DEFAULT_TOP: usize = 200;

/// Applies the locality resolver to `table` and returns at most `top` rows
/// in original order. A blank query browses the head of the table; an
/// unresolved query yields an empty table with the schema preserved. Only
/// genuine masking faults (ragged rows) surface as `FilterFailure`.
pub fn filter_table(table: &Table, query: &str, top: usize) -> Result<Table, AnalysisError> {
    if query.trim().is_empty() {
        return Ok(table.head(top));
    }
    let mask = resolve::resolve_mask(table, query).map_err(AnalysisError::FilterFailure)?;
    let filtered = match mask {
        Some(mask) => table
            .select_rows(&mask)
            .map_err(AnalysisError::FilterFailure)?,
        None => table.empty_like(),
    };
    debug!(
        "Query '{query}' matched {} of {} row(s)",
        filtered.len(),
        table.len()
    );
    Ok(filtered.head(top))
}
