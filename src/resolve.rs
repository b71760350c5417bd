//! Two-stage locality resolution.
//!
//! Stage 1 tests the whole lowercased query as a substring of every
//! locality-candidate cell and ORs the per-column masks. Stage 2 only runs
//! when stage 1 matches nothing: it looks for a known locality value
//! embedded in the query text, longest value first, so "ambegaon budruk"
//! wins over "ambegaon" before the shorter prefix gets a chance. Natural
//! queries rarely equal a locality value exactly; the second stage recovers
//! embedded names without any NLP.
//!
//! Matching is case-insensitive substring containment throughout, same as
//! the filtering it feeds.

use std::collections::HashSet;

use anyhow::Result;
use log::debug;

use crate::{columns, table::Table};

/// Resolves `query` to a row mask over `table`, or `None` when no locality
/// candidates exist or neither stage matches. Failure to resolve is silent;
/// the row filter turns it into an empty result.
pub fn resolve_mask(table: &Table, query: &str) -> Result<Option<Vec<bool>>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(None);
    }
    let candidates = columns::locality_candidates(table);
    if candidates.is_empty() {
        debug!("No locality candidate columns; query '{query}' cannot resolve");
        return Ok(None);
    }

    let mask = contains_mask(table, &candidates, &needle)?;
    if mask.iter().any(|&hit| hit) {
        return Ok(Some(mask));
    }

    let Some(detected) = detect_value_in_query(table, &candidates, &needle) else {
        debug!("Query '{query}' matched no rows and embeds no known locality value");
        return Ok(None);
    };
    debug!("Detected locality value '{detected}' embedded in query '{query}'");
    let mask = contains_mask(table, &candidates, &detected.to_lowercase())?;
    Ok(mask.iter().any(|&hit| hit).then_some(mask))
}

/// OR-union of per-column case-insensitive contains masks.
fn contains_mask(table: &Table, candidate_columns: &[String], needle: &str) -> Result<Vec<bool>> {
    let indexes = candidate_columns
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect::<Vec<_>>();
    table
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            indexes
                .iter()
                .map(|&idx| {
                    let cell = row.get(idx).ok_or_else(|| {
                        anyhow::anyhow!(
                            "row {} is missing column index {idx} during masking",
                            row_idx + 1
                        )
                    })?;
                    Ok(cell.as_display().to_lowercase().contains(needle))
                })
                .try_fold(false, |acc, hit: Result<bool>| Ok(acc | hit?))
        })
        .collect()
}

/// Distinct trimmed locality values, longest first (ties keep first-seen
/// order), returning the first one contained in the lowercased query.
fn detect_value_in_query(
    table: &Table,
    candidate_columns: &[String],
    lowered_query: &str,
) -> Option<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for name in candidate_columns {
        let Some(idx) = table.column_index(name) else {
            continue;
        };
        for row in &table.rows {
            let Some(cell) = row.get(idx) else { continue };
            let trimmed = cell.as_display().trim().to_string();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(trimmed.clone()) {
                values.push(trimmed);
            }
        }
    }
    // Stable sort keeps first-seen order among equal lengths.
    values.sort_by_key(|value| std::cmp::Reverse(value.len()));
    values
        .into_iter()
        .find(|value| lowered_query.contains(&value.to_lowercase()))
}
