//! Column role inference over unknown, heterogeneous schemas.
//!
//! Roles are resolved fresh per request from ordered name-pattern rules
//! evaluated top to bottom over the table's column order; the first match
//! wins and an unmatched role is simply absent. Nothing here is cached
//! across requests since every upload may carry a different schema.

use log::debug;

use crate::{
    data::{year_of, Value},
    table::Table,
};

pub(crate) const LOCALITY_PATTERNS: &[&str] = &["location", "area", "locality", "place"];
const PRICE_PATTERNS: &[&str] = &["price", "rate", "weighted average"];
const DEMAND_PATTERNS: &[&str] = &["demand", "sold", "units", "total sold"];

/// How many leading rows are inspected when deciding whether a column holds
/// free text or dates.
const TYPE_SAMPLE_ROWS: usize = 200;

/// Per-request column bindings. Each role is independently optional;
/// downstream components tolerate absence rather than fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    pub year: Option<String>,
    pub price: Option<String>,
    pub demand: Option<String>,
}

/// Columns that plausibly hold locality names: name-pattern matches first,
/// else every free-text column.
pub fn locality_candidates(table: &Table) -> Vec<String> {
    let mut candidates = table
        .columns
        .iter()
        .filter(|name| {
            let lowered = name.to_lowercase();
            LOCALITY_PATTERNS
                .iter()
                .any(|pattern| lowered.contains(pattern))
        })
        .cloned()
        .collect::<Vec<_>>();
    if candidates.is_empty() {
        candidates = table
            .columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| is_text_column(table, *idx))
            .map(|(_, name)| name.clone())
            .collect();
    }
    candidates
}

/// Resolves year/price/demand bindings. May append a derived integer `year`
/// column when no year column exists but a date-typed column does; this is
/// the only mutation.
pub fn resolve_roles(table: &mut Table) -> ColumnRoles {
    let roles = ColumnRoles {
        year: resolve_year(table),
        price: first_name_match(table, PRICE_PATTERNS),
        demand: first_name_match(table, DEMAND_PATTERNS),
    };
    debug!("Resolved column roles: {roles:?}");
    roles
}

fn first_name_match(table: &Table, patterns: &[&str]) -> Option<String> {
    table
        .columns
        .iter()
        .find(|name| {
            let lowered = name.to_lowercase();
            patterns.iter().any(|pattern| lowered.contains(pattern))
        })
        .cloned()
}

fn resolve_year(table: &mut Table) -> Option<String> {
    if let Some(name) = table
        .columns
        .iter()
        .find(|name| name.eq_ignore_ascii_case("year"))
    {
        return Some(name.clone());
    }
    let source_idx = (0..table.columns.len()).find(|idx| is_date_column(table, *idx))?;
    table.append_column("year", |row| match row.get(source_idx).map(year_of) {
        Some(Some(year)) => Value::Int(year),
        _ => Value::Null,
    });
    Some("year".to_string())
}

/// A column is free text when any sampled cell is a string that does not
/// coerce to a number. Mirrors the object-dtype fallback of dataframe
/// libraries, where one stray string makes the whole column textual.
fn is_text_column(table: &Table, idx: usize) -> bool {
    table.rows.iter().take(TYPE_SAMPLE_ROWS).any(|row| {
        matches!(row.get(idx), Some(Value::Str(_))) && row[idx].as_f64().is_none()
    })
}

/// A column is date-typed when it has sampled values and every non-null one
/// parses as a date or datetime.
fn is_date_column(table: &Table, idx: usize) -> bool {
    let mut seen = 0usize;
    for row in table.rows.iter().take(TYPE_SAMPLE_ROWS) {
        match row.get(idx) {
            Some(Value::Null) | None => continue,
            Some(value) => {
                if year_of(value).is_none() {
                    return false;
                }
                seen += 1;
            }
        }
    }
    seen > 0
}
