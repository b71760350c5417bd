//! Deterministic summary generation and query-mode classification.
//!
//! The template summary is always available and is the fallback for the
//! optional external text-generation path. Summary construction must never
//! propagate an error: every helper that could come up short returns an
//! `Option`, and the outer entry point degrades to a minimal record-count
//! sentence instead.

use crate::{chart::ChartSeries, columns, table::Table};

/// Tags a query as "comparison" or "single". Informational only; it never
/// alters filtering or aggregation.
pub fn classify_mode(query: &str) -> &'static str {
    let lowered = query.to_lowercase();
    let comma_terms = query
        .split(',')
        .filter(|term| !term.trim().is_empty())
        .count();
    if lowered.contains(" vs ") || lowered.contains("compare ") || comma_terms > 1 {
        "comparison"
    } else {
        "single"
    }
}

/// Builds the 2-3 sentence template summary from the filtered rows and their
/// chart series.
pub fn make_summary(filtered: &Table, chart: &ChartSeries, query: &str) -> String {
    if filtered.is_empty() {
        return format!("No records found for '{query}'.");
    }
    build_summary(filtered, chart, query)
        .unwrap_or_else(|| format!("Found {} records matching '{}'.", filtered.len(), query))
}

/// Prompt for the external text-generation service, embedding the chart
/// series and row count.
pub fn llm_prompt(chart: &ChartSeries, row_count: usize, query: &str) -> String {
    format!(
        "Given aggregated data: years {:?}, average prices {:?}, demands {:?}. \
         Also {row_count} raw rows from query '{query}'. Provide a concise \
         3-sentence analysis highlighting the price trend, demand observation, \
         and one actionable insight.",
        chart.labels, chart.price, chart.demand
    )
}

fn build_summary(filtered: &Table, chart: &ChartSeries, query: &str) -> Option<String> {
    let n = filtered.len();

    let price_line = if chart.price.len() >= 2 {
        let start = *chart.price.first()?;
        let end = *chart.price.last()?;
        let pct = if start != 0.0 {
            (end - start) / start * 100.0
        } else {
            0.0
        };
        format!(
            "Average price moved from {} to {} ({pct:.1}%).",
            format_number(start),
            format_number(end)
        )
    } else {
        "Price trend is not available.".to_string()
    };

    let demand_line = if chart.demand.is_empty() {
        "Demand data not available.".to_string()
    } else {
        let total: f64 = chart.demand.iter().sum();
        format!("Total demand across periods: {}.", total as i64)
    };

    let samples = sample_lines(filtered, chart);
    Some(format!(
        "Found {n} records matching '{query}'.\n{price_line} {demand_line}\nTop {} sample rows:\n{}",
        n.min(3),
        samples.join("\n")
    ))
}

/// Up to 3 sample rows. The locality column is re-scanned from the filtered
/// rows' own keys rather than reusing the earlier role resolution, since
/// derived columns may have changed what is available.
fn sample_lines(filtered: &Table, chart: &ChartSeries) -> Vec<String> {
    let locality_idx = filtered.columns.iter().position(|name| {
        let lowered = name.to_lowercase();
        columns::LOCALITY_PATTERNS
            .iter()
            .any(|pattern| lowered.contains(pattern))
    });
    let year_idx = filtered
        .columns
        .iter()
        .position(|name| name.eq_ignore_ascii_case("year"));
    let price_idx = filtered.column_index(&chart.price_col);

    filtered
        .rows
        .iter()
        .take(3)
        .map(|row| {
            let cell = |idx: Option<usize>| {
                idx.and_then(|idx| row.get(idx))
                    .map(|value| value.as_display())
                    .unwrap_or_default()
            };
            format!(
                "- {} | {} | {}: {}",
                cell(locality_idx),
                cell(year_idx),
                chart.price_col,
                cell(price_idx)
            )
        })
        .collect()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
