//! Year-keyed chart aggregation over the filtered row set.
//!
//! Groups rows by the resolved year column and computes the per-year mean of
//! the price column and sum of the demand column. Every failure mode here is
//! a fallback branch, never an error: unbound roles produce zeros and empty
//! column names, rows without a usable year drop out of the group-by domain,
//! and non-numeric cells are ignored rather than zero-filled.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{columns::ColumnRoles, data::Value, table::Table};

/// Ascending-by-year aggregation ready for chart rendering. Labels are
/// stringified years for display stability; empty `price_col`/`demand_col`
/// signal "no data" for that series to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub price: Vec<f64>,
    pub demand: Vec<f64>,
    pub price_col: String,
    pub demand_col: String,
}

#[derive(Debug, Default)]
struct YearGroup {
    price_sum: f64,
    price_count: usize,
    demand_sum: f64,
}

pub fn aggregate(table: &Table, roles: &ColumnRoles) -> ChartSeries {
    let mut series = ChartSeries {
        price_col: roles.price.clone().unwrap_or_default(),
        demand_col: roles.demand.clone().unwrap_or_default(),
        ..ChartSeries::default()
    };

    let year_idx = roles
        .year
        .as_deref()
        .and_then(|name| table.column_index(name));
    let Some(year_idx) = year_idx else {
        debug!("No year column bound; returning empty chart series");
        return series;
    };
    let price_idx = roles
        .price
        .as_deref()
        .and_then(|name| table.column_index(name));
    let demand_idx = roles
        .demand
        .as_deref()
        .and_then(|name| table.column_index(name));

    // BTreeMap keeps the group-by domain sorted ascending by year.
    let mut groups: BTreeMap<i64, YearGroup> = BTreeMap::new();
    for row in &table.rows {
        let Some(year) = row.get(year_idx).and_then(Value::as_year) else {
            continue;
        };
        let group = groups.entry(year).or_default();
        if let Some(idx) = price_idx {
            if let Some(price) = row.get(idx).and_then(Value::as_f64) {
                group.price_sum += price;
                group.price_count += 1;
            }
        }
        if let Some(idx) = demand_idx {
            if let Some(demand) = row.get(idx).and_then(Value::as_f64) {
                group.demand_sum += demand;
            }
        }
    }

    for (year, group) in groups {
        series.labels.push(year.to_string());
        let mean_price = if group.price_count > 0 {
            group.price_sum / group.price_count as f64
        } else {
            0.0
        };
        series.price.push(round4(mean_price));
        series.demand.push(round4(group.demand_sum));
    }
    debug!(
        "Aggregated {} row(s) into {} year group(s)",
        table.len(),
        series.labels.len()
    );
    series
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> ColumnRoles {
        ColumnRoles {
            year: Some("year".to_string()),
            price: Some("price".to_string()),
            demand: Some("demand".to_string()),
        }
    }

    fn row(year: Value, price: Value, demand: Value) -> Vec<Value> {
        vec![year, price, demand]
    }

    fn table(rows: Vec<Vec<Value>>) -> Table {
        let mut table = Table::new(vec![
            "year".to_string(),
            "price".to_string(),
            "demand".to_string(),
        ]);
        for r in rows {
            table.push_row(r);
        }
        table
    }

    #[test]
    fn empty_table_yields_empty_series_with_bound_names() {
        let series = aggregate(&table(vec![]), &roles());
        assert!(series.labels.is_empty());
        assert!(series.price.is_empty());
        assert!(series.demand.is_empty());
        assert_eq!(series.price_col, "price");
        assert_eq!(series.demand_col, "demand");
    }

    #[test]
    fn unbound_roles_yield_empty_names() {
        let series = aggregate(&table(vec![]), &ColumnRoles::default());
        assert_eq!(series.price_col, "");
        assert_eq!(series.demand_col, "");
        assert!(series.labels.is_empty());
    }

    #[test]
    fn groups_sort_ascending_by_year() {
        let series = aggregate(
            &table(vec![
                row(Value::Int(2021), Value::Int(100), Value::Int(1)),
                row(Value::Int(2019), Value::Int(200), Value::Int(2)),
                row(Value::Int(2020), Value::Int(300), Value::Int(3)),
            ]),
            &roles(),
        );
        assert_eq!(series.labels, vec!["2019", "2020", "2021"]);
        assert_eq!(series.price, vec![200.0, 300.0, 100.0]);
        assert_eq!(series.demand, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn mean_ignores_non_numeric_price_cells() {
        let series = aggregate(
            &table(vec![
                row(Value::Int(2022), Value::Int(100), Value::Int(10)),
                row(
                    Value::Int(2022),
                    Value::Str("poa".to_string()),
                    Value::Int(5),
                ),
                row(Value::Int(2022), Value::Int(300), Value::Null),
            ]),
            &roles(),
        );
        assert_eq!(series.labels, vec!["2022"]);
        assert_eq!(series.price, vec![200.0]);
        assert_eq!(series.demand, vec![15.0]);
    }

    #[test]
    fn rows_without_usable_years_leave_the_domain() {
        let series = aggregate(
            &table(vec![
                row(Value::Null, Value::Int(100), Value::Int(1)),
                row(Value::Str("tbd".to_string()), Value::Int(200), Value::Int(2)),
            ]),
            &roles(),
        );
        assert!(series.labels.is_empty());
        assert!(series.price.is_empty());
    }

    #[test]
    fn aggregates_round_to_four_decimals() {
        let series = aggregate(
            &table(vec![
                row(Value::Int(2022), Value::Float(100.00004), Value::Int(1)),
                row(Value::Int(2022), Value::Float(100.00002), Value::Int(1)),
            ]),
            &roles(),
        );
        assert_eq!(series.price, vec![100.0]);
    }
}
