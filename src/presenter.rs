//! Turns a raw API response into the pieces the dashboards draw: the JSON
//! itself, a table over `results`, and the tickets-over-time series.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::catalog::{ResourceKind, ResourceSchema};

/// Candidate timestamp columns, in preference order.
pub const DATE_FIELDS: [&str; 3] = ["created_at", "created", "createdAt"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub raw: Value,
    pub table: Option<Table>,
    /// Only set for the ticket list view.
    pub chart: Option<Chart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<Value>,
}

impl Table {
    /// Builds a table whose columns are the union of record keys, in the
    /// order they were first seen. Scalar records land in a `value` column.
    pub fn from_records(records: Vec<Value>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            match record {
                Value::Object(map) => {
                    for key in map.keys() {
                        if !columns.iter().any(|c| c == key) {
                            columns.push(key.clone());
                        }
                    }
                }
                _ => {
                    if !columns.iter().any(|c| c == "value") {
                        columns.push("value".to_string());
                    }
                }
            }
        }
        Self { columns, records }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        match self.records.get(row)? {
            Value::Object(map) => map.get(column),
            scalar if column == "value" => Some(scalar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Daily(DailySeries),
    /// No created-date column was found; nothing to plot.
    NoDateField,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub field: String,
    pub points: Vec<(NaiveDate, usize)>,
}

impl DailySeries {
    pub fn max_count(&self) -> usize {
        self.points.iter().map(|(_, n)| *n).max().unwrap_or(0)
    }
}

/// Builds the presentation for a response fetched from `path` of `resource`.
///
/// A body without `results` is shown raw only. The daily chart is reserved
/// for ticket-like resources fetched from their list endpoint.
pub fn present(json: Value, resource: &ResourceSchema, path: &str) -> Presentation {
    let chart_eligible = resource.kind == ResourceKind::TicketLike && path == resource.list_path();

    let table = match json.get("results") {
        Some(Value::Array(records)) => Some(Table::from_records(records.clone())),
        Some(_) => Some(Table::from_records(vec![])),
        None => None,
    };

    let chart = match &table {
        Some(table) if chart_eligible => Some(daily_chart(table)),
        _ => None,
    };

    Presentation { raw: json, table, chart }
}

/// Counts records per calendar day of their creation timestamp.
pub fn daily_chart(table: &Table) -> Chart {
    let Some(field) = find_date_field(&table.columns) else {
        return Chart::NoDateField;
    };

    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in &table.records {
        if let Some(day) = record.get(field).and_then(Value::as_str).and_then(parse_day) {
            *by_day.entry(day).or_default() += 1;
        }
    }

    Chart::Daily(DailySeries {
        field: field.to_string(),
        points: by_day.into_iter().collect(),
    })
}

fn find_date_field(columns: &[String]) -> Option<&str> {
    DATE_FIELDS
        .iter()
        .find_map(|candidate| columns.iter().find(|c| c == candidate))
        .or_else(|| {
            columns.iter().find(|c| {
                let lower = c.to_ascii_lowercase();
                lower == "createdat" || DATE_FIELDS.iter().any(|f| f.eq_ignore_ascii_case(&lower))
            })
        })
        .map(String::as_str)
}

/// Date portion of a timestamp; time of day and offset are discarded.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    // ISO 8601 offsets without a colon, e.g. +0000
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(ts.date_naive());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
