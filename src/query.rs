use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::catalog::{Method, ParamKind, QueryParamSpec, ResourceSchema};

/// Filters ready to be serialized as a query string.
pub type QueryParams = BTreeMap<String, Value>;

/// A value as collected from an input widget or the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum RawParam {
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Flag(bool),
    Integer(i64),
    Text(String),
}

impl RawParam {
    /// Interprets command-line text according to the parameter's kind.
    /// Text that does not fit the kind is kept as text.
    pub fn parse(kind: ParamKind, input: &str) -> Self {
        let trimmed = input.trim();
        match kind {
            ParamKind::DateTime => {
                if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                    RawParam::Date(date)
                } else if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
                    RawParam::Timestamp(ts.with_timezone(&Utc))
                } else {
                    RawParam::Text(input.to_string())
                }
            }
            ParamKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => RawParam::Flag(true),
                "false" | "no" | "0" => RawParam::Flag(false),
                _ => RawParam::Text(input.to_string()),
            },
            ParamKind::Integer => trimmed
                .parse()
                .map(RawParam::Integer)
                .unwrap_or_else(|_| RawParam::Text(input.to_string())),
            ParamKind::String => RawParam::Text(input.to_string()),
        }
    }
}

/// Builds the query map for a GET against `resource`.
///
/// Only parameters the caller supplied appear in the output: an absent value
/// is omitted rather than defaulted, while an explicit `false` is sent.
/// Dates become ISO 8601 strings. Nothing here fails.
pub fn build_query_params(
    resource: &ResourceSchema,
    raw: &BTreeMap<String, Option<RawParam>>,
) -> QueryParams {
    let mut params = QueryParams::new();
    if !resource.supports(Method::Get) {
        debug!(
            resource = %resource.name,
            "resource has no GET endpoints, ignoring query parameters"
        );
        return params;
    }

    let specs = resource.query_params();
    for (name, value) in raw {
        let Some(spec) = specs.iter().find(|s| &s.name == name) else {
            debug!(param = %name, "ignoring unknown query parameter");
            continue;
        };
        if let Some(coerced) = value.as_ref().and_then(|v| coerce(spec, v)) {
            params.insert(name.clone(), coerced);
        }
    }
    params
}

fn coerce(spec: &QueryParamSpec, value: &RawParam) -> Option<Value> {
    match value {
        RawParam::Date(date) => Some(Value::String(date.format("%Y-%m-%d").to_string())),
        RawParam::Timestamp(ts) => Some(Value::String(ts.to_rfc3339())),
        RawParam::Flag(flag) => Some(Value::Bool(*flag)),
        RawParam::Integer(n) => Some(Value::from(*n)),
        RawParam::Text(text) if text.is_empty() => None,
        RawParam::Text(text) => match RawParam::parse(spec.kind, text) {
            RawParam::Text(_) => Some(Value::String(text.clone())),
            parsed => coerce(spec, &parsed),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_catalog;
    use chrono::TimeZone;
    use serde_json::json;

    fn tickets() -> &'static ResourceSchema {
        get_catalog().resource("Ticketing", "tickets").unwrap()
    }

    fn raw(pairs: Vec<(&str, Option<RawParam>)>) -> BTreeMap<String, Option<RawParam>> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_only_supplied_params() {
        let params = build_query_params(
            tickets(),
            &raw(vec![
                ("page_size", Some(RawParam::Integer(10))),
                ("cursor", None),
                ("remote_id", Some(RawParam::Text(String::new()))),
                ("created_after", None),
            ]),
        );
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("page_size"), Some(&json!(10)));
    }

    #[test]
    fn test_dates_become_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();
        let params = build_query_params(
            tickets(),
            &raw(vec![
                ("created_after", Some(RawParam::Date(date))),
                ("modified_before", Some(RawParam::Timestamp(ts))),
                ("created_before", Some(RawParam::Text("2024-04-01".to_string()))),
            ]),
        );
        assert_eq!(params["created_after"], json!("2024-03-09"));
        assert_eq!(params["modified_before"], json!("2024-03-09T14:30:00+00:00"));
        assert_eq!(params["created_before"], json!("2024-04-01"));
    }

    #[test]
    fn test_explicit_false_is_sent() {
        let params = build_query_params(
            tickets(),
            &raw(vec![
                ("include_deleted_data", Some(RawParam::Flag(false))),
                ("include_remote_data", None),
            ]),
        );
        assert_eq!(params.len(), 1);
        assert_eq!(params["include_deleted_data"], json!(false));
    }

    #[test]
    fn test_unknown_and_malformed_params() {
        let params = build_query_params(
            tickets(),
            &raw(vec![
                ("not_a_param", Some(RawParam::Integer(1))),
                ("page_size", Some(RawParam::Text("lots".to_string()))),
            ]),
        );
        // Malformed input passes through untouched.
        assert_eq!(params.len(), 1);
        assert_eq!(params["page_size"], json!("lots"));
    }

    #[test]
    fn test_parse_by_kind() {
        assert_eq!(RawParam::parse(ParamKind::Integer, " 25 "), RawParam::Integer(25));
        assert_eq!(RawParam::parse(ParamKind::Boolean, "True"), RawParam::Flag(true));
        assert_eq!(
            RawParam::parse(ParamKind::DateTime, "2024-01-02"),
            RawParam::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        assert_eq!(RawParam::parse(ParamKind::String, "abc"), RawParam::Text("abc".to_string()));
    }
}
