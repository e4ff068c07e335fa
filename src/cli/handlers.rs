use anyhow::{Result, Context, anyhow, bail};
use console::style;
use dialoguer::{theme::ColorfulTheme, Password};
use merge_explorer::catalog::{get_catalog, ResourceSchema};
use merge_explorer::payload::{build_payload, FieldValue, FieldValues};
use merge_explorer::query::{build_query_params, RawParam};
use merge_explorer::{present, ApiClient, ApiRequest, Credentials, Method, Session};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::cli::commands::{Args, Commands};
use crate::cli::config::Config;
use crate::cli::interactive;
use crate::cli::render::{self, ChartStyle};

pub async fn handle_command(args: Args) -> Result<()> {
    let config = Config::load()?;
    let command = args.command.unwrap_or(Commands::Explore);

    let base_url = args.base_url.as_deref();
    match command {
        Commands::Explore => {
            let session = start_session(base_url, args.api_key, args.account_token, &config)?;
            interactive::run(&session, &config).await?;
        }
        Commands::Tools => {
            let session = start_session(base_url, args.api_key, args.account_token, &config)?;
            interactive::run_tools(&session).await?;
        }
        Commands::Call { path, method, category, query, body, json } => {
            let method: Method = method.parse().map_err(|e: String| anyhow!(e))?;
            let resource = get_catalog().resource_for_path(&category, &path)?;
            if !resource.supports(method) {
                bail!("{} does not support {}", resource.name, method);
            }
            check_call_flags(method, !query.is_empty(), body.is_some())?;

            let request = if method.is_write() {
                let values = match body {
                    Some(file) => load_field_values(&file)?,
                    None => FieldValues::new(),
                };
                ApiRequest::write(method, path.as_str(), build_payload(resource, &values))
            } else {
                let raw = parse_query_args(resource, &query)?;
                ApiRequest::get(path.as_str(), Some(build_query_params(resource, &raw)))
            };

            let session = start_session(base_url, args.api_key, args.account_token, &config)?;
            match session.execute(&request).await {
                Ok(value) => {
                    let presentation = present(value, resource, &path);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&presentation)?);
                    } else {
                        render::print_presentation(&presentation, ChartStyle::Line);
                    }
                }
                Err(e) => {
                    render::print_api_error(&e);
                    bail!("{} {} failed", request.method, request.path);
                }
            }
        }
        Commands::Config { set_base_url, set_default_category, set_timeout, set_inspector } => {
            let mut config = config;
            let changed = set_base_url.is_some()
                || set_default_category.is_some()
                || set_timeout.is_some()
                || set_inspector.is_some();

            if let Some(url) = set_base_url {
                config.base_url = Some(url);
            }
            if let Some(category) = set_default_category {
                get_catalog().category(&category)?;
                config.default_category = Some(category);
            }
            if let Some(secs) = set_timeout {
                config.timeout_secs = (secs > 0).then_some(secs);
            }
            if let Some(inspector) = set_inspector {
                config.inspector = inspector;
            }
            if changed {
                config.save()?;
                println!("Saved settings to {}", Config::get_path()?.display());
            }
            print!("{}", toml::to_string(&config)?);
        }
    }

    Ok(())
}

/// Credentials come from flags or the environment; whatever is missing is
/// asked for. They live only as long as the returned session.
fn start_session(
    base_url: Option<&str>,
    api_key: Option<String>,
    account_token: Option<String>,
    config: &Config,
) -> Result<Session> {
    let client = ApiClient::with_timeout(&config.effective_base_url(base_url), config.timeout())?;
    let mut credentials =
        Credentials::new(api_key.unwrap_or_default(), account_token.unwrap_or_default());

    while !credentials.is_complete() {
        let theme = ColorfulTheme::default();
        let api_key = match credentials.api_key() {
            "" => Password::with_theme(&theme)
                .with_prompt("API Key")
                .allow_empty_password(true)
                .interact()?,
            known => known.to_string(),
        };
        let account_token = match credentials.account_token() {
            "" => Password::with_theme(&theme)
                .with_prompt("Access Token")
                .allow_empty_password(true)
                .interact()?,
            known => known.to_string(),
        };
        credentials = Credentials::new(api_key, account_token);
        if !credentials.is_complete() {
            println!("{}", style("Please enter both API Key and Access Token").red());
        }
    }

    Ok(Session::start(credentials, client)?)
}

/// `--query` only applies to GET and `--body` only to writes.
fn check_call_flags(method: Method, has_query: bool, has_body: bool) -> Result<()> {
    if method.is_write() && has_query {
        bail!("--query is only used with GET; {} sends its fields in --body", method);
    }
    if !method.is_write() && has_body {
        bail!("--body is only used with POST or PATCH");
    }
    Ok(())
}

/// Parses repeated `key=value` flags, interpreting each value by the
/// parameter's declared kind.
fn parse_query_args(
    resource: &ResourceSchema,
    args: &[String],
) -> Result<BTreeMap<String, Option<RawParam>>> {
    let specs = resource.query_params();
    let mut raw = BTreeMap::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, got '{}'", arg))?;
        let key = key.trim();
        let parsed = match specs.iter().find(|s| s.name == key) {
            Some(spec) => RawParam::parse(spec.kind, value),
            None => {
                warn!(
                    param = %key,
                    resource = %resource.name,
                    "unknown query parameter will be ignored"
                );
                RawParam::Text(value.to_string())
            }
        };
        raw.insert(key.to_string(), Some(parsed));
    }
    Ok(raw)
}

/// Reads POST field values from a YAML or JSON file (YAML is a superset).
fn load_field_values(path: &Path) -> Result<FieldValues> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_field_values(&content)
}

fn parse_field_values(content: &str) -> Result<FieldValues> {
    let value: Value = serde_yaml::from_str(content)?;
    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, FieldValue::from_json(v)))
            .collect()),
        Value::Null => Ok(FieldValues::new()),
        _ => Err(anyhow!("body file must contain a mapping of field names to values")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tickets() -> &'static ResourceSchema {
        get_catalog().resource("Ticketing", "tickets").unwrap()
    }

    #[test]
    fn test_parse_query_args() {
        let raw = parse_query_args(
            tickets(),
            &[
                "page_size=25".to_string(),
                "include_shell_data=false".to_string(),
                "created_after=2024-01-31".to_string(),
            ],
        )
        .unwrap();
        let params = build_query_params(tickets(), &raw);
        assert_eq!(params["page_size"], json!(25));
        assert_eq!(params["include_shell_data"], json!(false));
        assert_eq!(params["created_after"], json!("2024-01-31"));

        assert!(parse_query_args(tickets(), &["page_size".to_string()]).is_err());
    }

    #[test]
    fn test_yaml_body_builds_ticket_payload() {
        let values = parse_field_values(
            "name: Printer on fire\nstatus: OPEN\ndescription: ''\ncollections: c1, c2\n\
             remote_fields:\n  remote_field_class: rfc\n",
        )
        .unwrap();
        let body = build_payload(tickets(), &values);
        assert_eq!(
            body,
            json!({"model": {
                "name": "Printer on fire",
                "status": "OPEN",
                "collections": ["c1", "c2"],
                "remote_fields": {"remote_field_class": "rfc", "value": ""}
            }})
        );
    }

    #[test]
    fn test_call_flags_must_match_method() {
        assert!(check_call_flags(Method::Get, true, false).is_ok());
        assert!(check_call_flags(Method::Post, false, true).is_ok());
        assert!(check_call_flags(Method::Patch, false, false).is_ok());

        let err = check_call_flags(Method::Post, true, true).unwrap_err();
        assert!(err.to_string().contains("--query"));
        let err = check_call_flags(Method::Get, false, true).unwrap_err();
        assert!(err.to_string().contains("--body"));
    }

    #[test]
    fn test_body_must_be_a_mapping() {
        assert!(parse_field_values("- a\n- b\n").is_err());
        assert!(parse_field_values("~\n").unwrap().is_empty());
    }
}
