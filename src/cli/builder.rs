use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, Select, Confirm};
use console::style;
use merge_explorer::catalog::{
    fill_path, get_catalog, path_placeholders, Category, FieldSpec, FieldType, ParamKind,
    QueryParamSpec, ResourceKind, ResourceSchema, TICKET_INTEGRATIONS,
};
use merge_explorer::payload::{build_payload, split_list, FieldValue, FieldValues, NESTED_FIELDS};
use merge_explorer::query::{build_query_params, RawParam};
use merge_explorer::{present, ApiRequest, Method, Session};
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

use crate::cli::config::Config;
use crate::cli::inspector::run_inspector;
use crate::cli::render::{self, ChartStyle};

/// Walks the user from category to resource to a concrete request, then
/// sends it through the session and shows the result.
pub struct ExplorerState<'a> {
    session: &'a Session,
    config: &'a Config,
}

impl<'a> ExplorerState<'a> {
    pub fn new(session: &'a Session, config: &'a Config) -> Self {
        Self { session, config }
    }

    pub async fn run(&self) -> Result<()> {
        let theme = ColorfulTheme::default();
        let catalog = get_catalog();

        let mut choices: Vec<String> = catalog.categories.iter().map(|c| c.name.clone()).collect();
        choices.push("Back".to_string());
        let preferred = self.config.default_category.as_deref().unwrap_or("Ticketing");
        let default = choices.iter().position(|c| c == preferred).unwrap_or(0);

        loop {
            println!("\n{}", style("--- API Categories ---").bold());
            let selection = Select::with_theme(&theme)
                .with_prompt("Select Category")
                .default(default)
                .items(&choices)
                .interact()?;

            let Some(category) = catalog.categories.get(selection) else {
                break;
            };

            println!("\n{}", style(format!("{} API", category.name)).bold().underlined());
            println!("{}", category.description);

            if !category.is_available() {
                let notice = format!("Endpoints for {} are coming soon!", category.name);
                println!("{}", style(notice).yellow());
                continue;
            }
            self.category_menu(category).await?;
        }
        Ok(())
    }

    async fn category_menu(&self, category: &Category) -> Result<()> {
        let theme = ColorfulTheme::default();
        let mut labels: Vec<String> = category
            .resources
            .iter()
            .map(|r| format!("{:<12} {}", r.name, style(&r.description).dim()))
            .collect();
        labels.push("Back".to_string());

        loop {
            println!("\n{}", style("Available Common Models").bold());
            let selection = Select::with_theme(&theme)
                .with_prompt("Select Resource")
                .default(0)
                .items(&labels)
                .interact()?;

            match category.resources.get(selection) {
                Some(resource) => self.resource_menu(resource).await?,
                None => break,
            }
        }
        Ok(())
    }

    async fn resource_menu(&self, resource: &ResourceSchema) -> Result<()> {
        let theme = ColorfulTheme::default();
        loop {
            println!("\n{} {}", style(&resource.name).bold(), style(&resource.description).dim());
            let methods: Vec<&str> = resource.methods.iter().map(Method::as_str).collect();
            println!("Available Methods: {}", methods.join(", "));

            let choices = vec!["Send Request", "API Documentation", "Back"];
            let selection = Select::with_theme(&theme)
                .with_prompt(format!("{}", style(&resource.name).cyan()))
                .default(0)
                .items(&choices)
                .interact()?;

            match selection {
                0 => self.send_request(resource).await?,
                1 => render::print_query_docs(resource.query_params()),
                2 => break,
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    async fn send_request(&self, resource: &ResourceSchema) -> Result<()> {
        let theme = ColorfulTheme::default();

        let path_idx = Select::with_theme(&theme)
            .with_prompt(format!("Select {} Endpoint", title(&resource.name)))
            .default(0)
            .items(&resource.paths)
            .interact()?;
        let template = &resource.paths[path_idx];

        let methods: Vec<&str> = resource.methods.iter().map(Method::as_str).collect();
        let method_idx = Select::with_theme(&theme)
            .with_prompt("Select Method")
            .default(0)
            .items(&methods)
            .interact()?;
        let method = resource.methods[method_idx];

        let path = prompt_path(template)?;

        let request = if method.is_write() {
            let values = self.prompt_post_form(resource)?;
            ApiRequest::write(method, path, build_payload(resource, &values))
        } else {
            let raw = prompt_query_params(resource.query_params())?;
            ApiRequest::get(path, Some(build_query_params(resource, &raw)))
        };

        if let Some(body) = &request.body {
            println!("{}", style("Outgoing payload:").dim());
            println!("{}", render::pretty(body));
        }

        let notice = format!("Processing {} request to {}...", request.method, request.path);
        println!("{}", style(notice).dim());
        match self.session.execute(&request).await {
            Ok(json) => {
                let presentation = present(json, resource, &request.path);
                if self.config.inspector {
                    run_inspector(&presentation.raw)?;
                } else {
                    render::print_presentation(&presentation, ChartStyle::Line);
                    if Confirm::with_theme(&theme)
                        .with_prompt("Inspect the response?")
                        .default(false)
                        .interact()?
                    {
                        run_inspector(&presentation.raw)?;
                    }
                }
            }
            Err(e) => render::print_api_error(&e),
        }
        Ok(())
    }

    fn prompt_post_form(&self, resource: &ResourceSchema) -> Result<FieldValues> {
        let theme = ColorfulTheme::default();
        let mut values = FieldValues::new();
        let Some(fields) = &resource.post_fields else {
            let notice = format!("{} takes no request body; sending {{}}.", resource.name);
            println!("{}", style(notice).yellow());
            return Ok(values);
        };

        println!("\n{}", style("POST Request Data").bold().underlined());

        let integration = if resource.kind == ResourceKind::TicketLike {
            let idx = Select::with_theme(&theme)
                .with_prompt("Select Integration")
                .default(0)
                .items(&TICKET_INTEGRATIONS)
                .interact()?;
            let integration = TICKET_INTEGRATIONS[idx];
            println!("Required fields for {} will be marked with *", integration);
            Some(integration)
        } else {
            None
        };

        for field in fields.iter().filter(|f| !NESTED_FIELDS.contains(&f.name.as_str())) {
            let marked = integration.is_some_and(|i| field.required_for(i));
            if let Some(value) = prompt_field(field, None, marked)? {
                values.insert(field.name.clone(), value);
            }
        }

        for field in fields.iter().filter(|f| NESTED_FIELDS.contains(&f.name.as_str())) {
            let Some(sub_fields) = field.sub_fields() else {
                continue;
            };
            println!("\n{}", style(section_title(&field.name)).bold().underlined());
            let mut nested = BTreeMap::new();
            for sub in sub_fields {
                let marked = integration.is_some_and(|i| sub.required_for(i));
                let text: String = Input::with_theme(&theme)
                    .with_prompt(field_prompt(sub, marked))
                    .allow_empty(true)
                    .interact_text()?;
                nested.insert(sub.name.clone(), text);
            }
            values.insert(field.name.clone(), FieldValue::Nested(nested));
        }

        Ok(values)
    }
}

/// Asks for every `{placeholder}` in the template and substitutes it.
pub fn prompt_path(template: &str) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut values = BTreeMap::new();
    for name in path_placeholders(template) {
        let value: String = Input::with_theme(&theme)
            .with_prompt(format!("Value for {{{}}}", name))
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.trim().is_empty() { Err("A path value is required") } else { Ok(()) }
            })
            .interact_text()?;
        values.insert(name, value);
    }
    Ok(fill_path(template, &values))
}

/// Collects optional filters. Anything left blank is reported as absent.
pub fn prompt_query_params(specs: &[QueryParamSpec]) -> Result<BTreeMap<String, Option<RawParam>>> {
    let theme = ColorfulTheme::default();
    let mut raw = BTreeMap::new();
    if specs.is_empty() {
        return Ok(raw);
    }

    println!("\n{}", style("Query Parameters").bold().underlined());
    if !Confirm::with_theme(&theme)
        .with_prompt("Add Query Parameters?")
        .default(false)
        .interact()?
    {
        return Ok(raw);
    }

    for spec in specs {
        let value = match spec.kind {
            ParamKind::Boolean => {
                let choices = ["(not set)", "true", "false"];
                let idx = Select::with_theme(&theme)
                    .with_prompt(spec.title())
                    .default(0)
                    .items(&choices)
                    .interact()?;
                match idx {
                    1 => Some(RawParam::Flag(true)),
                    2 => Some(RawParam::Flag(false)),
                    _ => None,
                }
            }
            kind => {
                let hint = match kind {
                    ParamKind::DateTime => " (YYYY-MM-DD)",
                    ParamKind::Integer => " (number)",
                    _ => "",
                };
                let text: String = Input::with_theme(&theme)
                    .with_prompt(format!("{}{}", spec.title(), hint))
                    .allow_empty(true)
                    .validate_with(|input: &String| -> Result<(), String> {
                        if input.trim().is_empty() || kind == ParamKind::String {
                            return Ok(());
                        }
                        match RawParam::parse(kind, input) {
                            RawParam::Text(_) => Err(format!("Expected {}", kind)),
                            _ => Ok(()),
                        }
                    })
                    .interact_text()?;
                if text.trim().is_empty() { None } else { Some(RawParam::parse(kind, &text)) }
            }
        };
        raw.insert(spec.name.clone(), value);
    }
    Ok(raw)
}

/// Prompts for one non-nested field according to its type. Returns `None`
/// when the field is left blank.
pub fn prompt_field(
    field: &FieldSpec,
    default: Option<&str>,
    marked: bool,
) -> Result<Option<FieldValue>> {
    let theme = ColorfulTheme::default();
    let prompt = field_prompt(field, marked);

    let value = match &field.field_type {
        FieldType::Boolean => {
            let flag = Confirm::with_theme(&theme)
                .with_prompt(prompt)
                .default(false)
                .interact()?;
            Some(FieldValue::Flag(flag))
        }
        FieldType::EnumOf(options) => {
            let idx = Select::with_theme(&theme)
                .with_prompt(prompt)
                .default(0)
                .items(options)
                .interact()?;
            Some(FieldValue::Text(options[idx].clone()))
        }
        FieldType::Nested(_) => None,
        other => {
            let prompt = if other.is_array() {
                format!("{} (comma-separated)", prompt)
            } else {
                prompt
            };
            let mut input = Input::<String>::with_theme(&theme)
                .with_prompt(prompt)
                .allow_empty(true);
            if let Some(def) = default {
                input = input.default(def.to_string());
            }
            let text = input.interact_text()?;
            warn_on_bad_uuids(field, &text);
            if text.is_empty() { None } else { Some(FieldValue::Text(text)) }
        }
    };
    Ok(value)
}

/// UUIDs are not enforced; a malformed one is only pointed out.
fn warn_on_bad_uuids(field: &FieldSpec, text: &str) {
    let candidates = match field.field_type {
        FieldType::Uuid if !text.trim().is_empty() => vec![text.trim().to_string()],
        FieldType::ArrayOfUuid => split_list(text),
        _ => return,
    };
    for candidate in candidates {
        if Uuid::parse_str(&candidate).is_err() {
            warn!(field = %field.name, "value does not look like a UUID");
            let notice = format!("'{}' does not look like a UUID; sending it anyway.", candidate);
            println!("{}", style(notice).yellow());
        }
    }
}

fn field_prompt(field: &FieldSpec, marked: bool) -> String {
    let marker = if marked { "*" } else { "" };
    let hint = match &field.note {
        Some(note) => format!(" [{}; {}]", field.field_type.label(), note),
        None => format!(" [{}]", field.field_type.label()),
    };
    format!("{}{}{}", field.title(), marker, style(hint).dim())
}

fn section_title(field: &str) -> &'static str {
    match field {
        "integration_params" => "Integration Parameters",
        "remote_fields" => "Remote Fields",
        _ => "Nested Fields",
    }
}

fn title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
