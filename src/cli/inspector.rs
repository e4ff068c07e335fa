use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use serde_json::Value;

use crate::cli::render::pretty;

const PREVIEW_KEYS: usize = 10;
const PREVIEW_ITEMS: usize = 5;

/// One step into the document.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn label(&self) -> String {
        match self {
            Segment::Key(key) => format!(".{}", key),
            Segment::Index(idx) => format!("[{}]", idx),
        }
    }

    fn resolve<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match self {
            Segment::Key(key) => value.get(key),
            Segment::Index(idx) => value.get(idx),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Dive(Segment),
    Query,
    Back,
    Exit,
}

/// Walks a response as a tree. A list response opens on its `results`
/// array, with each record labelled by its id and name.
pub fn run_inspector(root: &Value) -> Result<()> {
    let mut trail = initial_trail(root);
    let theme = ColorfulTheme::default();

    loop {
        let Some(current) = resolve_trail(root, &trail) else {
            trail.clear();
            continue;
        };

        let location: String = std::iter::once("$".to_string())
            .chain(trail.iter().map(Segment::label))
            .collect();
        println!("\n{}", style(format!("Path: {}", location)).cyan().bold());
        describe(current);

        let steps = steps_for(current, !trail.is_empty());
        let labels: Vec<String> = steps.iter().map(|step| step_label(step, current)).collect();
        let selection = Select::with_theme(&theme)
            .with_prompt("Inspect")
            .default(0)
            .items(&labels)
            .interact()?;

        match &steps[selection] {
            Step::Dive(segment) => trail.push(segment.clone()),
            Step::Query => run_jmespath_query(root)?,
            Step::Back => {
                trail.pop();
            }
            Step::Exit => break,
        }
    }
    Ok(())
}

fn initial_trail(root: &Value) -> Vec<Segment> {
    match root.get("results") {
        Some(Value::Array(_)) => vec![Segment::Key("results".to_string())],
        _ => Vec::new(),
    }
}

fn resolve_trail<'v>(root: &'v Value, trail: &[Segment]) -> Option<&'v Value> {
    trail.iter().try_fold(root, |value, segment| segment.resolve(value))
}

fn describe(value: &Value) {
    match value {
        Value::Object(map) => {
            println!("Object ({} keys)", map.len());
            for (key, v) in map.iter().take(PREVIEW_KEYS) {
                println!("  {}: {}", style(key).blue(), style(preview(v)).dim());
            }
            if map.len() > PREVIEW_KEYS {
                println!("  ...");
            }
        }
        Value::Array(items) => {
            println!("Array ({} items)", items.len());
            for (idx, item) in items.iter().enumerate().take(PREVIEW_ITEMS) {
                println!("  [{}] {}", idx, style(record_summary(item)).dim());
            }
        }
        scalar => println!("Value: {}", pretty(scalar)),
    }
}

fn steps_for(value: &Value, can_go_back: bool) -> Vec<Step> {
    let mut steps: Vec<Step> = match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| v.is_object() || v.is_array())
            .map(|(key, _)| Step::Dive(Segment::Key(key.clone())))
            .collect(),
        Value::Array(items) => (0..items.len())
            .map(|idx| Step::Dive(Segment::Index(idx)))
            .collect(),
        _ => Vec::new(),
    };
    steps.push(Step::Query);
    if can_go_back {
        steps.push(Step::Back);
    }
    steps.push(Step::Exit);
    steps
}

fn step_label(step: &Step, current: &Value) -> String {
    match step {
        Step::Dive(segment) => {
            let summary = segment.resolve(current).map(record_summary).unwrap_or_default();
            format!("Open {} {}", segment.label(), summary)
        }
        Step::Query => "Query (JMESPath)".to_string(),
        Step::Back => "Back".to_string(),
        Step::Exit => "Exit".to_string(),
    }
}

/// `id` and `name` of a record when it has them, else a short preview.
fn record_summary(value: &Value) -> String {
    let Value::Object(map) = value else {
        return preview(value);
    };
    let picked: Vec<String> = ["id", "name"]
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    if picked.is_empty() {
        preview(value)
    } else {
        picked.join(" · ")
    }
}

fn preview(v: &Value) -> String {
    match v {
        Value::String(s) if s.chars().count() > 40 => {
            format!("\"{}…\"", s.chars().take(40).collect::<String>())
        }
        Value::Array(arr) => format!("Array ({})", arr.len()),
        Value::Object(map) => format!("Object ({})", map.len()),
        other => other.to_string(),
    }
}

fn run_jmespath_query(data: &Value) -> Result<()> {
    let theme = ColorfulTheme::default();
    println!("\n{}", style("--- JMESPath Query Mode ---").magenta());
    println!("Enter a query such as results[].id. Empty to exit.");

    loop {
        let input: String = Input::with_theme(&theme)
            .with_prompt("Query")
            .allow_empty(true)
            .interact_text()?;
        if input.is_empty() {
            break;
        }

        match jmespath::compile(&input) {
            Ok(expr) => match expr.search(data) {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&*result)?),
                Err(e) => println!("{}", style(format!("Runtime Error: {}", e)).red()),
            },
            Err(e) => println!("{}", style(format!("Invalid Query: {}", e)).red()),
        }
    }
    Ok(())
}
