use anyhow::Result;
use chrono::Local;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use merge_explorer::catalog::get_catalog;
use merge_explorer::payload::FieldValues;
use merge_explorer::presenter::Chart;
use merge_explorer::tools::{CreateForm, Tool, TOOLS};
use merge_explorer::{present, ApiRequest, Method, ResourceSchema, Session};

use crate::cli::builder::{prompt_field, ExplorerState};
use crate::cli::config::Config;
use crate::cli::render::{self, ChartStyle};

pub async fn run(session: &Session, config: &Config) -> Result<()> {
    println!("Welcome to Merge API Explorer!");

    loop {
        println!("\n--- Merge API Explorer ---");
        println!("Base URL: {}", session.client().base_url());
        println!("--------------------------");

        let choices = vec![
            "Explore Endpoints",
            "Tools Dashboard",
            "Exit",
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select Action")
            .default(0)
            .items(&choices)
            .interact()?;

        match selection {
            0 => ExplorerState::new(session, config).run().await?,
            1 => run_tools(session).await?,
            2 => break,
            _ => unreachable!(),
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// One tab per tool: list, chart for tickets, and a create form where the
/// resource accepts writes.
pub async fn run_tools(session: &Session) -> Result<()> {
    let catalog = get_catalog();
    let mut tabs: Vec<String> = TOOLS.iter().map(Tool::label).collect();
    tabs.push("Back".to_string());

    loop {
        println!("\n{}", style("🧩 Merge MCP Explorer").bold());
        println!("{}", style("Explore, create, and visualize.").dim());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select Tool")
            .default(0)
            .items(&tabs)
            .interact()?;

        let Some(tool) = TOOLS.get(selection) else {
            break;
        };
        let schema = tool.schema(catalog)?;
        tool_tab(session, tool, schema).await?;
    }
    Ok(())
}

async fn tool_tab(session: &Session, tool: &Tool, schema: &ResourceSchema) -> Result<()> {
    println!("\n{}", style(tool.label()).bold().underlined());

    match session.execute(&ApiRequest::get(tool.endpoint, None)).await {
        Ok(json) => {
            let presentation = present(json, schema, tool.endpoint);
            match &presentation.table {
                Some(table) => {
                    print!("{}", render::format_table(table));
                    println!("{} {}", style(format!("Total {}:", tool.name)).bold(), table.count());
                    if let Some(Chart::Daily(series)) = &presentation.chart {
                        if table.count() > 0 {
                            println!("\n{}", style("Tickets Over Time").bold().underlined());
                            print!("{}", render::format_chart(series, ChartStyle::Bar));
                        }
                    }
                }
                None => println!("{}", style(format!("No {} found.", tool.name)).yellow()),
            }
        }
        Err(e) => {
            render::print_api_error(&e);
            println!("{}", style(format!("No {} found.", tool.name)).yellow());
        }
    }

    if let Some(form) = tool.create_form() {
        let create = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Create a new {}?", tool.name))
            .default(false)
            .interact()?;
        if create {
            create_record(session, tool, schema, form).await?;
        }
    } else {
        println!("{}", style("POST not implemented for this tool in the demo.").dim());
    }

    println!("---");
    println!(
        "{}",
        style(format!("Powered by Merge MCP | {}", Local::now().format("%Y-%m-%d %H:%M:%S"))).dim()
    );
    Ok(())
}

async fn create_record(
    session: &Session,
    tool: &Tool,
    schema: &ResourceSchema,
    form: CreateForm,
) -> Result<()> {
    println!("\n{}", style(form.title()).bold());
    let mut values = FieldValues::new();
    for field in form.fields(schema) {
        if let Some(value) = prompt_field(&field, form.default_for(&field.name), false)? {
            values.insert(field.name.clone(), value);
        }
    }

    let request = ApiRequest::write(Method::Post, tool.endpoint, form.build(schema, &values));
    match session.execute(&request).await {
        Ok(result) => {
            println!("{}", style("Created!").green().bold());
            println!("Response: {}", render::pretty(&result));
        }
        Err(e) => render::print_api_error(&e),
    }
    Ok(())
}
