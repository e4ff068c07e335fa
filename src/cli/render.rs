use console::{pad_str, style, Alignment};
use merge_explorer::catalog::QueryParamSpec;
use merge_explorer::presenter::{Chart, DailySeries, Presentation, Table};
use merge_explorer::ApiError;
use serde_json::Value;

const MAX_CELL_WIDTH: usize = 32;
const MAX_BAR_WIDTH: usize = 40;

/// Explorer draws a line chart, the tools dashboard a bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Line,
    Bar,
}

pub fn print_presentation(presentation: &Presentation, chart_style: ChartStyle) {
    println!("\n{}", style("Raw JSON Response").bold().underlined());
    println!("{}", pretty(&presentation.raw));

    let Some(table) = &presentation.table else {
        return;
    };
    println!("\n{}", style("Results Table").bold().underlined());
    print!("{}", format_table(table));
    println!("{} {}", style("Total Records:").bold(), table.count());

    match &presentation.chart {
        Some(Chart::Daily(series)) => {
            println!("\n{}", style("Tickets Over Time").bold().underlined());
            print!("{}", format_chart(series, chart_style));
        }
        Some(Chart::NoDateField) => {
            println!("{}", style("No date field found to plot the graph.").yellow());
        }
        None => {}
    }
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn format_table(table: &Table) -> String {
    if table.columns.is_empty() {
        return format!("{}\n", style("(no records)").dim());
    }

    let cells: Vec<Vec<String>> = (0..table.count())
        .map(|row| table.columns.iter().map(|c| cell_text(table.cell(row, c))).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| console::measure_text_width(&r[i]))
                .chain(std::iter::once(console::measure_text_width(c)))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| style(pad_str(c, *w, Alignment::Left, Some("…"))).bold().to_string())
        .collect();
    out.push_str(header.join(" │ ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&rule.join("─┼─"));
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad_str(cell, *w, Alignment::Left, Some("…")).into_owned())
            .collect();
        out.push_str(line.join(" │ ").trim_end());
        out.push('\n');
    }
    out
}

pub fn format_chart(series: &DailySeries, chart_style: ChartStyle) -> String {
    let max = series.max_count().max(1);
    let mut out = String::new();
    for (day, count) in &series.points {
        let width = (count * MAX_BAR_WIDTH / max).max(1);
        let mark = match chart_style {
            ChartStyle::Bar => style("█".repeat(width)).cyan().to_string(),
            ChartStyle::Line => format!("{}{}", " ".repeat(width - 1), style("●").cyan()),
        };
        out.push_str(&format!("{} │ {} {}\n", day.format("%Y-%m-%d"), mark, count));
    }
    out
}

pub fn print_api_error(err: &ApiError) {
    println!("{}", style(format!("Error fetching data: {}", err)).red().bold());
    println!("  kind: {}", err.kind());
    if let Some(status) = err.status() {
        println!("  status: {}", status);
    }
    if let Some(body) = err.body() {
        println!("{}", style("Error Response:").red());
        println!("{}", body);
    }
}

pub fn print_query_docs(params: &[QueryParamSpec]) {
    if params.is_empty() {
        println!("{}", style("This resource takes no query parameters.").dim());
        return;
    }
    println!("\n{}", style("API Documentation").bold().underlined());
    let records = params
        .iter()
        .map(|p| {
            serde_json::json!({
                "Parameter": p.name,
                "Type": p.kind.to_string(),
                "Required": if p.required { "Required" } else { "Optional" },
                "Description": p.description,
            })
        })
        .collect();
    let mut table = Table::from_records(records);
    table.columns = ["Parameter", "Type", "Required", "Description"].map(String::from).to_vec();
    print!("{}", format_table(&table));
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.replace('\n', " "),
        Some(other) => other.to_string(),
    }
}
