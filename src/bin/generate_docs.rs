use merge_explorer::catalog::{common_query_params, get_catalog, FieldSpec};

fn main() {
    let catalog = get_catalog();

    println!("# Merge API Explorer Endpoint Reference\n");
    println!("This document is auto-generated. Do not edit manually.\n");

    for category in &catalog.categories {
        println!("## {}\n", category.name);
        println!("{}\n", category.description);

        if !category.is_available() {
            println!("_Coming soon._\n");
            continue;
        }

        for resource in &category.resources {
            println!("### {}\n", resource.name);
            println!("{}\n", resource.description);

            let methods: Vec<&str> = resource.methods.iter().map(|m| m.as_str()).collect();
            println!("**Methods**: {}\n", methods.join(", "));

            println!("#### Endpoints\n");
            for path in &resource.paths {
                println!("- `{}`", path);
            }
            println!();

            if let Some(fields) = &resource.post_fields {
                println!("#### POST Fields\n");
                println!("| Name | Type | Notes |");
                println!("|------|------|-------|");
                for field in fields {
                    print_field(field, "");
                }
                println!();
            }
            println!("---\n");
        }
    }

    println!("## Query Parameters\n");
    println!("Shared by every GET endpoint.\n");
    println!("| Parameter | Type | Required | Description |");
    println!("|-----------|------|----------|-------------|");
    for param in common_query_params() {
        let required = if param.required { "Required" } else { "Optional" };
        println!("| `{}` | {} | {} | {} |", param.name, param.kind, required, param.description);
    }
}

fn print_field(field: &FieldSpec, prefix: &str) {
    println!(
        "| `{}{}` | {} | {} |",
        prefix,
        field.name,
        field.field_type.label(),
        field.note.as_deref().unwrap_or("-")
    );
    for sub in field.sub_fields().unwrap_or(&[]) {
        print_field(sub, &format!("{}.", field.name));
    }
}
