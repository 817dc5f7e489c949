//! Fields command - list the standard field catalog.

use colored::Colorize;
use sumstats::{Schema, SchemaOptions};

pub fn run(json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::standard(&SchemaOptions::new().with_column_order(true))?;

    if json_output {
        let fields: Vec<_> = schema
            .fields()
            .iter()
            .map(|f| {
                serde_json::json!({
                    "id": f.id,
                    "label": f.label,
                    "type": f.field_type,
                    "mandatory": f.mandatory,
                    "dependency": f.dependency.as_deref().and_then(|d| schema.field(d)).map(|d| &d.label),
                    "position": f.fixed_position,
                    "description": f.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    println!(
        "{:<26} {:<8} {:<10} {:<20} {}",
        "label".bold(),
        "type".bold(),
        "mandatory".bold(),
        "or instead".bold(),
        "position".bold()
    );
    for field in schema.fields() {
        let dependency = field
            .dependency
            .as_deref()
            .and_then(|d| schema.field(d))
            .map(|d| d.label.as_str())
            .unwrap_or("-");
        let position = field
            .fixed_position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let mandatory = if field.mandatory {
            "yes".green()
        } else {
            "no".normal()
        };
        println!(
            "{:<26} {:<8} {:<10} {:<20} {}",
            field.label.cyan(),
            field.field_type.label(),
            mandatory,
            dependency,
            position
        );
    }
    println!();
    println!(
        "Minimum rows: {}, extensions: {}",
        schema.minimum_row_count(),
        schema.accepted_extensions().join(", ")
    );

    Ok(())
}
