//! Print the admin registry

use anyhow::Result;
use clap::Parser;

use shelfctl_server::admin::{AdminSite, FieldDescriptor};

#[derive(Parser, Debug)]
pub struct ModelsArgs {
    /// Output the full descriptors as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_models(args: ModelsArgs) -> Result<()> {
    let site = AdminSite::default_site();

    if args.json {
        println!("{}", serde_json::to_string_pretty(site.models())?);
        return Ok(());
    }

    for model in site.models() {
        println!(
            "{}.{} ({}) -> {}",
            model.app_label, model.model_name, model.table, model.api_path
        );
        for field in &model.fields {
            println!("  {}", describe(field));
        }
    }
    Ok(())
}

fn describe(field: &FieldDescriptor) -> String {
    let mut flags = Vec::new();
    if field.required {
        flags.push("required".to_string());
    }
    if field.unique {
        flags.push("unique".to_string());
    }
    if field.read_only {
        flags.push("read-only".to_string());
    }
    if let Some(max) = field.max_length {
        flags.push(format!("max {}", max));
    }
    if let Some(min) = field.min_length {
        flags.push(format!("min {}", min));
    }
    if let (Some(digits), Some(places)) = (field.max_digits, field.decimal_places) {
        flags.push(format!("decimal({},{})", digits, places));
    }
    if !field.choices.is_empty() {
        let codes: Vec<_> = field.choices.iter().map(|c| c.value).collect();
        flags.push(format!("one of {}", codes.join("|")));
    }

    let mut line = format!("{:<18} {:?}", field.name, field.kind);
    if !flags.is_empty() {
        line.push_str(&format!(" [{}]", flags.join(", ")));
    }
    line
}
