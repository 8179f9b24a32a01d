//! Subcommand implementations for `mg`

use anyhow::{bail, Context, Result};
use modelgate::{DefaultValue, ModelRegistry, Schema, SchemaDocument};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

fn load_registry(path: &Path) -> Result<ModelRegistry> {
    let document = SchemaDocument::load(path)
        .with_context(|| format!("Failed to load schema document {}", path.display()))?;
    let registry = document
        .build()
        .with_context(|| format!("Invalid schema document {}", path.display()))?;
    tracing::debug!(path = %path.display(), models = registry.len(), "loaded schema document");
    Ok(registry)
}

fn select_model(registry: &ModelRegistry, name: Option<&str>) -> Result<Arc<Schema>> {
    match name {
        Some(name) => Ok(Arc::clone(registry.require(name)?)),
        None => match registry.last() {
            Some(schema) => Ok(Arc::clone(schema)),
            None => bail!("Schema document declares no models"),
        },
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read payload from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read payload {}", input))
    }
}

/// Validate a payload; returns the process exit code
pub fn validate(schema_path: &Path, model: Option<&str>, input: &str, pretty: bool) -> Result<i32> {
    let registry = load_registry(schema_path)?;
    let schema = select_model(&registry, model)?;
    let payload = read_input(input)?;

    match schema.validate_json(&payload) {
        Ok(instance) => {
            if pretty {
                println!("{}", instance.to_text_pretty());
            } else {
                println!("{}", instance.to_text());
            }
            Ok(0)
        }
        Err(errors) => {
            let report = errors.to_json();
            if pretty {
                println!("{:#}", report);
            } else {
                println!("{}", report);
            }
            eprintln!("{} validation error(s) for {}", errors.len(), schema.name());
            Ok(1)
        }
    }
}

/// Print the JSON Schema of a model
pub fn json_schema(schema_path: &Path, model: Option<&str>) -> Result<()> {
    let registry = load_registry(schema_path)?;
    let schema = select_model(&registry, model)?;
    println!("{:#}", schema.json_schema());
    Ok(())
}

/// Print a field listing of one or every model
pub fn inspect(schema_path: &Path, model: Option<&str>) -> Result<()> {
    let registry = load_registry(schema_path)?;
    let schemas: Vec<Arc<Schema>> = match model {
        Some(_) => vec![select_model(&registry, model)?],
        None => registry.iter().cloned().collect(),
    };

    for (i, schema) in schemas.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", describe(schema));
    }
    Ok(())
}

fn describe(schema: &Schema) -> String {
    let mut out = String::new();
    match schema.description() {
        Some(desc) => out.push_str(&format!("{} - {}\n", schema.name(), desc)),
        None => out.push_str(&format!("{}\n", schema.name())),
    }

    let config = schema.config();
    out.push_str(&format!(
        "  config: extra={:?} frozen={} validate_assignment={} str_strip_whitespace={}\n",
        config.extra, config.frozen, config.validate_assignment, config.str_strip_whitespace
    ));

    let width = schema.fields().iter().map(|f| f.name.len()).max().unwrap_or(0);
    for field in schema.fields() {
        let default = match &field.default {
            None => "required".to_string(),
            Some(DefaultValue::Value(value)) => format!("default={}", value),
            Some(DefaultValue::Factory(_)) => "default_factory".to_string(),
        };
        let mut line = format!("  {:<width$}  {}  {}", field.name, field.field_type, default, width = width);
        if !field.constraints.is_empty() {
            let kinds: Vec<String> = field.constraints.iter().map(|c| c.kind().to_string()).collect();
            line.push_str(&format!("  [{}]", kinds.join(", ")));
        }
        if let Some(alias) = &field.alias {
            line.push_str(&format!("  alias={}", alias));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
