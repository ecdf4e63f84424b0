use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message with optional structured data
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(Value::Object(fields)) = data {
                for (key, value) in fields {
                    match value {
                        Value::String(s) => println!("  {}: {}", key, s),
                        other => println!("  {}: {}", key, other),
                    }
                }
            }
        }
    }
    Ok(())
}

/// Output a list of strings, one per line in text mode
pub fn output_list(output_format: OutputFormat, key: &str, items: &[String]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut body = serde_json::Map::new();
            body.insert(key.to_string(), json!(items));
            println!("{}", serde_json::to_string_pretty(&Value::Object(body))?);
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No {} found", key);
            }
            for item in items {
                println!("{}", item);
            }
        }
    }
    Ok(())
}
