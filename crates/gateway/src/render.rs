//! Text rendering of decoded values

use nickel_bridge_core::{Error, ExportFormat, Result, Value};

/// Render `value` as `format` text
///
/// `raw` only accepts strings, matching what an evaluator's raw export does.
pub fn render(value: &Value, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(value),
        ExportFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| Error::interchange("yaml", e.to_string()))
        }
        ExportFormat::Toml => {
            if value.as_record().is_none() {
                return Err(Error::interchange(
                    "toml",
                    format!("top-level {} cannot be written as a table", value.type_name()),
                ));
            }
            toml::to_string(value).map_err(|e| Error::interchange("toml", e.to_string()))
        }
        ExportFormat::Raw => match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(Error::interchange(
                "raw",
                format!("only strings have a raw form, got {}", other.type_name()),
            )),
        },
        ExportFormat::Binary => Err(Error::configuration(
            "binary output cannot be rendered as text",
        )),
    }
}

/// Pretty JSON with a trailing newline
pub fn to_json(value: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}
