use serde_json::Value;
use std::io::{self, Read};

/// Read a request piped on stdin, as JSON or, failing that, YAML.
/// Returns None if stdin is a TTY or carries nothing.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_document(&buffer)
}

fn parse_document(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => match serde_yaml::from_str::<Value>(trimmed) {
            Ok(value) if value.is_object() => Ok(Some(value)),
            _ => Err(format!("stdin is neither JSON nor a YAML mapping: {json_err}").into()),
        },
    }
}
