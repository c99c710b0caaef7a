pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read a request from `--input` if given, otherwise from piped stdin.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_document(path);
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Err("no input: pass --input <file> or pipe JSON on stdin".into()),
    }
}
