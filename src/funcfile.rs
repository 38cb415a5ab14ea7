//! Local func file loading
//!
//! A func file (`func.toml` or `func.json` in the working directory) supplies
//! default route attributes when flags are absent. Unknown keys are ignored so
//! the same file can carry build settings.

use crate::ui;
use anyhow::{Context, Result, bail};
use routekit::LocalDescriptor;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File names probed, in order
pub const FUNCFILE_NAMES: [&str; 2] = ["func.toml", "func.json"];

#[derive(Debug, Deserialize)]
struct FuncFile {
    name: Option<String>,
    version: Option<String>,
    format: Option<String>,
    max_concurrency: Option<u32>,
    timeout: Option<Timeout>,
    path: Option<String>,
}

/// Timeout as integer seconds or a duration literal
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Timeout {
    Seconds(u64),
    Literal(String),
}

impl Timeout {
    fn as_secs(&self) -> Result<u64> {
        match self {
            Timeout::Seconds(secs) => Ok(*secs),
            Timeout::Literal(literal) => ui::parse_duration(literal)
                .map(|d| d.as_secs())
                .map_err(anyhow::Error::msg),
        }
    }
}

/// Find the func file in `dir`, if any
pub fn find(dir: &Path) -> Option<PathBuf> {
    FUNCFILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load the func file from `dir`. A missing file is not an error.
pub fn load(dir: &Path) -> Result<Option<LocalDescriptor>> {
    match find(dir) {
        Some(path) => {
            log::debug!("Loading func file {}", path.display());
            parse(&path).map(Some)
        }
        None => {
            log::debug!("No func file in {}", dir.display());
            Ok(None)
        }
    }
}

/// Parse a func file, choosing the format by extension
pub fn parse(path: &Path) -> Result<LocalDescriptor> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read func file: {}", path.display()))?;

    let file: FuncFile = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))?,
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON format in {}", path.display()))?,
        _ => bail!("Unsupported func file format: {}", path.display()),
    };

    let timeout = file
        .timeout
        .as_ref()
        .map(Timeout::as_secs)
        .transpose()
        .with_context(|| format!("Invalid timeout in {}", path.display()))?;

    Ok(LocalDescriptor {
        name: file.name,
        version: file.version,
        format: file.format,
        max_concurrency: file.max_concurrency,
        timeout,
        path: file.path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(load(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_toml() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("func.toml"),
            r#"
name = "acme/hello"
version = "0.0.2"
runtime = "go"
format = "json"
max_concurrency = 3
timeout = "1m30s"
path = "/hello"
"#,
        )
        .unwrap();

        let ff = load(temp.path()).unwrap().unwrap();
        assert_eq!(ff.full_name().as_deref(), Some("acme/hello:0.0.2"));
        assert_eq!(ff.format.as_deref(), Some("json"));
        assert_eq!(ff.max_concurrency, Some(3));
        assert_eq!(ff.timeout, Some(90));
        assert_eq!(ff.path.as_deref(), Some("/hello"));
    }

    #[test]
    fn test_load_json_with_integer_timeout() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("func.json"),
            r#"{"name": "acme/hello", "timeout": 45}"#,
        )
        .unwrap();

        let ff = load(temp.path()).unwrap().unwrap();
        assert_eq!(ff.full_name().as_deref(), Some("acme/hello"));
        assert_eq!(ff.timeout, Some(45));
        assert!(ff.path.is_none());
    }

    #[test]
    fn test_toml_preferred_over_json() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("func.toml"), "name = \"from-toml\"\n").unwrap();
        fs::write(temp.path().join("func.json"), r#"{"name": "from-json"}"#).unwrap();

        let ff = load(temp.path()).unwrap().unwrap();
        assert_eq!(ff.name.as_deref(), Some("from-toml"));
    }

    #[test]
    fn test_invalid_timeout() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("func.toml"), "timeout = \"soon\"\n").unwrap();

        let err = load(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid timeout"));
    }

    #[test]
    fn test_invalid_json() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("func.json"), "{").unwrap();

        assert!(load(temp.path()).is_err());
    }
}
