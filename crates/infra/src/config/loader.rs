//! Credential loader
//!
//! Loads API credentials from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes a few conventional paths for config files
//! 4. Supports TOML and JSON formats
//!
//! ## Environment Variables
//! - `DATAGO_KEY`: service key for the registry / trade-record API family
//! - `SGIS_ID`: consumer key for the statistical-geography API
//! - `SGIS_KEY`: consumer secret for the statistical-geography API
//!
//! ## File Locations
//! The loader probes `./config.toml`, `./config.json`, `./aptmap.toml` and
//! `./aptmap.json` in the working directory, then the parent directory.

use std::path::{Path, PathBuf};

use aptmap_domain::{AptMapError, Config, DatagoCredentials, Result, SgisCredentials};
use serde::Deserialize;

/// File representation of the credential set.
#[derive(Debug, Deserialize)]
struct FileConfig {
    datago_key: String,
    sgis_id: String,
    sgis_key: String,
}

/// Load credentials with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `AptMapError::Config` if neither source yields a complete,
/// non-empty credential set.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("credentials loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load credentials from environment variables
///
/// # Errors
/// Returns `AptMapError::Config` if any required variable is missing or
/// empty.
pub fn load_from_env() -> Result<Config> {
    let datago_key = env_var("DATAGO_KEY")?;
    let sgis_id = env_var("SGIS_ID")?;
    let sgis_key = env_var("SGIS_KEY")?;

    Ok(Config {
        datago: DatagoCredentials::new(datago_key)?,
        sgis: SgisCredentials::new(sgis_id, sgis_key)?,
    })
}

/// Load credentials from a file
///
/// If `path` is `None`, probes the conventional locations. The format is
/// detected by file extension (`.toml` or `.json`).
///
/// # Errors
/// Returns `AptMapError::Config` if the file is missing, unparsable, or
/// holds empty values.
pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => probe_config_paths().ok_or_else(|| {
            AptMapError::Config("no config file found in conventional locations".to_string())
        })?,
    };

    let raw = std::fs::read_to_string(&path).map_err(|e| {
        AptMapError::Config(format!("failed to read {}: {e}", path.display()))
    })?;

    let file: FileConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&raw)
            .map_err(|e| AptMapError::Config(format!("invalid TOML in {}: {e}", path.display())))?,
        Some("json") => serde_json::from_str(&raw)
            .map_err(|e| AptMapError::Config(format!("invalid JSON in {}: {e}", path.display())))?,
        other => {
            return Err(AptMapError::Config(format!(
                "unsupported config extension {other:?} for {}",
                path.display()
            )))
        }
    };

    Ok(Config {
        datago: DatagoCredentials::new(file.datago_key)?,
        sgis: SgisCredentials::new(file.sgis_id, file.sgis_key)?,
    })
}

fn probe_config_paths() -> Option<PathBuf> {
    let names = ["config.toml", "config.json", "aptmap.toml", "aptmap.json"];
    let bases = [PathBuf::from("."), PathBuf::from("..")];

    for base in &bases {
        for name in &names {
            let candidate = base.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

fn env_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AptMapError::Config(format!("missing environment variable {name}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "datago_key = \"dk\"\nsgis_id = \"id\"\nsgis_key = \"sk\"").unwrap();

        let config = load_from_file(Some(&path)).unwrap();
        assert_eq!(config.datago.service_key, "dk");
        assert_eq!(config.sgis.consumer_key, "id");
        assert_eq!(config.sgis.consumer_secret, "sk");
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"datago_key": "dk", "sgis_id": "id", "sgis_key": "sk"}"#)
            .unwrap();

        let config = load_from_file(Some(&path)).unwrap();
        assert_eq!(config.datago.service_key, "dk");
    }

    #[test]
    fn empty_values_in_file_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "datago_key = \"\"\nsgis_id = \"id\"\nsgis_key = \"sk\"").unwrap();

        let err = load_from_file(Some(&path)).unwrap_err();
        assert!(matches!(err, AptMapError::Config(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_from_file(Some(Path::new("/nonexistent/config.toml"))).unwrap_err();
        assert!(matches!(err, AptMapError::Config(_)));
    }
}
