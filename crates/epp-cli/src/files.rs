//! Endpoint configuration and request files.
//!
//! The endpoint is always TOML. Request files (registrations, contact
//! details) are JSON when the extension says so and TOML otherwise.

use std::{fs, path::Path};

use epp_core::EndpointConfig;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CliError;

/// Read and validate the endpoint configuration.
pub fn load_config(path: &Path) -> Result<EndpointConfig, CliError> {
    let config: EndpointConfig = parse_toml(path, &read(path)?)?;
    config.validate()?;
    debug!(path = %path.display(), host = %config.host, port = config.port, "configuration loaded");
    Ok(config)
}

/// Read a request file as JSON or TOML, by extension.
pub fn load_request<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = read(path)?;
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        serde_json::from_str(&text)
            .map_err(|e| CliError::Format { path: path.to_path_buf(), reason: e.to_string() })
    } else {
        parse_toml(path, &text)
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

fn parse_toml<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T, CliError> {
    toml::from_str(text).map_err(|e| CliError::Format { path: path.to_path_buf(), reason: e.message().to_string() })
}
