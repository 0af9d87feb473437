//! Reading models, options and message files.

use serde::de::DeserializeOwned;
use std::io::{self, Read};
use thiserror::Error;

use thingcheck_core::VerifyOptions;
use thingcheck_schema::{Model, SchemaError};

use crate::OptionArgs;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {origin}: {source}")]
    Read { origin: String, source: io::Error },
    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        source: serde_json::Error,
    },
    #[error("invalid thing model {path}: {source}")]
    Model { path: String, source: SchemaError },
}

/// Reads a file, or stdin when no path is given.
pub fn read_input(path: Option<&str>) -> Result<(String, String), InputError> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map(|text| (path.to_string(), text))
            .map_err(|source| InputError::Read {
                origin: path.to_string(),
                source,
            }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| InputError::Read {
                    origin: "stdin".to_string(),
                    source,
                })?;
            Ok(("stdin".to_string(), buffer))
        }
    }
}

/// Reads and parses a JSON document from a file or stdin.
pub fn read_json<T: DeserializeOwned>(path: Option<&str>) -> Result<T, InputError> {
    let (origin, text) = read_input(path)?;
    serde_json::from_str(&text).map_err(|source| InputError::Json { origin, source })
}

pub fn load_model(path: &str) -> Result<Model, InputError> {
    let (_, text) = read_input(Some(path))?;
    let model = Model::from_json(&text).map_err(|source| InputError::Model {
        path: path.to_string(),
        source,
    })?;
    tracing::info!(path, "loaded thing model");
    Ok(model)
}

/// Options file first, then flag overrides.
pub fn load_options(args: &OptionArgs) -> Result<VerifyOptions, InputError> {
    let mut options = match &args.options {
        Some(path) => read_json::<VerifyOptions>(Some(path.as_str()))?,
        None => VerifyOptions::default(),
    };
    if let Some(policy) = args.unknown_fields {
        options.unknown_fields = policy;
    }
    if let Some(params) = args.action_output_params {
        options.action_output_params = params;
    }
    tracing::debug!(?options, "validator options");
    Ok(options)
}
