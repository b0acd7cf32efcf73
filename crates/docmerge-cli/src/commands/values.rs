//! Property values supplied on the command line or in a JSON file.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::read_to_string;
use std::path::PathBuf;

use clap::Args;
use docmerge::PropertyStore;
use miette::{IntoDiagnostic, WrapErr};
use serde::Deserialize;

/// Arguments shared by commands that take property values.
#[derive(Debug, Clone, Args)]
pub struct ValueArgs {
    /// Property values in name=value format (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// JSON file holding an object of property values
    #[arg(long)]
    pub values: Option<PathBuf>,
}

/// A JSON property value. Numbers and booleans are taken as written.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(number) => write!(f, "{number}"),
            Scalar::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl ValueArgs {
    /// Collect the property store. `-p` values override the file.
    pub fn load(&self) -> miette::Result<PropertyStore> {
        let mut properties = PropertyStore::new();
        if let Some(path) = &self.values {
            let content = read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot read values file {}", path.display()))?;
            properties.extend(parse_values(&content).wrap_err_with(|| {
                format!("Values file {} is not a JSON object of scalars", path.display())
            })?);
        }
        properties.extend(self.params.iter().cloned());
        Ok(properties)
    }
}

/// Parse a JSON object of scalar values into name/value pairs.
fn parse_values(content: &str) -> miette::Result<Vec<(String, String)>> {
    let values: BTreeMap<String, Scalar> = serde_json::from_str(content).into_diagnostic()?;
    Ok(values
        .into_iter()
        .map(|(name, value)| (name, value.to_string()))
        .collect())
}

/// Parse a name=value parameter string.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter format '{s}': expected name=value"))?;
    Ok((name.to_string(), value.to_string()))
}
