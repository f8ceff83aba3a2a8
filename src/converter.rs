//! Conversion between JSON, YAML and TOML configuration documents.
//!
//! Documents are parsed into [`ConfigValue`], a format-neutral tree, and then
//! re-encoded in the target format. Mappings are kept sorted by key so output
//! does not depend on the key order of the input.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Parse a format tag such as `"json"`, `"yaml"` or `"toml"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("unsupported source format: {0}")]
    UnsupportedSource(String),

    #[error("unsupported target format: {0}")]
    UnsupportedTarget(String),

    #[error("invalid source {format}: {reason}")]
    InvalidSource { format: Format, reason: String },

    #[error("error converting to target format: {reason}")]
    Encode { format: Format, reason: String },
}

/// Format-neutral document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(BTreeMap<String, ConfigValue>),
}

/// Convert `input` from the `from` format to the `to` format.
pub fn convert(input: &str, from: &str, to: &str) -> Result<String, ConvertError> {
    let source =
        Format::from_tag(from).ok_or_else(|| ConvertError::UnsupportedSource(from.to_string()))?;
    let target =
        Format::from_tag(to).ok_or_else(|| ConvertError::UnsupportedTarget(to.to_string()))?;

    let document = parse(input, source)?;
    let output = encode(&document, target)?;
    tracing::debug!(from = %source, to = %target, bytes = output.len(), "converted config");
    Ok(output)
}

/// Parse a document into its intermediate form. The root must be a mapping.
pub fn parse(input: &str, format: Format) -> Result<ConfigValue, ConvertError> {
    let invalid = |reason: String| ConvertError::InvalidSource { format, reason };

    let value = match format {
        Format::Json => {
            let v: serde_json::Value =
                serde_json::from_str(input).map_err(|e| invalid(e.to_string()))?;
            ConfigValue::from(v)
        }
        Format::Yaml => {
            let mut v: serde_yaml::Value =
                serde_yaml::from_str(input).map_err(|e| invalid(e.to_string()))?;
            v.apply_merge().map_err(|e| invalid(e.to_string()))?;
            match v {
                // An empty YAML document is an empty mapping.
                serde_yaml::Value::Null => ConfigValue::Mapping(BTreeMap::new()),
                other => ConfigValue::try_from(other).map_err(invalid)?,
            }
        }
        Format::Toml => {
            let table: toml::Table = toml::from_str(input).map_err(|e| invalid(e.to_string()))?;
            ConfigValue::from(toml::Value::Table(table))
        }
    };

    match value {
        ConfigValue::Mapping(_) => Ok(value),
        other => Err(invalid(format!(
            "expected a mapping at the document root, found {}",
            other.kind()
        ))),
    }
}

/// Encode an intermediate document in `format`.
pub fn encode(value: &ConfigValue, format: Format) -> Result<String, ConvertError> {
    let failed = |reason: String| ConvertError::Encode { format, reason };

    match format {
        Format::Json => {
            if let Some(path) = value.find_path("", &|v: &ConfigValue| {
                matches!(v, ConfigValue::Float(f) if !f.is_finite())
            }) {
                return Err(failed(format!(
                    "non-finite number at `{}` cannot be represented",
                    display_path(&path)
                )));
            }
            serde_json::to_string_pretty(value).map_err(|e| failed(e.to_string()))
        }
        Format::Yaml => serde_yaml::to_string(value).map_err(|e| failed(e.to_string())),
        Format::Toml => {
            let is_null = |v: &ConfigValue| matches!(v, ConfigValue::Null);
            if let Some(path) = value.find_path("", &is_null) {
                return Err(failed(format!(
                    "null value at `{}` cannot be represented",
                    display_path(&path)
                )));
            }
            if !matches!(value, ConfigValue::Mapping(_)) {
                return Err(failed(format!(
                    "document root must be a table, found {}",
                    value.kind()
                )));
            }
            toml::to_string(value).map_err(|e| failed(e.to_string()))
        }
    }
}

impl ConfigValue {
    fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "a boolean",
            ConfigValue::Integer(_) => "an integer",
            ConfigValue::Float(_) => "a float",
            ConfigValue::String(_) => "a string",
            ConfigValue::Sequence(_) => "a sequence",
            ConfigValue::Mapping(_) => "a mapping",
        }
    }

    /// Dotted path of the first node matching `pred`, if any.
    fn find_path(&self, path: &str, pred: &dyn Fn(&ConfigValue) -> bool) -> Option<String> {
        if pred(self) {
            return Some(path.to_string());
        }
        match self {
            ConfigValue::Sequence(items) => items
                .iter()
                .enumerate()
                .find_map(|(i, item)| item.find_path(&format!("{path}[{i}]"), pred)),
            ConfigValue::Mapping(map) => map.iter().find_map(|(k, v)| {
                let child = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                v.find_path(&child, pred)
            }),
            _ => None,
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Integer(i) => serializer.serialize_i64(*i),
            ConfigValue::Float(f) => serializer.serialize_f64(*f),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(obj) => ConfigValue::Mapping(
                obj.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<serde_yaml::Value> for ConfigValue {
    type Error = String;

    fn try_from(v: serde_yaml::Value) -> Result<Self, Self::Error> {
        Ok(match v {
            serde_yaml::Value::Null => ConfigValue::Null,
            serde_yaml::Value::Bool(b) => ConfigValue::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => ConfigValue::String(s),
            serde_yaml::Value::Sequence(items) => ConfigValue::Sequence(
                items
                    .into_iter()
                    .map(ConfigValue::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(mapping) => {
                let mut out = BTreeMap::new();
                for (k, v) in mapping {
                    out.insert(yaml_key(k)?, ConfigValue::try_from(v)?);
                }
                ConfigValue::Mapping(out)
            }
            serde_yaml::Value::Tagged(tagged) => ConfigValue::try_from(tagged.value)?,
        })
    }
}

/// Mapping keys must be scalars; numbers and booleans are stringified.
fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}

impl From<toml::Value> for ConfigValue {
    fn from(v: toml::Value) -> Self {
        match v {
            toml::Value::String(s) => ConfigValue::String(s),
            toml::Value::Integer(i) => ConfigValue::Integer(i),
            toml::Value::Float(f) => ConfigValue::Float(f),
            toml::Value::Boolean(b) => ConfigValue::Bool(b),
            toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
            toml::Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(ConfigValue::from).collect())
            }
            toml::Value::Table(table) => ConfigValue::Mapping(
                table
                    .into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}
