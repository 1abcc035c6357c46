//! Declarative form definitions loaded from JSON.

use super::input::{InputFormItem, InputFormItemConfig};
use super::item::FormItem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a form schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid form schema: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Form item at position {0} has an empty name")]
    EmptyName(usize),
    #[error("Duplicate form item name: {0}")]
    DuplicateName(String),
    #[error("Form item '{name}': minLength {min} exceeds maxLength {max}")]
    InvalidLength { name: String, min: usize, max: usize },
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Declaration of one form item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldSchema {
    Input(InputFormItemConfig),
}

impl FieldSchema {
    pub fn name(&self) -> &str {
        match self {
            Self::Input(config) => &config.base.name,
        }
    }

    /// Build the form item this entry declares.
    pub fn into_item(self) -> Box<dyn FormItem> {
        match self {
            Self::Input(config) => Box::new(InputFormItem::new(config)),
        }
    }

    fn check(&self) -> SchemaResult<()> {
        match self {
            Self::Input(config) => match (config.min_length, config.max_length) {
                (Some(min), Some(max)) if max > 0 && min > max => Err(SchemaError::InvalidLength {
                    name: config.base.name.clone(),
                    min,
                    max,
                }),
                _ => Ok(()),
            },
        }
    }
}

/// An ordered list of form item declarations.
///
/// ```json
/// {
///   "title": "Sign up",
///   "items": [
///     { "kind": "input", "name": "username", "label": "Username",
///       "required": true, "minLength": 3, "maxLength": 20 },
///     { "kind": "input", "name": "email", "label": "Email",
///       "type": "email", "required": true }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<FieldSchema>,
}

impl FormSchema {
    /// Parse and validate a schema.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Read, parse and validate a schema file.
    pub fn load(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading form schema from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize the schema to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check names are present and unique and length bounds are ordered.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        for (index, field) in self.items.iter().enumerate() {
            let name = field.name();
            if name.trim().is_empty() {
                return Err(SchemaError::EmptyName(index));
            }
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateName(name.to_string()));
            }
            field.check()?;
        }
        Ok(())
    }

    /// Build every declared item, in order.
    pub fn into_items(self) -> Vec<Box<dyn FormItem>> {
        self.items.into_iter().map(FieldSchema::into_item).collect()
    }
}
