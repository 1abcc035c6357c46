//! Text input form item.

use super::item::{FormItem, FormItemConfig, ItemCore};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::borrow::Cow;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// HTML-style input type of a text field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Password,
    Email,
    Number,
    Tel,
    Url,
}

impl InputType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Email => "email",
            Self::Number => "number",
            Self::Tel => "tel",
            Self::Url => "url",
        }
    }
}

/// Configuration of an [`InputFormItem`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputFormItemConfig {
    #[serde(flatten)]
    pub base: FormItemConfig,
    #[serde(rename = "type", default)]
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl InputFormItemConfig {
    pub fn new(base: FormItemConfig) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    pub fn with_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

/// A single-line text field.
///
/// On top of the common checks it enforces length bounds (counted in
/// characters), an email shape for `email` inputs and URL parseability for
/// `url` inputs. Empty values skip the email and URL checks but not the
/// length bounds.
#[derive(Debug)]
pub struct InputFormItem {
    core: ItemCore,
    input_type: InputType,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl InputFormItem {
    pub fn new(config: InputFormItemConfig) -> Self {
        Self {
            core: ItemCore::new(config.base, Value::String(String::new())),
            input_type: config.input_type,
            // A zero bound is treated as unset.
            min_length: config.min_length.filter(|&min| min > 0),
            max_length: config.max_length.filter(|&max| max > 0),
        }
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }
}

fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

impl FormItem for InputFormItem {
    fn core(&self) -> &ItemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ItemCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "input"
    }

    fn check_value(&self, value: &Value) -> Result<(), String> {
        let text = value_text(value);
        let length = text.chars().count();
        let label = &self.config().label;

        if let Some(min) = self.min_length {
            if length < min {
                return Err(format!("{label} must be at least {min} characters"));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(format!("{label} must be at most {max} characters"));
            }
        }
        if text.is_empty() {
            return Ok(());
        }

        match self.input_type {
            InputType::Email if !EMAIL_PATTERN.is_match(&text) => {
                Err("Please enter a valid email address".to_string())
            }
            InputType::Url => url::Url::parse(&text)
                .map(|_| ())
                .map_err(|_| "Please enter a valid URL".to_string()),
            _ => Ok(()),
        }
    }

    fn extra_props(&self) -> Map<String, Value> {
        let mut props = Map::new();
        props.insert("type".to_string(), json!(self.input_type.as_str()));
        props.insert("minLength".to_string(), json!(self.min_length));
        props.insert("maxLength".to_string(), json!(self.max_length));
        props
    }
}
