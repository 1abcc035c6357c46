//! Form item configuration, state and the shared item behaviour.

use crate::events::{ListenerId, Listeners};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::rc::Rc;

/// A caller-supplied validation rule. Returns an error message on failure.
pub type Validator = Rc<dyn Fn(&Value) -> Option<String>>;

/// Handler for value changes.
pub type ChangeHandler = Box<dyn FnMut(&Value)>;

/// Handler for state changes.
pub type StateHandler = Box<dyn FnMut(&FormItemState)>;

/// Static configuration of a form item.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormItemConfig {
    /// Field name, used as the key in form values.
    pub name: String,
    /// Human readable label, used in error messages.
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Custom rules, run in order after the required check.
    #[serde(skip)]
    pub validators: Vec<Validator>,
}

impl fmt::Debug for FormItemConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormItemConfig")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("required", &self.required)
            .field("placeholder", &self.placeholder)
            .field("default_value", &self.default_value)
            .field("disabled", &self.disabled)
            .field("class_name", &self.class_name)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl FormItemConfig {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Append a custom validation rule.
    pub fn with_validator(mut self, validator: impl Fn(&Value) -> Option<String> + 'static) -> Self {
        self.validators.push(Rc::new(validator));
        self
    }
}

/// Mutable state of a form item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormItemState {
    pub value: Value,
    pub touched: bool,
    pub error: Option<String>,
    pub validating: bool,
}

/// Check if a value counts as "not filled in".
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Configuration, state and listeners shared by every form item variant.
pub struct ItemCore {
    config: FormItemConfig,
    state: FormItemState,
    initial_value: Value,
    change_listeners: Listeners<Value>,
    state_listeners: Listeners<FormItemState>,
}

impl fmt::Debug for ItemCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemCore")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ItemCore {
    /// Create the core for an item. The configured default value wins over
    /// the variant's `fallback`.
    pub fn new(config: FormItemConfig, fallback: Value) -> Self {
        let initial_value = config.default_value.clone().unwrap_or(fallback);
        Self {
            state: FormItemState {
                value: initial_value.clone(),
                ..Default::default()
            },
            config,
            initial_value,
            change_listeners: Listeners::new(),
            state_listeners: Listeners::new(),
        }
    }

    pub fn config(&self) -> &FormItemConfig {
        &self.config
    }

    pub fn state(&self) -> &FormItemState {
        &self.state
    }

    /// Store a value and notify state listeners.
    pub fn set_value(&mut self, value: Value) {
        self.state.value = value;
        self.notify_state_change();
    }

    /// Mark the item touched. Returns false if it already was.
    pub fn mark_touched(&mut self) -> bool {
        if self.state.touched {
            return false;
        }
        self.state.touched = true;
        true
    }

    /// Run the common checks followed by `type_check`, updating the error
    /// and validating flags.
    pub fn run_validation(&mut self, type_check: Result<(), String>) -> bool {
        self.state.validating = true;
        self.state.error = None;
        self.notify_state_change();

        let outcome = self.check_common().and(type_check);

        self.state.validating = false;
        self.state.error = outcome.err();
        self.notify_state_change();
        self.state.error.is_none()
    }

    fn check_common(&self) -> Result<(), String> {
        if self.config.required && is_empty_value(&self.state.value) {
            return Err(format!("{} is required", self.config.label));
        }
        for validator in &self.config.validators {
            if let Some(error) = validator(&self.state.value) {
                return Err(error);
            }
        }
        Ok(())
    }

    /// Restore the initial value and clear all flags.
    pub fn reset(&mut self) {
        self.state = FormItemState {
            value: self.initial_value.clone(),
            ..Default::default()
        };
        self.notify_state_change();
    }

    pub fn add_change_listener(&mut self, handler: ChangeHandler) -> ListenerId {
        self.change_listeners.add(handler)
    }

    pub fn add_state_listener(&mut self, handler: StateHandler) -> ListenerId {
        self.state_listeners.add(handler)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.change_listeners.remove(id) || self.state_listeners.remove(id)
    }

    pub fn clear_listeners(&mut self) {
        self.change_listeners.clear();
        self.state_listeners.clear();
    }

    pub fn notify_change(&mut self) {
        self.change_listeners.emit(&self.state.value);
    }

    pub fn notify_state_change(&mut self) {
        self.state_listeners.emit(&self.state);
    }
}

/// Capability interface of a form item.
///
/// Variants supply their [`ItemCore`], a kind label, their fallback default
/// and type-specific rules; everything else is provided.
pub trait FormItem {
    fn core(&self) -> &ItemCore;

    fn core_mut(&mut self) -> &mut ItemCore;

    /// Short label identifying the variant, e.g. `"input"`.
    fn kind(&self) -> &'static str;

    /// Rules specific to the variant, run after the required check and the
    /// custom validators pass.
    fn check_value(&self, _value: &Value) -> Result<(), String> {
        Ok(())
    }

    /// Variant-specific entries merged into [`FormItem::component_props`].
    fn extra_props(&self) -> Map<String, Value> {
        Map::new()
    }

    fn name(&self) -> &str {
        &self.core().config().name
    }

    fn config(&self) -> &FormItemConfig {
        self.core().config()
    }

    fn state(&self) -> &FormItemState {
        self.core().state()
    }

    fn value(&self) -> &Value {
        &self.core().state().value
    }

    /// Set the value programmatically. Notifies state listeners only.
    fn set_value(&mut self, value: Value) {
        self.core_mut().set_value(value);
    }

    /// Handle user input: store, notify, and revalidate once touched.
    fn handle_change(&mut self, value: Value) {
        let core = self.core_mut();
        core.set_value(value);
        core.notify_change();
        if core.state().touched {
            self.validate();
        }
    }

    /// Handle focus loss: the first blur marks the item touched and validates.
    fn handle_blur(&mut self) {
        if self.core_mut().mark_touched() {
            self.validate();
            self.core_mut().notify_state_change();
        }
    }

    /// Validate the current value, recording the first failure in the state.
    fn validate(&mut self) -> bool {
        let type_check = self.check_value(self.value());
        self.core_mut().run_validation(type_check)
    }

    /// Restore the default value and clear touched, error and validating.
    fn reset(&mut self) {
        self.core_mut().reset();
    }

    fn on_change(&mut self, handler: ChangeHandler) -> ListenerId {
        self.core_mut().add_change_listener(handler)
    }

    fn on_state_change(&mut self, handler: StateHandler) -> ListenerId {
        self.core_mut().add_state_listener(handler)
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.core_mut().remove_listener(id)
    }

    /// Drop every listener. Called when the item leaves a form.
    fn destroy(&mut self) {
        self.core_mut().clear_listeners();
    }

    /// Property bag handed to a rendering target.
    fn component_props(&self) -> Value {
        let mut props = Map::new();
        props.insert("kind".to_string(), json!(self.kind()));
        props.insert("config".to_string(), json!(self.config()));
        props.insert("state".to_string(), json!(self.state()));
        props.extend(self.extra_props());
        Value::Object(props)
    }
}
