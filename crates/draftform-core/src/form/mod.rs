//! Form items and the form adapter that owns them.

mod input;
mod item;
mod manager;
mod schema;

pub use input::{InputFormItem, InputFormItemConfig, InputType};
pub use item::{
    ChangeHandler, FormItem, FormItemConfig, FormItemState, ItemCore, StateHandler, Validator,
    is_empty_value,
};
pub use manager::{FormContainer, FormItemId, FormManager};
pub use schema::{FieldSchema, FormSchema, SchemaError, SchemaResult};

use std::collections::BTreeMap;

/// Dynamically typed form value.
pub type FormValue = serde_json::Value;

/// Form values keyed by item name.
pub type FormValues = serde_json::Map<String, FormValue>;

/// Form item states keyed by item name.
pub type FormStates = BTreeMap<String, FormItemState>;
