//! draftform Core Library
//!
//! Adapters between an editor front-end and its collaborators: a canvas
//! adapter republishing drawing-surface events, and a form adapter managing
//! form items with validation and value tracking.

pub mod canvas;
pub mod events;
pub mod form;

pub use canvas::{
    CanvasManager, CanvasObject, DrawingSurface, MemorySurface, ObjectId, SurfaceEvent,
    SurfaceEventKind,
};
pub use events::{ListenerId, Listeners};
pub use form::{
    FormContainer, FormItem, FormItemConfig, FormItemId, FormItemState, FormManager, FormSchema,
    FormStates, FormValues, InputFormItem, InputFormItemConfig, InputType, SchemaError,
};
