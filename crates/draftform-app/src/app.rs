//! Application state wiring the canvas and form adapters together.

use draftform_core::canvas::{CanvasManager, CanvasObject, MemorySurface};
use draftform_core::form::{FormContainer, FormItemId, FormManager, FormSchema, SchemaResult};
use kurbo::{Rect, Vec2};
use peniko::Color;
use serde_json::{Value, json};
use std::path::PathBuf;

/// Form shown when no schema file is given.
pub const DEFAULT_SCHEMA: &str = r#"{
    "title": "Sign up",
    "items": [
        {
            "kind": "input",
            "name": "username",
            "label": "Username",
            "required": true,
            "placeholder": "Enter a username",
            "minLength": 3,
            "maxLength": 20
        },
        {
            "kind": "input",
            "name": "email",
            "label": "Email",
            "type": "email",
            "required": true,
            "placeholder": "Enter an email address"
        }
    ]
}"#;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    /// Form schema to load instead of [`DEFAULT_SCHEMA`].
    pub schema_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "draftform".to_string(),
            schema_path: None,
        }
    }
}

impl AppConfig {
    /// Build a configuration from command line arguments (program name excluded).
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        Self {
            schema_path: args.next().map(PathBuf::from),
            ..Self::default()
        }
    }
}

/// Rendering target that only logs what would be shown.
struct LogContainer;

impl FormContainer for LogContainer {
    fn mount(&mut self, id: FormItemId, props: &Value) {
        log::info!("Mount {} {} ({})", props["kind"], props["config"]["name"], id);
    }

    fn unmount(&mut self, id: FormItemId) {
        log::info!("Unmount {}", id);
    }
}

/// The editor: one drawing surface and one form.
pub struct App {
    config: AppConfig,
    canvas: CanvasManager<MemorySurface<CanvasObject>>,
    form: FormManager,
}

impl App {
    /// Create the application, loading the configured form schema.
    pub fn new(config: AppConfig) -> SchemaResult<Self> {
        let schema = match &config.schema_path {
            Some(path) => FormSchema::load(path)?,
            None => FormSchema::from_json(DEFAULT_SCHEMA)?,
        };

        let mut canvas: CanvasManager<MemorySurface<CanvasObject>> = CanvasManager::new();
        canvas.initialize(MemorySurface::new());
        Self::subscribe_canvas(&mut canvas);

        let mut form = FormManager::new();
        form.initialize(Box::new(LogContainer));
        form.on_form_values_changed(|values| log::debug!("Form values: {}", Value::Object(values.clone())));
        form.add_form_items(schema.into_items());

        Ok(Self {
            config,
            canvas,
            form,
        })
    }

    fn subscribe_canvas(canvas: &mut CanvasManager<MemorySurface<CanvasObject>>) {
        canvas.on_object_added(|obj: &CanvasObject| log::info!("Added {} {}", obj.kind, obj.id()));
        canvas.on_object_removed(|obj: &CanvasObject| log::info!("Removed {} {}", obj.kind, obj.id()));
        canvas.on_selection_changed(|selected: &[CanvasObject]| {
            log::info!("Selection changed: {} object(s)", selected.len())
        });
        canvas.on_object_moving(|obj: &CanvasObject| {
            log::debug!("Moving {} to ({}, {})", obj.id(), obj.bounds.x0, obj.bounds.y0)
        });
        canvas.on_object_modified(|obj: &CanvasObject| {
            log::info!("Modified {} at ({}, {})", obj.id(), obj.bounds.x0, obj.bounds.y0)
        });
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn canvas(&self) -> &CanvasManager<MemorySurface<CanvasObject>> {
        &self.canvas
    }

    pub fn form(&self) -> &FormManager {
        &self.form
    }

    /// Drive both adapters through a scripted session and return a summary.
    pub fn run_demo(&mut self) -> Value {
        log::info!("Starting {}", self.config.title);

        let rect = CanvasObject::new("rect", Rect::new(100.0, 100.0, 200.0, 200.0))
            .with_fill(Color::from_rgba8(255, 0, 0, 255));
        let circle = CanvasObject::new("circle", Rect::new(250.0, 50.0, 350.0, 150.0))
            .with_fill(Color::from_rgba8(0, 0, 255, 255));
        self.canvas.add_objects(vec![rect.clone(), circle.clone()]);

        if let Some(surface) = self.canvas.surface_mut() {
            surface.set_active_objects(vec![rect.clone()]);
            surface.translate_object(rect.id(), Vec2::new(20.0, 0.0));
            surface.translate_object(rect.id(), Vec2::new(20.0, 10.0));
            surface.finish_transform(rect.id());
            surface.set_active_objects(vec![rect.clone(), circle.clone()]);
            surface.discard_active_objects();
        }
        self.canvas.remove_object(&circle);

        // Fill every field with something short, then fix it up.
        let ids = self.form.form_item_ids();
        for &id in &ids {
            self.form.handle_change(id, json!("x"));
            self.form.handle_blur(id);
        }
        let first_pass = self.form.validate_all();
        for (id, value) in ids.iter().zip(["neo", "neo@matrix.io"]) {
            self.form.handle_change(*id, json!(value));
        }
        let second_pass = self.form.validate_all();

        let errors: serde_json::Map<String, Value> = self
            .form
            .form_items()
            .filter_map(|item| {
                let error = item.state().error.clone()?;
                Some((item.name().to_string(), json!(error)))
            })
            .collect();

        json!({
            "objects": self.canvas.objects().len(),
            "firstPassValid": first_pass,
            "secondPassValid": second_pass,
            "values": self.form.form_values(),
            "errors": errors,
        })
    }
}
