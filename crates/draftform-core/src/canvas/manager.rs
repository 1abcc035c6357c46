//! Canvas adapter republishing drawing-surface events to listeners.

use super::{DrawingSurface, SurfaceEvent};
use crate::events::{ListenerId, Listeners};
use std::cell::RefCell;
use std::rc::Rc;

/// Listener lists shared between the manager and the handler it installs on
/// the bound surface.
struct CanvasListeners<O: 'static> {
    added: Listeners<O>,
    removed: Listeners<O>,
    selection: Listeners<[O]>,
    modified: Listeners<O>,
    moving: Listeners<O>,
}

impl<O: 'static> CanvasListeners<O> {
    fn new() -> Self {
        Self {
            added: Listeners::new(),
            removed: Listeners::new(),
            selection: Listeners::new(),
            modified: Listeners::new(),
            moving: Listeners::new(),
        }
    }

    fn dispatch(&mut self, event: &SurfaceEvent<O>) {
        match event {
            SurfaceEvent::ObjectAdded(obj) => self.added.emit(obj),
            SurfaceEvent::ObjectRemoved(obj) => self.removed.emit(obj),
            SurfaceEvent::ObjectMoving(obj) => self.moving.emit(obj),
            SurfaceEvent::ObjectModified(obj) => self.modified.emit(obj),
            SurfaceEvent::SelectionCreated { selected }
            | SurfaceEvent::SelectionUpdated { selected } => self.selection.emit(selected),
            SurfaceEvent::SelectionCleared => self.selection.emit(&[]),
        }
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        self.added.remove(id)
            || self.removed.remove(id)
            || self.selection.remove(id)
            || self.modified.remove(id)
            || self.moving.remove(id)
    }
}

/// Mediates access to a single drawing surface.
///
/// Mutating calls are delegated to the bound surface and silently ignored
/// while no surface is bound. Callbacks registered through the `on_*` methods
/// run synchronously, in registration order, for every matching event the
/// surface emits, including events caused by direct interaction with the
/// surface rather than by this manager.
pub struct CanvasManager<S: DrawingSurface> {
    surface: Option<S>,
    /// Handler id installed on the bound surface.
    handler: Option<ListenerId>,
    listeners: Rc<RefCell<CanvasListeners<S::Object>>>,
}

impl<S: DrawingSurface> Default for CanvasManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DrawingSurface> CanvasManager<S> {
    /// Create a manager with no surface bound.
    pub fn new() -> Self {
        Self {
            surface: None,
            handler: None,
            listeners: Rc::new(RefCell::new(CanvasListeners::new())),
        }
    }

    /// Bind a drawing surface and attach the event forwarding handler to it.
    ///
    /// A previously bound surface is detached and returned. Registered
    /// callbacks carry over to the new surface.
    pub fn initialize(&mut self, mut surface: S) -> Option<S> {
        let previous = self.detach();

        let listeners = Rc::clone(&self.listeners);
        let handler = surface.subscribe(Box::new(move |event: &SurfaceEvent<S::Object>| {
            listeners.borrow_mut().dispatch(event);
        }));
        log::debug!("Canvas surface bound");

        self.handler = Some(handler);
        self.surface = Some(surface);
        previous
    }

    /// Unbind the current surface, removing the forwarding handler.
    pub fn detach(&mut self) -> Option<S> {
        let mut surface = self.surface.take()?;
        if let Some(handler) = self.handler.take() {
            surface.unsubscribe(handler);
        }
        log::debug!("Canvas surface detached");
        Some(surface)
    }

    /// Check if a surface is bound.
    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    /// Get the bound surface.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Get the bound surface mutably, e.g. to drive selection or transforms.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Add one object to the surface.
    pub fn add_object(&mut self, object: S::Object) {
        self.add_objects(vec![object]);
    }

    /// Add several objects to the surface in one call.
    pub fn add_objects(&mut self, objects: Vec<S::Object>) {
        match self.surface.as_mut() {
            Some(surface) => surface.add(objects),
            None => log::debug!("add_objects ignored: no canvas surface bound"),
        }
    }

    /// Remove one object from the surface.
    pub fn remove_object(&mut self, object: &S::Object) {
        self.remove_objects(std::slice::from_ref(object));
    }

    /// Remove several objects from the surface in one call.
    pub fn remove_objects(&mut self, objects: &[S::Object]) {
        match self.surface.as_mut() {
            Some(surface) => surface.remove(objects),
            None => log::debug!("remove_objects ignored: no canvas surface bound"),
        }
    }

    /// All objects on the surface, or none if no surface is bound.
    pub fn objects(&self) -> Vec<S::Object> {
        self.surface
            .as_ref()
            .map(DrawingSurface::objects)
            .unwrap_or_default()
    }

    /// Subscribe to `object:added`.
    pub fn on_object_added(&mut self, callback: impl FnMut(&S::Object) + 'static) -> ListenerId {
        self.listeners.borrow_mut().added.add(callback)
    }

    /// Subscribe to `object:removed`.
    pub fn on_object_removed(&mut self, callback: impl FnMut(&S::Object) + 'static) -> ListenerId {
        self.listeners.borrow_mut().removed.add(callback)
    }

    /// Subscribe to selection changes. Cleared selections report an empty slice.
    pub fn on_selection_changed(
        &mut self,
        callback: impl FnMut(&[S::Object]) + 'static,
    ) -> ListenerId {
        self.listeners.borrow_mut().selection.add(callback)
    }

    /// Subscribe to `object:modified`.
    pub fn on_object_modified(&mut self, callback: impl FnMut(&S::Object) + 'static) -> ListenerId {
        self.listeners.borrow_mut().modified.add(callback)
    }

    /// Subscribe to `object:moving`.
    pub fn on_object_moving(&mut self, callback: impl FnMut(&S::Object) + 'static) -> ListenerId {
        self.listeners.borrow_mut().moving.add(callback)
    }

    /// Unsubscribe a callback registered with any of the `on_*` methods.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(id)
    }
}
