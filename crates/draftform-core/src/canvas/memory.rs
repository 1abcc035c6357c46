//! In-process drawing surface.

use super::object::{CanvasObject, ObjectId};
use super::{DrawingSurface, SurfaceEvent, SurfaceHandler};
use crate::events::{ListenerId, Listeners};
use kurbo::{Point, Vec2};

/// A drawing surface that keeps its objects in memory.
///
/// Objects are stored back to front. Every structural or selection change is
/// reported synchronously to subscribed handlers, one event per object.
pub struct MemorySurface<O> {
    objects: Vec<O>,
    active: Vec<O>,
    handlers: Listeners<SurfaceEvent<O>>,
}

impl<O> Default for MemorySurface<O> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            active: Vec::new(),
            handlers: Listeners::new(),
        }
    }
}

impl<O: Clone + PartialEq + 'static> MemorySurface<O> {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects on the surface.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the surface holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Replace the active selection.
    ///
    /// Objects not on the surface are dropped. An empty selection clears the
    /// current one; otherwise `selection:created` fires if nothing was
    /// selected before and `selection:updated` if something was.
    pub fn set_active_objects(&mut self, objects: Vec<O>) {
        let selected: Vec<O> = objects
            .into_iter()
            .filter(|obj| self.objects.contains(obj))
            .collect();

        if selected.is_empty() {
            self.discard_active_objects();
            return;
        }

        let had_selection = !self.active.is_empty();
        self.active = selected.clone();
        let event = if had_selection {
            SurfaceEvent::SelectionUpdated { selected }
        } else {
            SurfaceEvent::SelectionCreated { selected }
        };
        self.handlers.emit(&event);
    }

    /// Clear the active selection, emitting `selection:cleared` if there was one.
    pub fn discard_active_objects(&mut self) {
        if self.active.is_empty() {
            return;
        }
        self.active.clear();
        self.handlers.emit(&SurfaceEvent::SelectionCleared);
    }

    /// Report that an object is being dragged.
    pub fn notify_moving(&mut self, object: &O) {
        if self.objects.contains(object) {
            self.handlers.emit(&SurfaceEvent::ObjectMoving(object.clone()));
        }
    }

    /// Report that an interactive transform on an object finished.
    pub fn notify_modified(&mut self, object: &O) {
        if self.objects.contains(object) {
            self.handlers.emit(&SurfaceEvent::ObjectModified(object.clone()));
        }
    }
}

impl MemorySurface<CanvasObject> {
    /// Get an object by id.
    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|obj| obj.id() == id)
    }

    /// Objects under a point, front to back.
    pub fn objects_at(&self, point: Point) -> Vec<CanvasObject> {
        self.objects
            .iter()
            .rev()
            .filter(|obj| obj.contains(point))
            .cloned()
            .collect()
    }

    /// Drag an object by `delta`, emitting `object:moving`.
    ///
    /// Returns false if no object has this id.
    pub fn translate_object(&mut self, id: ObjectId, delta: Vec2) -> bool {
        let Some(obj) = self.objects.iter_mut().find(|obj| obj.id() == id) else {
            return false;
        };
        obj.translate(delta);
        let moved = obj.clone();

        if let Some(active) = self.active.iter_mut().find(|obj| obj.id() == id) {
            *active = moved.clone();
        }
        self.notify_moving(&moved);
        true
    }

    /// End an interactive transform, emitting `object:modified`.
    pub fn finish_transform(&mut self, id: ObjectId) -> bool {
        match self.get(id).cloned() {
            Some(obj) => {
                self.notify_modified(&obj);
                true
            }
            None => false,
        }
    }
}

impl<O: Clone + PartialEq + 'static> DrawingSurface for MemorySurface<O> {
    type Object = O;

    fn add(&mut self, objects: Vec<O>) {
        for obj in objects {
            self.objects.push(obj.clone());
            self.handlers.emit(&SurfaceEvent::ObjectAdded(obj));
        }
    }

    fn remove(&mut self, objects: &[O]) {
        for obj in objects {
            let Some(pos) = self.objects.iter().position(|existing| existing == obj) else {
                continue;
            };
            let removed = self.objects.remove(pos);
            self.active.retain(|active| active != obj);
            self.handlers.emit(&SurfaceEvent::ObjectRemoved(removed));
        }
    }

    fn objects(&self) -> Vec<O> {
        self.objects.clone()
    }

    fn active_objects(&self) -> Vec<O> {
        self.active.clone()
    }

    fn subscribe(&mut self, handler: SurfaceHandler<O>) -> ListenerId {
        self.handlers.add(handler)
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.handlers.remove(id)
    }
}
