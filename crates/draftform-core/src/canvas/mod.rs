//! Drawing-surface abstraction and the canvas adapter built on top of it.

mod manager;
mod memory;
mod object;

pub use manager::CanvasManager;
pub use memory::MemorySurface;
pub use object::{CanvasObject, ObjectId};

use crate::events::ListenerId;

/// Handler a surface calls for every event it emits.
pub type SurfaceHandler<O> = Box<dyn FnMut(&SurfaceEvent<O>)>;

/// Kinds of events a drawing surface can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEventKind {
    ObjectAdded,
    ObjectRemoved,
    ObjectMoving,
    ObjectModified,
    SelectionCreated,
    SelectionUpdated,
    SelectionCleared,
}

impl SurfaceEventKind {
    /// All event kinds, in the order a surface documents them.
    pub const ALL: [SurfaceEventKind; 7] = [
        Self::ObjectAdded,
        Self::ObjectRemoved,
        Self::ObjectMoving,
        Self::ObjectModified,
        Self::SelectionCreated,
        Self::SelectionUpdated,
        Self::SelectionCleared,
    ];

    /// Wire name of the event, as used by canvas libraries.
    pub fn name(self) -> &'static str {
        match self {
            Self::ObjectAdded => "object:added",
            Self::ObjectRemoved => "object:removed",
            Self::ObjectMoving => "object:moving",
            Self::ObjectModified => "object:modified",
            Self::SelectionCreated => "selection:created",
            Self::SelectionUpdated => "selection:updated",
            Self::SelectionCleared => "selection:cleared",
        }
    }

    /// Look up an event kind by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// An event emitted by a drawing surface.
///
/// Selection events carry the active objects at the time of emission, since
/// handlers run while the surface itself is still borrowed.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent<O> {
    ObjectAdded(O),
    ObjectRemoved(O),
    ObjectMoving(O),
    ObjectModified(O),
    SelectionCreated { selected: Vec<O> },
    SelectionUpdated { selected: Vec<O> },
    SelectionCleared,
}

impl<O> SurfaceEvent<O> {
    /// The kind of this event.
    pub fn kind(&self) -> SurfaceEventKind {
        match self {
            Self::ObjectAdded(_) => SurfaceEventKind::ObjectAdded,
            Self::ObjectRemoved(_) => SurfaceEventKind::ObjectRemoved,
            Self::ObjectMoving(_) => SurfaceEventKind::ObjectMoving,
            Self::ObjectModified(_) => SurfaceEventKind::ObjectModified,
            Self::SelectionCreated { .. } => SurfaceEventKind::SelectionCreated,
            Self::SelectionUpdated { .. } => SurfaceEventKind::SelectionUpdated,
            Self::SelectionCleared => SurfaceEventKind::SelectionCleared,
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// A drawing surface holding visual objects.
///
/// Implementations emit [`SurfaceEvent`]s synchronously to every subscribed
/// handler whenever objects are added, removed, transformed, or the active
/// selection changes.
pub trait DrawingSurface {
    /// The object type stored on the surface.
    type Object: Clone + 'static;

    /// Add objects on top of the existing ones.
    fn add(&mut self, objects: Vec<Self::Object>);

    /// Remove objects. Objects not on the surface are ignored.
    fn remove(&mut self, objects: &[Self::Object]);

    /// All objects, back to front.
    fn objects(&self) -> Vec<Self::Object>;

    /// Currently selected objects.
    fn active_objects(&self) -> Vec<Self::Object>;

    /// Subscribe a handler to every event the surface emits.
    fn subscribe(&mut self, handler: SurfaceHandler<Self::Object>) -> ListenerId;

    /// Detach a handler previously returned by [`DrawingSurface::subscribe`].
    fn unsubscribe(&mut self, id: ListenerId) -> bool;
}
