//! A minimal visual object record for the in-memory surface.

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use uuid::Uuid;

/// Unique identifier for canvas objects.
pub type ObjectId = Uuid;

/// A visual object placed on a drawing surface.
///
/// Two objects are equal when they share an id, regardless of their current
/// geometry, so a moved object still matches the copy a listener was given.
#[derive(Debug, Clone)]
pub struct CanvasObject {
    id: ObjectId,
    /// Free-form kind label ("rect", "circle", ...).
    pub kind: String,
    /// Axis-aligned bounds in surface coordinates.
    pub bounds: Rect,
    /// Fill color.
    pub fill: Color,
    /// Whether the object can take part in a selection.
    pub selectable: bool,
}

impl CanvasObject {
    /// Create a new selectable object with a black fill.
    pub fn new(kind: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            bounds,
            fill: Color::from_rgba8(0, 0, 0, 255),
            selectable: true,
        }
    }

    /// Set the fill color.
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    /// Set whether the object is selectable.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Move the object by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.bounds = self.bounds + delta;
    }

    /// Hit test against the object bounds.
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point)
    }
}

impl PartialEq for CanvasObject {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CanvasObject {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = CanvasObject::new("rect", Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut moved = a.clone();
        moved.translate(Vec2::new(5.0, 5.0));
        let b = CanvasObject::new("rect", Rect::new(0.0, 0.0, 10.0, 10.0));

        assert_eq!(a, moved);
        assert_ne!(a, b);
    }

    #[test]
    fn test_translate() {
        let mut obj = CanvasObject::new("circle", Rect::new(250.0, 50.0, 350.0, 150.0));
        obj.translate(Vec2::new(10.0, -20.0));

        assert_eq!(obj.bounds, Rect::new(260.0, 30.0, 360.0, 130.0));
        assert!(obj.contains(Point::new(300.0, 80.0)));
        assert!(!obj.contains(Point::new(300.0, 140.0)));
    }
}
