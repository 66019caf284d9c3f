//! Axis-aligned rectangles in screen space
//!
//! Screen coordinates: origin top-left, `y` grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Interiors intersect; rectangles that only share an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(10.0, 20.0, 150.0, 30.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 160.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 50.0);
        assert_eq!(r.center(), Vec2::new(85.0, 35.0));
    }

    #[test]
    fn test_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(a.overlaps(&Rect::new(50.0, 50.0, 100.0, 100.0)));
        assert!(a.overlaps(&Rect::new(-10.0, 90.0, 20.0, 20.0)));
        assert!(!a.overlaps(&Rect::new(200.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(!a.overlaps(&Rect::new(100.0, 0.0, 50.0, 50.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 100.0, 50.0, 50.0)));
    }
}
