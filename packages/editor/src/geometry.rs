//! Geometry seen by the drag subsystem.
//!
//! Bounding boxes come from whatever renders the layers; the editor only
//! asks for them through [`GeometryProvider`], so tests can hand in
//! synthetic rectangles.

use std::collections::HashMap;

use storefront_blocks::BlockId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.bottom()
    }
}

/// Supplies the rendered bounds of a block's row.
pub trait GeometryProvider {
    fn bounds(&self, id: &BlockId) -> Option<Rect>;
}

impl GeometryProvider for HashMap<BlockId, Rect> {
    fn bounds(&self, id: &BlockId) -> Option<Rect> {
        self.get(id).copied()
    }
}
