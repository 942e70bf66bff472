//! Window geometry and the per-window record

use serde::{Deserialize, Serialize};

use crate::registry::{WindowId, ZIndex};

/// Window size in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Size {
    /// Create a size
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Raise each dimension to at least the given minimum
    #[must_use]
    pub fn at_least(self, min: Size) -> Self {
        Self {
            width: self.width.max(min.width),
            height: self.height.max(min.height),
        }
    }
}

/// Window offset from the top-left of the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Offset from the top edge
    pub top: i32,
    /// Offset from the left edge
    pub left: i32,
}

impl Position {
    /// Create a position
    #[must_use]
    pub fn new(top: i32, left: i32) -> Self {
        Self { top, left }
    }
}

/// State of one window, owned by its application
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Window identifier
    pub id: WindowId,
    /// Stacking value, once the window is on screen
    pub z_index: Option<ZIndex>,
    /// Whether the window has its own pop-out frame
    pub is_popped_out: bool,
    /// Current size
    pub size: Size,
    /// Current position
    pub position: Position,
}

/// Partial geometry change; `None` keeps the current value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// New width
    pub width: Option<u32>,
    /// New height
    pub height: Option<u32>,
    /// New top offset
    pub top: Option<i32>,
    /// New left offset
    pub left: Option<i32>,
}

impl PositionUpdate {
    /// Move to `(top, left)`
    #[must_use]
    pub fn to(top: i32, left: i32) -> Self {
        Self {
            top: Some(top),
            left: Some(left),
            ..Self::default()
        }
    }

    /// Resize to `width` x `height`
    #[must_use]
    pub fn resize(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }
}

impl WindowRecord {
    /// Apply a geometry change, clamping size to `min`
    pub fn apply(&mut self, update: PositionUpdate, min: Size) {
        let size = Size::new(
            update.width.unwrap_or(self.size.width),
            update.height.unwrap_or(self.size.height),
        );
        self.size = size.at_least(min);
        self.position = Position::new(
            update.top.unwrap_or(self.position.top),
            update.left.unwrap_or(self.position.left),
        );
    }
}
