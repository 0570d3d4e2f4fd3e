//! Input model: pointer targets, buttons, keys, and the gesture state machine.
//!
//! `Target` is the closed classification of what a pointer event landed on,
//! produced once per event at the host boundary (or by
//! [`crate::engine::EngineCore::classify`]). `InputState` is the active
//! gesture being tracked between pointer-down and pointer-up, carrying all
//! context needed to preview the gesture and emit the final mutation on
//! release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::calibration::Point;
use crate::doc::BoxId;
use crate::geometry::{NodeFrame, ScreenRect};
use crate::hit::ResizeAnchor;

/// What a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    /// The page image, outside every box and handle.
    Background,
    /// The body of a box.
    Box { id: BoxId },
    /// One of the resize handles around a box.
    Handle { id: BoxId, anchor: ResizeAnchor },
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0 == "Delete"
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The id of the currently selected box, if any.
    pub selected_id: Option<BoxId>,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is rubber-banding a new box from the background.
    Drawing {
        /// Pixel position of the pointer-down.
        anchor: Point,
        /// Pixel position of the latest pointer event.
        current: Point,
    },
    /// The user is moving a box.
    Dragging {
        /// Id of the box being dragged.
        id: BoxId,
        /// Pixel position of the pointer-down.
        start: Point,
        /// Screen rectangle at the start of the drag.
        origin: ScreenRect,
        /// Current node position and size.
        frame: NodeFrame,
        /// Set once the pointer left `start`, even if it came back.
        moved: bool,
    },
    /// The user is resizing a box by one of its handles.
    Transforming {
        /// Id of the box being resized.
        id: BoxId,
        /// Which corner/edge handle is being dragged.
        anchor: ResizeAnchor,
        /// Pixel position of the pointer-down.
        start: Point,
        /// Screen rectangle at the start of the resize.
        origin: ScreenRect,
        /// Current node position, nominal size and scale.
        frame: NodeFrame,
        /// Set once the pointer left `start`, even if it came back.
        moved: bool,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Id of the box a drag or transform is acting on.
    #[must_use]
    pub fn active_box(&self) -> Option<BoxId> {
        match self {
            Self::Dragging { id, .. } | Self::Transforming { id, .. } => Some(*id),
            Self::Idle | Self::Drawing { .. } => None,
        }
    }
}
