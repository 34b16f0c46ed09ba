//! Draggable bottom panel that hosts the task list over the map.
//!
//! The sheet rests at one of three snap positions. While a gesture is active the
//! height follows the pointer directly; on release it settles on whichever snap
//! height is closest, using the midpoints between neighbours as boundaries.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SnapPosition {
    /// Handle only, map fully visible.
    Min,
    /// Preview of the first few list rows.
    Mid,
    /// Full list, map mostly hidden.
    Max,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SheetLayout {
    pub min_height: f64,
    pub mid_height: f64,
    /// Fraction of the viewport height used by [`SnapPosition::Max`].
    pub max_ratio: f64,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            min_height: 80.0,
            mid_height: 320.0,
            max_ratio: 0.85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Gesture {
    start_height: f64,
    start_pointer_y: f64,
}

#[derive(Debug, Clone)]
pub struct BottomSheet {
    layout: SheetLayout,
    viewport_height: f64,
    position: SnapPosition,
    height: f64,
    gesture: Option<Gesture>,
}

impl SheetLayout {
    /// Raise `mid_height` to at least `min_height` so snap heights never invert.
    fn normalized(self) -> Self {
        Self {
            mid_height: self.mid_height.max(self.min_height),
            ..self
        }
    }
}

impl BottomSheet {
    pub fn new(layout: SheetLayout, viewport_height: f64) -> Self {
        let mut sheet = Self {
            layout: layout.normalized(),
            viewport_height,
            position: SnapPosition::Mid,
            height: 0.0,
            gesture: None,
        };
        sheet.height = sheet.height_of(SnapPosition::Mid);
        sheet
    }

    pub fn height_of(&self, position: SnapPosition) -> f64 {
        match position {
            SnapPosition::Min => self.layout.min_height,
            SnapPosition::Mid => self.layout.mid_height,
            // Tiny viewports or small ratios must not invert the ordering of snap heights.
            SnapPosition::Max => (self.viewport_height * self.layout.max_ratio).max(self.layout.mid_height),
        }
    }

    pub fn position(&self) -> SnapPosition {
        self.position
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Start (or restart) a drag from the current height.
    pub fn begin_drag(&mut self, pointer_y: f64) {
        self.gesture = Some(Gesture {
            start_height: self.height,
            start_pointer_y: pointer_y,
        });
    }

    /// Follow the pointer. Moving up (smaller y) grows the sheet.
    pub fn drag_to(&mut self, pointer_y: f64) -> f64 {
        if let Some(gesture) = self.gesture {
            let delta = gesture.start_pointer_y - pointer_y;
            self.height = (gesture.start_height + delta).clamp(
                self.height_of(SnapPosition::Min),
                self.height_of(SnapPosition::Max),
            );
        }
        self.height
    }

    /// Release the pointer and settle on the nearest snap position.
    pub fn end_drag(&mut self) -> SnapPosition {
        if self.gesture.take().is_none() {
            return self.position;
        }

        let target = self.nearest_snap(self.height);
        self.settle(target);
        target
    }

    /// Programmatic transition; cancels any gesture in flight.
    pub fn snap_to(&mut self, position: SnapPosition) {
        self.gesture = None;
        self.settle(position);
    }

    pub fn collapse(&mut self) {
        self.snap_to(SnapPosition::Min);
    }

    /// Viewport rotated or resized: keep the snap position, recompute its height.
    pub fn resize_viewport(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
        if self.gesture.is_none() {
            self.height = self.height_of(self.position);
        } else {
            self.height = self.height.min(self.height_of(SnapPosition::Max));
        }
    }

    fn nearest_snap(&self, height: f64) -> SnapPosition {
        let min = self.height_of(SnapPosition::Min);
        let mid = self.height_of(SnapPosition::Mid);
        let max = self.height_of(SnapPosition::Max);

        if height >= (mid + max) / 2.0 {
            SnapPosition::Max
        } else if height >= (min + mid) / 2.0 {
            SnapPosition::Mid
        } else {
            SnapPosition::Min
        }
    }

    fn settle(&mut self, position: SnapPosition) {
        self.position = position;
        self.height = self.height_of(position);
    }
}
