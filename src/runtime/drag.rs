use crate::geometry::{Point, Rect};
use crate::registry::{GadgetId, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    Size,
}

/// An in-progress window move or resize started from a system gadget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub window: WindowId,
    pub gadget: GadgetId,
    pub mode: DragMode,
    start: Point,
    start_bounds: Rect,
}

impl DragState {
    pub fn new(
        window: WindowId,
        gadget: GadgetId,
        mode: DragMode,
        start: Point,
        bounds: Rect,
    ) -> Self {
        Self {
            window,
            gadget,
            mode,
            start,
            start_bounds: bounds,
        }
    }

    /// Delta to apply to the window's current bounds so it tracks the pointer.
    ///
    /// Targets are measured from the drag origin, so clamping in earlier steps
    /// does not accumulate drift.
    pub fn delta(&self, pointer: Point, current: Rect) -> (i32, i32) {
        let dx = pointer.x - self.start.x;
        let dy = pointer.y - self.start.y;
        match self.mode {
            DragMode::Move => (
                self.start_bounds.x + dx - current.x,
                self.start_bounds.y + dy - current.y,
            ),
            DragMode::Size => (
                self.start_bounds.width + dx - current.width,
                self.start_bounds.height + dy - current.height,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn delta_is_measured_from_origin() {
        let mut windows: SlotMap<WindowId, ()> = SlotMap::with_key();
        let mut gadgets: SlotMap<GadgetId, ()> = SlotMap::with_key();
        let start_bounds = Rect::new(10, 10, 100, 50);
        let drag = DragState::new(
            windows.insert(()),
            gadgets.insert(()),
            DragMode::Move,
            Point::new(20, 12),
            start_bounds,
        );
        // clamped earlier at x = 0
        let current = Rect::new(0, 10, 100, 50);
        assert_eq!(drag.delta(Point::new(15, 12), current), (5, 0));

        let size = DragState { mode: DragMode::Size, ..drag };
        assert_eq!(size.delta(Point::new(30, 22), start_bounds), (10, 10));
    }
}
