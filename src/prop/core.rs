use bitflags::bitflags;

use crate::geometry::{Point, Rect};

/// Full-scale pot value: the knob at the far end of its track.
pub const MAXPOT: u16 = 0xFFFF;
/// Full-scale body value: the knob fills its whole track.
pub const MAXBODY: u16 = 0xFFFF;

bitflags! {
    /// Axes along which a proportional knob may move.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
    pub struct PropFlags: u8 {
        const FREE_HORIZ = 1 << 0;
        const FREE_VERT = 1 << 1;
    }
}

/// Movement axis of a one-dimensional slider or scroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Encode a discrete slider level as `(pot, body)`.
///
/// Out-of-range levels are clamped into `[0, num_levels - 1]`.
pub fn slider_encode(level: i32, num_levels: i32) -> (u16, u16) {
    if num_levels <= 0 {
        return (0, MAXBODY);
    }
    let body = MAXBODY as i64 / num_levels as i64;
    if num_levels == 1 {
        return (0, body as u16);
    }
    let level = level.clamp(0, num_levels - 1) as i64;
    let pot = (MAXPOT as i64 * level) / (num_levels as i64 - 1);
    (pot as u16, body as u16)
}

/// Decode a pot back to the nearest slider level.
///
/// Rounds by adding half of `MAXPOT` before the integer division.
pub fn slider_decode(pot: u16, num_levels: i32) -> i32 {
    if num_levels <= 1 {
        return 0;
    }
    let span = num_levels as i64 - 1;
    let level = (pot as i64 * span + (MAXPOT as i64 / 2)) / MAXPOT as i64;
    level.clamp(0, span) as i32
}

/// `(total, visible)` with `total >= 0` and `visible` clamped into `[0, total]`.
fn scroller_extent(total: i32, visible: i32) -> (i64, i64) {
    let total = (total as i64).max(0);
    (total, (visible as i64).clamp(0, total))
}

/// Encode a scroll position as `(pot, body)`.
///
/// `top` is clamped into `[0, total - visible]`.
pub fn scroller_encode(total: i32, visible: i32, top: i32) -> (u16, u16) {
    let (total, visible) = scroller_extent(total, visible);
    let hidden = total - visible;
    if hidden == 0 {
        return (0, MAXBODY);
    }
    let top = (top as i64).clamp(0, hidden);
    let body = (visible * MAXBODY as i64) / total;
    let pot = (top * MAXBODY as i64) / hidden;
    (pot.clamp(0, MAXPOT as i64) as u16, body.clamp(0, MAXBODY as i64) as u16)
}

/// Decode a pot back to the first visible line of a scroller.
pub fn scroller_decode(pot: u16, total: i32, visible: i32) -> i32 {
    let (total, visible) = scroller_extent(total, visible);
    let hidden = total - visible;
    let top = (hidden * pot as i64 + (MAXPOT as i64 / 2)) / MAXPOT as i64;
    top.clamp(0, hidden) as i32
}

/// Result of pressing inside a proportional gadget's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropPress {
    /// The knob was grabbed; subsequent drags move it.
    Knob,
    /// The container was clicked beside the knob and the pot paged toward the click.
    Paged { changed: bool },
    Outside,
}

/// Fixed-point position and knob size of a slider or scrollbar.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PropState {
    pub hpot: u16,
    pub vpot: u16,
    pub hbody: u16,
    pub vbody: u16,
    pub flags: PropFlags,
    pub knob_hit: bool,
    pub knob_hover: bool,
    #[serde(skip)]
    grab: Point,
}

impl Default for PropState {
    fn default() -> Self {
        Self::new(PropFlags::FREE_HORIZ | PropFlags::FREE_VERT)
    }
}

impl PropState {
    pub fn new(flags: PropFlags) -> Self {
        Self {
            hpot: 0,
            vpot: 0,
            hbody: MAXBODY,
            vbody: MAXBODY,
            flags,
            knob_hit: false,
            knob_hover: false,
            grab: Point::default(),
        }
    }

    pub fn for_axis(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::new(PropFlags::FREE_HORIZ),
            Axis::Vertical => Self::new(PropFlags::FREE_VERT),
        }
    }

    /// Axis used by one-dimensional widgets; horizontal wins when both are free.
    pub fn primary_axis(&self) -> Axis {
        if self.flags.contains(PropFlags::FREE_HORIZ) || !self.flags.contains(PropFlags::FREE_VERT)
        {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    pub fn pot(&self, axis: Axis) -> u16 {
        match axis {
            Axis::Horizontal => self.hpot,
            Axis::Vertical => self.vpot,
        }
    }

    pub fn body(&self, axis: Axis) -> u16 {
        match axis {
            Axis::Horizontal => self.hbody,
            Axis::Vertical => self.vbody,
        }
    }

    pub fn set(&mut self, axis: Axis, pot: u16, body: u16) {
        match axis {
            Axis::Horizontal => {
                self.hpot = pot;
                self.hbody = body;
            }
            Axis::Vertical => {
                self.vpot = pot;
                self.vbody = body;
            }
        }
    }

    fn is_free(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.flags.contains(PropFlags::FREE_HORIZ),
            Axis::Vertical => self.flags.contains(PropFlags::FREE_VERT),
        }
    }

    /// Knob rectangle inside `container`, never shorter than `min_knob` on a free axis.
    pub fn knob_rect(&self, container: Rect, min_knob: i32) -> Rect {
        let (x, width) = self.knob_span(Axis::Horizontal, container.x, container.width, min_knob);
        let (y, height) = self.knob_span(Axis::Vertical, container.y, container.height, min_knob);
        Rect::new(x, y, width, height)
    }

    fn knob_span(&self, axis: Axis, start: i32, length: i32, min_knob: i32) -> (i32, i32) {
        if !self.is_free(axis) {
            return (start, length);
        }
        let knob = knob_length(length, self.body(axis), min_knob);
        let travel = (length - knob).max(0) as i64;
        let offset = travel * self.pot(axis) as i64 / MAXPOT as i64;
        (start + offset as i32, knob)
    }

    /// Press at `point` (same space as `container`).
    pub fn press(&mut self, point: Point, container: Rect, min_knob: i32) -> PropPress {
        if !container.contains(point) {
            return PropPress::Outside;
        }
        let knob = self.knob_rect(container, min_knob);
        if knob.contains(point) {
            self.knob_hit = true;
            self.grab = Point::new(point.x - knob.x, point.y - knob.y);
            return PropPress::Knob;
        }

        let mut changed = false;
        for axis in [Axis::Horizontal, Axis::Vertical] {
            if !self.is_free(axis) {
                continue;
            }
            let (coordinate, knob_start, knob_end) = match axis {
                Axis::Horizontal => (point.x, knob.x, knob.right()),
                Axis::Vertical => (point.y, knob.y, knob.bottom()),
            };
            let before = coordinate < knob_start;
            if !before && coordinate < knob_end {
                continue;
            }
            let pot = self.pot(axis);
            let step = self.body(axis).max(1);
            let paged = if before {
                pot.saturating_sub(step)
            } else {
                pot.saturating_add(step)
            };
            if paged != pot {
                let body = self.body(axis);
                self.set(axis, paged, body);
                changed = true;
            }
        }
        PropPress::Paged { changed }
    }

    /// Move a grabbed knob so its grab point follows `point`. Returns whether any
    /// pot changed.
    pub fn drag(&mut self, point: Point, container: Rect, min_knob: i32) -> bool {
        if !self.knob_hit {
            return false;
        }
        let mut changed = false;
        for axis in [Axis::Horizontal, Axis::Vertical] {
            if !self.is_free(axis) {
                continue;
            }
            let (start, length, coordinate, grab) = match axis {
                Axis::Horizontal => (container.x, container.width, point.x, self.grab.x),
                Axis::Vertical => (container.y, container.height, point.y, self.grab.y),
            };
            let travel = (length - knob_length(length, self.body(axis), min_knob)) as i64;
            let pot = if travel <= 0 {
                0
            } else {
                let offset = (coordinate - grab - start) as i64;
                (offset * MAXPOT as i64 / travel).clamp(0, MAXPOT as i64) as u16
            };
            if pot != self.pot(axis) {
                let body = self.body(axis);
                self.set(axis, pot, body);
                changed = true;
            }
        }
        changed
    }

    /// End a knob drag. Returns whether the knob was held.
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.knob_hit, false)
    }

    pub fn update_hover(&mut self, point: Point, container: Rect, min_knob: i32) -> bool {
        let hover = self.knob_rect(container, min_knob).contains(point);
        std::mem::replace(&mut self.knob_hover, hover) != hover
    }
}

fn knob_length(length: i32, body: u16, min_knob: i32) -> i32 {
    let scaled = (length.max(0) as i64 * body as i64 / MAXBODY as i64) as i32;
    scaled.max(min_knob).min(length.max(0))
}
