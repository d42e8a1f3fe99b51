use std::cell::Cell;

use bitflags::bitflags;

use crate::geometry::{Insets, Rect, Size};

/// A stored edge or extent, either literal or measured from the parent.
///
/// For positions `RelativeToParent(n)` is an offset from the parent's far
/// (right/bottom) edge; for extents it is a delta added to the parent's size, so
/// `RelativeToParent(-8)` means "parent width minus 8".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coord {
    Absolute(i32),
    RelativeToParent(i32),
}

impl Coord {
    pub fn value(self) -> i32 {
        match self {
            Coord::Absolute(v) | Coord::RelativeToParent(v) => v,
        }
    }

    pub fn is_relative(self) -> bool {
        matches!(self, Coord::RelativeToParent(_))
    }

    fn with_value(self, value: i32) -> Self {
        match self {
            Coord::Absolute(_) => Coord::Absolute(value),
            Coord::RelativeToParent(_) => Coord::RelativeToParent(value),
        }
    }

    fn tagged(value: i32, relative: bool) -> Self {
        if relative {
            Coord::RelativeToParent(value)
        } else {
            Coord::Absolute(value)
        }
    }
}

bitflags! {
    /// Per-axis relative flags, the raw view of a box's [`Coord`] tags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RelFlags: u8 {
        /// `left` is an offset from the parent's right edge.
        const REL_RIGHT = 1 << 0;
        /// `top` is an offset from the parent's bottom edge.
        const REL_BOTTOM = 1 << 1;
        /// `width` is a delta from the parent's width.
        const REL_WIDTH = 1 << 2;
        /// `height` is a delta from the parent's height.
        const REL_HEIGHT = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedBounds {
    parent: Rect,
    bounds: Rect,
}

/// Positioning primitive shared by screens, windows, requesters and gadgets.
///
/// Bounds are resolved lazily against a parent frame and cached until the box is
/// mutated or queried against a different parent frame.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    left: Coord,
    top: Coord,
    width: Coord,
    height: Coord,
    border: Insets,
    min_size: Size,
    cache: Cell<Option<CachedBounds>>,
}

impl LayoutBox {
    pub fn new(left: Coord, top: Coord, width: Coord, height: Coord) -> Self {
        Self {
            left,
            top,
            width,
            height,
            border: Insets::ZERO,
            min_size: Size::default(),
            cache: Cell::new(None),
        }
    }

    /// Box with literal position and size.
    pub fn absolute(rect: Rect) -> Self {
        Self::new(
            Coord::Absolute(rect.x),
            Coord::Absolute(rect.y),
            Coord::Absolute(rect.width),
            Coord::Absolute(rect.height),
        )
    }

    /// Box built from raw values plus relative flags.
    pub fn from_raw(left: i32, top: i32, width: i32, height: i32, flags: RelFlags) -> Self {
        Self::new(
            Coord::tagged(left, flags.contains(RelFlags::REL_RIGHT)),
            Coord::tagged(top, flags.contains(RelFlags::REL_BOTTOM)),
            Coord::tagged(width, flags.contains(RelFlags::REL_WIDTH)),
            Coord::tagged(height, flags.contains(RelFlags::REL_HEIGHT)),
        )
    }

    pub fn with_border(mut self, border: Insets) -> Self {
        self.border = border;
        self
    }

    pub fn with_min_size(mut self, min_size: Size) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn rel_flags(&self) -> RelFlags {
        let mut flags = RelFlags::empty();
        flags.set(RelFlags::REL_RIGHT, self.left.is_relative());
        flags.set(RelFlags::REL_BOTTOM, self.top.is_relative());
        flags.set(RelFlags::REL_WIDTH, self.width.is_relative());
        flags.set(RelFlags::REL_HEIGHT, self.height.is_relative());
        flags
    }

    /// Reinterpret the stored raw values under new relative flags.
    pub fn set_rel_flags(&mut self, flags: RelFlags) {
        self.left = Coord::tagged(self.left.value(), flags.contains(RelFlags::REL_RIGHT));
        self.top = Coord::tagged(self.top.value(), flags.contains(RelFlags::REL_BOTTOM));
        self.width = Coord::tagged(self.width.value(), flags.contains(RelFlags::REL_WIDTH));
        self.height = Coord::tagged(self.height.value(), flags.contains(RelFlags::REL_HEIGHT));
        self.invalidate();
    }

    pub fn left(&self) -> Coord {
        self.left
    }

    pub fn top(&self) -> Coord {
        self.top
    }

    pub fn width(&self) -> Coord {
        self.width
    }

    pub fn height(&self) -> Coord {
        self.height
    }

    pub fn border(&self) -> Insets {
        self.border
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub fn set_left(&mut self, left: Coord) {
        self.left = left;
        self.invalidate();
    }

    pub fn set_top(&mut self, top: Coord) {
        self.top = top;
        self.invalidate();
    }

    pub fn set_width(&mut self, width: Coord) {
        self.width = width;
        self.invalidate();
    }

    pub fn set_height(&mut self, height: Coord) {
        self.height = height;
        self.invalidate();
    }

    pub fn set_border(&mut self, border: Insets) {
        self.border = border;
        self.invalidate();
    }

    pub fn set_min_size(&mut self, min_size: Size) {
        self.min_size = min_size;
    }

    /// Replace all four coordinates with literal values.
    pub fn set_absolute(&mut self, rect: Rect) {
        self.left = Coord::Absolute(rect.x);
        self.top = Coord::Absolute(rect.y);
        self.width = Coord::Absolute(rect.width);
        self.height = Coord::Absolute(rect.height);
        self.invalidate();
    }

    /// Shift the resolved position by a delta, keeping each coordinate's tag.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        self.left = self.left.with_value(self.left.value() + dx);
        self.top = self.top.with_value(self.top.value() + dy);
        self.invalidate();
    }

    /// Grow the resolved size by a delta, keeping each extent's tag.
    pub fn resize_by(&mut self, dw: i32, dh: i32) {
        if dw == 0 && dh == 0 {
            return;
        }
        self.width = self.width.with_value(self.width.value() + dw);
        self.height = self.height.with_value(self.height.value() + dh);
        self.invalidate();
    }

    pub fn invalidate(&self) {
        self.cache.set(None);
    }

    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Resolve the box against `parent`, reusing the cached result when the parent
    /// frame has not changed since the last query.
    pub fn bounds(&self, parent: Rect) -> Rect {
        if let Some(cached) = self.cache.get() {
            if cached.parent == parent {
                return cached.bounds;
            }
        }
        let bounds = self.resolve(parent);
        self.cache.set(Some(CachedBounds { parent, bounds }));
        bounds
    }

    /// Bounds minus border insets: the frame children resolve against.
    pub fn inner_bounds(&self, parent: Rect) -> Rect {
        self.bounds(parent).inset(self.border)
    }

    fn resolve(&self, parent: Rect) -> Rect {
        let x = match self.left {
            Coord::Absolute(v) => parent.x + v,
            Coord::RelativeToParent(v) => parent.x + parent.width + v,
        };
        let y = match self.top {
            Coord::Absolute(v) => parent.y + v,
            Coord::RelativeToParent(v) => parent.y + parent.height + v,
        };
        let width = match self.width {
            Coord::Absolute(v) => v,
            Coord::RelativeToParent(v) => parent.width + v,
        };
        let height = match self.height {
            Coord::Absolute(v) => v,
            Coord::RelativeToParent(v) => parent.height + v,
        };
        Rect::new(x, y, width, height)
    }
}
