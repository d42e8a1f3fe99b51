//! Point queries, focus navigation and window geometry edits.

use crate::error::{GuiError, Result};
use crate::gadget::{Owner, TabDirection};
use crate::geometry::{Point, Rect};

use super::core::{GadgetId, Registry, RequesterId, ScreenId, WindowFlags, WindowId};

/// The (screen, window, gadget) chain under a point, topmost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitChain {
    pub screen: Option<ScreenId>,
    pub window: Option<WindowId>,
    pub gadget: Option<GadgetId>,
    /// The point in the hit gadget's owner-local space.
    pub local: Point,
}

impl Registry {
    /// Resolve the topmost screen, window and gadget containing `point`.
    ///
    /// While a window has requesters open, only the newest requester and the
    /// window's system gadgets can be hit.
    pub fn hit_test(&self, point: Point) -> HitChain {
        let mut chain = HitChain {
            local: point,
            ..HitChain::default()
        };
        let Some(screen_id) = self
            .screen_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.screens.get(*id).is_some_and(|s| s.bounds().contains(point)))
        else {
            return chain;
        };
        chain.screen = Some(screen_id);

        let Some(screen) = self.screens.get(screen_id) else {
            return chain;
        };
        for window_id in screen.windows.iter().rev().copied() {
            let Some(bounds) = self.window_bounds(window_id) else {
                continue;
            };
            if !bounds.contains(point) {
                continue;
            }
            chain.window = Some(window_id);
            let local = point.local_to(bounds.origin());
            chain.local = local;
            if let Some((gadget, owner_local)) = self.hit_in_window(window_id, local) {
                chain.gadget = Some(gadget);
                chain.local = owner_local;
            }
            break;
        }
        chain
    }

    fn hit_in_window(&self, window_id: WindowId, local: Point) -> Option<(GadgetId, Point)> {
        let window = self.windows.get(window_id)?;
        let modal = window.requesters.last().copied();
        if let Some(requester) = modal {
            if let Some(bounds) = self.requester_bounds(requester) {
                if bounds.contains(local) {
                    let inner = local.local_to(bounds.origin());
                    if let Some(hit) = self.hit_in_owner(Owner::Requester(requester), inner) {
                        return Some(hit);
                    }
                }
            }
        }
        let system_only = modal.is_some();
        window
            .gadgets
            .iter()
            .rev()
            .copied()
            .filter(|id| {
                !system_only || self.gadgets.get(*id).is_some_and(|g| g.system().is_some())
            })
            .find(|id| self.gadget_bounds(*id).is_some_and(|b| b.contains(local)))
            .map(|id| (id, local))
    }

    fn hit_in_owner(&self, owner: Owner, local: Point) -> Option<(GadgetId, Point)> {
        self.owner_gadgets(owner)?
            .iter()
            .rev()
            .copied()
            .find(|id| self.gadget_bounds(*id).is_some_and(|b| b.contains(local)))
            .map(|id| (id, local))
    }

    /// Translate a screen-space point into a gadget's owner-local space.
    pub fn to_owner_space(&self, gadget: GadgetId, point: Point) -> Option<Point> {
        let owner = self.gadgets.get(gadget)?.owner();
        self.owner_origin(owner).map(|origin| point.local_to(origin))
    }

    /// Whether input to this gadget is blocked by an open requester.
    pub fn is_blocked(&self, gadget: GadgetId) -> bool {
        let Some(gadget) = self.gadgets.get(gadget) else {
            return true;
        };
        if gadget.system().is_some() {
            return false;
        }
        let Some(top) = self.top_requester(gadget.window()) else {
            return false;
        };
        gadget.owner() != Owner::Requester(top)
    }

    pub fn top_requester(&self, window: WindowId) -> Option<RequesterId> {
        self.windows.get(window)?.requesters.last().copied()
    }

    /// Next focusable sibling in tab order, wrapping around the container.
    pub fn next_focusable(&self, from: GadgetId, direction: TabDirection) -> Option<GadgetId> {
        let owner = self.gadgets.get(from)?.owner();
        let siblings = self.owner_gadgets(owner)?;
        let start = siblings.iter().position(|g| *g == from)?;
        let len = siblings.len();
        (1..len)
            .map(|step| match direction {
                TabDirection::Next => (start + step) % len,
                TabDirection::Previous => (start + len - step) % len,
            })
            .map(|index| siblings[index])
            .find(|id| self.gadgets.get(*id).is_some_and(|g| g.is_focusable()))
    }

    /// First focusable gadget of a container, used when focus enters it.
    pub fn first_focusable(&self, owner: Owner) -> Option<GadgetId> {
        self.owner_gadgets(owner)?
            .iter()
            .copied()
            .find(|id| self.gadgets.get(*id).is_some_and(|g| g.is_focusable()))
    }

    /// Move a window by a delta, never past the screen's top-left corner.
    /// Returns the new screen-space bounds.
    pub fn move_window_by(&mut self, id: WindowId, dx: i32, dy: i32) -> Result<Rect> {
        let bounds = self.window_bounds(id).ok_or(GuiError::WindowNotFound)?;
        let dx = (bounds.x + dx).max(0) - bounds.x;
        let dy = (bounds.y + dy).max(0) - bounds.y;
        let window = self.windows.get_mut(id).ok_or(GuiError::WindowNotFound)?;
        window.layout.move_by(dx, dy);
        self.window_bounds(id).ok_or(GuiError::WindowNotFound)
    }

    /// Resize a window by a delta, clamped to its minimum size. Gadget caches of
    /// the window and its requesters are invalidated.
    pub fn resize_window_by(&mut self, id: WindowId, dw: i32, dh: i32) -> Result<Rect> {
        let bounds = self.window_bounds(id).ok_or(GuiError::WindowNotFound)?;
        let window = self.windows.get_mut(id).ok_or(GuiError::WindowNotFound)?;
        let min = window.layout.min_size();
        let width = (bounds.width + dw).max(min.width).max(0);
        let height = (bounds.height + dh).max(min.height).max(0);
        window
            .layout
            .resize_by(width - bounds.width, height - bounds.height);
        self.invalidate_window(id);
        self.window_bounds(id).ok_or(GuiError::WindowNotFound)
    }

    /// Swap the window's bounds with its alternate zoom bounds.
    pub fn toggle_zoom(&mut self, id: WindowId) -> Result<bool> {
        let current = self.window_bounds(id).ok_or(GuiError::WindowNotFound)?;
        let window = self.windows.get_mut(id).ok_or(GuiError::WindowNotFound)?;
        let Some(alternate) = window.zoom_rect else {
            return Ok(false);
        };
        window.layout.set_absolute(alternate);
        window.zoom_rect = Some(current);
        window.flags.toggle(WindowFlags::ZOOMED);
        self.invalidate_window(id);
        Ok(true)
    }

    fn invalidate_window(&self, id: WindowId) {
        let Some(window) = self.windows.get(id) else {
            return;
        };
        window.layout.invalidate();
        let requesters = window
            .requesters
            .iter()
            .filter_map(|r| self.requesters.get(*r));
        for requester in requesters {
            requester.layout.invalidate();
            for gadget in requester.gadgets.iter().filter_map(|g| self.gadgets.get(*g)) {
                gadget.layout().invalidate();
            }
        }
        for gadget in window.gadgets.iter().filter_map(|g| self.gadgets.get(*g)) {
            gadget.layout().invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadget::{Activation, NewGadget, SystemGadget};
    use crate::geometry::{Rect, Size};
    use crate::layout::{Coord, LayoutBox};
    use crate::registry::{NewRequester, NewScreen, NewWindow};
    use crate::text::StringState;

    fn setup() -> (Registry, ScreenId) {
        let mut registry = Registry::new();
        let screen = registry.open_screen(NewScreen::new(Size::new(640, 480)));
        (registry, screen)
    }

    fn plain(rect: Rect) -> NewWindow {
        NewWindow::new(rect).with_flags(WindowFlags::BORDERLESS)
    }

    #[test]
    fn overlapping_windows_hit_topmost() {
        let (mut registry, screen) = setup();
        let a = registry.open_window(screen, plain(Rect::new(0, 0, 100, 100))).unwrap();
        let b = registry.open_window(screen, plain(Rect::new(50, 50, 100, 100))).unwrap();
        let ga = registry
            .add_gadget(
                Owner::Window(a),
                NewGadget::boolean(1, LayoutBox::absolute(Rect::new(0, 0, 100, 100))),
            )
            .unwrap();
        let gb = registry
            .add_gadget(
                Owner::Window(b),
                NewGadget::boolean(2, LayoutBox::absolute(Rect::new(0, 0, 100, 100))),
            )
            .unwrap();

        let hit = registry.hit_test(Point::new(75, 75));
        assert_eq!(hit.window, Some(b));
        assert_eq!(hit.gadget, Some(gb));
        assert_eq!(hit.local, Point::new(25, 25));

        registry.window_to_front(a).unwrap();
        let hit = registry.hit_test(Point::new(75, 75));
        assert_eq!(hit.window, Some(a));
        assert_eq!(hit.gadget, Some(ga));
    }

    #[test]
    fn miss_outside_every_screen() {
        let (registry, screen) = setup();
        let hit = registry.hit_test(Point::new(700, 10));
        assert_eq!(hit.screen, None);
        let hit = registry.hit_test(Point::new(10, 10));
        assert_eq!(hit.screen, Some(screen));
        assert_eq!(hit.window, None);
    }

    #[test]
    fn requester_blocks_window_gadgets() {
        let (mut registry, screen) = setup();
        let window = registry
            .open_window(screen, NewWindow::new(Rect::new(0, 0, 200, 150)))
            .unwrap();
        let behind = registry
            .add_gadget(
                Owner::Window(window),
                NewGadget::boolean(1, LayoutBox::absolute(Rect::new(0, 0, 180, 120))),
            )
            .unwrap();
        let border = registry.window(window).unwrap().layout().border();
        let probe = Point::new(border.left + 100, border.top + 100);
        assert_eq!(registry.hit_test(probe).gadget, Some(behind));

        let requester = registry
            .open_requester(
                window,
                NewRequester::new(LayoutBox::absolute(Rect::new(0, 0, 60, 40))),
            )
            .unwrap();
        let ok = registry
            .add_gadget(
                Owner::Requester(requester),
                NewGadget::boolean(2, LayoutBox::absolute(Rect::new(10, 10, 20, 10))),
            )
            .unwrap();
        assert_eq!(registry.hit_test(probe).gadget, None);
        assert!(registry.is_blocked(behind));
        assert!(!registry.is_blocked(ok));

        let hit = registry.hit_test(Point::new(border.left + 15, border.top + 15));
        assert_eq!(hit.gadget, Some(ok));
        assert_eq!(hit.local, Point::new(15, 15));

        let close = registry.system_gadget(window, SystemGadget::Close).unwrap();
        assert_eq!(registry.hit_test(Point::new(2, 2)).gadget, Some(close));
        assert!(!registry.is_blocked(close));
    }

    #[test]
    fn tab_order_wraps_and_skips() {
        let (mut registry, screen) = setup();
        let window = registry.open_window(screen, plain(Rect::new(0, 0, 200, 200))).unwrap();
        let owner = Owner::Window(window);
        let field = |id| {
            NewGadget::string(
                id,
                LayoutBox::absolute(Rect::new(0, id * 12, 100, 10)),
                StringState::new(),
            )
        };
        let f1 = registry.add_gadget(owner, field(1)).unwrap();
        let button = registry
            .add_gadget(
                owner,
                NewGadget::boolean(2, LayoutBox::absolute(Rect::new(0, 40, 10, 10))),
            )
            .unwrap();
        let f3 = registry.add_gadget(owner, field(3)).unwrap();

        assert_eq!(registry.next_focusable(f1, TabDirection::Next), Some(f3));
        assert_eq!(registry.next_focusable(f3, TabDirection::Next), Some(f1));
        assert_eq!(registry.next_focusable(f1, TabDirection::Previous), Some(f3));
        assert_eq!(registry.next_focusable(button, TabDirection::Next), Some(f3));
        assert_eq!(registry.first_focusable(owner), Some(f1));
    }

    #[test]
    fn resize_clamps_and_reflows_children() {
        let (mut registry, screen) = setup();
        let window = registry
            .open_window(
                screen,
                plain(Rect::new(10, 10, 200, 100)).with_min_size(Size::new(50, 40)),
            )
            .unwrap();
        let anchored = registry
            .add_gadget(
                Owner::Window(window),
                NewGadget::boolean(
                    1,
                    LayoutBox::new(
                        Coord::RelativeToParent(-20),
                        Coord::Absolute(0),
                        Coord::Absolute(20),
                        Coord::Absolute(10),
                    ),
                )
                .with_activation(Activation::RIGHT_BORDER),
            )
            .unwrap();
        assert_eq!(registry.gadget_bounds(anchored), Some(Rect::new(180, 0, 20, 10)));

        let bounds = registry.resize_window_by(window, -500, 20).unwrap();
        assert_eq!(bounds, Rect::new(10, 10, 50, 120));
        assert_eq!(registry.gadget_bounds(anchored), Some(Rect::new(30, 0, 20, 10)));

        let moved = registry.move_window_by(window, -30, 5).unwrap();
        assert_eq!(moved.origin(), Point::new(0, 15));
    }

    #[test]
    fn zoom_swaps_bounds() {
        let (mut registry, screen) = setup();
        let window = registry
            .open_window(
                screen,
                NewWindow::new(Rect::new(10, 10, 100, 80)).with_zoom(Rect::new(0, 0, 640, 480)),
            )
            .unwrap();
        assert!(registry.toggle_zoom(window).unwrap());
        assert_eq!(registry.window_bounds(window), Some(Rect::new(0, 0, 640, 480)));
        assert!(registry.window(window).unwrap().flags.contains(WindowFlags::ZOOMED));
        assert!(registry.toggle_zoom(window).unwrap());
        assert_eq!(registry.window_bounds(window), Some(Rect::new(10, 10, 100, 80)));
    }
}
