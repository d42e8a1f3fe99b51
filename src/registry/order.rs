//! Z-order maintenance for screens, windows and gadgets.
//!
//! Every ordered list is stored back to front: the last entry draws on top and is
//! hit-tested first.

use crate::error::{GuiError, Result};
use crate::gadget::Owner;

use super::core::{GadgetId, Registry, ScreenId, WindowId};

fn raise<K: Copy + PartialEq>(list: &mut Vec<K>, id: K) -> bool {
    match list.iter().position(|k| *k == id) {
        Some(index) => {
            list.remove(index);
            list.push(id);
            true
        }
        None => false,
    }
}

fn lower<K: Copy + PartialEq>(list: &mut Vec<K>, id: K) -> bool {
    match list.iter().position(|k| *k == id) {
        Some(index) => {
            list.remove(index);
            list.insert(0, id);
            true
        }
        None => false,
    }
}

fn place_above<K: Copy + PartialEq>(list: &mut Vec<K>, id: K, sibling: K) -> bool {
    if id == sibling {
        return list.contains(&id);
    }
    let Some(index) = list.iter().position(|k| *k == id) else {
        return false;
    };
    if !list.contains(&sibling) {
        return false;
    }
    list.remove(index);
    let target = list.iter().position(|k| *k == sibling).map_or(list.len(), |i| i + 1);
    list.insert(target, id);
    true
}

impl Registry {
    pub fn screen_to_front(&mut self, id: ScreenId) -> Result<()> {
        raise(&mut self.screen_order, id)
            .then_some(())
            .ok_or(GuiError::ScreenNotFound)
    }

    pub fn screen_to_back(&mut self, id: ScreenId) -> Result<()> {
        lower(&mut self.screen_order, id)
            .then_some(())
            .ok_or(GuiError::ScreenNotFound)
    }

    /// Raise a window to the top of its layer. Backdrop windows only rise to the
    /// top of the backdrop layer.
    pub fn window_to_front(&mut self, id: WindowId) -> Result<()> {
        let (screen, backdrop) = self.window_layer(id)?;
        self.detach_window(screen, id);
        let backdrops = self.backdrop_count(screen);
        if let Some(list) = self.screens.get_mut(screen).map(|s| &mut s.windows) {
            if backdrop {
                list.insert(backdrops, id);
            } else {
                list.push(id);
            }
        }
        Ok(())
    }

    /// Lower a window to the bottom of its layer.
    pub fn window_to_back(&mut self, id: WindowId) -> Result<()> {
        let (screen, backdrop) = self.window_layer(id)?;
        self.detach_window(screen, id);
        let backdrops = self.backdrop_count(screen);
        if let Some(list) = self.screens.get_mut(screen).map(|s| &mut s.windows) {
            list.insert(if backdrop { 0 } else { backdrops }, id);
        }
        Ok(())
    }

    /// Place a window directly above `sibling`, clamped to the window's own layer.
    pub fn window_in_front_of(&mut self, id: WindowId, sibling: WindowId) -> Result<()> {
        let (screen, backdrop) = self.window_layer(id)?;
        let (sibling_screen, _) = self.window_layer(sibling)?;
        if screen != sibling_screen {
            return Err(GuiError::ForeignOwner(
                "windows live on different screens".to_string(),
            ));
        }
        if id == sibling {
            return Ok(());
        }
        self.detach_window(screen, id);
        let backdrops = self.backdrop_count(screen);
        if let Some(list) = self.screens.get_mut(screen).map(|s| &mut s.windows) {
            let above = list
                .iter()
                .position(|w| *w == sibling)
                .map_or(list.len(), |i| i + 1);
            let target = if backdrop {
                above.min(backdrops)
            } else {
                above.max(backdrops)
            };
            list.insert(target, id);
        }
        Ok(())
    }

    /// Whether the window is the topmost one on its screen.
    pub fn is_frontmost(&self, id: WindowId) -> bool {
        self.windows
            .get(id)
            .and_then(|w| self.screens.get(w.screen()))
            .and_then(|s| s.windows.last())
            .is_some_and(|top| *top == id)
    }

    /// Depth gadget action: send the front window back, otherwise bring it forward.
    pub fn cycle_depth(&mut self, id: WindowId) -> Result<()> {
        let (screen, backdrop) = self.window_layer(id)?;
        let layer_top = self.screens.get(screen).and_then(|s| {
            s.windows
                .iter()
                .rev()
                .find(|w| self.windows.get(**w).is_some_and(|w| w.is_backdrop() == backdrop))
                .copied()
        });
        if layer_top == Some(id) {
            self.window_to_back(id)
        } else {
            self.window_to_front(id)
        }
    }

    pub fn gadget_to_front(&mut self, id: GadgetId) -> Result<()> {
        let owner = self.gadget_owner(id)?;
        self.with_owner_list(owner, |list| raise(list, id))
    }

    pub fn gadget_to_back(&mut self, id: GadgetId) -> Result<()> {
        let owner = self.gadget_owner(id)?;
        self.with_owner_list(owner, |list| lower(list, id))
    }

    /// Place a gadget directly above a sibling in the same container.
    pub fn gadget_in_front_of(&mut self, id: GadgetId, sibling: GadgetId) -> Result<()> {
        let owner = self.gadget_owner(id)?;
        if self.gadget_owner(sibling)? != owner {
            return Err(GuiError::ForeignOwner(
                "gadgets live in different containers".to_string(),
            ));
        }
        self.with_owner_list(owner, |list| place_above(list, id, sibling))
    }

    fn gadget_owner(&self, id: GadgetId) -> Result<Owner> {
        self.gadgets
            .get(id)
            .map(|g| g.owner())
            .ok_or(GuiError::GadgetNotFound)
    }

    fn with_owner_list(
        &mut self,
        owner: Owner,
        op: impl FnOnce(&mut Vec<GadgetId>) -> bool,
    ) -> Result<()> {
        let list = self.owner_gadgets_mut(owner).ok_or(match owner {
            Owner::Window(_) => GuiError::WindowNotFound,
            Owner::Requester(_) => GuiError::RequesterNotFound,
        })?;
        if op(list) {
            Ok(())
        } else {
            Err(GuiError::GadgetNotFound)
        }
    }

    fn window_layer(&self, id: WindowId) -> Result<(ScreenId, bool)> {
        self.windows
            .get(id)
            .map(|w| (w.screen(), w.is_backdrop()))
            .ok_or(GuiError::WindowNotFound)
    }

    fn detach_window(&mut self, screen: ScreenId, id: WindowId) {
        if let Some(screen) = self.screens.get_mut(screen) {
            screen.windows.retain(|w| *w != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Rect, Size};
    use crate::layout::LayoutBox;
    use crate::gadget::{NewGadget, Owner};
    use crate::registry::{NewScreen, NewWindow, Registry, WindowFlags};

    fn plain(rect: Rect) -> NewWindow {
        NewWindow::new(rect).with_flags(WindowFlags::empty())
    }

    #[test]
    fn backdrop_stays_behind() {
        let mut registry = Registry::new();
        let screen = registry.open_screen(NewScreen::new(Size::new(320, 200)));
        let a = registry.open_window(screen, plain(Rect::new(0, 0, 50, 50))).unwrap();
        let back = registry
            .open_window(screen, plain(Rect::new(0, 0, 320, 200)).backdrop())
            .unwrap();
        let b = registry.open_window(screen, plain(Rect::new(0, 0, 50, 50))).unwrap();
        assert_eq!(registry.screen(screen).unwrap().windows(), &[back, a, b]);

        registry.window_to_front(back).unwrap();
        assert_eq!(registry.screen(screen).unwrap().windows(), &[back, a, b]);

        registry.window_to_back(b).unwrap();
        assert_eq!(registry.screen(screen).unwrap().windows(), &[back, b, a]);

        registry.window_in_front_of(back, a).unwrap();
        assert_eq!(registry.screen(screen).unwrap().windows()[0], back);
    }

    #[test]
    fn depth_cycles_between_front_and_back() {
        let mut registry = Registry::new();
        let screen = registry.open_screen(NewScreen::new(Size::new(320, 200)));
        let a = registry.open_window(screen, plain(Rect::new(0, 0, 50, 50))).unwrap();
        let b = registry.open_window(screen, plain(Rect::new(0, 0, 50, 50))).unwrap();
        assert!(registry.is_frontmost(b));
        registry.cycle_depth(b).unwrap();
        assert!(registry.is_frontmost(a));
        registry.cycle_depth(b).unwrap();
        assert!(registry.is_frontmost(b));
    }

    #[test]
    fn gadget_order_within_owner() {
        let mut registry = Registry::new();
        let screen = registry.open_screen(NewScreen::new(Size::new(320, 200)));
        let window = registry.open_window(screen, plain(Rect::new(0, 0, 100, 100))).unwrap();
        let owner = Owner::Window(window);
        let make = |id| NewGadget::boolean(id, LayoutBox::absolute(Rect::new(0, 0, 10, 10)));
        let g1 = registry.add_gadget(owner, make(1)).unwrap();
        let g2 = registry.add_gadget(owner, make(2)).unwrap();
        let g3 = registry.add_gadget(owner, make(3)).unwrap();

        registry.gadget_to_front(g1).unwrap();
        assert_eq!(registry.window(window).unwrap().gadgets(), &[g2, g3, g1]);
        registry.gadget_to_back(g3).unwrap();
        assert_eq!(registry.window(window).unwrap().gadgets(), &[g3, g2, g1]);
        registry.gadget_in_front_of(g3, g2).unwrap();
        assert_eq!(registry.window(window).unwrap().gadgets(), &[g2, g3, g1]);
    }

    #[test]
    fn reorder_across_screens_is_rejected() {
        let mut registry = Registry::new();
        let s1 = registry.open_screen(NewScreen::new(Size::new(320, 200)));
        let s2 = registry.open_screen(NewScreen::new(Size::new(320, 200)));
        let a = registry.open_window(s1, plain(Rect::new(0, 0, 10, 10))).unwrap();
        let b = registry.open_window(s2, plain(Rect::new(0, 0, 10, 10))).unwrap();
        assert!(registry.window_in_front_of(a, b).is_err());

        registry.screen_to_back(s2).unwrap();
        assert_eq!(registry.screens(), &[s2, s1]);
        registry.screen_to_front(s2).unwrap();
        assert_eq!(registry.screens(), &[s1, s2]);
    }
}
