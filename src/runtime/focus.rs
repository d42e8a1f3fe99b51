use crate::registry::{GadgetId, HitChain, Registry, ScreenId, WindowId};

use super::notify::Element;

/// A (screen, window, gadget) path. The router keeps one for hover and one for
/// the active (pressed / keyboard-focused) elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chain {
    pub screen: Option<ScreenId>,
    pub window: Option<WindowId>,
    pub gadget: Option<GadgetId>,
}

impl Chain {
    pub fn from_hit(hit: &HitChain) -> Self {
        Self {
            screen: hit.screen,
            window: hit.window,
            gadget: hit.gadget,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.screen.is_none() && self.window.is_none() && self.gadget.is_none()
    }

    /// Elements of `self` that are not in `other`, innermost first.
    pub fn left_for(&self, other: &Chain) -> Vec<Element> {
        let mut out = Vec::new();
        if self.gadget.is_some() && self.gadget != other.gadget {
            out.extend(self.gadget.map(Element::Gadget));
        }
        if self.window.is_some() && self.window != other.window {
            out.extend(self.window.map(Element::Window));
        }
        if self.screen.is_some() && self.screen != other.screen {
            out.extend(self.screen.map(Element::Screen));
        }
        out
    }

    /// Elements of `self` that are not in `previous`, outermost first.
    pub fn entered_from(&self, previous: &Chain) -> Vec<Element> {
        let mut entered = self.left_for(previous);
        entered.reverse();
        entered
    }

    /// Drop entries that no longer exist in the registry.
    pub fn prune(&mut self, registry: &Registry) {
        if self.gadget.is_some_and(|g| registry.gadget(g).is_none()) {
            self.gadget = None;
        }
        if self.window.is_some_and(|w| registry.window(w).is_none()) {
            self.window = None;
            self.gadget = None;
        }
        if self.screen.is_some_and(|s| registry.screen(s).is_none()) {
            *self = Chain::default();
        }
    }
}
