use crate::geometry::Rect;
use crate::registry::{GadgetId, ScreenId, WindowId};

/// Any element that can appear in a hover or active chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Screen(ScreenId),
    Window(WindowId),
    Gadget(GadgetId),
}

/// Something the router wants the application to know about.
///
/// Gadget-targeted notifications are delivered synchronously to that gadget's
/// handler and are also queued in the router's outbox.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    GadgetDown { gadget: GadgetId, id: i32 },
    GadgetUp { gadget: GadgetId, id: i32 },
    /// A proportional knob moved while FOLLOW_MOUSE is set.
    GadgetMove { gadget: GadgetId, id: i32 },
    TextChanged { gadget: GadgetId, id: i32 },
    /// Enter pressed in a string gadget.
    Submitted { gadget: GadgetId, id: i32 },
    HoverEnter(Element),
    HoverLeave(Element),
    CheckedChanged { gadget: GadgetId, checked: bool },
    /// Delivered to the first member of the group.
    RadioChanged { gadget: GadgetId, selected: usize },
    LevelChanged { gadget: GadgetId, level: i32 },
    ScrollChanged { gadget: GadgetId, top: i32 },
    NumberChanged { gadget: GadgetId, value: i64 },
    WindowActivated(WindowId),
    WindowDeactivated(WindowId),
    CloseRequested(WindowId),
    WindowMoved { window: WindowId, bounds: Rect },
    WindowResized { window: WindowId, bounds: Rect },
    WindowDepth(WindowId),
    WindowZoomed { window: WindowId, zoomed: bool },
}

impl Notification {
    /// Gadget whose handler receives this notification.
    pub fn gadget(&self) -> Option<GadgetId> {
        match self {
            Notification::GadgetDown { gadget, .. }
            | Notification::GadgetUp { gadget, .. }
            | Notification::GadgetMove { gadget, .. }
            | Notification::TextChanged { gadget, .. }
            | Notification::Submitted { gadget, .. }
            | Notification::CheckedChanged { gadget, .. }
            | Notification::RadioChanged { gadget, .. }
            | Notification::LevelChanged { gadget, .. }
            | Notification::ScrollChanged { gadget, .. }
            | Notification::NumberChanged { gadget, .. } => Some(*gadget),
            Notification::HoverEnter(Element::Gadget(gadget))
            | Notification::HoverLeave(Element::Gadget(gadget)) => Some(*gadget),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Notification::GadgetDown { .. } => "gadget_down",
            Notification::GadgetUp { .. } => "gadget_up",
            Notification::GadgetMove { .. } => "gadget_move",
            Notification::TextChanged { .. } => "text_changed",
            Notification::Submitted { .. } => "submitted",
            Notification::HoverEnter(_) => "hover_enter",
            Notification::HoverLeave(_) => "hover_leave",
            Notification::CheckedChanged { .. } => "checked_changed",
            Notification::RadioChanged { .. } => "radio_changed",
            Notification::LevelChanged { .. } => "level_changed",
            Notification::ScrollChanged { .. } => "scroll_changed",
            Notification::NumberChanged { .. } => "number_changed",
            Notification::WindowActivated(_) => "window_activated",
            Notification::WindowDeactivated(_) => "window_deactivated",
            Notification::CloseRequested(_) => "close_requested",
            Notification::WindowMoved { .. } => "window_moved",
            Notification::WindowResized { .. } => "window_resized",
            Notification::WindowDepth(_) => "window_depth",
            Notification::WindowZoomed { .. } => "window_zoomed",
        }
    }
}
