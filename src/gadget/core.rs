use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};

use crate::font::Font;
use crate::geometry::{Point, Rect};
use crate::layout::LayoutBox;
use crate::prop::{PropPress, PropState};
use crate::registry::{GadgetId, RequesterId, WindowId};
use crate::runtime::Notification;
use crate::text::{StringState, TextEdit};
use crate::widgets::WidgetRole;

use super::flags::{Activation, GadgetFlags, IconId, SystemGadget};

/// Synchronous user callback attached to a gadget.
///
/// Handlers only see the notification, never the registry, so they cannot close
/// the gadget that is dispatching to them.
pub type Handler = Box<dyn FnMut(&Notification)>;

/// Type tag of a gadget, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum GadgetType {
    Bool,
    Prop,
    String,
}

/// Closed set of gadget kinds with their type-specific state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GadgetKind {
    Bool,
    Prop(PropState),
    String(StringState),
}

impl GadgetKind {
    pub fn gadget_type(&self) -> GadgetType {
        match self {
            GadgetKind::Bool => GadgetType::Bool,
            GadgetKind::Prop(_) => GadgetType::Prop,
            GadgetKind::String(_) => GadgetType::String,
        }
    }
}

/// The single container a gadget lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Window(WindowId),
    Requester(RequesterId),
}

/// Direction of Tab navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabDirection {
    Next,
    Previous,
}

/// How a gadget reacted to one input call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ignored,
    Consumed,
    Down,
    Up,
    /// A proportional knob moved.
    Moved,
    /// A string buffer changed.
    Edited,
    Navigate(TabDirection),
}

impl Response {
    pub fn is_handled(self) -> bool {
        !matches!(self, Response::Ignored)
    }
}

/// Geometry and metrics a gadget needs to react to input. `bounds` and the pointer
/// positions passed alongside it share the owner's local coordinate space.
#[derive(Clone, Copy)]
pub struct InputFrame<'a> {
    pub bounds: Rect,
    pub font: &'a dyn Font,
    pub min_knob: i32,
}

/// Construction parameters for [`crate::registry::Registry::add_gadget`].
pub struct NewGadget {
    pub(crate) id: i32,
    pub(crate) layout: LayoutBox,
    pub(crate) kind: GadgetKind,
    pub(crate) activation: Activation,
    pub(crate) flags: GadgetFlags,
    pub(crate) text: Option<String>,
    pub(crate) icon: Option<IconId>,
    pub(crate) label: Option<GadgetId>,
    pub(crate) role: Option<WidgetRole>,
    pub(crate) handler: Option<Handler>,
}

impl NewGadget {
    fn with_kind(id: i32, layout: LayoutBox, kind: GadgetKind) -> Self {
        Self {
            id,
            layout,
            kind,
            activation: Activation::REL_VERIFY,
            flags: GadgetFlags::empty(),
            text: None,
            icon: None,
            label: None,
            role: None,
            handler: None,
        }
    }

    pub fn boolean(id: i32, layout: LayoutBox) -> Self {
        Self::with_kind(id, layout, GadgetKind::Bool)
    }

    pub fn prop(id: i32, layout: LayoutBox, state: PropState) -> Self {
        Self::with_kind(id, layout, GadgetKind::Prop(state))
    }

    pub fn string(id: i32, layout: LayoutBox, state: StringState) -> Self {
        Self::with_kind(id, layout, GadgetKind::String(state))
            .with_activation(Activation::REL_VERIFY | Activation::TAB_CYCLE)
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_flags(mut self, flags: GadgetFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_icon(mut self, icon: IconId) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Link a text-label gadget living in the same container.
    pub fn with_label(mut self, label: GadgetId) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_handler(mut self, handler: impl FnMut(&Notification) + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    pub(crate) fn with_role(mut self, role: WidgetRole) -> Self {
        self.role = Some(role);
        self
    }
}

/// Interactive widget: a positioned box plus kind-specific state.
pub struct Gadget {
    id: i32,
    layout: LayoutBox,
    kind: GadgetKind,
    owner: Owner,
    window: WindowId,
    pub activation: Activation,
    pub flags: GadgetFlags,
    pub text: Option<String>,
    pub icon: Option<IconId>,
    label: Option<GadgetId>,
    pub(crate) role: Option<WidgetRole>,
    handler: Option<Handler>,
}

impl fmt::Debug for Gadget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gadget")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("owner", &self.owner)
            .field("activation", &self.activation)
            .field("flags", &self.flags)
            .field("text", &self.text)
            .field("icon", &self.icon)
            .field("label", &self.label)
            .field("role", &self.role)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl Gadget {
    pub(crate) fn from_new(new: NewGadget, owner: Owner, window: WindowId) -> Self {
        Self {
            id: new.id,
            layout: new.layout,
            kind: new.kind,
            owner,
            window,
            activation: new.activation,
            flags: new.flags,
            text: new.text,
            icon: new.icon,
            label: new.label,
            role: new.role,
            handler: new.handler,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn gadget_type(&self) -> GadgetType {
        self.kind.gadget_type()
    }

    pub fn kind(&self) -> &GadgetKind {
        &self.kind
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Window the gadget is ultimately drawn in, through its requester if any.
    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn label(&self) -> Option<GadgetId> {
        self.label
    }

    pub fn layout(&self) -> &LayoutBox {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutBox {
        &mut self.layout
    }

    pub fn role(&self) -> Option<&WidgetRole> {
        self.role.as_ref()
    }

    pub fn system(&self) -> Option<SystemGadget> {
        SystemGadget::from_id(self.id)
    }

    pub fn is_selected(&self) -> bool {
        self.flags.contains(GadgetFlags::SELECTED)
    }

    pub fn is_disabled(&self) -> bool {
        self.flags.contains(GadgetFlags::DISABLED)
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.flags.set(GadgetFlags::SELECTED, selected);
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.flags.set(GadgetFlags::DISABLED, disabled);
    }

    pub fn is_focusable(&self) -> bool {
        self.activation.contains(Activation::TAB_CYCLE) && !self.is_disabled()
    }

    pub fn prop(&self) -> Option<&PropState> {
        match &self.kind {
            GadgetKind::Prop(state) => Some(state),
            _ => None,
        }
    }

    pub fn prop_mut(&mut self) -> Option<&mut PropState> {
        match &mut self.kind {
            GadgetKind::Prop(state) => Some(state),
            _ => None,
        }
    }

    pub fn string(&self) -> Option<&StringState> {
        match &self.kind {
            GadgetKind::String(state) => Some(state),
            _ => None,
        }
    }

    pub fn string_mut(&mut self) -> Option<&mut StringState> {
        match &mut self.kind {
            GadgetKind::String(state) => Some(state),
            _ => None,
        }
    }

    /// Install or replace the user callback.
    pub fn set_handler(&mut self, handler: impl FnMut(&Notification) + 'static) {
        self.handler = Some(Box::new(handler));
    }

    pub(crate) fn notify(&mut self, notification: &Notification) {
        if let Some(handler) = self.handler.as_mut() {
            handler(notification);
        }
    }

    pub fn pointer_down(&mut self, point: Point, frame: InputFrame<'_>) -> Response {
        if self.is_disabled() {
            return Response::Ignored;
        }
        let immediate = self.activation.contains(Activation::IMMEDIATE);
        match &mut self.kind {
            GadgetKind::Bool => {
                if !self.activation.contains(Activation::TOGGLE_SELECT) {
                    self.flags.insert(GadgetFlags::SELECTED);
                }
                press_response(immediate)
            }
            GadgetKind::Prop(state) => match state.press(point, frame.bounds, frame.min_knob) {
                PropPress::Knob => press_response(immediate),
                PropPress::Paged { changed: true } => Response::Moved,
                PropPress::Paged { changed: false } => Response::Consumed,
                PropPress::Outside => Response::Ignored,
            },
            GadgetKind::String(state) => {
                state.click_at(point.x - frame.bounds.x, frame.font);
                state.scroll_to_cursor(frame.font, frame.bounds.width);
                press_response(immediate)
            }
        }
    }

    /// Pointer motion while this gadget is active (`held`) or merely hovered.
    pub fn pointer_move(&mut self, point: Point, frame: InputFrame<'_>, held: bool) -> Response {
        if self.is_disabled() {
            return Response::Ignored;
        }
        let toggle = self.activation.contains(Activation::TOGGLE_SELECT);
        match &mut self.kind {
            GadgetKind::Bool => {
                if !held || toggle {
                    return Response::Ignored;
                }
                let inside = frame.bounds.contains(point);
                if inside == self.flags.contains(GadgetFlags::SELECTED) {
                    return Response::Ignored;
                }
                self.flags.set(GadgetFlags::SELECTED, inside);
                Response::Consumed
            }
            GadgetKind::Prop(state) => {
                if held {
                    if state.drag(point, frame.bounds, frame.min_knob) {
                        Response::Moved
                    } else {
                        Response::Consumed
                    }
                } else if state.update_hover(point, frame.bounds, frame.min_knob) {
                    Response::Consumed
                } else {
                    Response::Ignored
                }
            }
            GadgetKind::String(state) => {
                if !held {
                    return Response::Ignored;
                }
                if state.drag_to(point.x - frame.bounds.x, frame.font) {
                    state.scroll_to_cursor(frame.font, frame.bounds.width);
                    Response::Consumed
                } else {
                    Response::Ignored
                }
            }
        }
    }

    pub fn pointer_up(&mut self, point: Point, frame: InputFrame<'_>) -> Response {
        let inside = frame.bounds.contains(point);
        let verify = self.activation.contains(Activation::REL_VERIFY);
        let toggle = self.activation.contains(Activation::TOGGLE_SELECT);
        let enabled = !self.is_disabled();
        match &mut self.kind {
            GadgetKind::Bool => {
                if inside || !toggle {
                    self.deselect();
                }
                if inside && verify && enabled {
                    Response::Up
                } else {
                    Response::Consumed
                }
            }
            GadgetKind::Prop(state) => {
                if state.release() && verify {
                    Response::Up
                } else {
                    Response::Consumed
                }
            }
            GadgetKind::String(_) => Response::Consumed,
        }
    }

    /// End a press: toggle gadgets flip their selected state, others clear it.
    pub fn deselect(&mut self) {
        match &mut self.kind {
            GadgetKind::Bool => {
                if self.activation.contains(Activation::TOGGLE_SELECT) {
                    self.flags.toggle(GadgetFlags::SELECTED);
                } else {
                    self.flags.remove(GadgetFlags::SELECTED);
                }
            }
            GadgetKind::Prop(state) => {
                state.release();
            }
            GadgetKind::String(state) => state.clear_selection(),
        }
    }

    pub fn key_down(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        frame: InputFrame<'_>,
    ) -> Response {
        if self.is_disabled() {
            return Response::Ignored;
        }
        match code {
            KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => {
                return Response::Navigate(TabDirection::Previous);
            }
            KeyCode::Tab => return Response::Navigate(TabDirection::Next),
            KeyCode::BackTab => return Response::Navigate(TabDirection::Previous),
            KeyCode::Enter => return Response::Up,
            _ => {}
        }
        match &mut self.kind {
            GadgetKind::String(state) => {
                let edit = state.handle_key(code, modifiers);
                state.scroll_to_cursor(frame.font, frame.bounds.width);
                match edit {
                    TextEdit::Changed => Response::Edited,
                    TextEdit::Moved => Response::Consumed,
                    TextEdit::Ignored => Response::Ignored,
                }
            }
            GadgetKind::Bool | GadgetKind::Prop(_) => Response::Ignored,
        }
    }

    pub fn key_up(&mut self, _code: KeyCode, _modifiers: KeyModifiers) -> Response {
        Response::Ignored
    }

    pub fn text_input(&mut self, text: &str, frame: InputFrame<'_>) -> Response {
        if self.is_disabled() {
            return Response::Ignored;
        }
        match &mut self.kind {
            GadgetKind::String(state) => {
                let inserted = state.insert_str(text);
                state.scroll_to_cursor(frame.font, frame.bounds.width);
                if inserted > 0 {
                    Response::Edited
                } else {
                    Response::Consumed
                }
            }
            GadgetKind::Bool | GadgetKind::Prop(_) => Response::Ignored,
        }
    }
}

fn press_response(immediate: bool) -> Response {
    if immediate {
        Response::Down
    } else {
        Response::Consumed
    }
}
