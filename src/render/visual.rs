use serde::Serialize;

use crate::font::Font;
use crate::gadget::{GadgetFlags, GadgetKind, GadgetType, IconId, Owner};
use crate::geometry::Rect;
use crate::registry::{GadgetId, Registry, WindowId};
use crate::text::StringState;

/// Read-only snapshot of everything a renderer needs to draw one gadget, in
/// screen space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GadgetVisual {
    pub id: i32,
    pub kind: GadgetType,
    pub bounds: Rect,
    pub flags: GadgetFlags,
    pub text: Option<String>,
    pub icon: Option<IconId>,
    pub knob: Option<Rect>,
    pub edit: Option<EditVisual>,
}

/// Visible slice of a string gadget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditVisual {
    pub visible: String,
    /// Screen-space x of the cursor.
    pub cursor_x: i32,
    /// Screen-space x range of the highlighted selection, if any is visible.
    pub selection: Option<(i32, i32)>,
}

impl GadgetVisual {
    pub fn capture(
        registry: &Registry,
        gadget: GadgetId,
        font: &dyn Font,
        min_knob: i32,
    ) -> Option<Self> {
        let target = registry.gadget(gadget)?;
        let bounds = registry.absolute_bounds(gadget)?;
        let (knob, edit) = match target.kind() {
            GadgetKind::Bool => (None, None),
            GadgetKind::Prop(state) => (Some(state.knob_rect(bounds, min_knob)), None),
            GadgetKind::String(state) => (None, Some(EditVisual::capture(state, bounds, font))),
        };
        Some(Self {
            id: target.id(),
            kind: target.gadget_type(),
            bounds,
            flags: target.flags,
            text: target.text.clone(),
            icon: target.icon,
            knob,
            edit,
        })
    }
}

impl EditVisual {
    fn capture(state: &StringState, bounds: Rect, font: &dyn Font) -> Self {
        let offset = state.display_offset();
        let mut visible = String::new();
        let mut x = bounds.x;
        let mut cursor_x = bounds.x;
        let mut selection: Option<(i32, i32)> = None;
        for (index, ch) in state.text().chars().enumerate().skip(offset) {
            if index == state.cursor() {
                cursor_x = x;
            }
            let advance = font.advance(ch);
            if x + advance > bounds.right() {
                break;
            }
            if index >= state.selection_start() && index < state.selection_end() {
                selection = Some(match selection {
                    Some((start, _)) => (start, x + advance),
                    None => (x, x + advance),
                });
            }
            visible.push(ch);
            x += advance;
        }
        if state.cursor() >= offset + visible.chars().count() {
            cursor_x = x;
        }
        Self {
            visible,
            cursor_x,
            selection,
        }
    }
}

/// Gadgets of one window in drawing order: window gadgets back to front, then
/// each requester's gadgets.
pub fn window_gadgets(registry: &Registry, window: WindowId) -> Vec<GadgetId> {
    let Some(win) = registry.window(window) else {
        return Vec::new();
    };
    let mut out = win.gadgets().to_vec();
    for requester in win.requesters() {
        if let Some(list) = registry.owner_gadgets(Owner::Requester(*requester)) {
            out.extend_from_slice(list);
        }
    }
    out
}

/// Every gadget in drawing order across all screens.
pub fn drawing_order(registry: &Registry) -> Vec<GadgetId> {
    registry
        .screens()
        .iter()
        .filter_map(|s| registry.screen(*s))
        .flat_map(|screen| screen.windows().to_vec())
        .flat_map(|window| window_gadgets(registry, window))
        .collect()
}
