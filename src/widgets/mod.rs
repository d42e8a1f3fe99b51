//! Compound widgets assembled from plain gadgets.
//!
//! Each widget records a [`WidgetRole`] on its gadgets; the router consults the
//! role after a gadget completes a click, moves a knob or submits text, and turns
//! the low-level event into a widget-level notification.

use crate::error::{GuiError, Result};
use crate::font::Font;
use crate::gadget::{Activation, GadgetFlags, IconId, NewGadget, Owner};
use crate::geometry::Rect;
use crate::layout::{Coord, LayoutBox};
use crate::prop::{Axis, PropState, scroller_decode, scroller_encode, slider_decode, slider_encode};
use crate::registry::{GadgetId, Registry};
use crate::runtime::Notification;
use crate::text::StringState;

pub const ICON_CHECKBOX_OFF: IconId = IconId(1);
pub const ICON_CHECKBOX_ON: IconId = IconId(2);
pub const ICON_RADIO_OFF: IconId = IconId(3);
pub const ICON_RADIO_ON: IconId = IconId(4);

/// Square glyph cell reserved for checkbox and radio marks.
const MARK_SIZE: i32 = 12;
const LABEL_GAP: i32 = 4;

/// Widget-level meaning attached to a gadget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetRole {
    Checkbox { checked: bool },
    /// Clicking the label toggles `target`.
    CheckboxLabel { target: GadgetId },
    RadioMember { members: Vec<GadgetId>, index: usize },
    Slider { levels: i32, level: i32 },
    Scroller { total: i32, visible: i32, top: i32 },
    IntegerField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkbox {
    pub mark: GadgetId,
    pub label: GadgetId,
}

/// Create a checkbox mark at `(x, y)` with a clickable text label to its right.
///
/// The mark takes `id` and the label `id + 1`; both must be free in the window.
#[allow(clippy::too_many_arguments)]
pub fn checkbox(
    registry: &mut Registry,
    owner: Owner,
    id: i32,
    x: i32,
    y: i32,
    text: &str,
    checked: bool,
    font: &dyn Font,
) -> Result<Checkbox> {
    claim_ids(registry, owner, [id, id + 1])?;
    let label_layout = LayoutBox::absolute(Rect::new(
        x + MARK_SIZE + LABEL_GAP,
        y,
        font.text_width(text),
        MARK_SIZE.max(font.line_height()),
    ));
    let label = registry.add_gadget(
        owner,
        NewGadget::boolean(id + 1, label_layout).with_text(text),
    )?;

    let mut flags = GadgetFlags::empty();
    flags.set(GadgetFlags::SELECTED, checked);
    let mark = registry.add_gadget(
        owner,
        NewGadget::boolean(id, LayoutBox::absolute(Rect::new(x, y, MARK_SIZE, MARK_SIZE)))
            .with_activation(Activation::REL_VERIFY | Activation::TOGGLE_SELECT)
            .with_flags(flags)
            .with_icon(checkbox_icon(checked))
            .with_label(label)
            .with_role(WidgetRole::Checkbox { checked }),
    )?;
    set_role(registry, label, WidgetRole::CheckboxLabel { target: mark })?;
    Ok(Checkbox { mark, label })
}

/// Create a vertical group of mutually exclusive options. The first member is the
/// group leader and receives `RadioChanged` notifications.
///
/// Members take ids `first_id..first_id + options.len()`, all of which must be
/// free in the window.
#[allow(clippy::too_many_arguments)]
pub fn radio_group(
    registry: &mut Registry,
    owner: Owner,
    first_id: i32,
    x: i32,
    y: i32,
    options: &[&str],
    selected: usize,
    font: &dyn Font,
) -> Result<Vec<GadgetId>> {
    if options.is_empty() {
        return Err(GuiError::EmptyRadioGroup);
    }
    claim_ids(registry, owner, (0..options.len()).map(|i| first_id + i as i32))?;
    let selected = selected.min(options.len() - 1);
    let row = MARK_SIZE.max(font.line_height()) + LABEL_GAP;

    let mut members = Vec::with_capacity(options.len());
    for (index, option) in options.iter().enumerate() {
        let width = MARK_SIZE + LABEL_GAP + font.text_width(option);
        let layout = LayoutBox::absolute(Rect::new(x, y + row * index as i32, width, MARK_SIZE));
        let on = index == selected;
        let mut flags = GadgetFlags::empty();
        flags.set(GadgetFlags::SELECTED, on);
        let gadget = registry.add_gadget(
            owner,
            NewGadget::boolean(first_id + index as i32, layout)
                .with_activation(Activation::REL_VERIFY | Activation::TOGGLE_SELECT)
                .with_flags(flags)
                .with_text(*option)
                .with_icon(radio_icon(on)),
        )?;
        members.push(gadget);
    }
    for (index, member) in members.iter().enumerate() {
        set_role(
            registry,
            *member,
            WidgetRole::RadioMember {
                members: members.clone(),
                index,
            },
        )?;
    }
    Ok(members)
}

/// Create a slider with `levels` discrete positions.
pub fn slider(
    registry: &mut Registry,
    owner: Owner,
    id: i32,
    layout: LayoutBox,
    axis: Axis,
    levels: i32,
    level: i32,
) -> Result<GadgetId> {
    let level = level.clamp(0, (levels - 1).max(0));
    let (pot, body) = slider_encode(level, levels);
    let mut state = PropState::for_axis(axis);
    state.set(axis, pot, body);
    registry.add_gadget(
        owner,
        NewGadget::prop(id, layout, state)
            .with_activation(Activation::REL_VERIFY)
            .with_role(WidgetRole::Slider { levels, level }),
    )
}

/// Create a scrollbar over `total` units of which `visible` are shown.
#[allow(clippy::too_many_arguments)]
pub fn scroller(
    registry: &mut Registry,
    owner: Owner,
    id: i32,
    layout: LayoutBox,
    axis: Axis,
    total: i32,
    visible: i32,
    top: i32,
) -> Result<GadgetId> {
    let (pot, body) = scroller_encode(total, visible, top);
    let top = scroller_decode(pot, total, visible);
    let mut state = PropState::for_axis(axis);
    state.set(axis, pot, body);
    registry.add_gadget(
        owner,
        NewGadget::prop(id, layout, state)
            .with_activation(Activation::REL_VERIFY)
            .with_role(WidgetRole::Scroller {
                total,
                visible,
                top,
            }),
    )
}

/// Create a string gadget that only accepts a signed integer.
pub fn integer_field(
    registry: &mut Registry,
    owner: Owner,
    id: i32,
    layout: LayoutBox,
    value: i64,
    max_chars: usize,
) -> Result<GadgetId> {
    let state = StringState::integer(value).with_max_chars(max_chars);
    registry.add_gadget(
        owner,
        NewGadget::string(id, layout, state).with_role(WidgetRole::IntegerField),
    )
}

/// Text label sized to its content, anchored like `left`/`top`.
pub fn label(
    registry: &mut Registry,
    owner: Owner,
    id: i32,
    left: Coord,
    top: Coord,
    text: &str,
    font: &dyn Font,
) -> Result<GadgetId> {
    let layout = LayoutBox::new(
        left,
        top,
        Coord::Absolute(font.text_width(text)),
        Coord::Absolute(font.line_height()),
    );
    registry.add_gadget(
        owner,
        NewGadget::boolean(id, layout)
            .with_activation(Activation::empty())
            .with_text(text),
    )
}

pub fn is_checked(registry: &Registry, gadget: GadgetId) -> Option<bool> {
    match registry.gadget(gadget)?.role()? {
        WidgetRole::Checkbox { checked } => Some(*checked),
        _ => None,
    }
}

pub fn set_checked(registry: &mut Registry, gadget: GadgetId, checked: bool) -> Result<()> {
    let target = registry.gadget_mut(gadget).ok_or(GuiError::GadgetNotFound)?;
    if !matches!(target.role, Some(WidgetRole::Checkbox { .. })) {
        return Err(GuiError::KindMismatch { expected: "checkbox" });
    }
    target.set_selected(checked);
    sync_checkbox(registry, gadget);
    Ok(())
}

/// Index of the selected member of the group `gadget` belongs to.
pub fn radio_selected(registry: &Registry, gadget: GadgetId) -> Option<usize> {
    let WidgetRole::RadioMember { members, .. } = registry.gadget(gadget)?.role()? else {
        return None;
    };
    members
        .iter()
        .position(|m| registry.gadget(*m).is_some_and(|g| g.is_selected()))
}

pub fn set_radio_selected(registry: &mut Registry, gadget: GadgetId, index: usize) -> Result<()> {
    let members = match registry.gadget(gadget).and_then(|g| g.role()) {
        Some(WidgetRole::RadioMember { members, .. }) => members.clone(),
        Some(_) => return Err(GuiError::KindMismatch { expected: "radio member" }),
        None => return Err(GuiError::GadgetNotFound),
    };
    let index = index.min(members.len().saturating_sub(1));
    select_radio(registry, &members, index);
    Ok(())
}

pub fn slider_level(registry: &Registry, gadget: GadgetId) -> Option<i32> {
    match registry.gadget(gadget)?.role()? {
        WidgetRole::Slider { level, .. } => Some(*level),
        _ => None,
    }
}

/// Set a slider's level, clamped to its range.
pub fn set_slider_level(registry: &mut Registry, gadget: GadgetId, level: i32) -> Result<()> {
    let target = registry.gadget_mut(gadget).ok_or(GuiError::GadgetNotFound)?;
    let Some(WidgetRole::Slider { levels, .. }) = target.role.clone() else {
        return Err(GuiError::KindMismatch { expected: "slider" });
    };
    let level = level.clamp(0, (levels - 1).max(0));
    let (pot, body) = slider_encode(level, levels);
    if let Some(state) = target.prop_mut() {
        let axis = state.primary_axis();
        state.set(axis, pot, body);
    }
    target.role = Some(WidgetRole::Slider { levels, level });
    Ok(())
}

pub fn scroller_top(registry: &Registry, gadget: GadgetId) -> Option<i32> {
    match registry.gadget(gadget)?.role()? {
        WidgetRole::Scroller { top, .. } => Some(*top),
        _ => None,
    }
}

/// Update a scrollbar after its content or viewport changed.
pub fn set_scroller(
    registry: &mut Registry,
    gadget: GadgetId,
    total: i32,
    visible: i32,
    top: i32,
) -> Result<()> {
    let target = registry.gadget_mut(gadget).ok_or(GuiError::GadgetNotFound)?;
    if !matches!(target.role, Some(WidgetRole::Scroller { .. })) {
        return Err(GuiError::KindMismatch { expected: "scroller" });
    }
    let (pot, body) = scroller_encode(total, visible, top);
    if let Some(state) = target.prop_mut() {
        let axis = state.primary_axis();
        state.set(axis, pot, body);
    }
    target.role = Some(WidgetRole::Scroller {
        total,
        visible,
        top: scroller_decode(pot, total, visible),
    });
    Ok(())
}

pub fn integer_value(registry: &Registry, gadget: GadgetId) -> Option<i64> {
    registry.gadget(gadget)?.string()?.integer_value()
}

/// Widget reaction to a completed click (or Enter) on `gadget`.
pub(crate) fn on_up(registry: &mut Registry, gadget: GadgetId) -> Vec<Notification> {
    let Some(role) = registry.gadget(gadget).and_then(|g| g.role().cloned()) else {
        return Vec::new();
    };
    match role {
        WidgetRole::Checkbox { .. } => sync_checkbox(registry, gadget).into_iter().collect(),
        WidgetRole::CheckboxLabel { target } => {
            let Some(mark) = registry.gadget_mut(target) else {
                return Vec::new();
            };
            if mark.is_disabled() {
                return Vec::new();
            }
            let checked = !mark.is_selected();
            mark.set_selected(checked);
            let mut out = vec![Notification::GadgetUp {
                gadget: target,
                id: mark.id(),
            }];
            out.extend(sync_checkbox(registry, target));
            out
        }
        WidgetRole::RadioMember { members, index } => {
            select_radio(registry, &members, index);
            members
                .first()
                .map(|leader| Notification::RadioChanged {
                    gadget: *leader,
                    selected: index,
                })
                .into_iter()
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Widget reaction to a knob movement; fires only when the discrete value changes.
pub(crate) fn on_moved(registry: &mut Registry, gadget: GadgetId) -> Option<Notification> {
    let target = registry.gadget_mut(gadget)?;
    let state = target.prop()?;
    let pot = state.pot(state.primary_axis());
    match target.role.clone()? {
        WidgetRole::Slider { levels, level } => {
            let decoded = slider_decode(pot, levels);
            if decoded == level {
                return None;
            }
            target.role = Some(WidgetRole::Slider {
                levels,
                level: decoded,
            });
            Some(Notification::LevelChanged {
                gadget,
                level: decoded,
            })
        }
        WidgetRole::Scroller {
            total,
            visible,
            top,
        } => {
            let decoded = scroller_decode(pot, total, visible);
            if decoded == top {
                return None;
            }
            target.role = Some(WidgetRole::Scroller {
                total,
                visible,
                top: decoded,
            });
            Some(Notification::ScrollChanged {
                gadget,
                top: decoded,
            })
        }
        _ => None,
    }
}

/// Widget reaction to Enter in a string gadget.
pub(crate) fn on_submit(registry: &Registry, gadget: GadgetId) -> Option<Notification> {
    let target = registry.gadget(gadget)?;
    match target.role()? {
        WidgetRole::IntegerField => target
            .string()?
            .integer_value()
            .map(|value| Notification::NumberChanged { gadget, value }),
        _ => None,
    }
}

fn set_role(registry: &mut Registry, gadget: GadgetId, role: WidgetRole) -> Result<()> {
    let target = registry.gadget_mut(gadget).ok_or(GuiError::GadgetNotFound)?;
    target.role = Some(role);
    Ok(())
}

/// Fail when a widget would reuse an id already present in the owner's window.
fn claim_ids(registry: &Registry, owner: Owner, ids: impl IntoIterator<Item = i32>) -> Result<()> {
    let window = match owner {
        Owner::Window(window) => Some(window),
        Owner::Requester(requester) => registry.requester(requester).map(|r| r.window()),
    };
    // Unknown owners are reported by `add_gadget`.
    let Some(window) = window else {
        return Ok(());
    };
    for id in ids {
        if registry.find_gadget(window, id).is_some() {
            return Err(GuiError::DuplicateId(id));
        }
    }
    Ok(())
}

fn sync_checkbox(registry: &mut Registry, gadget: GadgetId) -> Option<Notification> {
    let target = registry.gadget_mut(gadget)?;
    let checked = target.is_selected();
    let Some(WidgetRole::Checkbox { checked: previous }) = target.role.clone() else {
        return None;
    };
    target.icon = Some(checkbox_icon(checked));
    if previous == checked {
        return None;
    }
    target.role = Some(WidgetRole::Checkbox { checked });
    Some(Notification::CheckedChanged { gadget, checked })
}

fn select_radio(registry: &mut Registry, members: &[GadgetId], index: usize) {
    for (i, member) in members.iter().enumerate() {
        if let Some(gadget) = registry.gadget_mut(*member) {
            gadget.set_selected(i == index);
            gadget.icon = Some(radio_icon(i == index));
        }
    }
}

fn checkbox_icon(checked: bool) -> IconId {
    if checked {
        ICON_CHECKBOX_ON
    } else {
        ICON_CHECKBOX_OFF
    }
}

fn radio_icon(on: bool) -> IconId {
    if on { ICON_RADIO_ON } else { ICON_RADIO_OFF }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::MonospaceFont;
    use crate::geometry::Size;
    use crate::prop::MAXPOT;
    use crate::registry::{NewScreen, NewWindow, WindowFlags};

    fn window(registry: &mut Registry) -> Owner {
        let screen = registry.open_screen(NewScreen::new(Size::new(320, 200)));
        let window = registry
            .open_window(
                screen,
                NewWindow::new(Rect::new(0, 0, 320, 200)).with_flags(WindowFlags::BORDERLESS),
            )
            .unwrap();
        Owner::Window(window)
    }

    #[test]
    fn checkbox_links_label_in_same_window() {
        let mut registry = Registry::new();
        let owner = window(&mut registry);
        let font = MonospaceFont::default();
        let cb = checkbox(&mut registry, owner, 10, 4, 4, "Sound", false, &font).unwrap();
        let mark = registry.gadget(cb.mark).unwrap();
        assert_eq!(mark.label(), Some(cb.label));
        assert_eq!(mark.icon, Some(ICON_CHECKBOX_OFF));
        assert_eq!(
            registry.gadget_bounds(cb.label),
            Some(Rect::new(4 + MARK_SIZE + LABEL_GAP, 4, 40, MARK_SIZE))
        );

        let events = on_up(&mut registry, cb.label);
        assert_eq!(
            events,
            vec![
                Notification::GadgetUp {
                    gadget: cb.mark,
                    id: 10
                },
                Notification::CheckedChanged {
                    gadget: cb.mark,
                    checked: true
                }
            ]
        );
        assert_eq!(is_checked(&registry, cb.mark), Some(true));
        assert_eq!(registry.gadget(cb.mark).unwrap().icon, Some(ICON_CHECKBOX_ON));
    }

    #[test]
    fn widgets_refuse_taken_ids() {
        let mut registry = Registry::new();
        let owner = window(&mut registry);
        let font = MonospaceFont::default();
        let taken = LayoutBox::absolute(Rect::new(0, 40, 8, 8));
        registry.add_gadget(owner, NewGadget::boolean(11, taken)).unwrap();

        let err = checkbox(&mut registry, owner, 10, 4, 4, "Sound", false, &font).unwrap_err();
        assert!(matches!(err, GuiError::DuplicateId(11)));
        let err = radio_group(&mut registry, owner, 9, 0, 0, &["A", "B", "C"], 0, &font)
            .unwrap_err();
        assert!(matches!(err, GuiError::DuplicateId(11)));
        assert!(checkbox(&mut registry, owner, 20, 4, 4, "Sound", false, &font).is_ok());
    }

    #[test]
    fn empty_radio_group_is_an_error() {
        let mut registry = Registry::new();
        let owner = window(&mut registry);
        let font = MonospaceFont::default();
        let err = radio_group(&mut registry, owner, 1, 0, 0, &[], 0, &font).unwrap_err();
        assert!(matches!(err, GuiError::EmptyRadioGroup));
    }

    #[test]
    fn radio_selection_is_exclusive() {
        let mut registry = Registry::new();
        let owner = window(&mut registry);
        let font = MonospaceFont::default();
        let members =
            radio_group(&mut registry, owner, 1, 0, 0, &["Low", "Mid", "High"], 0, &font).unwrap();
        assert_eq!(radio_selected(&registry, members[2]), Some(0));

        // A click on member 2 flips it before the widget sees the Up.
        registry.gadget_mut(members[2]).unwrap().set_selected(true);
        let events = on_up(&mut registry, members[2]);
        assert_eq!(
            events,
            vec![Notification::RadioChanged {
                gadget: members[0],
                selected: 2
            }]
        );
        assert_eq!(radio_selected(&registry, members[0]), Some(2));
        assert_eq!(registry.gadget(members[0]).unwrap().icon, Some(ICON_RADIO_OFF));

        // Clicking the current choice toggles it off; the group restores it and
        // still reports the index.
        registry.gadget_mut(members[2]).unwrap().set_selected(false);
        assert_eq!(
            on_up(&mut registry, members[2]),
            vec![Notification::RadioChanged {
                gadget: members[0],
                selected: 2
            }]
        );
        assert!(registry.gadget(members[2]).unwrap().is_selected());
        assert_eq!(radio_selected(&registry, members[1]), Some(2));

        set_radio_selected(&mut registry, members[0], 9).unwrap();
        assert_eq!(radio_selected(&registry, members[0]), Some(2));
    }

    #[test]
    fn slider_reports_level_changes_only() {
        let mut registry = Registry::new();
        let owner = window(&mut registry);
        let layout = LayoutBox::absolute(Rect::new(0, 0, 160, 10));
        let gadget = slider(&mut registry, owner, 5, layout, Axis::Horizontal, 16, 5).unwrap();
        assert_eq!(registry.gadget(gadget).unwrap().prop().unwrap().hpot, 21845);
        assert_eq!(on_moved(&mut registry, gadget), None);

        registry.gadget_mut(gadget).unwrap().prop_mut().unwrap().hpot = MAXPOT;
        assert_eq!(
            on_moved(&mut registry, gadget),
            Some(Notification::LevelChanged { gadget, level: 15 })
        );
        assert_eq!(slider_level(&registry, gadget), Some(15));

        set_slider_level(&mut registry, gadget, 99).unwrap();
        assert_eq!(slider_level(&registry, gadget), Some(15));
        set_slider_level(&mut registry, gadget, 0).unwrap();
        assert_eq!(registry.gadget(gadget).unwrap().prop().unwrap().hpot, 0);
    }

    #[test]
    fn scroller_tracks_top() {
        let mut registry = Registry::new();
        let owner = window(&mut registry);
        let layout = LayoutBox::absolute(Rect::new(0, 0, 10, 100));
        let gadget =
            scroller(&mut registry, owner, 6, layout, Axis::Vertical, 100, 10, 45).unwrap();
        assert_eq!(scroller_top(&registry, gadget), Some(45));
        set_scroller(&mut registry, gadget, 100, 10, 500).unwrap();
        assert_eq!(scroller_top(&registry, gadget), Some(90));
        assert!(matches!(
            set_slider_level(&mut registry, gadget, 1),
            Err(GuiError::KindMismatch { .. })
        ));
    }

    #[test]
    fn integer_field_submits_number() {
        let mut registry = Registry::new();
        let owner = window(&mut registry);
        let layout = LayoutBox::absolute(Rect::new(0, 0, 80, 10));
        let gadget = integer_field(&mut registry, owner, 7, layout, -42, 6).unwrap();
        assert_eq!(integer_value(&registry, gadget), Some(-42));
        assert_eq!(
            on_submit(&registry, gadget),
            Some(Notification::NumberChanged { gadget, value: -42 })
        );
    }
}
