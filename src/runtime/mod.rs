//! Input routing: hit-testing, hover and active chains, drags and notifications.

use std::sync::{Arc, Mutex};

use crossterm::event::{KeyCode, KeyModifiers, MouseButton};
use serde_json::json;

use crate::error::{GuiError, Result};
use crate::font::{Font, MonospaceFont};
use crate::gadget::{Activation, Gadget, GadgetFlags, InputFrame, Response, SystemGadget};
use crate::geometry::Point;
use crate::input::{InputEvent, InputKind};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::{MetricSnapshot, RouterMetrics};
use crate::registry::{GadgetId, Registry, WindowFlags, WindowId};
use crate::widgets;

pub mod drag;
pub mod focus;
mod notify;

pub use drag::{DragMode, DragState};
pub use focus::Chain;
pub use notify::{Element, Notification};

const TARGET: &str = "intui::router";

/// Configuration knobs for the input router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Optional structured logger used by the router.
    pub logger: Option<Logger>,
    /// Counters for routed events and emitted notifications.
    pub metrics: Option<Arc<Mutex<RouterMetrics>>>,
    /// Shortest knob a proportional gadget draws or hit-tests, in pixels.
    pub min_knob_size: i32,
    /// Pointer motion is frequent; it is only logged when this is set.
    pub log_pointer_moves: bool,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            min_knob_size: 4,
            log_pointer_moves: false,
            metrics_target: "intui::router.metrics".to_string(),
        }
    }
}

impl RouterConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(RouterMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<RouterMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Turns raw input events into gadget state changes and notifications.
///
/// The router holds no objects, only arena handles; every call receives the
/// registry it operates on. Handles that disappear between events are dropped
/// from the chains at the start of the next event.
pub struct InputRouter {
    config: RouterConfig,
    font: Box<dyn Font>,
    hover: Chain,
    active: Chain,
    held: bool,
    pressed: Option<GadgetId>,
    drag: Option<DragState>,
    outbox: Vec<Notification>,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(MonospaceFont::default())
    }
}

impl InputRouter {
    pub fn new(font: impl Font + 'static) -> Self {
        Self::with_config(font, RouterConfig::default())
    }

    pub fn with_config(font: impl Font + 'static, config: RouterConfig) -> Self {
        Self {
            config,
            font: Box::new(font),
            hover: Chain::default(),
            active: Chain::default(),
            held: false,
            pressed: None,
            drag: None,
            outbox: Vec::new(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RouterConfig {
        &mut self.config
    }

    pub fn font(&self) -> &dyn Font {
        &*self.font
    }

    pub fn hover(&self) -> Chain {
        self.hover
    }

    pub fn active(&self) -> Chain {
        self.active
    }

    /// Gadget receiving keyboard input.
    pub fn focused(&self) -> Option<GadgetId> {
        self.active.gadget
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// Notifications emitted since the last call, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending(&self) -> &[Notification] {
        &self.outbox
    }

    /// Route one event, setting `event.handled` when something consumed it.
    pub fn handle(&mut self, registry: &mut Registry, event: &mut InputEvent) {
        self.prune(registry);
        let emitted = self.outbox.len();
        let handled = match &event.kind {
            InputKind::PointerMove { x, y } => self.pointer_move(registry, Point::new(*x, *y)),
            InputKind::PointerDown {
                button: MouseButton::Left,
                x,
                y,
            } => self.pointer_down(registry, Point::new(*x, *y)),
            InputKind::PointerUp {
                button: MouseButton::Left,
                x,
                y,
            } => self.pointer_up(registry, Point::new(*x, *y)),
            InputKind::PointerDown { .. } | InputKind::PointerUp { .. } => false,
            InputKind::KeyDown { code, modifiers } => self.key_down(registry, *code, *modifiers),
            InputKind::KeyUp { code, modifiers } => self.key_up(registry, *code, *modifiers),
            InputKind::TextInput(text) => self.text_input(registry, text),
        };
        event.handled |= handled;

        let emitted = self.outbox.len() - emitted;
        self.record_metrics(handled, emitted);
        let is_move = matches!(event.kind, InputKind::PointerMove { .. });
        if !is_move || self.config.log_pointer_moves {
            self.log_router_event(
                LogLevel::Trace,
                "input_routed",
                [
                    json_kv("kind", json!(describe_input(&event.kind))),
                    json_kv("handled", json!(handled)),
                    json_kv("notifications", json!(emitted)),
                ],
            );
        }
    }

    /// Give keyboard focus to a gadget, activating its window.
    pub fn activate_gadget(&mut self, registry: &mut Registry, gadget: GadgetId) -> Result<()> {
        let window = registry
            .gadget(gadget)
            .map(|g| g.window())
            .ok_or(GuiError::GadgetNotFound)?;
        let screen = registry.window(window).map(|w| w.screen());
        self.activate_window(registry, Some(window));
        self.active.screen = screen;
        self.active.gadget = Some(gadget);
        Ok(())
    }

    /// Snapshot the metrics counters and log them, if both are configured.
    pub fn log_metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let snapshot = metrics.lock().ok()?.snapshot();
        if let Some(logger) = self.config.logger.as_ref() {
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
        Some(snapshot)
    }

    fn pointer_move(&mut self, registry: &mut Registry, point: Point) -> bool {
        if let Some(drag) = self.drag {
            return self.continue_drag(registry, drag, point);
        }
        let mut handled = self.update_hover(registry, point);
        if self.held {
            if let Some(gadget) = self.pressed {
                handled |= self.held_move(registry, gadget, point);
            }
        }
        handled
    }

    fn update_hover(&mut self, registry: &mut Registry, point: Point) -> bool {
        let next = Chain::from_hit(&registry.hit_test(point));
        let previous = self.hover;
        for element in previous.left_for(&next) {
            set_hover_flag(registry, element, false);
            self.emit(registry, Notification::HoverLeave(element));
        }
        for element in next.entered_from(&previous) {
            set_hover_flag(registry, element, true);
            self.emit(registry, Notification::HoverEnter(element));
        }
        self.hover = next;

        let Some(gadget) = next.gadget else {
            return false;
        };
        if !self.held {
            self.call_gadget(registry, gadget, point, |g, local, frame| {
                g.pointer_move(local, frame, false)
            });
        }
        true
    }

    fn held_move(&mut self, registry: &mut Registry, gadget: GadgetId, point: Point) -> bool {
        let response = self.call_gadget(registry, gadget, point, |g, local, frame| {
            g.pointer_move(local, frame, true)
        });
        if response == Some(Response::Moved) {
            self.knob_moved(registry, gadget);
        }
        response.is_some()
    }

    fn continue_drag(&mut self, registry: &mut Registry, drag: DragState, point: Point) -> bool {
        let Some(current) = registry.window_bounds(drag.window) else {
            self.drag = None;
            return false;
        };
        let (dx, dy) = drag.delta(point, current);
        let result = match drag.mode {
            DragMode::Move => registry.move_window_by(drag.window, dx, dy),
            DragMode::Size => registry.resize_window_by(drag.window, dx, dy),
        };
        result.is_ok()
    }

    fn pointer_down(&mut self, registry: &mut Registry, point: Point) -> bool {
        let hit = registry.hit_test(point);
        self.held = true;
        self.activate_window(registry, hit.window);
        self.active.screen = hit.screen;
        self.active.gadget = hit.gadget;

        let Some(gadget) = hit.gadget else {
            return hit.window.is_some();
        };
        let response = self
            .call_gadget(registry, gadget, point, |g, local, frame| {
                g.pointer_down(local, frame)
            })
            .unwrap_or(Response::Ignored);
        if !response.is_handled() {
            return true;
        }
        self.pressed = Some(gadget);

        let system = registry.gadget(gadget).and_then(|g| g.system());
        match system {
            Some(kind @ (SystemGadget::Drag | SystemGadget::Size)) => {
                if let Some(window) = hit.window {
                    self.begin_drag(registry, window, gadget, kind, point);
                }
            }
            Some(_) => {}
            None => match response {
                Response::Down => {
                    if let Some(id) = registry.gadget(gadget).map(|g| g.id()) {
                        self.emit(registry, Notification::GadgetDown { gadget, id });
                    }
                }
                Response::Moved => self.knob_moved(registry, gadget),
                _ => {}
            },
        }
        true
    }

    fn begin_drag(
        &mut self,
        registry: &Registry,
        window: WindowId,
        gadget: GadgetId,
        kind: SystemGadget,
        point: Point,
    ) {
        let Some(bounds) = registry.window_bounds(window) else {
            return;
        };
        let mode = if kind == SystemGadget::Size {
            DragMode::Size
        } else {
            DragMode::Move
        };
        self.drag = Some(DragState::new(window, gadget, mode, point, bounds));
        self.log_router_event(
            LogLevel::Debug,
            "drag_started",
            [json_kv("mode", json!(format!("{mode:?}").to_lowercase()))],
        );
    }

    fn pointer_up(&mut self, registry: &mut Registry, point: Point) -> bool {
        self.held = false;
        if let Some(drag) = self.drag.take() {
            self.call_gadget(registry, drag.gadget, point, |g, local, frame| {
                g.pointer_up(local, frame)
            });
            self.pressed = None;
            self.finish_drag(registry, drag);
            return true;
        }
        let Some(gadget) = self.pressed.take() else {
            return false;
        };
        let response = self.call_gadget(registry, gadget, point, |g, local, frame| {
            g.pointer_up(local, frame)
        });
        if response == Some(Response::Up) {
            self.complete_up(registry, gadget);
        }
        true
    }

    fn finish_drag(&mut self, registry: &mut Registry, drag: DragState) {
        let Some(bounds) = registry.window_bounds(drag.window) else {
            return;
        };
        let window = drag.window;
        let notification = match drag.mode {
            DragMode::Move => {
                self.with_metrics(|m| m.record_drag());
                Notification::WindowMoved { window, bounds }
            }
            DragMode::Size => {
                self.with_metrics(|m| m.record_resize());
                Notification::WindowResized { window, bounds }
            }
        };
        self.log_router_event(
            LogLevel::Debug,
            "drag_finished",
            [
                json_kv("x", json!(bounds.x)),
                json_kv("y", json!(bounds.y)),
                json_kv("width", json!(bounds.width)),
                json_kv("height", json!(bounds.height)),
            ],
        );
        self.emit(registry, notification);
    }

    /// A click (or Enter) completed on `gadget`.
    fn complete_up(&mut self, registry: &mut Registry, gadget: GadgetId) {
        let Some((id, system, window)) = registry
            .gadget(gadget)
            .map(|g| (g.id(), g.system(), g.window()))
        else {
            return;
        };
        match system {
            Some(SystemGadget::Close) => self.emit(registry, Notification::CloseRequested(window)),
            Some(SystemGadget::Depth) => {
                if registry.cycle_depth(window).is_ok() {
                    self.emit(registry, Notification::WindowDepth(window));
                }
            }
            Some(SystemGadget::Zoom) => {
                if let Ok(true) = registry.toggle_zoom(window) {
                    let zoomed = registry
                        .window(window)
                        .is_some_and(|w| w.flags.contains(WindowFlags::ZOOMED));
                    self.emit(registry, Notification::WindowZoomed { window, zoomed });
                }
            }
            Some(SystemGadget::Drag | SystemGadget::Size) => {}
            None => {
                self.emit(registry, Notification::GadgetUp { gadget, id });
                for notification in widgets::on_up(registry, gadget) {
                    self.emit(registry, notification);
                }
            }
        }
    }

    fn knob_moved(&mut self, registry: &mut Registry, gadget: GadgetId) {
        let Some((id, follow)) = registry
            .gadget(gadget)
            .map(|g| (g.id(), g.activation.contains(Activation::FOLLOW_MOUSE)))
        else {
            return;
        };
        if follow {
            self.emit(registry, Notification::GadgetMove { gadget, id });
        }
        if let Some(notification) = widgets::on_moved(registry, gadget) {
            self.emit(registry, notification);
        }
    }

    fn key_down(
        &mut self,
        registry: &mut Registry,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> bool {
        let Some(gadget) = self.keyboard_target(registry) else {
            return false;
        };
        let response = self
            .call_gadget(registry, gadget, Point::default(), |g, _, frame| {
                g.key_down(code, modifiers, frame)
            })
            .unwrap_or(Response::Ignored);
        match response {
            Response::Navigate(direction) => {
                if let Some(next) = registry.next_focusable(gadget, direction) {
                    self.active.gadget = Some(next);
                }
                true
            }
            Response::Up => {
                self.key_activate(registry, gadget);
                true
            }
            Response::Edited => {
                self.text_changed(registry, gadget);
                true
            }
            other => other.is_handled(),
        }
    }

    /// Enter on the focused gadget: string gadgets raise Up then submit, others click.
    fn key_activate(&mut self, registry: &mut Registry, gadget: GadgetId) {
        let Some(target) = registry.gadget_mut(gadget) else {
            return;
        };
        let id = target.id();
        if target.string().is_some() {
            self.emit(registry, Notification::GadgetUp { gadget, id });
            self.emit(registry, Notification::Submitted { gadget, id });
            if let Some(notification) = widgets::on_submit(registry, gadget) {
                self.emit(registry, notification);
            }
            return;
        }
        if target.activation.contains(Activation::TOGGLE_SELECT) {
            target.deselect();
        }
        self.complete_up(registry, gadget);
    }

    fn key_up(&mut self, registry: &mut Registry, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let Some(gadget) = self.keyboard_target(registry) else {
            return false;
        };
        registry
            .gadget_mut(gadget)
            .is_some_and(|g| g.key_up(code, modifiers).is_handled())
    }

    fn text_input(&mut self, registry: &mut Registry, text: &str) -> bool {
        let Some(gadget) = self.keyboard_target(registry) else {
            return false;
        };
        let response = self
            .call_gadget(registry, gadget, Point::default(), |g, _, frame| {
                g.text_input(text, frame)
            })
            .unwrap_or(Response::Ignored);
        if response == Response::Edited {
            self.text_changed(registry, gadget);
        }
        response.is_handled()
    }

    fn text_changed(&mut self, registry: &mut Registry, gadget: GadgetId) {
        if let Some(id) = registry.gadget(gadget).map(|g| g.id()) {
            self.emit(registry, Notification::TextChanged { gadget, id });
        }
    }

    fn keyboard_target(&self, registry: &Registry) -> Option<GadgetId> {
        self.active.gadget.filter(|g| !registry.is_blocked(*g))
    }

    fn activate_window(&mut self, registry: &mut Registry, window: Option<WindowId>) {
        if self.active.window == window {
            return;
        }
        if let Some(old) = self.active.window {
            if let Some(win) = registry.window_mut(old) {
                win.flags.remove(WindowFlags::ACTIVE);
                self.emit(registry, Notification::WindowDeactivated(old));
            }
        }
        if let Some(new) = window {
            if let Some(win) = registry.window_mut(new) {
                win.flags.insert(WindowFlags::ACTIVE);
                self.emit(registry, Notification::WindowActivated(new));
            }
        }
        self.active.window = window;
        self.active.gadget = None;
    }

    /// Run one gadget input call with its owner-local pointer and frame.
    fn call_gadget<R>(
        &self,
        registry: &mut Registry,
        gadget: GadgetId,
        point: Point,
        call: impl FnOnce(&mut Gadget, Point, InputFrame<'_>) -> R,
    ) -> Option<R> {
        let bounds = registry.gadget_bounds(gadget)?;
        let local = registry.to_owner_space(gadget, point)?;
        let frame = InputFrame {
            bounds,
            font: &*self.font,
            min_knob: self.config.min_knob_size,
        };
        let target = registry.gadget_mut(gadget)?;
        Some(call(target, local, frame))
    }

    fn emit(&mut self, registry: &mut Registry, notification: Notification) {
        if let Some(gadget) = notification.gadget().and_then(|g| registry.gadget_mut(g)) {
            gadget.notify(&notification);
        }
        let level = match notification {
            Notification::HoverEnter(_) | Notification::HoverLeave(_) => LogLevel::Trace,
            _ => LogLevel::Debug,
        };
        self.log_router_event(
            level,
            "notification",
            [json_kv("kind", json!(notification.name()))],
        );
        self.outbox.push(notification);
    }

    fn prune(&mut self, registry: &Registry) {
        self.hover.prune(registry);
        self.active.prune(registry);
        if self.pressed.is_some_and(|g| registry.gadget(g).is_none()) {
            self.pressed = None;
        }
        if self.drag.is_some_and(|d| registry.window(d.window).is_none()) {
            self.drag = None;
        }
    }

    fn record_metrics(&self, handled: bool, notifications: usize) {
        self.with_metrics(|m| {
            m.record_event(handled);
            m.record_notifications(notifications);
        });
    }

    fn with_metrics(&self, update: impl FnOnce(&mut RouterMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut guard);
            }
        }
    }

    fn log_router_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

fn set_hover_flag(registry: &mut Registry, element: Element, on: bool) {
    match element {
        Element::Gadget(id) => {
            if let Some(gadget) = registry.gadget_mut(id) {
                gadget.flags.set(GadgetFlags::HOVER, on);
                if !on {
                    if let Some(state) = gadget.prop_mut() {
                        state.knob_hover = false;
                    }
                }
            }
        }
        Element::Window(id) => {
            if let Some(window) = registry.window_mut(id) {
                window.flags.set(WindowFlags::HOVER, on);
            }
        }
        Element::Screen(_) => {}
    }
}

fn describe_input(kind: &InputKind) -> &'static str {
    match kind {
        InputKind::PointerMove { .. } => "pointer_move",
        InputKind::PointerDown { .. } => "pointer_down",
        InputKind::PointerUp { .. } => "pointer_up",
        InputKind::KeyDown { .. } => "key_down",
        InputKind::KeyUp { .. } => "key_up",
        InputKind::TextInput(_) => "text_input",
    }
}
