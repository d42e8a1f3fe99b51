use bitflags::bitflags;
use serde_json::json;
use slotmap::{SlotMap, new_key_type};

use crate::error::{GuiError, Result};
use crate::gadget::{Activation, Gadget, NewGadget, Owner, SystemGadget};
use crate::geometry::{Insets, Point, Rect, Size};
use crate::layout::{Coord, LayoutBox};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};

new_key_type! {
    /// Handle to a screen in the registry arena.
    pub struct ScreenId;
    /// Handle to a window; stays valid until the window is closed.
    pub struct WindowId;
    /// Handle to a requester.
    pub struct RequesterId;
    /// Handle to a gadget.
    pub struct GadgetId;
}

bitflags! {
    /// Window decoration and state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
    pub struct WindowFlags: u16 {
        const BORDERLESS = 1 << 0;
        /// Kept behind every non-backdrop window.
        const BACKDROP = 1 << 1;
        const ACTIVE = 1 << 2;
        const HOVER = 1 << 3;
        const SIZE_GADGET = 1 << 4;
        const DRAG_BAR = 1 << 5;
        const DEPTH_GADGET = 1 << 6;
        const ZOOM_GADGET = 1 << 7;
        const CLOSE_GADGET = 1 << 8;
        const ZOOMED = 1 << 9;
    }
}

impl WindowFlags {
    const TITLE_BAR: Self = Self::DRAG_BAR
        .union(Self::DEPTH_GADGET)
        .union(Self::ZOOM_GADGET)
        .union(Self::CLOSE_GADGET);
}

/// Border and system gadget dimensions used when a window is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorMetrics {
    pub side: i32,
    pub bottom: i32,
    pub title_height: i32,
    pub gadget_width: i32,
}

impl Default for DecorMetrics {
    fn default() -> Self {
        Self {
            side: 4,
            bottom: 2,
            title_height: 11,
            gadget_width: 18,
        }
    }
}

impl DecorMetrics {
    fn insets(&self, flags: WindowFlags, titled: bool) -> Insets {
        if flags.contains(WindowFlags::BORDERLESS) {
            return Insets::ZERO;
        }
        let top = if titled || flags.intersects(WindowFlags::TITLE_BAR) {
            self.title_height
        } else {
            self.side
        };
        let bottom = if flags.contains(WindowFlags::SIZE_GADGET) {
            self.title_height
        } else {
            self.bottom
        };
        Insets::new(self.side, top, self.side, bottom)
    }
}

/// Construction parameters for [`Registry::open_screen`].
#[derive(Debug, Clone)]
pub struct NewScreen {
    pub size: Size,
    pub title: Option<String>,
}

impl NewScreen {
    pub fn new(size: Size) -> Self {
        Self { size, title: None }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Construction parameters for [`Registry::open_window`].
#[derive(Debug, Clone)]
pub struct NewWindow {
    pub rect: Rect,
    pub title: Option<String>,
    pub flags: WindowFlags,
    pub min_size: Size,
    pub zoom: Option<Rect>,
    pub decor: DecorMetrics,
}

impl NewWindow {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            title: None,
            flags: WindowFlags::DRAG_BAR | WindowFlags::DEPTH_GADGET | WindowFlags::CLOSE_GADGET,
            min_size: Size::new(40, 24),
            zoom: None,
            decor: DecorMetrics::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replace the decoration/state flags wholesale.
    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_min_size(mut self, min_size: Size) -> Self {
        self.min_size = min_size;
        self
    }

    /// Alternate bounds the zoom gadget swaps in.
    pub fn with_zoom(mut self, zoom: Rect) -> Self {
        self.zoom = Some(zoom);
        self.flags.insert(WindowFlags::ZOOM_GADGET);
        self
    }

    pub fn sizable(mut self) -> Self {
        self.flags.insert(WindowFlags::SIZE_GADGET);
        self
    }

    pub fn borderless(mut self) -> Self {
        self.flags.insert(WindowFlags::BORDERLESS);
        self
    }

    pub fn backdrop(mut self) -> Self {
        self.flags.insert(WindowFlags::BACKDROP);
        self
    }

    pub fn with_decor(mut self, decor: DecorMetrics) -> Self {
        self.decor = decor;
        self
    }
}

/// Construction parameters for [`Registry::open_requester`].
#[derive(Debug, Clone)]
pub struct NewRequester {
    pub layout: LayoutBox,
}

impl NewRequester {
    pub fn new(layout: LayoutBox) -> Self {
        Self { layout }
    }
}

/// Top-level viewport owning z-ordered windows.
#[derive(Debug)]
pub struct Screen {
    layout: LayoutBox,
    pub title: Option<String>,
    pub(crate) windows: Vec<WindowId>,
}

impl Screen {
    pub fn bounds(&self) -> Rect {
        self.layout.bounds(Rect::default())
    }

    /// Windows back to front.
    pub fn windows(&self) -> &[WindowId] {
        &self.windows
    }
}

/// A z-ordered container of gadgets inside a screen.
#[derive(Debug)]
pub struct Window {
    screen: ScreenId,
    pub(crate) layout: LayoutBox,
    pub title: Option<String>,
    pub flags: WindowFlags,
    pub(crate) gadgets: Vec<GadgetId>,
    pub(crate) requesters: Vec<RequesterId>,
    pub(crate) zoom_rect: Option<Rect>,
}

impl Window {
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub fn layout(&self) -> &LayoutBox {
        &self.layout
    }

    /// Gadgets back to front, system gadgets first.
    pub fn gadgets(&self) -> &[GadgetId] {
        &self.gadgets
    }

    pub fn requesters(&self) -> &[RequesterId] {
        &self.requesters
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(WindowFlags::ACTIVE)
    }

    pub fn is_backdrop(&self) -> bool {
        self.flags.contains(WindowFlags::BACKDROP)
    }

    pub fn zoom_rect(&self) -> Option<Rect> {
        self.zoom_rect
    }
}

/// Modal gadget container scoped to one window.
#[derive(Debug)]
pub struct Requester {
    window: WindowId,
    pub(crate) layout: LayoutBox,
    pub(crate) gadgets: Vec<GadgetId>,
}

impl Requester {
    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn layout(&self) -> &LayoutBox {
        &self.layout
    }

    pub fn gadgets(&self) -> &[GadgetId] {
        &self.gadgets
    }
}

/// Arena owning every screen, window, requester and gadget.
///
/// Objects are only created through the factory methods, which register them in
/// their owner's ordered list immediately. Closing a container closes its children
/// first.
#[derive(Default)]
pub struct Registry {
    pub(crate) screens: SlotMap<ScreenId, Screen>,
    pub(crate) screen_order: Vec<ScreenId>,
    pub(crate) windows: SlotMap<WindowId, Window>,
    pub(crate) requesters: SlotMap<RequesterId, Requester>,
    pub(crate) gadgets: SlotMap<GadgetId, Gadget>,
    logger: Option<Logger>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(logger: Logger) -> Self {
        Self {
            logger: Some(logger),
            ..Self::default()
        }
    }

    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.get(id)
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(id)
    }

    pub fn requester(&self, id: RequesterId) -> Option<&Requester> {
        self.requesters.get(id)
    }

    pub fn gadget(&self, id: GadgetId) -> Option<&Gadget> {
        self.gadgets.get(id)
    }

    pub fn gadget_mut(&mut self, id: GadgetId) -> Option<&mut Gadget> {
        self.gadgets.get_mut(id)
    }

    /// Screens back to front.
    pub fn screens(&self) -> &[ScreenId] {
        &self.screen_order
    }

    pub fn gadget_ids(&self) -> impl Iterator<Item = GadgetId> + '_ {
        self.gadgets.keys()
    }

    /// Gadget list of a window or requester, back to front.
    pub fn owner_gadgets(&self, owner: Owner) -> Option<&[GadgetId]> {
        match owner {
            Owner::Window(id) => self.windows.get(id).map(|w| w.gadgets.as_slice()),
            Owner::Requester(id) => self.requesters.get(id).map(|r| r.gadgets.as_slice()),
        }
    }

    pub(crate) fn owner_gadgets_mut(&mut self, owner: Owner) -> Option<&mut Vec<GadgetId>> {
        match owner {
            Owner::Window(id) => self.windows.get_mut(id).map(|w| &mut w.gadgets),
            Owner::Requester(id) => self.requesters.get_mut(id).map(|r| &mut r.gadgets),
        }
    }

    /// Find a gadget by its numeric id inside one window (requesters included).
    pub fn find_gadget(&self, window: WindowId, id: i32) -> Option<GadgetId> {
        self.gadgets
            .iter()
            .find(|(_, gadget)| gadget.window() == window && gadget.id() == id)
            .map(|(key, _)| key)
    }

    pub fn system_gadget(&self, window: WindowId, kind: SystemGadget) -> Option<GadgetId> {
        self.find_gadget(window, kind.id())
    }

    pub fn open_screen(&mut self, new: NewScreen) -> ScreenId {
        let layout = LayoutBox::absolute(Rect::from_size(new.size));
        let id = self.screens.insert(Screen {
            layout,
            title: new.title,
            windows: Vec::new(),
        });
        self.screen_order.push(id);
        self.log(
            LogLevel::Debug,
            "screen_opened",
            [
                json_kv("width", json!(new.size.width)),
                json_kv("height", json!(new.size.height)),
            ],
        );
        id
    }

    /// Resize a screen's viewport. Windows re-resolve lazily on the next query.
    pub fn resize_screen(&mut self, id: ScreenId, size: Size) -> Result<()> {
        let screen = self.screens.get_mut(id).ok_or(GuiError::ScreenNotFound)?;
        screen.layout.set_absolute(Rect::from_size(size));
        Ok(())
    }

    pub fn open_window(&mut self, screen: ScreenId, new: NewWindow) -> Result<WindowId> {
        if !self.screens.contains_key(screen) {
            return Err(GuiError::ScreenNotFound);
        }
        let border = new.decor.insets(new.flags, new.title.is_some());
        let layout = LayoutBox::absolute(new.rect)
            .with_border(border)
            .with_min_size(new.min_size);
        let flags = new.flags - (WindowFlags::ACTIVE | WindowFlags::HOVER | WindowFlags::ZOOMED);
        let id = self.windows.insert(Window {
            screen,
            layout,
            title: new.title,
            flags,
            gadgets: Vec::new(),
            requesters: Vec::new(),
            zoom_rect: new.zoom,
        });

        let backdrops = self.backdrop_count(screen);
        if let Some(screen) = self.screens.get_mut(screen) {
            if flags.contains(WindowFlags::BACKDROP) {
                screen.windows.insert(backdrops, id);
            } else {
                screen.windows.push(id);
            }
        }

        self.install_system_gadgets(id, flags, &new.decor)?;
        self.log(
            LogLevel::Debug,
            "window_opened",
            [
                json_kv("x", json!(new.rect.x)),
                json_kv("y", json!(new.rect.y)),
                json_kv("width", json!(new.rect.width)),
                json_kv("height", json!(new.rect.height)),
            ],
        );
        Ok(id)
    }

    fn install_system_gadgets(
        &mut self,
        window: WindowId,
        flags: WindowFlags,
        decor: &DecorMetrics,
    ) -> Result<()> {
        let gw = decor.gadget_width;
        let th = decor.title_height;
        let owner = Owner::Window(window);
        let top_border = Activation::TOP_BORDER | Activation::REL_VERIFY;

        let left_reserved = if flags.contains(WindowFlags::CLOSE_GADGET) {
            gw
        } else {
            0
        };
        let right_count = [WindowFlags::DEPTH_GADGET, WindowFlags::ZOOM_GADGET]
            .into_iter()
            .filter(|flag| flags.contains(*flag))
            .count() as i32;

        if flags.contains(WindowFlags::DRAG_BAR) {
            let layout = LayoutBox::new(
                Coord::Absolute(left_reserved),
                Coord::Absolute(0),
                Coord::RelativeToParent(-(left_reserved + right_count * gw)),
                Coord::Absolute(th),
            );
            self.add_gadget(
                owner,
                NewGadget::boolean(SystemGadget::Drag.id(), layout)
                    .with_activation(Activation::IMMEDIATE | Activation::TOP_BORDER),
            )?;
        }
        if flags.contains(WindowFlags::CLOSE_GADGET) {
            let layout = LayoutBox::absolute(Rect::new(0, 0, gw, th));
            self.add_gadget(
                owner,
                NewGadget::boolean(SystemGadget::Close.id(), layout).with_activation(top_border),
            )?;
        }
        let mut right = 0;
        for (flag, kind) in [
            (WindowFlags::DEPTH_GADGET, SystemGadget::Depth),
            (WindowFlags::ZOOM_GADGET, SystemGadget::Zoom),
        ] {
            if !flags.contains(flag) {
                continue;
            }
            right += gw;
            let layout = LayoutBox::new(
                Coord::RelativeToParent(-right),
                Coord::Absolute(0),
                Coord::Absolute(gw),
                Coord::Absolute(th),
            );
            self.add_gadget(
                owner,
                NewGadget::boolean(kind.id(), layout).with_activation(top_border),
            )?;
        }
        if flags.contains(WindowFlags::SIZE_GADGET) {
            let layout = LayoutBox::new(
                Coord::RelativeToParent(-gw),
                Coord::RelativeToParent(-th),
                Coord::Absolute(gw),
                Coord::Absolute(th),
            );
            self.add_gadget(
                owner,
                NewGadget::boolean(SystemGadget::Size.id(), layout).with_activation(
                    Activation::IMMEDIATE | Activation::RIGHT_BORDER | Activation::BOTTOM_BORDER,
                ),
            )?;
        }
        Ok(())
    }

    pub fn open_requester(&mut self, window: WindowId, new: NewRequester) -> Result<RequesterId> {
        let id = self.requesters.insert(Requester {
            window,
            layout: new.layout,
            gadgets: Vec::new(),
        });
        match self.windows.get_mut(window) {
            Some(win) => {
                win.requesters.push(id);
                Ok(id)
            }
            None => {
                self.requesters.remove(id);
                Err(GuiError::WindowNotFound)
            }
        }
    }

    /// Create a gadget inside `owner`, appending it as the topmost child.
    ///
    /// A linked label must already live in the same container.
    pub fn add_gadget(&mut self, owner: Owner, new: NewGadget) -> Result<GadgetId> {
        let window = match owner {
            Owner::Window(id) => {
                if !self.windows.contains_key(id) {
                    return Err(GuiError::WindowNotFound);
                }
                id
            }
            Owner::Requester(id) => self
                .requesters
                .get(id)
                .map(|r| r.window)
                .ok_or(GuiError::RequesterNotFound)?,
        };
        if let Some(label) = new.label {
            let label_owner = self
                .gadgets
                .get(label)
                .map(|g| g.owner())
                .ok_or(GuiError::GadgetNotFound)?;
            if label_owner != owner {
                return Err(GuiError::ForeignOwner(
                    "label gadget lives in another container".to_string(),
                ));
            }
        }

        let id = self.gadgets.insert(Gadget::from_new(new, owner, window));
        if let Some(list) = self.owner_gadgets_mut(owner) {
            list.push(id);
        }
        Ok(id)
    }

    /// Remove a single gadget from its container.
    pub fn remove_gadget(&mut self, id: GadgetId) -> Result<()> {
        let gadget = self.gadgets.remove(id).ok_or(GuiError::GadgetNotFound)?;
        if let Some(list) = self.owner_gadgets_mut(gadget.owner()) {
            list.retain(|g| *g != id);
        }
        Ok(())
    }

    pub fn close_requester(&mut self, id: RequesterId) -> Result<()> {
        let requester = self.requesters.remove(id).ok_or(GuiError::RequesterNotFound)?;
        for gadget in requester.gadgets {
            self.gadgets.remove(gadget);
        }
        if let Some(window) = self.windows.get_mut(requester.window) {
            window.requesters.retain(|r| *r != id);
        }
        Ok(())
    }

    pub fn close_window(&mut self, id: WindowId) -> Result<()> {
        let requesters = self
            .windows
            .get(id)
            .map(|w| w.requesters.clone())
            .ok_or(GuiError::WindowNotFound)?;
        for requester in requesters {
            self.close_requester(requester)?;
        }
        let window = self.windows.remove(id).ok_or(GuiError::WindowNotFound)?;
        for gadget in window.gadgets {
            self.gadgets.remove(gadget);
        }
        if let Some(screen) = self.screens.get_mut(window.screen) {
            screen.windows.retain(|w| *w != id);
        }
        self.log(
            LogLevel::Debug,
            "window_closed",
            std::iter::empty::<(String, serde_json::Value)>(),
        );
        Ok(())
    }

    pub fn close_screen(&mut self, id: ScreenId) -> Result<()> {
        let windows = self
            .screens
            .get(id)
            .map(|s| s.windows.clone())
            .ok_or(GuiError::ScreenNotFound)?;
        for window in windows {
            self.close_window(window)?;
        }
        self.screens.remove(id);
        self.screen_order.retain(|s| *s != id);
        self.log(
            LogLevel::Debug,
            "screen_closed",
            std::iter::empty::<(String, serde_json::Value)>(),
        );
        Ok(())
    }

    pub(crate) fn backdrop_count(&self, screen: ScreenId) -> usize {
        self.screens
            .get(screen)
            .map(|s| {
                s.windows
                    .iter()
                    .filter(|w| self.windows.get(**w).is_some_and(|w| w.is_backdrop()))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Window bounds in screen space.
    pub fn window_bounds(&self, id: WindowId) -> Option<Rect> {
        let window = self.windows.get(id)?;
        let screen = self.screens.get(window.screen)?;
        Some(window.layout.bounds(screen.bounds()))
    }

    /// Full and inner frames of a window in its own local space.
    fn window_frames(&self, id: WindowId) -> Option<(Rect, Rect)> {
        let bounds = self.window_bounds(id)?;
        let border = self.windows.get(id)?.layout.border();
        let full = Rect::from_size(bounds.size());
        Some((full, full.inset(border)))
    }

    /// Requester bounds in its window's local space.
    pub fn requester_bounds(&self, id: RequesterId) -> Option<Rect> {
        let requester = self.requesters.get(id)?;
        let (_, inner) = self.window_frames(requester.window)?;
        Some(requester.layout.bounds(inner))
    }

    fn owner_frames(&self, owner: Owner) -> Option<(Rect, Rect)> {
        match owner {
            Owner::Window(id) => self.window_frames(id),
            Owner::Requester(id) => {
                let bounds = self.requester_bounds(id)?;
                let border = self.requesters.get(id)?.layout.border();
                let full = Rect::from_size(bounds.size());
                Some((full, full.inset(border)))
            }
        }
    }

    /// Gadget bounds in its owner's local space.
    pub fn gadget_bounds(&self, id: GadgetId) -> Option<Rect> {
        let gadget = self.gadgets.get(id)?;
        let (full, inner) = self.owner_frames(gadget.owner())?;
        let parent = if gadget.activation.is_border_anchored() {
            full
        } else {
            inner
        };
        Some(gadget.layout().bounds(parent))
    }

    /// Screen-space origin of an owner's local coordinate space.
    pub fn owner_origin(&self, owner: Owner) -> Option<Point> {
        match owner {
            Owner::Window(id) => self.window_bounds(id).map(|b| b.origin()),
            Owner::Requester(id) => {
                let window = self.requesters.get(id)?.window;
                let win = self.window_bounds(window)?;
                let req = self.requester_bounds(id)?;
                Some(Point::new(win.x + req.x, win.y + req.y))
            }
        }
    }

    /// Gadget bounds in screen space, for renderers.
    pub fn absolute_bounds(&self, id: GadgetId) -> Option<Rect> {
        let gadget = self.gadgets.get(id)?;
        let origin = self.owner_origin(gadget.owner())?;
        self.gadget_bounds(id).map(|b| b.translate(origin.x, origin.y))
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            let event = event_with_fields(level, "intui::registry", message, fields);
            let _ = logger.log_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadget::GadgetType;

    fn desktop() -> (Registry, ScreenId) {
        let mut registry = Registry::new();
        let screen = registry.open_screen(NewScreen::new(Size::new(640, 480)));
        (registry, screen)
    }

    #[test]
    fn window_gets_requested_system_gadgets() {
        let (mut registry, screen) = desktop();
        let window = registry
            .open_window(
                screen,
                NewWindow::new(Rect::new(10, 10, 200, 100))
                    .with_zoom(Rect::new(0, 0, 640, 480))
                    .sizable(),
            )
            .unwrap();
        for kind in SystemGadget::ALL {
            let gadget = registry.system_gadget(window, kind).expect("system gadget");
            assert_eq!(registry.gadget(gadget).unwrap().gadget_type(), GadgetType::Bool);
        }
    }

    #[test]
    fn system_gadgets_sit_in_the_border() {
        let (mut registry, screen) = desktop();
        let window = registry
            .open_window(screen, NewWindow::new(Rect::new(10, 10, 200, 100)).sizable())
            .unwrap();
        let decor = DecorMetrics::default();
        let close = registry.system_gadget(window, SystemGadget::Close).unwrap();
        let depth = registry.system_gadget(window, SystemGadget::Depth).unwrap();
        let drag = registry.system_gadget(window, SystemGadget::Drag).unwrap();
        let size = registry.system_gadget(window, SystemGadget::Size).unwrap();
        assert_eq!(
            registry.gadget_bounds(close),
            Some(Rect::new(0, 0, decor.gadget_width, decor.title_height))
        );
        assert_eq!(
            registry.gadget_bounds(depth),
            Some(Rect::new(200 - decor.gadget_width, 0, decor.gadget_width, decor.title_height))
        );
        assert_eq!(
            registry.gadget_bounds(drag),
            Some(Rect::new(
                decor.gadget_width,
                0,
                200 - 2 * decor.gadget_width,
                decor.title_height
            ))
        );
        assert_eq!(
            registry.absolute_bounds(size),
            Some(Rect::new(
                10 + 200 - decor.gadget_width,
                10 + 100 - decor.title_height,
                decor.gadget_width,
                decor.title_height
            ))
        );
    }

    #[test]
    fn user_gadgets_resolve_against_inner_frame() {
        let (mut registry, screen) = desktop();
        let window = registry
            .open_window(screen, NewWindow::new(Rect::new(0, 0, 200, 100)).with_title("Prefs"))
            .unwrap();
        let gadget = registry
            .add_gadget(
                Owner::Window(window),
                NewGadget::boolean(1, LayoutBox::absolute(Rect::new(0, 0, 10, 10))),
            )
            .unwrap();
        let border = registry.window(window).unwrap().layout().border();
        assert_eq!(
            registry.gadget_bounds(gadget),
            Some(Rect::new(border.left, border.top, 10, 10))
        );
    }

    #[test]
    fn label_from_another_window_is_rejected() {
        let (mut registry, screen) = desktop();
        let a = registry.open_window(screen, NewWindow::new(Rect::new(0, 0, 100, 100))).unwrap();
        let b = registry.open_window(screen, NewWindow::new(Rect::new(0, 0, 100, 100))).unwrap();
        let label = registry
            .add_gadget(
                Owner::Window(a),
                NewGadget::boolean(1, LayoutBox::absolute(Rect::new(0, 0, 10, 10))),
            )
            .unwrap();
        let err = registry
            .add_gadget(
                Owner::Window(b),
                NewGadget::boolean(2, LayoutBox::absolute(Rect::new(0, 0, 10, 10)))
                    .with_label(label),
            )
            .unwrap_err();
        assert!(matches!(err, GuiError::ForeignOwner(_)));
    }

    #[test]
    fn closing_a_screen_cascades() {
        let (mut registry, screen) = desktop();
        let window = registry
            .open_window(screen, NewWindow::new(Rect::new(0, 0, 100, 80)))
            .unwrap();
        let requester = registry
            .open_requester(
                window,
                NewRequester::new(LayoutBox::absolute(Rect::new(0, 0, 50, 30))),
            )
            .unwrap();
        let inside = registry
            .add_gadget(
                Owner::Requester(requester),
                NewGadget::boolean(7, LayoutBox::absolute(Rect::new(0, 0, 10, 10))),
            )
            .unwrap();
        registry.close_screen(screen).unwrap();
        assert!(registry.window(window).is_none());
        assert!(registry.requester(requester).is_none());
        assert!(registry.gadget(inside).is_none());
        assert_eq!(registry.gadget_ids().count(), 0);
        assert!(registry.screens().is_empty());
    }

    #[test]
    fn requester_gadgets_know_their_window() {
        let (mut registry, screen) = desktop();
        let window = registry
            .open_window(screen, NewWindow::new(Rect::new(20, 30, 200, 150)))
            .unwrap();
        let requester = registry
            .open_requester(
                window,
                NewRequester::new(LayoutBox::absolute(Rect::new(10, 10, 100, 60))),
            )
            .unwrap();
        let ok = registry
            .add_gadget(
                Owner::Requester(requester),
                NewGadget::boolean(1, LayoutBox::absolute(Rect::new(5, 5, 20, 10))),
            )
            .unwrap();
        assert_eq!(registry.gadget(ok).unwrap().window(), window);
        let border = registry.window(window).unwrap().layout().border();
        assert_eq!(
            registry.absolute_bounds(ok),
            Some(Rect::new(20 + border.left + 10 + 5, 30 + border.top + 10 + 5, 20, 10))
        );
    }

    #[test]
    fn removing_a_gadget_unlinks_it() {
        let (mut registry, screen) = desktop();
        let window = registry
            .open_window(
                screen,
                NewWindow::new(Rect::new(0, 0, 100, 80)).with_flags(WindowFlags::empty()),
            )
            .unwrap();
        let gadget = registry
            .add_gadget(
                Owner::Window(window),
                NewGadget::boolean(1, LayoutBox::absolute(Rect::new(0, 0, 10, 10))),
            )
            .unwrap();
        registry.remove_gadget(gadget).unwrap();
        assert!(registry.window(window).unwrap().gadgets().is_empty());
        assert!(matches!(registry.remove_gadget(gadget), Err(GuiError::GadgetNotFound)));
    }
}
