use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::font::{Font, display_width};
use crate::gadget::{GadgetFlags, GadgetType, IconId, Owner, SystemGadget};
use crate::geometry::{Point, Rect, Size};
use crate::registry::{Registry, WindowId};
use crate::widgets::{ICON_CHECKBOX_OFF, ICON_CHECKBOX_ON, ICON_RADIO_OFF, ICON_RADIO_ON};

use super::visual::GadgetVisual;

/// Straight RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const GREY: Self = Self::rgb(170, 170, 170);
    pub const BLUE: Self = Self::rgb(0, 85, 170);
    pub const ORANGE: Self = Self::rgb(255, 136, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Linear blend; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Opaque texture handle owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextureId(pub u32);

/// 2D drawing backend. All coordinates are screen-space pixels.
pub trait Renderer {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()>;

    fn fill_vertical_gradient(&mut self, rect: Rect, top: Color, bottom: Color) -> Result<()>;

    fn outline_rect(&mut self, rect: Rect, color: Color) -> Result<()>;

    fn line(&mut self, from: Point, to: Point, color: Color) -> Result<()>;

    fn text(&mut self, origin: Point, text: &str, color: Color) -> Result<()>;

    fn icon(&mut self, rect: Rect, icon: IconId) -> Result<()>;

    fn texture(&mut self, rect: Rect, texture: TextureId) -> Result<()>;

    /// Restrict drawing to `rect` intersected with the current clip.
    fn push_clip(&mut self, rect: Rect);

    fn pop_clip(&mut self);

    fn measure_text(&self, text: &str) -> Size;
}

/// Renderer runtime parameters.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Pixel size of one terminal cell.
    pub cell: Size,
    pub restore_cursor: Option<(u16, u16)>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            cell: Size::new(8, 8),
            restore_cursor: None,
        }
    }
}

/// ANSI escape code renderer writing 24-bit color cells to a terminal handle.
///
/// Pixel coordinates are mapped onto the cell grid; a cell is drawn when its
/// top-left pixel lies inside the current clip.
pub struct AnsiRenderer<W: Write> {
    writer: W,
    settings: RendererSettings,
    clips: Vec<Rect>,
}

impl<W: Write> AnsiRenderer<W> {
    pub fn new(writer: W, settings: RendererSettings) -> Self {
        Self {
            writer,
            settings,
            clips: Vec::new(),
        }
    }

    pub fn with_default(writer: W) -> Self {
        Self::new(writer, RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Restore the cursor if configured and flush the writer.
    pub fn finish(&mut self) -> Result<()> {
        if let Some((row, col)) = self.settings.restore_cursor {
            write!(self.writer, "\x1b[{};{}H", row + 1, col + 1)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn cell_size(&self) -> (i32, i32) {
        (
            self.settings.cell.width.max(1),
            self.settings.cell.height.max(1),
        )
    }

    /// Cell range covered by a pixel rectangle, as (col, row, cols, rows).
    fn cells(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let (cw, ch) = self.cell_size();
        let col = rect.x.div_euclid(cw);
        let row = rect.y.div_euclid(ch);
        let right = (rect.right() + cw - 1).div_euclid(cw);
        let bottom = (rect.bottom() + ch - 1).div_euclid(ch);
        (col, row, (right - col).max(0), (bottom - row).max(0))
    }

    fn visible(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 {
            return false;
        }
        let (cw, ch) = self.cell_size();
        match self.clips.last() {
            Some(clip) => clip.contains(Point::new(col * cw, row * ch)),
            None => true,
        }
    }

    fn put(
        &mut self,
        col: i32,
        row: i32,
        glyph: char,
        fg: Option<Color>,
        bg: Option<Color>,
    ) -> Result<()> {
        if !self.visible(col, row) {
            return Ok(());
        }
        write!(self.writer, "\x1b[{};{}H", row + 1, col + 1)?;
        if let Some(c) = fg {
            write!(self.writer, "\x1b[38;2;{};{};{}m", c.r, c.g, c.b)?;
        }
        if let Some(c) = bg {
            write!(self.writer, "\x1b[48;2;{};{};{}m", c.r, c.g, c.b)?;
        }
        write!(self.writer, "{}\x1b[0m", glyph)?;
        Ok(())
    }

    fn fill_row(&mut self, col: i32, row: i32, cols: i32, color: Color) -> Result<()> {
        for offset in 0..cols {
            self.put(col + offset, row, ' ', None, Some(color))?;
        }
        Ok(())
    }
}

fn icon_glyphs(icon: IconId) -> &'static str {
    match icon {
        ICON_CHECKBOX_OFF => "[ ]",
        ICON_CHECKBOX_ON => "[x]",
        ICON_RADIO_OFF => "( )",
        ICON_RADIO_ON => "(*)",
        _ => "?",
    }
}

impl<W: Write> Renderer for AnsiRenderer<W> {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        let (col, row, cols, rows) = self.cells(rect);
        for line in 0..rows {
            self.fill_row(col, row + line, cols, color)?;
        }
        Ok(())
    }

    fn fill_vertical_gradient(&mut self, rect: Rect, top: Color, bottom: Color) -> Result<()> {
        let (col, row, cols, rows) = self.cells(rect);
        for line in 0..rows {
            let t = if rows > 1 {
                line as f32 / (rows - 1) as f32
            } else {
                0.0
            };
            self.fill_row(col, row + line, cols, top.lerp(bottom, t))?;
        }
        Ok(())
    }

    fn outline_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        let (col, row, cols, rows) = self.cells(rect);
        if cols == 0 || rows == 0 {
            return Ok(());
        }
        let right = col + cols - 1;
        let bottom = row + rows - 1;
        for x in col..=right {
            let (top_glyph, bottom_glyph) = if x == col {
                ('┌', '└')
            } else if x == right {
                ('┐', '┘')
            } else {
                ('─', '─')
            };
            self.put(x, row, top_glyph, Some(color), None)?;
            if bottom != row {
                self.put(x, bottom, bottom_glyph, Some(color), None)?;
            }
        }
        for y in row + 1..bottom {
            self.put(col, y, '│', Some(color), None)?;
            if right != col {
                self.put(right, y, '│', Some(color), None)?;
            }
        }
        Ok(())
    }

    fn line(&mut self, from: Point, to: Point, color: Color) -> Result<()> {
        let (cw, ch) = self.cell_size();
        let (mut x, mut y) = (from.x.div_euclid(cw), from.y.div_euclid(ch));
        let (x1, y1) = (to.x.div_euclid(cw), to.y.div_euclid(ch));
        let glyph = if y == y1 {
            '─'
        } else if x == x1 {
            '│'
        } else {
            '·'
        };
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x, y, glyph, Some(color), None)?;
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Ok(())
    }

    fn text(&mut self, origin: Point, text: &str, color: Color) -> Result<()> {
        let (cw, ch) = self.cell_size();
        let row = origin.y.div_euclid(ch);
        let mut col = origin.x.div_euclid(cw);
        let mut buf = [0u8; 4];
        for glyph in text.chars() {
            let cells = display_width(glyph.encode_utf8(&mut buf)) as i32;
            if cells == 0 {
                continue;
            }
            // Wide glyphs need both cells visible.
            if (0..cells).all(|offset| self.visible(col + offset, row)) {
                self.put(col, row, glyph, Some(color), None)?;
            }
            col += cells;
        }
        Ok(())
    }

    fn icon(&mut self, rect: Rect, icon: IconId) -> Result<()> {
        self.text(rect.origin(), icon_glyphs(icon), Color::WHITE)
    }

    fn texture(&mut self, rect: Rect, _texture: TextureId) -> Result<()> {
        let (col, row, cols, rows) = self.cells(rect);
        for line in 0..rows {
            for offset in 0..cols {
                self.put(col + offset, row + line, '░', Some(Color::GREY), None)?;
            }
        }
        Ok(())
    }

    fn push_clip(&mut self, rect: Rect) {
        let clip = match self.clips.last() {
            Some(current) => rect.intersection(current),
            None => rect,
        };
        self.clips.push(clip);
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn measure_text(&self, text: &str) -> Size {
        let (cw, ch) = self.cell_size();
        Size::new(display_width(text) as i32 * cw, ch)
    }
}

/// Draw the frontmost screen: windows back to front, each clipped to its bounds,
/// with its gadgets and then its requesters on top.
pub fn paint(
    registry: &Registry,
    renderer: &mut dyn Renderer,
    font: &dyn Font,
    min_knob: i32,
) -> Result<()> {
    let Some(screen) = registry.screens().last().and_then(|id| registry.screen(*id)) else {
        return Ok(());
    };
    renderer.fill_rect(screen.bounds(), Color::BLUE)?;
    if let Some(title) = &screen.title {
        renderer.text(Point::new(0, 0), title, Color::WHITE)?;
    }
    for window in screen.windows() {
        paint_window(registry, renderer, *window, font, min_knob)?;
    }
    Ok(())
}

fn paint_window(
    registry: &Registry,
    renderer: &mut dyn Renderer,
    window: WindowId,
    font: &dyn Font,
    min_knob: i32,
) -> Result<()> {
    let (Some(win), Some(bounds)) = (registry.window(window), registry.window_bounds(window))
    else {
        return Ok(());
    };
    renderer.push_clip(bounds);
    renderer.fill_rect(bounds, Color::GREY)?;
    let frame = if win.is_active() {
        Color::ORANGE
    } else {
        Color::WHITE
    };
    renderer.outline_rect(bounds, frame)?;
    for gadget in win.gadgets() {
        if let Some(visual) = GadgetVisual::capture(registry, *gadget, font, min_knob) {
            paint_gadget(renderer, &visual)?;
        }
    }
    if let Some(title) = &win.title {
        let origin = registry
            .system_gadget(window, SystemGadget::Drag)
            .and_then(|drag| registry.absolute_bounds(drag))
            .map(|rect| rect.origin())
            .unwrap_or(bounds.origin());
        renderer.text(origin, title, Color::BLACK)?;
    }
    for requester in win.requesters() {
        let Some(area) = registry.requester_bounds(*requester) else {
            continue;
        };
        let origin = registry
            .owner_origin(Owner::Requester(*requester))
            .unwrap_or(area.origin());
        let area = Rect::new(origin.x, origin.y, area.width, area.height);
        renderer.fill_rect(area, Color::GREY)?;
        renderer.outline_rect(area, Color::BLACK)?;
        for gadget in registry
            .owner_gadgets(Owner::Requester(*requester))
            .unwrap_or(&[])
        {
            if let Some(visual) = GadgetVisual::capture(registry, *gadget, font, min_knob) {
                paint_gadget(renderer, &visual)?;
            }
        }
    }
    renderer.pop_clip();
    Ok(())
}

fn paint_gadget(renderer: &mut dyn Renderer, visual: &GadgetVisual) -> Result<()> {
    if visual.id < 0 {
        return Ok(());
    }
    let selected = visual.flags.contains(GadgetFlags::SELECTED);
    match visual.kind {
        GadgetType::Bool => {
            if let Some(icon) = visual.icon {
                return renderer.icon(visual.bounds, icon);
            }
            if selected {
                renderer.fill_rect(visual.bounds, Color::BLUE)?;
            }
            if visual.text.is_some() && visual.bounds.height > renderer.measure_text("").height {
                renderer.outline_rect(visual.bounds, Color::BLACK)?;
            }
            if let Some(text) = &visual.text {
                renderer.text(visual.bounds.origin(), text, Color::BLACK)?;
            }
        }
        GadgetType::Prop => {
            renderer.outline_rect(visual.bounds, Color::BLACK)?;
            if let Some(knob) = visual.knob {
                renderer.fill_rect(knob, Color::BLUE)?;
            }
        }
        GadgetType::String => {
            renderer.fill_rect(visual.bounds, Color::WHITE)?;
            if let Some(edit) = &visual.edit {
                if let Some((start, end)) = edit.selection {
                    let band = Rect::new(start, visual.bounds.y, end - start, visual.bounds.height);
                    renderer.fill_rect(band, Color::ORANGE)?;
                }
                renderer.text(visual.bounds.origin(), &edit.visible, Color::BLACK)?;
                renderer.line(
                    Point::new(edit.cursor_x, visual.bounds.y),
                    Point::new(edit.cursor_x, visual.bounds.bottom() - 1),
                    Color::BLACK,
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::MonospaceFont;
    use crate::registry::{NewScreen, NewWindow};
    use crate::widgets;

    #[derive(Default)]
    struct Recorder {
        ops: Vec<String>,
        clips: Vec<Rect>,
    }

    impl Renderer for Recorder {
        fn fill_rect(&mut self, rect: Rect, _color: Color) -> Result<()> {
            self.ops.push(format!("fill {rect:?}"));
            Ok(())
        }
        fn fill_vertical_gradient(
            &mut self,
            rect: Rect,
            _top: Color,
            _bottom: Color,
        ) -> Result<()> {
            self.ops.push(format!("gradient {rect:?}"));
            Ok(())
        }
        fn outline_rect(&mut self, rect: Rect, _color: Color) -> Result<()> {
            self.ops.push(format!("outline {rect:?}"));
            Ok(())
        }
        fn line(&mut self, _from: Point, _to: Point, _color: Color) -> Result<()> {
            self.ops.push("line".into());
            Ok(())
        }
        fn text(&mut self, _origin: Point, text: &str, _color: Color) -> Result<()> {
            self.ops.push(format!("text {text}"));
            Ok(())
        }
        fn icon(&mut self, _rect: Rect, icon: IconId) -> Result<()> {
            self.ops.push(format!("icon {}", icon.0));
            Ok(())
        }
        fn texture(&mut self, _rect: Rect, _texture: TextureId) -> Result<()> {
            Ok(())
        }
        fn push_clip(&mut self, rect: Rect) {
            self.clips.push(rect);
        }
        fn pop_clip(&mut self) {
            self.clips.pop();
        }
        fn measure_text(&self, text: &str) -> Size {
            Size::new(text.chars().count() as i32 * 8, 8)
        }
    }

    #[test]
    fn paint_draws_window_title_and_checkbox_icon() {
        let font = MonospaceFont::default();
        let mut registry = Registry::new();
        let screen = registry.open_screen(NewScreen::new(Size::new(320, 200)));
        let window = registry
            .open_window(
                screen,
                NewWindow::new(Rect::new(10, 10, 200, 100)).with_title("Prefs"),
            )
            .unwrap();
        widgets::checkbox(&mut registry, Owner::Window(window), 1, 4, 4, "Sound", true, &font)
            .unwrap();

        let mut recorder = Recorder::default();
        paint(&registry, &mut recorder, &font, 4).unwrap();

        assert!(recorder.ops.contains(&"text Prefs".to_string()));
        assert!(recorder.ops.contains(&format!("icon {}", ICON_CHECKBOX_ON.0)));
        assert!(recorder.ops.contains(&"text Sound".to_string()));
        assert!(recorder.clips.is_empty());
    }

    #[test]
    fn ansi_renderer_clips_text_to_cells() {
        let mut renderer = AnsiRenderer::with_default(Vec::new());
        renderer.push_clip(Rect::new(8, 8, 16, 8));
        renderer
            .text(Point::new(0, 8), "abcd", Color::WHITE)
            .unwrap();
        renderer.pop_clip();
        renderer.finish().unwrap();

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(!output.contains('a'));
        assert!(output.contains("\x1b[2;2H"));
        assert!(output.contains('b'));
        assert!(output.contains('c'));
        assert!(!output.contains('d'));
    }

    #[test]
    fn ansi_outline_uses_box_drawing() {
        let mut renderer = AnsiRenderer::with_default(Vec::new());
        renderer
            .outline_rect(Rect::new(0, 0, 24, 24), Color::WHITE)
            .unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        for glyph in ['┌', '┐', '└', '┘', '│', '─'] {
            assert!(output.contains(glyph), "missing {glyph}");
        }
        assert_eq!(renderer_measure("ab"), Size::new(16, 8));
    }

    fn renderer_measure(text: &str) -> Size {
        AnsiRenderer::with_default(Vec::new()).measure_text(text)
    }
}
