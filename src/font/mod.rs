//! Font collaborator interface and a cell-based monospace implementation.
//!
//! String gadgets use glyph advances for click-to-cursor and display scrolling;
//! the widget factory uses text widths to size labels.

use unicode_width::UnicodeWidthChar;

/// Glyph metrics supplied by the rendering backend.
pub trait Font {
    /// Horizontal advance of a single glyph in pixels.
    fn advance(&self, ch: char) -> i32;

    fn line_height(&self) -> i32;

    fn text_width(&self, text: &str) -> i32 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }
}

/// Fixed-pitch font measured in terminal-style cells.
///
/// Wide glyphs occupy two cells and zero-width glyphs none, following the
/// Unicode display width of each character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceFont {
    pub cell_width: i32,
    pub line_height: i32,
}

impl Default for MonospaceFont {
    fn default() -> Self {
        Self {
            cell_width: 8,
            line_height: 8,
        }
    }
}

impl MonospaceFont {
    pub const fn new(cell_width: i32, line_height: i32) -> Self {
        Self {
            cell_width,
            line_height,
        }
    }
}

impl Font for MonospaceFont {
    fn advance(&self, ch: char) -> i32 {
        UnicodeWidthChar::width(ch).unwrap_or(0) as i32 * self.cell_width
    }

    fn line_height(&self) -> i32 {
        self.line_height
    }

    fn text_width(&self, text: &str) -> i32 {
        display_width(text) as i32 * self.cell_width
    }
}

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}
