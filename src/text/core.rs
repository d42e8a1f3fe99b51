use crossterm::event::{KeyCode, KeyModifiers};

use crate::font::Font;

/// What a key press did to a string gadget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Ignored,
    /// Cursor or selection moved; the buffer is unchanged.
    Moved,
    Changed,
}

/// Text buffer, cursor, selection and horizontal scroll of a string gadget.
///
/// Positions are character indices. The selection runs between the anchor and the
/// cursor, so `selection_start() <= selection_end()` always holds and both are
/// equal when nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct StringState {
    buffer: String,
    cursor: usize,
    anchor: usize,
    display_offset: usize,
    integer_only: bool,
    max_chars: Option<usize>,
}

impl StringState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.set_text(text);
        state
    }

    /// Integer-only field: accepts digits and a single leading sign.
    pub fn integer(value: i64) -> Self {
        let mut state = Self {
            integer_only: true,
            ..Self::default()
        };
        state.set_text(value.to_string());
        state
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection_start(&self) -> usize {
        self.anchor.min(self.cursor)
    }

    pub fn selection_end(&self) -> usize {
        self.anchor.max(self.cursor)
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.cursor
    }

    pub fn display_offset(&self) -> usize {
        self.display_offset
    }

    pub fn is_integer_only(&self) -> bool {
        self.integer_only
    }

    /// Parsed value of an integer field; `None` for empty or partial input.
    pub fn integer_value(&self) -> Option<i64> {
        self.buffer.parse().ok()
    }

    /// Replace the buffer, placing the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        if let Some(max) = self.max_chars {
            if self.len() > max {
                let end = char_to_byte(&self.buffer, max);
                self.buffer.truncate(end);
            }
        }
        self.cursor = self.len();
        self.anchor = self.cursor;
        self.display_offset = self.display_offset.min(self.cursor);
    }

    /// Collapse the selection onto the cursor.
    pub fn clear_selection(&mut self) {
        self.anchor = self.cursor;
    }

    pub fn select_all(&mut self) {
        self.anchor = 0;
        self.cursor = self.len();
    }

    /// Delete the selected text, if any. Returns true if a selection existed.
    pub fn delete_selection(&mut self) -> bool {
        if !self.has_selection() {
            return false;
        }
        let (start, end) = (self.selection_start(), self.selection_end());
        let lo = char_to_byte(&self.buffer, start);
        let hi = char_to_byte(&self.buffer, end);
        self.buffer.replace_range(lo..hi, "");
        self.cursor = start;
        self.anchor = start;
        self.clamp_offset();
        true
    }

    /// Insert text at the cursor, replacing the selection. Characters rejected by the
    /// integer filter, control characters, and anything past the length limit are
    /// dropped. Returns the number of characters inserted.
    pub fn insert_str(&mut self, text: &str) -> usize {
        let start = self.selection_start();
        let end = self.selection_end();
        let remaining = self.len() - (end - start);
        let tail_has_sign = self.integer_only && start == 0 && {
            let next = self.buffer.chars().nth(end);
            matches!(next, Some('+') | Some('-'))
        };

        let mut accepted = String::new();
        let mut count = 0usize;
        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            if let Some(max) = self.max_chars {
                if remaining + count >= max {
                    break;
                }
            }
            if self.integer_only {
                // Nothing may precede a leading sign.
                if tail_has_sign {
                    continue;
                }
                let at = start + count;
                let sign_ok = (ch == '-' || ch == '+') && at == 0;
                if !ch.is_ascii_digit() && !sign_ok {
                    continue;
                }
            }
            accepted.push(ch);
            count += 1;
        }

        if count == 0 {
            return 0;
        }
        self.delete_selection();
        let at = char_to_byte(&self.buffer, self.cursor);
        self.buffer.insert_str(at, &accepted);
        self.cursor += count;
        self.anchor = self.cursor;
        count
    }

    /// Backspace: delete the selection or the character before the cursor.
    pub fn delete_backward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.remove_at(self.cursor);
        true
    }

    /// Delete: delete the selection or the character under the cursor.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor >= self.len() {
            return false;
        }
        self.remove_at(self.cursor);
        true
    }

    fn remove_at(&mut self, index: usize) {
        let lo = char_to_byte(&self.buffer, index);
        let hi = char_to_byte(&self.buffer, index + 1);
        self.buffer.replace_range(lo..hi, "");
        self.anchor = self.cursor;
        self.clamp_offset();
    }

    pub fn move_left(&mut self, extend: bool) {
        if !extend && self.has_selection() {
            self.place(self.selection_start(), false);
            return;
        }
        self.place(self.cursor.saturating_sub(1), extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        if !extend && self.has_selection() {
            self.place(self.selection_end(), false);
            return;
        }
        self.place((self.cursor + 1).min(self.len()), extend);
    }

    pub fn move_home(&mut self, extend: bool) {
        self.place(0, extend);
    }

    pub fn move_end(&mut self, extend: bool) {
        self.place(self.len(), extend);
    }

    fn place(&mut self, cursor: usize, extend: bool) {
        self.cursor = cursor.min(self.len());
        if !extend {
            self.anchor = self.cursor;
        }
    }

    /// Character boundary nearest to `x`, measured from the left edge of the visible
    /// text (the glyph at `display_offset`).
    pub fn position_at(&self, x: i32, font: &dyn Font) -> usize {
        if x <= 0 {
            return self.display_offset;
        }
        let mut edge = 0;
        for (index, ch) in self.buffer.chars().enumerate().skip(self.display_offset) {
            let advance = font.advance(ch);
            if edge + advance > x {
                return if (x - edge) * 2 < advance {
                    index
                } else {
                    index + 1
                };
            }
            edge += advance;
        }
        self.len()
    }

    /// Place the cursor from a pointer click, collapsing the selection.
    pub fn click_at(&mut self, x: i32, font: &dyn Font) {
        let position = self.position_at(x, font);
        self.place(position, false);
    }

    /// Extend the selection to a dragged pointer position.
    pub fn drag_to(&mut self, x: i32, font: &dyn Font) -> bool {
        let position = self.position_at(x, font);
        if position == self.cursor {
            return false;
        }
        self.place(position, true);
        true
    }

    /// Adjust the display offset so the cursor glyph fits in `visible_width`.
    pub fn scroll_to_cursor(&mut self, font: &dyn Font, visible_width: i32) {
        self.clamp_offset();
        if self.cursor < self.display_offset {
            self.display_offset = self.cursor;
            return;
        }
        let chars: Vec<char> = self.buffer.chars().collect();
        let cursor_glyph = font.advance(chars.get(self.cursor).copied().unwrap_or(' '));
        let mut span: i32 = chars[self.display_offset..self.cursor]
            .iter()
            .map(|ch| font.advance(*ch))
            .sum::<i32>()
            + cursor_glyph;
        while span > visible_width && self.display_offset < self.cursor {
            span -= font.advance(chars[self.display_offset]);
            self.display_offset += 1;
        }
    }

    fn clamp_offset(&mut self) {
        self.display_offset = self.display_offset.min(self.len());
    }

    /// Editing keys. Tab and Enter are handled by the owning gadget first.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> TextEdit {
        let extend = modifiers.contains(KeyModifiers::SHIFT);
        match code {
            KeyCode::Left => {
                self.move_left(extend);
                TextEdit::Moved
            }
            KeyCode::Right => {
                self.move_right(extend);
                TextEdit::Moved
            }
            KeyCode::Home => {
                self.move_home(extend);
                TextEdit::Moved
            }
            KeyCode::End => {
                self.move_end(extend);
                TextEdit::Moved
            }
            KeyCode::Backspace => edited(self.delete_backward()),
            KeyCode::Delete => edited(self.delete_forward()),
            KeyCode::Char('a') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.select_all();
                TextEdit::Moved
            }
            KeyCode::Char('x') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.set_text("");
                TextEdit::Changed
            }
            _ => TextEdit::Ignored,
        }
    }
}

fn edited(changed: bool) -> TextEdit {
    if changed {
        TextEdit::Changed
    } else {
        TextEdit::Moved
    }
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::MonospaceFont;

    fn font() -> MonospaceFont {
        MonospaceFont::new(8, 8)
    }

    fn assert_invariants(state: &StringState) {
        let len = state.len();
        assert!(state.selection_start() <= state.selection_end());
        assert!(state.selection_end() <= len);
        assert!(state.cursor() <= len);
        assert!(state.display_offset() <= len);
    }

    #[test]
    fn insert_then_delete_restores_buffer() {
        let mut state = StringState::with_text("hello world");
        state.move_home(false);
        for _ in 0..5 {
            state.move_right(false);
        }
        let before = (state.text().to_string(), state.cursor());
        let inserted = state.insert_str(", big");
        assert_eq!(inserted, 5);
        assert_eq!(state.text(), "hello, big world");
        for _ in 0..inserted {
            assert!(state.delete_backward());
        }
        assert_eq!((state.text().to_string(), state.cursor()), before);
    }

    #[test]
    fn insert_replaces_selection() {
        let mut state = StringState::with_text("abcdef");
        state.move_home(false);
        state.move_right(false);
        state.move_right(true);
        state.move_right(true);
        assert_eq!((state.selection_start(), state.selection_end()), (1, 3));
        state.insert_str("X");
        assert_eq!(state.text(), "aXdef");
        assert_eq!(state.cursor(), 2);
        assert!(!state.has_selection());
    }

    #[test]
    fn delete_forward_and_selection() {
        let mut state = StringState::with_text("abc");
        state.move_home(false);
        assert!(state.delete_forward());
        assert_eq!(state.text(), "bc");
        state.select_all();
        assert!(state.delete_backward());
        assert!(state.is_empty());
        assert!(!state.delete_backward());
        assert!(!state.delete_forward());
    }

    #[test]
    fn unshifted_move_collapses_selection() {
        let mut state = StringState::with_text("abcdef");
        state.move_home(false);
        state.move_end(true);
        state.move_left(false);
        assert_eq!(state.cursor(), 0);
        assert!(!state.has_selection());
    }

    #[test]
    fn integer_mode_filters_input() {
        let mut state = StringState::integer(0);
        state.select_all();
        assert_eq!(state.insert_str("-12a3"), 4);
        assert_eq!(state.text(), "-123");
        assert_eq!(state.integer_value(), Some(-123));
        state.move_home(false);
        assert_eq!(state.insert_str("+"), 0);
        state.move_end(false);
        assert_eq!(state.insert_str("-"), 0);
        assert_eq!(state.text(), "-123");

        // Digits cannot land in front of the sign either.
        state.move_home(false);
        assert_eq!(state.insert_str("5"), 0);
        assert_eq!(state.text(), "-123");
        assert_eq!(state.integer_value(), Some(-123));

        // Replacing the sign itself is allowed.
        state.move_home(false);
        state.move_right(true);
        assert_eq!(state.insert_str("7"), 1);
        assert_eq!(state.text(), "7123");
    }

    #[test]
    fn max_chars_caps_insertion() {
        let mut state = StringState::new().with_max_chars(4);
        assert_eq!(state.insert_str("abcdef"), 4);
        assert_eq!(state.text(), "abcd");
        assert_eq!(state.insert_str("z"), 0);
    }

    #[test]
    fn click_picks_nearer_boundary() {
        let mut state = StringState::with_text("abcd");
        state.click_at(11, &font());
        assert_eq!(state.cursor(), 1);
        state.click_at(13, &font());
        assert_eq!(state.cursor(), 2);
        state.click_at(500, &font());
        assert_eq!(state.cursor(), 4);
        state.click_at(-3, &font());
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn drag_extends_selection() {
        let mut state = StringState::with_text("abcdef");
        state.click_at(8, &font());
        assert!(state.drag_to(32, &font()));
        assert_eq!((state.selection_start(), state.selection_end()), (1, 4));
    }

    #[test]
    fn display_offset_follows_cursor() {
        let mut state = StringState::with_text("0123456789");
        state.scroll_to_cursor(&font(), 40);
        // cursor at 10 plus its glyph: 5 visible cells end at the cursor cell
        assert_eq!(state.display_offset(), 6);
        state.move_home(false);
        state.scroll_to_cursor(&font(), 40);
        assert_eq!(state.display_offset(), 0);
        state.click_at(16, &font());
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn click_is_relative_to_display_offset() {
        let mut state = StringState::with_text("0123456789");
        state.scroll_to_cursor(&font(), 40);
        state.click_at(8, &font());
        assert_eq!(state.cursor(), state.display_offset() + 1);
    }

    #[test]
    fn selection_invariant_holds_for_mixed_sequences() {
        let mut state = StringState::with_text("the quick brown fox");
        let font = font();
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..2000 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let extend = seed & 0x10 != 0;
            match (seed >> 8) % 9 {
                0 => state.move_left(extend),
                1 => state.move_right(extend),
                2 => state.move_home(extend),
                3 => state.move_end(extend),
                4 => {
                    state.delete_backward();
                }
                5 => {
                    state.delete_forward();
                }
                6 => {
                    state.insert_str("xy");
                }
                7 => state.click_at(((seed >> 16) % 200) as i32, &font),
                _ => {
                    state.drag_to(((seed >> 16) % 200) as i32, &font);
                }
            }
            state.scroll_to_cursor(&font, 48);
            assert_invariants(&state);
        }
    }

    #[test]
    fn key_handling_maps_editing_keys() {
        let mut state = StringState::with_text("abc");
        assert_eq!(state.handle_key(KeyCode::Left, KeyModifiers::SHIFT), TextEdit::Moved);
        assert!(state.has_selection());
        assert_eq!(
            state.handle_key(KeyCode::Backspace, KeyModifiers::NONE),
            TextEdit::Changed
        );
        assert_eq!(state.text(), "ab");
        assert_eq!(state.handle_key(KeyCode::F(1), KeyModifiers::NONE), TextEdit::Ignored);
    }
}
