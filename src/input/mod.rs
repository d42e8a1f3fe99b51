//! Input events consumed by the router, plus the crossterm adapter.

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};

use crate::geometry::Point;

/// What happened, in screen coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    PointerMove { x: i32, y: i32 },
    PointerDown { button: MouseButton, x: i32, y: i32 },
    PointerUp { button: MouseButton, x: i32, y: i32 },
    KeyDown { code: KeyCode, modifiers: KeyModifiers },
    KeyUp { code: KeyCode, modifiers: KeyModifiers },
    /// Committed text, already translated from key presses by the host.
    TextInput(String),
}

/// One input event. The router sets `handled` when something consumed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub handled: bool,
}

impl InputEvent {
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            handled: false,
        }
    }

    pub fn pointer_move(x: i32, y: i32) -> Self {
        Self::new(InputKind::PointerMove { x, y })
    }

    pub fn pointer_down(x: i32, y: i32) -> Self {
        Self::new(InputKind::PointerDown {
            button: MouseButton::Left,
            x,
            y,
        })
    }

    pub fn pointer_up(x: i32, y: i32) -> Self {
        Self::new(InputKind::PointerUp {
            button: MouseButton::Left,
            x,
            y,
        })
    }

    pub fn key(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::new(InputKind::KeyDown { code, modifiers })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(InputKind::TextInput(text.into()))
    }

    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self.kind {
            InputKind::PointerMove { x, y }
            | InputKind::PointerDown { x, y, .. }
            | InputKind::PointerUp { x, y, .. } => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// Map a terminal event, scaling cell coordinates by `cell` pixels.
    ///
    /// Printable key presses without Ctrl/Alt become [`InputKind::TextInput`];
    /// pastes become text input as well. Events with no counterpart map to `None`.
    pub fn from_crossterm(event: &CrosstermEvent, cell: (i32, i32)) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) => Self::from_key(key),
            CrosstermEvent::Mouse(mouse) => Self::from_mouse(mouse, cell),
            CrosstermEvent::Paste(data) => Some(Self::text(data.clone())),
            CrosstermEvent::FocusGained | CrosstermEvent::FocusLost => None,
            CrosstermEvent::Resize(_, _) => None,
        }
    }

    fn from_key(key: &KeyEvent) -> Option<Self> {
        let modifiers = key.modifiers;
        match key.kind {
            KeyEventKind::Release => Some(Self::new(InputKind::KeyUp {
                code: key.code,
                modifiers,
            })),
            KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
                KeyCode::Char(ch)
                    if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    Some(Self::text(ch.to_string()))
                }
                code => Some(Self::key(code, modifiers)),
            },
        }
    }

    fn from_mouse(mouse: &MouseEvent, (cell_w, cell_h): (i32, i32)) -> Option<Self> {
        let x = i32::from(mouse.column) * cell_w;
        let y = i32::from(mouse.row) * cell_h;
        let kind = match mouse.kind {
            MouseEventKind::Down(button) => InputKind::PointerDown { button, x, y },
            MouseEventKind::Up(button) => InputKind::PointerUp { button, x, y },
            MouseEventKind::Drag(_) | MouseEventKind::Moved => InputKind::PointerMove { x, y },
            _ => return None,
        };
        Some(Self::new(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn printable_keys_become_text() {
        let event =
            InputEvent::from_crossterm(&press(KeyCode::Char('a'), KeyModifiers::SHIFT), (1, 1));
        assert_eq!(event.map(|e| e.kind), Some(InputKind::TextInput("a".into())));
    }

    #[test]
    fn control_chords_stay_keys() {
        let event =
            InputEvent::from_crossterm(&press(KeyCode::Char('a'), KeyModifiers::CONTROL), (1, 1));
        assert_eq!(
            event.map(|e| e.kind),
            Some(InputKind::KeyDown {
                code: KeyCode::Char('a'),
                modifiers: KeyModifiers::CONTROL
            })
        );
    }

    #[test]
    fn mouse_cells_scale_to_pixels() {
        let mouse = CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 2,
            modifiers: KeyModifiers::NONE,
        });
        let event = InputEvent::from_crossterm(&mouse, (8, 16)).unwrap();
        assert_eq!(event.position(), Some(Point::new(24, 32)));
        assert!(!event.handled);

        let scroll = CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert!(InputEvent::from_crossterm(&scroll, (8, 16)).is_none());
    }
}
