//! Keyboard input for the puzzle screen.
//!
//! Every action here is one-shot (move cursor, pick, undo, answer a prompt),
//! so only edge-triggered presses and left clicks are tracked. Auto-repeat from a held key
//! still arrives as `Repeat` events and moves the cursor as expected.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

pub struct InputState {
    /// Keys pressed (or auto-repeated) during the most recent drain.
    presses: Vec<KeyCode>,
    /// Raw key events from the most recent drain, for modifier checks.
    raw_events: Vec<KeyEvent>,
    /// Left-button presses as terminal `(column, row)`.
    clicks: Vec<(u16, u16)>,
    /// Set when the terminal was resized; the renderer must repaint.
    pub resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            clicks: Vec::with_capacity(4),
            resized: false,
        }
    }

    /// Drain every pending terminal event without blocking.
    /// Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.raw_events.clear();
        self.clicks.clear();
        self.resized = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.raw_events.push(key);
                    self.presses.push(key.code);
                }
                Ok(Event::Mouse(m)) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                    self.clicks.push((m.column, m.row));
                }
                Ok(Event::Resize(..)) => self.resized = true,
                _ => {}
            }
        }
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn clicks(&self) -> &[(u16, u16)] {
        &self.clicks
    }

    /// Ctrl+C arrives as a plain key event in raw mode.
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}
