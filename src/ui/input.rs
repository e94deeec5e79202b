/// Terminal input collector.
///
/// Drains every pending crossterm event once per frame and splits them into:
///   - fresh key presses (edge-triggered; Repeat counts as a press so
///     holding an arrow key keeps the cursor moving)
///   - mouse events, in arrival order, for the drag/click adapters
///
/// Release events are ignored: nothing in the game depends on key hold time.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};

pub struct InputState {
    /// Keys pressed (or auto-repeated) during the most recent drain.
    presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    pub raw_events: Vec<KeyEvent>,

    /// Mouse events collected during drain.
    pub mouse: Vec<MouseEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            mouse: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.raw_events.clear();
        self.mouse.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    self.raw_events.push(key);
                    if key.kind != KeyEventKind::Release {
                        self.presses.push(key.code);
                    }
                }
                Ok(Event::Mouse(m)) => self.mouse.push(m),
                _ => {}
            }
        }
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
