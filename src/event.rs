use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(Event::Key(key)) = event::read()
                        && tx.send(AppEvent::Key(key)).is_err()
                    {
                        return;
                    }
                } else if tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

/// Name of a pressed key the way the drill expects it: the produced character
/// for printable keys (shifted letters arrive upper-case) and a word such as
/// `Shift` or `Escape` for the rest. Releases and repeats yield `None`.
pub fn key_name(key: &KeyEvent) -> Option<String> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let name = match key.code {
        KeyCode::Char(ch) => {
            if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                return None;
            }
            ch.to_string()
        }
        KeyCode::Modifier(modifier) => modifier_name(modifier).to_string(),
        KeyCode::Tab | KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        _ => return None,
    };
    Some(name)
}

fn modifier_name(modifier: event::ModifierKeyCode) -> &'static str {
    use event::ModifierKeyCode::*;
    match modifier {
        LeftShift | RightShift => "Shift",
        LeftControl | RightControl => "Control",
        LeftAlt | RightAlt | IsoLevel3Shift | IsoLevel5Shift => "Alt",
        LeftSuper | RightSuper | LeftHyper | RightHyper | LeftMeta | RightMeta => "Meta",
    }
}

/// Ctrl-C quits from anywhere.
pub fn is_quit(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && key.code == KeyCode::Char('c')
}
