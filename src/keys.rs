//! Key bindings
//!
//! Translates crossterm key events into dashboard actions and applies them
//! to the shared state.

use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

/// Bindings shown on the help line, in display order.
pub const HELP: &[(&str, &str)] = &[
    ("↑/k", "up"),
    ("↓/j", "down"),
    ("pgup/pgdn", "page"),
    ("t/space", "track"),
    ("s", "lin/log"),
    ("q", "quit"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// q, Esc or Ctrl+C
    Quit,
    /// Keep the cursor on the selected label across re-ranks
    ToggleTracking,
    /// Switch between linear and log scale
    ToggleScale,
    Up,
    Down,
    PageUp,
    PageDown,
    First,
    Last,
    None,
}

pub fn translate_key(key: KeyEvent) -> InputEvent {
    if key.kind == KeyEventKind::Release {
        return InputEvent::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputEvent::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char('t') | KeyCode::Char(' ') => InputEvent::ToggleTracking,
        KeyCode::Char('s') => InputEvent::ToggleScale,
        KeyCode::Up | KeyCode::Char('k') => InputEvent::Up,
        KeyCode::Down | KeyCode::Char('j') => InputEvent::Down,
        KeyCode::PageUp => InputEvent::PageUp,
        KeyCode::PageDown => InputEvent::PageDown,
        KeyCode::Home | KeyCode::Char('g') => InputEvent::First,
        KeyCode::End | KeyCode::Char('G') => InputEvent::Last,
        _ => InputEvent::None,
    }
}

/// Apply `event`; returns true when the dashboard should exit.
/// `page` is the number of list entries a page key moves.
pub fn apply_event(app: &App, event: InputEvent, page: usize) -> bool {
    match event {
        InputEvent::Quit => return true,
        InputEvent::ToggleTracking => {
            let on = app.toggle_tracking();
            debug!(track_selected = on, "tracking toggled");
        }
        InputEvent::ToggleScale => {
            let log = app.toggle_log_scale();
            debug!(log_scale = log, "scale toggled");
        }
        InputEvent::Up => app.ui.lock().view.select_previous(),
        InputEvent::Down => app.ui.lock().view.select_next(),
        InputEvent::PageUp => app.ui.lock().view.page_up(page),
        InputEvent::PageDown => app.ui.lock().view.page_down(page),
        InputEvent::First => app.ui.lock().view.select_first(),
        InputEvent::Last => app.ui.lock().view.select_last(),
        InputEvent::None => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_translate_key_quits() {
        assert_eq!(translate_key(key(KeyCode::Char('q'))), InputEvent::Quit);
        assert_eq!(translate_key(key(KeyCode::Esc)), InputEvent::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(ctrl_c), InputEvent::Quit);
        assert_eq!(translate_key(key(KeyCode::Char('c'))), InputEvent::None);
    }

    #[test]
    fn test_translate_key_navigation() {
        assert_eq!(translate_key(key(KeyCode::Char('k'))), InputEvent::Up);
        assert_eq!(translate_key(key(KeyCode::Down)), InputEvent::Down);
        assert_eq!(translate_key(key(KeyCode::Char('G'))), InputEvent::Last);
        assert_eq!(translate_key(key(KeyCode::Home)), InputEvent::First);
        assert_eq!(translate_key(key(KeyCode::PageDown)), InputEvent::PageDown);
    }

    #[test]
    fn test_translate_key_toggles() {
        assert_eq!(translate_key(key(KeyCode::Char(' '))), InputEvent::ToggleTracking);
        assert_eq!(translate_key(key(KeyCode::Char('t'))), InputEvent::ToggleTracking);
        assert_eq!(translate_key(key(KeyCode::Char('s'))), InputEvent::ToggleScale);
    }

    #[test]
    fn test_release_is_ignored() {
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(translate_key(release), InputEvent::None);
    }

    #[test]
    fn test_apply_event() {
        let mut config = Config::default();
        config.sketch.width = 100;
        let app = App::with_seed(config, Some(5)).expect("valid config");
        for label in ["a", "b", "c"] {
            app.record(label, 1);
        }
        app.refresh_ranked();

        assert!(!apply_event(&app, InputEvent::Down, 10));
        assert_eq!(app.ui.lock().view.selected(), 1);
        apply_event(&app, InputEvent::Last, 10);
        assert_eq!(app.ui.lock().view.selected(), 2);
        apply_event(&app, InputEvent::PageUp, 10);
        assert_eq!(app.ui.lock().view.selected(), 0);

        let scale = app.log_scale();
        apply_event(&app, InputEvent::ToggleScale, 10);
        assert_eq!(app.log_scale(), !scale);
        assert!(apply_event(&app, InputEvent::Quit, 10));
    }
}
