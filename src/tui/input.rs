//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Result of handling a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
}

/// Maps a key to an action. Only `q` and Ctrl+C do anything.
pub fn handle_key(key: KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(handle_key(key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key(key(KeyCode::Char('Q'))), KeyAction::Quit);
        assert_eq!(
            handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
        // Modifiers on q do not matter.
        assert_eq!(
            handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::ALT)),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(handle_key(key(KeyCode::Char('c'))), KeyAction::None);
        assert_eq!(handle_key(key(KeyCode::Esc)), KeyAction::None);
        assert_eq!(handle_key(key(KeyCode::Enter)), KeyAction::None);
    }

    #[test]
    fn test_release_ignored() {
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(handle_key(release), KeyAction::None);
    }
}
