//! Keyboard handling - vim-like navigation plus a search prompt

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Toggle,
    SwitchPanel,
    Refresh,
    StartSearch,
    ClearSearch,
    SearchInput(char),
    SearchBackspace,
    SearchSubmit,
    SearchCancel,
    None,
}

/// Process keyboard input in normal mode
#[inline]
pub fn handle_key(key: KeyEvent) -> Action {
    match key.code {
        // Quit
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageDown,
        KeyCode::Tab => Action::SwitchPanel,

        // Expand / collapse
        KeyCode::Enter | KeyCode::Char(' ') => Action::Toggle,

        KeyCode::Char('r') => Action::Refresh,

        // Search
        KeyCode::Char('/') => Action::StartSearch,
        KeyCode::Esc => Action::ClearSearch,

        _ => Action::None,
    }
}

/// Process keyboard input while the search prompt is open
#[inline]
pub fn handle_search_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Enter => Action::SearchSubmit,
        KeyCode::Esc => Action::SearchCancel,
        KeyCode::Backspace => Action::SearchBackspace,
        KeyCode::Char(c) => Action::SearchInput(c),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_normal_mode() {
        assert_eq!(handle_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(handle_key(key(KeyCode::Char(' '))), Action::Toggle);
        assert_eq!(handle_key(key(KeyCode::Enter)), Action::Toggle);
        assert_eq!(handle_key(key(KeyCode::Char('/'))), Action::StartSearch);
        assert_eq!(handle_key(key(KeyCode::Char('j'))), Action::MoveDown);
    }

    #[test]
    fn test_search_mode_captures_letters() {
        assert_eq!(handle_search_key(key(KeyCode::Char('q'))), Action::SearchInput('q'));
        assert_eq!(handle_search_key(key(KeyCode::Enter)), Action::SearchSubmit);
        assert_eq!(handle_search_key(key(KeyCode::Esc)), Action::SearchCancel);
    }
}
