//! Input handling for the TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use super::app::Action;

/// Keymap context: overlays and the search box reinterpret plain keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputMode {
    pub confirming: bool,
    pub searching: bool,
}

/// Convert a crossterm key event to an Action.
pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    if mode.confirming {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::ConfirmYes),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::ConfirmNo),
            _ => None,
        };
    }

    if mode.searching {
        return match key.code {
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Enter => Some(Action::Select),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char(c) => Some(Action::SearchChar(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char(c @ '1'..='4') => Some(Action::SwitchView(c as u8 - b'0')),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Char('d') => Some(Action::ToggleDetail),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('s') => Some(Action::Sync),
        KeyCode::Char('v') => Some(Action::Validate),
        KeyCode::Char('/') => Some(Action::SearchStart),
        KeyCode::Char('f') => Some(Action::CycleRepoFilter),
        KeyCode::Char('e') => Some(Action::Extract),
        KeyCode::Char('m') => Some(Action::Mount),
        _ => None,
    }
}

/// Convert a crossterm Event to an Action.
pub fn handle_event(event: Event, mode: InputMode) -> Option<Action> {
    match event {
        Event::Key(key) => handle_key_event(key, mode),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn plain_keys_map_to_navigation() {
        let mode = InputMode::default();
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), mode), Some(Action::Quit));
        assert_eq!(handle_key_event(key(KeyCode::Char('j')), mode), Some(Action::Down));
        assert_eq!(
            handle_key_event(key(KeyCode::Char('2')), mode),
            Some(Action::SwitchView(2))
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('e')), mode),
            Some(Action::Extract)
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('m')), mode),
            Some(Action::Mount)
        );
    }

    #[test]
    fn confirm_overlay_captures_everything() {
        let mode = InputMode {
            confirming: true,
            searching: false,
        };
        assert_eq!(
            handle_key_event(key(KeyCode::Char('y')), mode),
            Some(Action::ConfirmYes)
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Esc), mode),
            Some(Action::ConfirmNo)
        );
        // Plain navigation is swallowed while the overlay is up.
        assert_eq!(handle_key_event(key(KeyCode::Char('j')), mode), None);
    }

    #[test]
    fn search_mode_feeds_characters() {
        let mode = InputMode {
            confirming: false,
            searching: true,
        };
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q')), mode),
            Some(Action::SearchChar('q'))
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Backspace), mode),
            Some(Action::SearchBackspace)
        );
    }
}
