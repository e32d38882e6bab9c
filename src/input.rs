use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Alerts moved per PageUp/PageDown.
pub const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollTop,
    ScrollBottom,
}

pub fn parse_key(key: &KeyEvent) -> Option<UiCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiCommand::Quit);
    }
    parse_command(&key.code)
}

pub fn parse_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Up => Some(UiCommand::ScrollUp),
        KeyCode::Down => Some(UiCommand::ScrollDown),
        KeyCode::PageUp => Some(UiCommand::PageUp),
        KeyCode::PageDown => Some(UiCommand::PageDown),
        KeyCode::Home => Some(UiCommand::ScrollTop),
        KeyCode::End => Some(UiCommand::ScrollBottom),
        KeyCode::Char('g') => Some(UiCommand::ScrollTop),
        KeyCode::Char('G') => Some(UiCommand::ScrollBottom),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            'k' => Some(UiCommand::ScrollUp),
            'j' => Some(UiCommand::ScrollDown),
            _ => None,
        },
        _ => None,
    }
}
