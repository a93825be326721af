use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcut
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match app.screen {
        Screen::Home => match key.code {
            Esc => return Action::Quit,
            Tab | Up | Down => app.home.switch_focus(),
            Enter => app.open_points(),
            Backspace => app.home.pop(),
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.home.push(character);
                }
            }
            _ => {}
        },

        Screen::Points => match key.code {
            Char('q') => return Action::Quit,
            Left | Char('h') => app.move_category(false),
            Right | Char('l') => app.move_category(true),
            Up | Char('k') => app.move_point(false),
            Down | Char('j') => app.move_point(true),
            Enter | Char(' ') => app.toggle_current_category(),
            Tab | Char('o') => app.open_current_point(),
            Esc | Backspace | Char('b') => app.go_back(),
            _ => {}
        },

        Screen::Detail(_) => match key.code {
            Char('q') => return Action::Quit,
            Left | Esc | Backspace | Char('b') => app.go_back(),
            _ => {}
        },
    }
    Action::None
}
