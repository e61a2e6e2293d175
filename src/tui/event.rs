use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;

use super::{App, Popup, Tab};
use crate::store::ScheduleAction;

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (code, modifiers) {
        app.running = false;
        return;
    }

    // ── Popups intercept all keys while open ───────────────────────────
    let popup_handler: Option<fn(&mut App, KeyCode)> = match &app.popup {
        Popup::None => None,
        Popup::BetaNotice => Some(handle_beta_key),
        Popup::Picker(_) => Some(handle_picker_key),
        Popup::TypeFilter(_) => Some(handle_type_filter_key),
        Popup::TextFilter(_) => Some(handle_text_filter_key),
    };
    if let Some(handler) = popup_handler {
        handler(app, code);
        return;
    }

    match (code, modifiers) {
        (KeyCode::Char('q'), _) => {
            app.running = false;
            return;
        }
        (KeyCode::Tab, _) | (KeyCode::Right, KeyModifiers::SHIFT) => {
            app.set_tab(app.active_tab.next());
            return;
        }
        (KeyCode::BackTab, _) | (KeyCode::Left, KeyModifiers::SHIFT) => {
            app.set_tab(app.active_tab.prev());
            return;
        }
        (KeyCode::Char('1'), _) => {
            app.set_tab(Tab::Groups);
            return;
        }
        (KeyCode::Char('2'), _) => {
            app.set_tab(Tab::Teachers);
            return;
        }
        (KeyCode::Char('3'), _) => {
            app.set_tab(Tab::Summary);
            return;
        }
        _ => {}
    }

    if app.active_tab == Tab::Summary {
        handle_table_key(app, code);
    } else {
        handle_calendar_key(app, code);
    }

    // Shared between all tabs.
    match code {
        KeyCode::Char('s') => app.open_picker(),
        KeyCode::Char('m') => app.toggle_multiple(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Esc => app.session.alerts.dismiss(),
        _ => {}
    }
}

fn handle_calendar_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Down | KeyCode::Char('j') => app.agenda_state.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.agenda_state.select_prev(),
        KeyCode::Left | KeyCode::Char('h') => app.shift_period(false),
        KeyCode::Right | KeyCode::Char('l') => app.shift_period(true),
        KeyCode::Char('t') => app.jump_to_today(),
        KeyCode::Char('v') => app.cycle_view(),
        KeyCode::Char('f') => app.open_type_filter(),
        KeyCode::Char('/') => app.open_text_filter(),
        KeyCode::Char('c') => app.dispatch(ScheduleAction::GroupsSplitColorToggle(None)),
        KeyCode::Char('p') => app.dispatch(ScheduleAction::GroupingGroupsToggle(None)),
        KeyCode::Char('b') => app.dispatch(ScheduleAction::GroupOrderToggle(None)),
        _ => {}
    }
}

fn handle_table_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Down | KeyCode::Char('j') => app.table_state.next(app.subjects.len()),
        KeyCode::Up | KeyCode::Char('k') => app.table_state.previous(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(row) = app.subjects.get(app.table_state.selected) {
                let name = row.lesson_name.clone();
                app.table_state.toggle(&name);
            }
        }
        _ => {}
    }
}

fn handle_beta_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Enter => app.confirm_beta(true),
        KeyCode::Char('n') | KeyCode::Esc => app.confirm_beta(false),
        _ => {}
    }
}

fn handle_picker_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.popup = Popup::None,
        KeyCode::Down => {
            if let Popup::Picker(p) = &mut app.popup {
                p.list.select_next();
            }
        }
        KeyCode::Up => {
            if let Popup::Picker(p) = &mut app.popup {
                p.list.select_prev();
            }
        }
        // Space toggles in multi mode and is plain text otherwise.
        KeyCode::Char(' ') if app.is_multiple(app.active_tab.selector()) => {
            if let Some((kind, key)) = app.picker_current() {
                app.picker_toggle(kind, &key);
            }
        }
        KeyCode::Enter => {
            if let Some((kind, key)) = app.picker_current() {
                if !app.is_multiple(kind) {
                    app.picker_toggle(kind, &key);
                }
            }
            app.popup = Popup::None;
        }
        KeyCode::Backspace => {
            if let Popup::Picker(p) = &mut app.popup {
                p.query.pop();
            }
            app.picker_requery();
        }
        KeyCode::Char(c) => {
            if let Popup::Picker(p) = &mut app.popup {
                p.query.push(c);
            }
            app.picker_requery();
        }
        _ => {}
    }
}

fn handle_type_filter_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Down | KeyCode::Char('j') => {
            if let Popup::TypeFilter(list) = &mut app.popup {
                list.select_next();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if let Popup::TypeFilter(list) = &mut app.popup {
                list.select_prev();
            }
        }
        KeyCode::Char(' ') => {
            let selected = match &app.popup {
                Popup::TypeFilter(list) => list.selected,
                _ => return,
            };
            if let Some(kind) = app.filter_kinds().get(selected).copied() {
                app.dispatch(ScheduleAction::ToggleLessonType(kind));
            }
        }
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('f') => app.popup = Popup::None,
        _ => {}
    }
}

/// The filter applies while typing; Esc clears it.
fn handle_text_filter_key(app: &mut App, code: KeyCode) {
    let Popup::TextFilter(input) = &mut app.popup else {
        return;
    };
    match code {
        KeyCode::Enter => {
            app.popup = Popup::None;
            return;
        }
        KeyCode::Esc => input.clear(),
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(c) => input.push(c),
        _ => return,
    }
    let text = input.clone();
    if code == KeyCode::Esc {
        app.popup = Popup::None;
    }
    app.dispatch(ScheduleAction::UpdateLessonFilter(text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScheduleClient;
    use crate::config::Config;
    use crate::lessons::LessonKind;
    use crate::location::ShareLink;
    use crate::storage::{MemoryStorage, StorageExt, BETA_CONFIRM_KEY};
    use url::Url;

    fn app() -> App {
        let config = Config::default();
        let client = ScheduleClient::new("http://127.0.0.1:9").unwrap();
        let base = ShareLink::new(Url::parse(&config.share_url).unwrap());
        let teachers = base.page("teachers");
        let mut storage = MemoryStorage::default();
        storage.set(BETA_CONFIRM_KEY, &true);
        App::new(&config, client, base, teachers, Box::new(storage))
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, code, KeyModifiers::NONE);
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn text_filter_updates_store_while_typing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "г-5");
        assert_eq!(app.state().lesson_filter, "г-5");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.state().lesson_filter, "г-");
        press(&mut app, KeyCode::Enter);
        assert!(!app.popup.is_open());
        assert_eq!(app.state().lesson_filter, "г-");

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert!(app.state().lesson_filter.is_empty());
        assert!(!app.popup.is_open());
    }

    #[tokio::test]
    async fn type_filter_offers_only_allowed_kinds() {
        let mut app = app();
        app.dispatch(ScheduleAction::SetAllowedLessonTypes(vec![
            LessonKind::Exam,
            LessonKind::Lecture,
        ]));
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.state().lesson_types, vec![LessonKind::Exam]);
        press(&mut app, KeyCode::Esc);
        assert!(!app.popup.is_open());
    }

    #[tokio::test]
    async fn quit_keys_are_ignored_inside_popups() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert_eq!(app.state().lesson_filter, "q");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn toggles_flip_store_flags() {
        let mut app = app();
        let split = app.state().groups_split_color;
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.state().groups_split_color, !split);
        press(&mut app, KeyCode::Char('b'));
        assert!(!app.state().is_group_by_date);
    }

    #[tokio::test]
    async fn picker_searches_and_selects() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        assert!(matches!(app.popup, Popup::Picker(_)));
        type_str(&mut app, "эис");
        let Popup::Picker(p) = &app.popup else {
            panic!("picker closed");
        };
        assert_eq!(p.query, "эис");
        assert_eq!(p.list.len, 1);
        press(&mut app, KeyCode::Enter);
        assert!(!app.popup.is_open());
        assert_eq!(app.state().selected_groups, vec!["ЭИС-46".to_string()]);
    }
}
