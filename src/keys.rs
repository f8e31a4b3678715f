use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    // Once the session is gone the only useful key is quit; everything else
    // would just bounce off the backend with more 401s.
    if guard.state.session_expired {
        if let (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL) =
            (key_event.code, key_event.modifiers)
        {
            crate::cleanup_terminal();
            std::process::exit(0);
        }
        return;
    }

    // Text fields swallow the keyboard while open.
    if guard.is_editing() {
        let request = handle_editing_keys(key_event, &mut guard);
        drop(guard);
        if let Some(request) = request {
            let _ = network_requests.send(request).await;
        }
        return;
    }

    let mut outbound: Option<NetworkRequest> = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Tournaments),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Detail),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Bracket),
        (_, Char('4'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('5'), _) => guard.update_tab(MenuItem::Teams),
        (_, Char('6'), _) => {
            guard.update_tab(MenuItem::News);
            if guard.state.news.articles.is_empty() {
                outbound = Some(NetworkRequest::LoadNews);
            }
        }
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Tournament list
        (MenuItem::Tournaments, Char('j') | KeyCode::Down, _) => guard.state.list.navigate_down(),
        (MenuItem::Tournaments, Char('k') | KeyCode::Up, _) => guard.state.list.navigate_up(),
        (MenuItem::Tournaments, Char('n') | KeyCode::Right, _) => guard.state.list.next_page(),
        (MenuItem::Tournaments, Char('p') | KeyCode::Left, _) => guard.state.list.prev_page(),
        (MenuItem::Tournaments, KeyCode::Enter, _) => {
            outbound = guard.open_selected_tournament();
        }
        (MenuItem::Tournaments, Char('c'), _) => guard.start_create_tournament(),
        (MenuItem::Tournaments, Char('e'), _) => guard.start_edit_tournament(),
        (MenuItem::Tournaments, Char('d'), _) => {
            outbound = guard.request_delete_tournament();
        }
        (MenuItem::Tournaments, Char('r'), _) => {
            outbound = Some(NetworkRequest::LoadTournaments);
        }

        // Detail: lifecycle controls
        (MenuItem::Detail, Char('g'), _) => {
            outbound = guard
                .lifecycle_request(|tournament_id| NetworkRequest::GenerateBracket { tournament_id });
        }
        (MenuItem::Detail, Char('s'), _) => {
            outbound = guard
                .lifecycle_request(|tournament_id| NetworkRequest::StartTournament { tournament_id });
        }
        (MenuItem::Detail, Char('a'), _) => {
            outbound = guard
                .lifecycle_request(|tournament_id| NetworkRequest::AdvanceRound { tournament_id });
        }
        // Completion is irreversible; `F` (shifted, so it cannot collide with
        // the full-screen toggle) and armed with a second press.
        (MenuItem::Detail, Char('F'), _) => {
            outbound = guard.request_complete_tournament();
        }
        (MenuItem::Detail, Char('r'), _) => {
            outbound = guard.lifecycle_request(|tournament_id| {
                NetworkRequest::LoadTournamentBundle { tournament_id }
            });
        }

        // Bracket navigation
        (MenuItem::Bracket, Char('l') | KeyCode::Right, _) => {
            guard.state.bracket.navigate_round_next();
        }
        (MenuItem::Bracket, Char('h') | KeyCode::Left, _) => {
            guard.state.bracket.navigate_round_prev();
        }
        (MenuItem::Bracket, Char('j') | KeyCode::Down, _) => {
            guard.state.bracket.navigate_match_down();
        }
        (MenuItem::Bracket, Char('k') | KeyCode::Up, _) => {
            guard.state.bracket.navigate_match_up();
        }
        (MenuItem::Bracket, KeyCode::PageDown, _) => {
            guard.state.bracket.scroll_offset =
                guard.state.bracket.scroll_offset.saturating_add(4);
        }
        (MenuItem::Bracket, KeyCode::PageUp, _) => {
            guard.state.bracket.scroll_offset =
                guard.state.bracket.scroll_offset.saturating_sub(4);
        }
        // Jump to the selected match in the entry tab.
        (MenuItem::Bracket, KeyCode::Enter, _) => {
            if let Some(match_id) = guard.state.bracket.selected_match_id()
                && let Some(index) = guard
                    .state
                    .detail
                    .matches
                    .iter()
                    .position(|m| m.id == match_id)
            {
                guard.state.matches.selected = index;
                guard.update_tab(MenuItem::Matches);
                guard.open_match_form();
            }
        }

        // Match result entry
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => {
            let total = guard.state.detail.matches.len();
            guard.state.matches.navigate_down(total);
        }
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => guard.state.matches.navigate_up(),
        (MenuItem::Matches, KeyCode::Enter, _) => guard.open_match_form(),

        // Teams
        (MenuItem::Teams, Char('j') | KeyCode::Down, _) => {
            let total = guard.state.detail.teams.len();
            guard.state.teams.navigate_down(total);
        }
        (MenuItem::Teams, Char('k') | KeyCode::Up, _) => guard.state.teams.navigate_up(),
        (MenuItem::Teams, Char('a'), _) => {
            outbound = guard.approve_selected_team();
        }
        (MenuItem::Teams, Char('x'), _) => {
            outbound = guard.reject_selected_team();
        }
        (MenuItem::Teams, Char('n'), _) => guard.state.teams.registering = true,

        // News
        (MenuItem::News, Char('j') | KeyCode::Down, _) => guard.state.news.navigate_down(),
        (MenuItem::News, Char('k') | KeyCode::Up, _) => guard.state.news.navigate_up(),
        (MenuItem::News, Char('c'), _) => guard.start_create_article(),
        (MenuItem::News, Char('e'), _) => guard.start_edit_article(),
        (MenuItem::News, Char('d'), _) => {
            outbound = guard.request_delete_article();
        }
        (MenuItem::News, Char('u'), _) => {
            if guard.state.news.selected_article().is_some() {
                guard.state.news.uploading = true;
            }
        }
        (MenuItem::News, Char('r'), _) => {
            outbound = Some(NetworkRequest::LoadNews);
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    drop(guard);
    if let Some(request) = outbound {
        let _ = network_requests.send(request).await;
    }
}

/// Key routing while a form or one-line input owns the keyboard. Esc cancels,
/// Tab moves focus, Enter submits and may yield a request to send.
fn handle_editing_keys(key_event: KeyEvent, app: &mut App) -> Option<NetworkRequest> {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        if let Char('c') = key_event.code {
            crate::cleanup_terminal();
            std::process::exit(0);
        }
        return None;
    }

    if app.state.teams.registering {
        match key_event.code {
            KeyCode::Esc => {
                app.state.teams.registering = false;
                app.state.teams.register_input.clear();
            }
            KeyCode::Enter => return app.submit_team_registration(),
            KeyCode::Backspace => {
                app.state.teams.register_input.pop();
            }
            Char(c) => app.state.teams.register_input.push(c),
            _ => {}
        }
        return None;
    }

    if app.state.news.uploading {
        match key_event.code {
            KeyCode::Esc => {
                app.state.news.uploading = false;
                app.state.news.upload_input.clear();
            }
            KeyCode::Enter => return app.submit_attachment_upload(),
            KeyCode::Backspace => {
                app.state.news.upload_input.pop();
            }
            Char(c) => app.state.news.upload_input.push(c),
            _ => {}
        }
        return None;
    }

    if app.state.list.form.is_some() {
        match key_event.code {
            KeyCode::Esc => app.state.list.form = None,
            KeyCode::Tab => {
                if let Some(form) = app.state.list.form.as_mut() {
                    form.next_field();
                }
            }
            KeyCode::Enter => return app.submit_tournament_form(),
            KeyCode::Backspace => {
                if let Some(form) = app.state.list.form.as_mut() {
                    form.focused_value_mut().pop();
                }
            }
            Char(c) => {
                if let Some(form) = app.state.list.form.as_mut() {
                    form.focused_value_mut().push(c);
                }
            }
            _ => {}
        }
        return None;
    }

    if app.state.matches.form.is_some() {
        match key_event.code {
            KeyCode::Esc => app.state.matches.form = None,
            KeyCode::Tab => {
                if let Some(form) = app.state.matches.form.as_mut() {
                    form.next_field();
                }
            }
            KeyCode::Enter => return app.submit_match_form(),
            KeyCode::Backspace => {
                if let Some(form) = app.state.matches.form.as_mut() {
                    form.focused_value_mut().pop();
                }
            }
            Char(c) => {
                if let Some(form) = app.state.matches.form.as_mut() {
                    form.focused_value_mut().push(c);
                }
            }
            _ => {}
        }
        return None;
    }

    if app.state.news.form.is_some() {
        match key_event.code {
            KeyCode::Esc => app.state.news.form = None,
            KeyCode::Tab => {
                if let Some(form) = app.state.news.form.as_mut() {
                    form.next_field();
                }
            }
            KeyCode::Enter => return app.submit_article_form(),
            KeyCode::Backspace => {
                if let Some(form) = app.state.news.form.as_mut() {
                    form.focused_value_mut().pop();
                }
            }
            Char(c) => {
                if let Some(form) = app.state.news.form.as_mut() {
                    form.focused_value_mut().push(c);
                }
            }
            _ => {}
        }
        return None;
    }

    None
}
