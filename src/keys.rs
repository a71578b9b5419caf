use crate::app::{App, MenuItem};
use crate::state::messages::ExportRequest;
use bracket_core::{Phase, Slot};
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::error;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    export_requests: &mpsc::Sender<ExportRequest>,
) {
    if key_event.kind == KeyEventKind::Release {
        return;
    }
    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    // Pending reset swallows everything but the answer
    if guard.state.session.reset_pending() {
        match key_event.code {
            Char('y') | Char('Y') => guard.confirm_reset(),
            Char('n') | Char('N') | KeyCode::Esc => guard.cancel_reset(),
            _ => {}
        }
        return;
    }

    if guard.state.editor.is_some() {
        match key_event.code {
            KeyCode::Enter => guard.commit_edit(),
            KeyCode::Esc => guard.cancel_edit(),
            KeyCode::Backspace => guard.editor_backspace(),
            Char(c) => guard.editor_push(c),
            _ => {}
        }
        return;
    }

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        (_, KeyCode::Tab, _) => {
            let next = match guard.state.active_tab {
                MenuItem::Players => MenuItem::Bracket,
                _ => MenuItem::Players,
            };
            guard.update_tab(next);
        }

        // Player entry: plain characters are text, commands are chords
        (MenuItem::Players, Char('d'), KeyModifiers::CONTROL) => guard.remove_last_player(),
        (MenuItem::Players, Char('r'), KeyModifiers::CONTROL) => guard.randomize_players(),
        (MenuItem::Players, Char('s'), KeyModifiers::CONTROL) => guard.start_tournament(),
        (MenuItem::Players, KeyCode::Enter, _) => guard.submit_player(),
        (MenuItem::Players, KeyCode::Backspace, _) => guard.entry_backspace(),
        (MenuItem::Players, KeyCode::Esc, _) => guard.update_tab(MenuItem::Bracket),
        (MenuItem::Players, Char('R'), _) if guard.state.session.phase() == Phase::Bracket => {
            guard.request_reset()
        }
        (MenuItem::Players, Char(c), m) if !m.contains(KeyModifiers::CONTROL) => guard.entry_push(c),

        // Quit
        (_, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Bracket navigation
        (MenuItem::Bracket, Char('l') | KeyCode::Right, _) => guard.bracket_next_round(),
        (MenuItem::Bracket, Char('h') | KeyCode::Left, _) => guard.bracket_prev_round(),
        (MenuItem::Bracket, Char('j') | KeyCode::Down, _) => guard.bracket_game_down(),
        (MenuItem::Bracket, Char('k') | KeyCode::Up, _) => guard.bracket_game_up(),

        // Picks and edits
        (MenuItem::Bracket, Char('1'), _) => guard.pick_winner(Slot::P1),
        (MenuItem::Bracket, Char('2'), _) => guard.pick_winner(Slot::P2),
        (MenuItem::Bracket, Char('e'), _) => guard.begin_edit(Slot::P1),
        (MenuItem::Bracket, Char('E'), _) => guard.begin_edit(Slot::P2),
        (MenuItem::Bracket, Char('x'), _) => {
            if let Some(request) = guard.prepare_export() {
                drop(guard);
                if let Err(e) = export_requests.send(request).await {
                    // The request, and with it the capture guard, is dropped here.
                    error!("export worker unavailable: {e}");
                    app.lock().await.on_export_failed("Export worker unavailable".to_string());
                }
                return;
            }
        }
        (MenuItem::Bracket, Char('R'), _) => guard.request_reset(),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
