use crate::components::bracket::capture_lines;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, BracketCursor, EntryState, SlotEditor};
use crate::state::export::{self, LoadingState};
use crate::state::messages::ExportRequest;
use bracket_core::{MatchId, Occupant, Phase, SelectOutcome, Slot};
use chrono::Local;
use log::{info, warn};
use std::path::Path;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Players,
    Bracket,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn with_settings(settings: AppSettings) -> Self {
        log::set_max_level(settings.log_level);
        Self {
            state: AppState::new(),
            settings,
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.editor = None;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Player entry
    // -----------------------------------------------------------------------

    pub fn entry_push(&mut self, c: char) {
        self.state.entry.input.push(c);
    }

    pub fn entry_backspace(&mut self) {
        self.state.entry.input.pop();
    }

    /// Blank names are dropped without a message.
    pub fn submit_player(&mut self) {
        let raw = self.state.entry.take_input();
        if self.state.session.add_player(&raw) {
            let count = self.state.session.players().len();
            self.state.info(format!("{} players entered", count));
        }
    }

    pub fn remove_last_player(&mut self) {
        if let Some(name) = self.state.session.remove_last_player() {
            self.state.info(format!("Removed {name}"));
        }
    }

    pub fn randomize_players(&mut self) {
        if self.state.session.phase() != Phase::Entry {
            return;
        }
        self.state.session.randomize(&mut rand::thread_rng());
        self.state.info("Player order shuffled");
    }

    pub fn start_tournament(&mut self) {
        match self.state.session.start() {
            Ok(()) => {
                self.state.cursor = BracketCursor::default();
                self.update_tab(MenuItem::Bracket);
                let rounds = bracket_core::rounds_to_decide(self.state.session.players().len());
                self.state.info(format!("Bracket ready: {rounds} rounds to a champion"));
            }
            Err(e) => {
                warn!("start rejected: {e}");
                self.state.error(e.to_string());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Bracket navigation and picks
    // -----------------------------------------------------------------------

    pub fn bracket_next_round(&mut self) {
        let projection = self.state.session.projection();
        self.state.cursor.next_round(&projection);
    }

    pub fn bracket_prev_round(&mut self) {
        let projection = self.state.session.projection();
        self.state.cursor.prev_round(&projection);
    }

    pub fn bracket_game_down(&mut self) {
        let projection = self.state.session.projection();
        self.state.cursor.down(&projection);
    }

    pub fn bracket_game_up(&mut self) {
        self.state.cursor.up();
    }

    pub fn selected_match(&self) -> Option<MatchId> {
        self.state.cursor.selected(&self.state.session.projection())
    }

    /// Toggle the occupant of `slot` as winner of the selected match.
    /// Advancement, if any, happens inside this call.
    pub fn pick_winner(&mut self, slot: Slot) {
        let Some(id) = self.selected_match() else {
            return;
        };
        match self.state.session.select_winner(id, slot) {
            Ok(SelectOutcome::RoundAdded(round)) => {
                self.state.info(format!("Round {} is set", round + 1));
            }
            Ok(SelectOutcome::Decided) => match self.state.session.champion() {
                Some(champion) => {
                    let message = format!("{champion} wins the tournament!");
                    info!("{message}");
                    self.state.info(message);
                }
                None => self.state.status = None,
            },
            Ok(SelectOutcome::Cleared) => self.state.info("Pick withdrawn"),
            Err(e) => {
                warn!("pick rejected: {e}");
                self.state.error(e.to_string());
            }
        }
        let projection = self.state.session.projection();
        self.state.cursor.clamp(&projection);
    }

    pub fn begin_edit(&mut self, slot: Slot) {
        if self.state.session.is_read_only() {
            self.state.error(bracket_core::BracketError::ReadOnly.to_string());
            return;
        }
        let Some(id) = self.selected_match() else {
            return;
        };
        let input = match self.state.session.find(id).map(|m| m.occupant(slot)) {
            Some(Occupant::Named(name)) => name.clone(),
            _ => String::new(),
        };
        self.state.editor = Some(SlotEditor { match_id: id, slot, input });
    }

    pub fn editor_push(&mut self, c: char) {
        if let Some(editor) = self.state.editor.as_mut() {
            editor.input.push(c);
        }
    }

    pub fn editor_backspace(&mut self) {
        if let Some(editor) = self.state.editor.as_mut() {
            editor.input.pop();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.state.editor = None;
    }

    pub fn commit_edit(&mut self) {
        let Some(editor) = self.state.editor.take() else {
            return;
        };
        match self
            .state
            .session
            .edit_slot(editor.match_id, editor.slot, &editor.input)
        {
            Ok(true) => self.state.info(format!("Slot renamed to {}", editor.input.trim())),
            Ok(false) => {}
            Err(e) => {
                warn!("edit rejected: {e}");
                self.state.error(e.to_string());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    pub fn prepare_export(&mut self) -> Option<ExportRequest> {
        self.prepare_export_with(|key| std::env::var(key).ok())
    }

    /// Freeze the bracket and capture it. Returns `None`, with a status
    /// message, when there is nothing to export or the export is declined.
    pub fn prepare_export_with(
        &mut self,
        locale: impl Fn(&str) -> Option<String>,
    ) -> Option<ExportRequest> {
        if self.state.session.phase() != Phase::Bracket {
            self.state.error("Nothing to export yet: start the tournament first");
            return None;
        }
        if let Err(e) = export::capture_supported(locale) {
            warn!("{e}");
            self.state.error(e.to_string());
            return None;
        }
        let guard = match self.state.session.begin_capture() {
            Ok(guard) => guard,
            Err(e) => {
                self.state.error(e.to_string());
                return None;
            }
        };
        self.state.editor = None;

        let session = &self.state.session;
        let capture = capture_lines(session.matches(), &session.projection());
        let request = ExportRequest {
            guard,
            capture,
            matches: session.matches().to_vec(),
            champion: session.champion().map(|c| c.label().to_string()),
            dir: self.settings.export_dir.clone(),
            header: self.settings.export_header.clone(),
            file_stem: export::file_stem(Local::now()),
        };
        info!("exporting bracket as {}", request.file_stem);
        self.state.info("Exporting bracket...");
        Some(request)
    }

    pub fn on_export_loading(&mut self, loading_state: LoadingState) {
        self.state.export = loading_state;
    }

    pub fn on_export_finished(&mut self, capture_path: &Path, data_path: &Path) {
        self.state.info(format!(
            "Exported {} and {}",
            capture_path.display(),
            data_path.display()
        ));
    }

    pub fn on_export_failed(&mut self, message: String) {
        self.state.error(message);
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    pub fn request_reset(&mut self) {
        if let Err(e) = self.state.session.request_reset() {
            self.state.error(e.to_string());
        }
    }

    pub fn cancel_reset(&mut self) {
        self.state.session.cancel_reset();
        self.state.info("Reset cancelled");
    }

    pub fn confirm_reset(&mut self) {
        if self.state.session.confirm_reset() {
            self.state.cursor = BracketCursor::default();
            self.state.editor = None;
            self.state.entry = EntryState::default();
            self.update_tab(MenuItem::Players);
            self.state.info("Tournament reset");
        }
    }
}
