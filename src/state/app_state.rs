use crate::app::MenuItem;
use crate::state::export::LoadingState;
use bracket_core::{MatchId, NodeId, Projection, Session, Slot};

// ---------------------------------------------------------------------------
// Player entry state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct EntryState {
    pub input: String,
}

impl EntryState {
    /// Take the typed name, leaving the input empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }
}

// ---------------------------------------------------------------------------
// Bracket cursor
// ---------------------------------------------------------------------------

/// Selected match: a column (round) and a position within it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BracketCursor {
    pub round: u32,
    pub index: usize,
}

impl BracketCursor {
    /// The match under the cursor. The champion node is never selectable.
    pub fn selected(&self, projection: &Projection) -> Option<MatchId> {
        match projection.column(self.round).get(self.index)?.id {
            NodeId::Match(id) => Some(id),
            NodeId::Champion => None,
        }
    }

    pub fn next_round(&mut self, projection: &Projection) {
        if self.column_len(projection, self.round + 1) > 0 {
            self.round += 1;
            self.clamp(projection);
        }
    }

    pub fn prev_round(&mut self, projection: &Projection) {
        if self.round > 0 {
            self.round -= 1;
            self.clamp(projection);
        }
    }

    pub fn down(&mut self, projection: &Projection) {
        let max = self.column_len(projection, self.round).saturating_sub(1);
        if self.index < max {
            self.index += 1;
        }
    }

    pub fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Pull the cursor back inside the bracket after it changed shape.
    pub fn clamp(&mut self, projection: &Projection) {
        while self.round > 0 && self.column_len(projection, self.round) == 0 {
            self.round -= 1;
        }
        let len = self.column_len(projection, self.round);
        self.index = self.index.min(len.saturating_sub(1));
    }

    fn column_len(&self, projection: &Projection, round: u32) -> usize {
        projection
            .column(round)
            .iter()
            .filter(|n| n.interactive)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Slot editor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SlotEditor {
    pub match_id: MatchId,
    pub slot: Slot,
    pub input: String,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub status: Option<StatusLine>,
    pub session: Session,
    pub entry: EntryState,
    pub cursor: BracketCursor,
    pub editor: Option<SlotEditor>,
    pub export: LoadingState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.status = Some(StatusLine {
            kind: StatusKind::Info,
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.status = Some(StatusLine {
            kind: StatusKind::Error,
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket(players: &[&str]) -> Session {
        let mut session = Session::new();
        for p in players {
            session.add_player(p);
        }
        session.start().unwrap();
        session
    }

    #[test]
    fn cursor_selects_first_match_by_default() {
        let session = bracket(&["A", "B", "C", "D"]);
        let projection = session.projection();
        let cursor = BracketCursor::default();
        assert_eq!(cursor.selected(&projection), Some(session.matches()[0].id));
    }

    #[test]
    fn cursor_stays_inside_columns() {
        let session = bracket(&["A", "B", "C", "D"]);
        let projection = session.projection();
        let mut cursor = BracketCursor::default();

        cursor.down(&projection);
        cursor.down(&projection);
        assert_eq!(cursor.index, 1);

        cursor.next_round(&projection);
        assert_eq!(cursor.round, 0, "round 1 does not exist yet");

        cursor.up();
        cursor.up();
        assert_eq!(cursor.index, 0);
    }

    #[test]
    fn cursor_skips_champion_column() {
        let mut session = bracket(&["A", "B"]);
        let id = session.matches()[0].id;
        session.select_winner(id, Slot::P1).unwrap();
        let projection = session.projection();
        assert!(projection.champion_node().is_some());

        let mut cursor = BracketCursor::default();
        cursor.next_round(&projection);
        assert_eq!(cursor.round, 0);
        assert_eq!(cursor.selected(&projection), Some(id));
    }

    #[test]
    fn clamp_recovers_after_reset() {
        let session = bracket(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        let projection = session.projection();
        let mut cursor = BracketCursor { round: 0, index: 3 };
        assert!(cursor.selected(&projection).is_some());

        let empty = Session::new().projection();
        cursor.clamp(&empty);
        assert_eq!(cursor, BracketCursor::default());
        assert_eq!(cursor.selected(&empty), None);
    }

    #[test]
    fn entry_input_is_taken_once() {
        let mut entry = EntryState::default();
        entry.input.push_str("Ann");
        assert_eq!(entry.take_input(), "Ann");
        assert!(entry.input.is_empty());
    }
}
