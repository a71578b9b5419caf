pub mod advancer;
pub mod builder;
pub mod layout;
pub mod session;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use advancer::{advance, rounds_to_decide, should_advance};
pub use builder::{normalize_name, seed, shuffle};
pub use layout::{Edge, LayoutConfig, NodeId, PositionedNode, Projection, champion, is_complete, project, project_with};
pub use session::{CaptureGuard, Phase, SelectOutcome, Session};

// ---------------------------------------------------------------------------
// Domain types: plain records, no presentation data
// ---------------------------------------------------------------------------

/// Unique match identifier. Never reused within one tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 hex digits, enough to tell matches apart on screen.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who sits in a match slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Occupant {
    Named(String),
    /// Padding for an odd-sized field.
    Bye,
    /// Source match has no winner yet.
    Pending,
}

impl Occupant {
    pub fn named(name: impl Into<String>) -> Self {
        Occupant::Named(name.into())
    }

    pub fn label(&self) -> &str {
        match self {
            Occupant::Named(name) => name,
            Occupant::Bye => "BYE",
            Occupant::Pending => "TBD",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Occupant::Pending)
    }

    pub fn is_placeholder(&self) -> bool {
        !matches!(self, Occupant::Named(_))
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    P1,
    P2,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::P1 => 0,
            Slot::P2 => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Slot::P1),
            1 => Some(Slot::P2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub p1: Occupant,
    pub p2: Occupant,
    pub winner: Option<Occupant>,
    /// Slot the winner was picked from. Players may share a name, so this,
    /// not the occupant value, says which side won.
    #[serde(default)]
    pub winner_slot: Option<Slot>,
    pub round: u32,
    /// Matches whose winners feed `p1` (index 0) and `p2` (index 1).
    /// Empty in round 0; a single entry when the source round was odd-sized.
    pub parents: Vec<MatchId>,
}

impl Match {
    pub fn new(p1: Occupant, p2: Occupant, round: u32, parents: Vec<MatchId>) -> Self {
        Self {
            id: MatchId::new(),
            p1,
            p2,
            winner: None,
            winner_slot: None,
            round,
            parents,
        }
    }

    pub fn occupant(&self, slot: Slot) -> &Occupant {
        match slot {
            Slot::P1 => &self.p1,
            Slot::P2 => &self.p2,
        }
    }

    pub fn occupant_mut(&mut self, slot: Slot) -> &mut Occupant {
        match slot {
            Slot::P1 => &mut self.p1,
            Slot::P2 => &mut self.p2,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Record the occupant of `slot` as the winner.
    pub fn decide(&mut self, slot: Slot) {
        self.winner = Some(self.occupant(slot).clone());
        self.winner_slot = Some(slot);
    }

    pub fn clear_winner(&mut self) {
        self.winner = None;
        self.winner_slot = None;
    }

    /// The slot this match's parent feeds, if `parent` is one of its parents.
    pub fn slot_fed_by(&self, parent: MatchId) -> Option<Slot> {
        self.parents
            .iter()
            .position(|p| *p == parent)
            .and_then(Slot::from_index)
    }
}

/// Highest round present, `None` for an empty collection.
pub fn max_round(matches: &[Match]) -> Option<u32> {
    matches.iter().map(|m| m.round).max()
}

/// Matches of one round, in collection order.
pub fn round_matches(matches: &[Match], round: u32) -> Vec<&Match> {
    matches.iter().filter(|m| m.round == round).collect()
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    UnknownMatch(MatchId),
    SlotPending(MatchId),
    ReadOnly,
    CaptureInProgress,
    NotEnoughPlayers(usize),
    AlreadyStarted,
    NotStarted,
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::UnknownMatch(id) => write!(f, "No match with id {id}"),
            BracketError::SlotPending(id) => {
                write!(f, "Match {} slot is still pending", id.short())
            }
            BracketError::ReadOnly => write!(f, "Bracket is read-only while an export runs"),
            BracketError::CaptureInProgress => write!(f, "An export is already running"),
            BracketError::NotEnoughPlayers(n) => {
                write!(f, "Need at least 2 players to start, have {n}")
            }
            BracketError::AlreadyStarted => write!(f, "Tournament already started"),
            BracketError::NotStarted => write!(f, "Tournament has not started"),
        }
    }
}

impl std::error::Error for BracketError {}
