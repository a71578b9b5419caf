use crate::advancer::{advance, should_advance};
use crate::builder::{normalize_name, seed, shuffle};
use crate::layout::{Projection, project};
use crate::{BracketError, Match, MatchId, Occupant, Slot, round_matches};
use log::{debug, info};
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Entry,
    Bracket,
}

/// What a winner selection did to the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Decided,
    /// The selected slot was already the winner; the pick was withdrawn.
    Cleared,
    /// The selection completed its round and this round was generated.
    RoundAdded(u32),
}

// ---------------------------------------------------------------------------
// Capture flag
// ---------------------------------------------------------------------------

/// Holds the session read-only while an export captures the bracket.
/// Dropping the guard releases the flag, whatever path the export took.
#[derive(Debug)]
pub struct CaptureGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        debug!("capture flag released");
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One tournament run: the entry list, every match generated so far, and
/// the UI gates (capture flag, pending reset).
#[derive(Debug, Default)]
pub struct Session {
    players: Vec<String>,
    matches: Vec<Match>,
    phase: Phase,
    reset_pending: bool,
    capturing: Arc<AtomicBool>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn find(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn projection(&self) -> Projection {
        project(&self.matches)
    }

    pub fn champion(&self) -> Option<&Occupant> {
        crate::layout::champion(&self.matches)
    }

    // -----------------------------------------------------------------------
    // Entry phase
    // -----------------------------------------------------------------------

    /// Add an entrant. Blank input and entries after the start are ignored.
    pub fn add_player(&mut self, raw: &str) -> bool {
        if self.phase != Phase::Entry {
            return false;
        }
        let Some(name) = normalize_name(raw) else {
            return false;
        };
        debug!("added player {name}");
        self.players.push(name);
        true
    }

    pub fn remove_last_player(&mut self) -> Option<String> {
        if self.phase != Phase::Entry {
            return None;
        }
        self.players.pop()
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.phase == Phase::Entry {
            shuffle(&mut self.players, rng);
        }
    }

    pub fn can_start(&self) -> bool {
        self.phase == Phase::Entry && self.players.len() >= 2
    }

    pub fn start(&mut self) -> Result<(), BracketError> {
        if self.phase != Phase::Entry {
            return Err(BracketError::AlreadyStarted);
        }
        if self.players.len() < 2 {
            return Err(BracketError::NotEnoughPlayers(self.players.len()));
        }
        self.matches = seed(&self.players);
        self.phase = Phase::Bracket;
        info!(
            "tournament started: {} players, {} first-round matches",
            self.players.len(),
            self.matches.len()
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bracket phase
    // -----------------------------------------------------------------------

    /// Pick the occupant of `slot` as the winner of `id`, or withdraw the pick
    /// if that slot already won.
    ///
    /// Downstream slots fed by this match are rewritten in the same call, and
    /// the next round is generated when this selection completes its round.
    pub fn select_winner(&mut self, id: MatchId, slot: Slot) -> Result<SelectOutcome, BracketError> {
        self.ensure_writable()?;
        if self.phase != Phase::Bracket {
            return Err(BracketError::NotStarted);
        }
        let m = self
            .matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(BracketError::UnknownMatch(id))?;

        let occupant = m.occupant(slot).clone();
        if occupant.is_pending() {
            return Err(BracketError::SlotPending(id));
        }

        let round = m.round;
        let outcome = if m.winner_slot == Some(slot) {
            m.clear_winner();
            debug!("cleared winner of {}", id.short());
            SelectOutcome::Cleared
        } else {
            debug!("{occupant} wins {}", id.short());
            m.decide(slot);
            SelectOutcome::Decided
        };

        self.retract_from(id);

        if outcome == SelectOutcome::Decided && should_advance(&self.matches, round) {
            let current: Vec<Match> = round_matches(&self.matches, round)
                .into_iter()
                .cloned()
                .collect();
            let next = advance(&current);
            info!("round {} complete, {} matches in round {}", round, next.len(), round + 1);
            self.matches.extend(next);
            return Ok(SelectOutcome::RoundAdded(round + 1));
        }
        Ok(outcome)
    }

    /// Rewrite the slot each already-generated child derives from its parent.
    ///
    /// When the child's own winner came from the rewritten slot, or the slot
    /// went back to pending, that winner is withdrawn too and the rewrite continues
    /// one round further.
    fn retract_from(&mut self, id: MatchId) {
        let mut parent = id;
        loop {
            let Some(value) = self
                .find(parent)
                .map(|m| m.winner.clone().unwrap_or(Occupant::Pending))
            else {
                return;
            };
            let Some(child) = self
                .matches
                .iter_mut()
                .find(|m| m.slot_fed_by(parent).is_some())
            else {
                return;
            };
            let Some(slot) = child.slot_fed_by(parent) else {
                return;
            };

            let previous = std::mem::replace(child.occupant_mut(slot), value);
            if *child.occupant(slot) == previous {
                return;
            }
            debug!("match {} slot {:?}: {previous} -> {}", child.id.short(), slot, child.occupant(slot));

            let voided = child.winner_slot == Some(slot)
                || (child.is_decided() && child.occupant(slot).is_pending());
            if !voided {
                return;
            }
            child.clear_winner();
            parent = child.id;
        }
    }

    /// Replace the text of one slot, typically to name a bye. Blank input is
    /// ignored. A stored winner is left as is even if it no longer matches.
    pub fn edit_slot(&mut self, id: MatchId, slot: Slot, raw: &str) -> Result<bool, BracketError> {
        self.ensure_writable()?;
        let m = self
            .matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(BracketError::UnknownMatch(id))?;
        let Some(name) = normalize_name(raw) else {
            return Ok(false);
        };
        debug!("renamed {} slot {:?} to {name}", id.short(), slot);
        *m.occupant_mut(slot) = Occupant::Named(name);
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Capture flag
    // -----------------------------------------------------------------------

    pub fn is_read_only(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    /// Freeze slot editing until the returned guard is dropped.
    pub fn begin_capture(&self) -> Result<CaptureGuard, BracketError> {
        self.capturing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| BracketError::CaptureInProgress)?;
        debug!("capture flag set");
        Ok(CaptureGuard {
            flag: Arc::clone(&self.capturing),
        })
    }

    fn ensure_writable(&self) -> Result<(), BracketError> {
        if self.is_read_only() {
            Err(BracketError::ReadOnly)
        } else {
            Ok(())
        }
    }

    // -----------------------------------------------------------------------
    // Two-phase reset
    // -----------------------------------------------------------------------

    pub fn request_reset(&mut self) -> Result<(), BracketError> {
        self.ensure_writable()?;
        self.reset_pending = true;
        Ok(())
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    pub fn cancel_reset(&mut self) {
        self.reset_pending = false;
    }

    /// Discard the tournament if a reset was requested. Returns whether it did.
    pub fn confirm_reset(&mut self) -> bool {
        if !self.reset_pending || self.is_read_only() {
            return false;
        }
        info!("tournament reset, {} matches discarded", self.matches.len());
        self.players.clear();
        self.matches.clear();
        self.phase = Phase::Entry;
        self.reset_pending = false;
        true
    }
}
