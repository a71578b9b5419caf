use crate::{Match, Occupant};
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

/// Build round 0 from an ordered entry list.
///
/// The field is padded with [`Occupant::Bye`] until even, then paired in
/// input order: (0,1), (2,3), … No shuffling happens here; randomize the
/// list with [`shuffle`] first if needed. Fewer than two entries are not
/// rejected; the caller gates the start action.
pub fn seed<S: AsRef<str>>(players: &[S]) -> Vec<Match> {
    let mut field: Vec<Occupant> = players
        .iter()
        .map(|p| Occupant::named(p.as_ref()))
        .collect();
    while field.len() % 2 != 0 {
        field.push(Occupant::Bye);
    }

    let matches: Vec<Match> = field
        .chunks_exact(2)
        .map(|pair| Match::new(pair[0].clone(), pair[1].clone(), 0, Vec::new()))
        .collect();
    debug!("seeded {} players into {} matches", players.len(), matches.len());
    matches
}

/// Trim a raw entry. Empty or whitespace-only input yields `None`.
pub fn normalize_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

pub fn shuffle<R: Rng + ?Sized>(players: &mut [String], rng: &mut R) {
    players.shuffle(rng);
}
