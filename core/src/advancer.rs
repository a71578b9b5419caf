use crate::{Match, Occupant, round_matches};
use log::debug;

/// Build the next round from one completed round.
///
/// Matches are paired by position. Each pair feeds one new match at
/// `round + 1` whose slots hold the pair's winners; an undecided source or a
/// missing partner (odd-sized round) leaves the slot [`Occupant::Pending`].
pub fn advance(current: &[Match]) -> Vec<Match> {
    let next: Vec<Match> = current
        .chunks(2)
        .map(|pair| {
            let m1 = &pair[0];
            let m2 = pair.get(1);

            let p1 = m1.winner.clone().unwrap_or(Occupant::Pending);
            let p2 = m2
                .and_then(|m| m.winner.clone())
                .unwrap_or(Occupant::Pending);

            let mut parents = vec![m1.id];
            parents.extend(m2.map(|m| m.id));

            Match::new(p1, p2, m1.round + 1, parents)
        })
        .collect();

    if let Some(first) = next.first() {
        debug!("advanced {} matches into round {}", current.len(), first.round);
    }
    next
}

/// Whether a winner selection in `round` should append the next round.
///
/// All matches of the round must be decided, the next round must not exist
/// yet, and the round must hold more than one match. A lone decided match
/// is the final.
pub fn should_advance(matches: &[Match], round: u32) -> bool {
    let current = round_matches(matches, round);
    current.len() > 1
        && current.iter().all(|m| m.is_decided())
        && !matches.iter().any(|m| m.round == round + 1)
}

/// Rounds a bracket of `entrants` needs: `ceil(log2(n))`.
pub fn rounds_to_decide(entrants: usize) -> u32 {
    if entrants < 2 {
        return 0;
    }
    usize::BITS - (entrants - 1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchId, Slot, seed};

    fn decided(p1: &str, p2: &str, winner: &str, round: u32) -> Match {
        let mut m = Match::new(Occupant::named(p1), Occupant::named(p2), round, Vec::new());
        m.decide(if winner == p1 { Slot::P1 } else { Slot::P2 });
        m
    }

    #[test]
    fn advance_two_winners_into_one_match() {
        let m1 = decided("A", "X", "A", 0);
        let m2 = decided("Y", "B", "B", 0);
        let next = advance(&[m1.clone(), m2.clone()]);

        assert_eq!(next.len(), 1);
        let m = &next[0];
        assert_eq!(m.p1, Occupant::named("A"));
        assert_eq!(m.p2, Occupant::named("B"));
        assert_eq!(m.round, 1);
        assert_eq!(m.parents, vec![m1.id, m2.id]);
        assert!(m.winner.is_none());
        assert_ne!(m.id, m1.id);
        assert_ne!(m.id, m2.id);
    }

    #[test]
    fn advance_halves_round_rounding_up() {
        for k in 1..=17usize {
            let current: Vec<Match> = (0..k)
                .map(|i| decided(&format!("a{i}"), &format!("b{i}"), &format!("a{i}"), 2))
                .collect();
            let next = advance(&current);
            assert_eq!(next.len(), k.div_ceil(2), "k={k}");
            for (j, m) in next.iter().enumerate() {
                assert_eq!(m.round, 3);
                let expected: Vec<MatchId> =
                    current[2 * j..(2 * j + 2).min(k)].iter().map(|c| c.id).collect();
                assert_eq!(m.parents, expected);
            }
        }
    }

    #[test]
    fn unpaired_trailing_match_leaves_pending_slot() {
        let current = vec![
            decided("A", "B", "A", 0),
            decided("C", "D", "D", 0),
            decided("E", "F", "E", 0),
        ];
        let next = advance(&current);
        assert_eq!(next.len(), 2);
        assert_eq!(next[1].p1, Occupant::named("E"));
        assert_eq!(next[1].p2, Occupant::Pending);
        assert_eq!(next[1].parents, vec![current[2].id]);
    }

    #[test]
    fn undecided_source_becomes_pending() {
        let undecided = Match::new(Occupant::named("A"), Occupant::named("B"), 0, Vec::new());
        let next = advance(&[undecided, decided("C", "D", "C", 0)]);
        assert_eq!(next[0].p1, Occupant::Pending);
        assert_eq!(next[0].p2, Occupant::named("C"));
    }

    #[test]
    fn advance_of_empty_round_is_empty() {
        assert!(advance(&[]).is_empty());
    }

    #[test]
    fn should_advance_requires_every_winner() {
        let mut matches = vec![decided("A", "B", "A", 0), decided("C", "D", "C", 0)];
        assert!(should_advance(&matches, 0));
        matches[1].clear_winner();
        assert!(!should_advance(&matches, 0));
    }

    #[test]
    fn should_advance_never_fires_for_lone_match() {
        let matches = vec![decided("A", "B", "A", 0)];
        assert!(!should_advance(&matches, 0));
    }

    #[test]
    fn should_advance_skips_existing_next_round() {
        let mut matches = vec![decided("A", "B", "A", 0), decided("C", "D", "C", 0)];
        let next = advance(&matches);
        matches.extend(next);
        assert!(!should_advance(&matches, 0));
    }

    #[test]
    fn rounds_to_decide_is_ceil_log2() {
        assert_eq!(rounds_to_decide(0), 0);
        assert_eq!(rounds_to_decide(1), 0);
        assert_eq!(rounds_to_decide(2), 1);
        assert_eq!(rounds_to_decide(3), 2);
        assert_eq!(rounds_to_decide(4), 2);
        assert_eq!(rounds_to_decide(5), 3);
        assert_eq!(rounds_to_decide(9), 4);
        assert_eq!(rounds_to_decide(16), 4);
        assert_eq!(rounds_to_decide(17), 5);
    }

    #[test]
    fn repeated_advancement_terminates_in_log2_rounds() {
        for n in 2..=40usize {
            let players: Vec<String> = (0..n).map(|i| format!("P{i}")).collect();
            let mut round = seed(&players);
            let mut rounds = 1u32;
            while round.len() > 1 {
                for m in &mut round {
                    m.decide(Slot::P1);
                }
                round = advance(&round);
                rounds += 1;
            }
            assert_eq!(rounds, rounds_to_decide(n), "n={n}");
        }
    }
}
