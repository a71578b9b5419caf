use crate::{Match, MatchId, Occupant, max_round, round_matches};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Projection types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Match(MatchId),
    /// Synthetic leaf shown once the final is decided.
    Champion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: NodeId,
    /// Column the node sits in. The champion node takes `final round + 1`.
    pub round: u32,
    pub x: f32,
    pub y: f32,
    pub label: String,
    /// False for the champion node: it never takes winner selections.
    pub interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn champion_node(&self) -> Option<&PositionedNode> {
        self.node(NodeId::Champion)
    }

    /// Nodes of one column, top to bottom.
    pub fn column(&self, round: u32) -> Vec<&PositionedNode> {
        let mut column: Vec<&PositionedNode> =
            self.nodes.iter().filter(|n| n.round == round).collect();
        column.sort_by(|a, b| a.y.total_cmp(&b.y));
        column
    }

    pub fn column_count(&self) -> u32 {
        self.nodes.iter().map(|n| n.round + 1).max().unwrap_or(0)
    }
}

/// Spacing between columns (`horizontal`) and between neighbours in one
/// column (`vertical`), in abstract layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal: 1.0,
            vertical: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

pub fn project(matches: &[Match]) -> Projection {
    project_with(matches, &LayoutConfig::default())
}

/// Position every match and connect parents to children.
///
/// Each round becomes one column at `round * horizontal`; within a column
/// matches keep collection order and the group is centred on `y = 0`. When
/// the bracket is complete a champion node is appended one column to the
/// right of the rightmost nodes, at their mean height.
pub fn project_with(matches: &[Match], config: &LayoutConfig) -> Projection {
    let Some(final_round) = max_round(matches) else {
        return Projection::default();
    };

    let mut nodes = Vec::with_capacity(matches.len() + 1);
    for round in 0..=final_round {
        let column = round_matches(matches, round);
        let x = round as f32 * config.horizontal;
        let mid = (column.len().saturating_sub(1)) as f32 / 2.0;
        for (i, m) in column.into_iter().enumerate() {
            nodes.push(PositionedNode {
                id: NodeId::Match(m.id),
                round,
                x,
                y: (i as f32 - mid) * config.vertical,
                label: match_label(m),
                interactive: true,
            });
        }
    }

    let mut edges: Vec<Edge> = matches
        .iter()
        .flat_map(|m| {
            m.parents.iter().map(move |parent| Edge {
                source: NodeId::Match(*parent),
                target: NodeId::Match(m.id),
            })
        })
        .collect();

    if let Some(final_match) = decided_final(matches, final_round)
        && let Some(winner) = final_match.winner.as_ref()
    {
        let max_x = nodes.iter().map(|n| n.x).fold(f32::MIN, f32::max);
        let rightmost: Vec<f32> = nodes
            .iter()
            .filter(|n| n.x == max_x)
            .map(|n| n.y)
            .collect();
        let y = rightmost.iter().sum::<f32>() / rightmost.len().max(1) as f32;

        nodes.push(PositionedNode {
            id: NodeId::Champion,
            round: final_round + 1,
            x: max_x + config.horizontal,
            y,
            label: winner.label().to_string(),
            interactive: false,
        });
        edges.push(Edge {
            source: NodeId::Match(final_match.id),
            target: NodeId::Champion,
        });
    }

    Projection { nodes, edges }
}

/// A bracket is complete when its highest round holds exactly one match and
/// that match has a winner.
pub fn is_complete(matches: &[Match]) -> bool {
    champion(matches).is_some()
}

pub fn champion(matches: &[Match]) -> Option<&Occupant> {
    let final_round = max_round(matches)?;
    decided_final(matches, final_round)?.winner.as_ref()
}

fn decided_final(matches: &[Match], final_round: u32) -> Option<&Match> {
    match round_matches(matches, final_round).as_slice() {
        [only] if only.is_decided() => Some(*only),
        _ => None,
    }
}

fn match_label(m: &Match) -> String {
    format!("{} vs {}", m.p1.label(), m.p2.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Slot, advance, seed};

    /// Four players, every match decided for p1: A beats B, C beats D, A wins.
    fn resolved_four() -> Vec<Match> {
        let mut matches = seed(&["A", "B", "C", "D"]);
        for m in &mut matches {
            m.decide(Slot::P1);
        }
        let mut final_round = advance(&matches);
        final_round[0].decide(Slot::P1);
        matches.extend(final_round);
        matches
    }

    #[test]
    fn empty_input_projects_nothing() {
        let projection = project(&[]);
        assert!(projection.nodes.is_empty());
        assert!(projection.edges.is_empty());
        assert!(!is_complete(&[]));
    }

    #[test]
    fn resolved_bracket_has_single_champion_node() {
        let matches = resolved_four();
        let projection = project(&matches);

        assert_eq!(projection.nodes.len(), 4);
        let champions: Vec<_> = projection
            .nodes
            .iter()
            .filter(|n| n.id == NodeId::Champion)
            .collect();
        assert_eq!(champions.len(), 1);
        assert_eq!(champions[0].label, "A");
        assert!(!champions[0].interactive);

        let into_champion: Vec<_> = projection
            .edges
            .iter()
            .filter(|e| e.target == NodeId::Champion)
            .collect();
        assert_eq!(into_champion.len(), 1);
        assert_eq!(into_champion[0].source, NodeId::Match(matches[2].id));
    }

    #[test]
    fn clearing_final_winner_removes_champion() {
        let mut matches = resolved_four();
        assert!(project(&matches).champion_node().is_some());

        matches[2].clear_winner();
        let projection = project(&matches);
        assert!(projection.champion_node().is_none());
        assert!(projection.edges.iter().all(|e| e.target != NodeId::Champion));
        assert_eq!(projection, project(&matches));
    }

    #[test]
    fn edges_connect_parents_to_children() {
        let matches = resolved_four();
        let projection = project(&matches);
        let final_id = NodeId::Match(matches[2].id);
        assert!(projection.edges.contains(&Edge {
            source: NodeId::Match(matches[0].id),
            target: final_id,
        }));
        assert!(projection.edges.contains(&Edge {
            source: NodeId::Match(matches[1].id),
            target: final_id,
        }));
        assert_eq!(projection.edges.len(), 3);
    }

    #[test]
    fn columns_are_centered_and_spaced() {
        let matches = seed(&["A", "B", "C", "D", "E", "F"]);
        let config = LayoutConfig {
            horizontal: 10.0,
            vertical: 4.0,
        };
        let projection = project_with(&matches, &config);
        let ys: Vec<f32> = projection.nodes.iter().map(|n| n.y).collect();
        assert_eq!(ys, vec![-4.0, 0.0, 4.0]);
        assert!(projection.nodes.iter().all(|n| n.x == 0.0));
    }

    #[test]
    fn champion_sits_right_of_final_at_its_height() {
        let matches = resolved_four();
        let config = LayoutConfig {
            horizontal: 8.0,
            vertical: 2.0,
        };
        let projection = project_with(&matches, &config);
        let final_node = projection.node(NodeId::Match(matches[2].id)).unwrap();
        let champion = projection.champion_node().unwrap();
        assert_eq!(final_node.x, 8.0);
        assert_eq!(champion.x, 16.0);
        assert_eq!(champion.y, final_node.y);
        assert_eq!(champion.round, 2);
    }

    #[test]
    fn undecided_final_is_not_complete() {
        let mut matches = resolved_four();
        matches[2].clear_winner();
        assert!(!is_complete(&matches));
        assert_eq!(champion(&matches), None);
    }

    #[test]
    fn lone_decided_round_zero_match_is_complete() {
        let mut matches = seed(&["A", "B"]);
        matches[0].decide(Slot::P2);
        assert!(is_complete(&matches));
        let projection = project(&matches);
        assert_eq!(projection.champion_node().map(|n| n.label.as_str()), Some("B"));
    }

    #[test]
    fn pending_round_has_no_champion() {
        let mut matches = seed(&["A", "B", "C", "D"]);
        for m in &mut matches {
            m.decide(Slot::P2);
        }
        let next = advance(&matches);
        matches.extend(next);
        assert!(!is_complete(&matches));
        assert_eq!(project(&matches).column_count(), 2);
    }
}
