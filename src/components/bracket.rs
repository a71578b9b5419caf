use bracket_core::{Match, MatchId, NodeId, Occupant, Projection, Slot};
use std::collections::HashMap;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per match cell: p1 line, status line, p2 line.
pub const GAME_HEIGHT: u16 = 3;

/// Rows between the centers of neighbouring cells in one column.
const ROW_STRIDE: u16 = GAME_HEIGHT + 1;

/// Width of the connector zone drawn between adjacent round columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Maximum cell width in wider terminals, and the width used for exports.
const CELL_W_FULL: u16 = 22;

/// Below this names become unreadable; the grid scrolls instead.
const CELL_W_MIN: u16 = 12;

const WINNER_MARK: char = '✓';

// ---------------------------------------------------------------------------
// GameCell / BracketGrid: projection mapped onto terminal cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GameCell {
    pub node: NodeId,
    /// Row of the status line (center of the 3-row cell), grid-relative.
    pub center_row: u16,
    /// Starting x-column, grid-relative.
    pub col: u16,
}

/// Terminal placement of a [`Projection`].
///
/// Columns follow node rounds; rows follow node heights, one layout unit
/// per [`ROW_STRIDE`] rows, so the projection's centering carries over.
#[derive(Debug, Clone, Default)]
pub struct BracketGrid {
    pub cells: Vec<GameCell>,
    pub cell_width: u16,
    pub total_width: u16,
    pub total_height: u16,
}

impl BracketGrid {
    /// Fit the grid to `terminal_width`, never narrower than [`CELL_W_MIN`].
    pub fn compute(projection: &Projection, terminal_width: u16) -> Self {
        let columns = projection.column_count().max(1) as u16;
        let connector_total = CONNECTOR_WIDTH * (columns - 1);
        let per_col = terminal_width.saturating_sub(connector_total) / columns;
        Self::with_cell_width(projection, per_col.clamp(CELL_W_MIN, CELL_W_FULL))
    }

    /// Full-width cells regardless of screen size, for captures.
    pub fn compute_full(projection: &Projection) -> Self {
        Self::with_cell_width(projection, CELL_W_FULL)
    }

    fn with_cell_width(projection: &Projection, cell_width: u16) -> Self {
        let stride = cell_width + CONNECTOR_WIDTH;
        let min_y = projection
            .nodes
            .iter()
            .map(|n| n.y)
            .fold(f32::INFINITY, f32::min);

        let cells: Vec<GameCell> = projection
            .nodes
            .iter()
            .map(|n| GameCell {
                node: n.id,
                center_row: 1 + ((n.y - min_y) * f32::from(ROW_STRIDE)).round() as u16,
                col: n.round as u16 * stride,
            })
            .collect();

        let total_width = cells
            .iter()
            .map(|c| c.col + cell_width)
            .max()
            .unwrap_or(0);
        let total_height = cells
            .iter()
            .map(|c| c.center_row + 2)
            .max()
            .unwrap_or(0);

        Self { cells, cell_width, total_width, total_height }
    }

    pub fn cell(&self, node: NodeId) -> Option<&GameCell> {
        self.cells.iter().find(|c| c.node == node)
    }

    /// Smallest scroll offsets (x, y) that keep `node` fully inside `area`.
    pub fn scroll_for(&self, node: Option<NodeId>, area: Rect) -> (u16, u16) {
        let Some(cell) = node.and_then(|n| self.cell(n)) else {
            return (0, 0);
        };
        let x = (cell.col + self.cell_width).saturating_sub(area.width);
        let y = (cell.center_row + 2).saturating_sub(area.height);
        (x, y)
    }
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

/// Renders every round of the bracket plus the champion leaf.
pub struct BracketView<'a> {
    pub matches: &'a [Match],
    pub projection: &'a Projection,
    /// Pre-computed layout. Rebuild whenever the projection changes.
    pub grid: &'a BracketGrid,
    /// Highlighted match. `None` while capturing: nothing is interactive.
    pub selected: Option<MatchId>,
    pub scroll_x: u16,
    pub scroll_y: u16,
}

impl<'a> Widget for BracketView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let view = Viewport { area, scroll_x: self.scroll_x, scroll_y: self.scroll_y };
        let by_id: HashMap<MatchId, &Match> = self.matches.iter().map(|m| (m.id, m)).collect();

        // Pass 1: cells
        for cell in &self.grid.cells {
            match cell.node {
                NodeId::Match(id) => {
                    let selected = self.selected == Some(id);
                    draw_match_cell(by_id.get(&id).copied(), cell, self.grid.cell_width, selected, view, buf);
                }
                NodeId::Champion => {
                    let label = self
                        .projection
                        .champion_node()
                        .map(|n| n.label.as_str())
                        .unwrap_or_default();
                    draw_champion_cell(label, cell, self.grid.cell_width, view, buf);
                }
            }
        }

        // Pass 2: connectors, one fan-in per child
        let mut feeds: HashMap<NodeId, Vec<u16>> = HashMap::new();
        for edge in &self.projection.edges {
            if let Some(parent) = self.grid.cell(edge.source) {
                feeds.entry(edge.target).or_default().push(parent.center_row);
            }
        }

        let mut junctions: HashMap<(u16, u16), Arms> = HashMap::new();
        for (target, parent_rows) in &feeds {
            let Some(child) = self.grid.cell(*target) else {
                continue;
            };
            let conn_x = child.col.saturating_sub(CONNECTOR_WIDTH);
            collect_connector(parent_rows, child.center_row, conn_x, &mut junctions);
        }

        let style = Style::default().fg(Color::DarkGray);
        for ((x, row), arms) in junctions {
            view.put_char(buf, x, row, arms.glyph(), style);
        }
    }
}

/// Render the bracket off-screen at full cell width, one string per row.
pub fn capture_lines(matches: &[Match], projection: &Projection) -> Vec<String> {
    let grid = BracketGrid::compute_full(projection);
    if grid.cells.is_empty() {
        return Vec::new();
    }
    let area = Rect::new(0, 0, grid.total_width, grid.total_height);
    let mut buf = Buffer::empty(area);
    BracketView {
        matches,
        projection,
        grid: &grid,
        selected: None,
        scroll_x: 0,
        scroll_y: 0,
    }
    .render(area, &mut buf);

    (0..area.height)
        .map(|y| {
            let row: String = (0..area.width).map(|x| buf[(x, y)].symbol()).collect();
            row.trim_end().to_string()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Shared drawing helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Viewport {
    area: Rect,
    scroll_x: u16,
    scroll_y: u16,
}

impl Viewport {
    /// Grid position to absolute screen position, `None` when off-screen.
    fn screen(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        if col < self.scroll_x || row < self.scroll_y {
            return None;
        }
        let (rel_x, rel_y) = (col - self.scroll_x, row - self.scroll_y);
        if rel_x >= self.area.width || rel_y >= self.area.height {
            return None;
        }
        Some((self.area.x + rel_x, self.area.y + rel_y))
    }

    fn put_str(&self, buf: &mut Buffer, col: u16, row: u16, text: &str, style: Style) {
        if row < self.scroll_y || row - self.scroll_y >= self.area.height {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            self.put_char(buf, col + i as u16, row, ch, style);
        }
    }

    fn put_char(&self, buf: &mut Buffer, col: u16, row: u16, ch: char, style: Style) {
        if let Some((x, y)) = self.screen(col, row)
            && let Some(cell) = buf.cell_mut((x, y))
        {
            cell.set_char(ch);
            cell.set_style(style);
        }
    }
}

fn draw_match_cell(
    game: Option<&Match>,
    cell: &GameCell,
    width: u16,
    selected: bool,
    view: Viewport,
    buf: &mut Buffer,
) {
    let Some(game) = game else {
        return;
    };
    let base_style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let winner_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let placeholder_style = Style::default().fg(Color::DarkGray);

    let width = width as usize;
    for (row, slot) in [(cell.center_row - 1, Slot::P1), (cell.center_row + 1, Slot::P2)] {
        let occupant = game.occupant(slot);
        let is_winner = game.winner_slot == Some(slot);
        let style = if is_winner {
            winner_style
        } else if occupant.is_placeholder() {
            placeholder_style
        } else {
            base_style
        };
        view.put_str(buf, cell.col, row, &format_slot_line(occupant, is_winner, width), style);
    }

    let status_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        placeholder_style
    };
    view.put_str(buf, cell.col, cell.center_row, &format_status_line(game, selected, width), status_style);
}

fn draw_champion_cell(label: &str, cell: &GameCell, width: u16, view: Viewport, buf: &mut Buffer) {
    let width = width as usize;
    let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    view.put_str(buf, cell.col, cell.center_row - 1, &pad(" CHAMPION", width), style);
    view.put_str(buf, cell.col, cell.center_row, &pad(&format!(" ★ {label}"), width), style);
}

/// `"✓ name        "`: mark column, space, name padded to the cell width.
fn format_slot_line(occupant: &Occupant, is_winner: bool, width: usize) -> String {
    let mark = if is_winner { WINNER_MARK } else { ' ' };
    pad(&format!("{mark} {}", occupant.label()), width)
}

fn format_status_line(game: &Match, selected: bool, width: usize) -> String {
    let state = if game.is_decided() {
        "FINAL"
    } else if game.p1.is_pending() || game.p2.is_pending() {
        "waiting"
    } else {
        "open"
    };
    let marker = if selected { '▶' } else { '─' };
    pad(&format!("{marker} R{} {state}", game.round + 1), width)
}

fn pad(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{clipped:<width$}")
}

/// Which directions a connector glyph reaches out to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Arms {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Arms {
    fn merge(&mut self, other: Arms) {
        self.up |= other.up;
        self.down |= other.down;
        self.left |= other.left;
        self.right |= other.right;
    }

    fn glyph(self) -> char {
        match (self.up, self.down, self.left, self.right) {
            (true, true, true, true) => '┼',
            (true, true, true, false) => '┤',
            (true, true, false, true) => '├',
            (true, true, false, false) => '│',
            (true, false, true, true) => '┴',
            (false, true, true, true) => '┬',
            (true, false, true, false) => '┘',
            (true, false, false, true) => '└',
            (false, true, true, false) => '┐',
            (false, true, false, true) => '┌',
            (true, false, false, false) | (false, true, false, false) => '│',
            _ => '─',
        }
    }
}

/// Collect the glyphs joining parent rows to one child row.
///
/// ```text
///  parent_a  ─┐
///             │
///             ├─  child
///             │
///  parent_b  ─┘
/// ```
///
/// Glyphs from neighbouring fan-ins merge where they share a position.
fn collect_connector(
    parent_rows: &[u16],
    child_row: u16,
    conn_x: u16,
    junctions: &mut HashMap<(u16, u16), Arms>,
) {
    let col_a = conn_x;
    let col_b = conn_x + 1;
    let col_c = conn_x + 2;

    let top = parent_rows.iter().copied().chain([child_row]).min().unwrap_or(child_row);
    let bot = parent_rows.iter().copied().chain([child_row]).max().unwrap_or(child_row);

    let horizontal = Arms { left: true, right: true, ..Arms::default() };
    for &row in parent_rows {
        junctions.entry((col_a, row)).or_default().merge(horizontal);
    }
    junctions.entry((col_c, child_row)).or_default().merge(horizontal);

    for row in top..=bot {
        let arms = Arms {
            up: row > top,
            down: row < bot,
            left: parent_rows.contains(&row),
            right: row == child_row,
        };
        junctions.entry((col_b, row)).or_default().merge(arms);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_core::Session;

    fn session(players: &[&str]) -> Session {
        let mut session = Session::new();
        for p in players {
            session.add_player(p);
        }
        session.start().unwrap();
        session
    }

    fn decide_all_p1(session: &mut Session) {
        loop {
            let open = session
                .matches()
                .iter()
                .find(|m| !m.is_decided())
                .map(|m| m.id);
            let Some(id) = open else { break };
            session.select_winner(id, Slot::P1).unwrap();
        }
    }

    #[test]
    fn first_round_cells_are_one_stride_apart() {
        let s = session(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        let grid = BracketGrid::compute(&s.projection(), 120);
        let rows: Vec<u16> = grid.cells.iter().map(|c| c.center_row).collect();
        assert_eq!(rows, vec![1, 5, 9, 13]);
        assert_eq!(grid.total_height, 15);
    }

    #[test]
    fn columns_share_a_vertical_center() {
        let mut s = session(&["A", "B", "C", "D"]);
        decide_all_p1(&mut s);
        let projection = s.projection();
        let grid = BracketGrid::compute_full(&projection);

        let final_cell = grid.cell(NodeId::Match(s.matches()[2].id)).unwrap();
        let champion = grid.cell(NodeId::Champion).unwrap();
        assert_eq!(final_cell.center_row, 3);
        assert_eq!(champion.center_row, final_cell.center_row);
        assert_eq!(champion.col, 2 * (CELL_W_FULL + CONNECTOR_WIDTH));
    }

    #[test]
    fn cell_width_is_computed_from_available_width() {
        let s = session(&["A", "B", "C", "D"]);
        let projection = s.projection();
        assert_eq!(BracketGrid::compute(&projection, 18).cell_width, 18);
        assert_eq!(BracketGrid::compute(&projection, 200).cell_width, CELL_W_FULL);
        assert_eq!(BracketGrid::compute(&projection, 5).cell_width, CELL_W_MIN);
    }

    #[test]
    fn scroll_keeps_selected_cell_visible() {
        let players: Vec<String> = (0..16).map(|i| format!("P{i}")).collect();
        let mut s = Session::new();
        for p in &players {
            s.add_player(p);
        }
        s.start().unwrap();
        let projection = s.projection();
        let grid = BracketGrid::compute(&projection, 80);
        let area = Rect::new(0, 0, 80, 10);

        let last = NodeId::Match(s.matches()[7].id);
        let (_, y) = grid.scroll_for(Some(last), area);
        let cell = grid.cell(last).unwrap();
        assert!(cell.center_row - 1 >= y);
        assert!(cell.center_row + 1 < y + area.height);
        assert_eq!(grid.scroll_for(None, area), (0, 0));
    }

    #[test]
    fn capture_draws_names_connectors_and_champion() {
        let mut s = session(&["Ann", "Bob", "Cy", "Dee"]);
        decide_all_p1(&mut s);
        let lines = capture_lines(s.matches(), &s.projection());
        let text = lines.join("\n");

        for name in ["Ann", "Bob", "Cy", "Dee", "CHAMPION", "★ Ann"] {
            assert!(text.contains(name), "missing {name} in\n{text}");
        }
        assert!(text.contains('┐'));
        assert!(text.contains('┘'));
        assert!(text.contains('├'));
        assert!(!text.contains('▶'), "captures never show a selection");
    }

    #[test]
    fn capture_of_empty_bracket_is_empty() {
        assert!(capture_lines(&[], &Projection::default()).is_empty());
    }

    #[test]
    fn connector_joins_two_parents_to_midpoint_child() {
        let mut junctions = HashMap::new();
        collect_connector(&[1, 5], 3, 10, &mut junctions);
        assert_eq!(junctions[&(11, 1)].glyph(), '┐');
        assert_eq!(junctions[&(11, 2)].glyph(), '│');
        assert_eq!(junctions[&(11, 3)].glyph(), '├');
        assert_eq!(junctions[&(11, 5)].glyph(), '┘');
        assert_eq!(junctions[&(10, 1)].glyph(), '─');
        assert_eq!(junctions[&(12, 3)].glyph(), '─');
    }

    #[test]
    fn connector_for_level_parent_is_straight() {
        let mut junctions = HashMap::new();
        collect_connector(&[4], 4, 0, &mut junctions);
        assert_eq!(junctions[&(1, 4)].glyph(), '─');
    }

    #[test]
    fn only_the_picked_namesake_gets_the_mark() {
        let mut s = session(&["Sam", "Sam"]);
        let id = s.matches()[0].id;
        s.select_winner(id, Slot::P2).unwrap();
        let lines = capture_lines(s.matches(), &s.projection());
        let marked: Vec<&String> = lines.iter().filter(|l| l.starts_with(WINNER_MARK)).collect();
        assert_eq!(marked.len(), 1, "{lines:#?}");
        assert_eq!(lines[2].chars().next(), Some(WINNER_MARK));
    }

    #[test]
    fn format_slot_line_fills_width() {
        let line = format_slot_line(&Occupant::named("Maximilian Oberhauser"), true, 14);
        assert_eq!(line.chars().count(), 14, "line: {line:?}");
        assert!(line.starts_with(WINNER_MARK));
        let bye = format_slot_line(&Occupant::Bye, false, 22);
        assert_eq!(bye.trim_end(), "  BYE");
    }
}
