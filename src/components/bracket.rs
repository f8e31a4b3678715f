use edusports_api::{Bracket, Match, MatchStatus, Team};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per match cell: top-team line, score/status line, bottom-team line.
pub const MATCH_HEIGHT: u16 = 3;

/// Width of the connector zone drawn between adjacent round columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Maximum match cell width in wider terminals.
const CELL_W_FULL: u16 = 22;

/// Deepest tree the grid will lay out. Round numbers come off the wire, so
/// anything larger is treated as a malformed payload and clamped rather than
/// letting the slot-height recurrence overflow `u16`.
pub const MAX_ROUNDS: u32 = 10;

/// Slot heights per bracket depth for a knockout tree with `rounds` levels.
/// SH[0] = MATCH_HEIGHT; SH[d] = 2 * SH[d-1] + 1.
fn slot_heights(rounds: usize) -> Vec<u16> {
    let mut heights = Vec::with_capacity(rounds);
    let mut h = MATCH_HEIGHT;
    for _ in 0..rounds {
        heights.push(h);
        h = 2 * h + 1;
    }
    heights
}

// ---------------------------------------------------------------------------
// MatchCell — pre-computed position for one match
// ---------------------------------------------------------------------------

/// Pre-computed layout position for one match within the bracket grid.
#[derive(Debug, Clone)]
pub struct MatchCell {
    /// Row index of the score/status line (center of the 3-row cell).
    /// Relative to the bracket origin (0 = top). Not scroll-adjusted.
    pub center_row: u16,
    /// Starting x-column for this cell within the grid (origin-relative).
    pub col: u16,
    /// Width of the cell in terminal columns.
    pub cell_width: u16,
    /// 1-based round this cell belongs to.
    pub round: u32,
    /// Index of this match within the round's match list (0-based).
    pub match_idx: usize,
}

// ---------------------------------------------------------------------------
// BracketGrid — layout engine
// ---------------------------------------------------------------------------

/// Pre-computed layout for a full single-elimination bracket with `rounds`
/// levels, drawn left to right. Round r has 2^(rounds - r) matches; cells for
/// matches the backend has not created yet simply render blank.
///
/// Column order left → right: round 1 | conn | round 2 | conn | ... | final
#[derive(Debug, Clone)]
pub struct BracketGrid {
    /// All cells in round-major order: 2^(n-1) + ... + 2 + 1 cells.
    pub cells: Vec<MatchCell>,
    /// Starting x-column (origin-relative) for each round column, index 0 =
    /// round 1.
    pub round_cols: Vec<u16>,
    /// Total grid height in terminal rows.
    pub total_height: u16,
    /// Cell width used (chosen from terminal_width at compute time).
    pub cell_width: u16,
    /// Number of rounds laid out.
    pub rounds: u32,
    /// Cell count per depth, cumulative, for `cells_for_depth` slicing.
    offsets: Vec<usize>,
}

impl BracketGrid {
    /// Compute the bracket layout for the given terminal width and round
    /// count. Cell width is chosen dynamically so that
    /// `rounds * cell_width + (rounds - 1) * CONNECTOR_WIDTH` fits the pane.
    ///
    /// Center rows follow the triangle formula:
    ///   center[d][i] = SH[d]/2 + i * (SH[d+1] - SH[d])
    pub fn compute(terminal_width: u16, rounds: u32) -> Self {
        let rounds = rounds.clamp(1, MAX_ROUNDS);
        let n = rounds as usize;
        let sh = slot_heights(n);

        let connector_total = CONNECTOR_WIDTH * (rounds - 1) as u16;
        let per_col = terminal_width.saturating_sub(connector_total) / rounds as u16;
        let cell_width: u16 = per_col.max(1).min(CELL_W_FULL);
        let stride = cell_width + CONNECTOR_WIDTH;
        let round_cols: Vec<u16> = (0..rounds as u16).map(|d| stride * d).collect();

        let total_height = sh[n - 1];

        let mut cells = Vec::new();
        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);
        for d in 0..n {
            let count = 1usize << (n - 1 - d);
            let first_center = sh[d] / 2;
            // Spacing between siblings at depth d equals SH[d+1] - SH[d];
            // the deepest level has a single cell, so spacing is unused.
            let spacing = if d + 1 < n { sh[d + 1] - sh[d] } else { 0 };
            for i in 0..count {
                cells.push(MatchCell {
                    center_row: first_center + i as u16 * spacing,
                    col: round_cols[d],
                    cell_width,
                    round: (d + 1) as u32,
                    match_idx: i,
                });
            }
            offsets.push(cells.len());
        }

        Self { cells, round_cols, total_height, cell_width, rounds, offsets }
    }

    /// Cells for a specific depth (0 = first round).
    pub fn cells_for_depth(&self, depth: usize) -> &[MatchCell] {
        &self.cells[self.offsets[depth]..self.offsets[depth + 1]]
    }
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

/// Renders the full knockout tree with the operator's current round/match
/// selection highlighted.
pub struct BracketView<'a> {
    pub bracket: &'a Bracket,
    /// Pre-computed layout. Rebuild only on terminal resize or round-count
    /// change.
    pub grid: &'a BracketGrid,
    /// 1-based round of the highlighted match.
    pub selected_round: u32,
    /// Match index within the selected round that is highlighted.
    pub selected_match: usize,
    /// Vertical scroll offset in terminal rows (tall brackets on short
    /// terminals).
    pub scroll_offset: u16,
}

impl<'a> Widget for BracketView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < MATCH_HEIGHT {
            return;
        }

        // Pass 1: draw all match cells (3-row boxes)
        for cell in &self.grid.cells {
            let m = self
                .bracket
                .round(cell.round)
                .and_then(|r| r.matches.get(cell.match_idx));
            let selected =
                cell.round == self.selected_round && cell.match_idx == self.selected_match;
            draw_match_cell(m, cell, selected, area, self.scroll_offset, buf);
        }

        // Pass 2: draw box-drawing connectors between adjacent rounds.
        // For depth d, each parent at depth d+1 connects to two children at d.
        for depth in 0..(self.grid.rounds as usize).saturating_sub(1) {
            let child_cells = self.grid.cells_for_depth(depth);
            let parent_cells = self.grid.cells_for_depth(depth + 1);
            let conn_x_base = area.x + self.grid.round_cols[depth] + self.grid.cell_width;

            for (j, parent) in parent_cells.iter().enumerate() {
                let child_top = &child_cells[2 * j];
                let child_bot = &child_cells[2 * j + 1];
                draw_connector(
                    child_top.center_row,
                    parent.center_row,
                    child_bot.center_row,
                    conn_x_base,
                    area,
                    self.scroll_offset,
                    buf,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing helpers
// ---------------------------------------------------------------------------

/// Convert a bracket-relative row to an absolute screen y, applying scroll +
/// area bounds. Returns `None` if the row is off-screen.
fn screen_y(bracket_row: u16, scroll: u16, area: Rect) -> Option<u16> {
    if bracket_row < scroll {
        return None;
    }
    let rel = bracket_row - scroll;
    if rel >= area.height {
        return None;
    }
    Some(area.y + rel)
}

/// Draw one match cell (3 rows) into the buffer, with scroll + clip handling.
fn draw_match_cell(
    m: Option<&Match>,
    cell: &MatchCell,
    selected: bool,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let live = Style::default().fg(Color::Green);
    let winner_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let x = area.x + cell.col;
    if x >= area.x + area.width {
        return;
    }
    let avail_w = (area.x + area.width).saturating_sub(x) as usize;

    let base_style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let top_row = cell.center_row.saturating_sub(1);
    let mid_row = cell.center_row;
    let bot_row = cell.center_row.saturating_add(1);

    for (bracket_row, slot_idx) in [(top_row, 0u8), (mid_row, 1), (bot_row, 2)] {
        let Some(sy) = screen_y(bracket_row, scroll, area) else {
            continue;
        };

        let content = format_match_row(m, slot_idx, cell.cell_width as usize);
        let text: String = content.chars().take(avail_w).collect();

        let style = match slot_idx {
            1 => match m.map(|m| m.status) {
                Some(MatchStatus::InProgress) => live,
                _ => dim,
            },
            _ => {
                let is_winner = m
                    .map(|m| {
                        let side = if slot_idx == 0 { &m.team1 } else { &m.team2 };
                        match (side, &m.winner_team) {
                            (Some(team), Some(winner)) => team.id == winner.id,
                            _ => false,
                        }
                    })
                    .unwrap_or(false);

                if is_winner { winner_style } else { base_style }
            }
        };

        buf.set_string(x, sy, &text, style);
    }
}

/// Format a single match cell row.
/// `slot_idx`: 0 = team1 line, 1 = score/status line, 2 = team2 line.
fn format_match_row(m: Option<&Match>, slot_idx: u8, width: usize) -> String {
    match m {
        None => " ".repeat(width),
        Some(m) => match slot_idx {
            0 => format_team_line(m.team1.as_ref(), m.score1, width),
            2 => format_team_line(m.team2.as_ref(), m.score2, width),
            _ => format_status_line(m, width),
        },
    }
}

/// Format a team line: `"name        score "`. Undecided slots show "TBD".
fn format_team_line(team: Option<&Team>, score: Option<u32>, width: usize) -> String {
    let name = team.map(|t| t.name.as_str()).unwrap_or("TBD");
    let score_str = match score {
        Some(s) => format!("{s:3}"),
        None => "   ".to_string(),
    };
    // name(width-5) + " " + score(3) + " " = width
    let name_w = width.saturating_sub(5);
    let name_trunc: String = name.chars().take(name_w).collect();
    format!("{name_trunc:<name_w$} {score_str} ")
}

/// Format the center score/status row.
fn format_status_line(m: &Match, width: usize) -> String {
    let raw = format!(" {}", m.status.label());
    let padded = format!("{raw:<width$}");
    if padded.chars().count() > width {
        padded.chars().take(width).collect()
    } else {
        padded
    }
}

/// Draw box-drawing connectors between one parent and its two children.
///
/// ```text
///  child_top  ──┐         (col_a='─'  col_b='┐')
///               │         (col_b='│')
///  parent     ──├──       (col_a='─'  col_b='├'  col_c='─')
///               │         (col_b='│')
///  child_bot  ──┘         (col_a='─'  col_b='┘')
/// ```
fn draw_connector(
    r_top: u16,
    r_mid: u16,
    r_bot: u16,
    conn_base_x: u16,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let style = Style::default().fg(Color::DarkGray);
    let col_a = conn_base_x;
    let col_b = conn_base_x + 1;
    let col_c = conn_base_x + 2;
    let limit_x = area.x + area.width;

    macro_rules! put {
        ($x:expr, $row:expr, $ch:expr) => {
            if $x < limit_x {
                if let Some(sy) = screen_y($row, scroll, area) {
                    put_char(buf, $x, sy, $ch, style);
                }
            }
        };
    }

    put!(col_a, r_top, '─');
    put!(col_b, r_top, '┐');
    for row in (r_top + 1)..r_mid {
        put!(col_b, row, '│');
    }
    put!(col_a, r_mid, '─');
    put!(col_b, r_mid, '├');
    put!(col_c, r_mid, '─');
    for row in (r_mid + 1)..r_bot {
        put!(col_b, row, '│');
    }
    put!(col_a, r_bot, '─');
    put!(col_b, r_bot, '┘');
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_heights_recurrence() {
        assert_eq!(slot_heights(4), vec![3, 7, 15, 31]);
        assert_eq!(slot_heights(5), vec![3, 7, 15, 31, 63]);
    }

    #[test]
    fn test_grid_cell_count_is_full_tree() {
        // 2^n - 1 matches in a full single-elimination bracket.
        for rounds in 1..=5u32 {
            let grid = BracketGrid::compute(120, rounds);
            assert_eq!(grid.cells.len(), (1 << rounds) - 1, "rounds={rounds}");
        }
    }

    #[test]
    fn test_first_round_centers_16_team_bracket() {
        let grid = BracketGrid::compute(120, 4);
        let first = grid.cells_for_depth(0);
        assert_eq!(first.len(), 8);
        let centers: Vec<u16> = first.iter().map(|c| c.center_row).collect();
        assert_eq!(centers, vec![1, 5, 9, 13, 17, 21, 25, 29]);
    }

    #[test]
    fn test_final_is_single_centered_cell() {
        let grid = BracketGrid::compute(120, 4);
        let last = grid.cells_for_depth(3);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].center_row, 15);
        assert_eq!(last[0].round, 4);
    }

    #[test]
    fn test_parent_center_is_midpoint_of_children() {
        let grid = BracketGrid::compute(120, 5);
        for depth in 0..4usize {
            let children = grid.cells_for_depth(depth);
            let parents = grid.cells_for_depth(depth + 1);
            for (j, parent) in parents.iter().enumerate() {
                let c_top = children[2 * j].center_row;
                let c_bot = children[2 * j + 1].center_row;
                assert_eq!(
                    parent.center_row,
                    (c_top + c_bot) / 2,
                    "depth={depth} parent={j}"
                );
            }
        }
    }

    #[test]
    fn test_total_height_matches_deepest_slot() {
        assert_eq!(BracketGrid::compute(120, 3).total_height, 15);
        assert_eq!(BracketGrid::compute(120, 4).total_height, 31);
    }

    #[test]
    fn test_cell_width_is_computed_from_available_width() {
        let width: u16 = 99;
        let rounds = 4u32;
        let expected = width.saturating_sub(CONNECTOR_WIDTH * 3) / 4;
        let grid = BracketGrid::compute(width, rounds);
        assert_eq!(grid.cell_width, expected.min(CELL_W_FULL));
    }

    #[test]
    fn test_cell_width_caps_at_full_width_limit() {
        let grid = BracketGrid::compute(200, 2);
        assert_eq!(grid.cell_width, CELL_W_FULL);
    }

    #[test]
    fn test_single_round_grid() {
        let grid = BracketGrid::compute(40, 1);
        assert_eq!(grid.cells.len(), 1);
        assert_eq!(grid.cells[0].center_row, 1);
        assert_eq!(grid.total_height, MATCH_HEIGHT);
    }

    #[test]
    fn test_oversized_round_count_is_clamped() {
        // A payload carrying an absurd round number must not blow up the
        // layout; the grid caps the depth and renders what fits.
        let grid = BracketGrid::compute(120, 16);
        assert_eq!(grid.rounds, MAX_ROUNDS);
        assert_eq!(grid.cells.len(), (1 << MAX_ROUNDS) - 1);
        let grid = BracketGrid::compute(120, u32::MAX);
        assert_eq!(grid.rounds, MAX_ROUNDS);
    }

    #[test]
    fn test_format_team_line_width() {
        let team = Team { name: "Lincoln High Lions".to_string(), ..Default::default() };
        let line = format_team_line(Some(&team), Some(87), 14);
        assert_eq!(line.chars().count(), 14, "line: {line:?}");
        let tbd = format_team_line(None, None, 14);
        assert!(tbd.starts_with("TBD"));
        assert_eq!(tbd.chars().count(), 14);
    }

    #[test]
    fn test_format_status_line_truncates() {
        let m = Match { status: MatchStatus::Cancelled, ..Default::default() };
        assert_eq!(format_status_line(&m, 6).chars().count(), 6);
    }
}
