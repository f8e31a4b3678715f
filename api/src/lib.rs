pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the backend wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub status: TournamentStatus,
    pub max_teams: u32,
    pub current_teams: u32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub winner_team: Option<Team>,
    pub runner_up_team: Option<Team>,
}

impl Tournament {
    pub fn is_full(&self) -> bool {
        self.max_teams > 0 && self.current_teams >= self.max_teams
    }
}

/// Lifecycle states reported by the backend. Strings the client does not
/// recognize map to `Unknown` rather than failing the whole payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    #[default]
    Draft,
    RegistrationOpen,
    BracketReady,
    InProgress,
    Completed,
    Unknown,
}

impl TournamentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TournamentStatus::Draft => "Draft",
            TournamentStatus::RegistrationOpen => "Registration",
            TournamentStatus::BracketReady => "Bracket Ready",
            TournamentStatus::InProgress => "In Progress",
            TournamentStatus::Completed => "Completed",
            TournamentStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub registration_status: RegistrationStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Unknown,
}

impl RegistrationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "Pending",
            RegistrationStatus::Approved => "Approved",
            RegistrationStatus::Rejected => "Rejected",
            RegistrationStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Match {
    pub id: String,
    /// 1-based knockout round number.
    pub round: u32,
    pub team1: Option<Team>,
    pub team2: Option<Team>,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub winner_team: Option<Team>,
    pub status: MatchStatus,
}

impl Match {
    /// A match still counts toward the active round until it is completed.
    /// Cancelled matches do not hold a round open.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, MatchStatus::Completed | MatchStatus::Cancelled)
    }

    /// Winner name, tolerating the backend invariant being violated
    /// (a completed match should carry a winner, but may not).
    pub fn winner_label(&self) -> String {
        self.winner_team
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "TBD".to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Unknown,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::InProgress => "Live",
            MatchStatus::Completed => "Final",
            MatchStatus::Cancelled => "Cancelled",
            MatchStatus::Unknown => "Unknown",
        }
    }
}

/// Ordered knockout bracket: rounds ascending, each holding its matches.
#[derive(Debug, Clone, Default)]
pub struct Bracket {
    pub rounds: Vec<Round>,
}

#[derive(Debug, Clone, Default)]
pub struct Round {
    pub number: u32,
    pub matches: Vec<Match>,
}

impl Bracket {
    /// Find a match by ID across all rounds.
    pub fn find_match_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        for round in &mut self.rounds {
            for m in &mut round.matches {
                if m.id == match_id {
                    return Some(m);
                }
            }
        }
        None
    }

    /// Merge partial match updates (from a periodic refresh) into the tree.
    pub fn merge_updates(&mut self, updates: Vec<Match>) {
        for update in updates {
            if let Some(m) = self.find_match_mut(&update.id) {
                *m = update;
            }
        }
    }

    pub fn max_round(&self) -> u32 {
        self.rounds.iter().map(|r| r.number).max().unwrap_or(0)
    }

    pub fn round(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }
}

/// Label for a knockout round given the total round count, e.g. round 3 of 4
/// is the semifinal of a 16-team bracket.
pub fn round_label(round: u32, total_rounds: u32) -> String {
    if total_rounds == 0 || round > total_rounds {
        return format!("Round {round}");
    }
    match total_rounds - round {
        0 => "Final".to_string(),
        1 => "Semifinals".to_string(),
        2 => "Quarterfinals".to_string(),
        _ => format!("Round {round}"),
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewsArticle {
    pub id: String,
    pub name: String,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default)]
pub struct Attachment {
    pub id: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Round inference
// ---------------------------------------------------------------------------

/// Derive the active round from a flat match list when the backend omits it.
///
/// Returns the lowest round that still has an unsettled match. When every
/// round is settled the tournament sits at `max_round + 1` (waiting for the
/// next round to be generated, or finished). An empty list means round 1.
pub fn current_round(matches: &[Match]) -> u32 {
    let mut max_round = 0;
    let mut lowest_open: Option<u32> = None;

    for m in matches {
        max_round = max_round.max(m.round);
        if !m.is_settled() && lowest_open.map(|r| m.round < r).unwrap_or(true) {
            lowest_open = Some(m.round);
        }
    }

    match lowest_open {
        Some(round) => round,
        None if max_round == 0 => 1,
        None => max_round + 1,
    }
}

// ---------------------------------------------------------------------------
// Client-side pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page index.
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Slice a full result set into one page. `page` is 1-based and clamped to
/// the valid range; `per_page` is clamped to at least 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let slice = if start < total {
        items[start..(start + per_page).min(total)].to_vec()
    } else {
        Vec::new()
    };

    Page { items: slice, page, per_page, total, total_pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: &str, round: u32, status: MatchStatus) -> Match {
        Match { id: id.into(), round, status, ..Default::default() }
    }

    #[test]
    fn current_round_is_lowest_with_open_match() {
        let matches = vec![
            m("a", 1, MatchStatus::Completed),
            m("b", 1, MatchStatus::Completed),
            m("c", 2, MatchStatus::Scheduled),
            m("d", 2, MatchStatus::Completed),
            m("e", 3, MatchStatus::Scheduled),
        ];
        assert_eq!(current_round(&matches), 2);
    }

    #[test]
    fn current_round_ignores_match_ordering() {
        let matches = vec![
            m("e", 3, MatchStatus::Scheduled),
            m("a", 1, MatchStatus::InProgress),
            m("c", 2, MatchStatus::Completed),
        ];
        assert_eq!(current_round(&matches), 1);
    }

    #[test]
    fn all_rounds_complete_yields_max_plus_one() {
        let matches = vec![
            m("a", 1, MatchStatus::Completed),
            m("b", 2, MatchStatus::Completed),
        ];
        assert_eq!(current_round(&matches), 3);
    }

    #[test]
    fn cancelled_matches_do_not_hold_a_round_open() {
        let matches = vec![
            m("a", 1, MatchStatus::Completed),
            m("b", 1, MatchStatus::Cancelled),
            m("c", 2, MatchStatus::Scheduled),
        ];
        assert_eq!(current_round(&matches), 2);
    }

    #[test]
    fn empty_match_list_is_round_one() {
        assert_eq!(current_round(&[]), 1);
    }

    #[test]
    fn paginate_slices_and_counts_pages() {
        let items: Vec<u32> = (1..=10).collect();
        let page = paginate(&items, 2, 4);
        assert_eq!(page.items, vec![5, 6, 7, 8]);
        assert_eq!(page.total, 10);
        assert_eq!(page.total_pages, 3); // ceil(10 / 4)
        let last = paginate(&items, 3, 4);
        assert_eq!(last.items, vec![9, 10]);
    }

    #[test]
    fn paginate_clamps_page_and_per_page() {
        let items: Vec<u32> = (1..=5).collect();
        let page = paginate(&items, 99, 2);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, vec![5]);
        let degenerate = paginate(&items, 1, 0);
        assert_eq!(degenerate.per_page, 1);
        assert_eq!(degenerate.total_pages, 5);
    }

    #[test]
    fn paginate_empty_set_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn merge_updates_replaces_matching_matches() {
        let mut bracket = Bracket {
            rounds: vec![Round {
                number: 1,
                matches: vec![m("a", 1, MatchStatus::Scheduled)],
            }],
        };
        bracket.merge_updates(vec![m("a", 1, MatchStatus::Completed)]);
        assert_eq!(bracket.rounds[0].matches[0].status, MatchStatus::Completed);
    }

    #[test]
    fn round_labels_name_the_closing_rounds() {
        assert_eq!(round_label(4, 4), "Final");
        assert_eq!(round_label(3, 4), "Semifinals");
        assert_eq!(round_label(2, 4), "Quarterfinals");
        assert_eq!(round_label(1, 4), "Round 1");
    }
}
