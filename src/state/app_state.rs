use crate::app::MenuItem;
use edusports_api::client::{ArticleDraft, MatchResult, TournamentDraft};
use edusports_api::{
    Bracket, Match, MatchStatus, NewsArticle, Page, Team, Tournament, current_round, paginate,
};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Toast notifications
// ---------------------------------------------------------------------------

const TOAST_TTL: Duration = Duration::from_secs(4);
const TOAST_CAP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    created: Instant,
}

#[derive(Debug, Default)]
pub struct ToastState {
    toasts: Vec<Toast>,
}

impl ToastState {
    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        // Collapse immediate repeats (e.g. the refresher failing every 30s).
        if let Some(last) = self.toasts.last()
            && last.message == message
        {
            return;
        }
        self.toasts.push(Toast { message, level, created: Instant::now() });
        if self.toasts.len() > TOAST_CAP {
            let excess = self.toasts.len() - TOAST_CAP;
            self.toasts.drain(0..excess);
        }
    }

    /// Drop expired toasts. Returns true if anything changed (needs redraw).
    pub fn prune(&mut self) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.created.elapsed() < TOAST_TTL);
        before != self.toasts.len()
    }

    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }
}

// ---------------------------------------------------------------------------
// Tournament listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TournamentField {
    #[default]
    Name,
    MaxTeams,
}

/// Create/edit form for a tournament. Scores nothing locally; the parsed
/// draft goes straight to the backend, which owns validation.
#[derive(Debug, Default, Clone)]
pub struct TournamentForm {
    /// None = creating, Some = editing this tournament.
    pub editing_id: Option<String>,
    pub name: String,
    pub max_teams: String,
    pub focus: TournamentField,
}

impl TournamentForm {
    pub fn for_edit(t: &Tournament) -> Self {
        Self {
            editing_id: Some(t.id.clone()),
            name: t.name.clone(),
            max_teams: t.max_teams.to_string(),
            focus: TournamentField::Name,
        }
    }

    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            TournamentField::Name => &mut self.name,
            TournamentField::MaxTeams => &mut self.max_teams,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            TournamentField::Name => TournamentField::MaxTeams,
            TournamentField::MaxTeams => TournamentField::Name,
        };
    }

    pub fn parse(&self) -> Result<TournamentDraft, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("name is required".to_string());
        }
        let max_teams: u32 = self
            .max_teams
            .trim()
            .parse()
            .map_err(|_| format!("max teams must be a number, got '{}'", self.max_teams))?;
        Ok(TournamentDraft {
            name: name.to_string(),
            max_teams,
            start_date: None,
            end_date: None,
        })
    }
}

#[derive(Debug, Default)]
pub struct TournamentListState {
    pub tournaments: Vec<Tournament>,
    /// 1-based page index into the client-side pagination.
    pub page: usize,
    pub per_page: usize,
    /// Selection index within the current page.
    pub selected: usize,
    pub form: Option<TournamentForm>,
    /// Tournament ID pending delete confirmation (second `d` confirms).
    pub confirm_delete: Option<String>,
}

impl TournamentListState {
    pub fn new(per_page: usize) -> Self {
        Self { page: 1, per_page: per_page.max(1), ..Self::default() }
    }

    pub fn load(&mut self, tournaments: Vec<Tournament>) {
        self.tournaments = tournaments;
        let pages = self.current_page().total_pages;
        self.page = self.page.clamp(1, pages);
        self.clamp_selection();
        self.confirm_delete = None;
    }

    pub fn current_page(&self) -> Page<Tournament> {
        paginate(&self.tournaments, self.page, self.per_page)
    }

    pub fn selected_tournament(&self) -> Option<Tournament> {
        self.current_page().items.get(self.selected).cloned()
    }

    pub fn navigate_down(&mut self) {
        let max = self.current_page().items.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
        self.confirm_delete = None;
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.confirm_delete = None;
    }

    pub fn next_page(&mut self) {
        if self.page < self.current_page().total_pages {
            self.page += 1;
            self.selected = 0;
        }
        self.confirm_delete = None;
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
            self.selected = 0;
        }
        self.confirm_delete = None;
    }

    fn clamp_selection(&mut self) {
        let max = self.current_page().items.len().saturating_sub(1);
        self.selected = self.selected.min(max);
    }
}

// ---------------------------------------------------------------------------
// Tournament detail
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DetailState {
    pub tournament: Option<Tournament>,
    pub matches: Vec<Match>,
    pub teams: Vec<Team>,
    /// Tournament id armed for completion; the next `f` on it fires.
    pub confirm_complete: Option<String>,
}

impl DetailState {
    pub fn load(&mut self, tournament: Tournament, matches: Vec<Match>, teams: Vec<Team>) {
        self.tournament = Some(tournament);
        self.matches = matches;
        self.teams = teams;
        self.confirm_complete = None;
    }

    /// The backend usually reports the active round; when it doesn't, derive
    /// it from the match list.
    pub fn active_round(&self) -> u32 {
        current_round(&self.matches)
    }

    pub fn merge_matches(&mut self, updates: Vec<Match>) {
        for update in updates {
            if let Some(m) = self.matches.iter_mut().find(|m| m.id == update.id) {
                *m = update;
            } else {
                self.matches.push(update);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bracket view
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct BracketState {
    pub bracket: Bracket,
    /// The round the user is looking at (1-based). May differ from the
    /// tournament's active round.
    pub view_round: u32,
    pub selected_match: usize,
    pub scroll_offset: u16,
}

impl BracketState {
    /// Store a freshly fetched bracket and jump the view to the active round.
    pub fn load(&mut self, bracket: Bracket, active_round: u32) {
        let max = bracket.max_round().max(1);
        self.view_round = active_round.clamp(1, max);
        self.selected_match = 0;
        self.scroll_offset = 0;
        self.bracket = bracket;
    }

    pub fn merge_updates(&mut self, matches: Vec<Match>) {
        self.bracket.merge_updates(matches);
    }

    pub fn navigate_round_next(&mut self) {
        if self.view_round < self.bracket.max_round() {
            self.view_round += 1;
            self.selected_match = 0;
            self.scroll_offset = 0;
        }
    }

    pub fn navigate_round_prev(&mut self) {
        if self.view_round > 1 {
            self.view_round -= 1;
            self.selected_match = 0;
            self.scroll_offset = 0;
        }
    }

    pub fn navigate_match_down(&mut self) {
        let max = self.matches_in_view().saturating_sub(1);
        if self.selected_match < max {
            self.selected_match += 1;
        }
    }

    pub fn navigate_match_up(&mut self) {
        self.selected_match = self.selected_match.saturating_sub(1);
    }

    pub fn selected_match_id(&self) -> Option<String> {
        self.bracket
            .round(self.view_round)?
            .matches
            .get(self.selected_match)
            .map(|m| m.id.clone())
    }

    fn matches_in_view(&self) -> usize {
        self.bracket
            .round(self.view_round)
            .map(|r| r.matches.len())
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Match result entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreField {
    #[default]
    Team1,
    Team2,
}

#[derive(Debug, Clone)]
pub struct MatchForm {
    pub match_id: String,
    pub score1: String,
    pub score2: String,
    pub focus: ScoreField,
}

impl MatchForm {
    pub fn for_match(m: &Match) -> Self {
        Self {
            match_id: m.id.clone(),
            score1: m.score1.map(|s| s.to_string()).unwrap_or_default(),
            score2: m.score2.map(|s| s.to_string()).unwrap_or_default(),
            focus: ScoreField::Team1,
        }
    }

    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            ScoreField::Team1 => &mut self.score1,
            ScoreField::Team2 => &mut self.score2,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            ScoreField::Team1 => ScoreField::Team2,
            ScoreField::Team2 => ScoreField::Team1,
        };
    }

    /// Both scores must be numeric. Whether the result is acceptable (ties,
    /// score limits) is the backend's call, not ours.
    pub fn parse(&self) -> Result<MatchResult, String> {
        let score1: u32 = self
            .score1
            .trim()
            .parse()
            .map_err(|_| format!("score must be a number, got '{}'", self.score1))?;
        let score2: u32 = self
            .score2
            .trim()
            .parse()
            .map_err(|_| format!("score must be a number, got '{}'", self.score2))?;
        Ok(MatchResult {
            team1_score: score1,
            team2_score: score2,
            status: "COMPLETED".to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MatchesState {
    pub selected: usize,
    pub form: Option<MatchForm>,
}

impl MatchesState {
    pub fn navigate_down(&mut self, total: usize) {
        let max = total.saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Open the entry form for a match, unless it is already settled.
    pub fn open_form(&mut self, m: &Match) -> Result<(), String> {
        if m.status == MatchStatus::Completed {
            return Err("match is already final".to_string());
        }
        if m.team1.is_none() || m.team2.is_none() {
            return Err("both teams must be decided first".to_string());
        }
        self.form = Some(MatchForm::for_match(m));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Team registration / approval
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TeamsState {
    pub selected: usize,
    /// One-line name input for registering a new team.
    pub register_input: String,
    pub registering: bool,
}

impl TeamsState {
    pub fn navigate_down(&mut self, total: usize) {
        let max = total.saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn submit_registration(&mut self) -> Option<String> {
        let name = self.register_input.trim().to_string();
        self.registering = false;
        self.register_input.clear();
        if name.is_empty() { None } else { Some(name) }
    }
}

// ---------------------------------------------------------------------------
// News manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleField {
    #[default]
    Name,
    Content,
}

#[derive(Debug, Default, Clone)]
pub struct ArticleForm {
    /// None = creating, Some = editing this article.
    pub editing_id: Option<String>,
    pub name: String,
    pub content: String,
    pub focus: ArticleField,
}

impl ArticleForm {
    pub fn for_edit(article: &NewsArticle) -> Self {
        Self {
            editing_id: Some(article.id.clone()),
            name: article.name.clone(),
            content: article.content.clone(),
            focus: ArticleField::Name,
        }
    }

    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            ArticleField::Name => &mut self.name,
            ArticleField::Content => &mut self.content,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            ArticleField::Name => ArticleField::Content,
            ArticleField::Content => ArticleField::Name,
        };
    }

    pub fn parse(&self) -> Result<ArticleDraft, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("article name is required".to_string());
        }
        Ok(ArticleDraft {
            name: name.to_string(),
            content: self.content.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct NewsState {
    pub articles: Vec<NewsArticle>,
    pub selected: usize,
    pub form: Option<ArticleForm>,
    /// Path input for an attachment upload targeting the selected article.
    pub upload_input: String,
    pub uploading: bool,
    pub confirm_delete: Option<String>,
}

impl NewsState {
    pub fn load(&mut self, articles: Vec<NewsArticle>) {
        self.articles = articles;
        let max = self.articles.len().saturating_sub(1);
        self.selected = self.selected.min(max);
        self.confirm_delete = None;
    }

    pub fn selected_article(&self) -> Option<&NewsArticle> {
        self.articles.get(self.selected)
    }

    pub fn navigate_down(&mut self) {
        let max = self.articles.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
        self.confirm_delete = None;
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.confirm_delete = None;
    }

    pub fn submit_upload(&mut self) -> Option<String> {
        let path = self.upload_input.trim().to_string();
        self.uploading = false;
        self.upload_input.clear();
        if path.is_empty() { None } else { Some(path) }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    /// Set after a 401: the token file has been cleared and the operator
    /// must provide a fresh token before anything else will work.
    pub session_expired: bool,
    pub show_logs: bool,
    /// ID of the tournament the detail/bracket/matches/teams tabs refer to.
    pub selected_tournament_id: Option<String>,
    pub list: TournamentListState,
    pub detail: DetailState,
    pub bracket: BracketState,
    pub matches: MatchesState,
    pub teams: TeamsState,
    pub news: NewsState,
    pub toasts: ToastState,
}

impl AppState {
    pub fn new(per_page: usize) -> Self {
        Self {
            list: TournamentListState::new(per_page),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edusports_api::Round;

    fn bracket(rounds: &[(u32, usize)]) -> Bracket {
        Bracket {
            rounds: rounds
                .iter()
                .map(|&(number, count)| Round {
                    number,
                    matches: (0..count)
                        .map(|i| Match {
                            id: format!("r{number}m{i}"),
                            round: number,
                            ..Default::default()
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn bracket_load_jumps_to_active_round() {
        let mut state = BracketState::default();
        state.load(bracket(&[(1, 4), (2, 2), (3, 1)]), 2);
        assert_eq!(state.view_round, 2);
        assert_eq!(state.selected_match, 0);
    }

    #[test]
    fn bracket_load_clamps_out_of_range_round() {
        let mut state = BracketState::default();
        // Active round can be max_round + 1 when every round is settled.
        state.load(bracket(&[(1, 2), (2, 1)]), 3);
        assert_eq!(state.view_round, 2);
    }

    #[test]
    fn bracket_navigation_stays_in_bounds() {
        let mut state = BracketState::default();
        state.load(bracket(&[(1, 2), (2, 1)]), 1);
        state.navigate_round_prev();
        assert_eq!(state.view_round, 1);
        state.navigate_round_next();
        state.navigate_round_next();
        assert_eq!(state.view_round, 2);
        state.navigate_match_down();
        assert_eq!(state.selected_match, 0); // only one match in round 2
    }

    #[test]
    fn bracket_selected_match_id_follows_view() {
        let mut state = BracketState::default();
        state.load(bracket(&[(1, 4)]), 1);
        state.navigate_match_down();
        assert_eq!(state.selected_match_id().as_deref(), Some("r1m1"));
    }

    #[test]
    fn list_pagination_clamps_after_reload() {
        let mut list = TournamentListState::new(2);
        let many: Vec<Tournament> = (0..5)
            .map(|i| Tournament { id: format!("t{i}"), ..Default::default() })
            .collect();
        list.load(many);
        list.next_page();
        list.next_page();
        assert_eq!(list.page, 3);
        // Shrink to one page; page index must snap back.
        list.load(vec![Tournament::default()]);
        assert_eq!(list.page, 1);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn tournament_form_rejects_bad_max_teams() {
        let form = TournamentForm {
            name: "Cup".to_string(),
            max_teams: "eight".to_string(),
            ..Default::default()
        };
        assert!(form.parse().is_err());
        let form = TournamentForm {
            name: "Cup".to_string(),
            max_teams: "8".to_string(),
            ..Default::default()
        };
        assert_eq!(form.parse().unwrap().max_teams, 8);
    }

    #[test]
    fn match_form_requires_numeric_scores() {
        let mut form = MatchForm {
            match_id: "m1".to_string(),
            score1: "3".to_string(),
            score2: String::new(),
            focus: ScoreField::Team1,
        };
        assert!(form.parse().is_err());
        form.score2 = "1".to_string();
        let result = form.parse().unwrap();
        assert_eq!(result.team1_score, 3);
        assert_eq!(result.team2_score, 1);
        assert_eq!(result.status, "COMPLETED");
    }

    #[test]
    fn match_entry_refuses_settled_or_undecided_matches() {
        let mut state = MatchesState::default();
        let done = Match {
            id: "m1".to_string(),
            status: MatchStatus::Completed,
            team1: Some(Team::default()),
            team2: Some(Team::default()),
            ..Default::default()
        };
        assert!(state.open_form(&done).is_err());
        let tbd = Match { id: "m2".to_string(), team1: None, ..Default::default() };
        assert!(state.open_form(&tbd).is_err());
    }

    #[test]
    fn toasts_collapse_repeats_and_cap_backlog() {
        let mut toasts = ToastState::default();
        toasts.push(ToastLevel::Error, "boom");
        toasts.push(ToastLevel::Error, "boom");
        assert_eq!(toasts.visible().len(), 1);
        for i in 0..10 {
            toasts.push(ToastLevel::Info, format!("msg {i}"));
        }
        assert_eq!(toasts.visible().len(), TOAST_CAP);
    }

    #[test]
    fn detail_merge_updates_existing_matches() {
        let mut detail = DetailState::default();
        detail.matches = vec![Match { id: "m1".to_string(), round: 1, ..Default::default() }];
        detail.merge_matches(vec![Match {
            id: "m1".to_string(),
            round: 1,
            status: MatchStatus::Completed,
            ..Default::default()
        }]);
        assert_eq!(detail.matches.len(), 1);
        assert_eq!(detail.matches[0].status, MatchStatus::Completed);
        assert_eq!(detail.active_round(), 2);
    }
}
