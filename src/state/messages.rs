use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use edusports_api::client::{ArticleDraft, MatchResult, TournamentDraft};
use edusports_api::{Attachment, Bracket, Match, NewsArticle, Team, Tournament};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadTournaments,
    /// Fetch everything the detail/bracket/matches/teams tabs need for one
    /// tournament: the record itself plus matches, bracket, and teams.
    LoadTournamentBundle { tournament_id: String },
    RefreshMatches { tournament_id: String },
    CreateTournament { draft: TournamentDraft },
    UpdateTournament { tournament_id: String, draft: TournamentDraft },
    DeleteTournament { tournament_id: String },
    GenerateBracket { tournament_id: String },
    StartTournament { tournament_id: String },
    AdvanceRound { tournament_id: String },
    CompleteTournament { tournament_id: String },
    RegisterTeam { tournament_id: String, name: String },
    ApproveTeam { tournament_id: String, team_id: String },
    RejectTeam { tournament_id: String, team_id: String },
    SubmitMatchResult { tournament_id: String, match_id: String, result: MatchResult },
    LoadNews,
    CreateArticle { draft: ArticleDraft },
    UpdateArticle { article_id: String, draft: ArticleDraft },
    DeleteArticle { article_id: String },
    UploadAttachment { article_id: String, path: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TournamentsLoaded { tournaments: Vec<Tournament> },
    TournamentBundleLoaded {
        tournament: Tournament,
        matches: Vec<Match>,
        bracket: Bracket,
        teams: Vec<Team>,
    },
    /// Partial update: refreshed match records merged into current state.
    MatchesRefreshed { tournament_id: String, matches: Vec<Match> },
    /// A mutation succeeded; carries a toast message plus which cached reads
    /// are now stale and must be re-fetched.
    MutationApplied { message: String, refresh: Invalidate },
    NewsLoaded { articles: Vec<NewsArticle> },
    AttachmentUploaded { article_id: String, attachment: Attachment },
    /// 401 anywhere: the stored token has been cleared, show the login notice.
    SessionExpired,
    Error { message: String },
}

/// Which cached reads a successful mutation invalidates. The client holds no
/// authoritative state, so invalidation is always "re-fetch from the server".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidate {
    Nothing,
    TournamentList,
    /// The tournament bundle (record, matches, bracket, teams) and, since
    /// status and team counts show up in the listing, the list as well.
    Tournament(String),
    News,
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Coarse timer used to expire toasts and redraw the spinner.
    Tick,
}
