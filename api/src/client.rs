use crate::wire::{
    ListEnvelope, WireArticle, WireBracket, WireError, WireMatch, WireTeam, WireTournament,
};
use crate::{
    Attachment, Bracket, Match, MatchStatus, NewsArticle, RegistrationStatus, Round, Team,
    Tournament, TournamentStatus,
};
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Idempotent reads retry with exponential backoff; mutations never do.
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// EduSports platform client. All business logic (seeding, advancement,
/// scoring validation) lives server-side; this client only shuttles JSON.
#[derive(Debug, Clone)]
pub struct EduSportsApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

#[derive(Debug)]
pub enum ApiError {
    /// 401 — token missing, expired, or revoked.
    Unauthorized,
    /// 403 — authenticated but not allowed.
    Forbidden,
    NotFound(String),
    /// 422 — server rejected the payload; carries the server's detail text.
    Validation(String),
    /// 5xx.
    Server(StatusCode),
    Network(String),
    Timeout(String),
    Parsing(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "Unauthorized (401)"),
            ApiError::Forbidden => write!(f, "Forbidden (403)"),
            ApiError::NotFound(url) => write!(f, "Not found: {url}"),
            ApiError::Validation(detail) => write!(f, "Validation failed: {detail}"),
            ApiError::Server(status) => write!(f, "Server error: {status}"),
            ApiError::Network(msg) => write!(f, "Network error: {msg}"),
            ApiError::Timeout(url) => write!(f, "Timed out: {url}"),
            ApiError::Parsing(msg) => write!(f, "Parse error: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Short operator-facing text for toast display.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Session expired. Provide a new API token.".to_string(),
            ApiError::Forbidden => "You don't have permission for that.".to_string(),
            ApiError::NotFound(_) => "Not found. It may have been deleted.".to_string(),
            ApiError::Validation(detail) => format!("Rejected: {detail}"),
            ApiError::Server(_) => "Server error. Try again shortly.".to_string(),
            ApiError::Network(_) => "Network unreachable. Check your connection.".to_string(),
            ApiError::Timeout(_) => "Request timed out.".to_string(),
            ApiError::Parsing(_) => "Unexpected response from server.".to_string(),
            ApiError::Other(msg) => msg.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Server(_) | ApiError::Network(_) | ApiError::Timeout(_)
        )
    }
}

impl EduSportsApi {
    /// Build a client from the environment: `ESTUI_API_URL` for the base URL,
    /// `ESTUI_API_TOKEN` (or the saved token file) for the bearer token.
    pub fn from_env() -> Self {
        let base_url = std::env::var("ESTUI_API_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token = match std::env::var("ESTUI_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
        {
            Some(fresh) => {
                save_token(&fresh);
                Some(fresh)
            }
            None => load_saved_token(),
        };
        Self::new(base_url, token)
    }

    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .user_agent(concat!("estui/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url,
            token,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Forget the bearer token and remove the saved token file. Called after
    /// a 401 so a stale token isn't retried forever.
    pub fn clear_token(&mut self) {
        self.token = None;
        if let Some(path) = token_path() {
            let _ = std::fs::remove_file(path);
        }
    }

    // -----------------------------------------------------------------------
    // Tournaments
    // -----------------------------------------------------------------------

    pub async fn list_tournaments(&self) -> ApiResult<Vec<Tournament>> {
        let raw: ListEnvelope<WireTournament> = self.get("/tournaments").await?;
        Ok(raw.into_items().iter().map(map_tournament).collect())
    }

    pub async fn fetch_tournament(&self, id: &str) -> ApiResult<Tournament> {
        let raw: WireTournament = self.get(&format!("/tournaments/{id}")).await?;
        Ok(map_tournament(&raw))
    }

    pub async fn create_tournament(&self, body: &TournamentDraft) -> ApiResult<Tournament> {
        let raw: WireTournament = self.send_json(Method::POST, "/tournaments", body).await?;
        Ok(map_tournament(&raw))
    }

    pub async fn update_tournament(
        &self,
        id: &str,
        body: &TournamentDraft,
    ) -> ApiResult<Tournament> {
        let raw: WireTournament = self
            .send_json(Method::PUT, &format!("/tournaments/{id}"), body)
            .await?;
        Ok(map_tournament(&raw))
    }

    pub async fn delete_tournament(&self, id: &str) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &format!("/tournaments/{id}"))
            .await
    }

    // Lifecycle transitions. Body-less POSTs; the backend owns seeding and
    // advancement, the client just asks.

    pub async fn generate_bracket(&self, id: &str) -> ApiResult<()> {
        self.send_empty(Method::POST, &format!("/tournaments/{id}/generate-bracket"))
            .await
    }

    pub async fn start_tournament(&self, id: &str) -> ApiResult<()> {
        self.send_empty(Method::POST, &format!("/tournaments/{id}/start"))
            .await
    }

    pub async fn advance_round(&self, id: &str) -> ApiResult<()> {
        self.send_empty(Method::POST, &format!("/tournaments/{id}/advance-round"))
            .await
    }

    pub async fn complete_tournament(&self, id: &str) -> ApiResult<()> {
        self.send_empty(Method::POST, &format!("/tournaments/{id}/complete"))
            .await
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    pub async fn list_teams(&self, tournament_id: &str) -> ApiResult<Vec<Team>> {
        let raw: ListEnvelope<WireTeam> = self
            .get(&format!("/tournaments/{tournament_id}/teams"))
            .await?;
        Ok(raw.into_items().iter().map(map_team).collect())
    }

    pub async fn register_team(&self, tournament_id: &str, name: &str) -> ApiResult<Team> {
        #[derive(Serialize)]
        struct Body<'a> {
            name: &'a str,
        }
        let raw: WireTeam = self
            .send_json(
                Method::POST,
                &format!("/tournaments/{tournament_id}/teams"),
                &Body { name },
            )
            .await?;
        Ok(map_team(&raw))
    }

    pub async fn approve_team(&self, tournament_id: &str, team_id: &str) -> ApiResult<()> {
        self.send_empty(
            Method::POST,
            &format!("/tournaments/{tournament_id}/teams/{team_id}/approve"),
        )
        .await
    }

    pub async fn reject_team(&self, tournament_id: &str, team_id: &str) -> ApiResult<()> {
        self.send_empty(
            Method::POST,
            &format!("/tournaments/{tournament_id}/teams/{team_id}/reject"),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Matches / bracket
    // -----------------------------------------------------------------------

    pub async fn list_matches(&self, tournament_id: &str) -> ApiResult<Vec<Match>> {
        let raw: ListEnvelope<WireMatch> = self
            .get(&format!("/tournaments/{tournament_id}/matches"))
            .await?;
        Ok(raw.into_items().iter().map(map_match).collect())
    }

    /// Submit scores and a status for a match. The winner is derived
    /// server-side; the response is the updated match record.
    pub async fn update_match_result(&self, match_id: &str, body: &MatchResult) -> ApiResult<Match> {
        let raw: WireMatch = self
            .send_json(Method::PATCH, &format!("/matches/{match_id}"), body)
            .await?;
        Ok(map_match(&raw))
    }

    pub async fn fetch_bracket(&self, tournament_id: &str) -> ApiResult<Bracket> {
        let raw: WireBracket = self
            .get(&format!("/tournaments/{tournament_id}/bracket"))
            .await?;
        Ok(map_bracket(raw))
    }

    // -----------------------------------------------------------------------
    // News
    // -----------------------------------------------------------------------

    pub async fn list_news(&self) -> ApiResult<Vec<NewsArticle>> {
        let raw: ListEnvelope<WireArticle> = self.get("/news").await?;
        Ok(raw.into_items().iter().map(map_article).collect())
    }

    pub async fn fetch_article(&self, id: &str) -> ApiResult<NewsArticle> {
        let raw: WireArticle = self.get(&format!("/news/{id}")).await?;
        Ok(map_article(&raw))
    }

    pub async fn create_article(&self, body: &ArticleDraft) -> ApiResult<NewsArticle> {
        let raw: WireArticle = self.send_json(Method::POST, "/news", body).await?;
        Ok(map_article(&raw))
    }

    pub async fn update_article(&self, id: &str, body: &ArticleDraft) -> ApiResult<NewsArticle> {
        let raw: WireArticle = self
            .send_json(Method::PUT, &format!("/news/{id}"), body)
            .await?;
        Ok(map_article(&raw))
    }

    pub async fn delete_article(&self, id: &str) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &format!("/news/{id}")).await
    }

    /// Upload an image attachment for an article. Multipart; the caller
    /// supplies the already-read file bytes.
    pub async fn upload_attachment(
        &self,
        article_id: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<Attachment> {
        let url = format!("{}/news/{article_id}/attachments", self.base_url);
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.client.post(&url).timeout(self.timeout).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| classify_transport(e, &url))?;
        let raw: crate::wire::WireAttachment = Self::decode(response, &url).await?;
        Ok(Attachment {
            id: raw.id.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
        })
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    /// GET with exponential backoff on transient failures (5xx / transport).
    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let mut delay = RETRY_BASE_DELAY;
        let mut last_error = None;

        for attempt in 0..RETRY_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            match self.send_once(Method::GET, path, None::<&()>).await {
                Ok(value) => return Ok(value),
                Err(e) if e.retryable() && attempt + 1 < RETRY_ATTEMPTS => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::Other(format!("retries exhausted for {path}"))))
    }

    /// Single-shot mutation with a JSON body. No retry: the server offers no
    /// idempotency tokens, so a repeated mutation could double-apply.
    async fn send_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send_once(method, path, Some(body)).await
    }

    /// Body-less mutation where the response body is irrelevant (lifecycle
    /// transitions, deletes, approvals).
    async fn send_empty(&self, method: Method, path: &str) -> ApiResult<()> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.request(method, &url).timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| classify_transport(e, &url))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_status(status, &url, &body))
        }
    }

    async fn send_once<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.request(method, &url).timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| classify_transport(e, &url))?;
        Self::decode(response, &url).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        url: &str,
    ) -> ApiResult<T> {
        let status = response.status();
        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| classify_transport(e, url))?;
            serde_json::from_str(&text).map_err(|e| ApiError::Parsing(format!("{url}: {e}")))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_status(status, url, &body))
        }
    }
}

/// Map a transport-level reqwest failure onto the error taxonomy.
fn classify_transport(e: reqwest::Error, url: &str) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(url.to_string())
    } else if e.is_decode() {
        ApiError::Parsing(format!("{url}: {e}"))
    } else {
        ApiError::Network(format!("{url}: {e}"))
    }
}

/// Map an HTTP error status (plus whatever body came with it) onto the
/// error taxonomy. Classification is by status code alone.
fn classify_status(status: StatusCode, url: &str, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound(url.to_string()),
        StatusCode::UNPROCESSABLE_ENTITY => {
            let detail = serde_json::from_str::<WireError>(body)
                .ok()
                .and_then(|e| e.detail())
                .unwrap_or_else(|| "invalid request".to_string());
            ApiError::Validation(detail)
        }
        s if s.is_server_error() => ApiError::Server(s),
        s => ApiError::Other(format!("{url}: unexpected status {s}")),
    }
}

// ---------------------------------------------------------------------------
// Token storage — config-dir file with XDG/HOME fallback
// ---------------------------------------------------------------------------

fn token_path() -> Option<PathBuf> {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return Some(PathBuf::from(config_dir).join("estui").join("token"));
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return Some(PathBuf::from(home).join(".config").join("estui").join("token"));
    }
    None
}

/// Persist a freshly supplied token so later runs don't need the env var.
fn save_token(token: &str) {
    let Some(path) = token_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(path, token);
}

fn load_saved_token() -> Option<String> {
    let path = token_path()?;
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim();
    if token.is_empty() { None } else { Some(token.to_string()) }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct TournamentDraft {
    pub name: String,
    #[serde(rename = "maxTeams")]
    pub max_teams: u32,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchResult {
    #[serde(rename = "team1Score")]
    pub team1_score: u32,
    #[serde(rename = "team2Score")]
    pub team2_score: u32,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ArticleDraft {
    pub name: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_tournament(raw: &WireTournament) -> Tournament {
    Tournament {
        id: raw.id.clone().unwrap_or_default(),
        name: raw.name.clone().unwrap_or_else(|| "Unnamed".to_string()),
        status: parse_tournament_status(raw.status.as_deref()),
        max_teams: raw.max_teams.unwrap_or(0),
        current_teams: raw.current_teams.unwrap_or(0),
        starts_at: parse_datetime(raw.start_date.as_deref()),
        ends_at: parse_datetime(raw.end_date.as_deref()),
        winner_team: raw.winner_team.as_ref().map(map_team),
        runner_up_team: raw.runner_up_team.as_ref().map(map_team),
    }
}

fn map_team(raw: &WireTeam) -> Team {
    Team {
        id: raw.id.clone().unwrap_or_default(),
        name: raw.name.clone().unwrap_or_else(|| "TBD".to_string()),
        registration_status: parse_registration_status(raw.registration_status.as_deref()),
    }
}

fn map_match(raw: &WireMatch) -> Match {
    Match {
        id: raw.id.clone().unwrap_or_default(),
        round: raw.round.unwrap_or(1),
        team1: raw.team1.as_ref().map(map_team),
        team2: raw.team2.as_ref().map(map_team),
        score1: raw.team1_score,
        score2: raw.team2_score,
        winner_team: raw.winner_team.as_ref().map(map_team),
        status: parse_match_status(raw.status.as_deref()),
    }
}

/// Build a Bracket from either a pre-grouped `rounds` payload or a flat
/// `matches` list grouped client-side. Rounds come out ascending either way.
fn map_bracket(raw: WireBracket) -> Bracket {
    if let Some(rounds) = raw.rounds {
        let mut mapped: Vec<Round> = rounds
            .into_iter()
            .map(|r| Round {
                number: r.number.unwrap_or(1),
                matches: r.matches.unwrap_or_default().iter().map(map_match).collect(),
            })
            .collect();
        mapped.sort_by_key(|r| r.number);
        return Bracket { rounds: mapped };
    }

    let mut grouped: BTreeMap<u32, Vec<Match>> = BTreeMap::new();
    for m in raw.matches.unwrap_or_default().iter().map(map_match) {
        grouped.entry(m.round).or_default().push(m);
    }
    Bracket {
        rounds: grouped
            .into_iter()
            .map(|(number, matches)| Round { number, matches })
            .collect(),
    }
}

fn map_article(raw: &WireArticle) -> NewsArticle {
    NewsArticle {
        id: raw.id.clone().unwrap_or_default(),
        name: raw.name.clone().unwrap_or_default(),
        content: raw.content.clone().unwrap_or_default(),
        attachments: raw
            .attachments
            .iter()
            .map(|a| Attachment {
                id: a.id.clone().unwrap_or_default(),
                url: a.url.clone().unwrap_or_default(),
            })
            .collect(),
    }
}

fn parse_datetime(s: Option<&str>) -> Option<DateTime<Utc>> {
    s.and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_tournament_status(s: Option<&str>) -> TournamentStatus {
    match s.map(|s| s.to_ascii_uppercase()).as_deref() {
        Some("DRAFT") => TournamentStatus::Draft,
        Some("REGISTRATION" | "REGISTRATION_OPEN" | "OPEN") => TournamentStatus::RegistrationOpen,
        Some("BRACKET_READY" | "READY") => TournamentStatus::BracketReady,
        Some("IN_PROGRESS" | "ONGOING" | "STARTED") => TournamentStatus::InProgress,
        Some("COMPLETED" | "FINISHED") => TournamentStatus::Completed,
        None => TournamentStatus::Draft,
        _ => TournamentStatus::Unknown,
    }
}

fn parse_registration_status(s: Option<&str>) -> RegistrationStatus {
    match s.map(|s| s.to_ascii_uppercase()).as_deref() {
        Some("PENDING" | "SUBMITTED") => RegistrationStatus::Pending,
        Some("APPROVED" | "ACCEPTED") => RegistrationStatus::Approved,
        Some("REJECTED" | "DENIED") => RegistrationStatus::Rejected,
        None => RegistrationStatus::Pending,
        _ => RegistrationStatus::Unknown,
    }
}

fn parse_match_status(s: Option<&str>) -> MatchStatus {
    match s.map(|s| s.to_ascii_uppercase()).as_deref() {
        Some("SCHEDULED" | "PENDING" | "UPCOMING") => MatchStatus::Scheduled,
        Some("IN_PROGRESS" | "LIVE" | "ONGOING") => MatchStatus::InProgress,
        Some("COMPLETED" | "FINISHED" | "FINAL") => MatchStatus::Completed,
        Some("CANCELLED" | "CANCELED" | "WALKOVER") => MatchStatus::Cancelled,
        None => MatchStatus::Scheduled,
        _ => MatchStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tournament_status_parsing_is_case_insensitive() {
        assert_eq!(
            parse_tournament_status(Some("in_progress")),
            TournamentStatus::InProgress
        );
        assert_eq!(
            parse_tournament_status(Some("REGISTRATION")),
            TournamentStatus::RegistrationOpen
        );
        assert_eq!(parse_tournament_status(None), TournamentStatus::Draft);
        assert_eq!(
            parse_tournament_status(Some("SOMETHING_NEW")),
            TournamentStatus::Unknown
        );
    }

    #[test]
    fn match_status_parsing_covers_backend_variants() {
        assert_eq!(parse_match_status(Some("FINAL")), MatchStatus::Completed);
        assert_eq!(parse_match_status(Some("live")), MatchStatus::InProgress);
        assert_eq!(parse_match_status(Some("WALKOVER")), MatchStatus::Cancelled);
        assert_eq!(parse_match_status(None), MatchStatus::Scheduled);
    }

    #[test]
    fn bracket_groups_flat_match_list_by_round() {
        let raw = WireBracket {
            rounds: None,
            matches: Some(vec![
                WireMatch { id: Some("m3".into()), round: Some(2), ..Default::default() },
                WireMatch { id: Some("m1".into()), round: Some(1), ..Default::default() },
                WireMatch { id: Some("m2".into()), round: Some(1), ..Default::default() },
            ]),
        };
        let bracket = map_bracket(raw);
        assert_eq!(bracket.rounds.len(), 2);
        assert_eq!(bracket.rounds[0].number, 1);
        assert_eq!(bracket.rounds[0].matches.len(), 2);
        assert_eq!(bracket.rounds[1].matches[0].id, "m3");
    }

    #[test]
    fn bracket_prefers_pre_grouped_rounds_and_sorts_them() {
        let raw = WireBracket {
            rounds: Some(vec![
                crate::wire::WireRound { number: Some(2), matches: Some(vec![]) },
                crate::wire::WireRound { number: Some(1), matches: Some(vec![]) },
            ]),
            matches: None,
        };
        let bracket = map_bracket(raw);
        assert_eq!(bracket.rounds[0].number, 1);
        assert_eq!(bracket.rounds[1].number, 2);
    }

    #[test]
    fn status_classification_maps_the_taxonomy() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "u", ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "u", ""),
            ApiError::Forbidden
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "u", ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "u", ""),
            ApiError::Server(_)
        ));
    }

    #[test]
    fn validation_errors_carry_the_server_detail() {
        let err = classify_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            "u",
            r#"{"message": "maxTeams must be a power of two"}"#,
        );
        match err {
            ApiError::Validation(detail) => {
                assert_eq!(detail, "maxTeams must be a power of two")
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_tournaments_accepts_data_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tournaments")
            .with_status(200)
            .with_body(r#"{"data": [{"id": "t1", "name": "Spring Cup", "status": "REGISTRATION"}]}"#)
            .create_async()
            .await;

        let api = EduSportsApi::new(server.url(), None);
        let tournaments = api.list_tournaments().await.unwrap();
        assert_eq!(tournaments.len(), 1);
        assert_eq!(tournaments[0].name, "Spring Cup");
        assert_eq!(tournaments[0].status, TournamentStatus::RegistrationOpen);
    }

    #[tokio::test]
    async fn list_tournaments_accepts_bare_array() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tournaments")
            .with_status(200)
            .with_body(r#"[{"id": "t1"}, {"id": "t2"}]"#)
            .create_async()
            .await;

        let api = EduSportsApi::new(server.url(), None);
        assert_eq!(api.list_tournaments().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unauthorized_surfaces_as_unauthorized_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tournaments/t1")
            .with_status(401)
            .create_async()
            .await;

        let api = EduSportsApi::new(server.url(), Some("stale".into()));
        let err = api.fetch_tournament("t1").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn gets_retry_until_attempts_are_exhausted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tournaments")
            .with_status(500)
            .expect(RETRY_ATTEMPTS as usize)
            .create_async()
            .await;

        let api = EduSportsApi::new(server.url(), None);
        let err = api.list_tournaments().await.unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn mutations_do_not_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/tournaments/t1/start")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let api = EduSportsApi::new(server.url(), None);
        let err = api.start_tournament("t1").await.unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bearer_token_is_attached_to_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/news")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body(r#"{"content": []}"#)
            .expect(1)
            .create_async()
            .await;

        let api = EduSportsApi::new(server.url(), Some("secret".into()));
        assert!(api.list_news().await.unwrap().is_empty());
        mock.assert_async().await;
    }
}
