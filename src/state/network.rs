use crate::state::messages::{Invalidate, NetworkRequest, NetworkResponse};
use edusports_api::client::{ApiError, ApiResult, EduSportsApi};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Owns the API client and serializes all HTTP work onto one task. Every
/// request ends in exactly one response on the channel; 401s additionally
/// clear the stored token before reporting `SessionExpired`.
pub struct NetworkWorker {
    client: EduSportsApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: EduSportsApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = self.dispatch(request).await;

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = match result {
                Ok(response) => response,
                Err(err) if err.is_unauthorized() => {
                    self.client.clear_token();
                    NetworkResponse::SessionExpired
                }
                Err(err) => {
                    error!("api error: {err}");
                    NetworkResponse::Error { message: err.user_message() }
                }
            };

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn dispatch(&self, request: NetworkRequest) -> ApiResult<NetworkResponse> {
        match request {
            NetworkRequest::LoadTournaments => {
                debug!("loading tournament list");
                let tournaments = self.client.list_tournaments().await?;
                Ok(NetworkResponse::TournamentsLoaded { tournaments })
            }
            NetworkRequest::LoadTournamentBundle { tournament_id } => {
                debug!("loading bundle for tournament {tournament_id}");
                let tournament = self.client.fetch_tournament(&tournament_id).await?;
                let matches = self.client.list_matches(&tournament_id).await?;
                let bracket = self.client.fetch_bracket(&tournament_id).await?;
                let teams = self.client.list_teams(&tournament_id).await?;
                Ok(NetworkResponse::TournamentBundleLoaded { tournament, matches, bracket, teams })
            }
            NetworkRequest::RefreshMatches { tournament_id } => {
                debug!("refreshing matches for {tournament_id}");
                let matches = self.client.list_matches(&tournament_id).await?;
                Ok(NetworkResponse::MatchesRefreshed { tournament_id, matches })
            }
            NetworkRequest::CreateTournament { draft } => {
                let tournament = self.client.create_tournament(&draft).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: format!("Created tournament '{}'", tournament.name),
                    refresh: Invalidate::TournamentList,
                })
            }
            NetworkRequest::UpdateTournament { tournament_id, draft } => {
                let tournament = self.client.update_tournament(&tournament_id, &draft).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: format!("Updated '{}'", tournament.name),
                    refresh: Invalidate::Tournament(tournament_id),
                })
            }
            NetworkRequest::DeleteTournament { tournament_id } => {
                self.client.delete_tournament(&tournament_id).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: "Tournament deleted".to_string(),
                    refresh: Invalidate::TournamentList,
                })
            }
            NetworkRequest::GenerateBracket { tournament_id } => {
                self.client.generate_bracket(&tournament_id).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: "Bracket generated".to_string(),
                    refresh: Invalidate::Tournament(tournament_id),
                })
            }
            NetworkRequest::StartTournament { tournament_id } => {
                self.client.start_tournament(&tournament_id).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: "Tournament started".to_string(),
                    refresh: Invalidate::Tournament(tournament_id),
                })
            }
            NetworkRequest::AdvanceRound { tournament_id } => {
                self.client.advance_round(&tournament_id).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: "Round advanced".to_string(),
                    refresh: Invalidate::Tournament(tournament_id),
                })
            }
            NetworkRequest::CompleteTournament { tournament_id } => {
                self.client.complete_tournament(&tournament_id).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: "Tournament completed".to_string(),
                    refresh: Invalidate::Tournament(tournament_id),
                })
            }
            NetworkRequest::RegisterTeam { tournament_id, name } => {
                let team = self.client.register_team(&tournament_id, &name).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: format!("Registered '{}' ({})", team.name, team.registration_status.label()),
                    refresh: Invalidate::Tournament(tournament_id),
                })
            }
            NetworkRequest::ApproveTeam { tournament_id, team_id } => {
                self.client.approve_team(&tournament_id, &team_id).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: "Team approved".to_string(),
                    refresh: Invalidate::Tournament(tournament_id),
                })
            }
            NetworkRequest::RejectTeam { tournament_id, team_id } => {
                self.client.reject_team(&tournament_id, &team_id).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: "Team rejected".to_string(),
                    refresh: Invalidate::Tournament(tournament_id),
                })
            }
            NetworkRequest::SubmitMatchResult { tournament_id, match_id, result } => {
                let updated = self.client.update_match_result(&match_id, &result).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: format!("Result saved: {}", updated.winner_label()),
                    refresh: Invalidate::Tournament(tournament_id),
                })
            }
            NetworkRequest::LoadNews => {
                debug!("loading news articles");
                let articles = self.client.list_news().await?;
                Ok(NetworkResponse::NewsLoaded { articles })
            }
            NetworkRequest::CreateArticle { draft } => {
                let article = self.client.create_article(&draft).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: format!("Published '{}'", article.name),
                    refresh: Invalidate::News,
                })
            }
            NetworkRequest::UpdateArticle { article_id, draft } => {
                let article = self.client.update_article(&article_id, &draft).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: format!("Updated '{}'", article.name),
                    refresh: Invalidate::News,
                })
            }
            NetworkRequest::DeleteArticle { article_id } => {
                self.client.delete_article(&article_id).await?;
                Ok(NetworkResponse::MutationApplied {
                    message: "Article deleted".to_string(),
                    refresh: Invalidate::News,
                })
            }
            NetworkRequest::UploadAttachment { article_id, path } => {
                let filename = std::path::Path::new(&path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("attachment")
                    .to_string();
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| ApiError::Other(format!("could not read {path}: {e}")))?;
                let attachment = self.client.upload_attachment(&article_id, &filename, bytes).await?;
                Ok(NetworkResponse::AttachmentUploaded { article_id, attachment })
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
