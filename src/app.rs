use crate::state::app_settings::AppSettings;
use crate::state::app_state::{
    AppState, ArticleForm, MatchForm, ToastLevel, TournamentForm,
};
use crate::state::messages::NetworkRequest;
use edusports_api::{Attachment, Bracket, Match, NewsArticle, Team, Tournament};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Tournaments,
    Detail,
    Bracket,
    Matches,
    Teams,
    News,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(has_token: bool) -> Self {
        let settings = AppSettings::load();

        let mut app = Self {
            state: AppState::new(settings.items_per_page),
            settings,
        };
        app.state.session_expired = !has_token;
        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_tournaments_loaded(&mut self, tournaments: Vec<Tournament>) {
        self.state.list.load(tournaments);
    }

    pub fn on_bundle_loaded(
        &mut self,
        tournament: Tournament,
        matches: Vec<Match>,
        bracket: Bracket,
        teams: Vec<Team>,
    ) {
        self.state.selected_tournament_id = Some(tournament.id.clone());
        self.state.detail.load(tournament, matches, teams);
        let active = self.state.detail.active_round();
        self.state.bracket.load(bracket, active);
    }

    /// Merge a periodic match refresh. Ignored when the operator has since
    /// navigated to a different tournament.
    pub fn on_matches_refreshed(&mut self, tournament_id: &str, matches: Vec<Match>) {
        if self.state.selected_tournament_id.as_deref() != Some(tournament_id) {
            return;
        }
        self.state.bracket.merge_updates(matches.clone());
        self.state.detail.merge_matches(matches);
    }

    pub fn on_mutation_applied(&mut self, message: String) {
        self.state.toasts.push(ToastLevel::Success, message);
    }

    pub fn on_news_loaded(&mut self, articles: Vec<NewsArticle>) {
        self.state.news.load(articles);
    }

    pub fn on_attachment_uploaded(&mut self, article_id: &str, attachment: Attachment) {
        if let Some(article) = self.state.news.articles.iter_mut().find(|a| a.id == article_id) {
            article.attachments.push(attachment);
        }
        self.state.toasts.push(ToastLevel::Success, "Attachment uploaded");
    }

    pub fn on_session_expired(&mut self) {
        self.state.session_expired = true;
        self.state.toasts.push(
            ToastLevel::Error,
            "Session expired — token cleared. Restart with a fresh ESTUI_API_TOKEN.",
        );
    }

    pub fn on_error(&mut self, message: String) {
        self.state.toasts.push(ToastLevel::Error, message);
    }

    pub fn toast_info(&mut self, message: impl Into<String>) {
        self.state.toasts.push(ToastLevel::Info, message);
    }

    pub fn toast_error(&mut self, message: impl Into<String>) {
        self.state.toasts.push(ToastLevel::Error, message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
        self.settings.save();
    }

    /// Whether a text field currently owns the keyboard.
    pub fn is_editing(&self) -> bool {
        self.state.list.form.is_some()
            || self.state.matches.form.is_some()
            || self.state.news.form.is_some()
            || self.state.teams.registering
            || self.state.news.uploading
    }

    // -----------------------------------------------------------------------
    // Tournament list actions
    // -----------------------------------------------------------------------

    /// Enter on the list: switch to Detail and request the full bundle.
    pub fn open_selected_tournament(&mut self) -> Option<NetworkRequest> {
        let tournament = self.state.list.selected_tournament()?;
        self.state.selected_tournament_id = Some(tournament.id.clone());
        self.update_tab(MenuItem::Detail);
        Some(NetworkRequest::LoadTournamentBundle { tournament_id: tournament.id })
    }

    pub fn start_create_tournament(&mut self) {
        self.state.list.form = Some(TournamentForm::default());
    }

    pub fn start_edit_tournament(&mut self) {
        if let Some(t) = self.state.list.selected_tournament() {
            self.state.list.form = Some(TournamentForm::for_edit(&t));
        }
    }

    /// First `d` arms the delete; the second on the same tournament fires it.
    pub fn request_delete_tournament(&mut self) -> Option<NetworkRequest> {
        let tournament = self.state.list.selected_tournament()?;
        if self.state.list.confirm_delete.as_deref() == Some(tournament.id.as_str()) {
            self.state.list.confirm_delete = None;
            Some(NetworkRequest::DeleteTournament { tournament_id: tournament.id })
        } else {
            self.state.list.confirm_delete = Some(tournament.id.clone());
            self.toast_info(format!("Press d again to delete '{}'", tournament.name));
            None
        }
    }

    pub fn submit_tournament_form(&mut self) -> Option<NetworkRequest> {
        let form = self.state.list.form.clone()?;
        match form.parse() {
            Ok(draft) => {
                self.state.list.form = None;
                Some(match form.editing_id {
                    Some(tournament_id) => {
                        NetworkRequest::UpdateTournament { tournament_id, draft }
                    }
                    None => NetworkRequest::CreateTournament { draft },
                })
            }
            Err(msg) => {
                self.toast_error(msg);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Detail lifecycle actions
    // -----------------------------------------------------------------------

    pub fn lifecycle_request(
        &mut self,
        build: fn(String) -> NetworkRequest,
    ) -> Option<NetworkRequest> {
        let Some(id) = self.state.selected_tournament_id.clone() else {
            self.toast_error("Open a tournament first");
            return None;
        };
        Some(build(id))
    }

    /// Completing a tournament cannot be undone, so it arms like delete:
    /// the first `F` warns, the second on the same tournament fires.
    pub fn request_complete_tournament(&mut self) -> Option<NetworkRequest> {
        let Some(id) = self.state.selected_tournament_id.clone() else {
            self.toast_error("Open a tournament first");
            return None;
        };
        if self.state.detail.confirm_complete.as_deref() == Some(id.as_str()) {
            self.state.detail.confirm_complete = None;
            Some(NetworkRequest::CompleteTournament { tournament_id: id })
        } else {
            self.state.detail.confirm_complete = Some(id);
            self.toast_info("Press F again to complete the tournament");
            None
        }
    }

    // -----------------------------------------------------------------------
    // Match result entry
    // -----------------------------------------------------------------------

    pub fn open_match_form(&mut self) {
        let Some(m) = self
            .state
            .detail
            .matches
            .get(self.state.matches.selected)
            .cloned()
        else {
            return;
        };
        if let Err(msg) = self.state.matches.open_form(&m) {
            self.toast_error(msg);
        }
    }

    pub fn submit_match_form(&mut self) -> Option<NetworkRequest> {
        let form: MatchForm = self.state.matches.form.clone()?;
        let tournament_id = self.state.selected_tournament_id.clone()?;
        match form.parse() {
            Ok(result) => {
                self.state.matches.form = None;
                Some(NetworkRequest::SubmitMatchResult {
                    tournament_id,
                    match_id: form.match_id,
                    result,
                })
            }
            Err(msg) => {
                self.toast_error(msg);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    pub fn submit_team_registration(&mut self) -> Option<NetworkRequest> {
        let tournament_id = self.state.selected_tournament_id.clone()?;
        let name = self.state.teams.submit_registration()?;
        if let Some(t) = &self.state.detail.tournament
            && t.is_full()
        {
            // Let the backend make the final call, but warn up front.
            self.toast_info("Tournament is full — registration may be rejected");
        }
        Some(NetworkRequest::RegisterTeam { tournament_id, name })
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.state.detail.teams.get(self.state.teams.selected)
    }

    pub fn approve_selected_team(&mut self) -> Option<NetworkRequest> {
        let tournament_id = self.state.selected_tournament_id.clone()?;
        let team_id = self.selected_team()?.id.clone();
        Some(NetworkRequest::ApproveTeam { tournament_id, team_id })
    }

    pub fn reject_selected_team(&mut self) -> Option<NetworkRequest> {
        let tournament_id = self.state.selected_tournament_id.clone()?;
        let team_id = self.selected_team()?.id.clone();
        Some(NetworkRequest::RejectTeam { tournament_id, team_id })
    }

    // -----------------------------------------------------------------------
    // News
    // -----------------------------------------------------------------------

    pub fn start_create_article(&mut self) {
        self.state.news.form = Some(ArticleForm::default());
    }

    pub fn start_edit_article(&mut self) {
        if let Some(article) = self.state.news.selected_article() {
            self.state.news.form = Some(ArticleForm::for_edit(article));
        }
    }

    pub fn submit_article_form(&mut self) -> Option<NetworkRequest> {
        let form = self.state.news.form.clone()?;
        match form.parse() {
            Ok(draft) => {
                self.state.news.form = None;
                Some(match form.editing_id {
                    Some(article_id) => NetworkRequest::UpdateArticle { article_id, draft },
                    None => NetworkRequest::CreateArticle { draft },
                })
            }
            Err(msg) => {
                self.toast_error(msg);
                None
            }
        }
    }

    pub fn request_delete_article(&mut self) -> Option<NetworkRequest> {
        let article = self.state.news.selected_article()?;
        let (id, name) = (article.id.clone(), article.name.clone());
        if self.state.news.confirm_delete.as_deref() == Some(id.as_str()) {
            self.state.news.confirm_delete = None;
            Some(NetworkRequest::DeleteArticle { article_id: id })
        } else {
            self.state.news.confirm_delete = Some(id);
            self.toast_info(format!("Press d again to delete '{name}'"));
            None
        }
    }

    pub fn submit_attachment_upload(&mut self) -> Option<NetworkRequest> {
        let article_id = self.state.news.selected_article()?.id.clone();
        let path = self.state.news.submit_upload()?;
        Some(NetworkRequest::UploadAttachment { article_id, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_tournament_needs_second_press() {
        let mut app = App::new(true);
        app.state.selected_tournament_id = Some("t-1".to_string());

        // First press only arms it.
        assert!(app.request_complete_tournament().is_none());
        assert_eq!(app.state.detail.confirm_complete.as_deref(), Some("t-1"));

        let request = app.request_complete_tournament();
        assert!(matches!(
            request,
            Some(NetworkRequest::CompleteTournament { ref tournament_id }) if tournament_id == "t-1"
        ));
        assert!(app.state.detail.confirm_complete.is_none());
    }

    #[test]
    fn test_complete_arm_resets_on_tournament_switch() {
        let mut app = App::new(true);
        app.state.selected_tournament_id = Some("t-1".to_string());
        assert!(app.request_complete_tournament().is_none());

        // Switching tournaments re-arms instead of completing the new one.
        app.state.selected_tournament_id = Some("t-2".to_string());
        assert!(app.request_complete_tournament().is_none());
        assert_eq!(app.state.detail.confirm_complete.as_deref(), Some("t-2"));
    }

    #[test]
    fn test_complete_without_open_tournament_is_refused() {
        let mut app = App::new(true);
        assert!(app.request_complete_tournament().is_none());
        assert!(app.state.detail.confirm_complete.is_none());
    }
}
