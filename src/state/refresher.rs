use crate::app::App;
use crate::state::messages::NetworkRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::interval;

/// Periodic match refresh — every 30 seconds while a tournament is open.
/// Only re-fetches match records; the heavier bundle load happens when the
/// operator opens a tournament.
pub struct PeriodicRefresher {
    app: Arc<Mutex<App>>,
    network_requests: mpsc::Sender<NetworkRequest>,
}

impl PeriodicRefresher {
    pub fn new(app: Arc<Mutex<App>>, network_requests: mpsc::Sender<NetworkRequest>) -> Self {
        Self { app, network_requests }
    }

    pub async fn run(self) {
        let mut refresh_interval = interval(Duration::from_secs(30));
        // Skip the immediate first tick so startup loading isn't double-triggered.
        refresh_interval.tick().await;

        loop {
            refresh_interval.tick().await;
            let tournament_id = {
                let guard = self.app.lock().await;
                if guard.state.session_expired {
                    continue;
                }
                guard.state.selected_tournament_id.clone()
            };
            if let Some(tournament_id) = tournament_id {
                let _ = self
                    .network_requests
                    .send(NetworkRequest::RefreshMatches { tournament_id })
                    .await;
            }
        }
    }
}
