use crate::state::messages::{NetworkRequest, NetworkResponse};
use chrono::NaiveDate;
use futures_util::future::join_all;
use log::{debug, error};
use mlb_api::client::StatsApi;
use mlb_api::{ExtraInfoCache, client};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

/// User-facing failure messages. Transport detail goes to the log, not the
/// schedule pane.
pub const SCHEDULE_ERROR: &str = "Failed to load schedule. Please try again.";
pub const VENUE_ERROR: &str = "Unable to load venue details";

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

pub struct NetworkWorker {
    client: StatsApi,
    /// Per-gamePk enrichment, kept for the whole session so revisiting a
    /// date never refetches a live feed.
    extra_cache: ExtraInfoCache,
    last_date: Option<NaiveDate>,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client: StatsApi::new(),
            extra_cache: ExtraInfoCache::new(),
            last_date: None,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            // Nothing to refresh before the first schedule load.
            if matches!(request, NetworkRequest::RefreshSchedule) && self.last_date.is_none() {
                continue;
            }

            self.start_loading_animation().await;

            let response = match request {
                NetworkRequest::LoadSchedule { date } => self.handle_load_schedule(date).await,
                NetworkRequest::RefreshSchedule => {
                    let date = self.last_date.unwrap_or_default();
                    self.handle_load_schedule(date).await
                }
                NetworkRequest::LoadVenues { date, venue_ids } => {
                    self.handle_load_venues(date, venue_ids).await
                }
                NetworkRequest::LoadExtraInfo { date, game_pks } => {
                    self.handle_load_extra_info(date, game_pks).await
                }
                NetworkRequest::LoadDemo => self.handle_load_demo().await,
            };

            debug!("network request complete");
            self.stop_loading_animation(!response.is_failure()).await;

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_schedule(&mut self, date: NaiveDate) -> NetworkResponse {
        debug!("loading schedule for {date}");
        self.last_date = Some(date);
        match self.client.fetch_schedule(date).await {
            Ok(schedule) => {
                let venue_ids = client::collect_venue_ids(&schedule);
                let games = client::map_schedule_to_affiliate_games(Some(&schedule));
                NetworkResponse::ScheduleLoaded { date, games, venue_ids }
            }
            Err(e) => {
                error!("schedule fetch failed: {e}");
                NetworkResponse::ScheduleFailed { date, message: SCHEDULE_ERROR.to_owned() }
            }
        }
    }

    async fn handle_load_venues(&self, date: NaiveDate, venue_ids: Vec<u64>) -> NetworkResponse {
        debug!("loading {} venues for {date}", venue_ids.len());
        match self.client.fetch_venues(&venue_ids).await {
            Ok(venues) => NetworkResponse::VenuesLoaded { date, venues },
            Err(e) => {
                error!("venue fetch failed: {e}");
                NetworkResponse::VenuesFailed { date, message: VENUE_ERROR.to_owned() }
            }
        }
    }

    /// Fetch live-feed enrichment for pks not yet in the cache, concurrently.
    /// Individual feed failures are logged and skipped; the batch still
    /// responds with whatever the cache now holds for the requested pks.
    async fn handle_load_extra_info(
        &mut self,
        date: NaiveDate,
        game_pks: Vec<u64>,
    ) -> NetworkResponse {
        let missing = self.extra_cache.missing(game_pks.iter().copied());
        debug!("loading extra info for {} of {} games", missing.len(), game_pks.len());

        let results = join_all(missing.iter().map(|&pk| self.client.fetch_extra_info(pk))).await;
        for (pk, result) in missing.iter().copied().zip(results) {
            match result {
                Ok(info) => self.extra_cache.insert(pk, info),
                Err(e) => debug!("extra info fetch failed for game {pk}: {e}"),
            }
        }

        NetworkResponse::ExtraInfoLoaded { date, info_by_pk: self.extra_cache.snapshot(&game_pks) }
    }

    async fn handle_load_demo(&self) -> NetworkResponse {
        debug!("loading live demo feed");
        match self.client.fetch_demo_tile().await {
            Ok(tile) => NetworkResponse::DemoLoaded { tile: Box::new(tile) },
            Err(e) => {
                error!("demo feed fetch failed: {e}");
                NetworkResponse::DemoFailed { message: format!("Live demo request failed: {e}") }
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
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
