use crate::state::network::LoadingState;
use chrono::NaiveDate;
use crossterm::event::KeyEvent;
use mlb_api::{AffiliateGame, GameExtraInfo, ScheduleTile, VenueInfo};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadSchedule { date: NaiveDate },
    /// Re-fetch the last loaded date. Sent by the periodic refresher; a no-op
    /// until the first LoadSchedule has been served.
    RefreshSchedule,
    LoadVenues { date: NaiveDate, venue_ids: Vec<u64> },
    LoadExtraInfo { date: NaiveDate, game_pks: Vec<u64> },
    LoadDemo,
}

/// Schedule-derived responses carry the date they were fetched for; the app
/// drops any whose date no longer matches the selected one, so the latest
/// request always wins without cancellation plumbing.
#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    ScheduleLoaded { date: NaiveDate, games: Vec<AffiliateGame>, venue_ids: Vec<u64> },
    ScheduleFailed { date: NaiveDate, message: String },
    VenuesLoaded { date: NaiveDate, venues: Vec<VenueInfo> },
    VenuesFailed { date: NaiveDate, message: String },
    ExtraInfoLoaded { date: NaiveDate, info_by_pk: HashMap<u64, GameExtraInfo> },
    DemoLoaded { tile: Box<ScheduleTile> },
    DemoFailed { message: String },
}

impl NetworkResponse {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            NetworkResponse::ScheduleFailed { .. }
                | NetworkResponse::VenuesFailed { .. }
                | NetworkResponse::DemoFailed { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
