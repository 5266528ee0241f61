use crate::app::MenuItem;
use chrono::{Local, NaiveDate};
use mlb_api::{AffiliateGame, GameExtraInfo, ScheduleTile, VenueInfo, client};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Schedule state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ScheduleState {
    /// The date the dashboard is showing. Defaults to today, viewer timezone.
    pub date: NaiveDate,
    pub games: Vec<AffiliateGame>,
    pub venue_map: HashMap<u64, VenueInfo>,
    /// Live-feed enrichment keyed by gamePk. Survives date changes; a pk
    /// identifies the same game no matter which date view found it.
    pub extra_by_pk: HashMap<u64, GameExtraInfo>,
    /// Display rows, regenerated whenever games, venues, or enrichment change.
    pub tiles: Vec<ScheduleTile>,
    pub venue_error: Option<String>,
    pub selected_row: usize,
    pub scroll_offset: u16,
    /// True once the first schedule response for `date` has landed.
    pub loaded: bool,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            date: Local::now().date_naive(),
            games: Vec::new(),
            venue_map: HashMap::new(),
            extra_by_pk: HashMap::new(),
            tiles: Vec::new(),
            venue_error: None,
            selected_row: 0,
            scroll_offset: 0,
            loaded: false,
        }
    }
}

impl ScheduleState {
    /// Switch the dashboard to a different date. Everything date-scoped is
    /// dropped; the per-pk enrichment cache is not.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.games.clear();
        self.venue_map.clear();
        self.tiles.clear();
        self.venue_error = None;
        self.selected_row = 0;
        self.scroll_offset = 0;
        self.loaded = false;
    }

    pub fn load_games(&mut self, games: Vec<AffiliateGame>) {
        self.games = games;
        self.venue_map.clear();
        self.venue_error = None;
        self.loaded = true;
        self.regenerate_tiles();
    }

    pub fn load_venues(&mut self, venues: Vec<VenueInfo>) {
        self.venue_map = client::venue_map(venues);
        self.venue_error = None;
        self.regenerate_tiles();
    }

    /// A failed venue lookup leaves tiles showing the raw schedule venue
    /// names rather than half-resolved ones.
    pub fn venue_failure(&mut self, message: String) {
        self.venue_map.clear();
        self.venue_error = Some(message);
        self.regenerate_tiles();
    }

    pub fn merge_extra_info(&mut self, info_by_pk: HashMap<u64, GameExtraInfo>) {
        self.extra_by_pk.extend(info_by_pk);
        self.regenerate_tiles();
    }

    pub fn regenerate_tiles(&mut self) {
        let enriched = client::apply_extra_info(self.games.clone(), &self.extra_by_pk);
        self.tiles = client::generate_game_tiles(&enriched, &self.venue_map);
        self.selected_row = self.selected_row.min(self.tiles.len().saturating_sub(1));
    }

    /// GamePks worth enriching on this date view.
    pub fn game_pks(&self) -> Vec<u64> {
        self.games.iter().filter_map(|g| g.game_pk).collect()
    }
}

// ---------------------------------------------------------------------------
// Live demo state
// ---------------------------------------------------------------------------

/// One-shot state machine: idle → loading → tile or error. The historical
/// feed never changes, so a loaded tile is kept for the session and
/// re-toggling only flips visibility.
#[derive(Debug, Default)]
pub struct DemoState {
    pub tile: Option<ScheduleTile>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub visible: bool,
}

impl DemoState {
    /// Flip visibility. Returns true when a fetch should be issued.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        if self.visible && self.tile.is_none() && !self.is_loading {
            self.is_loading = true;
            self.error = None;
            return true;
        }
        false
    }

    pub fn loaded(&mut self, tile: ScheduleTile) {
        self.is_loading = false;
        self.error = None;
        self.tile = Some(tile);
    }

    pub fn failed(&mut self, message: String) {
        self.is_loading = false;
        self.tile = None;
        self.error = Some(message);
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub schedule: ScheduleState,
    pub demo: DemoState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_date_keeps_enrichment_but_drops_venues() {
        let mut state = ScheduleState::default();
        state.extra_by_pk.insert(42, GameExtraInfo::default());
        state.venue_map.insert(7, VenueInfo::default());
        state.loaded = true;

        let date = NaiveDate::from_ymd_opt(2025, 7, 16).unwrap();
        state.select_date(date);

        assert_eq!(state.date, date);
        assert!(!state.loaded);
        assert!(state.venue_map.is_empty());
        assert!(state.extra_by_pk.contains_key(&42));
    }

    #[test]
    fn demo_toggle_fetches_once_and_only_once() {
        let mut demo = DemoState::default();
        assert!(demo.toggle(), "first show triggers the fetch");
        assert!(demo.is_loading);

        assert!(!demo.toggle(), "hiding never fetches");
        assert!(!demo.toggle(), "re-showing while loading does not refetch");

        demo.loaded(ScheduleTile::default());
        demo.visible = false;
        assert!(!demo.toggle(), "re-showing a loaded tile does not refetch");
        assert!(demo.visible);
    }

    #[test]
    fn demo_failure_allows_a_retry_on_next_show() {
        let mut demo = DemoState::default();
        assert!(demo.toggle());
        demo.failed("Live demo request failed: 503".into());
        assert!(!demo.toggle()); // hide
        assert!(demo.toggle(), "showing again after a failure retries");
        assert!(demo.error.is_none());
    }
}
