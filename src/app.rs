use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use chrono::{Days, Local, NaiveDate};
use mlb_api::{AffiliateGame, GameExtraInfo, ScheduleTile, VenueInfo};
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Schedule,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();

        let app = Self {
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from main_ui_loop
    // -----------------------------------------------------------------------
    // Date-keyed handlers return false for responses that arrive after the
    // user has moved to a different date; the caller drops those on the
    // floor, so the latest request always wins.

    pub fn on_schedule_loaded(&mut self, date: NaiveDate, games: Vec<AffiliateGame>) -> bool {
        if date != self.state.schedule.date {
            return false;
        }
        self.state.last_error = None;
        self.state.schedule.load_games(games);
        true
    }

    pub fn on_schedule_failed(&mut self, date: NaiveDate, message: String) -> bool {
        if date != self.state.schedule.date {
            return false;
        }
        self.state.last_error = Some(message);
        self.state.schedule.load_games(Vec::new());
        true
    }

    pub fn on_venues_loaded(&mut self, date: NaiveDate, venues: Vec<VenueInfo>) -> bool {
        if date != self.state.schedule.date {
            return false;
        }
        self.state.schedule.load_venues(venues);
        true
    }

    pub fn on_venues_failed(&mut self, date: NaiveDate, message: String) -> bool {
        if date != self.state.schedule.date {
            return false;
        }
        self.state.schedule.venue_failure(message);
        true
    }

    /// Enrichment is keyed by gamePk, not date, so a late batch still feeds
    /// the cache; it just doesn't redraw a view it no longer belongs to.
    pub fn on_extra_info_loaded(
        &mut self,
        date: NaiveDate,
        info_by_pk: HashMap<u64, GameExtraInfo>,
    ) -> bool {
        if date == self.state.schedule.date {
            self.state.schedule.merge_extra_info(info_by_pk);
            true
        } else {
            self.state.schedule.extra_by_pk.extend(info_by_pk);
            false
        }
    }

    pub fn on_demo_loaded(&mut self, tile: ScheduleTile) {
        self.state.demo.loaded(tile);
    }

    pub fn on_demo_failed(&mut self, message: String) {
        self.state.demo.failed(message);
    }

    // -----------------------------------------------------------------------
    // Date control
    // -----------------------------------------------------------------------

    /// Step the selected date by one day and return the new date so the
    /// caller can issue the reload.
    pub fn step_date(&mut self, forward: bool) -> NaiveDate {
        let current = self.state.schedule.date;
        let next = if forward {
            current.checked_add_days(Days::new(1))
        } else {
            current.checked_sub_days(Days::new(1))
        }
        .unwrap_or(current);
        self.state.schedule.select_date(next);
        next
    }

    pub fn goto_today(&mut self) -> NaiveDate {
        let today = Local::now().date_naive();
        self.state.schedule.select_date(today);
        today
    }

    /// Returns true when a demo fetch should be issued.
    pub fn toggle_demo(&mut self) -> bool {
        self.state.demo.toggle()
    }

    // -----------------------------------------------------------------------
    // Row navigation — the demo overlay row counts when it is showing
    // -----------------------------------------------------------------------

    fn visible_row_count(&self) -> usize {
        let demo_row = (self.state.demo.visible && self.state.demo.tile.is_some()) as usize;
        self.state.schedule.tiles.len() + demo_row
    }

    pub fn row_down(&mut self) {
        let max = self.visible_row_count().saturating_sub(1);
        if self.state.schedule.selected_row < max {
            self.state.schedule.selected_row += 1;
        }
    }

    pub fn row_up(&mut self) {
        self.state.schedule.selected_row = self.state.schedule.selected_row.saturating_sub(1);
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn app_on(d: u32) -> App {
        let mut app = App {
            settings: AppSettings::default(),
            state: AppState::new(),
        };
        app.state.schedule.select_date(date(d));
        app
    }

    #[test]
    fn stale_schedule_responses_are_discarded() {
        let mut app = app_on(15);
        assert!(!app.on_schedule_loaded(date(14), vec![AffiliateGame::default()]));
        assert!(app.state.schedule.games.is_empty());

        assert!(app.on_schedule_loaded(date(15), vec![AffiliateGame::default()]));
        assert_eq!(app.state.schedule.games.len(), 1);
    }

    #[test]
    fn stale_venue_failure_does_not_touch_current_view() {
        let mut app = app_on(15);
        assert!(!app.on_venues_failed(date(14), "Unable to load venue details".into()));
        assert!(app.state.schedule.venue_error.is_none());
    }

    #[test]
    fn late_extra_info_still_feeds_the_cache() {
        let mut app = app_on(15);
        let mut info = HashMap::new();
        info.insert(901, GameExtraInfo::default());

        assert!(!app.on_extra_info_loaded(date(14), info));
        assert!(app.state.schedule.extra_by_pk.contains_key(&901));
    }

    #[test]
    fn schedule_failure_clears_the_tile_list() {
        let mut app = app_on(15);
        assert!(app.on_schedule_loaded(date(15), vec![AffiliateGame::default()]));
        assert!(!app.state.schedule.tiles.is_empty());

        assert!(app.on_schedule_failed(date(15), "Failed to load schedule. Please try again.".into()));
        assert!(app.state.schedule.tiles.is_empty());
        assert!(app.state.last_error.is_some());
    }

    #[test]
    fn step_date_moves_one_day_and_resets_the_view() {
        let mut app = app_on(15);
        app.state.schedule.loaded = true;
        assert_eq!(app.step_date(true), date(16));
        assert_eq!(app.step_date(false), date(15));
        assert!(!app.state.schedule.loaded);
    }
}
