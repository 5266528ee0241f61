use crate::statsapi::{
    FeedTeam, LiveFeedResponse, Person, ScheduleGame, ScheduleResponse, VenuesResponse,
};
use crate::{
    AFFILIATES, AFFILIATE_PREFIX, AffiliateConfig, AffiliateGame, BASES_PREFIX, Decisions,
    GameExtraInfo, GameStatus, OPPONENT_PREFIX, PitcherPair, ScheduleTile, VenueInfo,
    parent_abbreviation,
};
use chrono::{DateTime, Local, NaiveDate};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const STATSAPI_BASE: &str = "https://statsapi.mlb.com";

/// Levels queried alongside the affiliate ids: MLB down through rookie ball.
const SPORT_IDS: [u32; 6] = [1, 11, 12, 13, 14, 16];

/// Historical Marlins game backing the live-demo overlay.
pub const DEMO_GAME_PK: u64 = 567074;

/// MLB Stats API client for schedules, venues, and live game feeds.
#[derive(Debug, Clone)]
pub struct StatsApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for StatsApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("farmtui/0.1 (affiliate schedule dashboard)")
                .build()
                .unwrap_or_default(),
            base_url: STATSAPI_BASE.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
        }
    }
}

impl StatsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at a different host. Used by tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    /// Fetch the schedule for one date across every configured affiliate and
    /// every tracked league level. The endpoint takes repeated `teamId` and
    /// `sportId` parameters and returns `{dates: [{games: [...]}]}`.
    pub async fn fetch_schedule(&self, date: NaiveDate) -> ApiResult<ScheduleResponse> {
        let mut params: Vec<(&str, String)> = AFFILIATES
            .iter()
            .map(|a| ("teamId", a.team_id.to_string()))
            .collect();
        params.extend(SPORT_IDS.iter().map(|s| ("sportId", s.to_string())));
        params.push(("date", date.format("%Y-%m-%d").to_string()));

        let url = format!("{}/api/v1/schedule", self.base_url);
        self.get(&url, &params).await
    }

    /// Fetch venue details for a batch of ids in a single call, hydrated
    /// with location data.
    pub async fn fetch_venues(&self, venue_ids: &[u64]) -> ApiResult<Vec<VenueInfo>> {
        if venue_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = venue_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let params = [("venueIds", ids), ("hydrate", "location".to_owned())];

        let url = format!("{}/api/v1/venues", self.base_url);
        let raw: VenuesResponse = self.get(&url, &params).await?;
        Ok(map_venues(raw))
    }

    /// Fetch one game's live feed and extract the enrichment fields.
    pub async fn fetch_extra_info(&self, game_pk: u64) -> ApiResult<GameExtraInfo> {
        let raw = self.fetch_live_feed(game_pk).await?;
        Ok(map_feed_to_extra_info(&raw))
    }

    /// Fetch the hardcoded demo game's live feed and map it into a tile.
    pub async fn fetch_demo_tile(&self) -> ApiResult<ScheduleTile> {
        let raw = self.fetch_live_feed(DEMO_GAME_PK).await?;
        Ok(map_live_feed_to_demo_tile(&raw))
    }

    async fn fetch_live_feed(&self, game_pk: u64) -> ApiResult<LiveFeedResponse> {
        let url = format!("{}/api/v1.1/game/{game_pk}/feed/live", self.base_url);
        self.get(&url, &[] as &[(&str, String)]).await
    }

    async fn get<T, Q>(&self, url: &str, query: &Q) -> ApiResult<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => Err(ApiError::Api(e, url.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: schedule wire → per-affiliate games
// ---------------------------------------------------------------------------

/// Produce exactly one record per configured affiliate, in configuration
/// order, from the first (only) date entry of a schedule response.
///
/// A raw game is attributed to the affiliate on its home side first; when
/// both sides are configured affiliates the away one shows no game that date
/// (preserved upstream ambiguity, not corrected here).
pub fn map_schedule_to_affiliate_games(schedule: Option<&ScheduleResponse>) -> Vec<AffiliateGame> {
    let first_date = schedule
        .and_then(|s| s.dates.as_deref())
        .and_then(|dates| dates.first());

    let Some(date) = first_date else {
        return AFFILIATES.iter().map(no_game_record).collect();
    };

    let mut game_by_affiliate: HashMap<u64, &ScheduleGame> = HashMap::new();
    for game in date.games.iter().flatten() {
        let claimed = [side_team_id(game, true), side_team_id(game, false)]
            .into_iter()
            .flatten()
            .find(|id| AFFILIATES.iter().any(|a| a.team_id == *id));
        if let Some(team_id) = claimed {
            game_by_affiliate.insert(team_id, game);
        }
    }

    AFFILIATES
        .iter()
        .map(|aff| match game_by_affiliate.get(&aff.team_id) {
            Some(game) => map_game(aff, game),
            None => no_game_record(aff),
        })
        .collect()
}

fn side_team_id(game: &ScheduleGame, home: bool) -> Option<u64> {
    let teams = game.teams.as_ref()?;
    let side = if home { teams.home.as_ref() } else { teams.away.as_ref() };
    side?.team.as_ref()?.id
}

fn side_team_name(game: &ScheduleGame, home: bool) -> Option<String> {
    let teams = game.teams.as_ref()?;
    let side = if home { teams.home.as_ref() } else { teams.away.as_ref() };
    side?.team.as_ref()?.name.clone()
}

fn side_score(game: &ScheduleGame, home: bool) -> Option<u32> {
    let teams = game.teams.as_ref()?;
    let side = if home { teams.home.as_ref() } else { teams.away.as_ref() };
    side?.score
}

fn no_game_record(aff: &AffiliateConfig) -> AffiliateGame {
    AffiliateGame {
        affiliate_team_id: aff.team_id,
        affiliate_name: aff.name.to_owned(),
        level_label: aff.level.to_owned(),
        has_game: false,
        ..Default::default()
    }
}

fn map_game(aff: &AffiliateConfig, game: &ScheduleGame) -> AffiliateGame {
    let status = game.status.as_ref();
    let abstract_state = status.and_then(|s| s.abstract_game_state.as_deref()).unwrap_or("");
    let detailed_state = status.and_then(|s| s.detailed_state.as_deref()).unwrap_or("");
    let is_home = side_team_id(game, true) == Some(aff.team_id);

    AffiliateGame {
        affiliate_team_id: aff.team_id,
        affiliate_name: aff.name.to_owned(),
        level_label: aff.level.to_owned(),
        has_game: true,
        game_pk: game.game_pk,
        is_home: Some(is_home),
        home_team_name: side_team_name(game, true),
        away_team_name: side_team_name(game, false),
        home_score: side_score(game, true),
        away_score: side_score(game, false),
        status: Some(classify_status(abstract_state, detailed_state)),
        status_text: status.and_then(|s| s.detailed_state.clone()),
        start_time_utc: game.game_date.clone(),
        start_time_tbd: status.and_then(|s| s.start_time_tbd).unwrap_or(false),
        venue_id: game.venue.as_ref().and_then(|v| v.id),
        venue_name: game
            .venue
            .as_ref()
            .and_then(|v| v.name.clone())
            .unwrap_or_default(),
        probable_pitchers: None,
        decisions: None,
        opponent_parent_abbr: None,
    }
}

/// Live detection outranks Final: a feed briefly reports both while a game
/// is being finalized, and "in progress" can appear in the detailed state
/// before the abstract state flips.
fn classify_status(abstract_state: &str, detailed_state: &str) -> GameStatus {
    let abstract_lower = abstract_state.to_lowercase();
    if abstract_lower == "live" || detailed_state.to_lowercase().contains("in progress") {
        return GameStatus::InProgress;
    }
    if abstract_lower == "final" {
        return GameStatus::Final;
    }
    GameStatus::Upcoming
}

/// Distinct venue ids referenced by the first date's games, first-seen order.
pub fn collect_venue_ids(schedule: &ScheduleResponse) -> Vec<u64> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let first_date = schedule.dates.as_deref().and_then(|dates| dates.first());
    for game in first_date.into_iter().flat_map(|d| d.games.iter().flatten()) {
        if let Some(id) = game.venue.as_ref().and_then(|v| v.id)
            && seen.insert(id)
        {
            ids.push(id);
        }
    }
    ids
}

// ---------------------------------------------------------------------------
// Mapping: venues wire → venue infos
// ---------------------------------------------------------------------------

fn map_venues(raw: VenuesResponse) -> Vec<VenueInfo> {
    raw.into_venues()
        .into_iter()
        .filter_map(|v| {
            let id = v.id?;
            let name = v.name?;
            let location = v.location;
            let city = location.as_ref().and_then(|l| l.city.clone());
            // Abbreviation reads best on a tile; fall back through the full
            // state name to the country for venues outside the US.
            let state = location.as_ref().and_then(|l| {
                l.state_abbrev
                    .clone()
                    .or_else(|| l.state.clone())
                    .or_else(|| l.country.clone())
            });
            Some(VenueInfo { id, name, city, state })
        })
        .collect()
}

pub fn venue_map(venues: Vec<VenueInfo>) -> HashMap<u64, VenueInfo> {
    venues.into_iter().map(|v| (v.id, v)).collect()
}

// ---------------------------------------------------------------------------
// Mapping: live feed wire → enrichment info
// ---------------------------------------------------------------------------

pub fn map_feed_to_extra_info(feed: &LiveFeedResponse) -> GameExtraInfo {
    let live = feed.live_data.as_ref();
    let game_data = feed.game_data.as_ref();

    // Prefer the live view's probables over the pre-game view, per side.
    let live_prob = live.and_then(|l| l.probable_pitchers.as_ref());
    let game_prob = game_data.and_then(|g| g.probable_pitchers.as_ref());
    let home_pitcher = person_name(live_prob.and_then(|p| p.home.as_ref()))
        .or_else(|| person_name(game_prob.and_then(|p| p.home.as_ref())));
    let away_pitcher = person_name(live_prob.and_then(|p| p.away.as_ref()))
        .or_else(|| person_name(game_prob.and_then(|p| p.away.as_ref())));
    let probable_pitchers = if home_pitcher.is_some() || away_pitcher.is_some() {
        Some(PitcherPair { home: home_pitcher, away: away_pitcher })
    } else {
        None
    };

    let decisions = live
        .and_then(|l| l.decisions.as_ref())
        .map(|d| Decisions {
            winner: person_name(d.winner.as_ref()),
            loser: person_name(d.loser.as_ref()),
            save: person_name(d.save.as_ref()),
        })
        .filter(|d| d.winner.is_some() || d.loser.is_some() || d.save.is_some());

    let teams = game_data.and_then(|g| g.teams.as_ref());
    let (home_parent_abbr, home_is_mlb) = side_parent(teams.and_then(|t| t.home.as_ref()));
    let (away_parent_abbr, away_is_mlb) = side_parent(teams.and_then(|t| t.away.as_ref()));

    GameExtraInfo {
        probable_pitchers,
        decisions,
        home_parent_abbr,
        away_parent_abbr,
        home_is_mlb,
        away_is_mlb,
    }
}

fn person_name(person: Option<&Person>) -> Option<String> {
    person.and_then(|p| p.full_name.clone())
}

/// Parent abbreviation for a feed side, plus whether the side's own id is a
/// big-league club (in which case the parent abbreviation is its own).
fn side_parent(team: Option<&FeedTeam>) -> (Option<String>, bool) {
    let Some(id) = team.and_then(|t| t.id) else {
        return (None, false);
    };
    let parent_id = team.and_then(|t| t.parent_org_id).unwrap_or(id);
    (
        parent_abbreviation(parent_id).map(str::to_owned),
        parent_abbreviation(id).is_some(),
    )
}

/// Merge cached per-gamePk enrichment into the affiliate records. Same
/// length and order as the input; records without a cached pk pass through
/// untouched. Pitchers and decisions override only when the fetched info
/// carries them.
pub fn apply_extra_info(
    games: Vec<AffiliateGame>,
    info_by_pk: &HashMap<u64, GameExtraInfo>,
) -> Vec<AffiliateGame> {
    games
        .into_iter()
        .map(|mut game| {
            let Some(info) = game.game_pk.and_then(|pk| info_by_pk.get(&pk)) else {
                return game;
            };
            if let Some(pitchers) = &info.probable_pitchers {
                game.probable_pitchers = Some(pitchers.clone());
            }
            if let Some(decisions) = &info.decisions {
                game.decisions = Some(decisions.clone());
            }
            // An MLB opponent needs no parent tag; it is the parent.
            game.opponent_parent_abbr = match game.is_home {
                Some(true) if !info.away_is_mlb => info.away_parent_abbr.clone(),
                Some(false) if !info.home_is_mlb => info.home_parent_abbr.clone(),
                _ => None,
            };
            game
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tile generation
// ---------------------------------------------------------------------------

/// Flatten enriched affiliate records into display tiles. Pure: identical
/// inputs always produce identical tiles.
pub fn generate_game_tiles(
    games: &[AffiliateGame],
    venues: &HashMap<u64, VenueInfo>,
) -> Vec<ScheduleTile> {
    games.iter().map(|game| generate_tile(game, venues)).collect()
}

fn generate_tile(game: &AffiliateGame, venues: &HashMap<u64, VenueInfo>) -> ScheduleTile {
    let id = game.affiliate_team_id.to_string();

    if !game.has_game {
        return ScheduleTile {
            id,
            team_name: game.affiliate_name.clone(),
            level_label: game.level_label.clone(),
            status_label: "NO GAME".to_owned(),
            ..Default::default()
        };
    }

    let is_home = game.is_home.unwrap_or(false);
    let opponent_name = if is_home {
        game.away_team_name.as_deref()
    } else {
        game.home_team_name.as_deref()
    };

    let matchup_label = match opponent_name {
        Some(name) => {
            let parent_chunk = game
                .opponent_parent_abbr
                .as_deref()
                .map(|abbr| format!(" ({abbr})"))
                .unwrap_or_default();
            format!("{}{name}{parent_chunk}", if is_home { "v " } else { "@ " })
        }
        None => String::new(),
    };

    let status_label = match game.status {
        Some(GameStatus::Final) => "Final".to_owned(),
        Some(GameStatus::InProgress) => game
            .status_text
            .clone()
            .unwrap_or_else(|| "In Progress".to_owned()),
        Some(GameStatus::Upcoming) => {
            // A TBD start often arrives with a placeholder UTC time; never
            // format that as a real first pitch.
            let time_label = if game.start_time_tbd {
                None
            } else {
                game.start_time_utc.as_deref().and_then(local_time_label)
            };
            time_label.unwrap_or_else(|| "Time TBD".to_owned())
        }
        None => game.status_text.clone().unwrap_or_default(),
    };

    let (affiliate_runs, opponent_runs) = if is_home {
        (game.home_score, game.away_score)
    } else {
        (game.away_score, game.home_score)
    };

    let venue_text = {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(venue) = game.venue_id.and_then(|vid| venues.get(&vid)) {
            if !venue.name.is_empty() {
                parts.push(&venue.name);
            }
            if let Some(city) = venue.city.as_deref() {
                parts.push(city);
            }
            if let Some(state) = venue.state.as_deref() {
                parts.push(state);
            }
        }
        if !parts.is_empty() {
            Some(parts.join(", "))
        } else if !game.venue_name.is_empty() {
            Some(game.venue_name.clone())
        } else {
            None
        }
    };

    let mut detail_lines = Vec::new();
    if game.status == Some(GameStatus::Upcoming)
        && let Some(pitchers) = &game.probable_pitchers
    {
        let (affiliate_sp, opponent_sp) = if is_home {
            (&pitchers.home, &pitchers.away)
        } else {
            (&pitchers.away, &pitchers.home)
        };
        if let Some(sp) = affiliate_sp {
            detail_lines.push(format!("SP: {sp}"));
        }
        if let Some(sp) = opponent_sp {
            detail_lines.push(format!("Opp SP: {sp}"));
        }
    }
    if game.status == Some(GameStatus::Final)
        && let Some(decisions) = &game.decisions
    {
        // Fixed order: winner, save, loser.
        if let Some(winner) = &decisions.winner {
            detail_lines.push(format!("WP: {winner}"));
        }
        if let Some(save) = &decisions.save {
            detail_lines.push(format!("SV: {save}"));
        }
        if let Some(loser) = &decisions.loser {
            detail_lines.push(format!("LP: {loser}"));
        }
    }

    ScheduleTile {
        id,
        team_name: game.affiliate_name.clone(),
        level_label: game.level_label.clone(),
        status_label,
        matchup_label,
        detail_lines,
        venue_text,
        affiliate_runs,
        opponent_runs,
        is_final: game.status == Some(GameStatus::Final),
    }
}

/// Format an ISO UTC start time as the viewer's local hour:minute with
/// AM/PM. None when the string does not parse.
fn local_time_label(utc_iso: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(utc_iso).ok()?;
    Some(parsed.with_timezone(&Local).format("%-I:%M %p").to_string())
}

// ---------------------------------------------------------------------------
// Mapping: live feed wire → demo tile
// ---------------------------------------------------------------------------

const DEMO_TEAM_KEY: &str = "Marlins";

/// Build the simulated "live game" tile from a historical feed. The in-game
/// state fields are deliberately overridden with fixed demo values: the
/// status line and the base-runner flags do not track the feed.
pub fn map_live_feed_to_demo_tile(feed: &LiveFeedResponse) -> ScheduleTile {
    let game_data = feed.game_data.as_ref();
    let teams = game_data.and_then(|g| g.teams.as_ref());
    let home_name = teams
        .and_then(|t| t.home.as_ref())
        .and_then(|t| t.name.clone())
        .unwrap_or_default();
    let away_name = teams
        .and_then(|t| t.away.as_ref())
        .and_then(|t| t.name.clone())
        .unwrap_or_default();

    let linescore = feed.live_data.as_ref().and_then(|l| l.linescore.as_ref());
    let home_runs = linescore
        .and_then(|l| l.teams.as_ref())
        .and_then(|t| t.home.as_ref())
        .and_then(|s| s.runs);
    let away_runs = linescore
        .and_then(|l| l.teams.as_ref())
        .and_then(|t| t.away.as_ref())
        .and_then(|s| s.runs);

    let (team_name, affiliate_runs, opponent_name, opponent_runs, at_home) =
        if home_name.contains(DEMO_TEAM_KEY) {
            (normalize_marlins_name(&home_name), home_runs, away_name, away_runs, true)
        } else if away_name.contains(DEMO_TEAM_KEY) {
            (normalize_marlins_name(&away_name), away_runs, home_name, home_runs, false)
        } else {
            (home_name, home_runs, away_name, away_runs, true)
        };

    let matchup_label = format!("{}{opponent_name}", if at_home { "v " } else { "@ " });

    let current_matchup = feed
        .live_data
        .as_ref()
        .and_then(|l| l.plays.as_ref())
        .and_then(|p| p.current_play.as_ref())
        .and_then(|p| p.matchup.as_ref());
    let batter = person_name(current_matchup.and_then(|m| m.batter.as_ref()))
        .or_else(|| person_name(linescore.and_then(|l| l.offense.as_ref()).and_then(|o| o.batter.as_ref())));
    let pitcher = person_name(current_matchup.and_then(|m| m.pitcher.as_ref()))
        .or_else(|| person_name(linescore.and_then(|l| l.defense.as_ref()).and_then(|d| d.pitcher.as_ref())));

    let mut detail_lines = Vec::new();
    if let Some(batter) = batter {
        detail_lines.push(format!("{AFFILIATE_PREFIX} At Bat: {batter}"));
    }
    if let Some(pitcher) = pitcher {
        detail_lines.push(format!("{OPPONENT_PREFIX} Pitching: {pitcher}"));
    }
    // Demo override: runners parked on second and third regardless of the
    // feed's actual base state.
    detail_lines.push(format!("{BASES_PREFIX}0-1-1"));

    let venue = game_data.and_then(|g| g.venue.as_ref());
    let venue_text = venue.and_then(|v| v.name.clone()).map(|name| {
        let loc = venue.and_then(|v| v.location.as_ref());
        let loc_parts: Vec<&str> = [
            loc.and_then(|l| l.city.as_deref()),
            loc.and_then(|l| l.state.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if loc_parts.is_empty() {
            name
        } else {
            format!("{name}, {}", loc_parts.join(", "))
        }
    });

    ScheduleTile {
        id: format!("live-{}", game_data.and_then(|g| g.game_pk).unwrap_or_default()),
        team_name,
        level_label: "LIVE DEMO".to_owned(),
        status_label: "Top 5th, 2 outs".to_owned(),
        matchup_label,
        detail_lines,
        venue_text,
        affiliate_runs,
        opponent_runs,
        is_final: false,
    }
}

fn normalize_marlins_name(name: &str) -> String {
    // The Stats API reports the parent club as "Miami Marlins".
    if name == "Miami Marlins" { "Marlins".to_owned() } else { name.to_owned() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule_from(value: serde_json::Value) -> ScheduleResponse {
        serde_json::from_value(value).expect("schedule fixture should deserialize")
    }

    fn feed_from(value: serde_json::Value) -> LiveFeedResponse {
        serde_json::from_value(value).expect("feed fixture should deserialize")
    }

    fn game_json(game_pk: u64, home_id: u64, away_id: u64) -> serde_json::Value {
        json!({
            "gamePk": game_pk,
            "gameDate": "2025-07-15T23:05:00Z",
            "status": {"abstractGameState": "Preview", "detailedState": "Scheduled"},
            "teams": {
                "home": {"team": {"id": home_id, "name": format!("Team {home_id}")}},
                "away": {"team": {"id": away_id, "name": format!("Team {away_id}")}}
            },
            "venue": {"id": 401, "name": "Some Park"}
        })
    }

    // -----------------------------------------------------------------------
    // Affiliate game mapper
    // -----------------------------------------------------------------------

    #[test]
    fn null_schedule_maps_every_affiliate_to_no_game() {
        let games = map_schedule_to_affiliate_games(None);
        assert_eq!(games.len(), AFFILIATES.len());
        for (game, aff) in games.iter().zip(AFFILIATES.iter()) {
            assert_eq!(game.affiliate_team_id, aff.team_id);
            assert_eq!(game.affiliate_name, aff.name);
            assert!(!game.has_game);
        }
    }

    #[test]
    fn empty_dates_maps_every_affiliate_to_no_game() {
        let schedule = schedule_from(json!({"dates": [], "totalItems": 0}));
        let games = map_schedule_to_affiliate_games(Some(&schedule));
        assert_eq!(games.len(), AFFILIATES.len());
        assert!(games.iter().all(|g| !g.has_game));
    }

    #[test]
    fn mapper_always_returns_one_record_per_affiliate_in_config_order() {
        let schedule = schedule_from(json!({
            "dates": [{"date": "2025-07-15", "games": [
                game_json(1001, 564, 9000),
                game_json(1002, 9001, 146),
            ]}]
        }));
        let games = map_schedule_to_affiliate_games(Some(&schedule));
        assert_eq!(games.len(), AFFILIATES.len());
        let ids: Vec<u64> = games.iter().map(|g| g.affiliate_team_id).collect();
        let expected: Vec<u64> = AFFILIATES.iter().map(|a| a.team_id).collect();
        assert_eq!(ids, expected);

        let marlins = &games[0];
        assert!(marlins.has_game);
        assert_eq!(marlins.is_home, Some(false));
        assert_eq!(marlins.game_pk, Some(1002));

        let shrimp = &games[1];
        assert!(shrimp.has_game);
        assert_eq!(shrimp.is_home, Some(true));
    }

    #[test]
    fn home_affiliate_claims_an_all_affiliate_matchup() {
        // FCL Marlins host DSL Marlins: the away side reports no game.
        let schedule = schedule_from(json!({
            "dates": [{"date": "2025-07-15", "games": [game_json(1003, 467, 619)]}]
        }));
        for _ in 0..2 {
            let games = map_schedule_to_affiliate_games(Some(&schedule));
            let fcl = games.iter().find(|g| g.affiliate_team_id == 467).unwrap();
            let dsl = games.iter().find(|g| g.affiliate_team_id == 619).unwrap();
            assert!(fcl.has_game);
            assert_eq!(fcl.is_home, Some(true));
            assert!(!dsl.has_game, "away affiliate must show no game that date");
        }
    }

    #[test]
    fn live_abstract_state_outranks_final_and_detailed_text() {
        assert_eq!(classify_status("Live", "Scheduled"), GameStatus::InProgress);
        assert_eq!(classify_status("Preview", "In Progress - delay"), GameStatus::InProgress);
        assert_eq!(classify_status("Final", "Final"), GameStatus::Final);
        assert_eq!(classify_status("Preview", "Scheduled"), GameStatus::Upcoming);
        assert_eq!(classify_status("", ""), GameStatus::Upcoming);
    }

    #[test]
    fn mapper_copies_scores_and_raw_fields_verbatim() {
        let schedule = schedule_from(json!({
            "dates": [{"games": [{
                "gamePk": 777,
                "gameDate": "2025-07-15T23:05:00Z",
                "status": {"abstractGameState": "Final", "detailedState": "Final"},
                "teams": {
                    "home": {"team": {"id": 564, "name": "Jacksonville Jumbo Shrimp"}, "score": 4},
                    "away": {"team": {"id": 9000, "name": "Durham Bulls"}}
                }
            }]}]
        }));
        let games = map_schedule_to_affiliate_games(Some(&schedule));
        let shrimp = games.iter().find(|g| g.affiliate_team_id == 564).unwrap();
        assert_eq!(shrimp.home_score, Some(4));
        assert_eq!(shrimp.away_score, None);
        assert_eq!(shrimp.status, Some(GameStatus::Final));
        assert_eq!(shrimp.status_text.as_deref(), Some("Final"));
        assert_eq!(shrimp.start_time_utc.as_deref(), Some("2025-07-15T23:05:00Z"));
        assert_eq!(shrimp.venue_name, "", "absent venue name becomes empty string");
        assert_eq!(shrimp.venue_id, None);
    }

    #[test]
    fn later_raw_game_overwrites_earlier_for_same_affiliate() {
        let schedule = schedule_from(json!({
            "dates": [{"games": [game_json(1, 146, 9000), game_json(2, 146, 9001)]}]
        }));
        let games = map_schedule_to_affiliate_games(Some(&schedule));
        assert_eq!(games[0].game_pk, Some(2));
    }

    #[test]
    fn venue_ids_are_collected_once_each_from_first_date_only() {
        let schedule = schedule_from(json!({
            "dates": [
                {"games": [
                    {"venue": {"id": 10}},
                    {"venue": {"id": 11}},
                    {"venue": {"id": 10}},
                    {}
                ]},
                {"games": [{"venue": {"id": 99}}]}
            ]
        }));
        assert_eq!(collect_venue_ids(&schedule), vec![10, 11]);
    }

    // -----------------------------------------------------------------------
    // Venue mapping
    // -----------------------------------------------------------------------

    #[test]
    fn venues_decode_from_both_wire_shapes() {
        let bare: VenuesResponse =
            serde_json::from_value(json!([{"id": 1, "name": "A"}])).unwrap();
        let wrapped: VenuesResponse =
            serde_json::from_value(json!({"venues": [{"id": 1, "name": "A"}]})).unwrap();
        assert_eq!(map_venues(bare), map_venues(wrapped));
    }

    #[test]
    fn venue_state_prefers_abbrev_then_state_then_country() {
        let raw: VenuesResponse = serde_json::from_value(json!([
            {"id": 1, "name": "A", "location": {"stateAbbrev": "FL", "state": "Florida", "country": "USA"}},
            {"id": 2, "name": "B", "location": {"state": "Florida", "country": "USA"}},
            {"id": 3, "name": "C", "location": {"country": "Dominican Republic"}},
            {"id": 4, "name": "D"}
        ]))
        .unwrap();
        let venues = map_venues(raw);
        assert_eq!(venues[0].state.as_deref(), Some("FL"));
        assert_eq!(venues[1].state.as_deref(), Some("Florida"));
        assert_eq!(venues[2].state.as_deref(), Some("Dominican Republic"));
        assert_eq!(venues[3].state, None);
    }

    #[test]
    fn venues_without_id_or_name_are_skipped() {
        let raw: VenuesResponse = serde_json::from_value(json!([
            {"id": 1, "name": "Kept"},
            {"name": "No id"},
            {"id": 3}
        ]))
        .unwrap();
        let venues = map_venues(raw);
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].name, "Kept");
    }

    // -----------------------------------------------------------------------
    // Enrichment extraction + merge
    // -----------------------------------------------------------------------

    #[test]
    fn extra_info_prefers_live_probables_over_pregame() {
        let feed = feed_from(json!({
            "gameData": {
                "probablePitchers": {
                    "home": {"fullName": "Pregame Home"},
                    "away": {"fullName": "Pregame Away"}
                },
                "teams": {
                    "home": {"id": 564, "parentOrgId": 146},
                    "away": {"id": 9000, "parentOrgId": 139}
                }
            },
            "liveData": {
                "probablePitchers": {"home": {"fullName": "Live Home"}}
            }
        }));
        let info = map_feed_to_extra_info(&feed);
        let pitchers = info.probable_pitchers.unwrap();
        assert_eq!(pitchers.home.as_deref(), Some("Live Home"));
        assert_eq!(pitchers.away.as_deref(), Some("Pregame Away"));
        assert_eq!(info.home_parent_abbr.as_deref(), Some("MIA"));
        assert_eq!(info.away_parent_abbr.as_deref(), Some("TB"));
        assert!(!info.home_is_mlb);
        assert!(!info.away_is_mlb);
    }

    #[test]
    fn mlb_side_is_its_own_parent() {
        let feed = feed_from(json!({
            "gameData": {"teams": {
                "home": {"id": 146},
                "away": {"id": 121}
            }}
        }));
        let info = map_feed_to_extra_info(&feed);
        assert!(info.home_is_mlb);
        assert!(info.away_is_mlb);
        assert_eq!(info.home_parent_abbr.as_deref(), Some("MIA"));
        assert_eq!(info.away_parent_abbr.as_deref(), Some("NYM"));
        assert_eq!(info.probable_pitchers, None);
        assert_eq!(info.decisions, None);
    }

    #[test]
    fn decisions_with_no_names_collapse_to_none() {
        let feed = feed_from(json!({"liveData": {"decisions": {"winner": {}}}}));
        assert_eq!(map_feed_to_extra_info(&feed).decisions, None);
    }

    fn enriched_pair() -> (Vec<AffiliateGame>, HashMap<u64, GameExtraInfo>) {
        let games = vec![
            AffiliateGame {
                affiliate_team_id: 146,
                has_game: true,
                game_pk: Some(111),
                is_home: Some(true),
                ..Default::default()
            },
            AffiliateGame {
                affiliate_team_id: 564,
                has_game: true,
                game_pk: Some(222),
                is_home: Some(false),
                ..Default::default()
            },
            AffiliateGame {
                affiliate_team_id: 4124,
                has_game: true,
                game_pk: Some(111),
                is_home: Some(true),
                ..Default::default()
            },
        ];
        let mut info = HashMap::new();
        info.insert(
            111,
            GameExtraInfo {
                decisions: Some(Decisions {
                    winner: Some("W".into()),
                    loser: Some("L".into()),
                    save: None,
                }),
                away_parent_abbr: Some("CHC".into()),
                ..Default::default()
            },
        );
        info.insert(
            222,
            GameExtraInfo {
                home_parent_abbr: Some("NYM".into()),
                home_is_mlb: true,
                ..Default::default()
            },
        );
        (games, info)
    }

    #[test]
    fn records_sharing_a_game_pk_receive_identical_enrichment() {
        let (games, info) = enriched_pair();
        let enriched = apply_extra_info(games, &info);
        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[0].decisions, enriched[2].decisions);
        assert_eq!(enriched[0].opponent_parent_abbr.as_deref(), Some("CHC"));
        assert_eq!(enriched[2].opponent_parent_abbr.as_deref(), Some("CHC"));
    }

    #[test]
    fn mlb_opponent_suppresses_the_parent_tag() {
        let (games, info) = enriched_pair();
        let enriched = apply_extra_info(games, &info);
        // Record 1 is away against an MLB home side: no tag.
        assert_eq!(enriched[1].opponent_parent_abbr, None);
    }

    #[test]
    fn enrichment_leaves_unknown_pks_and_unset_home_flag_untouched() {
        let (mut games, info) = enriched_pair();
        games[0].is_home = None;
        games[1].game_pk = Some(999);
        let existing = Some(PitcherPair { home: Some("Kept".into()), away: None });
        games[1].probable_pitchers = existing.clone();

        let enriched = apply_extra_info(games, &info);
        assert_eq!(enriched[0].opponent_parent_abbr, None, "is_home unset omits the tag");
        assert_eq!(enriched[1].probable_pitchers, existing, "no cached pk leaves record as-is");
    }

    // -----------------------------------------------------------------------
    // Tile generation
    // -----------------------------------------------------------------------

    fn final_away_game() -> AffiliateGame {
        AffiliateGame {
            affiliate_team_id: 564,
            affiliate_name: "Jumbo Shrimp".into(),
            level_label: "AAA".into(),
            has_game: true,
            game_pk: Some(777),
            is_home: Some(false),
            home_team_name: Some("Durham Bulls".into()),
            away_team_name: Some("Jacksonville Jumbo Shrimp".into()),
            home_score: Some(2),
            away_score: Some(5),
            status: Some(GameStatus::Final),
            status_text: Some("Final".into()),
            start_time_utc: Some("2025-07-15T23:05:00Z".into()),
            venue_id: Some(401),
            venue_name: "Durham Bulls Athletic Park".into(),
            ..Default::default()
        }
    }

    #[test]
    fn no_game_tile_is_blank_except_status() {
        let game = no_game_record(&AFFILIATES[4]);
        let tiles = generate_game_tiles(&[game], &HashMap::new());
        let tile = &tiles[0];
        assert_eq!(tile.status_label, "NO GAME");
        assert_eq!(tile.matchup_label, "");
        assert!(tile.detail_lines.is_empty());
        assert_eq!(tile.venue_text, None);
        assert_eq!(tile.affiliate_runs, None);
        assert!(!tile.is_final);
    }

    #[test]
    fn tile_generation_is_deterministic() {
        let games = vec![final_away_game(), no_game_record(&AFFILIATES[0])];
        let venues = venue_map(vec![VenueInfo {
            id: 401,
            name: "Durham Bulls Athletic Park".into(),
            city: Some("Durham".into()),
            state: Some("NC".into()),
        }]);
        assert_eq!(
            generate_game_tiles(&games, &venues),
            generate_game_tiles(&games, &venues)
        );
    }

    #[test]
    fn away_matchup_swaps_scores_and_uses_at_token() {
        let tile = &generate_game_tiles(&[final_away_game()], &HashMap::new())[0];
        assert_eq!(tile.matchup_label, "@ Durham Bulls");
        assert_eq!(tile.affiliate_runs, Some(5));
        assert_eq!(tile.opponent_runs, Some(2));
        assert!(tile.is_final);
        assert_eq!(tile.status_label, "Final");
    }

    #[test]
    fn parent_abbr_is_appended_to_the_matchup_label() {
        let mut game = final_away_game();
        game.opponent_parent_abbr = Some("TB".into());
        let tile = &generate_game_tiles(&[game], &HashMap::new())[0];
        assert_eq!(tile.matchup_label, "@ Durham Bulls (TB)");
    }

    #[test]
    fn resolved_venue_beats_the_raw_schedule_name() {
        let mut game = final_away_game();
        game.venue_id = Some(17);
        let venues = venue_map(vec![VenueInfo {
            id: 17,
            name: "loanDepot park".into(),
            city: Some("Miami".into()),
            state: Some("FL".into()),
        }]);
        let tile = &generate_game_tiles(&[game.clone()], &venues)[0];
        assert_eq!(tile.venue_text.as_deref(), Some("loanDepot park, Miami, FL"));

        // Unresolved id falls back to the raw name from the schedule.
        let tile = &generate_game_tiles(&[game], &HashMap::new())[0];
        assert_eq!(tile.venue_text.as_deref(), Some("Durham Bulls Athletic Park"));
    }

    #[test]
    fn final_decisions_emit_wp_sv_lp_in_fixed_order() {
        let mut game = final_away_game();
        game.decisions = Some(Decisions {
            winner: Some("WP Name".into()),
            loser: Some("LP Name".into()),
            save: Some("SV Name".into()),
        });
        let tile = &generate_game_tiles(&[game.clone()], &HashMap::new())[0];
        assert_eq!(tile.detail_lines, vec!["WP: WP Name", "SV: SV Name", "LP: LP Name"]);

        game.decisions = Some(Decisions { winner: Some("WP Name".into()), ..Default::default() });
        let tile = &generate_game_tiles(&[game], &HashMap::new())[0];
        assert_eq!(tile.detail_lines, vec!["WP: WP Name"]);
    }

    #[test]
    fn upcoming_game_lists_probable_pitchers_for_each_side() {
        let mut game = final_away_game();
        game.status = Some(GameStatus::Upcoming);
        game.probable_pitchers = Some(PitcherPair {
            home: Some("Home Ace".into()),
            away: Some("Away Ace".into()),
        });
        // Affiliate is the away side: its starter is the away pitcher.
        let tile = &generate_game_tiles(&[game.clone()], &HashMap::new())[0];
        assert_eq!(tile.detail_lines, vec!["SP: Away Ace", "Opp SP: Home Ace"]);

        // In-progress games never show pitcher lines.
        game.status = Some(GameStatus::InProgress);
        let tile = &generate_game_tiles(&[game], &HashMap::new())[0];
        assert!(tile.detail_lines.is_empty());
    }

    #[test]
    fn unparsable_start_time_shows_time_tbd() {
        let mut game = final_away_game();
        game.status = Some(GameStatus::Upcoming);
        game.start_time_utc = Some("not-a-date".into());
        let tile = &generate_game_tiles(&[game], &HashMap::new())[0];
        assert_eq!(tile.status_label, "Time TBD");
    }

    #[test]
    fn tbd_flag_overrides_a_parsable_placeholder_time() {
        let mut game = final_away_game();
        game.status = Some(GameStatus::Upcoming);
        game.start_time_tbd = true;
        let tile = &generate_game_tiles(&[game.clone()], &HashMap::new())[0];
        assert_eq!(tile.status_label, "Time TBD");

        game.start_time_tbd = false;
        let tile = &generate_game_tiles(&[game], &HashMap::new())[0];
        assert_ne!(tile.status_label, "Time TBD");
        assert!(tile.status_label.ends_with("AM") || tile.status_label.ends_with("PM"));
    }

    #[test]
    fn in_progress_status_prefers_raw_detailed_text() {
        let mut game = final_away_game();
        game.status = Some(GameStatus::InProgress);
        game.status_text = Some("In Progress - Bottom 7th".into());
        let tile = &generate_game_tiles(&[game.clone()], &HashMap::new())[0];
        assert_eq!(tile.status_label, "In Progress - Bottom 7th");

        game.status_text = None;
        let tile = &generate_game_tiles(&[game], &HashMap::new())[0];
        assert_eq!(tile.status_label, "In Progress");
    }

    // -----------------------------------------------------------------------
    // Demo tile mapping
    // -----------------------------------------------------------------------

    fn demo_feed(home: &str, away: &str) -> LiveFeedResponse {
        feed_from(json!({
            "gameData": {
                "gamePk": 567074,
                "teams": {"home": {"name": home}, "away": {"name": away}},
                "venue": {"name": "loanDepot park", "location": {"city": "Miami", "state": "FL"}}
            },
            "liveData": {
                "linescore": {
                    "teams": {"home": {"runs": 3}, "away": {"runs": 1}},
                    "offense": {"batter": {"fullName": "Linescore Batter"}},
                    "defense": {"pitcher": {"fullName": "Linescore Pitcher"}}
                },
                "plays": {"currentPlay": {"matchup": {
                    "batter": {"fullName": "Play Batter"},
                    "pitcher": {"fullName": "Play Pitcher"}
                }}}
            }
        }))
    }

    #[test]
    fn demo_tile_overrides_state_with_fixed_values() {
        let tile = map_live_feed_to_demo_tile(&demo_feed("Miami Marlins", "New York Mets"));
        assert_eq!(tile.id, "live-567074");
        assert_eq!(tile.level_label, "LIVE DEMO");
        assert_eq!(tile.status_label, "Top 5th, 2 outs");
        assert!(!tile.is_final);
        assert_eq!(tile.team_name, "Marlins");
        assert_eq!(tile.matchup_label, "v New York Mets");
        assert_eq!(tile.affiliate_runs, Some(3));
        assert_eq!(tile.opponent_runs, Some(1));
        assert_eq!(tile.venue_text.as_deref(), Some("loanDepot park, Miami, FL"));
        assert_eq!(
            tile.detail_lines,
            vec![
                "AFF: At Bat: Play Batter",
                "OPP: Pitching: Play Pitcher",
                "BASES:0-1-1",
            ]
        );
    }

    #[test]
    fn demo_tile_swaps_sides_when_marlins_are_away() {
        let tile = map_live_feed_to_demo_tile(&demo_feed("Atlanta Braves", "Miami Marlins"));
        assert_eq!(tile.team_name, "Marlins");
        assert_eq!(tile.matchup_label, "@ Atlanta Braves");
        assert_eq!(tile.affiliate_runs, Some(1));
        assert_eq!(tile.opponent_runs, Some(3));
    }

    #[test]
    fn demo_tile_falls_back_to_linescore_names() {
        let mut feed = demo_feed("Miami Marlins", "New York Mets");
        feed.live_data.as_mut().unwrap().plays = None;
        let tile = map_live_feed_to_demo_tile(&feed);
        assert_eq!(tile.detail_lines[0], "AFF: At Bat: Linescore Batter");
        assert_eq!(tile.detail_lines[1], "OPP: Pitching: Linescore Pitcher");
    }

    // -----------------------------------------------------------------------
    // Client behavior against a mock server
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn fetch_venues_accepts_wrapped_and_bare_responses() {
        let mut wrapped_server = mockito::Server::new_async().await;
        let wrapped = wrapped_server
            .mock("GET", "/api/v1/venues")
            .match_query(mockito::Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(r#"{"venues": [{"id": 5, "name": "Wrapped Park"}]}"#)
            .create_async()
            .await;
        let api = StatsApi::with_base_url(wrapped_server.url());
        let venues = api.fetch_venues(&[5]).await.unwrap();
        assert_eq!(venues[0].name, "Wrapped Park");
        wrapped.assert_async().await;

        let mut bare_server = mockito::Server::new_async().await;
        let _bare = bare_server
            .mock("GET", "/api/v1/venues")
            .match_query(mockito::Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 6, "name": "Bare Park"}]"#)
            .create_async()
            .await;
        let api = StatsApi::with_base_url(bare_server.url());
        let venues = api.fetch_venues(&[6]).await.unwrap();
        assert_eq!(venues[0].name, "Bare Park");
    }

    #[tokio::test]
    async fn fetch_venues_skips_the_request_for_an_empty_id_set() {
        // No mock registered: a request would fail with a connection refusal.
        let api = StatsApi::with_base_url("http://127.0.0.1:9");
        assert!(api.fetch_venues(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_schedule_sends_every_team_and_sport_id() {
        let mut server = mockito::Server::new_async().await;
        let api = StatsApi::with_base_url(server.url());

        let mock = server
            .mock("GET", "/api/v1/schedule")
            // `Matcher::UrlEncoded` folds the query into a HashMap, so repeated
            // keys collapse to the last value; match the raw query string instead.
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::Regex("(^|&)teamId=146(&|$)".into()),
                mockito::Matcher::Regex("(^|&)teamId=2127(&|$)".into()),
                mockito::Matcher::Regex("(^|&)sportId=1(&|$)".into()),
                mockito::Matcher::Regex("(^|&)sportId=16(&|$)".into()),
                mockito::Matcher::Regex("(^|&)date=2025-07-15(&|$)".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"{"dates": [], "totalItems": 0}"#)
            .create_async()
            .await;

        let date = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let schedule = api.fetch_schedule(date).await.unwrap();
        assert_eq!(schedule.total_items, Some(0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn live_feed_error_carries_the_http_status() {
        let mut server = mockito::Server::new_async().await;
        let api = StatsApi::with_base_url(server.url());

        let _mock = server
            .mock("GET", "/api/v1.1/game/567074/feed/live")
            .with_status(503)
            .create_async()
            .await;

        let err = api.fetch_demo_tile().await.unwrap_err();
        assert!(err.to_string().contains("503"), "got: {err}");
    }
}
