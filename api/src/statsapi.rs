//! MLB Stats API raw wire types: serde shapes for deserializing responses.
//! These map to our clean domain types via the functions in client.rs.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Schedule  (/api/v1/schedule)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScheduleResponse {
    pub dates: Option<Vec<ScheduleDate>>,
    #[serde(rename = "totalItems")]
    pub total_items: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScheduleDate {
    pub date: Option<String>, // "2025-07-15"
    pub games: Option<Vec<ScheduleGame>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScheduleGame {
    #[serde(rename = "gamePk")]
    pub game_pk: Option<u64>,
    #[serde(rename = "gameDate")]
    pub game_date: Option<String>, // ISO 8601 UTC
    pub status: Option<WireStatus>,
    pub teams: Option<WireMatchup>,
    pub venue: Option<WireVenueRef>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireStatus {
    #[serde(rename = "abstractGameState")]
    pub abstract_game_state: Option<String>, // "Preview" | "Live" | "Final"
    #[serde(rename = "detailedState")]
    pub detailed_state: Option<String>,
    #[serde(rename = "startTimeTBD")]
    pub start_time_tbd: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatchup {
    pub home: Option<WireSide>,
    pub away: Option<WireSide>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireSide {
    pub team: Option<WireTeam>,
    pub score: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireVenueRef {
    pub id: Option<u64>,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Venues  (/api/v1/venues?venueIds=...&hydrate=location)
// ---------------------------------------------------------------------------

/// The venues endpoint has been observed returning either a bare array or an
/// object wrapping the array under "venues". Decode both shapes explicitly.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum VenuesResponse {
    Wrapped { venues: Vec<VenueRecord> },
    Bare(Vec<VenueRecord>),
}

impl VenuesResponse {
    pub fn into_venues(self) -> Vec<VenueRecord> {
        match self {
            VenuesResponse::Wrapped { venues } => venues,
            VenuesResponse::Bare(venues) => venues,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct VenueRecord {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub location: Option<VenueLocation>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct VenueLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "stateAbbrev")]
    pub state_abbrev: Option<String>,
    pub country: Option<String>,
}

// ---------------------------------------------------------------------------
// Live feed  (/api/v1.1/game/{gamePk}/feed/live)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LiveFeedResponse {
    #[serde(rename = "gameData")]
    pub game_data: Option<FeedGameData>,
    #[serde(rename = "liveData")]
    pub live_data: Option<FeedLiveData>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FeedGameData {
    #[serde(rename = "gamePk")]
    pub game_pk: Option<u64>,
    pub teams: Option<FeedTeams>,
    pub venue: Option<FeedVenue>,
    #[serde(rename = "probablePitchers")]
    pub probable_pitchers: Option<PitcherRefs>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FeedTeams {
    pub home: Option<FeedTeam>,
    pub away: Option<FeedTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FeedTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
    #[serde(rename = "parentOrgId")]
    pub parent_org_id: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FeedVenue {
    pub name: Option<String>,
    pub location: Option<VenueLocation>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FeedLiveData {
    pub linescore: Option<Linescore>,
    pub decisions: Option<FeedDecisions>,
    pub plays: Option<FeedPlays>,
    #[serde(rename = "probablePitchers")]
    pub probable_pitchers: Option<PitcherRefs>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Linescore {
    #[serde(rename = "currentInningOrdinal")]
    pub current_inning_ordinal: Option<String>,
    #[serde(rename = "inningState")]
    pub inning_state: Option<String>, // "Top" / "Bottom"
    pub outs: Option<u8>,
    pub teams: Option<LinescoreTeams>,
    pub offense: Option<LinescoreOffense>,
    pub defense: Option<LinescoreDefense>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LinescoreTeams {
    pub home: Option<LinescoreSide>,
    pub away: Option<LinescoreSide>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LinescoreSide {
    pub runs: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LinescoreOffense {
    pub batter: Option<Person>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LinescoreDefense {
    pub pitcher: Option<Person>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FeedDecisions {
    pub winner: Option<Person>,
    pub loser: Option<Person>,
    pub save: Option<Person>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FeedPlays {
    #[serde(rename = "currentPlay")]
    pub current_play: Option<CurrentPlay>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CurrentPlay {
    pub matchup: Option<PlayMatchup>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlayMatchup {
    pub batter: Option<Person>,
    pub pitcher: Option<Person>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PitcherRefs {
    pub home: Option<Person>,
    pub away: Option<Person>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Person {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
}
