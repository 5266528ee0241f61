pub mod client;
pub mod statsapi;

use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Affiliate configuration — the fixed roster the dashboard tracks
// ---------------------------------------------------------------------------

/// One tracked affiliate. The list is static for the life of the process.
#[derive(Debug, Clone, Copy)]
pub struct AffiliateConfig {
    pub team_id: u64,
    pub name: &'static str,
    pub level: &'static str,
}

/// The Marlins organization, top to bottom. Order here is display order.
pub const AFFILIATES: [AffiliateConfig; 8] = [
    AffiliateConfig { team_id: 146, name: "Marlins", level: "MLB" },
    AffiliateConfig { team_id: 564, name: "Jumbo Shrimp", level: "AAA" },
    AffiliateConfig { team_id: 4124, name: "Blue Wahoos", level: "AA" },
    AffiliateConfig { team_id: 554, name: "Sky Carp", level: "High-A" },
    AffiliateConfig { team_id: 479, name: "Jupiter", level: "A" },
    AffiliateConfig { team_id: 467, name: "FCL Marlins", level: "ROK" },
    AffiliateConfig { team_id: 619, name: "DSL Marlins", level: "DSL" },
    AffiliateConfig { team_id: 2127, name: "DSL Miami", level: "DSL" },
];

/// Abbreviation for an MLB parent club, keyed by Stats API team id.
/// Returns None for minor-league ids; the enricher uses that to decide
/// whether a team is itself a big-league club.
pub fn parent_abbreviation(team_id: u64) -> Option<&'static str> {
    match team_id {
        108 => Some("LAA"),
        109 => Some("ARI"),
        110 => Some("BAL"),
        111 => Some("BOS"),
        112 => Some("CHC"),
        113 => Some("CIN"),
        114 => Some("CLE"),
        115 => Some("COL"),
        116 => Some("DET"),
        117 => Some("HOU"),
        118 => Some("KC"),
        119 => Some("LAD"),
        120 => Some("WSH"),
        121 => Some("NYM"),
        133 => Some("ATH"),
        134 => Some("PIT"),
        135 => Some("SD"),
        136 => Some("SEA"),
        137 => Some("SF"),
        138 => Some("STL"),
        139 => Some("TB"),
        140 => Some("TEX"),
        141 => Some("TOR"),
        142 => Some("MIN"),
        143 => Some("PHI"),
        144 => Some("ATL"),
        145 => Some("CWS"),
        146 => Some("MIA"),
        147 => Some("NYY"),
        158 => Some("MIL"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the Stats API wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameStatus {
    #[default]
    Upcoming,
    InProgress,
    Final,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PitcherPair {
    pub home: Option<String>,
    pub away: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decisions {
    pub winner: Option<String>,
    pub loser: Option<String>,
    pub save: Option<String>,
}

/// One record per configured affiliate per queried date. `has_game == false`
/// leaves every other field at its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffiliateGame {
    pub affiliate_team_id: u64,
    pub affiliate_name: String,
    pub level_label: String,
    pub has_game: bool,
    pub game_pk: Option<u64>,
    pub is_home: Option<bool>,
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: Option<GameStatus>,
    /// Raw detailed state from the wire ("Final", "In Progress", ...).
    pub status_text: Option<String>,
    /// ISO-8601 UTC start time, copied unmodified.
    pub start_time_utc: Option<String>,
    pub start_time_tbd: bool,
    pub venue_id: Option<u64>,
    /// Empty string when the schedule carries no venue name.
    pub venue_name: String,
    pub probable_pitchers: Option<PitcherPair>,
    pub decisions: Option<Decisions>,
    /// Filled in by enrichment; None when the opponent is itself an MLB club.
    pub opponent_parent_abbr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueInfo {
    pub id: u64,
    pub name: String,
    pub city: Option<String>,
    /// State abbreviation when available, else full state name, else country.
    pub state: Option<String>,
}

/// Supplementary live-feed data for one gamePk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameExtraInfo {
    pub probable_pitchers: Option<PitcherPair>,
    pub decisions: Option<Decisions>,
    pub home_parent_abbr: Option<String>,
    pub away_parent_abbr: Option<String>,
    pub home_is_mlb: bool,
    pub away_is_mlb: bool,
}

/// Flat, display-ready view-model for one affiliate row. Produced fresh on
/// every pipeline run and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleTile {
    pub id: String,
    pub team_name: String,
    pub level_label: String,
    pub status_label: String,
    pub matchup_label: String,
    pub detail_lines: Vec<String>,
    pub venue_text: Option<String>,
    pub affiliate_runs: Option<u32>,
    pub opponent_runs: Option<u32>,
    pub is_final: bool,
}

// Reserved detail-line prefixes. The presentation layer routes lines by
// prefix: AFF/OPP pin a line to a column, BASES carries base-runner flags
// ("1-0-1" = first and third occupied) and is never rendered as text.
pub const AFFILIATE_PREFIX: &str = "AFF:";
pub const OPPONENT_PREFIX: &str = "OPP:";
pub const BASES_PREFIX: &str = "BASES:";

// ---------------------------------------------------------------------------
// Enrichment cache
// ---------------------------------------------------------------------------

/// Per-gamePk record of fetched live-feed info. Accumulates for the life of
/// the session; nothing is ever evicted. Owned explicitly by the enrichment
/// component rather than living in process-wide state, so tests can reset it.
#[derive(Debug, Default)]
pub struct ExtraInfoCache {
    fetched: HashSet<u64>,
    by_pk: HashMap<u64, GameExtraInfo>,
}

impl ExtraInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct pks from `game_pks` that have not been fetched yet,
    /// in first-seen order.
    pub fn missing(&self, game_pks: impl IntoIterator<Item = u64>) -> Vec<u64> {
        let mut seen = HashSet::new();
        game_pks
            .into_iter()
            .filter(|pk| !self.fetched.contains(pk) && seen.insert(*pk))
            .collect()
    }

    pub fn insert(&mut self, game_pk: u64, info: GameExtraInfo) {
        self.fetched.insert(game_pk);
        self.by_pk.insert(game_pk, info);
    }

    pub fn get(&self, game_pk: u64) -> Option<&GameExtraInfo> {
        self.by_pk.get(&game_pk)
    }

    /// Cached entries for the requested pks, cloned into an owned map.
    pub fn snapshot(&self, game_pks: &[u64]) -> HashMap<u64, GameExtraInfo> {
        game_pks
            .iter()
            .filter_map(|pk| self.by_pk.get(pk).map(|info| (*pk, info.clone())))
            .collect()
    }

    pub fn reset(&mut self) {
        self.fetched.clear();
        self.by_pk.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dedups_and_skips_fetched_pks() {
        let mut cache = ExtraInfoCache::new();
        assert_eq!(cache.missing([111, 222, 111]), vec![111, 222]);

        cache.insert(111, GameExtraInfo::default());
        assert_eq!(cache.missing([111, 222, 111]), vec![222]);

        cache.insert(222, GameExtraInfo::default());
        assert!(cache.missing([111, 222, 111]).is_empty());
    }

    #[test]
    fn reset_forgets_fetched_pks() {
        let mut cache = ExtraInfoCache::new();
        cache.insert(111, GameExtraInfo::default());
        cache.reset();
        assert_eq!(cache.missing([111]), vec![111]);
        assert!(cache.get(111).is_none());
    }

    #[test]
    fn snapshot_returns_only_requested_cached_entries() {
        let mut cache = ExtraInfoCache::new();
        cache.insert(111, GameExtraInfo { home_is_mlb: true, ..Default::default() });
        cache.insert(333, GameExtraInfo::default());

        let snap = cache.snapshot(&[111, 222]);
        assert_eq!(snap.len(), 1);
        assert!(snap[&111].home_is_mlb);
    }

    #[test]
    fn every_affiliate_has_a_level_label() {
        assert!(AFFILIATES.iter().all(|a| !a.level.is_empty()));
    }

    #[test]
    fn parent_abbreviation_knows_all_thirty_clubs() {
        let count = (100..200).filter(|&id| parent_abbreviation(id).is_some()).count();
        assert_eq!(count, 30);
        assert_eq!(parent_abbreviation(146), Some("MIA"));
        assert_eq!(parent_abbreviation(564), None); // Jacksonville is not a parent club
    }
}
