use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{PipelineError, Result};

/// Positions scored in typical fantasy formats
pub const FANTASY_POSITIONS: [&str; 6] = ["QB", "RB", "WR", "TE", "K", "DEF"];

/// Player object as returned by the Sleeper roster endpoint.
///
/// Sleeper is loose with types (ids arrive as numbers or strings, `age` may be
/// missing, `fantasy_positions` may be null), so every field is read leniently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlayer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub fantasy_positions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub injury_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub depth_chart_position: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub depth_chart_order: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub years_exp: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub height: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub college: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub number: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub espn_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub yahoo_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sportradar_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rotowire_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub swish_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pandascore_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gsis_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fantasy_data_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rotoworld_id: Option<String>,
}

/// One row of the roster cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: String,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<u32>,
    pub position: Option<String>,
    /// Comma-joined, in the order the API listed them
    pub fantasy_positions: Option<String>,
    pub team: Option<String>,
    pub status: Option<String>,
    pub injury_status: Option<String>,
    pub depth_chart_position: Option<String>,
    pub depth_chart_order: Option<u32>,
    pub years_exp: Option<u32>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub college: Option<String>,
    pub number: Option<u32>,
    pub birth_date: Option<String>,
    pub active: Option<bool>,
    pub espn_id: Option<String>,
    pub yahoo_id: Option<String>,
    pub sportradar_id: Option<String>,
    pub rotowire_id: Option<String>,
    pub swish_id: Option<String>,
    pub pandascore_id: Option<String>,
    pub gsis_id: Option<String>,
    pub fantasy_data_id: Option<String>,
    pub rotoworld_id: Option<String>,
    pub cache_date: NaiveDate,
}

impl RawPlayer {
    /// Convert to a cache row stamped with `cache_date`
    pub fn into_record(self, player_id: String, cache_date: NaiveDate) -> PlayerRecord {
        let full_name = self.full_name.or_else(|| {
            let joined = format!(
                "{} {}",
                self.first_name.as_deref().unwrap_or_default(),
                self.last_name.as_deref().unwrap_or_default()
            );
            let joined = joined.trim();
            (!joined.is_empty()).then(|| joined.to_string())
        });

        let fantasy_positions =
            (!self.fantasy_positions.is_empty()).then(|| self.fantasy_positions.join(","));

        PlayerRecord {
            player_id,
            full_name,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            position: self.position,
            fantasy_positions,
            team: self.team,
            status: self.status,
            injury_status: self.injury_status,
            depth_chart_position: self.depth_chart_position,
            depth_chart_order: self.depth_chart_order,
            years_exp: self.years_exp,
            height: self.height,
            weight: self.weight,
            college: self.college,
            number: self.number,
            birth_date: self.birth_date,
            active: self.active,
            espn_id: self.espn_id,
            yahoo_id: self.yahoo_id,
            sportradar_id: self.sportradar_id,
            rotowire_id: self.rotowire_id,
            swish_id: self.swish_id,
            pandascore_id: self.pandascore_id,
            gsis_id: self.gsis_id,
            fantasy_data_id: self.fantasy_data_id,
            rotoworld_id: self.rotoworld_id,
            cache_date,
        }
    }
}

impl PlayerRecord {
    /// Active, rostered, and at a fantasy-relevant position
    pub fn is_fantasy_relevant(&self) -> bool {
        let active = self.active == Some(true);
        let has_team = self.team.as_deref().is_some_and(|team| !team.trim().is_empty());
        let relevant_position = self
            .position
            .as_deref()
            .is_some_and(|position| FANTASY_POSITIONS.contains(&position));

        active && has_team && relevant_position
    }
}

/// A full roster fetched in one pass. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterSnapshot {
    fetched_on: NaiveDate,
    players: Vec<PlayerRecord>,
    index: HashMap<String, usize>,
}

impl RosterSnapshot {
    /// Build a snapshot, keeping the first record for any repeated `player_id`
    pub fn new(fetched_on: NaiveDate, records: Vec<PlayerRecord>) -> Self {
        let mut players = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            if index.contains_key(&record.player_id) {
                tracing::warn!("Duplicate player_id {} in roster, keeping first", record.player_id);
                continue;
            }
            index.insert(record.player_id.clone(), players.len());
            players.push(record);
        }

        Self { fetched_on, players, index }
    }

    /// Date the snapshot was fetched
    pub fn fetched_on(&self) -> NaiveDate {
        self.fetched_on
    }

    pub fn get(&self, player_id: &str) -> Option<&PlayerRecord> {
        self.index.get(player_id).and_then(|&i| self.players.get(i))
    }

    /// Look up a player, failing with `PlayerNotFound`
    pub fn require(&self, player_id: &str) -> Result<&PlayerRecord> {
        self.get(player_id).ok_or_else(|| PipelineError::PlayerNotFound(player_id.to_string()))
    }

    /// Records in insertion order
    pub fn records(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Stat codes carried into merged records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatCode {
    PtsHalfPpr,
    PtsPpr,
    PtsStd,
    PassAtt,
    PassCmp,
    PassYd,
    PassTd,
    PassInt,
    PassSack,
    RushAtt,
    RushYd,
    RushTd,
    Fum,
    FumLost,
}

impl StatCode {
    pub const COUNT: usize = 14;

    pub const ALL: [StatCode; Self::COUNT] = [
        StatCode::PtsHalfPpr,
        StatCode::PtsPpr,
        StatCode::PtsStd,
        StatCode::PassAtt,
        StatCode::PassCmp,
        StatCode::PassYd,
        StatCode::PassTd,
        StatCode::PassInt,
        StatCode::PassSack,
        StatCode::RushAtt,
        StatCode::RushYd,
        StatCode::RushTd,
        StatCode::Fum,
        StatCode::FumLost,
    ];

    /// Key used by the Sleeper API
    pub fn as_str(self) -> &'static str {
        match self {
            StatCode::PtsHalfPpr => "pts_half_ppr",
            StatCode::PtsPpr => "pts_ppr",
            StatCode::PtsStd => "pts_std",
            StatCode::PassAtt => "pass_att",
            StatCode::PassCmp => "pass_cmp",
            StatCode::PassYd => "pass_yd",
            StatCode::PassTd => "pass_td",
            StatCode::PassInt => "pass_int",
            StatCode::PassSack => "pass_sack",
            StatCode::RushAtt => "rush_att",
            StatCode::RushYd => "rush_yd",
            StatCode::RushTd => "rush_td",
            StatCode::Fum => "fum",
            StatCode::FumLost => "fum_lost",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracked stat values of one week payload.
///
/// `reported` counts every key the payload carried, tracked or not, so
/// emptiness is judged on the raw object rather than on the tracked subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatLine {
    values: [Option<f64>; StatCode::COUNT],
    reported: usize,
}

impl StatLine {
    /// Build from explicit values
    pub fn from_pairs(pairs: &[(StatCode, f64)]) -> Self {
        let mut line = Self::default();
        for &(code, value) in pairs {
            line.values[code.slot()] = Some(value);
        }
        line.reported = pairs.len();
        line
    }

    pub fn get(&self, code: StatCode) -> Option<f64> {
        self.values[code.slot()]
    }

    pub fn is_empty(&self) -> bool {
        self.reported == 0
    }
}

impl<'de> Deserialize<'de> for StatLine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<HashMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();

        let mut line = StatLine { reported: raw.len(), ..Default::default() };
        for (key, value) in &raw {
            if let (Some(code), Some(number)) = (StatCode::from_code(key), value.as_f64()) {
                line.values[code.slot()] = Some(number);
            }
        }
        Ok(line)
    }
}

/// One week payload of the stats or projections endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatBlock {
    #[serde(default)]
    pub stats: StatLine,
    #[serde(default, deserialize_with = "lenient_string")]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub opponent: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
}

impl StatBlock {
    pub fn has_stats(&self) -> bool {
        !self.stats.is_empty()
    }
}

/// Stats and projections of one player for one week
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekEntry {
    pub stats: Option<StatBlock>,
    pub projections: Option<StatBlock>,
}

impl WeekEntry {
    /// At least one side present with a non-empty stat object
    pub fn has_data(&self) -> bool {
        let non_empty = |side: &Option<StatBlock>| side.as_ref().is_some_and(StatBlock::has_stats);
        non_empty(&self.stats) || non_empty(&self.projections)
    }
}

/// Week number to entry, in week order
pub type PlayerWeeks = BTreeMap<u32, WeekEntry>;

/// A projected stat, or the marker that no projection was published
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectedValue {
    Value(f64),
    NotAvailable,
}

impl ProjectedValue {
    pub fn value(self) -> Option<f64> {
        match self {
            ProjectedValue::Value(v) => Some(v),
            ProjectedValue::NotAvailable => None,
        }
    }
}

impl From<Option<f64>> for ProjectedValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ProjectedValue::NotAvailable, ProjectedValue::Value)
    }
}

impl fmt::Display for ProjectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectedValue::Value(v) => write!(f, "{v}"),
            ProjectedValue::NotAvailable => f.write_str("N/A"),
        }
    }
}

/// One player, one week: roster attributes plus actual and projected stats
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub player_id: String,
    pub player_name: Option<String>,
    pub age: Option<u32>,
    pub position: Option<String>,
    pub depth_chart_order: Option<u32>,
    pub week: u32,
    pub team: Option<String>,
    pub opponent: Option<String>,
    pub date: Option<String>,
    pub(crate) actual: [f64; StatCode::COUNT],
    pub(crate) projected: [ProjectedValue; StatCode::COUNT],
}

impl MergedRecord {
    /// Recorded value, 0 when the stat did not occur
    pub fn actual(&self, code: StatCode) -> f64 {
        self.actual[code.slot()]
    }

    /// Projected value, `NotAvailable` when none was published
    pub fn projected(&self, code: StatCode) -> ProjectedValue {
        self.projected[code.slot()]
    }

    /// Column names of the output table
    pub fn csv_headers() -> Vec<String> {
        let mut headers: Vec<String> = [
            "player_id",
            "player_name",
            "age",
            "position",
            "depth_chart_order",
            "week",
            "team",
            "opponent",
            "date",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();

        for code in StatCode::ALL {
            headers.push(format!("projected_{code}"));
            headers.push(format!("actual_{code}"));
        }
        headers
    }

    /// Row in `csv_headers` order
    pub fn to_csv_row(&self) -> Vec<String> {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        let mut row = vec![
            self.player_id.clone(),
            opt(&self.player_name),
            opt(&self.age),
            opt(&self.position),
            opt(&self.depth_chart_order),
            self.week.to_string(),
            opt(&self.team),
            opt(&self.opponent),
            opt(&self.date),
        ];

        for code in StatCode::ALL {
            row.push(self.projected(code).to_string());
            row.push(self.actual(code).to_string());
        }
        row
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_u32<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    })
}
