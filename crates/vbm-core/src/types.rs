//! Closed vocabularies for every axis of the analysis grid.
//!
//! Each axis serializes to the same token the persisted artifact has always
//! used (`dem_share_gov`, `exclude_CA`, `state_year`, ...). Parsing an unknown
//! token yields [`PanelError::Config`].

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{unknown_token, PanelError};

/// Race type carried by the race-specific vote share columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceType {
    /// Gubernatorial elections.
    Gov,
    /// Presidential elections.
    Pres,
    /// Senate elections.
    Sen,
}

impl RaceType {
    /// Melt order used when pooling race columns.
    pub const ALL: [RaceType; 3] = [RaceType::Gov, RaceType::Pres, RaceType::Sen];

    /// Short token (`gov`, `pres`, `sen`).
    pub fn token(self) -> &'static str {
        match self {
            RaceType::Gov => "gov",
            RaceType::Pres => "pres",
            RaceType::Sen => "sen",
        }
    }

    /// Name of the wide dataset column holding this race's vote share.
    pub fn column(self) -> &'static str {
        match self {
            RaceType::Gov => "dem_share_gov",
            RaceType::Pres => "dem_share_pres",
            RaceType::Sen => "dem_share_sen",
        }
    }
}

/// Outcome variable of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Outcome {
    /// Democratic share pooled across every race type (long format).
    Pooled,
    /// Turnout share.
    Turnout,
    /// Democratic share for a single race type.
    Race(RaceType),
}

impl Outcome {
    /// Every outcome in grid enumeration order.
    pub const ALL: [Outcome; 5] = [
        Outcome::Pooled,
        Outcome::Turnout,
        Outcome::Race(RaceType::Pres),
        Outcome::Race(RaceType::Gov),
        Outcome::Race(RaceType::Sen),
    ];

    /// Identifier token used in configurations and artifacts.
    pub fn token(self) -> &'static str {
        match self {
            Outcome::Pooled => "dem_share",
            Outcome::Turnout => "turnout",
            Outcome::Race(race) => race.column(),
        }
    }

    /// Name of the regression's dependent variable.
    pub fn column(self) -> &'static str {
        match self {
            Outcome::Pooled => "dem_share",
            Outcome::Turnout => "turnout_share",
            Outcome::Race(race) => race.column(),
        }
    }

    /// Group the outcome is only observed in, if any.
    ///
    /// Gubernatorial races are only contested in California within the panel.
    pub fn home_group(self) -> Option<&'static str> {
        match self {
            Outcome::Race(RaceType::Gov) => Some("CA"),
            _ => None,
        }
    }
}

impl FromStr for Outcome {
    type Err = PanelError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "dem_share" => Ok(Outcome::Pooled),
            "turnout" => Ok(Outcome::Turnout),
            "dem_share_pres" => Ok(Outcome::Race(RaceType::Pres)),
            "dem_share_gov" => Ok(Outcome::Race(RaceType::Gov)),
            "dem_share_sen" => Ok(Outcome::Race(RaceType::Sen)),
            other => Err(unknown_token("outcome", other)),
        }
    }
}

impl TryFrom<String> for Outcome {
    type Error = PanelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Outcome> for String {
    fn from(value: Outcome) -> Self {
        value.token().to_string()
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Model specification tier, increasing in covariate richness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specification {
    /// Entity and group×time fixed effects.
    Basic,
    /// Adds entity-specific linear trends.
    Linear,
    /// Adds entity-specific linear and quadratic trends.
    Quadratic,
}

impl Specification {
    /// Every specification in grid enumeration order.
    pub const ALL: [Specification; 3] = [
        Specification::Basic,
        Specification::Linear,
        Specification::Quadratic,
    ];

    /// Identifier token.
    pub fn token(self) -> &'static str {
        match self {
            Specification::Basic => "basic",
            Specification::Linear => "linear",
            Specification::Quadratic => "quadratic",
        }
    }

    /// Highest polynomial degree of the entity-specific trend (0 for none).
    pub fn trend_degree(self) -> usize {
        match self {
            Specification::Basic => 0,
            Specification::Linear => 1,
            Specification::Quadratic => 2,
        }
    }
}

impl FromStr for Specification {
    type Err = PanelError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "basic" => Ok(Specification::Basic),
            "linear" => Ok(Specification::Linear),
            "quadratic" => Ok(Specification::Quadratic),
            other => Err(unknown_token("specification", other)),
        }
    }
}

/// Granularity of the cluster-robust variance estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClusterLevel {
    /// One cluster per entity (county).
    #[serde(rename = "county")]
    Entity,
    /// One cluster per group (state).
    #[serde(rename = "state")]
    Group,
    /// One cluster per group×time cell.
    #[serde(rename = "state_year")]
    GroupTime,
}

impl ClusterLevel {
    /// Identifier token.
    pub fn token(self) -> &'static str {
        match self {
            ClusterLevel::Entity => "county",
            ClusterLevel::Group => "state",
            ClusterLevel::GroupTime => "state_year",
        }
    }

    /// Human readable label recorded next to the estimate.
    pub fn label(self) -> &'static str {
        match self {
            ClusterLevel::Entity => "county",
            ClusterLevel::Group => "state",
            ClusterLevel::GroupTime => "state×year",
        }
    }
}

impl FromStr for ClusterLevel {
    type Err = PanelError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "county" => Ok(ClusterLevel::Entity),
            "state" => Ok(ClusterLevel::Group),
            "state_year" => Ok(ClusterLevel::GroupTime),
            other => Err(unknown_token("cluster", other)),
        }
    }
}

/// Subsetting rule on the group attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GroupFilter {
    /// Keep a single group.
    Only(String),
    /// Drop a single group.
    Exclude(String),
}

impl GroupFilter {
    /// Whether rows of `group` survive the filter.
    pub fn keeps(&self, group: &str) -> bool {
        match self {
            GroupFilter::Only(target) => group == target,
            GroupFilter::Exclude(target) => group != target,
        }
    }

    /// Description fragment contributed by the filter.
    pub fn fragment(&self) -> String {
        match self {
            GroupFilter::Only(target) => format!("{target} only"),
            GroupFilter::Exclude(target) => format!("excluding {target}"),
        }
    }
}

impl FromStr for GroupFilter {
    type Err = PanelError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let filter = match token.strip_prefix("exclude_") {
            Some(group) => GroupFilter::Exclude(group.to_string()),
            None => GroupFilter::Only(token.to_string()),
        };
        match &filter {
            GroupFilter::Only(group) | GroupFilter::Exclude(group) if group.is_empty() => {
                Err(unknown_token("group-filter", token))
            }
            _ => Ok(filter),
        }
    }
}

impl TryFrom<String> for GroupFilter {
    type Error = PanelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GroupFilter> for String {
    fn from(value: GroupFilter) -> Self {
        value.to_string()
    }
}

impl Display for GroupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupFilter::Only(group) => f.write_str(group),
            GroupFilter::Exclude(group) => write!(f, "exclude_{group}"),
        }
    }
}

/// Inclusive `[start, end]` year window, serialized as a two element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct TimeWindow {
    /// First year kept.
    pub start: i32,
    /// Last year kept.
    pub end: i32,
}

impl TimeWindow {
    /// Creates a window covering `start..=end`.
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Whether `year` falls inside the window.
    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

impl From<(i32, i32)> for TimeWindow {
    fn from((start, end): (i32, i32)) -> Self {
        Self { start, end }
    }
}

impl From<TimeWindow> for (i32, i32) {
    fn from(value: TimeWindow) -> Self {
        (value.start, value.end)
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Period in which an entity first adopted the studied policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Cohort {
    /// Adopted in the given year.
    Adopted(i32),
    /// Never adopted within the panel.
    Never,
}

impl FromStr for Cohort {
    type Err = PanelError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let trimmed = token.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("never") {
            return Ok(Cohort::Never);
        }
        // Float-formatted years such as "2018.0" are accepted.
        let year = trimmed
            .parse::<i32>()
            .ok()
            .or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.fract() == 0.0)
                    .map(|value| value as i32)
            })
            .ok_or_else(|| unknown_token("cohort", token))?;
        Ok(Cohort::Adopted(year))
    }
}

impl TryFrom<String> for Cohort {
    type Error = PanelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cohort> for String {
    fn from(value: Cohort) -> Self {
        value.to_string()
    }
}

impl Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cohort::Adopted(year) => write!(f, "{year}"),
            Cohort::Never => f.write_str("Never"),
        }
    }
}

/// Grid generation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    /// Full cross-product of the core options.
    Core,
    /// Targeted robustness variants.
    Robustness,
}

impl TryFrom<u8> for Tier {
    type Error = PanelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::Core),
            2 => Ok(Tier::Robustness),
            other => Err(unknown_token("tier", &other.to_string())),
        }
    }
}

impl From<Tier> for u8 {
    fn from(value: Tier) -> Self {
        match value {
            Tier::Core => 1,
            Tier::Robustness => 2,
        }
    }
}
