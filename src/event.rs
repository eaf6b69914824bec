use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;

/// Competition track of an event. Reports label junior events `B` and
/// senior events `C`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    #[serde(alias = "B", alias = "b", alias = "ms")]
    Junior,
    #[default]
    #[serde(alias = "C", alias = "c", alias = "hs")]
    Senior,
}

impl Division {
    pub fn from_senior_flag(senior: bool) -> Self {
        if senior {
            Division::Senior
        } else {
            Division::Junior
        }
    }

    /// Single-letter label used in reports
    pub fn label(self) -> &'static str {
        match self {
            Division::Junior => "B",
            Division::Senior => "C",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Division {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "b" | "junior" | "ms" | "false" => Ok(Division::Junior),
            "c" | "senior" | "hs" | "true" | "" => Ok(Division::Senior),
            other => Err(format!("unknown division '{}'", other)),
        }
    }
}

/// Identity of an event: two events with the same key are the same event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub name: String,
    pub division: Division,
}

/// Flat event record as produced by the roster loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    #[serde(default)]
    pub division: Division,
    #[serde(default)]
    pub coach: Option<String>,
    #[serde(default, alias = "kids", alias = "students")]
    pub participants: Vec<String>,
    /// Overrides the flagged-category lookup when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flagged: Option<bool>,
}

impl EventRecord {
    pub fn new(name: impl Into<String>, division: Division) -> Self {
        Self {
            name: name.into(),
            division,
            coach: None,
            participants: Vec::new(),
            flagged: None,
        }
    }

    pub fn with_coach(mut self, coach: impl Into<String>) -> Self {
        self.coach = Some(coach.into());
        self
    }

    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }
}

/// A competition event ready for scheduling.
///
/// Equality and hashing only look at name and division, so a re-read copy of
/// an event compares equal to the original.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    name: String,
    division: Division,
    coach: Option<String>,
    participants: Vec<String>,
    flagged_category: bool,
    priority: f64,
}

impl Event {
    /// Builds an event from a loader record, deriving its flagged status and
    /// priority from `config`. Blank names are dropped from the roster and
    /// repeated participants are kept once.
    pub fn from_record(record: EventRecord, config: &SchedulerConfig) -> Self {
        let name = record.name.trim().to_string();

        let coach = record
            .coach
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("none"));

        let mut seen = BTreeSet::new();
        let participants: Vec<String> = record
            .participants
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();

        let flagged_category = record
            .flagged
            .unwrap_or_else(|| config.is_flagged_category(&name));

        let priority = config.size_weight * participants.len() as f64
            + config.flagged_category_weight * if flagged_category { 1.0 } else { 0.0 };

        Self {
            name,
            division: record.division,
            coach,
            participants,
            flagged_category,
            priority,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn division(&self) -> Division {
        self.division
    }

    pub fn coach(&self) -> Option<&str> {
        self.coach.as_deref()
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn is_flagged_category(&self) -> bool {
        self.flagged_category
    }

    /// Placement priority; larger events are placed first.
    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn key(&self) -> EventKey {
        EventKey {
            name: self.name.clone(),
            division: self.division,
        }
    }

    /// Same event in the other division
    pub fn is_division_pair(&self, other: &Event) -> bool {
        self.name == other.name && self.division != other.division
    }

    pub fn shared_participants(&self, other: &Event) -> BTreeSet<String> {
        let theirs: BTreeSet<&str> = other.participants.iter().map(String::as_str).collect();
        self.participants
            .iter()
            .filter(|p| theirs.contains(p.as_str()))
            .cloned()
            .collect()
    }

    pub fn shared_coach(&self, other: &Event) -> Option<&str> {
        match (self.coach(), other.coach()) {
            (Some(mine), Some(theirs)) if mine == theirs => Some(mine),
            _ => None,
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.division == other.division
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.division.hash(state);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.division)
    }
}
