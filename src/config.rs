//! Scheduler configuration.
//!
//! Every weight that feeds the conflict table or the event priority lives
//! here, together with the search parameters. Loaded from TOML at runtime;
//! anything missing from the file falls back to the defaults below.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Event names that get the flagged-category priority boost by default.
pub const DEFAULT_FLAGGED_CATEGORIES: [&str; 14] = [
    "Bottle Rocket",
    "Chem Lab",
    "Electric Vehicle",
    "Experimental Design",
    "Forensics",
    "Game On",
    "Helicopters",
    "Mission Possible",
    "Robot Arm",
    "Scrambler",
    "Towers",
    "Wind Power",
    "Wright Stuff",
    "Write It Do It",
];

/// Top-level scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of parallel shifts to fill
    pub num_shifts: usize,

    /// Number of best schedules to keep
    pub num_results: usize,

    /// Multiplier applied to every shared student
    pub student_conflict_weight: f64,

    /// Multiplier applied to a shared coach
    pub coach_conflict_weight: f64,

    /// Score added when same-name events of opposite divisions share a shift.
    /// Negative values reward running them together.
    pub simultaneity_bonus: f64,

    /// Priority contributed by each participant of an event
    pub size_weight: f64,

    /// Priority contributed by being in a flagged category
    pub flagged_category_weight: f64,

    /// Event names that count as flagged categories
    pub flagged_categories: Vec<String>,

    /// Per-person multipliers; people not listed weigh 1
    pub person_weights: BTreeMap<String, f64>,

    /// Acceptance threshold used before the solution set fills up.
    /// `None` accepts any score.
    pub initial_threshold: Option<f64>,

    /// Stop expanding the search tree after this many nodes
    pub node_limit: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            num_shifts: 4,
            num_results: 10,
            student_conflict_weight: 1.0,
            coach_conflict_weight: 0.9,
            simultaneity_bonus: -1.0,
            size_weight: 1.0,
            flagged_category_weight: 1.2,
            flagged_categories: DEFAULT_FLAGGED_CATEGORIES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            person_weights: BTreeMap::new(),
            initial_threshold: None,
            node_limit: None,
        }
    }
}

impl SchedulerConfig {
    /// Reads a TOML configuration file and validates it.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ConfigError::InvalidValue { .. } => e,
            ConfigError::LoadFailed { message, .. } => ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message,
            },
        })
    }

    /// Parses TOML text and validates the result.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SchedulerConfig = toml::from_str(text).map_err(|e| ConfigError::LoadFailed {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value can drive a search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_shifts == 0 {
            return Err(ConfigError::invalid("num_shifts", "must be at least 1"));
        }
        if self.num_results == 0 {
            return Err(ConfigError::invalid("num_results", "must be at least 1"));
        }

        let weights = [
            ("student_conflict_weight", self.student_conflict_weight),
            ("coach_conflict_weight", self.coach_conflict_weight),
            ("simultaneity_bonus", self.simultaneity_bonus),
            ("size_weight", self.size_weight),
            ("flagged_category_weight", self.flagged_category_weight),
        ];
        for (key, value) in weights {
            if !value.is_finite() {
                return Err(ConfigError::invalid(key, format!("{} is not a finite number", value)));
            }
        }

        for (person, weight) in &self.person_weights {
            if !weight.is_finite() {
                return Err(ConfigError::invalid(
                    "person_weights",
                    format!("weight for '{}' is not a finite number", person),
                ));
            }
        }

        if let Some(threshold) = self.initial_threshold {
            if threshold.is_nan() {
                return Err(ConfigError::invalid("initial_threshold", "must be a number"));
            }
        }

        if self.node_limit == Some(0) {
            return Err(ConfigError::invalid("node_limit", "must be at least 1"));
        }

        Ok(())
    }

    /// Multiplier for a student or coach; 1 unless overridden.
    pub fn person_weight(&self, person: &str) -> f64 {
        self.person_weights.get(person).copied().unwrap_or(1.0)
    }

    /// Whether `event_name` belongs to a flagged category.
    pub fn is_flagged_category(&self, event_name: &str) -> bool {
        self.flagged_categories.iter().any(|name| name == event_name)
    }
}
