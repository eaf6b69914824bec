pub mod engine;
pub mod solutions;
pub mod stats;

pub use engine::{minimize_conflict, ConflictMinimizer, SearchOutcome};
pub use solutions::{RankedSchedule, SolutionSet};
pub use stats::SearchStats;

use crate::config::SchedulerConfig;
use crate::error::ConfigError;
use crate::event::{Event, EventRecord};
use crate::schedule::Schedule;
use tracing::warn;

/// Best schedules for a roster, best first, plus search statistics.
#[derive(Debug, Clone)]
pub struct Plan {
    pub results: Vec<RankedSchedule>,
    pub stats: SearchStats,
}

/// Validates `config`, builds events from `records` and runs the search.
pub fn plan_schedules(
    records: Vec<EventRecord>,
    config: &SchedulerConfig,
) -> Result<Plan, ConfigError> {
    config.validate()?;
    let events: Vec<Event> = records
        .into_iter()
        .map(|record| Event::from_record(record, config))
        .collect();

    let mut schedule = Schedule::new(&events, config)?;
    if schedule.conflict_table().is_empty() {
        warn!("Roster has no events; the only schedule is the empty one");
    }
    let outcome = ConflictMinimizer::from_config(config).solve(&mut schedule)?;

    Ok(Plan {
        results: outcome.solutions.ranked_results(),
        stats: outcome.stats,
    })
}
