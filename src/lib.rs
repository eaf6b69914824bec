//! Conflict-minimizing shift planner.
//!
//! Assigns competition events to a fixed number of parallel shifts so that as
//! few students and coaches as possible are needed in two places at once. The
//! search is an exhaustive branch-and-bound that keeps the best few complete
//! schedules it finds.

pub mod config;
pub mod conflict;
pub mod display;
pub mod error;
pub mod event;
pub mod generator;
pub mod parser;
pub mod schedule;
pub mod search;
pub mod web;

pub use config::SchedulerConfig;
pub use conflict::{ConflictTable, EventId, PairConflict};
pub use error::{ConfigError, LoadError, PlannerError, ReportError, Result};
pub use event::{Division, Event, EventRecord};
pub use schedule::{Placement, Schedule, Shift, ShiftSummary};
pub use search::{
    minimize_conflict, plan_schedules, ConflictMinimizer, Plan, RankedSchedule, SearchOutcome,
    SearchStats, SolutionSet,
};
