//! Branch-and-bound search that minimizes the total conflict score.
//!
//! Events are placed one at a time, highest priority first. For each event
//! the search branches over every shift whose marginal cost ties for the
//! minimum, opening at most one empty shift per step since empty shifts are
//! interchangeable. A branch is abandoned as soon as its accrued conflict
//! passes the [`SolutionSet`] threshold. Every complete schedule reached is
//! offered to the solution set.

use std::time::Instant;

use tracing::{debug, info};

use crate::config::SchedulerConfig;
use crate::conflict::EventId;
use crate::error::ConfigError;
use crate::schedule::Schedule;
use super::solutions::SolutionSet;
use super::stats::SearchStats;

/// Marginal costs this close to the minimum count as ties.
const TIE_EPSILON: f64 = 1e-9;

/// Result of a search: the retained schedules and how the search went.
#[derive(Debug)]
pub struct SearchOutcome {
    pub solutions: SolutionSet,
    pub stats: SearchStats,
}

/// Search parameters.
#[derive(Debug, Clone)]
pub struct ConflictMinimizer {
    num_results: usize,
    initial_threshold: f64,
    node_limit: Option<u64>,
}

impl ConflictMinimizer {
    pub fn new(num_results: usize) -> Self {
        Self {
            num_results,
            initial_threshold: f64::INFINITY,
            node_limit: None,
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            num_results: config.num_results,
            initial_threshold: config.initial_threshold.unwrap_or(f64::INFINITY),
            node_limit: config.node_limit,
        }
    }

    pub fn with_initial_threshold(mut self, threshold: f64) -> Self {
        self.initial_threshold = threshold;
        self
    }

    pub fn with_node_limit(mut self, node_limit: u64) -> Self {
        self.node_limit = Some(node_limit);
        self
    }

    /// Runs the search over every event not yet placed in `schedule`.
    ///
    /// The schedule is used as scratch space and is returned unchanged.
    pub fn solve(&self, schedule: &mut Schedule) -> Result<SearchOutcome, ConfigError> {
        let solutions = SolutionSet::with_initial_threshold(self.num_results, self.initial_threshold)?;
        if self.node_limit == Some(0) {
            return Err(ConfigError::invalid("node_limit", "must be at least 1"));
        }

        let queue = placement_queue(schedule);
        info!(
            events = schedule.total_events(),
            unplaced = queue.len(),
            shifts = schedule.num_shifts(),
            results = self.num_results,
            "Minimizing conflicts"
        );

        let start = Instant::now();
        let mut search = Search {
            solutions,
            stats: SearchStats::default(),
            queue,
            node_limit: self.node_limit,
        };
        search.expand(schedule);
        search.stats.elapsed = start.elapsed();

        info!(
            nodes = search.stats.nodes,
            pruned = search.stats.pruned,
            found = search.stats.solutions_found,
            kept = search.solutions.len(),
            best = ?search.solutions.best_score(),
            stopped_early = search.stats.node_limit_reached,
            "Finished optimizing schedules"
        );

        Ok(SearchOutcome {
            solutions: search.solutions,
            stats: search.stats,
        })
    }
}

/// Searches for the `num_results` lowest-conflict completions of `schedule`.
pub fn minimize_conflict(
    schedule: &mut Schedule,
    num_results: usize,
) -> Result<SearchOutcome, ConfigError> {
    ConflictMinimizer::new(num_results).solve(schedule)
}

/// Unplaced events as a stack: the last element is the next to place.
/// Highest priority goes first; ties keep roster order.
fn placement_queue(schedule: &Schedule) -> Vec<EventId> {
    let table = schedule.conflict_table();
    let mut order: Vec<EventId> = table
        .ids()
        .filter(|&id| schedule.shift_of(id).is_none())
        .collect();
    order.sort_by(|&a, &b| {
        table
            .event(b)
            .priority()
            .total_cmp(&table.event(a).priority())
    });
    order.reverse();
    order
}

struct Search {
    solutions: SolutionSet,
    stats: SearchStats,
    queue: Vec<EventId>,
    node_limit: Option<u64>,
}

impl Search {
    fn expand(&mut self, schedule: &mut Schedule) {
        if let Some(limit) = self.node_limit {
            if self.stats.nodes >= limit {
                self.stats.node_limit_reached = true;
                return;
            }
        }
        self.stats.nodes += 1;

        if schedule.total_conflict() > self.solutions.threshold() {
            self.stats.pruned += 1;
            return;
        }

        if schedule.is_complete() {
            self.stats.solutions_found += 1;
            if self.solutions.offer(schedule) {
                self.stats.solutions_accepted += 1;
                debug!("Possible order found. {}", schedule.status());
            }
            return;
        }

        let Some(event) = self.queue.pop() else {
            return;
        };

        let costs: Vec<f64> = schedule
            .shifts()
            .iter()
            .map(|shift| shift.marginal_cost(event))
            .collect();
        let min_cost = costs.iter().copied().fold(f64::INFINITY, f64::min);

        let mut opened_empty_shift = false;
        for (index, cost) in costs.into_iter().enumerate() {
            if cost > min_cost + TIE_EPSILON {
                continue;
            }
            if schedule.shifts()[index].is_empty() {
                if opened_empty_shift {
                    continue;
                }
                opened_empty_shift = true;
            }

            let mut placed = schedule.place(index, event);
            self.expand(&mut placed);
        }

        self.queue.push(event);
    }
}
