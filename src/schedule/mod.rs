pub mod types;
pub mod shift;
pub mod placement;

pub use types::{ScheduledEvent, ShiftSummary};
pub use shift::Shift;
pub use placement::Placement;

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::conflict::{ConflictTable, EventId};
use crate::error::ConfigError;
use crate::event::Event;

/// A full assignment (possibly partial) of events to a fixed number of shifts.
///
/// Cloning is cheap: shifts copy their event lists, while the events and the
/// conflict table stay shared behind one `Arc`. A clone taken with
/// [`Schedule::snapshot`] is unaffected by later changes to the original.
#[derive(Debug, Clone)]
pub struct Schedule {
    table: Arc<ConflictTable>,
    shifts: Vec<Shift>,
}

impl Schedule {
    /// Builds the conflict table for `events` and `config.num_shifts` empty
    /// shifts.
    pub fn new(events: &[Event], config: &SchedulerConfig) -> Result<Self, ConfigError> {
        let table = Arc::new(ConflictTable::build(events, config));
        Self::with_table(table, config.num_shifts)
    }

    /// Creates `num_shifts` empty shifts over an existing table.
    pub fn with_table(table: Arc<ConflictTable>, num_shifts: usize) -> Result<Self, ConfigError> {
        if num_shifts == 0 {
            return Err(ConfigError::invalid("num_shifts", "a schedule needs at least one shift"));
        }
        let shifts = (0..num_shifts).map(|_| Shift::new(table.clone())).collect();
        Ok(Self { table, shifts })
    }

    pub fn conflict_table(&self) -> &Arc<ConflictTable> {
        &self.table
    }

    /// Every event to be scheduled, placed or not
    pub fn events(&self) -> &[Event] {
        self.table.events()
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn num_shifts(&self) -> usize {
        self.shifts.len()
    }

    pub fn total_conflict(&self) -> f64 {
        self.shifts.iter().map(Shift::conflict_sum).sum()
    }

    /// Total conflict recomputed pair by pair, ignoring the running sums.
    pub fn recalculate_total_conflict(&self) -> f64 {
        self.shifts.iter().map(Shift::recalculate_conflict_sum).sum()
    }

    pub fn scheduled_count(&self) -> usize {
        self.shifts.iter().map(Shift::len).sum()
    }

    pub fn total_events(&self) -> usize {
        self.table.len()
    }

    pub fn is_complete(&self) -> bool {
        self.scheduled_count() == self.total_events()
    }

    /// Shift currently holding `event`, if any.
    pub fn shift_of(&self, event: EventId) -> Option<usize> {
        self.shifts.iter().position(|s| s.contains(event))
    }

    /// Permanently assigns an unplaced event, e.g. to pin it before a search.
    /// Returns false if the shift does not exist or the event is already
    /// placed somewhere.
    pub fn assign(&mut self, shift: usize, event: EventId) -> bool {
        if shift >= self.shifts.len() || self.shift_of(event).is_some() {
            return false;
        }
        self.shifts[shift].add(event)
    }

    /// Places `event` in `shift` until the returned guard is dropped.
    pub fn place(&mut self, shift: usize, event: EventId) -> Placement<'_> {
        Placement::new(self, shift, event)
    }

    /// Independent copy for keeping a finished schedule while the original
    /// keeps changing.
    pub fn snapshot(&self) -> Schedule {
        self.clone()
    }

    pub fn status(&self) -> String {
        format!(
            "Total conflict score: {} ({}/{} events placed)",
            self.total_conflict(),
            self.scheduled_count(),
            self.total_events()
        )
    }

    pub fn shift_summaries(&self) -> Vec<ShiftSummary> {
        self.shifts
            .iter()
            .enumerate()
            .map(|(index, shift)| shift.summary(index))
            .collect()
    }
}
