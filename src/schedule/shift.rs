use std::sync::Arc;

use crate::conflict::{ConflictTable, EventId};
use crate::event::Event;
use super::types::{ScheduledEvent, ShiftSummary};

#[derive(Debug, Clone, Copy)]
struct Entry {
    event: EventId,
    /// Score the event added when it joined the shift
    marginal: f64,
    /// Shift total just before the event joined
    sum_before: f64,
}

/// Events sharing one time slot, with an incrementally maintained conflict
/// total.
///
/// `conflict_sum` always equals the sum of table scores over every pair of
/// events in the shift. Removing the most recently added event restores the
/// previous total exactly, which keeps backtracking free of float drift.
#[derive(Debug, Clone)]
pub struct Shift {
    table: Arc<ConflictTable>,
    entries: Vec<Entry>,
    conflict_sum: f64,
}

impl Shift {
    pub fn new(table: Arc<ConflictTable>) -> Self {
        Self {
            table,
            entries: Vec::new(),
            conflict_sum: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn conflict_sum(&self) -> f64 {
        self.conflict_sum
    }

    pub fn contains(&self, event: EventId) -> bool {
        self.entries.iter().any(|e| e.event == event)
    }

    /// Event ids in insertion order
    pub fn event_ids(&self) -> impl Iterator<Item = EventId> + '_ {
        self.entries.iter().map(|e| e.event)
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.entries.iter().map(move |e| self.table.event(e.event))
    }

    /// Score the shift would gain if `event` joined it.
    pub fn marginal_cost(&self, event: EventId) -> f64 {
        self.entries
            .iter()
            .map(|e| self.table.score(e.event, event))
            .sum()
    }

    /// Adds `event` unless it is already in the shift. Returns whether the
    /// shift changed.
    pub fn add(&mut self, event: EventId) -> bool {
        if self.contains(event) {
            return false;
        }
        let marginal = self.marginal_cost(event);
        self.entries.push(Entry {
            event,
            marginal,
            sum_before: self.conflict_sum,
        });
        self.conflict_sum += marginal;
        true
    }

    /// Removes `event`. Returns whether it was present.
    pub fn remove(&mut self, event: EventId) -> bool {
        let Some(position) = self.entries.iter().rposition(|e| e.event == event) else {
            return false;
        };

        if position + 1 == self.entries.len() {
            if let Some(entry) = self.entries.pop() {
                self.conflict_sum = entry.sum_before;
            }
            return true;
        }

        // Later entries counted the removed event in their marginals; replay
        // them so the recorded values stay consistent.
        self.entries.remove(position);
        let remaining: Vec<EventId> = self.event_ids().collect();
        self.entries.clear();
        self.conflict_sum = 0.0;
        for id in remaining {
            self.add(id);
        }
        true
    }

    /// Recorded marginal scores, in insertion order.
    pub fn marginals(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.marginal)
    }

    /// Sum over all pairs, computed from scratch.
    pub fn recalculate_conflict_sum(&self) -> f64 {
        self.pairs().map(|(a, b)| self.table.score(a, b)).sum()
    }

    /// Students double-booked by this shift, once per conflicting pair.
    pub fn students_with_conflicts(&self) -> Vec<String> {
        self.pairs()
            .flat_map(|(a, b)| self.table.pair(a, b).shared_participants.iter().cloned())
            .collect()
    }

    /// Coaches double-booked by this shift, once per conflicting pair.
    pub fn coaches_with_conflicts(&self) -> Vec<String> {
        self.pairs()
            .filter_map(|(a, b)| self.table.pair(a, b).shared_coach.clone())
            .collect()
    }

    pub fn summary(&self, index: usize) -> ShiftSummary {
        ShiftSummary {
            index,
            conflict_sum: self.conflict_sum,
            events: self.events().map(ScheduledEvent::from).collect(),
            students_with_conflicts: self.students_with_conflicts(),
            coaches_with_conflicts: self.coaches_with_conflicts(),
        }
    }

    /// Every (later, earlier) pair of events in insertion order.
    fn pairs(&self) -> impl Iterator<Item = (EventId, EventId)> + '_ {
        self.entries.iter().enumerate().flat_map(move |(i, later)| {
            self.entries[..i]
                .iter()
                .map(move |earlier| (later.event, earlier.event))
        })
    }
}
