//! Bounded collection of the best complete schedules.
//!
//! A max-heap keyed by conflict score holds at most `capacity` snapshots. Once
//! the heap is full its top is the worst retained score, which doubles as the
//! pruning threshold for the search.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::error::ConfigError;
use crate::schedule::Schedule;

/// A finished schedule together with its score.
#[derive(Debug, Clone)]
pub struct RankedSchedule {
    pub score: f64,
    pub schedule: Schedule,
}

#[derive(Debug)]
struct Entry {
    score: f64,
    /// Insertion counter; among equal scores the newest entry ranks worst.
    seq: u64,
    schedule: Schedule,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Keeps the `capacity` lowest-scoring schedules offered to it.
///
/// `threshold` starts at the initial sentinel (unbounded unless configured)
/// and, once the set is full, follows the worst retained score. It never
/// increases.
#[derive(Debug)]
pub struct SolutionSet {
    capacity: usize,
    heap: BinaryHeap<Entry>,
    threshold: f64,
    next_seq: u64,
}

impl SolutionSet {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_initial_threshold(capacity, f64::INFINITY)
    }

    pub fn with_initial_threshold(capacity: usize, threshold: f64) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::invalid("num_results", "must keep at least one schedule"));
        }
        if threshold.is_nan() {
            return Err(ConfigError::invalid("initial_threshold", "must be a number"));
        }
        Ok(Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity + 1),
            threshold,
            next_seq: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Score a partial schedule must not exceed to stay worth exploring.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn best_score(&self) -> Option<f64> {
        self.heap.iter().map(|e| e.score).min_by(f64::total_cmp)
    }

    /// Offers a complete schedule. A snapshot is stored if it makes the cut;
    /// returns whether it did.
    pub fn offer(&mut self, schedule: &Schedule) -> bool {
        let score = schedule.total_conflict();

        if self.is_full() && score >= self.threshold {
            return false;
        }

        self.heap.push(Entry {
            score,
            seq: self.next_seq,
            schedule: schedule.snapshot(),
        });
        self.next_seq += 1;

        if self.heap.len() > self.capacity {
            self.heap.pop();
        }

        if self.is_full() {
            if let Some(worst) = self.heap.peek() {
                if worst.score < self.threshold {
                    debug!(threshold = worst.score, "New threshold");
                    self.threshold = worst.score;
                }
            }
        }

        true
    }

    /// Retained schedules, best first. Equal scores keep discovery order.
    pub fn ranked_results(self) -> Vec<RankedSchedule> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|entry| RankedSchedule {
                score: entry.score,
                schedule: entry.schedule,
            })
            .collect()
    }
}
