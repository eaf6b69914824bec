use std::ops::{Deref, DerefMut};

use crate::conflict::EventId;
use super::Schedule;

/// An event placed into a shift for the lifetime of the guard.
///
/// Dropping the guard takes the event back out, so a search branch that
/// returns early (pruned, budget exhausted, or done) always leaves the
/// schedule as it found it. The guard derefs to the schedule so the caller
/// can keep working on it while the placement is live.
#[derive(Debug)]
pub struct Placement<'a> {
    schedule: &'a mut Schedule,
    shift: usize,
    event: EventId,
    placed: bool,
}

impl<'a> Placement<'a> {
    pub(super) fn new(schedule: &'a mut Schedule, shift: usize, event: EventId) -> Self {
        let placed = schedule
            .shifts
            .get_mut(shift)
            .is_some_and(|target| target.add(event));
        Self {
            schedule,
            shift,
            event,
            placed,
        }
    }

    /// False when nothing changed: the event was already in the shift or the
    /// shift does not exist.
    pub fn is_placed(&self) -> bool {
        self.placed
    }
}

impl Deref for Placement<'_> {
    type Target = Schedule;

    fn deref(&self) -> &Schedule {
        self.schedule
    }
}

impl DerefMut for Placement<'_> {
    fn deref_mut(&mut self) -> &mut Schedule {
        self.schedule
    }
}

impl Drop for Placement<'_> {
    fn drop(&mut self) {
        if self.placed {
            self.schedule.shifts[self.shift].remove(self.event);
        }
    }
}
