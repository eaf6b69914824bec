use serde::Serialize;

use crate::event::{Division, Event};

/// An event as it appears in a finished schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledEvent {
    pub name: String,
    pub division: Division,
    pub coach: Option<String>,
    pub participants: Vec<String>,
}

impl From<&Event> for ScheduledEvent {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name().to_string(),
            division: event.division(),
            coach: event.coach().map(str::to_string),
            participants: event.participants().to_vec(),
        }
    }
}

/// Per-shift conflict breakdown used by reports and the HTTP API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftSummary {
    pub index: usize,
    pub conflict_sum: f64,
    pub events: Vec<ScheduledEvent>,
    pub students_with_conflicts: Vec<String>,
    pub coaches_with_conflicts: Vec<String>,
}

impl ShiftSummary {
    pub fn student_conflicts(&self) -> usize {
        self.students_with_conflicts.len()
    }

    pub fn coach_conflicts(&self) -> usize {
        self.coaches_with_conflicts.len()
    }

    pub fn total_conflicts(&self) -> usize {
        self.student_conflicts() + self.coach_conflicts()
    }
}
