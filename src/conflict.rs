//! Pairwise conflict table.
//!
//! Every distinct (name, division) event gets a stable [`EventId`]. For each
//! unordered pair of ids the table stores who would be double-booked if the
//! two events ran in the same shift and the resulting score. The table is
//! built once and is read-only afterwards; shifts and schedule snapshots
//! share it through an `Arc`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::event::{Event, EventKey};

/// Row/column index of an event in a [`ConflictTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(usize);

impl EventId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Conflict information for one unordered pair of events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairConflict {
    /// Score added to a shift that holds both events
    pub score: f64,
    /// Students entered in both events
    pub shared_participants: BTreeSet<String>,
    /// Coach of both events, if they share one
    pub shared_coach: Option<String>,
    /// Same event name in opposite divisions
    pub division_pair: bool,
}

impl PairConflict {
    /// Whether scheduling the pair together double-books anybody.
    pub fn has_people_conflict(&self) -> bool {
        !self.shared_participants.is_empty() || self.shared_coach.is_some()
    }

    fn between(first: &Event, second: &Event, config: &SchedulerConfig) -> Self {
        // Paired events are meant to run together; nobody is double-booked.
        if first.is_division_pair(second) {
            return PairConflict {
                score: config.simultaneity_bonus,
                division_pair: true,
                ..PairConflict::default()
            };
        }

        let shared_participants = first.shared_participants(second);
        let student_score: f64 = shared_participants
            .iter()
            .map(|student| config.person_weight(student))
            .sum::<f64>()
            * config.student_conflict_weight;

        let shared_coach = first.shared_coach(second).map(str::to_string);
        let coach_score = shared_coach
            .as_deref()
            .map(|coach| config.person_weight(coach) * config.coach_conflict_weight)
            .unwrap_or(0.0);

        PairConflict {
            score: student_score + coach_score,
            shared_participants,
            shared_coach,
            division_pair: false,
        }
    }
}

/// Symmetric matrix of [`PairConflict`]s, stored as a strict upper triangle.
#[derive(Debug)]
pub struct ConflictTable {
    events: Vec<Event>,
    index: HashMap<EventKey, EventId>,
    cells: Vec<PairConflict>,
    empty: PairConflict,
}

impl ConflictTable {
    /// Builds the table for `events`.
    ///
    /// Events that repeat an earlier (name, division) key share the earlier
    /// event's index and are otherwise ignored.
    pub fn build(events: &[Event], config: &SchedulerConfig) -> Self {
        let mut distinct: Vec<Event> = Vec::with_capacity(events.len());
        let mut index: HashMap<EventKey, EventId> = HashMap::with_capacity(events.len());

        for event in events {
            let key = event.key();
            if index.contains_key(&key) {
                warn!(event = %event, "Duplicate event in roster; keeping the first entry");
                continue;
            }
            index.insert(key, EventId(distinct.len()));
            distinct.push(event.clone());
        }

        let n = distinct.len();
        let mut cells = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for col in 0..n {
            for row in 0..col {
                cells.push(PairConflict::between(&distinct[row], &distinct[col], config));
            }
        }

        let table = Self {
            events: distinct,
            index,
            cells,
            empty: PairConflict::default(),
        };

        debug!(
            events = table.len(),
            conflicting_pairs = table.cells.iter().filter(|c| c.has_people_conflict()).count(),
            division_pairs = table.division_pair_count(),
            "Conflict table built"
        );

        table
    }

    /// Number of distinct events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Distinct events in index order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn ids(&self) -> impl Iterator<Item = EventId> + '_ {
        (0..self.events.len()).map(EventId)
    }

    pub fn event(&self, id: EventId) -> &Event {
        &self.events[id.0]
    }

    pub fn try_id(&self, event: &Event) -> Option<EventId> {
        self.index.get(&event.key()).copied()
    }

    /// Index of `event`.
    ///
    /// # Panics
    ///
    /// Panics if `event` was not part of the roster the table was built from.
    pub fn id(&self, event: &Event) -> EventId {
        match self.try_id(event) {
            Some(id) => id,
            None => panic!("event {} is not in the conflict table", event),
        }
    }

    /// Conflict between two events by index. An event paired with itself has
    /// no conflict.
    pub fn pair(&self, a: EventId, b: EventId) -> &PairConflict {
        let (row, col) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        if row == col {
            return &self.empty;
        }
        &self.cells[col * (col - 1) / 2 + row]
    }

    #[inline]
    pub fn score(&self, a: EventId, b: EventId) -> f64 {
        self.pair(a, b).score
    }

    /// Conflict between two events.
    ///
    /// # Panics
    ///
    /// Panics if either event is unknown to the table.
    pub fn lookup(&self, first: &Event, second: &Event) -> &PairConflict {
        self.pair(self.id(first), self.id(second))
    }

    pub fn division_pair_count(&self) -> usize {
        self.cells.iter().filter(|c| c.division_pair).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Division, EventRecord};

    fn roster(config: &SchedulerConfig) -> Vec<Event> {
        [
            EventRecord::new("Anatomy", Division::Senior)
                .with_coach("Kim")
                .with_participants(["Ann", "Bo"]),
            EventRecord::new("Astronomy", Division::Senior)
                .with_coach("Kim")
                .with_participants(["Bo", "Cy"]),
            EventRecord::new("Codebusters", Division::Senior)
                .with_coach("Lee")
                .with_participants(["Dee"]),
            EventRecord::new("Anatomy", Division::Junior)
                .with_coach("Kim")
                .with_participants(["Ann"]),
        ]
        .into_iter()
        .map(|r| Event::from_record(r, config))
        .collect()
    }

    #[test]
    fn test_unrelated_events_score_zero() {
        let config = SchedulerConfig::default();
        let events = roster(&config);
        let table = ConflictTable::build(&events, &config);

        let pair = table.lookup(&events[0], &events[2]);
        assert_eq!(pair.score, 0.0);
        assert!(pair.shared_participants.is_empty());
        assert!(pair.shared_coach.is_none());
        assert!(!pair.division_pair);
    }

    #[test]
    fn test_student_and_coach_weights_combine() {
        let config = SchedulerConfig::default();
        let events = roster(&config);
        let table = ConflictTable::build(&events, &config);

        let pair = table.lookup(&events[0], &events[1]);
        assert_eq!(pair.shared_participants.iter().collect::<Vec<_>>(), ["Bo"]);
        assert_eq!(pair.shared_coach.as_deref(), Some("Kim"));
        assert!((pair.score - 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_person_weights_scale_contributions() {
        let mut config = SchedulerConfig::default();
        config.person_weights.insert("Bo".to_string(), 0.5);
        config.person_weights.insert("Kim".to_string(), 2.0);
        config.student_conflict_weight = 2.0;
        let events = roster(&config);
        let table = ConflictTable::build(&events, &config);

        // 0.5 * 2.0 for Bo, 2.0 * 0.9 for Kim
        assert!((table.lookup(&events[0], &events[1]).score - 2.8).abs() < 1e-9);
    }

    #[test]
    fn test_division_pair_gets_bonus_only() {
        let config = SchedulerConfig::default();
        let events = roster(&config);
        let table = ConflictTable::build(&events, &config);

        let pair = table.lookup(&events[0], &events[3]);
        assert!(pair.division_pair);
        assert_eq!(pair.score, config.simultaneity_bonus);
        assert!(!pair.has_people_conflict());
        assert_eq!(table.division_pair_count(), 1);
    }

    #[test]
    fn test_lookup_is_symmetric() {
        let config = SchedulerConfig::default();
        let events = roster(&config);
        let table = ConflictTable::build(&events, &config);

        for a in &events {
            for b in &events {
                assert_eq!(table.lookup(a, b), table.lookup(b, a));
            }
        }
    }

    #[test]
    fn test_same_event_has_no_conflict() {
        let config = SchedulerConfig::default();
        let events = roster(&config);
        let table = ConflictTable::build(&events, &config);
        assert_eq!(table.lookup(&events[1], &events[1]).score, 0.0);
    }

    #[test]
    fn test_duplicate_keys_share_an_index() {
        let config = SchedulerConfig::default();
        let mut events = roster(&config);
        let copy = Event::from_record(
            EventRecord::new("Astronomy", Division::Senior).with_participants(["Zed"]),
            &config,
        );
        events.push(copy.clone());
        let table = ConflictTable::build(&events, &config);

        assert_eq!(table.len(), 4);
        assert_eq!(table.id(&copy), table.id(&events[1]));
        assert_eq!(table.event(table.id(&copy)).participants(), ["Bo", "Cy"]);
    }

    #[test]
    #[should_panic(expected = "not in the conflict table")]
    fn test_unknown_event_panics() {
        let config = SchedulerConfig::default();
        let events = roster(&config);
        let table = ConflictTable::build(&events, &config);
        let stranger = Event::from_record(EventRecord::new("Fossils", Division::Senior), &config);
        table.lookup(&events[0], &stranger);
    }
}
