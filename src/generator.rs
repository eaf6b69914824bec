//! Random roster generator.
//!
//! Produces seeded, reproducible rosters for demos, benchmarks and tests.
//! The output is a plain list of [`EventRecord`]s, so it can be written out
//! as a JSON array and read back by the roster loader.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::event::{Division, EventRecord};

/// Event names the generator draws from.
pub const EVENT_NAMES: [&str; 24] = [
    "Anatomy",
    "Astronomy",
    "Bottle Rocket",
    "Chem Lab",
    "Codebusters",
    "Disease Detectives",
    "Dynamic Planet",
    "Electric Vehicle",
    "Experimental Design",
    "Forensics",
    "Fossils",
    "Game On",
    "Helicopters",
    "Meteorology",
    "Mission Possible",
    "Optics",
    "Ornithology",
    "Robot Arm",
    "Rocks and Minerals",
    "Scrambler",
    "Towers",
    "Wind Power",
    "Wright Stuff",
    "Write It Do It",
];

/// Configuration for generating rosters.
#[derive(Debug, Clone)]
pub struct RosterGeneratorConfig {
    /// Number of senior events (at most the size of the name list).
    pub num_events: usize,
    /// Number of distinct students.
    pub num_students: usize,
    /// Number of distinct coaches.
    pub num_coaches: usize,
    /// Participants per event range (min, max).
    pub participants_range: (usize, usize),
    /// Chance that a senior event also gets a junior counterpart.
    pub junior_pair_fraction: f64,
    /// Chance that an event has a coach.
    pub coached_fraction: f64,
}

impl Default for RosterGeneratorConfig {
    fn default() -> Self {
        Self {
            num_events: 20,
            num_students: 40,
            num_coaches: 8,
            participants_range: (2, 3),
            junior_pair_fraction: 0.25,
            coached_fraction: 0.8,
        }
    }
}

/// Seeded generator for event rosters.
pub struct RosterGenerator {
    config: RosterGeneratorConfig,
    rng: StdRng,
}

impl RosterGenerator {
    pub fn new(config: RosterGeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a roster. Junior counterparts follow their senior event.
    pub fn generate(&mut self) -> Vec<EventRecord> {
        let students: Vec<String> = (1..=self.config.num_students.max(1))
            .map(|i| format!("Student {:02}", i))
            .collect();
        let coaches: Vec<String> = (1..=self.config.num_coaches.max(1))
            .map(|i| format!("Coach {}", i))
            .collect();

        let count = self.config.num_events.min(EVENT_NAMES.len());
        let mut names = EVENT_NAMES.to_vec();
        names.shuffle(&mut self.rng);
        names.truncate(count);

        let mut records = Vec::with_capacity(count * 2);
        for name in names {
            records.push(self.event(name, Division::Senior, &students, &coaches));
            if self.rng.gen_bool(self.config.junior_pair_fraction.clamp(0.0, 1.0)) {
                records.push(self.event(name, Division::Junior, &students, &coaches));
            }
        }
        records
    }

    fn event(
        &mut self,
        name: &str,
        division: Division,
        students: &[String],
        coaches: &[String],
    ) -> EventRecord {
        let (min, max) = self.config.participants_range;
        let max = max.max(min).min(students.len());
        let size = self.rng.gen_range(min.min(max)..=max);
        let participants: Vec<String> = students
            .choose_multiple(&mut self.rng, size)
            .cloned()
            .collect();

        let mut record = EventRecord::new(name, division).with_participants(participants);
        if self.rng.gen_bool(self.config.coached_fraction.clamp(0.0, 1.0)) {
            if let Some(coach) = coaches.choose(&mut self.rng) {
                record = record.with_coach(coach.clone());
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_seed_same_roster() {
        let a = RosterGenerator::new(RosterGeneratorConfig::default(), 7).generate();
        let b = RosterGenerator::new(RosterGeneratorConfig::default(), 7).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_roster_shape() {
        let config = RosterGeneratorConfig {
            num_events: 10,
            num_students: 12,
            ..RosterGeneratorConfig::default()
        };
        let records = RosterGenerator::new(config, 3).generate();

        let seniors = records
            .iter()
            .filter(|r| r.division == Division::Senior)
            .count();
        assert_eq!(seniors, 10);

        let keys: HashSet<_> = records.iter().map(|r| (&r.name, r.division)).collect();
        assert_eq!(keys.len(), records.len());

        for record in &records {
            assert!((2..=3).contains(&record.participants.len()));
            let unique: HashSet<_> = record.participants.iter().collect();
            assert_eq!(unique.len(), record.participants.len());
        }

        // Junior events directly follow their senior counterpart
        for pair in records.windows(2) {
            if pair[1].division == Division::Junior {
                assert_eq!(pair[0].name, pair[1].name);
            }
        }
    }

    #[test]
    fn test_event_count_capped_by_name_list() {
        let config = RosterGeneratorConfig {
            num_events: 100,
            junior_pair_fraction: 0.0,
            ..RosterGeneratorConfig::default()
        };
        let records = RosterGenerator::new(config, 1).generate();
        assert_eq!(records.len(), EVENT_NAMES.len());
    }
}
