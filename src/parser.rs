use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::info;

use crate::error::LoadError;
use crate::event::{Division, EventRecord};

/// Event entry in the name-keyed JSON layout:
/// `{ "Towers": { "kids": [...], "coach": "Kim" } }`
#[derive(Debug, Deserialize)]
struct NamedEntry {
    #[serde(default, alias = "kids", alias = "students")]
    participants: Vec<String>,
    #[serde(default)]
    coach: Option<String>,
    #[serde(default)]
    division: Option<Division>,
    /// Older files mark senior events with `hs: true`
    #[serde(default)]
    hs: Option<bool>,
    #[serde(default, alias = "build_event")]
    flagged: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RosterDocument {
    Records(Vec<EventRecord>),
    ByName(BTreeMap<String, NamedEntry>),
}

/// Splits a comma separated list of people, dropping blanks
fn split_people(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Empty or "none" means the event has no coach
fn parse_coach(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses a JSON roster: either an array of records or an object keyed by
/// event name. Object entries come out in name order.
pub fn parse_json_str(text: &str) -> Result<Vec<EventRecord>, LoadError> {
    let document: RosterDocument = serde_json::from_str(text)?;
    let records = match document {
        RosterDocument::Records(records) => records,
        RosterDocument::ByName(entries) => entries
            .into_iter()
            .map(|(name, entry)| EventRecord {
                name,
                division: entry
                    .division
                    .or(entry.hs.map(Division::from_senior_flag))
                    .unwrap_or_default(),
                coach: entry.coach,
                participants: entry.participants,
                flagged: entry.flagged,
            })
            .collect(),
    };

    if let Some(position) = records.iter().position(|r| r.name.trim().is_empty()) {
        return Err(LoadError::MissingField {
            line: position as u64 + 1,
            field: "name",
        });
    }
    Ok(records)
}

/// Column whose header equals one of `exact`, else the first header
/// containing a `partial` pattern, trying patterns in order. Headers naming
/// a coach only match patterns that mention the coach.
fn find_column(headers: &[String], exact: &[&str], partial: &[&str]) -> Option<usize> {
    if let Some(col) = headers.iter().position(|h| exact.contains(&h.as_str())) {
        return Some(col);
    }
    partial.iter().find_map(|pattern| {
        headers
            .iter()
            .position(|h| h.contains(*pattern) && (pattern.contains("coach") || !h.contains("coach")))
    })
}

/// Reads a CSV roster with a header row.
///
/// Columns are located by header text (`name`, `students`/`kids`/
/// `participants`, `coach`, `division`/`B/C`), exact matches first, falling
/// back to the positions name, students, coach.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<EventRecord>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();

    let name_col = find_column(&headers, &["name", "event name", "event"], &["event", "name"])
        .unwrap_or(0);
    let students_col = find_column(
        &headers,
        &["students", "kids", "participants"],
        &["student", "kid", "participant"],
    )
    .unwrap_or(1);
    let coach_col = find_column(&headers, &["coach", "coach name"], &["coach"]).unwrap_or(2);
    let division_col = find_column(&headers, &["division", "b/c"], &["division"]);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // Skip blank lines
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let name = record.get(name_col).unwrap_or("").to_string();
        if name.is_empty() {
            return Err(LoadError::MissingField { line, field: "name" });
        }

        let Some(students) = record.get(students_col) else {
            return Err(LoadError::MissingField { line, field: "students" });
        };

        let division = match division_col.and_then(|col| record.get(col)) {
            Some(value) => value
                .parse()
                .map_err(|message| LoadError::InvalidField {
                    line,
                    field: "division",
                    message,
                })?,
            None => Division::default(),
        };

        records.push(EventRecord {
            name,
            division,
            coach: record.get(coach_col).and_then(parse_coach),
            participants: split_people(students),
            flagged: None,
        });
    }

    Ok(records)
}

/// Parses the legacy line format.
///
/// Each line is `<marker><event>;<person>,<person>,...,<coach>`. The marker
/// is one character; `!` flags the event. The last person is the coach, and
/// `none` means there is none. Blank lines and `#` comments are skipped.
pub fn parse_legacy_str(text: &str) -> Result<Vec<EventRecord>, LoadError> {
    let mut records = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index as u64 + 1;
        let trimmed = raw.trim_end();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((head, people)) = trimmed.split_once(';') else {
            return Err(LoadError::MissingField { line, field: "people" });
        };

        let mut chars = head.chars();
        let marker = chars.next();
        let name = chars.as_str().trim();
        if name.is_empty() {
            return Err(LoadError::MissingField { line, field: "name" });
        }

        let mut participants: Vec<String> = people.split(',').map(|p| p.trim().to_string()).collect();
        let coach = participants.pop().as_deref().and_then(parse_coach);
        participants.retain(|p| !p.is_empty());

        records.push(EventRecord {
            name: name.to_string(),
            division: Division::default(),
            coach,
            participants,
            flagged: (marker == Some('!')).then_some(true),
        });
    }

    Ok(records)
}

/// Loads a roster, choosing the format from the file extension
/// (`json`, `csv` or `txt`).
pub fn load_events<P: AsRef<Path>>(path: P) -> Result<Vec<EventRecord>, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let read = |path: &Path| {
        std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    let records = match extension.as_str() {
        "json" => parse_json_str(&read(path)?)?,
        "csv" => {
            let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_csv(file)?
        }
        "txt" => parse_legacy_str(&read(path)?)?,
        _ => return Err(LoadError::UnsupportedFormat(path.display().to_string())),
    };

    info!(path = %path.display(), format = %extension, events = records.len(), "Loaded events");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_json_by_name() {
        let records = parse_json_str(
            r#"{
                "Towers": { "kids": ["Ann", "Bo"], "coach": "Kim" },
                "Anatomy": { "students": ["Cy"], "coach": null, "hs": false }
            }"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Anatomy");
        assert_eq!(records[0].division, Division::Junior);
        assert_eq!(records[0].coach, None);
        assert_eq!(records[1].name, "Towers");
        assert_eq!(records[1].division, Division::Senior);
        assert_eq!(records[1].participants, ["Ann", "Bo"]);
        assert_eq!(records[1].coach.as_deref(), Some("Kim"));
    }

    #[test]
    fn test_json_records() {
        let records = parse_json_str(
            r#"[
                { "name": "Towers", "division": "B", "participants": ["Ann"], "flagged": false },
                { "name": "Towers", "division": "senior", "kids": ["Bo"], "coach": "Kim" }
            ]"#,
        )
        .unwrap();

        assert_eq!(records[0].division, Division::Junior);
        assert_eq!(records[0].flagged, Some(false));
        assert_eq!(records[1].division, Division::Senior);
        assert_eq!(records[1].participants, ["Bo"]);
    }

    #[test]
    fn test_json_missing_name_rejected() {
        let err = parse_json_str(r#"[{ "name": " ", "participants": [] }]"#).unwrap_err();
        assert!(matches!(err, LoadError::MissingField { field: "name", .. }));
    }

    #[test]
    fn test_csv_roster() {
        let data = "Event Name,Students,Coach,Division\n\
                    Towers,\"Ann, Bo\",Kim,C\n\
                    \n\
                    Anatomy,Cy,none,B\n";
        let records = read_csv(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].participants, ["Ann", "Bo"]);
        assert_eq!(records[0].coach.as_deref(), Some("Kim"));
        assert_eq!(records[1].division, Division::Junior);
        assert_eq!(records[1].coach, None);
    }

    #[test]
    fn test_csv_without_division_column() {
        let data = "name,kids,coach\nForensics,\"Ann,Bo\",\n";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].division, Division::Senior);
        assert_eq!(records[0].coach, None);
    }

    #[test]
    fn test_csv_coach_name_column_before_event() {
        let data = "Coach Name,Event Name,Students\nKim,Towers,\"Ann, Bo\"\n";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].name, "Towers");
        assert_eq!(records[0].coach.as_deref(), Some("Kim"));
        assert_eq!(records[0].participants, ["Ann", "Bo"]);
    }

    #[test]
    fn test_csv_partial_headers() {
        let data = "Coach In Charge,Event Title,Student List\nKim,Towers,Ann\n";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].name, "Towers");
        assert_eq!(records[0].coach.as_deref(), Some("Kim"));
        assert_eq!(records[0].participants, ["Ann"]);
    }

    #[test]
    fn test_csv_missing_name_rejected() {
        let data = "name,students,coach\n,Ann,Kim\n";
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingField { field: "name", line: 2 }));
    }

    #[test]
    fn test_csv_bad_division_rejected() {
        let data = "name,students,coach,division\nTowers,Ann,Kim,X\n";
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { field: "division", .. }));
    }

    #[test]
    fn test_legacy_format() {
        let text = "# assignments\n\
                    \n\
                    !Towers;Ann,Bo,Kim\n\
                    -Anatomy;Cy,none\n";
        let records = parse_legacy_str(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Towers");
        assert_eq!(records[0].participants, ["Ann", "Bo"]);
        assert_eq!(records[0].coach.as_deref(), Some("Kim"));
        assert_eq!(records[0].flagged, Some(true));
        assert_eq!(records[1].name, "Anatomy");
        assert_eq!(records[1].participants, ["Cy"]);
        assert_eq!(records[1].coach, None);
        assert_eq!(records[1].flagged, None);
    }

    #[test]
    fn test_legacy_line_without_people_rejected() {
        let err = parse_legacy_str("!Towers\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingField { line: 1, field: "people" }));
    }

    #[test]
    fn test_load_events_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "!Towers;Ann,Kim").unwrap();
        drop(file);

        let records = load_events(&path).unwrap();
        assert_eq!(records[0].participants, ["Ann"]);

        let err = load_events(dir.path().join("roster.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));

        let err = load_events(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
