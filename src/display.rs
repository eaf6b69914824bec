use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::{Writer, WriterBuilder};
use tracing::info;

use crate::error::ReportError;
use crate::schedule::{Schedule, ShiftSummary};
use crate::search::RankedSchedule;

/// Formats a conflict score with at most two decimals: `3`, `2.5`, `-0.75`
pub fn format_score(score: f64) -> String {
    let text = format!("{:.2}", score);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn join_names(names: &[String]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

fn write_shift<W: Write>(writer: &mut Writer<W>, summary: &ShiftSummary) -> Result<(), ReportError> {
    writer.write_record(["..."])?;
    writer.write_record([format!("Shift {}:", summary.index + 1)])?;
    writer.write_record(["Conflict Summary:"])?;
    writer.write_record(["Student Conflicts", "Coach Conflicts", "Total Conflicts"])?;
    writer.write_record([
        summary.student_conflicts().to_string(),
        summary.coach_conflicts().to_string(),
        summary.total_conflicts().to_string(),
    ])?;
    writer.write_record([
        "Students with conflicts:".to_string(),
        join_names(&summary.students_with_conflicts),
    ])?;
    writer.write_record([
        "Coaches with conflicts:".to_string(),
        join_names(&summary.coaches_with_conflicts),
    ])?;

    writer.write_record(["Event Name", "B/C", "Coach", "Students"])?;
    for event in &summary.events {
        writer.write_record([
            event.name.as_str(),
            event.division.label(),
            event.coach.as_deref().unwrap_or("None"),
            event.participants.join(", ").as_str(),
        ])?;
    }
    Ok(())
}

/// Writes one ranked schedule as a CSV report to `out`.
pub fn write_schedule_csv<W: Write>(
    out: W,
    option: usize,
    ranked: &RankedSchedule,
) -> Result<(), ReportError> {
    // Rows have different widths
    let mut writer = WriterBuilder::new().flexible(true).from_writer(out);

    writer.write_record([format!("Option {}", option)])?;
    writer.write_record(["Conflict Score:".to_string(), format_score(ranked.score)])?;
    writer.write_record([
        "Generated:".to_string(),
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    ])?;

    for summary in ranked.schedule.shift_summaries() {
        write_shift(&mut writer, &summary)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes `<base_name>_option<i>.csv` into `folder` for every result, best
/// first, and returns the paths written.
pub fn write_csv_reports(
    results: &[RankedSchedule],
    base_name: &str,
    folder: &Path,
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(folder)?;

    let mut written = Vec::with_capacity(results.len());
    for (index, ranked) in results.iter().enumerate() {
        let option = index + 1;
        let path = folder.join(format!("{}_option{}.csv", base_name, option));
        write_schedule_csv(File::create(&path)?, option, ranked)?;
        written.push(path);
    }

    info!(folder = %folder.display(), files = written.len(), "Wrote schedule reports");
    Ok(written)
}

/// Prints a single schedule shift by shift
pub fn print_schedule(schedule: &Schedule) {
    for summary in schedule.shift_summaries() {
        println!(
            "  Shift {} (conflict {}):",
            summary.index + 1,
            format_score(summary.conflict_sum)
        );
        for event in &summary.events {
            println!(
                "    - {} ({}) coach: {} students: {}",
                event.name,
                event.division.label(),
                event.coach.as_deref().unwrap_or("None"),
                event.participants.len()
            );
        }
        if summary.total_conflicts() > 0 {
            println!(
                "    ⚠️  Conflicts: students [{}], coaches [{}]",
                join_names(&summary.students_with_conflicts),
                join_names(&summary.coaches_with_conflicts)
            );
        }
    }
}

/// Prints every ranked result, best first
pub fn print_ranked_summary(results: &[RankedSchedule]) {
    if results.is_empty() {
        println!("No schedule beat the acceptance threshold.");
        return;
    }

    println!("\n=== Best Schedules ({}) ===", results.len());
    for (index, ranked) in results.iter().enumerate() {
        println!(
            "\nOption {}: conflict score {}",
            index + 1,
            format_score(ranked.score)
        );
        print_schedule(&ranked.schedule);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::event::{Division, EventRecord};
    use crate::search::plan_schedules;

    fn results() -> Vec<RankedSchedule> {
        let records = vec![
            EventRecord::new("Towers", Division::Senior)
                .with_coach("Kim")
                .with_participants(["Ann", "Bo"]),
            EventRecord::new("Anatomy", Division::Senior)
                .with_coach("Kim")
                .with_participants(["Ann"]),
            EventRecord::new("Optics", Division::Senior).with_participants(["Cy"]),
        ];
        let config = SchedulerConfig {
            num_shifts: 1,
            num_results: 2,
            ..SchedulerConfig::default()
        };
        plan_schedules(records, &config).unwrap().results
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(3.0), "3");
        assert_eq!(format_score(2.5), "2.5");
        assert_eq!(format_score(-0.75), "-0.75");
        assert_eq!(format_score(1.0 / 3.0), "0.33");
        assert_eq!(format_score(-0.0001), "0");
    }

    #[test]
    fn test_schedule_csv_layout() {
        let results = results();
        let mut buffer = Vec::new();
        write_schedule_csv(&mut buffer, 1, &results[0]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("Option 1\n"));
        assert!(text.contains("Shift 1:"));
        assert!(text.contains("Students with conflicts:,Ann"));
        assert!(text.contains("Coaches with conflicts:,Kim"));
        assert!(text.contains("Event Name,B/C,Coach,Students"));
        assert!(text.contains("Towers,C,Kim,\"Ann, Bo\""));
        assert!(text.contains("Optics,C,None,Cy"));
    }

    #[test]
    fn test_write_csv_reports_one_file_per_option() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("out");
        let results = results();

        let written = write_csv_reports(&results, "demo", &folder).unwrap();

        assert_eq!(written.len(), results.len());
        assert_eq!(written[0], folder.join("demo_option1.csv"));
        for path in &written {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_report_score_matches_schedule() {
        let results = results();
        let mut buffer = Vec::new();
        write_schedule_csv(&mut buffer, 1, &results[0]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let expected = format!("Conflict Score:,{}", format_score(results[0].schedule.total_conflict()));
        assert!(text.contains(&expected));
    }
}
