use chrono::{DateTime, Local};
use gpp_engine::allocation::{fixed, CategoryTotal};
use gpp_engine::{Diagnostic, StudentReport, SummaryRow};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ReportView<'a> {
    #[serde(flatten)]
    summary: SummaryRow,
    categories: Vec<&'a CategoryTotal>,
    diagnostics: &'a [Diagnostic],
}

pub(crate) fn audit_file_contents(report: &StudentReport, generated_at: DateTime<Local>) -> String {
    format!(
        "Generated: {}\nStudent: {} {}\n{}",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        report.student.id,
        report.student.name,
        report.audit_text()
    )
}

/// Writes `<dir>/<student_id>.txt` for every report and returns the file count.
pub(crate) fn write_audit_logs(
    dir: &Path,
    reports: &[StudentReport],
    generated_at: DateTime<Local>,
) -> io::Result<usize> {
    fs::create_dir_all(dir)?;
    for report in reports {
        let path = dir.join(format!("{}.txt", report.student.id));
        fs::write(path, audit_file_contents(report, generated_at))?;
    }
    Ok(reports.len())
}

pub(crate) fn print_summary(reports: &[StudentReport]) {
    println!(
        "{:<12} {:<20} {:>8} {:>5} {:>8} {:>12} {:>8}",
        "student_id", "student_name", "gpp", "gpa", "credits", "extrapolated", "pool"
    );
    for report in reports {
        let row = report.summary();
        println!(
            "{:<12} {:<20} {:>8} {:>5} {:>8} {:>12} {:>8}",
            row.student_id,
            row.student_name,
            fixed(row.gpp, 1),
            fixed(row.gpa, 2),
            fixed(row.total_credits, 1),
            fixed(row.extrapolate_gpp, 2),
            fixed(row.credits_in_pool, 1),
        );
    }

    let flagged = reports
        .iter()
        .filter(|report| !report.diagnostics.is_empty())
        .count();
    if flagged > 0 {
        println!("\n{flagged} student(s) have diagnostics; see their audit logs");
    }
}

pub(crate) fn print_json(reports: &[StudentReport]) -> io::Result<()> {
    let body = serde_json::to_string_pretty(&report_views(reports)).map_err(io::Error::from)?;
    println!("{body}");
    Ok(())
}

fn report_views(reports: &[StudentReport]) -> Vec<ReportView<'_>> {
    reports
        .iter()
        .map(|report| ReportView {
            summary: report.summary(),
            categories: report.allocation.totals().collect(),
            diagnostics: &report.diagnostics,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gpp_engine::{Catalog, GradeCalculator, GradeEntry, LectureRecord, Roster, RuleBook};
    use rust_decimal::Decimal;

    fn reports() -> Vec<StudentReport> {
        let catalog = Catalog::load(vec![LectureRecord::new(
            "M101",
            "Calculus",
            "Major-Core",
            Decimal::from(2),
        )])
        .expect("catalog loads");
        let rules = RuleBook::from_toml_str(
            "[params]\nextrapolate_target_credits = 4\n[[categories]]\nname = \"Major\"\ncategory = [\"Major-.*\"]\nmax_credits = 4\n",
        )
        .expect("rule book parses")
        .compile()
        .expect("rule book compiles");

        let mut roster = Roster::new();
        roster.push("Aki", GradeEntry::new("s1", "M101", "A"));
        GradeCalculator::new(catalog, rules)
            .run(&roster)
            .expect("batch runs")
    }

    #[test]
    fn audit_file_starts_with_timestamp_and_student() {
        let generated_at = Local
            .with_ymd_and_hms(2026, 4, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp");
        let reports = reports();

        let contents = audit_file_contents(&reports[0], generated_at);

        assert!(contents.starts_with("Generated: 2026-04-01 09:30:00\nStudent: s1 Aki\n"));
        assert!(contents.contains("======== [Major] ========"));
    }

    #[test]
    fn json_view_lists_categories_and_overflow_pool() {
        let reports = reports();
        let value = serde_json::to_value(report_views(&reports)).expect("serializes");

        let first = &value[0];
        assert_eq!(first["student_id"], "s1");
        let names: Vec<_> = first["categories"]
            .as_array()
            .expect("categories array")
            .iter()
            .map(|total| total["name"].as_str().expect("name"))
            .collect();
        assert_eq!(names, ["Major", "Overflow_pool"]);
    }
}
