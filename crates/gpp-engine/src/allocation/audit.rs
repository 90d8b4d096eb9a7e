use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::records::{Diagnostic, EvaluatedRecord};

/// Human-readable trail of allocation decisions for one student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLog {
    text: String,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&mut self, title: &str) {
        self.text.push_str(&format!("\n======== [{title}] ========\n"));
    }

    pub fn subsection(&mut self, title: &str) {
        self.text.push_str(&format!("-------- {title} --------\n"));
    }

    pub fn line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    pub fn records(&mut self, records: &[EvaluatedRecord]) {
        if records.is_empty() {
            self.line("(no records)");
            return;
        }

        self.line(format!(
            "{:<14} {:<28} {:<16} {:>7} {:>4} {:>7}",
            "key", "name", "category", "credit", "GP", "point"
        ));
        for record in records {
            self.line(format!(
                "{:<14} {:<28} {:<16} {:>7} {:>4} {:>7}",
                record.key,
                record.name,
                record.category,
                fixed(record.credit, 1),
                fixed(record.grade_point, 1),
                fixed(record.score, 1),
            ));
        }
    }

    pub fn diagnostics(&mut self, diagnostics: &[Diagnostic]) {
        if diagnostics.is_empty() {
            return;
        }
        self.section("Diagnostics");
        for diagnostic in diagnostics {
            self.line(format!("- {diagnostic}"));
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Formats with exactly `places` decimals, rounding half away from zero.
pub fn fixed(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded)
}

/// Formats a signed transfer amount, e.g. `+2` or `-1.5`.
pub fn signed(value: Decimal) -> String {
    let normalized = value.normalize();
    if normalized.is_sign_negative() {
        normalized.to_string()
    } else {
        format!("+{normalized}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_pads_and_rounds() {
        assert_eq!(fixed(Decimal::new(28, 1), 2), "2.80");
        assert_eq!(fixed(Decimal::new(125, 3), 2), "0.13");
        assert_eq!(fixed(Decimal::from(32), 1), "32.0");
    }

    #[test]
    fn signed_marks_direction() {
        assert_eq!(signed(Decimal::new(20, 1)), "+2");
        assert_eq!(signed(Decimal::new(-15, 1)), "-1.5");
    }

    #[test]
    fn records_render_one_line_each() {
        let mut log = AuditLog::new();
        log.section("Major");
        log.records(&[EvaluatedRecord::new(
            "M101",
            "Calculus",
            "Major-Core",
            Decimal::from(2),
            Decimal::from(4),
        )]);

        let text = log.into_string();
        assert!(text.contains("======== [Major] ========"));
        assert!(text.lines().any(|line| line.starts_with("M101") && line.ends_with("8.0")));
    }
}
