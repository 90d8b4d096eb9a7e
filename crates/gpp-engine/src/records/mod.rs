mod grade;
mod pattern;

pub use grade::LetterGrade;
pub use pattern::PatternSet;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::roster::StudentId;

/// Category assigned to graded lectures whose catalog category is blank.
pub const CLOSED_CATEGORY: &str = "Closed";

/// Key suffix of the remainder produced when a record is split at a cap boundary.
pub const SPLIT_SUFFIX: &str = "-sep";

/// One roster row: a student's letter grade for a lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub student_id: StudentId,
    pub lecture_key: String,
    pub grade: String,
}

impl GradeEntry {
    pub fn new(student_id: impl Into<String>, lecture_key: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            student_id: StudentId(student_id.into()),
            lecture_key: lecture_key.into(),
            grade: grade.into(),
        }
    }
}

/// A catalog lecture joined with the grade a student earned in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedRecord {
    pub key: String,
    pub name: String,
    pub category: String,
    pub credit: Decimal,
    pub grade_point: Decimal,
    /// `credit × grade_point`, prorated when the record is split.
    pub score: Decimal,
    pub is_home: bool,
}

impl EvaluatedRecord {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        credit: Decimal,
        grade_point: Decimal,
    ) -> Self {
        let category = category.into();
        let category = if category.trim().is_empty() {
            CLOSED_CATEGORY.to_string()
        } else {
            category
        };

        Self {
            key: key.into(),
            name: name.into(),
            category,
            credit,
            grade_point,
            score: credit * grade_point,
            is_home: false,
        }
    }

    /// Shrinks this record by `excess` credits and returns the excess as a
    /// separate record carrying the matching share of the score.
    pub fn split_off(&mut self, excess: Decimal) -> EvaluatedRecord {
        let moved_score = excess * self.grade_point;
        let mut remainder = self.clone();
        remainder.key = format!("{}{}", self.key, SPLIT_SUFFIX);
        remainder.credit = excess;
        remainder.score = moved_score;

        self.credit -= excess;
        self.score -= moved_score;
        remainder
    }
}

/// Non-fatal anomalies found while preparing a student's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    UnrecognizedGrade { lecture_key: String, grade: String },
    UndefinedLecture { lecture_key: String },
    UnmatchedCategory { lecture_key: String, category: String },
    MissingStudent { student_id: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnrecognizedGrade { lecture_key, grade } => {
                write!(f, "grade '{grade}' for {lecture_key} is not on the grade scale")
            }
            Diagnostic::UndefinedLecture { lecture_key } => {
                write!(f, "lecture {lecture_key} is not defined in the catalog")
            }
            Diagnostic::UnmatchedCategory {
                lecture_key,
                category,
            } => write!(
                f,
                "lecture {lecture_key} has category '{category}' matching no rule"
            ),
            Diagnostic::MissingStudent { student_id } => {
                write!(f, "no grade rows for student {student_id}")
            }
        }
    }
}

/// All graded, catalog-matched records of one student for one calculation run.
#[derive(Debug, Clone, Default)]
pub struct PersonalRecordSet {
    records: Vec<EvaluatedRecord>,
    diagnostics: Vec<Diagnostic>,
}

impl PersonalRecordSet {
    /// Joins grade entries against the catalog. Records come out in catalog
    /// order; entries with an unknown grade or key are reported and skipped.
    pub fn join(catalog: &Catalog, entries: &[GradeEntry]) -> Self {
        let mut diagnostics = Vec::new();
        let mut graded: HashMap<&str, Vec<Decimal>> = HashMap::new();

        for entry in entries {
            let Some(grade) = LetterGrade::parse(&entry.grade) else {
                diagnostics.push(Diagnostic::UnrecognizedGrade {
                    lecture_key: entry.lecture_key.clone(),
                    grade: entry.grade.clone(),
                });
                continue;
            };

            if catalog.get(&entry.lecture_key).is_none() {
                diagnostics.push(Diagnostic::UndefinedLecture {
                    lecture_key: entry.lecture_key.clone(),
                });
                continue;
            }

            graded
                .entry(entry.lecture_key.as_str())
                .or_default()
                .push(grade.grade_point());
        }

        let mut records = Vec::new();
        for lecture in catalog.records() {
            let Some(points) = graded.get(lecture.key.as_str()) else {
                continue;
            };
            for grade_point in points {
                records.push(EvaluatedRecord::new(
                    lecture.key.clone(),
                    lecture.name.clone(),
                    lecture.category.clone(),
                    lecture.credit,
                    *grade_point,
                ));
            }
        }

        Self {
            records,
            diagnostics,
        }
    }

    pub fn from_records(records: Vec<EvaluatedRecord>) -> Self {
        Self {
            records,
            diagnostics: Vec::new(),
        }
    }

    pub fn records(&self) -> &[EvaluatedRecord] {
        &self.records
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_credits(&self) -> Decimal {
        self.records.iter().map(|record| record.credit).sum()
    }

    /// Records whose category fully matches one of `patterns`, in selection priority.
    pub fn select_by_category(&self, patterns: &PatternSet) -> Vec<EvaluatedRecord> {
        let mut selected: Vec<EvaluatedRecord> = self
            .records
            .iter()
            .filter(|record| patterns.is_match(&record.category))
            .cloned()
            .collect();
        selected.sort_by(by_grade_then_credit);
        selected
    }

    /// GPA rounded half-up to two decimals; zero when no credit was earned.
    pub fn gpa(&self) -> Decimal {
        let credits = self.total_credits();
        if credits.is_zero() {
            return Decimal::ZERO;
        }

        let points: Decimal = self
            .records
            .iter()
            .map(|record| record.grade_point * record.credit)
            .sum();
        (points / credits).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn validate_categories(&self, valid: &PatternSet) -> Vec<Diagnostic> {
        self.records
            .iter()
            .filter(|record| !valid.is_match(&record.category))
            .map(|record| Diagnostic::UnmatchedCategory {
                lecture_key: record.key.clone(),
                category: record.category.clone(),
            })
            .collect()
    }
}

/// Flags records belonging to the student's own track and moves them behind
/// the others so they are the first to overflow.
pub fn mark_home(records: &mut [EvaluatedRecord], home: &PatternSet) {
    for record in records.iter_mut() {
        record.is_home = home.is_match(&record.category);
    }
    records.sort_by(|a, b| a.is_home.cmp(&b.is_home).then_with(|| by_grade_then_credit(a, b)));
}

fn by_grade_then_credit(a: &EvaluatedRecord, b: &EvaluatedRecord) -> Ordering {
    b.grade_point
        .cmp(&a.grade_point)
        .then_with(|| a.credit.cmp(&b.credit))
}
