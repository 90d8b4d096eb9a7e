//! CSV adapters for the lecture catalog and the grade roster.

mod normalizer;
mod parser;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogError, LectureRecord};
use crate::config::{CompiledRules, LectureColumns};
use crate::records::GradeEntry;
use crate::roster::Roster;
use normalizer::is_missing;
use parser::{parse_table, Table};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unable to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("column '{column}' is missing from the {table} table")]
    MissingColumn { table: &'static str, column: String },
    #[error("lecture {lecture_key} has an invalid credit value '{value}'")]
    InvalidCredit { lecture_key: String, value: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ImportError {
    /// Problems in the input tables that invalidate the whole run.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ImportError::MissingColumn { .. }
                | ImportError::InvalidCredit { .. }
                | ImportError::Catalog(_)
        )
    }
}

/// Reads the lecture catalog. Every column is kept as a raw attribute.
pub fn read_catalog<R: Read>(reader: R, columns: &LectureColumns) -> Result<Catalog, ImportError> {
    let table = parse_table("lectures", reader)?;
    let key = table.column(&columns.key)?;
    let name = table.column(&columns.name)?;
    let category = table.column(&columns.category)?;
    let credit = table.column(&columns.credit)?;

    let mut records = Vec::with_capacity(table.rows().len());
    for row in table.rows() {
        let lecture_key = Table::cell(row, key);
        if is_missing(&lecture_key) {
            debug!("skipping catalog row without a lecture key");
            continue;
        }

        let raw_credit = Table::cell(row, credit);
        let credit = Decimal::from_str(&raw_credit)
            .ok()
            .filter(|value| *value >= Decimal::ZERO)
            .ok_or_else(|| ImportError::InvalidCredit {
                lecture_key: lecture_key.clone(),
                value: raw_credit.clone(),
            })?;

        let mut category = Table::cell(row, category);
        if is_missing(&category) {
            category.clear();
        }

        let mut record = LectureRecord::new(lecture_key, Table::cell(row, name), category, credit);
        for (position, header) in table.headers().iter().enumerate() {
            record = record.with_attribute(header.clone(), Table::cell(row, position));
        }
        records.push(record);
    }

    let catalog = Catalog::load(records)?;
    info!(lectures = catalog.len(), "catalog loaded");
    Ok(catalog)
}

pub fn read_catalog_path(
    path: impl AsRef<Path>,
    columns: &LectureColumns,
) -> Result<Catalog, ImportError> {
    read_catalog(open(path.as_ref())?, columns)
}

/// Reads the grade roster. With `year_filter` set and a retake column mapped,
/// rows flagged `1` (overwritten by a later retake) are dropped.
pub fn read_roster<R: Read>(reader: R, rules: &CompiledRules) -> Result<Roster, ImportError> {
    let columns = &rules.students;
    let table = parse_table("students", reader)?;
    let student = table.column(&columns.key)?;
    let name = table.column(&columns.name)?;
    let grade = table.column(&columns.grade)?;
    let lecture = table.column(rules.roster_lecture_key())?;
    let retake = match (&columns.retake, rules.year_filter) {
        (Some(column), true) => Some(table.column(column)?),
        _ => None,
    };

    let mut roster = Roster::new();
    let mut dropped = 0usize;
    for row in table.rows() {
        if let Some(position) = retake {
            if is_overwritten(&Table::cell(row, position)) {
                dropped += 1;
                continue;
            }
        }

        let student_id = Table::cell(row, student);
        if is_missing(&student_id) {
            debug!("skipping roster row without a student id");
            continue;
        }

        roster.push(
            Table::cell(row, name),
            GradeEntry::new(student_id, Table::cell(row, lecture), Table::cell(row, grade)),
        );
    }

    info!(
        students = roster.students().len(),
        rows = roster.len(),
        dropped_retakes = dropped,
        "roster loaded"
    );
    Ok(roster)
}

pub fn read_roster_path(
    path: impl AsRef<Path>,
    rules: &CompiledRules,
) -> Result<Roster, ImportError> {
    read_roster(open(path.as_ref())?, rules)
}

fn open(path: &Path) -> Result<File, ImportError> {
    File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_overwritten(value: &str) -> bool {
    Decimal::from_str(value).map_or(false, |flag| flag == Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleBook;
    use crate::roster::StudentId;

    const LECTURES: &str = "\
lecture_code,lecture_name,category,credits,year
M101,Calculus,Major-Core,2,1
L201,Ethics,,1.5,2
X300,Seminar,nan,1,3
";

    fn rules(extra: &str) -> CompiledRules {
        let toml = format!(
            "[params]\nextrapolate_target_credits = 124\n{extra}\n[[categories]]\nname = \"Major\"\ncategory = [\"Major-.*\"]\nmax_credits = 10\n"
        );
        RuleBook::from_toml_str(&toml)
            .expect("rule book parses")
            .compile()
            .expect("rule book compiles")
    }

    #[test]
    fn catalog_keeps_every_column() {
        let catalog = read_catalog(LECTURES.as_bytes(), &LectureColumns::default())
            .expect("catalog loads");

        assert_eq!(catalog.len(), 3);
        let ethics = catalog.get("L201").expect("ethics present");
        assert_eq!(ethics.credit, Decimal::new(15, 1));
        assert_eq!(ethics.category, "");
        assert_eq!(catalog.get("X300").expect("seminar").category, "");
        assert_eq!(catalog.categories_of("year"), ["1", "2", "3"]);
        assert_eq!(catalog.categories_of("category"), ["Major-Core"]);
    }

    #[test]
    fn catalog_rejects_duplicates_and_bad_credit() {
        let duplicated = "lecture_code,lecture_name,category,credits\nA,a,x,1\nA,b,x,1\n";
        let err = read_catalog(duplicated.as_bytes(), &LectureColumns::default())
            .expect_err("duplicates are fatal");
        assert!(err.is_configuration());
        assert!(matches!(err, ImportError::Catalog(CatalogError::DuplicateKey { .. })));

        let bad_credit = "lecture_code,lecture_name,category,credits\nA,a,x,two\n";
        match read_catalog(bad_credit.as_bytes(), &LectureColumns::default()) {
            Err(ImportError::InvalidCredit { lecture_key, value }) => {
                assert_eq!(lecture_key, "A");
                assert_eq!(value, "two");
            }
            other => panic!("expected invalid credit, got {other:?}"),
        }
    }

    #[test]
    fn roster_uses_catalog_key_column_by_default() {
        let data = "student_id,student_name,lecture_code,grade\ns1,Aki,M101,A\ns2,Ren,M101,S\ns1,Aki,L201,B\n";
        let roster = read_roster(data.as_bytes(), &rules("")).expect("roster loads");

        assert_eq!(roster.students().len(), 2);
        assert_eq!(roster.len(), 3);
        assert_eq!(
            roster.lecture_keys_for(&StudentId("s1".to_string())),
            ["M101", "L201"]
        );
    }

    #[test]
    fn retake_rows_are_dropped_only_with_year_filter() {
        let data = "student_id,student_name,lecture_code,grade,retake\ns1,Aki,M101,F,1\ns1,Aki,M101,A,0\n";
        let mapping = "year_filter = true\n[columns_in_students]\nkey = \"student_id\"\nname = \"student_name\"\ngrade = \"grade\"\nretake = \"retake\"\n";

        let filtered = read_roster(data.as_bytes(), &rules(mapping)).expect("roster loads");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.entries()[0].grade, "A");

        let unfiltered_mapping = mapping.replace("year_filter = true", "year_filter = false");
        let unfiltered =
            read_roster(data.as_bytes(), &rules(&unfiltered_mapping)).expect("roster loads");
        assert_eq!(unfiltered.len(), 2);
    }

    #[test]
    fn missing_roster_column_is_a_configuration_error() {
        let data = "student_id,student_name,grade\ns1,Aki,A\n";
        let err = read_roster(data.as_bytes(), &rules("")).expect_err("lecture column missing");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("lecture_code"));
    }
}
