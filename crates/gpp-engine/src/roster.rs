use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::records::GradeEntry;

/// Identifier wrapper for students in the grade roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
}

/// Every graded row of a run, with students listed in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: Vec<Student>,
    entries: Vec<GradeEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row; the first name seen for a student id is kept.
    pub fn push(&mut self, student_name: impl Into<String>, entry: GradeEntry) {
        if !self
            .students
            .iter()
            .any(|student| student.id == entry.student_id)
        {
            self.students.push(Student {
                id: entry.student_id.clone(),
                name: student_name.into(),
            });
        }
        self.entries.push(entry);
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|student| &student.id == id)
    }

    pub fn entries(&self) -> &[GradeEntry] {
        &self.entries
    }

    pub fn entries_for(&self, id: &StudentId) -> Vec<GradeEntry> {
        self.entries
            .iter()
            .filter(|entry| &entry.student_id == id)
            .cloned()
            .collect()
    }

    /// Distinct lecture keys graded for a student.
    pub fn lecture_keys_for(&self, id: &StudentId) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|entry| &entry.student_id == id)
            .map(|entry| entry.lecture_key.as_str())
            .filter(|key| seen.insert(*key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
