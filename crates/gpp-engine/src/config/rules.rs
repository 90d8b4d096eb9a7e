//! Rule book loaded from TOML: category caps, secondary pools, column mapping
//! and extrapolation parameters.
//!
//! ```
//! use gpp_engine::config::RuleBook;
//!
//! let book = RuleBook::from_toml_str(r#"
//!     [params]
//!     extrapolate_target_credits = 124
//!
//!     [[categories]]
//!     name = "Major"
//!     category = ["Major.*"]
//!     max_credits = 40
//!     my_courses = ["Major-Core"]
//!
//!     [[secondary_categories]]
//!     name = "Elective"
//!     max_credits = 10
//!     category = ["Major.*"]
//! "#).unwrap();
//!
//! let rules = book.compile().unwrap();
//! assert_eq!(rules.target_credits, 124);
//! assert_eq!(rules.categories.len(), 1);
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::records::PatternSet;

/// Raw rule book as written in `rules.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RuleBook {
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub columns_in_students: StudentColumns,
    #[serde(default)]
    pub columns_in_lectures: LectureColumns,
    #[serde(default)]
    pub categories: Vec<CategorySection>,
    #[serde(default)]
    pub secondary_categories: Vec<SecondarySection>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Params {
    #[serde(default)]
    pub extrapolate_target_credits: Option<NumberLike>,
    /// Drops overwritten retake rows from the roster before calculation.
    #[serde(default)]
    pub year_filter: bool,
}

/// Column names in the grade roster.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudentColumns {
    pub key: String,
    pub name: String,
    pub grade: String,
    /// Defaults to the lecture catalog's key column when omitted.
    #[serde(default)]
    pub lecture_key: Option<String>,
    #[serde(default)]
    pub retake: Option<String>,
}

impl Default for StudentColumns {
    fn default() -> Self {
        Self {
            key: "student_id".to_string(),
            name: "student_name".to_string(),
            grade: "grade".to_string(),
            lecture_key: None,
            retake: None,
        }
    }
}

/// Column names in the lecture catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LectureColumns {
    pub key: String,
    pub name: String,
    pub category: String,
    pub credit: String,
}

impl Default for LectureColumns {
    fn default() -> Self {
        Self {
            key: "lecture_code".to_string(),
            name: "lecture_name".to_string(),
            category: "category".to_string(),
            credit: "credits".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategorySection {
    pub name: String,
    #[serde(default)]
    pub category: Vec<String>,
    pub max_credits: NumberLike,
    #[serde(default)]
    pub my_courses: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecondarySection {
    pub name: String,
    pub max_credits: NumberLike,
    #[serde(default)]
    pub category: Vec<String>,
}

/// Numeric setting that may be written as an integer, a float or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumberLike {
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            NumberLike::Integer(value) => Some(Decimal::from(*value)),
            NumberLike::Float(value) => Decimal::try_from(*value).ok(),
            NumberLike::Text(value) => Decimal::from_str(value.trim()).ok(),
        }
    }

    /// Floats truncate toward zero; strings must spell an integer.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            NumberLike::Integer(value) => Some(*value),
            NumberLike::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            NumberLike::Float(_) => None,
            NumberLike::Text(value) => value.trim().parse::<i64>().ok(),
        }
    }

    fn describe(&self) -> String {
        match self {
            NumberLike::Integer(value) => value.to_string(),
            NumberLike::Float(value) => value.to_string(),
            NumberLike::Text(value) => value.clone(),
        }
    }
}

/// A primary requirement category ready for allocation.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub name: String,
    pub patterns: PatternSet,
    pub cap: Decimal,
    pub home: PatternSet,
}

/// A secondary pool definition; runtime balances live in `CreditPool`.
#[derive(Debug, Clone)]
pub struct SecondaryPoolRule {
    pub name: String,
    pub capacity: Decimal,
    pub patterns: PatternSet,
}

/// Validated rules. Construction fails on every fatal configuration problem.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub categories: Vec<CategoryRule>,
    pub secondary: Vec<SecondaryPoolRule>,
    pub target_credits: i64,
    pub year_filter: bool,
    /// Union of every primary category pattern, used to flag unclassified records.
    pub valid_categories: PatternSet,
    pub students: StudentColumns,
    pub lectures: LectureColumns,
}

impl CompiledRules {
    /// Roster column holding the lecture key.
    pub fn roster_lecture_key(&self) -> &str {
        self.students
            .lecture_key
            .as_deref()
            .unwrap_or(&self.lectures.key)
    }
}

impl RuleBook {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn compile(&self) -> Result<CompiledRules, ConfigError> {
        let target = self
            .params
            .extrapolate_target_credits
            .as_ref()
            .ok_or_else(|| ConfigError::InvalidTarget("nothing".to_string()))?;
        let target_credits = target
            .to_integer()
            .ok_or_else(|| ConfigError::InvalidTarget(format!("'{}'", target.describe())))?;

        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(self.categories.len());
        let mut all_patterns = Vec::new();
        for section in &self.categories {
            if !seen.insert(section.name.as_str()) {
                return Err(ConfigError::DuplicateRule(section.name.clone()));
            }
            let cap = non_negative(&section.max_credits).ok_or_else(|| ConfigError::InvalidCap {
                rule: section.name.clone(),
                value: section.max_credits.describe(),
            })?;
            all_patterns.extend(section.category.iter().cloned());
            categories.push(CategoryRule {
                name: section.name.clone(),
                patterns: compile_patterns(&section.name, &section.category)?,
                cap,
                home: compile_patterns(&section.name, &section.my_courses)?,
            });
        }

        let mut pool_names = HashSet::new();
        let mut secondary = Vec::with_capacity(self.secondary_categories.len());
        for section in &self.secondary_categories {
            if !pool_names.insert(section.name.as_str()) {
                return Err(ConfigError::DuplicateRule(section.name.clone()));
            }
            let capacity =
                non_negative(&section.max_credits).ok_or_else(|| ConfigError::InvalidCapacity {
                    pool: section.name.clone(),
                    value: section.max_credits.describe(),
                })?;
            secondary.push(SecondaryPoolRule {
                name: section.name.clone(),
                capacity,
                patterns: compile_patterns(&section.name, &section.category)?,
            });
        }

        Ok(CompiledRules {
            categories,
            secondary,
            target_credits,
            year_filter: self.params.year_filter,
            valid_categories: compile_patterns("categories", &all_patterns)?,
            students: self.columns_in_students.clone(),
            lectures: self.columns_in_lectures.clone(),
        })
    }
}

fn non_negative(value: &NumberLike) -> Option<Decimal> {
    value.to_decimal().filter(|amount| *amount >= Decimal::ZERO)
}

fn compile_patterns(rule: &str, patterns: &[String]) -> Result<PatternSet, ConfigError> {
    PatternSet::new(patterns).map_err(|source| ConfigError::InvalidPattern {
        rule: rule.to_string(),
        source,
    })
}
