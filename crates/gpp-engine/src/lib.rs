//! Degree-audit engine: joins graded course records against a lecture catalog,
//! allocates them into capped requirement categories, balances surplus and
//! shortage through secondary credit pools and derives grade-point totals.

pub mod allocation;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod records;
pub mod roster;
pub mod telemetry;

pub use allocation::{
    Allocation, AllocationEngine, AuditLog, CategorySelector, CategoryTotal, CreditPool,
    PoolError, ScoreProjector, Selection, OVERFLOW_POOL,
};
pub use batch::{GradeCalculator, StudentReport, SummaryRow};
pub use catalog::{Catalog, CatalogError, LectureRecord};
pub use config::{AppConfig, CompiledRules, ConfigError, RuleBook};
pub use error::AppError;
pub use records::{Diagnostic, EvaluatedRecord, GradeEntry, LetterGrade, PatternSet, PersonalRecordSet};
pub use roster::{Roster, Student, StudentId};
