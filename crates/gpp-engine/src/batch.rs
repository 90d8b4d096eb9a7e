use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::allocation::{fixed, Allocation, AllocationEngine, PoolError, ScoreProjector};
use crate::catalog::Catalog;
use crate::config::CompiledRules;
use crate::records::{Diagnostic, GradeEntry, PersonalRecordSet};
use crate::roster::{Roster, Student, StudentId};

/// Runs allocations for a roster against one catalog and one rule set.
#[derive(Debug, Clone)]
pub struct GradeCalculator {
    catalog: Catalog,
    rules: CompiledRules,
}

/// Everything computed for one student.
#[derive(Debug, Clone)]
pub struct StudentReport {
    pub student: Student,
    pub allocation: Allocation,
    pub extrapolated: Decimal,
    pub diagnostics: Vec<Diagnostic>,
}

/// One line of the exported summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub student_id: String,
    pub student_name: String,
    pub gpp: Decimal,
    pub gpa: Decimal,
    pub total_credits: Decimal,
    pub extrapolate_gpp: Decimal,
    pub credits_in_pool: Decimal,
}

impl StudentReport {
    pub fn summary(&self) -> SummaryRow {
        SummaryRow {
            student_id: self.student.id.to_string(),
            student_name: self.student.name.clone(),
            gpp: self.allocation.total_score(),
            gpa: self.allocation.gpa,
            total_credits: self.allocation.total_credits(),
            extrapolate_gpp: self.extrapolated,
            credits_in_pool: self.allocation.overflow_pool.credits,
        }
    }

    pub fn audit_text(&self) -> &str {
        self.allocation.audit.as_str()
    }

    fn record_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.allocation
            .audit
            .diagnostics(std::slice::from_ref(&diagnostic));
        self.diagnostics.push(diagnostic);
    }
}

impl GradeCalculator {
    pub fn new(catalog: Catalog, rules: CompiledRules) -> Self {
        Self { catalog, rules }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    /// Processes every student in first-seen roster order.
    pub fn run(&self, roster: &Roster) -> Result<Vec<StudentReport>, PoolError> {
        let reports = roster
            .students()
            .iter()
            .map(|student| self.evaluate(student, &roster.entries_for(&student.id)))
            .collect::<Result<Vec<_>, _>>()?;
        info!(students = reports.len(), "batch finished");
        Ok(reports)
    }

    /// Processes an explicit list of ids; ids without roster rows yield zero results.
    pub fn run_for(
        &self,
        roster: &Roster,
        ids: &[StudentId],
    ) -> Result<Vec<StudentReport>, PoolError> {
        let mut reports = Vec::with_capacity(ids.len());
        for id in ids {
            let report = match roster.student(id) {
                Some(student) => self.evaluate(student, &roster.entries_for(id))?,
                None => {
                    warn!(student = %id, "student has no grade rows");
                    let absent = Student {
                        id: id.clone(),
                        name: String::new(),
                    };
                    let mut report = self.evaluate(&absent, &[])?;
                    report.record_diagnostic(Diagnostic::MissingStudent {
                        student_id: id.to_string(),
                    });
                    report
                }
            };
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn evaluate(
        &self,
        student: &Student,
        entries: &[GradeEntry],
    ) -> Result<StudentReport, PoolError> {
        info!(student = %student.id, rows = entries.len(), "calculating student");

        let records = PersonalRecordSet::join(&self.catalog, entries);
        let mut diagnostics = records.diagnostics().to_vec();
        diagnostics.extend(records.validate_categories(&self.rules.valid_categories));
        for diagnostic in &diagnostics {
            warn!(student = %student.id, "{diagnostic}");
        }

        let engine = AllocationEngine::new(&self.rules);
        let mut pools = engine.fresh_pools()?;
        let mut allocation = engine.allocate(&records, &mut pools)?;

        let projector = ScoreProjector::new(self.rules.target_credits);
        let extrapolated = projector.extrapolate(
            allocation.total_score(),
            allocation.total_credits(),
            allocation.gpa,
        );
        allocation.audit.line(format!(
            "Extrapolated Points ({} credits): {}",
            projector.target_credits(),
            fixed(extrapolated, 2)
        ));
        allocation.audit.diagnostics(&diagnostics);

        info!(
            student = %student.id,
            gpp = %allocation.total_score(),
            gpa = %allocation.gpa,
            "student finished"
        );

        Ok(StudentReport {
            student: student.clone(),
            allocation,
            extrapolated,
            diagnostics,
        })
    }
}
