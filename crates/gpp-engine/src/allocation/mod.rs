//! Category allocation: capped greedy selection per requirement category,
//! secondary pool balancing and the overflow pool aggregate.

mod audit;
mod pool;
mod projection;
mod selector;

#[cfg(test)]
mod tests;

pub use audit::{fixed, signed, AuditLog};
pub use pool::{CreditPool, PoolError};
pub use projection::{extrapolate, ScoreProjector};
pub use selector::{CategorySelector, Selection};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::CompiledRules;
use crate::records::{mark_home, EvaluatedRecord, PersonalRecordSet};

/// Name of the synthetic category collecting overflowing home records.
pub const OVERFLOW_POOL: &str = "Overflow_pool";

/// Credits and weighted score recorded for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub credits: Decimal,
    pub score: Decimal,
}

/// Allocation of one student's records across all categories.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub categories: Vec<CategoryTotal>,
    pub overflow_pool: CategoryTotal,
    /// Home records rejected by their category, in category order.
    pub pool_records: Vec<EvaluatedRecord>,
    /// Credits granted to short categories by secondary pools.
    pub borrowed_credits: Decimal,
    pub gpa: Decimal,
    pub audit: AuditLog,
}

impl Allocation {
    /// Looks up a category total; `OVERFLOW_POOL` resolves to the overflow aggregate.
    pub fn category(&self, name: &str) -> Option<&CategoryTotal> {
        if name == OVERFLOW_POOL {
            return Some(&self.overflow_pool);
        }
        self.categories.iter().find(|total| total.name == name)
    }

    /// Categories in declaration order followed by the overflow pool.
    pub fn totals(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.categories
            .iter()
            .chain(std::iter::once(&self.overflow_pool))
    }

    pub fn total_score(&self) -> Decimal {
        self.totals().map(|total| total.score).sum()
    }

    /// Credits across primary categories; the overflow pool is not counted.
    pub fn total_credits(&self) -> Decimal {
        self.categories.iter().map(|total| total.credits).sum()
    }
}

/// Runs every category rule over a student's records.
pub struct AllocationEngine<'a> {
    rules: &'a CompiledRules,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(rules: &'a CompiledRules) -> Self {
        Self { rules }
    }

    /// Builds empty pools for one student. Pools must never be shared between students.
    pub fn fresh_pools(&self) -> Result<Vec<CreditPool>, PoolError> {
        self.rules
            .secondary
            .iter()
            .map(CreditPool::from_rule)
            .collect()
    }

    pub fn allocate(
        &self,
        records: &PersonalRecordSet,
        pools: &mut [CreditPool],
    ) -> Result<Allocation, PoolError> {
        let mut audit = AuditLog::new();
        let mut categories = Vec::with_capacity(self.rules.categories.len());
        let mut pool_records = Vec::new();
        let mut borrowed_credits = Decimal::ZERO;

        for rule in &self.rules.categories {
            audit.section(&rule.name);

            let mut candidates = records.select_by_category(&rule.patterns);
            if !rule.home.is_empty() {
                mark_home(&mut candidates, &rule.home);
            }
            let candidate_credits: Decimal = candidates.iter().map(|record| record.credit).sum();

            let selection = CategorySelector::new(rule.cap).select(candidates);
            audit.records(&selection.selected);
            let score = selection.selected_score();
            let mut credits = candidate_credits;

            if credits > rule.cap {
                for pool in pools.iter_mut() {
                    let surplus: Decimal = selection
                        .unselected
                        .iter()
                        .filter(|record| pool.accepts(&record.category))
                        .map(|record| record.credit)
                        .sum();
                    let discarded = pool.deposit(surplus)?;
                    debug!(
                        category = %rule.name,
                        pool = pool.name(),
                        deposited = %(surplus - discarded),
                        %discarded,
                        "surplus credits moved to secondary pool"
                    );
                }
                credits = rule.cap;
            } else if credits < rule.cap {
                let shortage = rule.cap - credits;
                if let Some(pool) = pools.iter_mut().find(|pool| pool.name() == rule.name) {
                    let granted = pool.withdraw(shortage)?;
                    credits += granted;
                    borrowed_credits += granted;
                    audit.line(format!("<From secondary categories: {}>", signed(granted)));
                    debug!(category = %rule.name, %shortage, %granted, "shortage covered from secondary pool");
                }
            }

            audit.line(format!(
                "Points: {}  Credits: {}/{}",
                fixed(score, 1),
                credits.normalize(),
                rule.cap.normalize()
            ));
            if !selection.unselected.is_empty() {
                audit.subsection("Overflow");
                audit.records(&selection.unselected);
            }

            pool_records.extend(
                selection
                    .unselected
                    .into_iter()
                    .filter(|record| record.is_home),
            );
            categories.push(CategoryTotal {
                name: rule.name.clone(),
                credits,
                score,
            });
        }

        // Not clamped: borrowing can exceed what home records contributed.
        let pool_credits: Decimal =
            pool_records.iter().map(|record| record.credit).sum::<Decimal>() - borrowed_credits;
        let pool_score: Decimal = pool_records.iter().map(|record| record.score).sum();

        audit.section("Overflow Pool");
        audit.records(&pool_records);
        if borrowed_credits > Decimal::ZERO {
            audit.line(format!("<To secondary categories: {}>", signed(-borrowed_credits)));
        }
        audit.line(format!(
            "Points: {}  Credits: {}",
            fixed(pool_score, 1),
            pool_credits.normalize()
        ));

        let gpa = records.gpa();
        let mut allocation = Allocation {
            categories,
            overflow_pool: CategoryTotal {
                name: OVERFLOW_POOL.to_string(),
                credits: pool_credits,
                score: pool_score,
            },
            pool_records,
            borrowed_credits,
            gpa,
            audit,
        };

        let total_score = allocation.total_score();
        allocation.audit.line(format!(
            "\nTotal Points: {} (GPA: {})",
            fixed(total_score, 1),
            fixed(gpa, 2)
        ));

        Ok(allocation)
    }
}
