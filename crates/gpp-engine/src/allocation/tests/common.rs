use rust_decimal::Decimal;

use crate::config::{CompiledRules, RuleBook};
use crate::records::EvaluatedRecord;

pub(super) fn credit(value: i64) -> Decimal {
    Decimal::from(value)
}

pub(super) fn record(key: &str, category: &str, credits: i64, grade_point: i64) -> EvaluatedRecord {
    EvaluatedRecord::new(key, key, category, credit(credits), credit(grade_point))
}

pub(super) fn keys(records: &[EvaluatedRecord]) -> Vec<&str> {
    records.iter().map(|record| record.key.as_str()).collect()
}

pub(super) fn rules(toml: &str) -> CompiledRules {
    RuleBook::from_toml_str(toml)
        .expect("rule book parses")
        .compile()
        .expect("rule book compiles")
}

/// Major (cap 8, Major-Core is home) and Free (cap 6) with a Free pool fed by Major overflow.
pub(super) const MAJOR_AND_FREE: &str = r#"
[params]
extrapolate_target_credits = 124

[[categories]]
name = "Major"
category = ["Major-.*"]
max_credits = 8
my_courses = ["Major-Core"]

[[categories]]
name = "Free"
category = ["Free"]
max_credits = 6

[[secondary_categories]]
name = "Free"
max_credits = 4
category = ["Major-.*"]
"#;
