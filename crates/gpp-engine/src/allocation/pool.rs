use rust_decimal::Decimal;

use crate::config::SecondaryPoolRule;
use crate::records::PatternSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("credit amount must be non-negative, got {0}")]
    NegativeAmount(Decimal),
    #[error("pool '{name}' capacity must be non-negative, got {capacity}")]
    InvalidCapacity { name: String, capacity: Decimal },
}

/// Bounded secondary reservoir of credits. Balances never outlive one student.
#[derive(Debug, Clone)]
pub struct CreditPool {
    name: String,
    capacity: Decimal,
    balance: Decimal,
    accepts: PatternSet,
}

impl CreditPool {
    pub fn new(
        name: impl Into<String>,
        capacity: Decimal,
        accepts: PatternSet,
    ) -> Result<Self, PoolError> {
        let name = name.into();
        if capacity < Decimal::ZERO {
            return Err(PoolError::InvalidCapacity { name, capacity });
        }

        Ok(Self {
            name,
            capacity,
            balance: Decimal::ZERO,
            accepts,
        })
    }

    pub fn from_rule(rule: &SecondaryPoolRule) -> Result<Self, PoolError> {
        Self::new(rule.name.clone(), rule.capacity, rule.patterns.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> Decimal {
        self.capacity
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn accepts(&self, category: &str) -> bool {
        self.accepts.is_match(category)
    }

    /// Adds credits up to capacity and returns whatever did not fit.
    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, PoolError> {
        ensure_non_negative(amount)?;

        let headroom = self.capacity - self.balance;
        if amount > headroom {
            self.balance = self.capacity;
            Ok(amount - headroom)
        } else {
            self.balance += amount;
            Ok(Decimal::ZERO)
        }
    }

    /// Takes up to `amount` credits and returns how many were granted.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, PoolError> {
        ensure_non_negative(amount)?;

        let granted = amount.min(self.balance);
        self.balance -= granted;
        Ok(granted)
    }
}

fn ensure_non_negative(amount: Decimal) -> Result<(), PoolError> {
    if amount < Decimal::ZERO {
        Err(PoolError::NegativeAmount(amount))
    } else {
        Ok(())
    }
}
