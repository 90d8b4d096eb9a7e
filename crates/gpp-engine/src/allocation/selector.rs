use rust_decimal::Decimal;

use crate::records::EvaluatedRecord;

/// Outcome of filling one category: a partition of the candidate credit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub selected: Vec<EvaluatedRecord>,
    /// Records that did not fit, followed by the split remainder if any.
    pub unselected: Vec<EvaluatedRecord>,
}

impl Selection {
    pub fn selected_credits(&self) -> Decimal {
        self.selected.iter().map(|record| record.credit).sum()
    }

    pub fn selected_score(&self) -> Decimal {
        self.selected.iter().map(|record| record.score).sum()
    }

    pub fn unselected_credits(&self) -> Decimal {
        self.unselected.iter().map(|record| record.credit).sum()
    }

    pub fn unselected_score(&self) -> Decimal {
        self.unselected.iter().map(|record| record.score).sum()
    }
}

/// Greedy category filler.
///
/// Candidates must already be in priority order. Records are taken while they
/// fit under the cap; if the cap is still short when the first record that
/// does not fit is reached, that record is taken as well and then split so the
/// category ends exactly at the cap. The part above the cap is returned as an
/// unselected remainder keyed `<key>-sep`.
#[derive(Debug, Clone, Copy)]
pub struct CategorySelector {
    cap: Decimal,
}

impl CategorySelector {
    pub fn new(cap: Decimal) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> Decimal {
        self.cap
    }

    pub fn select(&self, candidates: Vec<EvaluatedRecord>) -> Selection {
        let cap = self.cap;
        let mut selected = Vec::new();
        let mut total = Decimal::ZERO;
        let mut remaining = candidates.into_iter().peekable();

        while let Some(record) = remaining.next_if(|record| total + record.credit <= cap) {
            total += record.credit;
            selected.push(record);
        }

        if total < cap {
            if let Some(boundary) = remaining.next() {
                total += boundary.credit;
                selected.push(boundary);
            }
        }

        let mut unselected: Vec<EvaluatedRecord> = remaining.collect();

        if total > cap {
            let excess = total - cap;
            if let Some(last) = selected.last_mut() {
                unselected.push(last.split_off(excess));
            }
        }

        Selection {
            selected,
            unselected,
        }
    }
}
