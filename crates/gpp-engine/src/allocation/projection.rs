use rust_decimal::Decimal;

/// Projects the final score assuming the remaining credits are earned at the current GPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreProjector {
    target_credits: i64,
}

impl ScoreProjector {
    pub fn new(target_credits: i64) -> Self {
        Self { target_credits }
    }

    pub fn target_credits(&self) -> i64 {
        self.target_credits
    }

    pub fn extrapolate(&self, total_score: Decimal, total_credits: Decimal, gpa: Decimal) -> Decimal {
        extrapolate(total_score, total_credits, gpa, self.target_credits)
    }
}

pub fn extrapolate(
    total_score: Decimal,
    total_credits: Decimal,
    gpa: Decimal,
    target_credits: i64,
) -> Decimal {
    let target = Decimal::from(target_credits);
    if total_credits >= target {
        total_score
    } else {
        total_score + gpa * (target - total_credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reached_target_keeps_score() {
        let projector = ScoreProjector::new(124);
        let score = Decimal::new(3805, 1);
        assert_eq!(projector.extrapolate(score, Decimal::from(124), Decimal::new(307, 2)), score);
        assert_eq!(projector.extrapolate(score, Decimal::from(130), Decimal::new(307, 2)), score);
    }

    #[test]
    fn missing_credits_earn_current_gpa() {
        let projected = extrapolate(Decimal::from(300), Decimal::new(1005, 1), Decimal::new(280, 2), 124);
        // 300 + 2.80 × 23.5
        assert_eq!(projected, Decimal::new(36580, 2));
    }

    #[test]
    fn zero_gpa_projects_no_gain() {
        assert_eq!(extrapolate(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, 124), Decimal::ZERO);
    }
}
