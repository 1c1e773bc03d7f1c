use serde::Serialize;

pub const BASIS_POINTS: u64 = 10_000;
pub const MIN_FEE: u64 = 1_000_000;
pub const MAX_FEE: u64 = 30_000_000;

/// Which limit, if any, replaced the raw percentage fee.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeBound {
    Min,
    Max,
    Unclamped,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTier {
    /// Inclusive upper bound of the base amount; `None` for the open-ended top tier.
    pub up_to: Option<u64>,
    pub rate_bp: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    pub tiers: Vec<FeeTier>,
    pub min_fee: u64,
    pub max_fee: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![
                FeeTier {
                    up_to: Some(100_000_000),
                    rate_bp: 300,
                },
                FeeTier {
                    up_to: Some(500_000_000),
                    rate_bp: 200,
                },
                FeeTier {
                    up_to: None,
                    rate_bp: 150,
                },
            ],
            min_fee: MIN_FEE,
            max_fee: MAX_FEE,
        }
    }
}

impl FeeSchedule {
    /// Rate of the first tier containing `base_amount`; 0 when no tier does.
    pub fn rate_for(&self, base_amount: u64) -> u32 {
        self.tiers
            .iter()
            .find(|tier| tier.up_to.is_none_or(|limit| base_amount <= limit))
            .map_or(0, |tier| tier.rate_bp)
    }

    pub fn calculate(&self, base_amount: u64) -> FeeResult {
        calculate_fee(
            base_amount,
            self.rate_for(base_amount),
            self.min_fee,
            self.max_fee,
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeResult {
    pub base_amount: u64,
    pub rate_bp: u32,
    pub raw_fee: u64,
    pub fee: u64,
    pub bound: FeeBound,
}

/// `round(base × rate)` limited to `[min_fee, max_fee]`, recording the limit hit.
pub fn calculate_fee(base_amount: u64, rate_bp: u32, min_fee: u64, max_fee: u64) -> FeeResult {
    let raw_fee = percentage_of(base_amount, rate_bp);
    let (fee, bound) = if raw_fee < min_fee {
        (min_fee, FeeBound::Min)
    } else if raw_fee > max_fee {
        (max_fee, FeeBound::Max)
    } else {
        (raw_fee, FeeBound::Unclamped)
    };

    FeeResult {
        base_amount,
        rate_bp,
        raw_fee,
        fee,
        bound,
    }
}

fn percentage_of(amount: u64, rate_bp: u32) -> u64 {
    let scaled = amount as u128 * rate_bp as u128 + (BASIS_POINTS as u128 / 2);
    u64::try_from(scaled / BASIS_POINTS as u128).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};

    #[test]
    fn two_percent_of_quarter_billion_is_unclamped() {
        let result = calculate_fee(250_000_000, 200, MIN_FEE, MAX_FEE);
        assert_eq!(result.raw_fee, 5_000_000);
        assert_eq!(result.fee, 5_000_000);
        assert_eq!(result.bound, FeeBound::Unclamped);
    }

    #[test]
    fn small_base_is_raised_to_floor() {
        let result = calculate_fee(10_000_000, 200, MIN_FEE, MAX_FEE);
        assert_eq!(result.raw_fee, 200_000);
        assert_eq!(result.fee, MIN_FEE);
        assert_eq!(result.bound, FeeBound::Min);
    }

    #[test]
    fn large_base_is_capped() {
        let result = calculate_fee(3_000_000_000, 150, MIN_FEE, MAX_FEE);
        assert_eq!(result.raw_fee, 45_000_000);
        assert_eq!(result.fee, MAX_FEE);
        assert_eq!(result.bound, FeeBound::Max);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(percentage_of(25, 200), 1);
        assert_eq!(percentage_of(24, 200), 0);
    }

    #[test]
    fn exact_bounds_are_not_reported_as_clamped() {
        let at_floor = calculate_fee(50_000_000, 200, MIN_FEE, MAX_FEE);
        assert_eq!(at_floor.fee, MIN_FEE);
        assert_eq!(at_floor.bound, FeeBound::Unclamped);

        let at_cap = calculate_fee(1_500_000_000, 200, MIN_FEE, MAX_FEE);
        assert_eq!(at_cap.fee, MAX_FEE);
        assert_eq!(at_cap.bound, FeeBound::Unclamped);
    }

    #[test]
    fn default_schedule_picks_tier_by_amount() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.rate_for(100_000_000), 300);
        assert_eq!(schedule.rate_for(100_000_001), 200);
        assert_eq!(schedule.rate_for(250_000_000), 200);
        assert_eq!(schedule.rate_for(900_000_000), 150);

        let result = schedule.calculate(250_000_000);
        assert_eq!(result.fee, 5_000_000);
        assert_eq!(result.rate_bp, 200);
    }

    #[test]
    fn empty_schedule_charges_floor() {
        let schedule = FeeSchedule {
            tiers: Vec::new(),
            ..FeeSchedule::default()
        };
        let result = schedule.calculate(250_000_000);
        assert_eq!(result.rate_bp, 0);
        assert_eq!(result.bound, FeeBound::Min);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_fee_always_within_bounds(base in any::<u64>(), rate_bp in 0u32..10_000) {
            let result = calculate_fee(base, rate_bp, MIN_FEE, MAX_FEE);
            prop_assert!(result.fee >= MIN_FEE && result.fee <= MAX_FEE);
            match result.bound {
                FeeBound::Min => prop_assert!(result.raw_fee < MIN_FEE),
                FeeBound::Max => prop_assert!(result.raw_fee > MAX_FEE),
                FeeBound::Unclamped => prop_assert_eq!(result.fee, result.raw_fee),
            }
        }
    }
}
