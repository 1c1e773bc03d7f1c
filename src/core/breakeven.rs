use super::cost::aggregate_costs;
use super::types::{
    BREAKEVEN_BAND, BreakEvenInputs, BreakEvenResult, CostCategory, MonthPoint, ProfitStatus,
    RampUpSchedule, Reach, RevenueAssumption, SIMULATION_HORIZON_MONTHS,
};

#[derive(Debug, Clone, Copy)]
struct MonthlyFigures {
    fixed: f64,
    revenue: f64,
    variable: f64,
}

impl MonthlyFigures {
    fn total_cost(self) -> f64 {
        self.fixed + self.variable
    }

    fn profit(self) -> f64 {
        self.revenue - self.total_cost()
    }
}

pub fn run_breakeven(inputs: &BreakEvenInputs) -> BreakEvenResult {
    let revenue = &inputs.revenue;
    let figures = monthly_figures(inputs.fixed_costs.total(), revenue);
    let contribution = contribution_per_patient(revenue);
    let degenerate = contribution * revenue.working_days_per_month as f64 <= 0.0;

    let bep_daily_patients = if degenerate {
        Reach::Unbounded
    } else {
        breakeven_daily_patients(figures.fixed, contribution, revenue.working_days_per_month)
    };

    let months = simulate_months(figures, revenue.variable_ratio(), &inputs.ramp_up);
    let bep_month = if degenerate {
        Reach::Unbounded
    } else {
        first_breakeven_month(&months)
    };

    let cost_split = aggregate_costs(&[
        CostCategory::new("fixed", figures.fixed),
        CostCategory::new("variable", figures.variable),
    ]);

    BreakEvenResult {
        monthly_fixed: figures.fixed,
        monthly_revenue: figures.revenue,
        monthly_variable: figures.variable,
        monthly_total_cost: figures.total_cost(),
        monthly_profit: figures.profit(),
        contribution_per_patient: contribution,
        bep_daily_patients,
        bep_month,
        status: classify_profit(figures.profit()),
        cost_split,
        months,
    }
}

fn monthly_figures(monthly_fixed: f64, revenue: &RevenueAssumption) -> MonthlyFigures {
    let monthly_revenue = revenue.avg_revenue_per_patient
        * revenue.daily_patients as f64
        * revenue.working_days_per_month as f64;
    MonthlyFigures {
        fixed: monthly_fixed,
        revenue: monthly_revenue,
        variable: (monthly_revenue * revenue.variable_ratio()).round(),
    }
}

pub fn contribution_per_patient(revenue: &RevenueAssumption) -> f64 {
    revenue.avg_revenue_per_patient * (1.0 - revenue.variable_ratio())
}

fn breakeven_daily_patients(monthly_fixed: f64, contribution: f64, working_days: u32) -> Reach<u32> {
    let patients = (monthly_fixed / (contribution * working_days as f64)).ceil();
    if !patients.is_finite() {
        return Reach::Unbounded;
    }
    // `as` saturates; negative fixed costs mean no patients are needed.
    Reach::Reachable(patients.max(0.0) as u32)
}

/// Month-by-month ramp-up trace over the simulation horizon.
///
/// Unlike the headline figures, per-month variable cost is not rounded.
fn simulate_months(
    figures: MonthlyFigures,
    variable_ratio: f64,
    ramp_up: &RampUpSchedule,
) -> Vec<MonthPoint> {
    let mut cumulative = 0.0;
    (0..SIMULATION_HORIZON_MONTHS as usize)
        .map(|m| {
            let ramp = ramp_up.multiplier(m);
            let revenue = figures.revenue * ramp;
            let variable_cost = revenue * variable_ratio;
            let profit = revenue - figures.fixed - variable_cost;
            cumulative += profit;
            MonthPoint {
                month: m as u32 + 1,
                ramp,
                revenue,
                variable_cost,
                profit,
                cumulative_profit: cumulative,
            }
        })
        .collect()
}

/// First month whose cumulative profit has recovered and whose own profit is positive.
fn first_breakeven_month(months: &[MonthPoint]) -> Reach<u32> {
    months
        .iter()
        .find(|p| p.cumulative_profit >= 0.0 && p.profit > 0.0)
        .map_or(Reach::NotReachedWithinHorizon, |p| Reach::Reachable(p.month))
}

pub fn classify_profit(monthly_profit: f64) -> ProfitStatus {
    if monthly_profit < -BREAKEVEN_BAND {
        ProfitStatus::Loss
    } else if monthly_profit > BREAKEVEN_BAND {
        ProfitStatus::Profit
    } else {
        ProfitStatus::Breakeven
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FixedCostSet;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    // rent 800 + labor 1000 + loan 200 + maintenance 80 + insurance 50 = 2130
    fn sample_inputs() -> BreakEvenInputs {
        BreakEvenInputs {
            fixed_costs: FixedCostSet {
                rent: 800.0,
                labor: 1_000.0,
                loan_interest: 200.0,
                maintenance: 80.0,
                insurance: 50.0,
            },
            revenue: RevenueAssumption {
                avg_revenue_per_patient: 4.5,
                daily_patients: 30,
                working_days_per_month: 22,
                variable_cost_ratio_percent: 25.0,
            },
            ramp_up: RampUpSchedule::default(),
        }
    }

    #[test]
    fn headline_figures_match_reference_scenario() {
        let result = run_breakeven(&sample_inputs());

        assert_approx(result.monthly_fixed, 2_130.0);
        assert_approx(result.monthly_revenue, 2_970.0);
        assert_approx(result.monthly_variable, 743.0);
        assert_approx(result.monthly_total_cost, 2_873.0);
        assert_approx(result.monthly_profit, 97.0);
        assert_approx(result.contribution_per_patient, 3.375);
        assert_eq!(result.bep_daily_patients, Reach::Reachable(29));
        assert_eq!(result.status, ProfitStatus::Breakeven);
    }

    #[test]
    fn slow_ramp_up_is_not_reached_within_three_years() {
        let result = run_breakeven(&sample_inputs());

        assert_eq!(result.months.len(), SIMULATION_HORIZON_MONTHS as usize);
        assert_eq!(result.bep_month, Reach::NotReachedWithinHorizon);
        let last = result.months.last().expect("horizon is non-empty");
        assert!(last.cumulative_profit < 0.0);
        assert!(last.profit > 0.0);
    }

    #[test]
    fn higher_volume_breaks_even_in_sixth_month() {
        let mut inputs = sample_inputs();
        inputs.revenue.daily_patients = 40;
        let result = run_breakeven(&inputs);

        assert_eq!(result.bep_month, Reach::Reachable(6));
        let month_five = result.months[4];
        assert!(month_five.cumulative_profit < 0.0);
        assert!(result.months[5].cumulative_profit >= 0.0);
        assert_eq!(result.status, ProfitStatus::Profit);
    }

    #[test]
    fn ramp_multiplier_defaults_to_full_after_schedule() {
        let result = run_breakeven(&sample_inputs());
        assert_approx(result.months[0].ramp, 0.40);
        assert_approx(result.months[4].ramp, 0.90);
        assert_approx(result.months[5].ramp, 1.0);
        assert_approx(result.months[35].ramp, 1.0);
        assert_approx(result.months[5].revenue, 2_970.0);
    }

    #[test]
    fn cleared_losses_with_zero_month_profit_do_not_count() {
        let mut inputs = sample_inputs();
        inputs.fixed_costs = FixedCostSet {
            rent: 0.0,
            labor: 0.0,
            loan_interest: 0.0,
            maintenance: 0.0,
            insurance: 0.0,
        };
        inputs.revenue.daily_patients = 0;
        let result = run_breakeven(&inputs);

        assert!(result.months.iter().all(|m| m.cumulative_profit >= 0.0));
        assert_eq!(result.bep_month, Reach::NotReachedWithinHorizon);
        assert_eq!(result.bep_daily_patients, Reach::Reachable(0));
    }

    #[test]
    fn full_variable_ratio_is_unbounded() {
        let mut inputs = sample_inputs();
        inputs.revenue.variable_cost_ratio_percent = 100.0;
        let result = run_breakeven(&inputs);

        assert_eq!(result.bep_daily_patients, Reach::Unbounded);
        assert_eq!(result.bep_month, Reach::Unbounded);
        assert_eq!(result.months.len(), SIMULATION_HORIZON_MONTHS as usize);
    }

    #[test]
    fn zero_working_days_is_unbounded() {
        let mut inputs = sample_inputs();
        inputs.revenue.working_days_per_month = 0;
        let result = run_breakeven(&inputs);
        assert_eq!(result.bep_daily_patients, Reach::Unbounded);
        assert_eq!(result.status, ProfitStatus::Loss);
    }

    #[test]
    fn status_band_is_not_a_sign_test() {
        assert_eq!(classify_profit(-100.5), ProfitStatus::Loss);
        assert_eq!(classify_profit(-100.0), ProfitStatus::Breakeven);
        assert_eq!(classify_profit(-1.0), ProfitStatus::Breakeven);
        assert_eq!(classify_profit(100.0), ProfitStatus::Breakeven);
        assert_eq!(classify_profit(100.5), ProfitStatus::Profit);
    }

    #[test]
    fn cost_split_reports_fixed_and_variable_shares() {
        let result = run_breakeven(&sample_inputs());
        assert_approx(result.cost_split.total, 2_873.0);
        assert_eq!(result.cost_split.items[0].label, "fixed");
        assert_eq!(result.cost_split.items[0].percentage, 74);
        assert_eq!(result.cost_split.items[1].percentage, 26);
    }

    #[test]
    fn empty_schedule_runs_at_full_utilization() {
        let mut inputs = sample_inputs();
        inputs.revenue.daily_patients = 40;
        inputs.ramp_up = RampUpSchedule(Vec::new());
        let result = run_breakeven(&inputs);
        assert_eq!(result.bep_month, Reach::Reachable(1));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_ratio_at_or_above_hundred_is_never_finite(
            ratio in 100u32..400,
            daily in 0u32..150,
            days in 0u32..31,
            avg_tenths in 1u32..400,
        ) {
            let mut inputs = sample_inputs();
            inputs.revenue.variable_cost_ratio_percent = ratio as f64;
            inputs.revenue.daily_patients = daily;
            inputs.revenue.working_days_per_month = days;
            inputs.revenue.avg_revenue_per_patient = avg_tenths as f64 / 10.0;

            let result = run_breakeven(&inputs);
            prop_assert_eq!(result.bep_daily_patients, Reach::Unbounded);
            prop_assert!(result.bep_daily_patients.value().is_none());
        }

        #[test]
        fn prop_repeated_runs_are_identical(
            rent in 100u32..2_000,
            labor in 200u32..5_000,
            ratio in 5u32..80,
            daily in 5u32..100,
            days in 15u32..28,
        ) {
            let mut inputs = sample_inputs();
            inputs.fixed_costs.rent = rent as f64;
            inputs.fixed_costs.labor = labor as f64;
            inputs.revenue.variable_cost_ratio_percent = ratio as f64;
            inputs.revenue.daily_patients = daily;
            inputs.revenue.working_days_per_month = days;

            let a = run_breakeven(&inputs);
            let b = run_breakeven(&inputs);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_reported_month_satisfies_both_conditions(
            daily in 5u32..100,
            ratio in 5u32..80,
        ) {
            let mut inputs = sample_inputs();
            inputs.revenue.daily_patients = daily;
            inputs.revenue.variable_cost_ratio_percent = ratio as f64;

            let result = run_breakeven(&inputs);
            if let Reach::Reachable(month) = result.bep_month {
                let idx = month as usize - 1;
                let point = result.months[idx];
                prop_assert!(point.cumulative_profit >= 0.0);
                prop_assert!(point.profit > 0.0);
                for earlier in &result.months[..idx] {
                    prop_assert!(earlier.cumulative_profit < 0.0 || earlier.profit <= 0.0);
                }
            }
        }
    }
}
