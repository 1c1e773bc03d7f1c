mod breakeven;
mod compare;
mod cost;
mod fee;
mod loan;
mod memo;
mod presets;
mod solver;
mod types;

pub use breakeven::{classify_profit, contribution_per_patient, run_breakeven};
pub use compare::{
    Delta, Direction, delta, describe_month, describe_patients, format_man_won,
    format_percent_delta, format_won, method_interest_delta,
};
pub use cost::aggregate_costs;
pub use fee::{FeeBound, FeeResult, FeeSchedule, FeeTier, MAX_FEE, MIN_FEE, calculate_fee};
pub use loan::{annuity, compare_methods, equal_principal, repayment_schedule};
pub use memo::LastInputCache;
pub use presets::{IndustryBenchmark, Specialty, SpecialtyPreset};
pub use solver::{PatientGoalConfig, PatientGoalIteration, PatientGoalResult, solve_daily_patients};
pub use types::{
    AnnuityResult, BREAKEVEN_BAND, BreakEvenInputs, BreakEvenResult, CostBreakdown, CostCategory,
    CostShare, EqualPrincipalResult, FixedCostSet, Installment, LoanComparison, LoanInput,
    MonthPoint, ProfitStatus, RampUpSchedule, Reach, RepaymentMethod, RevenueAssumption,
    SIMULATION_HORIZON_MONTHS,
};
