use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::core::{
    BreakEvenInputs, FeeSchedule, FixedCostSet, LoanInput, PatientGoalConfig, RampUpSchedule,
    RepaymentMethod, RevenueAssumption, Specialty,
};
use crate::error::InputError;

pub const MAN_WON: f64 = 10_000.0;

const DEFAULT_AVG_REVENUE: f64 = 4.5;
const DEFAULT_DAILY_PATIENTS: u32 = 30;
const DEFAULT_VARIABLE_RATIO: f64 = 25.0;

/// Longest loan term accepted at the boundary.
pub const MAX_TERM_YEARS: u32 = 50;

/// A value outside the slider range. It is still computed, only flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeWarning {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRepaymentMethod {
    EqualPayment,
    EqualPrincipal,
}

impl From<CliRepaymentMethod> for RepaymentMethod {
    fn from(value: CliRepaymentMethod) -> Self {
        match value {
            CliRepaymentMethod::EqualPayment => RepaymentMethod::EqualPayment,
            CliRepaymentMethod::EqualPrincipal => RepaymentMethod::EqualPrincipal,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiRepaymentMethod {
    #[serde(alias = "equalPayment", alias = "equal_payment", alias = "annuity")]
    EqualPayment,
    #[serde(alias = "equalPrincipal", alias = "equal_principal")]
    EqualPrincipal,
}

impl From<ApiRepaymentMethod> for CliRepaymentMethod {
    fn from(value: ApiRepaymentMethod) -> Self {
        match value {
            ApiRepaymentMethod::EqualPayment => CliRepaymentMethod::EqualPayment,
            ApiRepaymentMethod::EqualPrincipal => CliRepaymentMethod::EqualPrincipal,
        }
    }
}

fn parse_specialty(raw: &str) -> Result<Specialty, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unknown specialty '{raw}'"))
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct BreakEvenArgs {
    #[arg(long, default_value_t = 800.0, help = "Monthly rent (man-won)")]
    pub rent: f64,
    #[arg(long, default_value_t = 1_000.0, help = "Monthly labor cost (man-won)")]
    pub labor: f64,
    #[arg(long, default_value_t = 200.0, help = "Monthly loan interest (man-won)")]
    pub loan_interest: f64,
    #[arg(long, default_value_t = 80.0, help = "Monthly maintenance (man-won)")]
    pub maintenance: f64,
    #[arg(long, default_value_t = 50.0, help = "Monthly insurance (man-won)")]
    pub insurance: f64,
    #[arg(
        long,
        value_parser = parse_specialty,
        help = "Specialty preset for revenue, variable ratio and patient volume"
    )]
    pub specialty: Option<Specialty>,
    #[arg(
        long,
        help = "Average revenue per patient (man-won); defaults to the specialty preset or 4.5"
    )]
    pub avg_revenue_per_patient: Option<f64>,
    #[arg(long, help = "Patients per day; defaults to the specialty preset or 30")]
    pub daily_patients: Option<u32>,
    #[arg(long, default_value_t = 22, help = "Working days per month")]
    pub working_days: u32,
    #[arg(
        long,
        help = "Variable cost ratio in percent; defaults to the specialty preset or 25"
    )]
    pub variable_cost_ratio: Option<f64>,
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [0.40, 0.55, 0.70, 0.80, 0.90],
        help = "Comma-separated utilization multipliers for the first months"
    )]
    pub ramp_up: Vec<f64>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct LoanArgs {
    #[arg(long, default_value_t = 3_000.0, help = "Loan amount (man-won)")]
    pub loan_amount: f64,
    #[arg(long, default_value_t = 4.5, help = "Annual interest rate in percent")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 5, help = "Repayment term in years")]
    pub term_years: u32,
    #[arg(long, value_enum, help = "Include the installment table for this method")]
    pub schedule: Option<CliRepaymentMethod>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct FeeArgs {
    #[arg(long, default_value_t = 250_000_000, help = "Base amount (won)")]
    pub base_amount: u64,
    #[arg(long, help = "Rate in basis points; defaults to the tier for the base amount")]
    pub rate_bp: Option<u32>,
    #[arg(long, default_value_t = crate::core::MIN_FEE)]
    pub min_fee: u64,
    #[arg(long, default_value_t = crate::core::MAX_FEE)]
    pub max_fee: u64,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SolveArgs {
    #[command(flatten)]
    pub breakeven: BreakEvenArgs,
    #[arg(long, default_value_t = 12, help = "Month by which to break even (1-36)")]
    pub target_month: u32,
    #[arg(long, default_value_t = 0)]
    pub search_min: u32,
    #[arg(long, default_value_t = 200)]
    pub search_max: u32,
    #[arg(long, default_value_t = 32)]
    pub max_iterations: u32,
}

pub fn default_breakeven_args() -> BreakEvenArgs {
    BreakEvenArgs {
        rent: 800.0,
        labor: 1_000.0,
        loan_interest: 200.0,
        maintenance: 80.0,
        insurance: 50.0,
        specialty: None,
        avg_revenue_per_patient: None,
        daily_patients: None,
        working_days: 22,
        variable_cost_ratio: None,
        ramp_up: RampUpSchedule::default().0,
    }
}

pub fn default_loan_args() -> LoanArgs {
    LoanArgs {
        loan_amount: 3_000.0,
        annual_rate: 4.5,
        term_years: 5,
        schedule: None,
    }
}

pub fn default_fee_args() -> FeeArgs {
    FeeArgs {
        base_amount: 250_000_000,
        rate_bp: None,
        min_fee: crate::core::MIN_FEE,
        max_fee: crate::core::MAX_FEE,
    }
}

pub fn default_solve_args() -> SolveArgs {
    let config = PatientGoalConfig::default();
    SolveArgs {
        breakeven: default_breakeven_args(),
        target_month: config.target_month,
        search_min: config.search_min,
        search_max: config.search_max,
        max_iterations: config.max_iterations,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreakEvenPayload {
    rent: Option<f64>,
    labor: Option<f64>,
    loan_interest: Option<f64>,
    maintenance: Option<f64>,
    insurance: Option<f64>,
    specialty: Option<Specialty>,
    avg_revenue_per_patient: Option<f64>,
    daily_patients: Option<u32>,
    working_days: Option<u32>,
    variable_cost_ratio: Option<f64>,
    ramp_up: Option<Vec<f64>>,
}

impl BreakEvenPayload {
    pub fn merge_into(self, args: &mut BreakEvenArgs) {
        if let Some(v) = self.rent {
            args.rent = v;
        }
        if let Some(v) = self.labor {
            args.labor = v;
        }
        if let Some(v) = self.loan_interest {
            args.loan_interest = v;
        }
        if let Some(v) = self.maintenance {
            args.maintenance = v;
        }
        if let Some(v) = self.insurance {
            args.insurance = v;
        }
        if let Some(v) = self.specialty {
            args.specialty = Some(v);
        }
        if let Some(v) = self.avg_revenue_per_patient {
            args.avg_revenue_per_patient = Some(v);
        }
        if let Some(v) = self.daily_patients {
            args.daily_patients = Some(v);
        }
        if let Some(v) = self.working_days {
            args.working_days = v;
        }
        if let Some(v) = self.variable_cost_ratio {
            args.variable_cost_ratio = Some(v);
        }
        if let Some(v) = self.ramp_up {
            args.ramp_up = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanPayload {
    loan_amount: Option<f64>,
    annual_rate: Option<f64>,
    term_years: Option<u32>,
    schedule: Option<ApiRepaymentMethod>,
}

impl LoanPayload {
    pub fn merge_into(self, args: &mut LoanArgs) {
        if let Some(v) = self.loan_amount {
            args.loan_amount = v;
        }
        if let Some(v) = self.annual_rate {
            args.annual_rate = v;
        }
        if let Some(v) = self.term_years {
            args.term_years = v;
        }
        if let Some(v) = self.schedule {
            args.schedule = Some(v.into());
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeePayload {
    base_amount: Option<u64>,
    rate_bp: Option<u32>,
    min_fee: Option<u64>,
    max_fee: Option<u64>,
}

impl FeePayload {
    pub fn merge_into(self, args: &mut FeeArgs) {
        if let Some(v) = self.base_amount {
            args.base_amount = v;
        }
        if let Some(v) = self.rate_bp {
            args.rate_bp = Some(v);
        }
        if let Some(v) = self.min_fee {
            args.min_fee = v;
        }
        if let Some(v) = self.max_fee {
            args.max_fee = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolvePayload {
    #[serde(flatten)]
    breakeven: BreakEvenPayload,
    target_month: Option<u32>,
    search_min: Option<u32>,
    search_max: Option<u32>,
    max_iterations: Option<u32>,
}

impl SolvePayload {
    pub fn merge_into(self, args: &mut SolveArgs) {
        self.breakeven.merge_into(&mut args.breakeven);
        if let Some(v) = self.target_month {
            args.target_month = v;
        }
        if let Some(v) = self.search_min {
            args.search_min = v;
        }
        if let Some(v) = self.search_max {
            args.search_max = v;
        }
        if let Some(v) = self.max_iterations {
            args.max_iterations = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostItemPayload {
    pub label: String,
    pub amount: f64,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostPayload {
    pub categories: Vec<CostItemPayload>,
    pub specialty: Option<Specialty>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CostsArgs {
    #[arg(
        long = "item",
        value_parser = parse_cost_item,
        help = "Opening cost item as label=amount[,color] in man-won; repeatable"
    )]
    pub items: Vec<CostItemPayload>,
    #[arg(
        long,
        value_parser = parse_specialty,
        help = "Compare the total with this specialty's opening cost benchmark"
    )]
    pub specialty: Option<Specialty>,
}

impl CostsArgs {
    pub fn to_payload(&self) -> CostPayload {
        CostPayload {
            categories: self.items.clone(),
            specialty: self.specialty,
        }
    }
}

fn parse_cost_item(raw: &str) -> Result<CostItemPayload, String> {
    let (label, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected label=amount[,color], got '{raw}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("missing label in '{raw}'"));
    }
    let (amount, color) = match rest.split_once(',') {
        Some((amount, color)) => (amount, Some(color.trim().to_string())),
        None => (rest, None),
    };
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid amount '{amount}' in '{raw}'"))?;

    Ok(CostItemPayload {
        label: label.to_string(),
        amount,
        color,
    })
}

fn require_finite(field: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NotFinite { field })
    }
}

pub(crate) fn require_money(field: &'static str, value: f64) -> Result<f64, InputError> {
    let value = require_finite(field, value)?;
    if value < 0.0 {
        return Err(InputError::Negative { field });
    }
    Ok(value)
}

fn soft_range(warnings: &mut Vec<RangeWarning>, field: &'static str, value: f64, min: f64, max: f64) {
    if value < min || value > max {
        warnings.push(RangeWarning {
            field,
            value,
            min,
            max,
        });
    }
}

pub fn build_breakeven_inputs(
    args: &BreakEvenArgs,
) -> Result<(BreakEvenInputs, Vec<RangeWarning>), InputError> {
    let mut warnings = Vec::new();

    let fixed_costs = FixedCostSet {
        rent: require_money("rent", args.rent)?,
        labor: require_money("labor", args.labor)?,
        loan_interest: require_money("loanInterest", args.loan_interest)?,
        maintenance: require_money("maintenance", args.maintenance)?,
        insurance: require_money("insurance", args.insurance)?,
    };
    soft_range(&mut warnings, "rent", fixed_costs.rent, 100.0, 2_000.0);
    soft_range(&mut warnings, "labor", fixed_costs.labor, 200.0, 5_000.0);
    soft_range(&mut warnings, "loanInterest", fixed_costs.loan_interest, 0.0, 1_000.0);
    soft_range(&mut warnings, "maintenance", fixed_costs.maintenance, 50.0, 500.0);
    soft_range(&mut warnings, "insurance", fixed_costs.insurance, 20.0, 300.0);

    let preset = args.specialty.map(Specialty::preset);
    let avg_revenue = args
        .avg_revenue_per_patient
        .or(preset.map(|p| p.avg_revenue_per_patient))
        .unwrap_or(DEFAULT_AVG_REVENUE);
    let daily_patients = args
        .daily_patients
        .or(preset.map(|p| p.typical_daily_patients))
        .unwrap_or(DEFAULT_DAILY_PATIENTS);
    let variable_ratio = args
        .variable_cost_ratio
        .or(preset.map(|p| p.variable_cost_ratio_percent))
        .unwrap_or(DEFAULT_VARIABLE_RATIO);

    let avg_revenue = require_money("avgRevenuePerPatient", avg_revenue)?;
    let variable_ratio = require_finite("variableCostRatio", variable_ratio)?;
    if !(0.0..=100.0).contains(&variable_ratio) {
        return Err(InputError::OutOfRange {
            field: "variableCostRatio",
            min: 0.0,
            max: 100.0,
        });
    }
    soft_range(&mut warnings, "avgRevenuePerPatient", avg_revenue, 0.5, 30.0);
    soft_range(&mut warnings, "dailyPatients", daily_patients as f64, 5.0, 100.0);
    soft_range(&mut warnings, "workingDays", args.working_days as f64, 15.0, 28.0);
    soft_range(&mut warnings, "variableCostRatio", variable_ratio, 5.0, 80.0);

    for (index, &value) in args.ramp_up.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 || value > 1.0 {
            return Err(InputError::RampMultiplier { index, value });
        }
    }

    let inputs = BreakEvenInputs {
        fixed_costs,
        revenue: RevenueAssumption {
            avg_revenue_per_patient: avg_revenue,
            daily_patients,
            working_days_per_month: args.working_days,
            variable_cost_ratio_percent: variable_ratio,
        },
        ramp_up: RampUpSchedule(args.ramp_up.clone()),
    };
    Ok((inputs, warnings))
}

/// Loan input in won; the argument amount is man-won.
pub fn build_loan_input(args: &LoanArgs) -> Result<(LoanInput, Vec<RangeWarning>), InputError> {
    let mut warnings = Vec::new();

    let loan_amount = require_money("loanAmount", args.loan_amount)?;
    let annual_rate = require_money("annualRate", args.annual_rate)?;
    if args.term_years == 0 {
        return Err(InputError::ZeroTerm);
    }
    if args.term_years > MAX_TERM_YEARS {
        return Err(InputError::OutOfRange {
            field: "termYears",
            min: 1.0,
            max: MAX_TERM_YEARS as f64,
        });
    }
    soft_range(&mut warnings, "loanAmount", loan_amount, 1_000.0, 100_000.0);
    soft_range(&mut warnings, "annualRate", annual_rate, 3.0, 7.0);
    soft_range(&mut warnings, "termYears", args.term_years as f64, 1.0, 10.0);

    let input = LoanInput {
        principal: loan_amount * MAN_WON,
        annual_rate_percent: annual_rate,
        term_years: args.term_years,
    };
    Ok((input, warnings))
}

pub fn build_fee_schedule(args: &FeeArgs) -> Result<FeeSchedule, InputError> {
    if args.min_fee > args.max_fee {
        return Err(InputError::OutOfRange {
            field: "minFee",
            min: 0.0,
            max: args.max_fee as f64,
        });
    }
    if let Some(rate_bp) = args.rate_bp {
        if rate_bp > 10_000 {
            return Err(InputError::OutOfRange {
                field: "rateBp",
                min: 0.0,
                max: 10_000.0,
            });
        }
    }

    Ok(FeeSchedule {
        min_fee: args.min_fee,
        max_fee: args.max_fee,
        ..FeeSchedule::default()
    })
}

pub fn build_goal_config(args: &SolveArgs) -> PatientGoalConfig {
    PatientGoalConfig {
        target_month: args.target_month,
        search_min: args.search_min,
        search_max: args.search_max,
        max_iterations: args.max_iterations,
    }
}
