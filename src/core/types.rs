use serde::Serialize;

/// Months covered by the break-even month simulation.
pub const SIMULATION_HORIZON_MONTHS: u32 = 36;

/// Half-width of the band around zero monthly profit reported as break-even (man-won).
pub const BREAKEVEN_BAND: f64 = 100.0;

/// Outcome of a break-even search.
///
/// `Unbounded` means break-even is mathematically impossible (each extra
/// patient loses money). `NotReachedWithinHorizon` means the simulation ran out
/// of months before it got there.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Reach<T> {
    Reachable(T),
    Unbounded,
    NotReachedWithinHorizon,
}

impl<T: Copy> Reach<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Reach::Reachable(v) => Some(v),
            Reach::Unbounded | Reach::NotReachedWithinHorizon => None,
        }
    }

    pub fn is_reachable(self) -> bool {
        matches!(self, Reach::Reachable(_))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfitStatus {
    Loss,
    Breakeven,
    Profit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostCategory {
    pub label: String,
    pub amount: f64,
    pub color: Option<String>,
}

impl CostCategory {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostShare {
    pub label: String,
    pub amount: f64,
    pub percentage: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub total: f64,
    pub items: Vec<CostShare>,
}

/// Monthly fixed costs in man-won.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCostSet {
    pub rent: f64,
    pub labor: f64,
    pub loan_interest: f64,
    pub maintenance: f64,
    pub insurance: f64,
}

impl FixedCostSet {
    pub fn total(&self) -> f64 {
        self.rent + self.labor + self.loan_interest + self.maintenance + self.insurance
    }

    pub fn categories(&self) -> Vec<CostCategory> {
        vec![
            CostCategory::new("rent", self.rent),
            CostCategory::new("labor", self.labor),
            CostCategory::new("loanInterest", self.loan_interest),
            CostCategory::new("maintenance", self.maintenance),
            CostCategory::new("insurance", self.insurance),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueAssumption {
    pub avg_revenue_per_patient: f64,
    pub daily_patients: u32,
    pub working_days_per_month: u32,
    pub variable_cost_ratio_percent: f64,
}

impl RevenueAssumption {
    pub fn variable_ratio(&self) -> f64 {
        self.variable_cost_ratio_percent / 100.0
    }
}

/// Utilization multipliers for months 1..N after opening; 1.0 afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RampUpSchedule(pub Vec<f64>);

impl RampUpSchedule {
    pub fn multiplier(&self, month_index: usize) -> f64 {
        self.0.get(month_index).copied().unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RampUpSchedule {
    fn default() -> Self {
        Self(vec![0.40, 0.55, 0.70, 0.80, 0.90])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakEvenInputs {
    pub fixed_costs: FixedCostSet,
    pub revenue: RevenueAssumption,
    pub ramp_up: RampUpSchedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPoint {
    pub month: u32,
    pub ramp: f64,
    pub revenue: f64,
    pub variable_cost: f64,
    pub profit: f64,
    pub cumulative_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenResult {
    pub monthly_fixed: f64,
    pub monthly_revenue: f64,
    pub monthly_variable: f64,
    pub monthly_total_cost: f64,
    pub monthly_profit: f64,
    pub contribution_per_patient: f64,
    pub bep_daily_patients: Reach<u32>,
    pub bep_month: Reach<u32>,
    pub status: ProfitStatus,
    pub cost_split: CostBreakdown,
    pub months: Vec<MonthPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanInput {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_years: u32,
}

impl LoanInput {
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }

    /// Number of monthly installments, never less than one.
    pub fn installments(&self) -> u32 {
        self.term_years.saturating_mul(12).max(1)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepaymentMethod {
    EqualPayment,
    EqualPrincipal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnuityResult {
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EqualPrincipalResult {
    pub principal_payment: f64,
    pub first_payment: f64,
    pub last_payment: f64,
    /// Mean of the first and last installment only.
    pub avg_payment: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanComparison {
    pub annuity: AnnuityResult,
    pub equal_principal: EqualPrincipalResult,
    /// Annuity interest minus equal-principal interest, unclamped.
    pub interest_savings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub number: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}
