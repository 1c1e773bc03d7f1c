mod inputs;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpListener;

pub use inputs::{
    BreakEvenArgs, BreakEvenPayload, CliRepaymentMethod, CostItemPayload, CostPayload, CostsArgs,
    FeeArgs, FeePayload, LoanArgs, LoanPayload, MAN_WON, MAX_TERM_YEARS, RangeWarning, SolveArgs,
    SolvePayload, build_breakeven_inputs, build_fee_schedule, build_goal_config, build_loan_input,
    default_breakeven_args, default_fee_args, default_loan_args, default_solve_args,
};

use crate::core::{
    BreakEvenInputs, BreakEvenResult, CostBreakdown, CostCategory, Delta, FeeBound, FeeResult,
    IndustryBenchmark, Installment, LastInputCache, LoanComparison, PatientGoalResult,
    RepaymentMethod, Specialty, SpecialtyPreset, aggregate_costs, calculate_fee, compare_methods,
    delta, describe_month, describe_patients, format_man_won, format_percent_delta, format_won,
    method_interest_delta, repayment_schedule, run_breakeven, solve_daily_patients,
};
use crate::error::{InputError, RequestError};

#[derive(Parser, Debug)]
#[command(
    name = "clinic-feasibility",
    about = "Clinic opening feasibility: break-even simulation, loan comparison and fee tiers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API
    Serve(ServeArgs),
    /// Break-even patients and month
    Bep(BreakEvenArgs),
    /// Compare equal-payment and equal-principal repayment
    Loan(LoanArgs),
    /// Tiered fee with floor and cap
    Fee(FeeArgs),
    /// Opening cost breakdown by category
    Costs(CostsArgs),
    /// Daily patients needed to break even by a target month
    Solve(SolveArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ServeArgs {
    #[arg(long, env = "CLINIC_FEASIBILITY_PORT", default_value_t = 8080)]
    pub port: u16,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenDisplay {
    pub monthly_revenue: String,
    pub monthly_total_cost: String,
    pub monthly_profit: String,
    pub bep_daily_patients: String,
    pub bep_month: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenResponse {
    pub result: BreakEvenResult,
    pub fixed_cost_breakdown: CostBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_cost_vs_benchmark: Option<Delta>,
    pub display: BreakEvenDisplay,
    pub warnings: Vec<RangeWarning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDisplay {
    pub annuity_monthly_payment: String,
    pub equal_principal_first_payment: String,
    pub equal_principal_last_payment: String,
    pub equal_principal_avg_payment: String,
    pub interest_savings: String,
    pub interest_delta_percent: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub principal: f64,
    pub comparison: LoanComparison,
    pub interest_delta: Delta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_method: Option<RepaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<Installment>>,
    pub display: LoanDisplay,
    pub warnings: Vec<RangeWarning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeResponse {
    pub result: FeeResult,
    pub display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostResponse {
    pub breakdown: CostBreakdown,
    pub display_total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs_benchmark: Option<Delta>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResponse {
    pub result: PatientGoalResult,
    pub warnings: Vec<RangeWarning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetEntry {
    pub preset: SpecialtyPreset,
    pub benchmark: IndustryBenchmark,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared server state. Repeated break-even requests with identical inputs
/// are answered from the last-input cache.
#[derive(Clone, Default)]
pub struct AppState {
    breakeven_cache: Arc<Mutex<LastInputCache<BreakEvenInputs, BreakEvenResult>>>,
}

impl AppState {
    fn cached_breakeven(&self, inputs: &BreakEvenInputs) -> BreakEvenResult {
        let mut cache = self
            .breakeven_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        cache.get_or_compute(inputs, run_breakeven)
    }

    /// `(hits, misses)` of the break-even cache.
    pub fn breakeven_cache_stats(&self) -> (u64, u64) {
        let cache = self
            .breakeven_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        (cache.hits(), cache.misses())
    }
}

pub fn breakeven_report(args: &BreakEvenArgs) -> Result<BreakEvenResponse, InputError> {
    breakeven_report_with(args, run_breakeven)
}

fn breakeven_report_with(
    args: &BreakEvenArgs,
    compute: impl FnOnce(&BreakEvenInputs) -> BreakEvenResult,
) -> Result<BreakEvenResponse, InputError> {
    let (inputs, warnings) = build_breakeven_inputs(args)?;
    let result = compute(&inputs);
    let fixed_cost_breakdown = aggregate_costs(&inputs.fixed_costs.categories());
    let fixed_cost_vs_benchmark = args
        .specialty
        .map(|s| delta(result.monthly_fixed, s.benchmark().monthly_fixed_total));

    let display = BreakEvenDisplay {
        monthly_revenue: format_man_won(result.monthly_revenue),
        monthly_total_cost: format_man_won(result.monthly_total_cost),
        monthly_profit: format_man_won(result.monthly_profit),
        bep_daily_patients: describe_patients(result.bep_daily_patients),
        bep_month: describe_month(result.bep_month),
    };

    Ok(BreakEvenResponse {
        result,
        fixed_cost_breakdown,
        fixed_cost_vs_benchmark,
        display,
        warnings,
    })
}

pub fn loan_report(args: &LoanArgs) -> Result<LoanResponse, InputError> {
    let (input, warnings) = build_loan_input(args)?;
    let comparison = compare_methods(&input);
    let interest_delta = method_interest_delta(&comparison);
    let schedule_method = args.schedule.map(RepaymentMethod::from);
    let schedule = schedule_method.map(|method| repayment_schedule(&input, method));

    let display = LoanDisplay {
        annuity_monthly_payment: format_won(comparison.annuity.monthly_payment),
        equal_principal_first_payment: format_won(comparison.equal_principal.first_payment),
        equal_principal_last_payment: format_won(comparison.equal_principal.last_payment),
        equal_principal_avg_payment: format_won(comparison.equal_principal.avg_payment),
        interest_savings: format_won(comparison.interest_savings),
        interest_delta_percent: format_percent_delta(interest_delta.percent),
    };

    Ok(LoanResponse {
        principal: input.principal,
        comparison,
        interest_delta,
        schedule_method,
        schedule,
        display,
        warnings,
    })
}

pub fn fee_report(args: &FeeArgs) -> Result<FeeResponse, InputError> {
    let schedule = build_fee_schedule(args)?;
    let result = match args.rate_bp {
        Some(rate_bp) => calculate_fee(args.base_amount, rate_bp, schedule.min_fee, schedule.max_fee),
        None => schedule.calculate(args.base_amount),
    };
    let notice = match result.bound {
        FeeBound::Min => Some(format!("최소 수수료 {}이 적용되었습니다", format_won(result.fee as f64))),
        FeeBound::Max => Some(format!("최대 수수료 {}이 적용되었습니다", format_won(result.fee as f64))),
        FeeBound::Unclamped => None,
    };

    Ok(FeeResponse {
        display: format_won(result.fee as f64),
        result,
        notice,
    })
}

pub fn cost_report(payload: CostPayload) -> Result<CostResponse, InputError> {
    let mut categories = Vec::with_capacity(payload.categories.len());
    for item in payload.categories {
        let amount = inputs::require_money("amount", item.amount)?;
        let category = CostCategory::new(item.label, amount);
        categories.push(match item.color {
            Some(color) => category.with_color(color),
            None => category,
        });
    }

    let breakdown = aggregate_costs(&categories);
    let vs_benchmark = payload
        .specialty
        .map(|s| delta(breakdown.total, s.benchmark().opening_cost_total));
    Ok(CostResponse {
        display_total: format_man_won(breakdown.total),
        breakdown,
        vs_benchmark,
    })
}

pub fn solve_report(args: &SolveArgs) -> Result<SolveResponse, RequestError> {
    let (inputs, warnings) = build_breakeven_inputs(&args.breakeven)?;
    let result = solve_daily_patients(&inputs, build_goal_config(args))?;
    Ok(SolveResponse { result, warnings })
}

pub fn preset_entries() -> Vec<PresetEntry> {
    Specialty::ALL
        .iter()
        .map(|s| PresetEntry {
            preset: s.preset(),
            benchmark: s.benchmark(),
        })
        .collect()
}

/// Runs a non-server subcommand and returns its pretty JSON output.
pub fn run_command(command: &Command) -> Result<String, RequestError> {
    let json = match command {
        Command::Serve(_) => return Err(RequestError::Unsupported("serve")),
        Command::Bep(args) => serde_json::to_string_pretty(&breakeven_report(args)?),
        Command::Loan(args) => serde_json::to_string_pretty(&loan_report(args)?),
        Command::Fee(args) => serde_json::to_string_pretty(&fee_report(args)?),
        Command::Costs(args) => serde_json::to_string_pretty(&cost_report(args.to_payload())?),
        Command::Solve(args) => serde_json::to_string_pretty(&solve_report(args)?),
    };
    json.map_err(|e| RequestError::Serialize(e.to_string()))
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/breakeven",
            get(breakeven_get_handler).post(breakeven_post_handler),
        )
        .route("/api/loan", get(loan_get_handler).post(loan_post_handler))
        .route("/api/fee", get(fee_get_handler).post(fee_post_handler))
        .route("/api/costs", post(costs_handler))
        .route("/api/solve/daily-patients", post(solve_handler))
        .route("/api/presets", get(presets_handler))
        .fallback(not_found_handler)
        .with_state(AppState::default())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "clinic feasibility API listening");

    axum::serve(listener, router()).await
}

async fn health_handler(State(state): State<AppState>) -> Response {
    let (hits, misses) = state.breakeven_cache_stats();
    json_response(
        StatusCode::OK,
        serde_json::json!({
            "status": "ok",
            "breakevenCache": { "hits": hits, "misses": misses }
        }),
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn breakeven_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<BreakEvenPayload>,
) -> Response {
    breakeven_handler_impl(&state, payload)
}

async fn breakeven_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<BreakEvenPayload>,
) -> Response {
    breakeven_handler_impl(&state, payload)
}

fn breakeven_handler_impl(state: &AppState, payload: BreakEvenPayload) -> Response {
    let mut args = default_breakeven_args();
    payload.merge_into(&mut args);
    match breakeven_report_with(&args, |inputs| state.cached_breakeven(inputs)) {
        Ok(report) => {
            tracing::debug!(
                status = ?report.result.status,
                bep_month = ?report.result.bep_month,
                warnings = report.warnings.len(),
                "break-even computed"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => bad_request(&err),
    }
}

async fn loan_get_handler(Query(payload): Query<LoanPayload>) -> Response {
    loan_handler_impl(payload)
}

async fn loan_post_handler(Json(payload): Json<LoanPayload>) -> Response {
    loan_handler_impl(payload)
}

fn loan_handler_impl(payload: LoanPayload) -> Response {
    let mut args = default_loan_args();
    payload.merge_into(&mut args);
    match loan_report(&args) {
        Ok(report) => {
            tracing::debug!(
                principal = report.principal,
                savings = report.comparison.interest_savings,
                "loan comparison computed"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => bad_request(&err),
    }
}

async fn fee_get_handler(Query(payload): Query<FeePayload>) -> Response {
    fee_handler_impl(payload)
}

async fn fee_post_handler(Json(payload): Json<FeePayload>) -> Response {
    fee_handler_impl(payload)
}

fn fee_handler_impl(payload: FeePayload) -> Response {
    let mut args = default_fee_args();
    payload.merge_into(&mut args);
    match fee_report(&args) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => bad_request(&err),
    }
}

async fn costs_handler(Json(payload): Json<CostPayload>) -> Response {
    match cost_report(payload) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => bad_request(&err),
    }
}

async fn solve_handler(Json(payload): Json<SolvePayload>) -> Response {
    let mut args = default_solve_args();
    payload.merge_into(&mut args);
    match solve_report(&args) {
        Ok(report) => {
            tracing::debug!(
                feasible = report.result.feasible,
                solved = ?report.result.solved_daily_patients,
                iterations = report.result.iterations.len(),
                warnings = report.warnings.len(),
                "daily patient goal solved"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => bad_request(&err),
    }
}

async fn presets_handler() -> Response {
    json_response(StatusCode::OK, preset_entries())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn bad_request(err: &dyn std::error::Error) -> Response {
    tracing::warn!(error = %err, "rejected request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
