use serde::Serialize;

use super::breakeven::run_breakeven;
use super::types::{BreakEvenInputs, Reach, SIMULATION_HORIZON_MONTHS};
use crate::error::SolveError;

#[derive(Debug, Clone, Copy)]
pub struct PatientGoalConfig {
    pub target_month: u32,
    pub search_min: u32,
    pub search_max: u32,
    pub max_iterations: u32,
}

impl Default for PatientGoalConfig {
    fn default() -> Self {
        Self {
            target_month: 12,
            search_min: 0,
            search_max: 200,
            max_iterations: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientGoalIteration {
    pub iteration: u32,
    pub lower_bound: u32,
    pub upper_bound: u32,
    pub candidate: u32,
    pub bep_month: Reach<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientGoalResult {
    pub target_month: u32,
    pub search_min: u32,
    pub search_max: u32,
    pub solved_daily_patients: Option<u32>,
    pub achieved_month: Option<u32>,
    pub iterations: Vec<PatientGoalIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Smallest daily patient count that breaks even by `target_month`.
///
/// Relies on the break-even month being non-increasing in daily patients,
/// which holds whenever the contribution margin is positive.
pub fn solve_daily_patients(
    inputs: &BreakEvenInputs,
    config: PatientGoalConfig,
) -> Result<PatientGoalResult, SolveError> {
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut solved = None;
    let mut converged = false;
    let feasible;
    let message;

    if meets_target(inputs, config, config.search_min) {
        solved = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Already breaks even by the target month at the lower bound.".to_string();
    } else if !meets_target(inputs, config, config.search_max) {
        feasible = false;
        message = "No daily patient count within the search bounds breaks even in time."
            .to_string();
    } else {
        // Invariant: `lo` misses the target, `hi` meets it.
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = lo + (hi - lo) / 2;
            let bep_month = evaluate_candidate(inputs, mid);
            iterations.push(PatientGoalIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate: mid,
                bep_month,
            });

            if month_meets(bep_month, config.target_month) {
                hi = mid;
            } else {
                lo = mid;
            }

            if hi - lo <= 1 {
                converged = true;
                break;
            }
        }
        solved = Some(hi);
        feasible = true;
        message = if converged {
            "Solved minimum daily patients.".to_string()
        } else {
            "Reached max iterations before narrowing to one patient; returning best estimate."
                .to_string()
        };
    }

    let achieved_month = solved.and_then(|daily| evaluate_candidate(inputs, daily).value());

    Ok(PatientGoalResult {
        target_month: config.target_month,
        search_min: config.search_min,
        search_max: config.search_max,
        solved_daily_patients: solved,
        achieved_month,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn evaluate_candidate(base_inputs: &BreakEvenInputs, daily_patients: u32) -> Reach<u32> {
    let mut inputs = base_inputs.clone();
    inputs.revenue.daily_patients = daily_patients;
    run_breakeven(&inputs).bep_month
}

fn meets_target(inputs: &BreakEvenInputs, config: PatientGoalConfig, daily_patients: u32) -> bool {
    month_meets(evaluate_candidate(inputs, daily_patients), config.target_month)
}

fn month_meets(bep_month: Reach<u32>, target_month: u32) -> bool {
    matches!(bep_month, Reach::Reachable(m) if m <= target_month)
}

fn validate_config(config: PatientGoalConfig) -> Result<(), SolveError> {
    if !(1..=SIMULATION_HORIZON_MONTHS).contains(&config.target_month) {
        return Err(SolveError::TargetMonth {
            month: config.target_month,
            horizon: SIMULATION_HORIZON_MONTHS,
        });
    }
    if config.search_max <= config.search_min {
        return Err(SolveError::EmptyRange {
            min: config.search_min,
            max: config.search_max,
        });
    }
    if config.max_iterations == 0 {
        return Err(SolveError::NoIterations);
    }
    Ok(())
}
