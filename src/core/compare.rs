use serde::Serialize;

use super::types::{LoanComparison, Reach, SIMULATION_HORIZON_MONTHS};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub mine: f64,
    pub baseline: f64,
    pub absolute: f64,
    /// Relative difference in percent; `None` when the baseline is zero.
    pub percent: Option<f64>,
    pub direction: Direction,
}

pub fn delta(mine: f64, baseline: f64) -> Delta {
    let absolute = mine - baseline;
    let percent = if baseline == 0.0 {
        None
    } else {
        Some(absolute / baseline * 100.0)
    };
    let direction = if absolute > 0.0 {
        Direction::Above
    } else if absolute < 0.0 {
        Direction::Below
    } else {
        Direction::Equal
    };

    Delta {
        mine,
        baseline,
        absolute,
        percent,
        direction,
    }
}

/// Equal-principal total interest measured against the annuity's.
pub fn method_interest_delta(comparison: &LoanComparison) -> Delta {
    delta(
        comparison.equal_principal.total_interest,
        comparison.annuity.total_interest,
    )
}

/// `12345.0` → `"1억 2,345만원"`, `2130.0` → `"2,130만원"`.
pub fn format_man_won(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let man = rounded.abs() as u64;
    let eok = man / 10_000;
    let rest = man % 10_000;

    match (eok, rest) {
        (0, rest) => format!("{sign}{}만원", group_thousands(rest)),
        (eok, 0) => format!("{sign}{}억원", group_thousands(eok)),
        (eok, rest) => format!("{sign}{}억 {}만원", group_thousands(eok), group_thousands(rest)),
    }
}

/// Whole-won amount with thousands separators.
pub fn format_won(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}원", group_thousands(rounded.abs() as u64))
}

pub fn format_percent_delta(percent: Option<f64>) -> String {
    match percent {
        Some(p) if p > 0.0 => format!("+{p:.1}%"),
        Some(p) => format!("{p:.1}%"),
        None => "-".to_string(),
    }
}

pub fn describe_patients(reach: Reach<u32>) -> String {
    match reach {
        Reach::Reachable(n) => format!("{n}명"),
        Reach::Unbounded => "도달 불가".to_string(),
        Reach::NotReachedWithinHorizon => "기간 내 미도달".to_string(),
    }
}

pub fn describe_month(reach: Reach<u32>) -> String {
    match reach {
        Reach::Reachable(m) => format!("{m}개월차"),
        Reach::Unbounded => "도달 불가".to_string(),
        Reach::NotReachedWithinHorizon => format!("{SIMULATION_HORIZON_MONTHS}개월 초과"),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
