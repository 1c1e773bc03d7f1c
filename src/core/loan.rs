use super::types::{
    AnnuityResult, EqualPrincipalResult, Installment, LoanComparison, LoanInput, RepaymentMethod,
};

/// Equal principal-and-interest repayment.
pub fn annuity(input: &LoanInput) -> AnnuityResult {
    let n = input.installments();
    let monthly_payment = annuity_payment(input.principal, input.monthly_rate(), n);
    let total_payment = monthly_payment * n as f64;
    AnnuityResult {
        monthly_payment,
        total_interest: total_payment - input.principal,
        total_payment,
    }
}

fn annuity_payment(principal: f64, r: f64, n: u32) -> f64 {
    if r == 0.0 {
        return principal / n as f64;
    }
    let growth = (1.0 + r).powf(n as f64);
    if !growth.is_finite() {
        // Limit as n grows: the payment only covers interest.
        return principal * r;
    }
    principal * r * growth / (growth - 1.0)
}

/// Equal principal repayment.
///
/// `avg_payment` is the midpoint of the first and last installment, while
/// `total_interest` sums every installment. The two are not meant to reconcile.
pub fn equal_principal(input: &LoanInput) -> EqualPrincipalResult {
    let n = input.installments();
    let r = input.monthly_rate();
    let principal_payment = input.principal / n as f64;

    let first_payment = principal_payment + input.principal * r;
    let last_payment = principal_payment + principal_payment * r;
    // Sum of interest on a linearly falling balance.
    let total_interest = input.principal * r * (n as f64 + 1.0) / 2.0;

    EqualPrincipalResult {
        principal_payment,
        first_payment,
        last_payment,
        avg_payment: (first_payment + last_payment) / 2.0,
        total_interest,
        total_payment: input.principal + total_interest,
    }
}

pub fn compare_methods(input: &LoanInput) -> LoanComparison {
    let annuity = annuity(input);
    let equal_principal = equal_principal(input);
    LoanComparison {
        annuity,
        equal_principal,
        interest_savings: annuity.total_interest - equal_principal.total_interest,
    }
}

/// Installment-by-installment table for one repayment method.
///
/// Allocates one row per installment; callers bound the term.
pub fn repayment_schedule(input: &LoanInput, method: RepaymentMethod) -> Vec<Installment> {
    let n = input.installments();
    let r = input.monthly_rate();
    let mut balance = input.principal;
    let mut rows = Vec::with_capacity(n as usize);

    match method {
        RepaymentMethod::EqualPayment => {
            let payment = annuity_payment(input.principal, r, n);
            for number in 1..=n {
                let interest = balance * r;
                let principal = if number == n {
                    balance
                } else {
                    payment - interest
                };
                balance -= principal;
                rows.push(Installment {
                    number,
                    payment: principal + interest,
                    principal,
                    interest,
                    balance: balance.max(0.0),
                });
            }
        }
        RepaymentMethod::EqualPrincipal => {
            let principal_payment = input.principal / n as f64;
            for number in 1..=n {
                let interest = (input.principal - principal_payment * (number - 1) as f64) * r;
                balance -= principal_payment;
                rows.push(Installment {
                    number,
                    payment: principal_payment + interest,
                    principal: principal_payment,
                    interest,
                    balance: balance.max(0.0),
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_loan() -> LoanInput {
        LoanInput {
            principal: 3_000.0 * 10_000.0,
            annual_rate_percent: 4.5,
            term_years: 5,
        }
    }

    #[test]
    fn annuity_matches_closed_form() {
        let input = sample_loan();
        let result = annuity(&input);

        let r: f64 = 0.00375;
        let growth = (1.0 + r).powi(60);
        let expected = 30_000_000.0 * r * growth / (growth - 1.0);
        assert_approx_tol(result.monthly_payment, expected, 1e-6);
        // Roughly 559,291 won per month.
        assert_approx_tol(result.monthly_payment, 559_291.0, 1.0);
        assert_approx_tol(
            result.total_interest,
            result.monthly_payment * 60.0 - 30_000_000.0,
            1e-6,
        );
    }

    #[test]
    fn zero_rate_annuity_is_straight_division() {
        let input = LoanInput {
            principal: 12_000.0,
            annual_rate_percent: 0.0,
            term_years: 10,
        };
        let result = annuity(&input);
        assert_eq!(result.monthly_payment, 12_000.0 / 120.0);
        assert_eq!(result.total_interest, 0.0);
    }

    #[test]
    fn equal_principal_reports_first_last_and_two_point_average() {
        let input = sample_loan();
        let result = equal_principal(&input);

        assert_approx_tol(result.principal_payment, 500_000.0, 1e-6);
        assert_approx_tol(result.first_payment, 500_000.0 + 112_500.0, 1e-6);
        assert_approx_tol(result.last_payment, 500_000.0 + 1_875.0, 1e-6);
        assert_approx_tol(
            result.avg_payment,
            (result.first_payment + result.last_payment) / 2.0,
            1e-9,
        );
    }

    #[test]
    fn equal_principal_total_interest_uses_closed_form() {
        let input = sample_loan();
        let result = equal_principal(&input);
        // principal * r * (n + 1) / 2
        assert_approx_tol(result.total_interest, 30_000_000.0 * 0.00375 * 61.0 / 2.0, 1e-3);
    }

    #[test]
    fn savings_is_positive_for_realistic_loan() {
        let comparison = compare_methods(&sample_loan());
        assert!(comparison.interest_savings > 0.0);
        assert_approx_tol(
            comparison.interest_savings,
            comparison.annuity.total_interest - comparison.equal_principal.total_interest,
            1e-9,
        );
    }

    #[test]
    fn zero_term_is_treated_as_single_installment() {
        let input = LoanInput {
            principal: 1_000.0,
            annual_rate_percent: 6.0,
            term_years: 0,
        };
        let result = annuity(&input);
        assert!(result.monthly_payment.is_finite());
        assert_approx_tol(result.monthly_payment, 1_005.0, 1e-6);
    }

    #[test]
    fn annuity_schedule_amortizes_to_zero() {
        let input = sample_loan();
        let rows = repayment_schedule(&input, RepaymentMethod::EqualPayment);
        assert_eq!(rows.len(), 60);
        assert_approx_tol(rows[59].balance, 0.0, 1e-6);
        let interest: f64 = rows.iter().map(|row| row.interest).sum();
        assert_approx_tol(interest, annuity(&input).total_interest, 1e-3);
        assert!(rows[0].interest > rows[59].interest);
    }

    #[test]
    fn equal_principal_schedule_matches_summary() {
        let input = sample_loan();
        let rows = repayment_schedule(&input, RepaymentMethod::EqualPrincipal);
        let summary = equal_principal(&input);
        assert_approx_tol(rows[0].payment, summary.first_payment, 1e-6);
        assert_approx_tol(rows[59].payment, summary.last_payment, 1e-6);
        let interest: f64 = rows.iter().map(|row| row.interest).sum();
        assert_approx_tol(interest, summary.total_interest, 1e-3);
    }

    #[test]
    fn very_long_term_stays_positive_and_finite() {
        let input = LoanInput {
            principal: 30_000_000.0,
            annual_rate_percent: 4.5,
            term_years: 200_000_000,
        };
        let result = annuity(&input);
        assert!(result.monthly_payment > 0.0, "payment {}", result.monthly_payment);
        assert!(result.total_interest > 0.0);
        assert_approx_tol(result.monthly_payment, 30_000_000.0 * 0.00375, 1e-6);

        let equal = equal_principal(&input);
        assert!(equal.total_interest.is_finite());
        assert!(equal.total_interest > 0.0);
    }

    #[test]
    fn century_term_uses_full_exponent() {
        let input = LoanInput {
            principal: 30_000_000.0,
            annual_rate_percent: 4.5,
            term_years: 100,
        };
        let growth = 1.00375_f64.powf(1_200.0);
        let expected = 30_000_000.0 * 0.00375 * growth / (growth - 1.0);
        assert_approx_tol(annuity(&input).monthly_payment, expected, 1e-6);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_zero_rate_has_no_interest(
            principal in 1_000u32..100_000,
            term in 1u32..11,
        ) {
            let input = LoanInput {
                principal: principal as f64,
                annual_rate_percent: 0.0,
                term_years: term,
            };
            let result = annuity(&input);
            prop_assert_eq!(result.monthly_payment, principal as f64 / (term * 12) as f64);
            prop_assert!(result.total_interest.abs() <= 1e-6);
            prop_assert_eq!(equal_principal(&input).total_interest, 0.0);
        }

        #[test]
        fn prop_equal_principal_average_below_annuity_payment(
            principal in 1_000u32..100_000,
            rate_bp in 1u32..1_000,
            term in 1u32..11,
        ) {
            let input = LoanInput {
                principal: principal as f64,
                annual_rate_percent: rate_bp as f64 / 100.0,
                term_years: term,
            };
            let annuity = annuity(&input);
            let equal = equal_principal(&input);
            prop_assert!(equal.avg_payment < annuity.total_payment / (term * 12) as f64);
            prop_assert!(equal.total_interest < annuity.total_interest);
        }

        #[test]
        fn prop_comparison_is_deterministic(
            principal in 1_000u32..100_000,
            rate_tenths in 30u32..70,
            term in 1u32..11,
        ) {
            let input = LoanInput {
                principal: principal as f64,
                annual_rate_percent: rate_tenths as f64 / 10.0,
                term_years: term,
            };
            prop_assert_eq!(compare_methods(&input), compare_methods(&input));
        }
    }
}
