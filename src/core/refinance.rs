use tracing::debug;

use super::error::{EngineError, EngineResult, ensure_non_negative, ensure_positive, ensure_years};
use super::loan::amortizing_payment;
use super::types::{
    CurrentLoanProjection, NewLoanProjection, RefinanceComparison, RefinanceDeltas,
    RefinanceInputs, monthly_rate,
};

/// Number of monthly payments left on a loan, solved from the annuity formula.
///
/// Fails when the payment does not cover the interest accruing each month,
/// since such a loan never amortizes.
pub fn remaining_payments(outstanding: f64, monthly_rate: f64, monthly_payment: f64) -> EngineResult<f64> {
    if monthly_rate == 0.0 {
        return Ok(outstanding / monthly_payment);
    }

    let interest = outstanding * monthly_rate;
    let coverage = interest / monthly_payment;
    if coverage >= 1.0 {
        debug!(
            monthly_payment,
            interest, "payment does not cover monthly interest"
        );
        return Err(EngineError::NonAmortizingPayment {
            payment: monthly_payment,
            interest,
        });
    }

    let periods = -(-coverage).ln_1p() / monthly_rate.ln_1p();
    Ok(periods.max(0.0))
}

pub fn compare_refinance(inputs: &RefinanceInputs) -> EngineResult<RefinanceComparison> {
    ensure_positive("outstanding", inputs.outstanding)?;
    ensure_non_negative("currentRatePercent", inputs.current_rate_percent)?;
    ensure_positive("currentPayment", inputs.current_payment)?;
    ensure_non_negative("newRatePercent", inputs.new_rate_percent)?;
    ensure_years("newTermYears", inputs.new_term_years)?;

    let frequency = inputs.current_frequency;
    let current_payment = frequency.to_monthly(inputs.current_payment);
    let current_rate = monthly_rate(inputs.current_rate_percent);
    let new_rate = monthly_rate(inputs.new_rate_percent);
    let new_periods = f64::from(inputs.new_term_years * 12);

    let new_payment = amortizing_payment(inputs.outstanding, new_rate, new_periods);

    let remaining = remaining_payments(inputs.outstanding, current_rate, current_payment)?;
    let remaining_years = remaining / 12.0;
    let total_remaining = current_payment * remaining;
    let remaining_interest = total_remaining - inputs.outstanding;

    let new_total = new_payment * new_periods;
    let new_interest = new_total - inputs.outstanding;

    let payment_difference = new_payment - current_payment;

    Ok(RefinanceComparison {
        frequency,
        current_loan: CurrentLoanProjection {
            monthly_payment: current_payment,
            periodic_payment: frequency.from_monthly(current_payment),
            remaining_payments: remaining,
            remaining_years,
            total_remaining,
            remaining_interest,
        },
        new_loan: NewLoanProjection {
            monthly_payment: new_payment,
            periodic_payment: frequency.from_monthly(new_payment),
            term_years: inputs.new_term_years,
            total_amount: new_total,
            total_interest: new_interest,
        },
        comparison: RefinanceDeltas {
            interest_savings: remaining_interest - new_interest,
            payment_difference,
            periodic_payment_difference: frequency.from_monthly(payment_difference),
            time_difference: f64::from(inputs.new_term_years) - remaining_years,
            total_savings: total_remaining - new_total,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loan::compute_payment;
    use crate::core::types::Frequency;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_inputs() -> RefinanceInputs {
        RefinanceInputs {
            outstanding: 400_000.0,
            current_rate_percent: 6.5,
            current_payment: 2_800.0,
            current_frequency: Frequency::Monthly,
            new_rate_percent: 5.5,
            new_term_years: 25,
        }
    }

    #[test]
    fn remaining_term_matches_full_schedule() {
        let payment = compute_payment(300_000.0, 6.0, 30).expect("valid loan");
        let remaining = remaining_payments(300_000.0, monthly_rate(6.0), payment).expect("amortizes");
        assert_approx_tol(remaining, 360.0, 1e-6);
    }

    #[test]
    fn scenario_e_insufficient_payment_is_reported() {
        let mut inputs = sample_inputs();
        let interest = inputs.outstanding * monthly_rate(inputs.current_rate_percent);
        inputs.current_payment = interest * 0.999;

        let err = compare_refinance(&inputs).expect_err("payment does not cover interest");
        match err {
            EngineError::NonAmortizingPayment { payment, interest: owed } => {
                assert_approx_tol(payment, interest * 0.999, 1e-9);
                assert_approx_tol(owed, interest, 1e-9);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn payment_exactly_covering_interest_never_amortizes() {
        let interest = 400_000.0 * monthly_rate(6.0);
        assert!(matches!(
            remaining_payments(400_000.0, monthly_rate(6.0), interest),
            Err(EngineError::NonAmortizingPayment { .. })
        ));
    }

    #[test]
    fn comparison_deltas_are_consistent() {
        let result = compare_refinance(&sample_inputs()).expect("valid refinance");
        let delta = result.comparison;

        assert_approx_tol(
            delta.interest_savings,
            result.current_loan.remaining_interest - result.new_loan.total_interest,
            1e-9,
        );
        assert_approx_tol(
            delta.payment_difference,
            result.new_loan.monthly_payment - result.current_loan.monthly_payment,
            1e-9,
        );
        assert_approx_tol(
            delta.time_difference,
            25.0 - result.current_loan.remaining_years,
            1e-9,
        );
        assert_approx_tol(
            delta.total_savings,
            result.current_loan.total_remaining - result.new_loan.total_amount,
            1e-9,
        );
        assert!(result.current_loan.remaining_years > 0.0);
        assert!(delta.interest_savings > 0.0);
    }

    #[test]
    fn weekly_payments_are_converted_and_displayed_weekly() {
        let mut inputs = sample_inputs();
        inputs.current_frequency = Frequency::Weekly;
        inputs.current_payment = 700.0;
        let result = compare_refinance(&inputs).expect("valid refinance");

        assert_approx_tol(result.current_loan.monthly_payment, 700.0 * 52.0 / 12.0, 1e-9);
        assert_approx_tol(result.current_loan.periodic_payment, 700.0, 1e-9);
        assert_approx_tol(
            result.new_loan.periodic_payment,
            result.new_loan.monthly_payment * 12.0 / 52.0,
            1e-9,
        );
    }

    #[test]
    fn zero_current_rate_divides_balance_by_payment() {
        let mut inputs = sample_inputs();
        inputs.current_rate_percent = 0.0;
        inputs.current_payment = 2_000.0;
        let result = compare_refinance(&inputs).expect("valid refinance");
        assert_approx_tol(result.current_loan.remaining_payments, 200.0, 1e-9);
        assert_approx_tol(result.current_loan.remaining_interest, 0.0, 1e-6);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_remaining_term_inverts_payment_formula(
            principal in 10_000u32..2_000_000,
            rate_bp in 1u32..1_500,
            term_years in 1u32..41,
        ) {
            let principal = f64::from(principal);
            let rate_percent = f64::from(rate_bp) / 100.0;
            let payment = compute_payment(principal, rate_percent, term_years).expect("valid loan");
            let remaining = remaining_payments(principal, monthly_rate(rate_percent), payment)
                .expect("amortizing payment");
            prop_assert!((remaining - f64::from(term_years * 12)).abs() <= 1e-4);
        }
    }
}
