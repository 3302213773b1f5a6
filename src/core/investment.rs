use super::error::{EngineResult, ensure_non_negative, ensure_positive, ensure_years};
use super::types::{InvestmentProjection, percent_to_decimal};

/// Future value of `periods` end-of-period contributions compounding at `rate`.
pub(crate) fn annuity_future_value(payment: f64, rate: f64, periods: f64) -> f64 {
    if rate == 0.0 {
        return payment * periods;
    }
    payment * ((1.0 + rate).powf(periods) - 1.0) / rate
}

/// Simple interest earned when every monthly contribution is held, without
/// compounding, until the end of the horizon.
fn simple_return(monthly_contribution: f64, annual_rate: f64, total_months: u32) -> f64 {
    (1..=total_months)
        .map(|month| {
            let years_held = f64::from(total_months - month + 1) / 12.0;
            monthly_contribution * annual_rate * years_held
        })
        .sum()
}

pub fn project_investment(
    monthly_contribution: f64,
    years: u32,
    annual_rate_percent: f64,
) -> EngineResult<InvestmentProjection> {
    ensure_positive("monthlyContribution", monthly_contribution)?;
    ensure_years("years", years)?;
    ensure_non_negative("annualRatePercent", annual_rate_percent)?;

    let annual_rate = percent_to_decimal(annual_rate_percent);
    let total_months = years * 12;
    let total_contributed = monthly_contribution * f64::from(total_months);

    let simple = simple_return(monthly_contribution, annual_rate, total_months);
    let future_value =
        annuity_future_value(monthly_contribution, annual_rate / 12.0, f64::from(total_months));
    let compound = future_value - total_contributed;

    Ok(InvestmentProjection {
        total_contributed,
        simple_return: simple,
        total_with_simple_return: total_contributed + simple,
        compound_return: compound,
        future_value,
        compound_advantage: compound - simple,
        growth_multiplier: future_value / total_contributed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn scenario_d_hundred_a_month_for_thirty_years() {
        let projection = project_investment(100.0, 30, 4.0).expect("valid inputs");

        assert_approx_tol(projection.total_contributed, 36_000.0, EPS);
        assert_approx_tol(projection.simple_return, 21_660.0, 1e-6);
        assert_approx_tol(projection.future_value, 69_404.94, 0.01);
        assert_approx_tol(projection.compound_return, 33_404.94, 0.01);
        assert!(projection.compound_advantage > 0.0);
        assert_approx_tol(
            projection.growth_multiplier,
            projection.future_value / 36_000.0,
            EPS,
        );
    }

    #[test]
    fn zero_rate_degenerates_to_contributions() {
        let projection = project_investment(250.0, 12, 0.0).expect("zero rate is allowed");
        assert_eq!(projection.future_value, projection.total_contributed);
        assert_eq!(projection.compound_return, 0.0);
        assert_eq!(projection.simple_return, 0.0);
        assert!(projection.future_value.is_finite());
    }

    #[test]
    fn one_month_simple_model_credits_a_full_month() {
        let simple = simple_return(1_000.0, 0.12, 1);
        assert_approx_tol(simple, 10.0, EPS);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(project_investment(0.0, 10, 5.0).is_err());
        assert!(project_investment(100.0, 0, 5.0).is_err());
        assert!(project_investment(100.0, 10, -5.0).is_err());
    }

    #[test]
    fn horizons_past_a_century_are_invalid_input() {
        assert!(matches!(
            project_investment(100.0, 400_000_000, 4.0),
            Err(EngineError::InvalidInput { field: "years", .. })
        ));
        assert!(project_investment(100.0, 101, 4.0).is_err());
        assert!(project_investment(100.0, 100, 4.0).is_ok());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_compound_beats_simple_over_long_horizons(
            contribution in 10u32..10_000,
            years in 10u32..41,
            rate_bp in 200u32..1_500,
        ) {
            let projection = project_investment(
                f64::from(contribution),
                years,
                f64::from(rate_bp) / 100.0,
            )
            .expect("valid inputs");
            prop_assert!(projection.compound_return >= projection.simple_return);
            prop_assert!(projection.future_value >= projection.total_contributed);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_zero_rate_never_divides_by_zero(
            contribution in 1u32..10_000,
            years in 1u32..51,
        ) {
            let projection = project_investment(f64::from(contribution), years, 0.0)
                .expect("valid inputs");
            prop_assert_eq!(projection.future_value, projection.total_contributed);
            prop_assert_eq!(projection.compound_return, 0.0);
        }
    }
}
