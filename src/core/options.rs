use super::error::{
    EngineResult, MAX_TERM_YEARS, ensure_non_negative, ensure_percent, ensure_positive, ensure_years,
};
use super::types::{
    Frequency, StrategyComparison, StrategyKind, StrategyRates, StrategyResult, StrategyTaxRates,
    YearlyGrowthPoint, percent_to_decimal,
};

/// Year-by-year growth of a monthly contribution with annual tax drag.
///
/// `annual_rate` and `tax_rate` are decimal fractions. Each month the balance
/// grows by `(balance + contribution) * monthly_rate`; at year end the
/// positive return realised that year is taxed and removed from the balance.
/// The series starts with a year-0 zero baseline.
pub fn simulate_yearly_growth(
    monthly_contribution: f64,
    annual_rate: f64,
    tax_rate: f64,
    years: u32,
) -> Vec<YearlyGrowthPoint> {
    let monthly_rate = annual_rate / 12.0;
    let mut points = Vec::with_capacity(years.min(MAX_TERM_YEARS) as usize + 1);
    points.push(YearlyGrowthPoint {
        year: 0,
        cumulative_contributions: 0.0,
        balance: 0.0,
        returns: 0.0,
        year_tax_paid: 0.0,
        cumulative_tax_paid: 0.0,
    });

    let mut balance = 0.0;
    let mut contributions = 0.0;
    let mut cumulative_tax = 0.0;

    for year in 1..=years {
        let year_start_balance = balance;
        let mut year_contributions = 0.0;

        for _ in 0..12 {
            contributions += monthly_contribution;
            year_contributions += monthly_contribution;
            if annual_rate > 0.0 {
                let growth = (balance + monthly_contribution) * monthly_rate;
                balance += monthly_contribution + growth;
            } else {
                balance = contributions;
            }
        }

        let year_returns = balance - year_start_balance - year_contributions;
        let year_tax = if year_returns > 0.0 {
            year_returns * tax_rate
        } else {
            0.0
        };
        balance -= year_tax;
        cumulative_tax += year_tax;

        points.push(YearlyGrowthPoint {
            year,
            cumulative_contributions: contributions,
            balance,
            returns: balance - contributions,
            year_tax_paid: year_tax,
            cumulative_tax_paid: cumulative_tax,
        });
    }

    points
}

fn strategy_set(rates: &StrategyRates, tax: &StrategyTaxRates) -> [(StrategyKind, f64, f64); 4] {
    let marginal = percent_to_decimal(tax.marginal_rate_percent);
    let etf_tax = marginal * (1.0 - percent_to_decimal(tax.cgt_discount_percent));
    [
        (StrategyKind::NoReturn, 0.0, 0.0),
        (
            StrategyKind::Savings,
            percent_to_decimal(rates.savings_rate_percent),
            marginal,
        ),
        (
            StrategyKind::Etf,
            percent_to_decimal(rates.etf_rate_percent),
            etf_tax,
        ),
        (
            StrategyKind::Super,
            percent_to_decimal(rates.super_rate_percent),
            percent_to_decimal(tax.super_earnings_rate_percent),
        ),
    ]
}

/// Runs every strategy over the same contribution stream and ranks them
/// against the no-return baseline.
pub fn compare_strategies(
    contribution: f64,
    frequency: Frequency,
    years: u32,
    rates: &StrategyRates,
    tax: &StrategyTaxRates,
) -> EngineResult<StrategyComparison> {
    ensure_positive("contribution", contribution)?;
    ensure_years("years", years)?;
    ensure_non_negative("savingsRatePercent", rates.savings_rate_percent)?;
    ensure_non_negative("etfRatePercent", rates.etf_rate_percent)?;
    ensure_non_negative("superRatePercent", rates.super_rate_percent)?;
    ensure_percent("marginalTaxRatePercent", tax.marginal_rate_percent)?;
    ensure_percent("cgtDiscountPercent", tax.cgt_discount_percent)?;
    ensure_percent("superEarningsRatePercent", tax.super_earnings_rate_percent)?;

    let monthly_contribution = frequency.to_monthly(contribution);
    let total_contributed = monthly_contribution * f64::from(years * 12);

    let strategies: Vec<StrategyResult> = strategy_set(rates, tax)
        .into_iter()
        .map(|(kind, annual_rate, tax_rate)| {
            let yearly = simulate_yearly_growth(monthly_contribution, annual_rate, tax_rate, years);
            let last = yearly[yearly.len() - 1];
            StrategyResult {
                kind,
                name: kind.label(),
                annual_rate,
                tax_rate,
                total_contributed,
                returns: last.balance - total_contributed,
                final_value: last.balance,
                tax_paid: last.cumulative_tax_paid,
                yearly,
            }
        })
        .collect();

    // The baseline sits at index 0; the first of equal final values wins.
    let mut best_index = 1;
    for (idx, strategy) in strategies.iter().enumerate().skip(2) {
        if strategy.final_value > strategies[best_index].final_value {
            best_index = idx;
        }
    }
    let max_gain = strategies[best_index].final_value - strategies[0].final_value;

    Ok(StrategyComparison {
        monthly_contribution,
        total_contributed,
        strategies,
        best_index,
        max_gain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_rates() -> StrategyRates {
        StrategyRates {
            savings_rate_percent: 4.5,
            etf_rate_percent: 8.0,
            super_rate_percent: 7.0,
        }
    }

    #[test]
    fn year_zero_is_a_zero_baseline() {
        let points = simulate_yearly_growth(500.0, 0.07, 0.15, 5);
        assert_eq!(points.len(), 6);
        assert_eq!(points[0].year, 0);
        assert_eq!(points[0].balance, 0.0);
        assert_eq!(points[0].cumulative_contributions, 0.0);
        assert_eq!(points[0].cumulative_tax_paid, 0.0);
    }

    #[test]
    fn first_year_growth_compounds_on_balance_plus_contribution() {
        let rate = 0.12;
        let points = simulate_yearly_growth(100.0, rate, 0.0, 1);

        let mut balance: f64 = 0.0;
        for _ in 0..12 {
            balance += 100.0 + (balance + 100.0) * 0.01;
        }
        assert_approx(points[1].balance, balance);
        assert_approx(points[1].cumulative_contributions, 1_200.0);
        assert_approx(points[1].year_tax_paid, 0.0);
    }

    #[test]
    fn annual_tax_drag_is_applied_to_the_years_return() {
        let untaxed = simulate_yearly_growth(100.0, 0.12, 0.0, 1);
        let taxed = simulate_yearly_growth(100.0, 0.12, 0.3, 1);
        let gross_return = untaxed[1].balance - 1_200.0;

        assert_approx(taxed[1].year_tax_paid, gross_return * 0.3);
        assert_approx(taxed[1].balance, untaxed[1].balance - gross_return * 0.3);
        assert_approx(taxed[1].cumulative_tax_paid, taxed[1].year_tax_paid);
    }

    #[test]
    fn zero_rate_balance_tracks_contributions() {
        let points = simulate_yearly_growth(200.0, 0.0, 0.3, 3);
        for point in &points {
            assert_approx(point.balance, point.cumulative_contributions);
            assert_approx(point.year_tax_paid, 0.0);
        }
    }

    #[test]
    fn strategies_are_ordered_and_best_excludes_baseline() {
        let comparison = compare_strategies(
            500.0,
            Frequency::Monthly,
            20,
            &sample_rates(),
            &StrategyTaxRates::default(),
        )
        .expect("valid inputs");

        let kinds: Vec<StrategyKind> = comparison.strategies.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::NoReturn,
                StrategyKind::Savings,
                StrategyKind::Etf,
                StrategyKind::Super,
            ]
        );
        assert_ne!(comparison.best_index, 0);
        assert_eq!(comparison.strategies[comparison.best_index].kind, StrategyKind::Etf);
        assert_approx(
            comparison.max_gain,
            comparison.strategies[comparison.best_index].final_value
                - comparison.strategies[0].final_value,
        );
        assert_approx(comparison.strategies[0].final_value, 500.0 * 240.0);
    }

    #[test]
    fn etf_tax_rate_applies_the_cgt_discount() {
        let comparison = compare_strategies(
            100.0,
            Frequency::Monthly,
            5,
            &sample_rates(),
            &StrategyTaxRates {
                marginal_rate_percent: 37.0,
                ..StrategyTaxRates::default()
            },
        )
        .expect("valid inputs");
        assert_approx(comparison.strategies[1].tax_rate, 0.37);
        assert_approx(comparison.strategies[2].tax_rate, 0.185);
        assert_approx(comparison.strategies[3].tax_rate, 0.15);
    }

    #[test]
    fn weekly_contributions_are_converted_to_monthly() {
        let comparison = compare_strategies(
            120.0,
            Frequency::Weekly,
            10,
            &sample_rates(),
            &StrategyTaxRates::default(),
        )
        .expect("valid inputs");
        assert_approx(comparison.monthly_contribution, 120.0 * 52.0 / 12.0);
        assert_approx(comparison.total_contributed, 120.0 * 52.0 * 10.0);
    }

    #[test]
    fn rejects_out_of_range_tax_rates() {
        let result = compare_strategies(
            100.0,
            Frequency::Monthly,
            5,
            &sample_rates(),
            &StrategyTaxRates {
                marginal_rate_percent: 120.0,
                ..StrategyTaxRates::default()
            },
        );
        assert!(result.is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_taxed_balance_never_exceeds_untaxed(
            contribution in 10u32..5_000,
            years in 1u32..41,
            rate_bp in 1u32..1_500,
            tax_bp in 0u32..6_000,
        ) {
            let rate = f64::from(rate_bp) / 10_000.0;
            let tax = f64::from(tax_bp) / 10_000.0;
            let untaxed = simulate_yearly_growth(f64::from(contribution), rate, 0.0, years);
            let taxed = simulate_yearly_growth(f64::from(contribution), rate, tax, years);

            prop_assert_eq!(taxed.len(), years as usize + 1);
            for (t, u) in taxed.iter().zip(&untaxed) {
                prop_assert!(t.balance <= u.balance + 1e-6);
                prop_assert!(t.balance >= t.cumulative_contributions - 1e-6);
                prop_assert!(t.cumulative_tax_paid >= 0.0);
            }
        }
    }
}
