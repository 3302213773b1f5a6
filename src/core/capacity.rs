use super::error::{EngineResult, ensure_non_negative, ensure_positive};
use super::loan::annuity_present_value;
use super::types::{BorrowingCapacity, BorrowingCapacityRow, Frequency, monthly_rate};

/// Loan terms swept by the borrowing capacity table, in years.
pub const CAPACITY_TERMS: [u32; 7] = [5, 10, 15, 20, 25, 30, 35];

/// Largest loan each standard term can support for a given repayment.
pub fn sweep_capacity(
    periodic_payment: f64,
    annual_rate_percent: f64,
    frequency: Frequency,
) -> EngineResult<BorrowingCapacity> {
    ensure_positive("paymentAmount", periodic_payment)?;
    ensure_non_negative("annualRatePercent", annual_rate_percent)?;

    let payment = frequency.to_monthly(periodic_payment);
    let rate = monthly_rate(annual_rate_percent);

    let rows = CAPACITY_TERMS
        .iter()
        .map(|&term_years| {
            let periods = f64::from(term_years * 12);
            let max_loan_amount = annuity_present_value(payment, rate, periods);
            let total_paid = payment * periods;
            BorrowingCapacityRow {
                term_years,
                max_loan_amount,
                total_paid,
                total_interest: total_paid - max_loan_amount,
            }
        })
        .collect();

    Ok(BorrowingCapacity {
        frequency,
        monthly_payment: payment,
        rows,
    })
}
