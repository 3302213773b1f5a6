use tracing::trace;

use super::error::{EngineResult, MAX_TERM_YEARS, ensure_non_negative, ensure_positive, ensure_years};
use super::types::{
    AmortizationRow, ExtraPaymentSchedule, ExtraPaymentSuggestion, Frequency, LoanAnalysis,
    LoanParameters, monthly_rate,
};

/// Extra monthly repayment probed when the borrower entered none.
pub const SUGGESTED_EXTRA_PAYMENT: f64 = 100.0;

/// Standard amortizing payment for a loan repaid monthly over `term_years`.
///
/// A zero rate degenerates to straight-line repayment of `principal / n`.
pub fn compute_payment(principal: f64, annual_rate_percent: f64, term_years: u32) -> EngineResult<f64> {
    ensure_positive("principal", principal)?;
    ensure_non_negative("annualRatePercent", annual_rate_percent)?;
    ensure_years("termYears", term_years)?;

    let rate = monthly_rate(annual_rate_percent);
    let periods = f64::from(term_years * 12);
    Ok(amortizing_payment(principal, rate, periods))
}

pub(crate) fn amortizing_payment(principal: f64, rate: f64, periods: f64) -> f64 {
    if rate == 0.0 {
        return principal / periods;
    }
    let growth = (1.0 + rate).powf(periods);
    principal * rate * growth / (growth - 1.0)
}

/// Present value of `periods` equal payments discounted at `rate` per period.
pub(crate) fn annuity_present_value(payment: f64, rate: f64, periods: f64) -> f64 {
    if rate == 0.0 {
        return payment * periods;
    }
    payment * (1.0 - (1.0 + rate).powf(-periods)) / rate
}

/// Rows preallocated for a schedule; longer schedules grow on demand.
const MAX_SCHEDULE_HINT: u32 = MAX_TERM_YEARS * 12;

/// Month-by-month schedule, stopping at the first period the balance reaches zero.
pub fn build_amortization(
    principal: f64,
    monthly_rate: f64,
    monthly_payment: f64,
    number_of_payments: u32,
) -> Vec<AmortizationRow> {
    let mut schedule = Vec::with_capacity(number_of_payments.min(MAX_SCHEDULE_HINT) as usize);
    let mut balance = principal;

    for period in 1..=number_of_payments {
        let interest = balance * monthly_rate;
        let principal_portion = monthly_payment - interest;
        balance -= principal_portion;
        schedule.push(AmortizationRow {
            period,
            payment: monthly_payment,
            principal_portion,
            interest_portion: interest,
            ending_balance: balance.max(0.0),
        });
        if balance <= 0.0 {
            break;
        }
    }

    schedule
}

fn total_interest(rows: &[AmortizationRow]) -> f64 {
    rows.iter().map(|row| row.interest_portion).sum()
}

struct ExtraRun {
    rows: Vec<AmortizationRow>,
    payoff_period: u32,
    total_interest: f64,
}

fn run_with_extra(
    principal: f64,
    monthly_rate: f64,
    monthly_payment: f64,
    number_of_payments: u32,
    extra: f64,
) -> ExtraRun {
    let mut rows = Vec::with_capacity(number_of_payments.min(MAX_SCHEDULE_HINT) as usize);
    let mut balance = principal;
    let mut interest_paid = 0.0;
    let mut payoff_period = 0;

    for period in 1..=number_of_payments {
        if balance <= 0.0 {
            break;
        }
        let interest = balance * monthly_rate;
        let principal_portion = (monthly_payment - interest) + extra;
        balance -= principal_portion;
        interest_paid += interest;
        payoff_period = period;
        if balance <= 0.0 {
            balance = 0.0;
        }
        rows.push(AmortizationRow {
            period,
            payment: monthly_payment + extra,
            principal_portion,
            interest_portion: interest,
            ending_balance: balance,
        });
    }

    ExtraRun {
        rows,
        payoff_period,
        total_interest: interest_paid,
    }
}

/// Replays the schedule against its own balance with `extra` added to every
/// principal repayment.
///
/// `standard_interest` is the total interest of the schedule without extra
/// repayments; the savings are measured against it.
pub fn build_extra_payment_amortization(
    principal: f64,
    monthly_rate: f64,
    monthly_payment: f64,
    number_of_payments: u32,
    extra: f64,
    standard_interest: f64,
    frequency: Frequency,
) -> ExtraPaymentSchedule {
    let run = run_with_extra(
        principal,
        monthly_rate,
        monthly_payment,
        number_of_payments,
        extra,
    );
    let years_saved = f64::from(number_of_payments - run.payoff_period) / 12.0;
    trace!(
        payoff_period = run.payoff_period,
        years_saved, "extra repayment schedule complete"
    );

    ExtraPaymentSchedule {
        payoff_period: run.payoff_period,
        total_interest_with_extra: run.total_interest,
        interest_saved: standard_interest - run.total_interest,
        years_saved,
        new_term_years: f64::from(number_of_payments) / 12.0 - years_saved,
        display_extra: frequency.from_monthly(extra),
        rows: run.rows,
    }
}

/// Advisory nudge: what a fixed extra repayment would save on this loan.
pub fn suggest_extra_payment(loan: &LoanParameters) -> EngineResult<ExtraPaymentSuggestion> {
    let payment = compute_payment(loan.principal, loan.annual_rate_percent, loan.term_years)?;
    let rate = monthly_rate(loan.annual_rate_percent);
    let periods = loan.term_years * 12;

    let standard = build_amortization(loan.principal, rate, payment, periods);
    let outcome = build_extra_payment_amortization(
        loan.principal,
        rate,
        payment,
        periods,
        SUGGESTED_EXTRA_PAYMENT,
        total_interest(&standard),
        loan.frequency,
    );

    Ok(ExtraPaymentSuggestion {
        amount: outcome.display_extra,
        frequency: loan.frequency,
        years_saved: outcome.years_saved,
        interest_saved: outcome.interest_saved,
    })
}

pub fn analyze_loan(loan: &LoanParameters) -> EngineResult<LoanAnalysis> {
    ensure_non_negative("extraPerPeriod", loan.extra_per_period)?;
    let payment = compute_payment(loan.principal, loan.annual_rate_percent, loan.term_years)?;
    let rate = monthly_rate(loan.annual_rate_percent);
    let periods = loan.term_years * 12;

    let total_amount = payment * f64::from(periods);
    let schedule = build_amortization(loan.principal, rate, payment, periods);

    let (extra, suggestion) = if loan.extra_per_period > 0.0 {
        let outcome = build_extra_payment_amortization(
            loan.principal,
            rate,
            payment,
            periods,
            loan.extra_per_period,
            total_interest(&schedule),
            loan.frequency,
        );
        (Some(outcome), None)
    } else {
        (None, Some(suggest_extra_payment(loan)?))
    };

    Ok(LoanAnalysis {
        frequency: loan.frequency,
        monthly_payment: payment,
        display_payment: loan.frequency.from_monthly(payment),
        total_amount,
        total_interest: total_amount - loan.principal,
        schedule,
        extra,
        suggestion,
    })
}
