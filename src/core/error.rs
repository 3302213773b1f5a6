use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error(
        "Non-amortizing payment: {payment:.2} per month does not cover {interest:.2} of monthly interest"
    )]
    NonAmortizingPayment { payment: f64, interest: f64 },

    #[error("Unknown tax year: {0}")]
    UnknownTaxYear(String),

    #[error("No tax bracket covers a taxable income of {income:.2}")]
    NoTaxBracket { income: f64 },
}

pub type EngineResult<T> = Result<T, EngineError>;

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> EngineResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::InvalidInput {
            field,
            reason: format!("must be a finite number > 0 (got {value})"),
        });
    }
    Ok(value)
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> EngineResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidInput {
            field,
            reason: format!("must be a finite number >= 0 (got {value})"),
        });
    }
    Ok(value)
}

/// Growth and escalation rates may be negative but never at or below -100%.
pub(crate) fn ensure_growth_rate(field: &'static str, percent: f64) -> EngineResult<f64> {
    if !percent.is_finite() || percent <= -100.0 {
        return Err(EngineError::InvalidInput {
            field,
            reason: format!("must be a finite percentage > -100 (got {percent})"),
        });
    }
    Ok(percent)
}

/// A rate that must lie within 0..=100 percent, such as a tax rate.
pub(crate) fn ensure_percent(field: &'static str, percent: f64) -> EngineResult<f64> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(EngineError::InvalidInput {
            field,
            reason: format!("must be between 0 and 100 (got {percent})"),
        });
    }
    Ok(percent)
}

/// Longest term any calculator accepts, in whole years.
pub const MAX_TERM_YEARS: u32 = 100;

pub(crate) fn ensure_years(field: &'static str, years: u32) -> EngineResult<u32> {
    if years == 0 {
        return Err(EngineError::InvalidInput {
            field,
            reason: "must be at least 1 year".to_string(),
        });
    }
    if years > MAX_TERM_YEARS {
        return Err(EngineError::InvalidInput {
            field,
            reason: format!("must be at most {MAX_TERM_YEARS} years (got {years})"),
        });
    }
    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_accept_the_full_supported_range() {
        assert_eq!(ensure_years("years", 1), Ok(1));
        assert_eq!(ensure_years("years", MAX_TERM_YEARS), Ok(MAX_TERM_YEARS));
    }

    #[test]
    fn years_beyond_the_cap_are_invalid_input() {
        for years in [MAX_TERM_YEARS + 1, u32::MAX / 12 + 1, u32::MAX] {
            match ensure_years("termYears", years) {
                Err(EngineError::InvalidInput { field, reason }) => {
                    assert_eq!(field, "termYears");
                    assert!(reason.contains("at most 100 years"), "{reason}");
                }
                other => panic!("expected InvalidInput for {years}, got {other:?}"),
            }
        }
    }
}
