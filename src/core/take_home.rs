use std::collections::BTreeMap;

use serde::Deserialize;

use super::error::{EngineError, EngineResult, ensure_percent, ensure_positive};
use super::types::{Frequency, TakeHomeBreakdown, TakeHomeInputs, percent_to_decimal};

/// Upper bounds at or beyond this value mark the open-ended top bracket.
const UNBOUNDED_SENTINEL: f64 = 999_999_999_999.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxBracket {
    pub from_range: f64,
    /// `-1` or `999999999999` for the top bracket.
    pub to_range: f64,
    pub base: f64,
    pub over: f64,
    pub c: f64,
}

impl TaxBracket {
    pub fn is_unbounded(&self) -> bool {
        self.to_range == -1.0 || self.to_range >= UNBOUNDED_SENTINEL
    }

    pub fn upper_bound(&self) -> Option<f64> {
        (!self.is_unbounded()).then_some(self.to_range)
    }

    fn covers(&self, income: f64) -> bool {
        income >= self.from_range && (self.is_unbounded() || income <= self.to_range)
    }

    fn tax_on(&self, income: f64) -> f64 {
        self.base + (income - self.over).max(0.0) * self.c
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxYear {
    pub brackets: Vec<TaxBracket>,
    /// Superannuation guarantee as a decimal fraction.
    pub super_rate: f64,
    pub medicare_levy_rate: f64,
}

impl TaxYear {
    /// First bracket covering `income`, in table order.
    pub fn bracket_for(&self, income: f64) -> EngineResult<&TaxBracket> {
        self.brackets
            .iter()
            .find(|bracket| bracket.covers(income))
            .ok_or(EngineError::NoTaxBracket { income })
    }

    fn income_tax(&self, income: f64) -> EngineResult<f64> {
        Ok(self.bracket_for(income)?.tax_on(income))
    }
}

/// Income tax tables keyed by financial year label, e.g. `2024-25`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TaxTable(BTreeMap<String, TaxYear>);

impl TaxTable {
    pub fn year(&self, label: &str) -> EngineResult<&TaxYear> {
        self.0
            .get(label)
            .ok_or_else(|| EngineError::UnknownTaxYear(label.to_string()))
    }

    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Most recent year by label order.
    pub fn latest_year(&self) -> Option<&str> {
        self.0.keys().next_back().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn compute_take_home(inputs: &TakeHomeInputs, year: &TaxYear) -> EngineResult<TakeHomeBreakdown> {
    ensure_positive("annualSalary", inputs.annual_salary)?;
    ensure_percent("salarySacrificePercent", inputs.salary_sacrifice_percent)?;

    let employer_salary = inputs.annual_salary;
    let (super_amount, gross_salary) = if inputs.includes_super {
        let super_amount = employer_salary * year.super_rate / (1.0 + year.super_rate);
        (super_amount, employer_salary - super_amount)
    } else {
        (0.0, employer_salary)
    };

    let sacrifice_amount = gross_salary * percent_to_decimal(inputs.salary_sacrifice_percent);
    let taxable_income = gross_salary - sacrifice_amount;

    let bracket = year.bracket_for(taxable_income)?;
    let income_tax = bracket.tax_on(taxable_income);
    let levy_rate = if inputs.pay_medicare_levy {
        year.medicare_levy_rate
    } else {
        0.0
    };
    let medicare_levy = taxable_income * levy_rate;
    let total_tax = income_tax + medicare_levy;

    let tax_without_sacrifice = year.income_tax(gross_salary)? + gross_salary * levy_rate;
    let take_home_annual = taxable_income - total_tax;
    let take_home_monthly = take_home_annual / 12.0;
    let take_home_weekly = take_home_annual / 52.0;

    Ok(TakeHomeBreakdown {
        employer_salary,
        super_rate: year.super_rate,
        super_amount,
        gross_salary,
        sacrifice_amount,
        taxable_income,
        bracket_from: bracket.from_range,
        bracket_to: bracket.upper_bound(),
        bracket_rate: bracket.c,
        income_tax,
        medicare_levy,
        total_tax,
        tax_savings: tax_without_sacrifice - total_tax,
        total_super: super_amount + sacrifice_amount,
        take_home_annual,
        take_home_monthly,
        take_home_weekly,
        take_home_periodic: match inputs.frequency {
            Frequency::Monthly => take_home_monthly,
            Frequency::Weekly => take_home_weekly,
        },
        frequency: inputs.frequency,
    })
}
