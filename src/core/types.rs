use serde::Serialize;

/// Weeks per month under the display convention used by every calculator.
pub const WEEKS_PER_MONTH: f64 = 52.0 / 12.0;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
    Weekly,
}

impl Frequency {
    /// Converts an amount entered at this frequency to its monthly equivalent.
    pub fn to_monthly(self, amount: f64) -> f64 {
        match self {
            Frequency::Monthly => amount,
            Frequency::Weekly => amount * WEEKS_PER_MONTH,
        }
    }

    /// Converts a monthly figure to this frequency for display only.
    pub fn from_monthly(self, amount: f64) -> f64 {
        match self {
            Frequency::Monthly => amount,
            Frequency::Weekly => amount / WEEKS_PER_MONTH,
        }
    }

    pub fn period_label(self) -> &'static str {
        match self {
            Frequency::Monthly => "month",
            Frequency::Weekly => "week",
        }
    }
}

pub fn percent_to_decimal(percent: f64) -> f64 {
    percent / 100.0
}

pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    percent_to_decimal(annual_rate_percent) / 12.0
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Buying,
    Renting,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    NoReturn,
    Savings,
    Etf,
    Super,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::NoReturn => "Under a Mattress",
            StrategyKind::Savings => "Savings Account",
            StrategyKind::Etf => "ETFs",
            StrategyKind::Super => "Superannuation",
        }
    }
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoanParameters {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_years: u32,
    /// Extra repayment, applied monthly in the schedule math.
    pub extra_per_period: f64,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub period: u32,
    pub payment: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub ending_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPaymentSchedule {
    pub rows: Vec<AmortizationRow>,
    pub payoff_period: u32,
    pub total_interest_with_extra: f64,
    pub interest_saved: f64,
    pub years_saved: f64,
    pub new_term_years: f64,
    pub display_extra: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPaymentSuggestion {
    pub amount: f64,
    pub frequency: Frequency,
    pub years_saved: f64,
    pub interest_saved: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanAnalysis {
    pub frequency: Frequency,
    pub monthly_payment: f64,
    pub display_payment: f64,
    pub total_amount: f64,
    pub total_interest: f64,
    pub schedule: Vec<AmortizationRow>,
    pub extra: Option<ExtraPaymentSchedule>,
    pub suggestion: Option<ExtraPaymentSuggestion>,
}

// ---------------------------------------------------------------------------
// Borrowing capacity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowingCapacityRow {
    pub term_years: u32,
    pub max_loan_amount: f64,
    pub total_paid: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowingCapacity {
    pub frequency: Frequency,
    pub monthly_payment: f64,
    pub rows: Vec<BorrowingCapacityRow>,
}

// ---------------------------------------------------------------------------
// Refinance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RefinanceInputs {
    pub outstanding: f64,
    pub current_rate_percent: f64,
    pub current_payment: f64,
    pub current_frequency: Frequency,
    pub new_rate_percent: f64,
    pub new_term_years: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentLoanProjection {
    pub monthly_payment: f64,
    pub periodic_payment: f64,
    pub remaining_payments: f64,
    pub remaining_years: f64,
    pub total_remaining: f64,
    pub remaining_interest: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoanProjection {
    pub monthly_payment: f64,
    pub periodic_payment: f64,
    pub term_years: u32,
    pub total_amount: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinanceDeltas {
    pub interest_savings: f64,
    pub payment_difference: f64,
    pub periodic_payment_difference: f64,
    pub time_difference: f64,
    pub total_savings: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinanceComparison {
    pub frequency: Frequency,
    pub current_loan: CurrentLoanProjection,
    pub new_loan: NewLoanProjection,
    pub comparison: RefinanceDeltas,
}

// ---------------------------------------------------------------------------
// Investment growth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentProjection {
    pub total_contributed: f64,
    pub simple_return: f64,
    pub total_with_simple_return: f64,
    pub compound_return: f64,
    pub future_value: f64,
    pub compound_advantage: f64,
    pub growth_multiplier: f64,
}

// ---------------------------------------------------------------------------
// Investment options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StrategyRates {
    pub savings_rate_percent: f64,
    pub etf_rate_percent: f64,
    pub super_rate_percent: f64,
}

#[derive(Debug, Clone)]
pub struct StrategyTaxRates {
    pub marginal_rate_percent: f64,
    /// Share of the marginal rate waived on ETF gains (50% CGT discount).
    pub cgt_discount_percent: f64,
    pub super_earnings_rate_percent: f64,
}

impl Default for StrategyTaxRates {
    fn default() -> Self {
        Self {
            marginal_rate_percent: 32.5,
            cgt_discount_percent: 50.0,
            super_earnings_rate_percent: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyGrowthPoint {
    pub year: u32,
    pub cumulative_contributions: f64,
    pub balance: f64,
    pub returns: f64,
    pub year_tax_paid: f64,
    pub cumulative_tax_paid: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub kind: StrategyKind,
    pub name: &'static str,
    pub annual_rate: f64,
    pub tax_rate: f64,
    pub total_contributed: f64,
    pub returns: f64,
    pub final_value: f64,
    pub tax_paid: f64,
    pub yearly: Vec<YearlyGrowthPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub monthly_contribution: f64,
    pub total_contributed: f64,
    pub strategies: Vec<StrategyResult>,
    pub best_index: usize,
    pub max_gain: f64,
}

// ---------------------------------------------------------------------------
// Buy vs rent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BuyVsRentInputs {
    pub property_price: f64,
    pub loan_term_years: u32,
    pub interest_rate_percent: f64,
    pub council_rates: f64,
    pub insurance: f64,
    pub maintenance: f64,
    pub weekly_rent: f64,
    pub rent_increase_percent: f64,
    pub property_growth_percent: f64,
    pub investment_amount: f64,
    pub investment_frequency: Frequency,
    pub investment_increase_percent: f64,
    pub investment_return_percent: f64,
    pub cpi_rate_percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyCostBreakdown {
    pub weekly_mortgage: f64,
    pub weekly_ownership_costs: f64,
    pub buying_weekly: f64,
    pub weekly_rent: f64,
    pub weekly_investment: f64,
    pub renting_weekly: f64,
    /// Extra weekly contribution a renter needs to match the buyer's outlay; zero when rent alone exceeds it.
    pub contribution_to_match: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyVsRentYearPoint {
    pub year: u32,
    pub buyer_cumulative_cash: f64,
    pub renter_cumulative_cash: f64,
    pub property_value: f64,
    pub investment_balance: f64,
    pub loan_balance: f64,
    pub buyer_monthly_outlay: f64,
    pub renter_monthly_outlay: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NominalSummary {
    pub total_interest_paid: f64,
    pub total_principal_paid: f64,
    pub total_ownership_costs: f64,
    pub total_housing_cost_buying: f64,
    pub total_cash_spent_buying: f64,
    pub final_property_value: f64,
    pub capital_gain: f64,
    pub total_rent_paid: f64,
    pub total_invested: f64,
    pub total_renter_cash_out: f64,
    pub investment_balance: f64,
    pub investment_gain: f64,
    pub buyer_net_position: f64,
    pub renter_net_position: f64,
    pub winner: Winner,
    pub advantage: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealSummary {
    pub cpi_multiplier: f64,
    pub property_value: f64,
    pub investment_balance: f64,
    pub buyer_net_position: f64,
    pub renter_net_position: f64,
    pub winner: Winner,
    pub advantage: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AfterTermOutlook {
    pub next_year_buying_cost: f64,
    pub next_year_rent_cost: f64,
    pub next_year_difference: f64,
    pub ten_year_savings: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyVsRentReport {
    pub monthly_mortgage_payment: f64,
    pub weekly_costs: WeeklyCostBreakdown,
    pub years: Vec<BuyVsRentYearPoint>,
    pub nominal: NominalSummary,
    pub real: RealSummary,
    /// Never true while both real positions share one CPI divisor, which keeps their order.
    pub winners_disagree: bool,
    pub after_term: AfterTermOutlook,
}

// ---------------------------------------------------------------------------
// Take-home pay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TakeHomeInputs {
    pub annual_salary: f64,
    pub includes_super: bool,
    pub pay_medicare_levy: bool,
    pub salary_sacrifice_percent: f64,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeHomeBreakdown {
    pub employer_salary: f64,
    pub super_rate: f64,
    pub super_amount: f64,
    pub gross_salary: f64,
    pub sacrifice_amount: f64,
    pub taxable_income: f64,
    pub bracket_from: f64,
    pub bracket_to: Option<f64>,
    pub bracket_rate: f64,
    pub income_tax: f64,
    pub medicare_levy: f64,
    pub total_tax: f64,
    pub tax_savings: f64,
    pub total_super: f64,
    pub take_home_annual: f64,
    pub take_home_monthly: f64,
    pub take_home_weekly: f64,
    pub take_home_periodic: f64,
    pub frequency: Frequency,
}
