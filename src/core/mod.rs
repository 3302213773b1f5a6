mod buy_vs_rent;
mod capacity;
mod error;
mod investment;
mod loan;
mod options;
mod refinance;
mod take_home;
mod types;

pub use buy_vs_rent::simulate_buy_vs_rent;
pub use capacity::{CAPACITY_TERMS, sweep_capacity};
pub use error::{EngineError, EngineResult, MAX_TERM_YEARS};
pub use investment::project_investment;
pub use loan::{
    SUGGESTED_EXTRA_PAYMENT, analyze_loan, build_amortization, build_extra_payment_amortization,
    compute_payment, suggest_extra_payment,
};
pub use options::{compare_strategies, simulate_yearly_growth};
pub use refinance::{compare_refinance, remaining_payments};
pub use take_home::{TaxBracket, TaxTable, TaxYear, compute_take_home};
pub use types::{
    AfterTermOutlook, AmortizationRow, BorrowingCapacity, BorrowingCapacityRow, BuyVsRentInputs,
    BuyVsRentReport, BuyVsRentYearPoint, CurrentLoanProjection, ExtraPaymentSchedule,
    ExtraPaymentSuggestion, Frequency, InvestmentProjection, LoanAnalysis, LoanParameters,
    NewLoanProjection, NominalSummary, RealSummary, RefinanceComparison, RefinanceDeltas,
    RefinanceInputs, StrategyComparison, StrategyKind, StrategyRates, StrategyResult,
    StrategyTaxRates, TakeHomeBreakdown, TakeHomeInputs, WEEKS_PER_MONTH, WeeklyCostBreakdown,
    Winner, YearlyGrowthPoint, monthly_rate, percent_to_decimal,
};
