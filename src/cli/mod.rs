use std::fmt::Write as _;
use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, DEFAULT_HOST, DEFAULT_PORT, load_tax_table};
use crate::core::{
    BorrowingCapacity, BuyVsRentInputs, BuyVsRentReport, EngineError, Frequency,
    InvestmentProjection, LoanAnalysis, LoanParameters, RefinanceComparison, RefinanceInputs,
    StrategyComparison, StrategyRates, StrategyTaxRates, TakeHomeBreakdown, TakeHomeInputs,
    Winner, analyze_loan, compare_refinance, compare_strategies, compute_take_home,
    project_investment, simulate_buy_vs_rent, sweep_capacity,
};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum CliFrequency {
    #[default]
    Monthly,
    Weekly,
}

impl From<CliFrequency> for Frequency {
    fn from(value: CliFrequency) -> Self {
        match value {
            CliFrequency::Monthly => Frequency::Monthly,
            CliFrequency::Weekly => Frequency::Weekly,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "finance-tools",
    about = "Personal finance calculators: home loans, borrowing capacity, refinancing, investing, buy vs rent and take-home pay"
)]
pub struct Cli {
    /// Print the full result as pretty JSON instead of a summary.
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP JSON API.
    Serve(ServeArgs),
    /// Repayments, amortization schedule and extra repayment savings.
    Loan(LoanArgs),
    /// Largest loan a repayment supports across standard terms.
    Capacity(CapacityArgs),
    /// Compare an existing loan against refinancing.
    Refinance(RefinanceArgs),
    /// Simple versus compound growth of a monthly contribution.
    Invest(InvestArgs),
    /// Compare savings, ETFs and super against holding cash.
    Options(OptionsArgs),
    /// Buying a home versus renting and investing the difference.
    BuyVsRent(BuyVsRentArgs),
    /// Income tax, Medicare levy, super and take-home pay.
    TakeHome(TakeHomeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "FINANCE_TOOLS_HOST", default_value = DEFAULT_HOST)]
    pub host: IpAddr,
    #[arg(long, env = "FINANCE_TOOLS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// JSON tax table to use instead of the bundled one.
    #[arg(long)]
    pub tax_table: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct LoanArgs {
    #[arg(long)]
    pub principal: f64,
    #[arg(long, help = "Annual interest rate in percent, e.g. 5.5")]
    pub rate: f64,
    #[arg(long, default_value_t = 30)]
    pub years: u32,
    #[arg(long, default_value_t = 0.0, help = "Extra repayment per period")]
    pub extra: f64,
    #[arg(long, value_enum, default_value_t = CliFrequency::Monthly)]
    pub frequency: CliFrequency,
}

impl LoanArgs {
    pub fn to_parameters(&self) -> LoanParameters {
        LoanParameters {
            principal: self.principal,
            annual_rate_percent: self.rate,
            term_years: self.years,
            extra_per_period: self.extra,
            frequency: self.frequency.into(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CapacityArgs {
    #[arg(long, help = "Repayment per period")]
    pub payment: f64,
    #[arg(long)]
    pub rate: f64,
    #[arg(long, value_enum, default_value_t = CliFrequency::Monthly)]
    pub frequency: CliFrequency,
}

#[derive(Args, Debug, Clone)]
pub struct RefinanceArgs {
    #[arg(long)]
    pub outstanding: f64,
    #[arg(long)]
    pub current_rate: f64,
    #[arg(long, help = "Current repayment per period")]
    pub current_payment: f64,
    #[arg(long, value_enum, default_value_t = CliFrequency::Monthly)]
    pub frequency: CliFrequency,
    #[arg(long)]
    pub new_rate: f64,
    #[arg(long, default_value_t = 30)]
    pub new_years: u32,
}

impl RefinanceArgs {
    pub fn to_inputs(&self) -> RefinanceInputs {
        RefinanceInputs {
            outstanding: self.outstanding,
            current_rate_percent: self.current_rate,
            current_payment: self.current_payment,
            current_frequency: self.frequency.into(),
            new_rate_percent: self.new_rate,
            new_term_years: self.new_years,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InvestArgs {
    #[arg(long, default_value_t = 100.0)]
    pub monthly: f64,
    #[arg(long, default_value_t = 30)]
    pub years: u32,
    #[arg(long, default_value_t = 4.0)]
    pub rate: f64,
}

#[derive(Args, Debug, Clone)]
pub struct OptionsArgs {
    #[arg(long)]
    pub amount: f64,
    #[arg(long, value_enum, default_value_t = CliFrequency::Monthly)]
    pub frequency: CliFrequency,
    #[arg(long, default_value_t = 20)]
    pub years: u32,
    #[arg(long, default_value_t = 4.5)]
    pub savings_rate: f64,
    #[arg(long, default_value_t = 8.0)]
    pub etf_rate: f64,
    #[arg(long, default_value_t = 7.0)]
    pub super_rate: f64,
    #[arg(long, default_value_t = 32.5)]
    pub marginal_tax_rate: f64,
    #[arg(long, default_value_t = 50.0)]
    pub cgt_discount: f64,
    #[arg(long, default_value_t = 15.0)]
    pub super_tax_rate: f64,
}

impl OptionsArgs {
    pub fn rates(&self) -> StrategyRates {
        StrategyRates {
            savings_rate_percent: self.savings_rate,
            etf_rate_percent: self.etf_rate,
            super_rate_percent: self.super_rate,
        }
    }

    pub fn tax_rates(&self) -> StrategyTaxRates {
        StrategyTaxRates {
            marginal_rate_percent: self.marginal_tax_rate,
            cgt_discount_percent: self.cgt_discount,
            super_earnings_rate_percent: self.super_tax_rate,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BuyVsRentArgs {
    #[arg(long)]
    pub property_price: f64,
    #[arg(long, default_value_t = 30)]
    pub years: u32,
    #[arg(long)]
    pub rate: f64,
    #[arg(long, default_value_t = 2_000.0, help = "Annual council rates")]
    pub council_rates: f64,
    #[arg(long, default_value_t = 1_500.0, help = "Annual insurance")]
    pub insurance: f64,
    #[arg(long, default_value_t = 3_000.0, help = "Annual maintenance")]
    pub maintenance: f64,
    #[arg(long)]
    pub weekly_rent: f64,
    #[arg(long, default_value_t = 3.0)]
    pub rent_increase: f64,
    #[arg(long, default_value_t = 5.0)]
    pub property_growth: f64,
    #[arg(long, default_value_t = 0.0)]
    pub invest: f64,
    #[arg(long, value_enum, default_value_t = CliFrequency::Weekly)]
    pub invest_frequency: CliFrequency,
    #[arg(long, default_value_t = 3.0)]
    pub invest_increase: f64,
    #[arg(long, default_value_t = 7.0)]
    pub invest_return: f64,
    #[arg(long, default_value_t = 2.5)]
    pub cpi: f64,
}

impl BuyVsRentArgs {
    pub fn to_inputs(&self) -> BuyVsRentInputs {
        BuyVsRentInputs {
            property_price: self.property_price,
            loan_term_years: self.years,
            interest_rate_percent: self.rate,
            council_rates: self.council_rates,
            insurance: self.insurance,
            maintenance: self.maintenance,
            weekly_rent: self.weekly_rent,
            rent_increase_percent: self.rent_increase,
            property_growth_percent: self.property_growth,
            investment_amount: self.invest,
            investment_frequency: self.invest_frequency.into(),
            investment_increase_percent: self.invest_increase,
            investment_return_percent: self.invest_return,
            cpi_rate_percent: self.cpi,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TakeHomeArgs {
    #[arg(long)]
    pub salary: f64,
    /// The salary figure already includes employer super.
    #[arg(long)]
    pub includes_super: bool,
    #[arg(long)]
    pub no_medicare_levy: bool,
    #[arg(long, default_value_t = 0.0, help = "Salary sacrifice in percent of gross")]
    pub sacrifice: f64,
    #[arg(long, value_enum, default_value_t = CliFrequency::Monthly)]
    pub frequency: CliFrequency,
    /// Financial year such as 2024-25; defaults to the latest in the table.
    #[arg(long)]
    pub tax_year: Option<String>,
    #[arg(long)]
    pub tax_table: Option<PathBuf>,
}

impl TakeHomeArgs {
    pub fn to_inputs(&self) -> TakeHomeInputs {
        TakeHomeInputs {
            annual_salary: self.salary,
            includes_super: self.includes_super,
            pay_medicare_levy: !self.no_medicare_levy,
            salary_sacrifice_percent: self.sacrifice,
            frequency: self.frequency.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode result as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`serve` starts the HTTP server and has no calculator output")]
    NotACalculator,
}

/// Runs a calculator subcommand and returns the text to print on stdout.
///
/// `serve` needs the async runtime and is handled by the caller; passing it
/// here returns [`CliError::NotACalculator`].
pub fn run_calculator(command: &Command, json: bool) -> Result<String, CliError> {
    match command {
        Command::Serve(_) => Err(CliError::NotACalculator),
        Command::Loan(args) => {
            let analysis = analyze_loan(&args.to_parameters())?;
            debug!(payment = analysis.monthly_payment, "loan analysed");
            render(json, &analysis, loan_summary)
        }
        Command::Capacity(args) => {
            let capacity = sweep_capacity(args.payment, args.rate, args.frequency.into())?;
            render(json, &capacity, capacity_summary)
        }
        Command::Refinance(args) => {
            let comparison = compare_refinance(&args.to_inputs())?;
            render(json, &comparison, refinance_summary)
        }
        Command::Invest(args) => {
            let projection = project_investment(args.monthly, args.years, args.rate)?;
            render(json, &projection, investment_summary)
        }
        Command::Options(args) => {
            let comparison = compare_strategies(
                args.amount,
                args.frequency.into(),
                args.years,
                &args.rates(),
                &args.tax_rates(),
            )?;
            render(json, &comparison, options_summary)
        }
        Command::BuyVsRent(args) => {
            let report = simulate_buy_vs_rent(&args.to_inputs())?;
            render(json, &report, buy_vs_rent_summary)
        }
        Command::TakeHome(args) => {
            let table = load_tax_table(args.tax_table.as_deref())?;
            let label = match args.tax_year.as_deref().or_else(|| table.latest_year()) {
                Some(label) => label.to_string(),
                None => return Err(EngineError::UnknownTaxYear(String::new()).into()),
            };
            info!(tax_year = %label, "computing take-home pay");
            let breakdown = compute_take_home(&args.to_inputs(), table.year(&label)?)?;
            render(json, &breakdown, |b| take_home_summary(&label, b))
        }
    }
}

fn render<T: Serialize>(json: bool, value: &T, summary: impl Fn(&T) -> String) -> Result<String, CliError> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(summary(value))
    }
}

/// Formats an amount rounded to whole currency units, e.g. `$1,234` or `-$56`.
pub fn round_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn winner_label(winner: Winner) -> &'static str {
    match winner {
        Winner::Buying => "buying",
        Winner::Renting => "renting",
    }
}

fn loan_summary(analysis: &LoanAnalysis) -> String {
    let period = analysis.frequency.period_label();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Repayment: {} per {period}",
        round_currency(analysis.display_payment)
    );
    let _ = writeln!(out, "Total repaid: {}", round_currency(analysis.total_amount));
    let _ = writeln!(out, "Total interest: {}", round_currency(analysis.total_interest));
    if let Some(extra) = &analysis.extra {
        let _ = writeln!(
            out,
            "With {} extra per {period}: paid off in {:.1} years, saving {} interest and {:.1} years",
            round_currency(extra.display_extra),
            extra.new_term_years,
            round_currency(extra.interest_saved),
            extra.years_saved
        );
    }
    if let Some(suggestion) = &analysis.suggestion {
        let _ = writeln!(
            out,
            "Tip: an extra {} per {} saves {} interest and {:.1} years",
            round_currency(suggestion.amount),
            suggestion.frequency.period_label(),
            round_currency(suggestion.interest_saved),
            suggestion.years_saved
        );
    }
    out
}

fn capacity_summary(capacity: &BorrowingCapacity) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Borrowing capacity at {} per month",
        round_currency(capacity.monthly_payment)
    );
    for row in &capacity.rows {
        let _ = writeln!(
            out,
            "{:>3} years  {:>12}  interest {:>12}",
            row.term_years,
            round_currency(row.max_loan_amount),
            round_currency(row.total_interest)
        );
    }
    out
}

fn refinance_summary(result: &RefinanceComparison) -> String {
    let period = result.frequency.period_label();
    let delta = &result.comparison;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Current loan: {} per {period}, {:.1} years remaining, {} interest to go",
        round_currency(result.current_loan.periodic_payment),
        result.current_loan.remaining_years,
        round_currency(result.current_loan.remaining_interest)
    );
    let _ = writeln!(
        out,
        "New loan: {} per {period} over {} years, {} interest",
        round_currency(result.new_loan.periodic_payment),
        result.new_loan.term_years,
        round_currency(result.new_loan.total_interest)
    );
    let _ = writeln!(out, "Interest savings: {}", round_currency(delta.interest_savings));
    let _ = writeln!(
        out,
        "Payment change: {} per {period}",
        round_currency(delta.periodic_payment_difference)
    );
    let _ = writeln!(out, "Term change: {:+.1} years", delta.time_difference);
    out
}

fn investment_summary(projection: &InvestmentProjection) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Contributed: {}", round_currency(projection.total_contributed));
    let _ = writeln!(out, "Simple return: {}", round_currency(projection.simple_return));
    let _ = writeln!(
        out,
        "Compound return: {} (future value {})",
        round_currency(projection.compound_return),
        round_currency(projection.future_value)
    );
    let _ = writeln!(
        out,
        "Compounding advantage: {}",
        round_currency(projection.compound_advantage)
    );
    out
}

fn options_summary(comparison: &StrategyComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Contributed: {}",
        round_currency(comparison.total_contributed)
    );
    for strategy in &comparison.strategies {
        let _ = writeln!(
            out,
            "{:<18} {:>12}  tax {:>10}",
            strategy.name,
            round_currency(strategy.final_value),
            round_currency(strategy.tax_paid)
        );
    }
    let best = &comparison.strategies[comparison.best_index];
    let _ = writeln!(
        out,
        "Best: {}, {} ahead of cash",
        best.name,
        round_currency(comparison.max_gain)
    );
    out
}

fn buy_vs_rent_summary(report: &BuyVsRentReport) -> String {
    let nominal = &report.nominal;
    let real = &report.real;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Mortgage: {} per month",
        round_currency(report.monthly_mortgage_payment)
    );
    let _ = writeln!(
        out,
        "Buyer net position: {}  Renter net position: {}",
        round_currency(nominal.buyer_net_position),
        round_currency(nominal.renter_net_position)
    );
    let _ = writeln!(
        out,
        "Winner: {} by {}",
        winner_label(nominal.winner),
        round_currency(nominal.advantage)
    );
    let _ = writeln!(
        out,
        "In today's dollars: {} by {}",
        winner_label(real.winner),
        round_currency(real.advantage)
    );
    if report.winners_disagree {
        let _ = writeln!(out, "Warning: the winner changes after adjusting for inflation");
    }
    out
}

fn take_home_summary(tax_year: &str, breakdown: &TakeHomeBreakdown) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Tax year: {tax_year}");
    let _ = writeln!(
        out,
        "Take-home: {} per year, {} per {}",
        round_currency(breakdown.take_home_annual),
        round_currency(breakdown.take_home_periodic),
        breakdown.frequency.period_label()
    );
    let _ = writeln!(
        out,
        "Income tax: {}  Medicare levy: {}",
        round_currency(breakdown.income_tax),
        round_currency(breakdown.medicare_levy)
    );
    let _ = writeln!(out, "Super: {}", round_currency(breakdown.total_super));
    if breakdown.sacrifice_amount > 0.0 {
        let _ = writeln!(
            out,
            "Salary sacrifice of {} saves {} in tax",
            round_currency(breakdown.sacrifice_amount),
            round_currency(breakdown.tax_savings)
        );
    }
    out
}
