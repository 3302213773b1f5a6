use tracing::trace;

use super::error::{
    EngineResult, ensure_growth_rate, ensure_non_negative, ensure_positive, ensure_years,
};
use super::loan::amortizing_payment;
use super::types::{
    AfterTermOutlook, BuyVsRentInputs, BuyVsRentReport, BuyVsRentYearPoint, Frequency,
    NominalSummary, RealSummary, WEEKS_PER_MONTH, WeeklyCostBreakdown, Winner, monthly_rate,
    percent_to_decimal,
};

fn pick_winner(buyer: f64, renter: f64) -> Winner {
    if buyer > renter {
        Winner::Buying
    } else {
        Winner::Renting
    }
}

fn validate(inputs: &BuyVsRentInputs) -> EngineResult<()> {
    ensure_positive("propertyPrice", inputs.property_price)?;
    ensure_years("loanTermYears", inputs.loan_term_years)?;
    ensure_non_negative("interestRatePercent", inputs.interest_rate_percent)?;
    ensure_non_negative("councilRates", inputs.council_rates)?;
    ensure_non_negative("insurance", inputs.insurance)?;
    ensure_non_negative("maintenance", inputs.maintenance)?;
    ensure_non_negative("weeklyRent", inputs.weekly_rent)?;
    ensure_non_negative("investmentAmount", inputs.investment_amount)?;
    ensure_growth_rate("rentIncreasePercent", inputs.rent_increase_percent)?;
    ensure_growth_rate("propertyGrowthPercent", inputs.property_growth_percent)?;
    ensure_growth_rate("investmentIncreasePercent", inputs.investment_increase_percent)?;
    ensure_growth_rate("investmentReturnPercent", inputs.investment_return_percent)?;
    ensure_growth_rate("cpiRatePercent", inputs.cpi_rate_percent)?;
    Ok(())
}

fn weekly_investment(inputs: &BuyVsRentInputs) -> f64 {
    match inputs.investment_frequency {
        Frequency::Weekly => inputs.investment_amount,
        Frequency::Monthly => inputs.investment_amount / WEEKS_PER_MONTH,
    }
}

/// Simulates owning the property outright on a full-price loan against renting
/// and investing the difference, year by year over the loan term.
pub fn simulate_buy_vs_rent(inputs: &BuyVsRentInputs) -> EngineResult<BuyVsRentReport> {
    validate(inputs)?;

    let term = inputs.loan_term_years;
    let rate = monthly_rate(inputs.interest_rate_percent);
    let monthly_payment =
        amortizing_payment(inputs.property_price, rate, f64::from(term * 12));
    let annual_mortgage = monthly_payment * 12.0;
    let ownership_costs = inputs.council_rates + inputs.insurance + inputs.maintenance;

    let rent_increase = percent_to_decimal(inputs.rent_increase_percent);
    let property_growth = percent_to_decimal(inputs.property_growth_percent);
    let investment_increase = percent_to_decimal(inputs.investment_increase_percent);
    let investment_return = percent_to_decimal(inputs.investment_return_percent);

    let weekly_invest = weekly_investment(inputs);
    let weekly_mortgage = monthly_payment / WEEKS_PER_MONTH;
    let weekly_ownership_costs = ownership_costs / 52.0;
    let buying_weekly = weekly_mortgage + weekly_ownership_costs;
    let weekly_costs = WeeklyCostBreakdown {
        weekly_mortgage,
        weekly_ownership_costs,
        buying_weekly,
        weekly_rent: inputs.weekly_rent,
        weekly_investment: weekly_invest,
        renting_weekly: inputs.weekly_rent + weekly_invest,
        contribution_to_match: (buying_weekly - inputs.weekly_rent).max(0.0),
    };

    let mut loan_balance = inputs.property_price;
    let mut property_value = inputs.property_price;
    let mut current_rent = inputs.weekly_rent * 52.0;
    let mut current_investment = weekly_invest * 52.0;
    let mut investment_balance = 0.0;

    let mut total_interest = 0.0;
    let mut total_principal = 0.0;
    let mut total_ownership = 0.0;
    let mut buyer_cash = 0.0;
    let mut total_rent = 0.0;
    let mut total_invested = 0.0;

    let mut years = Vec::with_capacity(term as usize);
    for year in 1..=term {
        for _ in 0..12 {
            let interest = loan_balance * rate;
            let principal = monthly_payment - interest;
            total_interest += interest;
            total_principal += principal;
            loan_balance -= principal;
        }
        total_ownership += ownership_costs;
        buyer_cash += annual_mortgage + ownership_costs;
        property_value *= 1.0 + property_growth;

        total_rent += current_rent;
        total_invested += current_investment;
        investment_balance = (investment_balance + current_investment) * (1.0 + investment_return);

        years.push(BuyVsRentYearPoint {
            year,
            buyer_cumulative_cash: buyer_cash,
            renter_cumulative_cash: total_rent + total_invested,
            property_value,
            investment_balance,
            loan_balance: loan_balance.max(0.0),
            buyer_monthly_outlay: (annual_mortgage + ownership_costs) / 12.0,
            renter_monthly_outlay: (current_rent + current_investment) / 12.0,
        });
        trace!(year, property_value, investment_balance, "buy vs rent year");

        current_rent *= 1.0 + rent_increase;
        current_investment *= 1.0 + investment_increase;
    }

    let total_housing_cost = total_interest + total_ownership;
    let buyer_net = property_value - total_housing_cost;
    let renter_net = investment_balance - total_rent;
    let winner = pick_winner(buyer_net, renter_net);

    let nominal = NominalSummary {
        total_interest_paid: total_interest,
        total_principal_paid: total_principal,
        total_ownership_costs: total_ownership,
        total_housing_cost_buying: total_housing_cost,
        total_cash_spent_buying: buyer_cash,
        final_property_value: property_value,
        capital_gain: property_value - inputs.property_price,
        total_rent_paid: total_rent,
        total_invested,
        total_renter_cash_out: total_rent + total_invested,
        investment_balance,
        investment_gain: investment_balance - total_invested,
        buyer_net_position: buyer_net,
        renter_net_position: renter_net,
        winner,
        advantage: (buyer_net - renter_net).abs(),
    };

    let cpi_multiplier = (1.0 + percent_to_decimal(inputs.cpi_rate_percent)).powf(f64::from(term));
    let real_buyer = buyer_net / cpi_multiplier;
    let real_renter = renter_net / cpi_multiplier;
    let real = RealSummary {
        cpi_multiplier,
        property_value: property_value / cpi_multiplier,
        investment_balance: investment_balance / cpi_multiplier,
        buyer_net_position: real_buyer,
        renter_net_position: real_renter,
        winner: pick_winner(real_buyer, real_renter),
        advantage: (real_buyer - real_renter).abs(),
    };

    let next_year_rent_cost =
        inputs.weekly_rent * 52.0 * (1.0 + rent_increase).powf(f64::from(term));
    let next_year_difference = next_year_rent_cost - ownership_costs;

    Ok(BuyVsRentReport {
        monthly_mortgage_payment: monthly_payment,
        weekly_costs,
        years,
        winners_disagree: nominal.winner != real.winner,
        nominal,
        real,
        after_term: AfterTermOutlook {
            next_year_buying_cost: ownership_costs,
            next_year_rent_cost,
            next_year_difference,
            ten_year_savings: next_year_difference * 10.0,
        },
    })
}
