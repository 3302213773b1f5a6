use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::cli::{
    BuyVsRentArgs, CapacityArgs, CliFrequency, InvestArgs, LoanArgs, OptionsArgs, RefinanceArgs,
    TakeHomeArgs,
};
use crate::config::AppConfig;
use crate::core::{
    EngineError, TaxTable, analyze_loan, compare_refinance, compare_strategies, compute_take_home,
    project_investment, simulate_buy_vs_rent, sweep_capacity,
};

/// Shared, read-only state handed to every request.
#[derive(Debug)]
pub struct AppState {
    pub tax_table: TaxTable,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiFrequency {
    Monthly,
    Weekly,
}

impl From<ApiFrequency> for CliFrequency {
    fn from(value: ApiFrequency) -> Self {
        match value {
            ApiFrequency::Monthly => CliFrequency::Monthly,
            ApiFrequency::Weekly => CliFrequency::Weekly,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LoanPayload {
    principal: Option<f64>,
    annual_rate: Option<f64>,
    term_years: Option<u32>,
    extra_payment: Option<f64>,
    frequency: Option<ApiFrequency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CapacityPayload {
    payment: Option<f64>,
    annual_rate: Option<f64>,
    frequency: Option<ApiFrequency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RefinancePayload {
    outstanding: Option<f64>,
    current_rate: Option<f64>,
    current_payment: Option<f64>,
    frequency: Option<ApiFrequency>,
    new_rate: Option<f64>,
    new_term_years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InvestmentPayload {
    monthly_contribution: Option<f64>,
    years: Option<u32>,
    annual_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OptionsPayload {
    amount: Option<f64>,
    frequency: Option<ApiFrequency>,
    years: Option<u32>,
    savings_rate: Option<f64>,
    etf_rate: Option<f64>,
    super_rate: Option<f64>,
    marginal_tax_rate: Option<f64>,
    cgt_discount: Option<f64>,
    super_tax_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BuyVsRentPayload {
    property_price: Option<f64>,
    loan_term_years: Option<u32>,
    interest_rate: Option<f64>,
    council_rates: Option<f64>,
    insurance: Option<f64>,
    maintenance: Option<f64>,
    weekly_rent: Option<f64>,
    rent_increase: Option<f64>,
    property_growth: Option<f64>,
    investment_amount: Option<f64>,
    investment_frequency: Option<ApiFrequency>,
    investment_increase: Option<f64>,
    investment_return: Option<f64>,
    cpi_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TakeHomePayload {
    annual_salary: Option<f64>,
    includes_super: Option<bool>,
    medicare_levy: Option<bool>,
    salary_sacrifice: Option<f64>,
    frequency: Option<ApiFrequency>,
    tax_year: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct TaxYearsResponse<'a> {
    years: Vec<&'a str>,
    latest: Option<&'a str>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/tax-years", get(tax_years_handler))
        .route("/api/loan", get(loan_get_handler).post(loan_post_handler))
        .route(
            "/api/capacity",
            get(capacity_get_handler).post(capacity_post_handler),
        )
        .route(
            "/api/refinance",
            get(refinance_get_handler).post(refinance_post_handler),
        )
        .route(
            "/api/investment",
            get(investment_get_handler).post(investment_post_handler),
        )
        .route(
            "/api/investment-options",
            get(options_get_handler).post(options_post_handler),
        )
        .route(
            "/api/buy-vs-rent",
            get(buy_vs_rent_get_handler).post(buy_vs_rent_post_handler),
        )
        .route(
            "/api/take-home",
            get(take_home_get_handler).post(take_home_post_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(config: AppConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let state = Arc::new(AppState {
        tax_table: config.tax_table,
    });
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "finance-tools HTTP API listening");
    info!("Local access: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn tax_years_handler(State(state): State<Arc<AppState>>) -> Response {
    json_response(
        StatusCode::OK,
        TaxYearsResponse {
            years: state.tax_table.years().collect(),
            latest: state.tax_table.latest_year(),
        },
    )
}

async fn loan_get_handler(Query(payload): Query<LoanPayload>) -> Response {
    loan_handler_impl(payload)
}

async fn loan_post_handler(Json(payload): Json<LoanPayload>) -> Response {
    loan_handler_impl(payload)
}

fn loan_handler_impl(payload: LoanPayload) -> Response {
    let args = loan_args_from_payload(payload);
    debug!(principal = args.principal, rate = args.rate, "loan request");
    engine_response(analyze_loan(&args.to_parameters()))
}

async fn capacity_get_handler(Query(payload): Query<CapacityPayload>) -> Response {
    capacity_handler_impl(payload)
}

async fn capacity_post_handler(Json(payload): Json<CapacityPayload>) -> Response {
    capacity_handler_impl(payload)
}

fn capacity_handler_impl(payload: CapacityPayload) -> Response {
    let args = capacity_args_from_payload(payload);
    debug!(payment = args.payment, rate = args.rate, "capacity request");
    engine_response(sweep_capacity(args.payment, args.rate, args.frequency.into()))
}

async fn refinance_get_handler(Query(payload): Query<RefinancePayload>) -> Response {
    refinance_handler_impl(payload)
}

async fn refinance_post_handler(Json(payload): Json<RefinancePayload>) -> Response {
    refinance_handler_impl(payload)
}

fn refinance_handler_impl(payload: RefinancePayload) -> Response {
    let args = refinance_args_from_payload(payload);
    debug!(outstanding = args.outstanding, "refinance request");
    engine_response(compare_refinance(&args.to_inputs()))
}

async fn investment_get_handler(Query(payload): Query<InvestmentPayload>) -> Response {
    investment_handler_impl(payload)
}

async fn investment_post_handler(Json(payload): Json<InvestmentPayload>) -> Response {
    investment_handler_impl(payload)
}

fn investment_handler_impl(payload: InvestmentPayload) -> Response {
    let args = invest_args_from_payload(payload);
    debug!(monthly = args.monthly, years = args.years, "investment request");
    engine_response(project_investment(args.monthly, args.years, args.rate))
}

async fn options_get_handler(Query(payload): Query<OptionsPayload>) -> Response {
    options_handler_impl(payload)
}

async fn options_post_handler(Json(payload): Json<OptionsPayload>) -> Response {
    options_handler_impl(payload)
}

fn options_handler_impl(payload: OptionsPayload) -> Response {
    let args = options_args_from_payload(payload);
    debug!(amount = args.amount, years = args.years, "investment options request");
    engine_response(compare_strategies(
        args.amount,
        args.frequency.into(),
        args.years,
        &args.rates(),
        &args.tax_rates(),
    ))
}

async fn buy_vs_rent_get_handler(Query(payload): Query<BuyVsRentPayload>) -> Response {
    buy_vs_rent_handler_impl(payload)
}

async fn buy_vs_rent_post_handler(Json(payload): Json<BuyVsRentPayload>) -> Response {
    buy_vs_rent_handler_impl(payload)
}

fn buy_vs_rent_handler_impl(payload: BuyVsRentPayload) -> Response {
    let args = buy_vs_rent_args_from_payload(payload);
    debug!(price = args.property_price, years = args.years, "buy vs rent request");
    engine_response(simulate_buy_vs_rent(&args.to_inputs()))
}

async fn take_home_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<TakeHomePayload>,
) -> Response {
    take_home_handler_impl(&state, payload)
}

async fn take_home_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TakeHomePayload>,
) -> Response {
    take_home_handler_impl(&state, payload)
}

fn take_home_handler_impl(state: &AppState, payload: TakeHomePayload) -> Response {
    let args = take_home_args_from_payload(payload);
    let label = match args
        .tax_year
        .as_deref()
        .or_else(|| state.tax_table.latest_year())
    {
        Some(label) => label,
        None => return engine_error_response(&EngineError::UnknownTaxYear(String::new())),
    };
    debug!(salary = args.salary, tax_year = label, "take-home request");
    let result = state
        .tax_table
        .year(label)
        .and_then(|year| compute_take_home(&args.to_inputs(), year));
    engine_response(result)
}

fn engine_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidInput { .. } | EngineError::UnknownTaxYear(_) => {
            StatusCode::BAD_REQUEST
        }
        EngineError::NonAmortizingPayment { .. } | EngineError::NoTaxBracket { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn engine_response<T: Serialize>(result: Result<T, EngineError>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => engine_error_response(&err),
    }
}

fn engine_error_response(err: &EngineError) -> Response {
    let status = engine_status(err);
    warn!(status = status.as_u16(), error = %err, "calculation rejected");
    error_response(status, &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn default_loan_args_for_api() -> LoanArgs {
    LoanArgs {
        principal: 500_000.0,
        rate: 5.5,
        years: 30,
        extra: 0.0,
        frequency: CliFrequency::Monthly,
    }
}

fn default_capacity_args_for_api() -> CapacityArgs {
    CapacityArgs {
        payment: 2_500.0,
        rate: 5.5,
        frequency: CliFrequency::Monthly,
    }
}

fn default_refinance_args_for_api() -> RefinanceArgs {
    RefinanceArgs {
        outstanding: 400_000.0,
        current_rate: 6.5,
        current_payment: 2_800.0,
        frequency: CliFrequency::Monthly,
        new_rate: 5.5,
        new_years: 25,
    }
}

fn default_invest_args_for_api() -> InvestArgs {
    InvestArgs {
        monthly: 100.0,
        years: 30,
        rate: 4.0,
    }
}

fn default_options_args_for_api() -> OptionsArgs {
    OptionsArgs {
        amount: 500.0,
        frequency: CliFrequency::Monthly,
        years: 20,
        savings_rate: 4.5,
        etf_rate: 8.0,
        super_rate: 7.0,
        marginal_tax_rate: 32.5,
        cgt_discount: 50.0,
        super_tax_rate: 15.0,
    }
}

fn default_buy_vs_rent_args_for_api() -> BuyVsRentArgs {
    BuyVsRentArgs {
        property_price: 600_000.0,
        years: 30,
        rate: 6.0,
        council_rates: 2_000.0,
        insurance: 1_500.0,
        maintenance: 3_000.0,
        weekly_rent: 550.0,
        rent_increase: 3.0,
        property_growth: 5.0,
        invest: 200.0,
        invest_frequency: CliFrequency::Weekly,
        invest_increase: 3.0,
        invest_return: 7.0,
        cpi: 2.5,
    }
}

fn default_take_home_args_for_api() -> TakeHomeArgs {
    TakeHomeArgs {
        salary: 90_000.0,
        includes_super: false,
        no_medicare_levy: false,
        sacrifice: 0.0,
        frequency: CliFrequency::Monthly,
        tax_year: None,
        tax_table: None,
    }
}

fn loan_args_from_payload(payload: LoanPayload) -> LoanArgs {
    let mut args = default_loan_args_for_api();
    if let Some(v) = payload.principal {
        args.principal = v;
    }
    if let Some(v) = payload.annual_rate {
        args.rate = v;
    }
    if let Some(v) = payload.term_years {
        args.years = v;
    }
    if let Some(v) = payload.extra_payment {
        args.extra = v;
    }
    if let Some(v) = payload.frequency {
        args.frequency = v.into();
    }
    args
}

fn capacity_args_from_payload(payload: CapacityPayload) -> CapacityArgs {
    let mut args = default_capacity_args_for_api();
    if let Some(v) = payload.payment {
        args.payment = v;
    }
    if let Some(v) = payload.annual_rate {
        args.rate = v;
    }
    if let Some(v) = payload.frequency {
        args.frequency = v.into();
    }
    args
}

fn refinance_args_from_payload(payload: RefinancePayload) -> RefinanceArgs {
    let mut args = default_refinance_args_for_api();
    if let Some(v) = payload.outstanding {
        args.outstanding = v;
    }
    if let Some(v) = payload.current_rate {
        args.current_rate = v;
    }
    if let Some(v) = payload.current_payment {
        args.current_payment = v;
    }
    if let Some(v) = payload.frequency {
        args.frequency = v.into();
    }
    if let Some(v) = payload.new_rate {
        args.new_rate = v;
    }
    if let Some(v) = payload.new_term_years {
        args.new_years = v;
    }
    args
}

fn invest_args_from_payload(payload: InvestmentPayload) -> InvestArgs {
    let mut args = default_invest_args_for_api();
    if let Some(v) = payload.monthly_contribution {
        args.monthly = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.annual_rate {
        args.rate = v;
    }
    args
}

fn options_args_from_payload(payload: OptionsPayload) -> OptionsArgs {
    let mut args = default_options_args_for_api();
    if let Some(v) = payload.amount {
        args.amount = v;
    }
    if let Some(v) = payload.frequency {
        args.frequency = v.into();
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.savings_rate {
        args.savings_rate = v;
    }
    if let Some(v) = payload.etf_rate {
        args.etf_rate = v;
    }
    if let Some(v) = payload.super_rate {
        args.super_rate = v;
    }
    if let Some(v) = payload.marginal_tax_rate {
        args.marginal_tax_rate = v;
    }
    if let Some(v) = payload.cgt_discount {
        args.cgt_discount = v;
    }
    if let Some(v) = payload.super_tax_rate {
        args.super_tax_rate = v;
    }
    args
}

fn buy_vs_rent_args_from_payload(payload: BuyVsRentPayload) -> BuyVsRentArgs {
    let mut args = default_buy_vs_rent_args_for_api();
    if let Some(v) = payload.property_price {
        args.property_price = v;
    }
    if let Some(v) = payload.loan_term_years {
        args.years = v;
    }
    if let Some(v) = payload.interest_rate {
        args.rate = v;
    }
    if let Some(v) = payload.council_rates {
        args.council_rates = v;
    }
    if let Some(v) = payload.insurance {
        args.insurance = v;
    }
    if let Some(v) = payload.maintenance {
        args.maintenance = v;
    }
    if let Some(v) = payload.weekly_rent {
        args.weekly_rent = v;
    }
    if let Some(v) = payload.rent_increase {
        args.rent_increase = v;
    }
    if let Some(v) = payload.property_growth {
        args.property_growth = v;
    }
    if let Some(v) = payload.investment_amount {
        args.invest = v;
    }
    if let Some(v) = payload.investment_frequency {
        args.invest_frequency = v.into();
    }
    if let Some(v) = payload.investment_increase {
        args.invest_increase = v;
    }
    if let Some(v) = payload.investment_return {
        args.invest_return = v;
    }
    if let Some(v) = payload.cpi_rate {
        args.cpi = v;
    }
    args
}

fn take_home_args_from_payload(payload: TakeHomePayload) -> TakeHomeArgs {
    let mut args = default_take_home_args_for_api();
    if let Some(v) = payload.annual_salary {
        args.salary = v;
    }
    if let Some(v) = payload.includes_super {
        args.includes_super = v;
    }
    if let Some(v) = payload.medicare_levy {
        args.no_medicare_levy = !v;
    }
    if let Some(v) = payload.salary_sacrifice {
        args.sacrifice = v;
    }
    if let Some(v) = payload.frequency {
        args.frequency = v.into();
    }
    if payload.tax_year.is_some() {
        args.tax_year = payload.tax_year;
    }
    args
}
