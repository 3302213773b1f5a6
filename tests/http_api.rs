use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use finance_tools::api::{AppState, router};
use finance_tools::config::builtin_tax_table;

fn app() -> Router {
    let tax_table = builtin_tax_table().expect("bundled tax table");
    router(Arc::new(AppState { tax_table }))
}

async fn send(request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    let body = serde_json::from_slice(&bytes).expect("body is JSON");
    (status, cache_control, body)
}

async fn get(uri: &str) -> (StatusCode, Option<String>, Value) {
    send(Request::get(uri).body(Body::empty()).expect("valid request")).await
}

async fn post(uri: &str, body: Value) -> (StatusCode, Option<String>, Value) {
    send(
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request"),
    )
    .await
}

fn number(value: &Value) -> f64 {
    value.as_f64().expect("numeric field")
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, cache_control, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("no-store"));
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn loan_get_uses_query_parameters() {
    let (status, _, body) = get("/api/loan?principal=500000&annualRate=5.5&termYears=30").await;
    assert_eq!(status, StatusCode::OK);
    assert!((number(&body["monthlyPayment"]) - 2_838.945).abs() < 0.01);
    assert_eq!(body["schedule"].as_array().expect("schedule").len(), 360);
    assert_eq!(body["frequency"], "monthly");
    assert!(body["suggestion"].is_object());
    assert!(body["extra"].is_null());
}

#[tokio::test]
async fn loan_post_with_extra_payment_reports_savings() {
    let (status, _, body) = post(
        "/api/loan",
        json!({"principal": 500000, "annualRate": 5.5, "termYears": 30, "extraPayment": 200}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let extra = &body["extra"];
    assert_eq!(extra["payoffPeriod"], 307);
    assert!(number(&extra["interestSaved"]) > 0.0);
}

#[tokio::test]
async fn capacity_returns_seven_terms() {
    let (status, _, body) = post("/api/capacity", json!({"payment": 2500, "annualRate": 5.5})).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[5]["termYears"], 30);
    assert!((number(&rows[5]["maxLoanAmount"]) - 440_304.4).abs() < 0.5);
}

#[tokio::test]
async fn refinance_with_insufficient_payment_is_unprocessable() {
    let (status, cache_control, body) = post(
        "/api/refinance",
        json!({"outstanding": 400000, "currentRate": 6, "currentPayment": 1500, "newRate": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(cache_control.as_deref(), Some("no-store"));
    assert!(
        body["error"]
            .as_str()
            .expect("error message")
            .contains("Non-amortizing payment")
    );
}

#[tokio::test]
async fn investment_defaults_to_the_hundred_a_month_example() {
    let (status, _, body) = get("/api/investment").await;
    assert_eq!(status, StatusCode::OK);
    assert!((number(&body["futureValue"]) - 69_404.94).abs() < 0.01);
    assert!((number(&body["simpleReturn"]) - 21_660.0).abs() < 1e-6);
}

#[tokio::test]
async fn investment_options_rank_strategies() {
    let (status, _, body) = post(
        "/api/investment-options",
        json!({"amount": 500, "years": 20}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let strategies = body["strategies"].as_array().expect("strategies");
    assert_eq!(strategies.len(), 4);
    assert_eq!(strategies[0]["kind"], "no-return");
    assert_ne!(body["bestIndex"], 0);
    assert_eq!(strategies[1]["yearly"].as_array().expect("yearly").len(), 21);
}

#[tokio::test]
async fn buy_vs_rent_reports_both_perspectives() {
    let (status, _, body) = get("/api/buy-vs-rent?propertyPrice=750000&weeklyRent=650").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["years"].as_array().expect("years").len(), 30);
    assert!(body["nominal"]["winner"].is_string());
    assert!(body["real"]["cpiMultiplier"].as_f64().expect("multiplier") > 1.0);
    assert!(body["winnersDisagree"].is_boolean());
}

#[tokio::test]
async fn take_home_uses_requested_tax_year() {
    let (status, _, body) = post(
        "/api/take-home",
        json!({"annualSalary": 100000, "taxYear": "2024-25"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!((number(&body["takeHomeAnnual"]) - 77_212.0).abs() < 1e-6);
    assert_eq!(body["bracketTo"], 135_000.0);
}

#[tokio::test]
async fn take_home_unknown_year_is_bad_request() {
    let (status, _, body) = get("/api/take-home?annualSalary=80000&taxYear=1999-00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("1999-00"));
}

#[tokio::test]
async fn tax_years_lists_bundled_years() {
    let (status, _, body) = get("/api/tax-years").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["years"], json!(["2023-24", "2024-25"]));
    assert_eq!(body["latest"], "2024-25");
}

#[tokio::test]
async fn invalid_input_is_bad_request() {
    let (status, _, body) = post("/api/loan", json!({"principal": 0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("principal"));
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let (status, cache_control, body) = get("/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(cache_control.as_deref(), Some("no-store"));
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn oversized_loan_term_is_bad_request() {
    let (status, cache_control, body) = get("/api/loan?termYears=400000000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(cache_control.as_deref(), Some("no-store"));
    let error = body["error"].as_str().expect("error");
    assert!(error.contains("termYears"), "{error}");
    assert!(error.contains("at most 100 years"), "{error}");
}

#[tokio::test]
async fn oversized_investment_horizon_is_bad_request() {
    let (status, _, body) = post("/api/investment", json!({"years": 400000000})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("years"));
}
