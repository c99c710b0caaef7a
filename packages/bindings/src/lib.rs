use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use reserve_fund_core::converter::{self, DemoStudy, StudyLedger};
use reserve_fund_core::optimizer::{self, OptimizerConfig, OptimizerInput};
use reserve_fund_core::rates::RateSource;
use reserve_fund_core::schedule;
use reserve_fund_core::selection::{self, GicQuote, InsuredRegistry, SelectionLimits};
use reserve_fund_core::types::{Money, TERMS};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: for<'de> Deserialize<'de>>(json: &str) -> NapiResult<T> {
    serde_json::from_str(json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OptimizeRequest {
    input: OptimizerInput,
    #[serde(default)]
    config: OptimizerConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LedgerRequest {
    ledger: StudyLedger,
    #[serde(default)]
    rates: RateSource,
    #[serde(default)]
    config: OptimizerConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DemoRequest {
    study: DemoStudy,
    #[serde(default)]
    rates: RateSource,
    #[serde(default)]
    config: OptimizerConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SelectRequest {
    allocation: [Money; TERMS],
    quotes: Vec<GicQuote>,
    registry: InsuredRegistry,
    #[serde(default)]
    limits: SelectionLimits,
}

// ---------------------------------------------------------------------------
// Optimizer
// ---------------------------------------------------------------------------

#[napi]
pub fn optimize_plan(request_json: String) -> NapiResult<String> {
    let request: OptimizeRequest = parse(&request_json)?;
    let output =
        optimizer::optimize_plan(&request.input, &request.config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_plan(request_json: String) -> NapiResult<String> {
    let request: OptimizeRequest = parse(&request_json)?;
    let result = optimizer::solve_with(&request.input, &request.config, &optimizer::MicroLpSolver)
        .map_err(to_napi_error)?;
    let output = serde_json::json!({
        "summary": schedule::summarize(&result),
        "outstanding": schedule::outstanding_by_term(result.records()),
        "annual": schedule::annual_totals(result.records()),
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

#[napi]
pub fn build_plan_input(request_json: String) -> NapiResult<String> {
    let request: LedgerRequest = parse(&request_json)?;
    let converted =
        converter::build_optimizer_input(&request.ledger, &request.rates).map_err(to_napi_error)?;
    serde_json::to_string(&converted).map_err(to_napi_error)
}

#[napi]
pub fn plan_study(request_json: String) -> NapiResult<String> {
    let request: LedgerRequest = parse(&request_json)?;
    let output = converter::plan_study(&request.ledger, &request.rates, &request.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn demo_plan(request_json: String) -> NapiResult<String> {
    let request: DemoRequest = parse(&request_json)?;
    let output = converter::plan_demo(&request.study, &request.rates, &request.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[napi]
pub fn select_gics(request_json: String) -> NapiResult<String> {
    let request: SelectRequest = parse(&request_json)?;
    let output = selection::select_gics(
        request.allocation,
        &request.quotes,
        &request.registry,
        &request.limits,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
