use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use reserve_fund_core::converter::{self, DemoStudy, StudyLedger};
use reserve_fund_core::optimizer::{self, OptimizerConfig, OptimizerInput, RateLookup};
use reserve_fund_core::rates::RateSource;

use crate::input;

/// Which rate row prices a coupon
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LookupArg {
    SettlementMonth,
    OriginationMonth,
    PaymentMonth,
}

impl From<LookupArg> for RateLookup {
    fn from(arg: LookupArg) -> Self {
        match arg {
            LookupArg::SettlementMonth => RateLookup::SettlementMonth,
            LookupArg::OriginationMonth => RateLookup::OriginationMonth,
            LookupArg::PaymentMonth => RateLookup::PaymentMonth,
        }
    }
}

/// Arguments for solving a prepared optimizer input
#[derive(Args)]
pub struct OptimizeArgs {
    /// Path to JSON/YAML file with `input` and optional `config`
    #[arg(long)]
    pub input: Option<String>,

    /// Override the coupon rate lookup
    #[arg(long, value_enum)]
    pub rate_lookup: Option<LookupArg>,
}

/// Arguments for planning a study from its ledger
#[derive(Args)]
pub struct PlanArgs {
    /// Path to JSON/YAML file with `ledger`, optional `rates` and `config`
    #[arg(long)]
    pub input: Option<String>,

    /// Override the coupon rate lookup
    #[arg(long, value_enum)]
    pub rate_lookup: Option<LookupArg>,
}

/// Arguments for a demo plan
#[derive(Args)]
pub struct DemoArgs {
    /// Path to JSON/YAML file with `study`, optional `rates` and `config`
    #[arg(long)]
    pub input: Option<String>,

    /// Override the coupon rate lookup
    #[arg(long, value_enum)]
    pub rate_lookup: Option<LookupArg>,

    /// Bank spread below the reference rate (e.g. 0.03), used with forecast rates
    #[arg(long, allow_hyphen_values = true)]
    pub spread: Option<Decimal>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizeRequest {
    pub input: OptimizerInput,
    #[serde(default)]
    pub config: OptimizerConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanRequest {
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

fn apply_lookup(mut config: OptimizerConfig, lookup: Option<LookupArg>) -> OptimizerConfig {
    if let Some(arg) = lookup {
        config.rate_lookup = arg.into();
    }
    config
}

pub fn run_optimize(args: OptimizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: OptimizeRequest = input::load(args.input.as_deref())?;
    let config = apply_lookup(request.config, args.rate_lookup);
    let result = optimizer::optimize_plan(&request.input, &config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PlanRequest = input::load(args.input.as_deref())?;
    let config = apply_lookup(request.config, args.rate_lookup);
    let result = converter::plan_study(&request.ledger, &request.rates, &config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_demo(args: DemoArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: DemoRequest = input::load(args.input.as_deref())?;
    if let Some(spread) = args.spread {
        if spread < Decimal::ZERO {
            return Err("--spread must not be negative".into());
        }
        request.study.spread = spread;
    }
    let config = apply_lookup(request.config, args.rate_lookup);
    let result = converter::plan_demo(&request.study, &request.rates, &config)?;
    Ok(serde_json::to_value(result)?)
}
