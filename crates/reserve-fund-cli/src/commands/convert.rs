use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use reserve_fund_core::converter::{self, StudyLedger};
use reserve_fund_core::rates::RateSource;

use crate::input;

/// Arguments for converting a ledger into optimizer input
#[derive(Args)]
pub struct ConvertArgs {
    /// Path to JSON/YAML file with `ledger` and optional `rates`
    #[arg(long)]
    pub input: Option<String>,

    /// Include the month-end date of every plan period
    #[arg(long)]
    pub with_dates: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConvertRequest {
    ledger: StudyLedger,
    #[serde(default)]
    rates: RateSource,
}

pub fn run_convert(args: ConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ConvertRequest = input::load(args.input.as_deref())?;
    let converted = converter::build_optimizer_input(&request.ledger, &request.rates)?;

    if args.with_dates {
        Ok(serde_json::to_value(converted)?)
    } else {
        Ok(json!({ "input": serde_json::to_value(&converted.input)? }))
    }
}
