use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use reserve_fund_core::optimizer;
use reserve_fund_core::selection::{self, GicQuote, InsuredRegistry, SelectionLimits};
use reserve_fund_core::types::{Money, TERMS};

use super::plan::OptimizeRequest;
use crate::input;

/// Arguments for GIC selection
#[derive(Args)]
pub struct SelectGicsArgs {
    /// Path to JSON/YAML file with `quotes`, `registry`, optional `limits`,
    /// and either `allocation` or a `plan` to solve
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SelectRequest {
    #[serde(default)]
    allocation: Option<[Money; TERMS]>,
    #[serde(default)]
    plan: Option<OptimizeRequest>,
    quotes: Vec<GicQuote>,
    registry: InsuredRegistry,
    #[serde(default)]
    limits: SelectionLimits,
}

pub fn run_select_gics(args: SelectGicsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SelectRequest = input::load(args.input.as_deref())?;

    let selected = match (request.allocation, request.plan) {
        (Some(allocation), None) => {
            selection::select_gics(allocation, &request.quotes, &request.registry, &request.limits)?
        }
        (None, Some(plan)) => {
            let result = optimizer::solve_with(&plan.input, &plan.config, &optimizer::MicroLpSolver)?;
            selection::select_for_first_period(&result, &request.quotes, &request.registry, &request.limits)?
        }
        _ => return Err("provide exactly one of `allocation` or `plan`".into()),
    };

    Ok(serde_json::json!({ "result": selected }))
}
