use clap::Args;
use serde_json::{json, Value};

use reserve_fund_core::optimizer;
use reserve_fund_core::schedule;

use super::plan::OptimizeRequest;
use crate::input;

/// Arguments for the investment schedule report
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML file with `input` and optional `config`
    #[arg(long)]
    pub input: Option<String>,

    /// Report yearly totals instead of the per-period outstanding series
    #[arg(long)]
    pub annual: bool,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: OptimizeRequest = input::load(args.input.as_deref())?;
    let result = optimizer::solve_with(&request.input, &request.config, &optimizer::MicroLpSolver)?;
    let summary = schedule::summarize(&result);

    let detail = if args.annual {
        serde_json::to_value(schedule::annual_totals(result.records()))?
    } else {
        serde_json::to_value(schedule::outstanding_by_term(result.records()))?
    };

    Ok(json!({
        "result": {
            "summary": summary,
            "detail": detail,
        }
    }))
}
