mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::convert::ConvertArgs;
use commands::plan::{DemoArgs, OptimizeArgs, PlanArgs};
use commands::schedule::ScheduleArgs;
use commands::selection::SelectGicsArgs;

/// Reserve-fund investment planning
#[derive(Parser)]
#[command(
    name = "rfplan",
    version,
    about = "Reserve-fund investment timing and GIC planning",
    long_about = "Plans when and for how long a condominium reserve fund should lock \
                  idle cash into 1-5 year GICs. Converts study ledgers into optimizer \
                  input, solves the monthly investment-timing linear program, and \
                  reports schedules and GIC selections."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a prepared optimizer input
    Optimize(OptimizeArgs),
    /// Convert a study ledger into optimizer input
    Convert(ConvertArgs),
    /// Convert a study ledger and solve its plan
    Plan(PlanArgs),
    /// Plan a demo study without account data
    Demo(DemoArgs),
    /// Summarise a solved plan and its outstanding investments
    Schedule(ScheduleArgs),
    /// Allocate first-period placements across insured GIC issuers
    SelectGics(SelectGicsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Optimize(args) => commands::plan::run_optimize(args),
        Commands::Convert(args) => commands::convert::run_convert(args),
        Commands::Plan(args) => commands::plan::run_plan(args),
        Commands::Demo(args) => commands::plan::run_demo(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::SelectGics(args) => commands::selection::run_select_gics(args),
        Commands::Version => {
            println!("rfplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
