mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::insurance::{PremiumArgs, PremiumChartArgs, PremiumScheduleArgs, VehicleValueArgs};
use commands::lending::{AmortizationArgs, EarlyClosureArgs, EmiArgs, LoanChartArgs};

/// Housing-loan and motor insurance calculations
#[derive(Parser)]
#[command(
    name = "rfa",
    version,
    about = "Housing-loan and motor insurance calculations",
    long_about = "A CLI for retail finance calculations with decimal precision. \
                  Covers EMI computation, amortization schedules, early-closure \
                  interest loss, depreciation-based vehicle valuation, and \
                  premium quotes at yearly, quarterly, or monthly billing."
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
    /// Calculate the fixed monthly installment for a housing loan
    Emi(EmiArgs),
    /// Generate the month-by-month amortization schedule
    Amortization(AmortizationArgs),
    /// Estimate interest forgone when a loan is closed early
    EarlyClosure(EarlyClosureArgs),
    /// Depreciated vehicle value at a calendar year
    VehicleValue(VehicleValueArgs),
    /// Premium quote for a policy year at a billing frequency
    Premium(PremiumArgs),
    /// Year-by-year premium and vehicle value schedule
    PremiumSchedule(PremiumScheduleArgs),
    /// Terminal chart of the EMI principal/interest split
    LoanChart(LoanChartArgs),
    /// Terminal chart of premiums and vehicle value over time
    PremiumChart(PremiumChartArgs),
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
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::lending::run_emi(args),
        Commands::Amortization(args) => commands::lending::run_amortization(args),
        Commands::EarlyClosure(args) => commands::lending::run_early_closure(args),
        Commands::VehicleValue(args) => commands::insurance::run_vehicle_value(args),
        Commands::Premium(args) => commands::insurance::run_premium(args),
        Commands::PremiumSchedule(args) => commands::insurance::run_premium_schedule(args),
        Commands::LoanChart(args) => exit_after(commands::lending::run_loan_chart(args)),
        Commands::PremiumChart(args) => exit_after(commands::insurance::run_premium_chart(args)),
        Commands::Version => {
            println!("rfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            report_error(e.as_ref());
        }
    }
}

/// Chart commands draw straight to stdout instead of going through the
/// output formatter.
fn exit_after(result: Result<(), Box<dyn std::error::Error>>) -> ! {
    match result {
        Ok(()) => process::exit(0),
        Err(e) => report_error(e.as_ref()),
    }
}

fn report_error(e: &dyn std::error::Error) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}
