use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use retail_finance_core::chart::{amortization_series, ChartRenderer};
use retail_finance_core::lending::amortization::{self, EarlyClosureInput, HousingLoanInput};

use crate::input;
use crate::output::chart::AsciiChart;

/// Loan flags shared by every lending command.
#[derive(Args)]
pub struct LoanArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate in percent (7.5 = 7.5%)
    #[arg(long, alias = "rate")]
    pub annual_interest_rate: Option<Decimal>,

    /// Term in whole years
    #[arg(long, alias = "years")]
    pub loan_term_years: Option<u32>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for amortization schedule generation
#[derive(Args)]
pub struct AmortizationArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for early-closure analysis
#[derive(Args)]
pub struct EarlyClosureArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Payments already made when the loan closes (0 = before the first payment)
    #[arg(long)]
    pub closure_month: Option<u32>,
}

/// Arguments for the EMI breakdown chart
#[derive(Args)]
pub struct LoanChartArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Chart one month per N months
    #[arg(long, default_value = "12")]
    pub step: u32,

    /// Bar width in characters
    #[arg(long, default_value = "40")]
    pub width: usize,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(&args.loan)?;
    let output = amortization::calculate_emi(&loan)?;
    Ok(serde_json::to_value(&output)?)
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(&args.loan)?;
    let output = amortization::generate_amortization_schedule(&loan)?;
    Ok(serde_json::to_value(&output)?)
}

pub fn run_early_closure(args: EarlyClosureArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ec_input: EarlyClosureInput = if let Some(ref path) = args.loan.input {
        input::read_json(path)?
    } else if let Some(piped) = input::read_stdin()? {
        piped
    } else {
        EarlyClosureInput {
            loan: loan_from_flags(&args.loan)?,
            closure_month: args
                .closure_month
                .ok_or("--closure-month is required (or provide --input)")?,
        }
    };

    let output = amortization::calculate_early_closure(&ec_input)?;
    Ok(serde_json::to_value(&output)?)
}

pub fn run_loan_chart(args: LoanChartArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loan = resolve_loan(&args.loan)?;
    let output = amortization::generate_amortization_schedule(&loan)?.result;

    // A 20-year loan has 240 rows; sample it down to one per step.
    let step = args.step.max(1);
    let sampled: Vec<_> = output
        .schedule
        .into_iter()
        .filter(|e| e.month == 1 || e.month % step == 0)
        .collect();
    let series = amortization_series(&sampled);

    let title = format!(
        "EMI Breakdown (Principal: {}, Rate: {}%, Term: {} years)",
        loan.principal, loan.annual_interest_rate, loan.loan_term_years
    );
    AsciiChart::new(args.width).render(&title, &series)?;
    Ok(())
}

fn resolve_loan(args: &LoanArgs) -> Result<HousingLoanInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        input::read_json(path)
    } else if let Some(piped) = input::read_stdin()? {
        Ok(piped)
    } else {
        loan_from_flags(args)
    }
}

fn loan_from_flags(args: &LoanArgs) -> Result<HousingLoanInput, Box<dyn std::error::Error>> {
    Ok(HousingLoanInput {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_interest_rate: args
            .annual_interest_rate
            .ok_or("--annual-interest-rate is required (or provide --input)")?,
        loan_term_years: args
            .loan_term_years
            .ok_or("--loan-term-years is required (or provide --input)")?,
    })
}
