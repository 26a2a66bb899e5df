use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use retail_finance_core::chart::{premium_series, ChartRenderer};
use retail_finance_core::insurance::depreciation::{self, Vehicle, VehicleValueInput};
use retail_finance_core::insurance::premium::{
    self, PolicyInput, PremiumFrequency, PremiumInput, PremiumScheduleInput,
};

use crate::input;
use crate::output::chart::AsciiChart;

/// Policy flags shared by every insurance command.
#[derive(Args)]
pub struct PolicyArgs {
    /// Vehicle make
    #[arg(long)]
    pub make: Option<String>,

    /// Vehicle model
    #[arg(long)]
    pub model: Option<String>,

    /// Vehicle model year
    #[arg(long)]
    pub vehicle_year: Option<i32>,

    /// Vehicle value when the policy was written
    #[arg(long)]
    pub initial_value: Option<Decimal>,

    /// Policy start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Fraction of current value charged yearly (default 0.05)
    #[arg(long)]
    pub base_premium_rate: Option<Decimal>,

    /// Fraction of value lost per year, compounded (default 0.07)
    #[arg(long)]
    pub depreciation_rate: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for vehicle valuation
#[derive(Args)]
pub struct VehicleValueArgs {
    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Calendar year to value the vehicle at
    #[arg(long)]
    pub valuation_year: Option<i32>,
}

/// Arguments for a premium quote
#[derive(Args)]
pub struct PremiumArgs {
    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Calendar year the premium is quoted for
    #[arg(long)]
    pub premium_year: Option<i32>,

    /// Billing frequency: yearly, quarterly, or monthly
    #[arg(long, default_value = "yearly")]
    pub frequency: String,
}

/// Arguments for a premium schedule projection
#[derive(Args)]
pub struct PremiumScheduleArgs {
    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Consecutive policy years to project
    #[arg(long, default_value = "5")]
    pub years: u32,
}

/// Arguments for the premium chart
#[derive(Args)]
pub struct PremiumChartArgs {
    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Consecutive policy years to chart
    #[arg(long, default_value = "5")]
    pub years: u32,

    /// Bar width in characters
    #[arg(long, default_value = "40")]
    pub width: usize,
}

pub fn run_vehicle_value(args: VehicleValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let value_input: VehicleValueInput = if let Some(ref path) = args.policy.input {
        input::read_json(path)?
    } else if let Some(piped) = input::read_stdin()? {
        piped
    } else {
        let policy = policy_from_flags(&args.policy)?;
        VehicleValueInput {
            vehicle: policy.vehicle,
            policy_start: policy.start_date,
            depreciation_rate: policy.depreciation_rate,
            valuation_year: args
                .valuation_year
                .ok_or("--valuation-year is required (or provide --input)")?,
        }
    };

    let output = depreciation::calculate_current_value(&value_input)?;
    Ok(serde_json::to_value(&output)?)
}

pub fn run_premium(args: PremiumArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let premium_input: PremiumInput = if let Some(ref path) = args.policy.input {
        input::read_json(path)?
    } else if let Some(piped) = input::read_stdin()? {
        piped
    } else {
        PremiumInput {
            policy: policy_from_flags(&args.policy)?,
            premium_year: args
                .premium_year
                .ok_or("--premium-year is required (or provide --input)")?,
            frequency: args.frequency.parse::<PremiumFrequency>()?,
        }
    };

    let output = premium::calculate_premium(&premium_input)?;
    Ok(serde_json::to_value(&output)?)
}

pub fn run_premium_schedule(args: PremiumScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input = resolve_schedule_input(&args.policy, args.years)?;
    let output = premium::generate_premium_schedule(&schedule_input)?;
    Ok(serde_json::to_value(&output)?)
}

pub fn run_premium_chart(args: PremiumChartArgs) -> Result<(), Box<dyn std::error::Error>> {
    let schedule_input = resolve_schedule_input(&args.policy, args.years)?;
    let output = premium::generate_premium_schedule(&schedule_input)?.result;
    let series = premium_series(&output.schedule);

    AsciiChart::new(args.width).render("Insurance Premiums and Vehicle Value Over Time", &series)?;
    Ok(())
}

fn resolve_schedule_input(
    args: &PolicyArgs,
    years: u32,
) -> Result<PremiumScheduleInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        input::read_json(path)
    } else if let Some(piped) = input::read_stdin()? {
        Ok(piped)
    } else {
        Ok(PremiumScheduleInput {
            policy: policy_from_flags(args)?,
            projection_years: years,
        })
    }
}

fn policy_from_flags(args: &PolicyArgs) -> Result<PolicyInput, Box<dyn std::error::Error>> {
    let start_date = args
        .start_date
        .as_deref()
        .ok_or("--start-date is required (or provide --input)")?;
    let start_date = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
        .map_err(|e| format!("Invalid --start-date '{}': {}", start_date, e))?;

    Ok(PolicyInput {
        vehicle: Vehicle {
            make: args
                .make
                .clone()
                .ok_or("--make is required (or provide --input)")?,
            model: args
                .model
                .clone()
                .ok_or("--model is required (or provide --input)")?,
            year: args
                .vehicle_year
                .ok_or("--vehicle-year is required (or provide --input)")?,
            initial_value: args
                .initial_value
                .ok_or("--initial-value is required (or provide --input)")?,
        },
        start_date,
        base_premium_rate: args.base_premium_rate.unwrap_or(dec!(0.05)),
        depreciation_rate: args.depreciation_rate.unwrap_or(dec!(0.07)),
    })
}
