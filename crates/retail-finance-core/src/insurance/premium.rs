use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::error::RetailFinanceError;
use crate::insurance::depreciation::{
    depreciated_value, validate_depreciation_rate, validate_vehicle, Vehicle,
};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RetailFinanceResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Billing cadence for premium installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumFrequency {
    Yearly,
    Quarterly,
    Monthly,
}

impl PremiumFrequency {
    /// Number of installments the annual premium is split into.
    pub fn installments_per_year(&self) -> Decimal {
        match self {
            PremiumFrequency::Yearly => Decimal::ONE,
            PremiumFrequency::Quarterly => dec!(4),
            PremiumFrequency::Monthly => dec!(12),
        }
    }
}

impl fmt::Display for PremiumFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PremiumFrequency::Yearly => "yearly",
            PremiumFrequency::Quarterly => "quarterly",
            PremiumFrequency::Monthly => "monthly",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PremiumFrequency {
    type Err = RetailFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yearly" => Ok(PremiumFrequency::Yearly),
            "quarterly" => Ok(PremiumFrequency::Quarterly),
            "monthly" => Ok(PremiumFrequency::Monthly),
            other => Err(RetailFinanceError::InvalidInput {
                field: "frequency".into(),
                reason: format!(
                    "'{}' is not a valid frequency. Choose 'yearly', 'quarterly', or 'monthly'",
                    other
                ),
            }),
        }
    }
}

/// A motor insurance policy written over a vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyInput {
    pub vehicle: Vehicle,
    /// Date the policy came into force.
    pub start_date: NaiveDate,
    /// Fraction of the current vehicle value charged as the annual premium.
    pub base_premium_rate: Rate,
    /// Fraction of value lost per year, compounded.
    pub depreciation_rate: Rate,
}

impl PolicyInput {
    fn start_year(&self) -> i32 {
        self.start_date.year()
    }
}

/// Input for a single premium quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumInput {
    pub policy: PolicyInput,
    /// Calendar year the premium is quoted for.
    pub premium_year: i32,
    pub frequency: PremiumFrequency,
}

/// Output of a premium quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumOutput {
    pub premium_year: i32,
    /// Depreciated vehicle value the premium is rated on.
    pub vehicle_value: Money,
    pub frequency: PremiumFrequency,
    /// Full-year premium before splitting into installments.
    pub annual_premium: Money,
    /// Amount due per installment at the requested frequency.
    pub installment_premium: Money,
}

/// Input for a multi-year premium schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumScheduleInput {
    pub policy: PolicyInput,
    /// Consecutive policy years to project, starting at the start year.
    pub projection_years: u32,
}

/// One policy year in a premium schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumScheduleEntry {
    pub year: i32,
    pub vehicle_value: Money,
    pub yearly_premium: Money,
    pub quarterly_premium: Money,
    pub monthly_premium: Money,
}

/// Output of a premium schedule projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumScheduleOutput {
    pub schedule: Vec<PremiumScheduleEntry>,
    /// Sum of the yearly premiums over the projection horizon.
    pub total_yearly_premiums: Money,
    pub final_vehicle_value: Money,
}

// ---------------------------------------------------------------------------
// Function 1: calculate_premium
// ---------------------------------------------------------------------------

/// Quote the premium for a policy year at a billing frequency.
///
/// The annual premium is the depreciated vehicle value times the base premium
/// rate; the installment is the annual premium divided by the number of
/// installments per year (1, 4, or 12).
pub fn calculate_premium(
    input: &PremiumInput,
) -> RetailFinanceResult<ComputationOutput<PremiumOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_policy(&input.policy)?;

    let vehicle_value = vehicle_value_at(&input.policy, input.premium_year, &mut warnings);
    let annual_premium = vehicle_value * input.policy.base_premium_rate;
    let installment_premium = annual_premium / input.frequency.installments_per_year();

    let output = PremiumOutput {
        premium_year: input.premium_year,
        vehicle_value,
        frequency: input.frequency,
        annual_premium,
        installment_premium,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Motor Premium (Depreciated Value Rating)",
        &serde_json::json!({
            "make": input.policy.vehicle.make,
            "model": input.policy.vehicle.model,
            "start_year": input.policy.start_year(),
            "base_premium_rate": input.policy.base_premium_rate.to_string(),
            "depreciation_rate": input.policy.depreciation_rate.to_string(),
            "frequency": input.frequency.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Function 2: generate_premium_schedule
// ---------------------------------------------------------------------------

/// Project the premium schedule for consecutive policy years.
///
/// One entry per year starting at the policy's start year, each carrying the
/// depreciated vehicle value and the premium at all three billing
/// frequencies. Years ascend with no gaps.
pub fn generate_premium_schedule(
    input: &PremiumScheduleInput,
) -> RetailFinanceResult<ComputationOutput<PremiumScheduleOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_policy(&input.policy)?;

    if input.projection_years == 0 {
        return Err(RetailFinanceError::InvalidInput {
            field: "projection_years".into(),
            reason: "Must project at least one year".into(),
        });
    }

    let start_year = input.policy.start_year();
    let mut schedule = Vec::with_capacity(input.projection_years as usize);

    for offset in 0..input.projection_years {
        let year = start_year + offset as i32;
        let vehicle_value = depreciated_value(
            input.policy.vehicle.initial_value,
            input.policy.depreciation_rate,
            offset as i32,
        );
        let yearly_premium = vehicle_value * input.policy.base_premium_rate;

        schedule.push(PremiumScheduleEntry {
            year,
            vehicle_value,
            yearly_premium,
            quarterly_premium: yearly_premium / PremiumFrequency::Quarterly.installments_per_year(),
            monthly_premium: yearly_premium / PremiumFrequency::Monthly.installments_per_year(),
        });
    }

    let total_yearly_premiums: Money = schedule.iter().map(|e| e.yearly_premium).sum();
    let final_vehicle_value = schedule
        .last()
        .map(|e| e.vehicle_value)
        .unwrap_or(input.policy.vehicle.initial_value);

    let output = PremiumScheduleOutput {
        schedule,
        total_yearly_premiums,
        final_vehicle_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Premium Schedule Projection",
        &serde_json::json!({
            "make": input.policy.vehicle.make,
            "model": input.policy.vehicle.model,
            "start_year": start_year,
            "projection_years": input.projection_years,
            "base_premium_rate": input.policy.base_premium_rate.to_string(),
            "depreciation_rate": input.policy.depreciation_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn validate_policy(policy: &PolicyInput) -> RetailFinanceResult<()> {
    validate_vehicle(&policy.vehicle)?;
    validate_depreciation_rate(policy.depreciation_rate)?;
    if policy.base_premium_rate < Decimal::ZERO {
        return Err(RetailFinanceError::InvalidInput {
            field: "base_premium_rate".into(),
            reason: "Base premium rate cannot be negative".into(),
        });
    }
    Ok(())
}

/// Depreciated vehicle value at a calendar year, warning on years before the
/// policy start.
fn vehicle_value_at(policy: &PolicyInput, year: i32, warnings: &mut Vec<String>) -> Money {
    let years_elapsed = year - policy.start_year();
    if years_elapsed < 0 {
        warnings.push(format!(
            "Premium year {} predates the policy start year {} — the value is grossed up, not depreciated",
            year,
            policy.start_year()
        ));
    }
    depreciated_value(
        policy.vehicle.initial_value,
        policy.depreciation_rate,
        years_elapsed,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
