//! Fixed-rate housing loan amortization models.
//!
//! Covers EMI computation on the level-payment annuity formula, month-by-month
//! amortization schedules, and the interest forgone when a loan is closed
//! before maturity. All math uses `rust_decimal::Decimal` for
//! institutional-grade precision.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RetailFinanceError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RetailFinanceResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: u32 = 12;
const PERCENT_DIVISOR: Decimal = dec!(100);
/// Residual balance beyond this after the final payment gets a warning.
const BALANCE_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Input for a fixed-rate housing loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousingLoanInput {
    /// Amount borrowed.
    pub principal: Money,
    /// Nominal annual rate in percent (7.5 = 7.5% p.a.).
    pub annual_interest_rate: Decimal,
    /// Term in whole years.
    pub loan_term_years: u32,
}

impl HousingLoanInput {
    /// Monthly rate as a decimal fraction: annual percent / 12 / 100.
    pub fn monthly_interest_rate(&self) -> Rate {
        self.annual_interest_rate / Decimal::from(MONTHS_PER_YEAR) / PERCENT_DIVISOR
    }

    /// Number of monthly payments over the term.
    pub fn total_payments(&self) -> u32 {
        self.loan_term_years * MONTHS_PER_YEAR
    }
}

/// Output of an EMI calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiOutput {
    /// Fixed monthly payment.
    pub monthly_payment: Money,
    /// Monthly rate used, as a decimal fraction.
    pub monthly_interest_rate: Rate,
    /// Number of monthly payments over the term.
    pub total_payments: u32,
    /// monthly_payment * total_payments.
    pub total_amount_paid: Money,
    /// Total outlay less the amount borrowed.
    pub total_interest: Money,
}

/// A single month in an amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// Month number, 1-based.
    pub month: u32,
    /// Payment made this month (the EMI, every month).
    pub payment: Money,
    /// Portion of the payment retiring principal.
    pub principal_component: Money,
    /// Portion of the payment covering interest on the open balance.
    pub interest_component: Money,
    /// Balance outstanding after the payment.
    pub balance: Money,
}

/// Output of a full amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub monthly_payment: Money,
    pub schedule: Vec<AmortizationEntry>,
    pub total_principal_paid: Money,
    pub total_interest_paid: Money,
    /// Balance left after the last scheduled payment. The final payment is
    /// not clamped, so this carries the rounding residual.
    pub final_balance: Money,
}

/// Input for an early-closure analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarlyClosureInput {
    pub loan: HousingLoanInput,
    /// Payments already made when the loan is closed. Counts from zero, so
    /// closing before the first payment loses the entire lifetime interest.
    pub closure_month: u32,
}

/// Output of an early-closure analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarlyClosureOutput {
    pub closure_month: u32,
    pub remaining_months: u32,
    /// Interest that would have accrued over the remaining schedule.
    pub interest_lost: Money,
    pub interest_lost_per_remaining_month: Money,
}

// ---------------------------------------------------------------------------
// Function 1: calculate_emi
// ---------------------------------------------------------------------------

/// Calculate the Equated Monthly Installment for a housing loan.
///
/// EMI = P * r * (1+r)^n / ((1+r)^n - 1) with P = principal, r = monthly
/// rate, n = total payments. Zero-rate loans pay straight-line
/// principal / n; the annuity formula is never evaluated at r = 0.
pub fn calculate_emi(
    input: &HousingLoanInput,
) -> RetailFinanceResult<ComputationOutput<EmiOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_loan(input)?;

    let monthly_rate = input.monthly_interest_rate();
    let total_payments = input.total_payments();
    let monthly_payment = level_payment(input.principal, monthly_rate, total_payments)?;

    let total_amount_paid = monthly_payment * Decimal::from(total_payments);
    let total_interest = total_amount_paid - input.principal;

    let output = EmiOutput {
        monthly_payment,
        monthly_interest_rate: monthly_rate,
        total_payments,
        total_amount_paid,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equated Monthly Installment (Level-Payment Annuity)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_interest_rate_pct": input.annual_interest_rate.to_string(),
            "loan_term_years": input.loan_term_years,
            "zero_rate_policy": "principal / total_payments",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Function 2: generate_amortization_schedule
// ---------------------------------------------------------------------------

/// Generate the month-by-month amortization schedule for a housing loan.
///
/// Each month: interest = balance * r, principal = EMI - interest,
/// balance -= principal. The schedule is recomputed fresh on every call and
/// the final payment is not clamped — the rounding residual is reported as
/// `final_balance` and warned about if it exceeds one cent.
pub fn generate_amortization_schedule(
    input: &HousingLoanInput,
) -> RetailFinanceResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan(input)?;

    let monthly_rate = input.monthly_interest_rate();
    let total_payments = input.total_payments();
    let monthly_payment = level_payment(input.principal, monthly_rate, total_payments)?;

    let schedule = build_schedule(input.principal, monthly_rate, total_payments, monthly_payment);

    let total_principal_paid: Money = schedule.iter().map(|e| e.principal_component).sum();
    let total_interest_paid: Money = schedule.iter().map(|e| e.interest_component).sum();
    let final_balance = schedule
        .last()
        .map(|e| e.balance)
        .unwrap_or(Decimal::ZERO);

    if final_balance.abs() > BALANCE_TOLERANCE {
        warnings.push(format!(
            "Residual balance {} after the final payment exceeds tolerance {}",
            final_balance, BALANCE_TOLERANCE
        ));
    }

    let output = AmortizationOutput {
        monthly_payment,
        schedule,
        total_principal_paid,
        total_interest_paid,
        final_balance,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortization Schedule (Declining Balance)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_interest_rate_pct": input.annual_interest_rate.to_string(),
            "loan_term_years": input.loan_term_years,
            "total_payments": total_payments,
            "residual_policy": "final payment not clamped; residual reported",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Function 3: calculate_early_closure
// ---------------------------------------------------------------------------

/// Estimate interest forgone by the lender when a loan closes early.
///
/// `closure_month` is the count of payments already made. The interest lost
/// is the sum of interest components of every payment not yet made, i.e.
/// schedule positions closure_month..end.
pub fn calculate_early_closure(
    input: &EarlyClosureInput,
) -> RetailFinanceResult<ComputationOutput<EarlyClosureOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_loan(&input.loan)?;

    let total_payments = input.loan.total_payments();
    if input.closure_month > total_payments {
        return Err(RetailFinanceError::InvalidInput {
            field: "closure_month".into(),
            reason: format!(
                "Closure month {} is beyond the loan term of {} payments",
                input.closure_month, total_payments
            ),
        });
    }

    let remaining_months = total_payments - input.closure_month;
    if remaining_months == 0 {
        return Err(RetailFinanceError::DivisionByZero {
            context: "interest lost per remaining month (loan already at maturity)".into(),
        });
    }

    let monthly_rate = input.loan.monthly_interest_rate();
    let monthly_payment = level_payment(input.loan.principal, monthly_rate, total_payments)?;
    let schedule = build_schedule(
        input.loan.principal,
        monthly_rate,
        total_payments,
        monthly_payment,
    );

    let interest_lost: Money = schedule[input.closure_month as usize..]
        .iter()
        .map(|e| e.interest_component)
        .sum();
    let interest_lost_per_remaining_month = interest_lost / Decimal::from(remaining_months);

    let output = EarlyClosureOutput {
        closure_month: input.closure_month,
        remaining_months,
        interest_lost,
        interest_lost_per_remaining_month,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Early Closure Interest Loss",
        &serde_json::json!({
            "principal": input.loan.principal.to_string(),
            "annual_interest_rate_pct": input.loan.annual_interest_rate.to_string(),
            "loan_term_years": input.loan.loan_term_years,
            "closure_month_semantics": "payments already made, counted from zero",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn validate_loan(input: &HousingLoanInput) -> RetailFinanceResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(RetailFinanceError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.loan_term_years == 0 {
        return Err(RetailFinanceError::InvalidInput {
            field: "loan_term_years".into(),
            reason: "Loan term must be at least one year".into(),
        });
    }
    if input.annual_interest_rate < Decimal::ZERO {
        return Err(RetailFinanceError::InvalidInput {
            field: "annual_interest_rate".into(),
            reason: "Annual interest rate cannot be negative".into(),
        });
    }
    Ok(())
}

/// Level monthly payment for the loan.
fn level_payment(
    principal: Money,
    monthly_rate: Rate,
    total_payments: u32,
) -> RetailFinanceResult<Money> {
    if total_payments == 0 {
        return Err(RetailFinanceError::InvalidInput {
            field: "total_payments".into(),
            reason: "Number of payments must be > 0".into(),
        });
    }

    // The annuity denominator (1+r)^n - 1 is zero at r = 0.
    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(total_payments));
    }

    let growth = decimal_pow(Decimal::ONE + monthly_rate, total_payments);
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Err(RetailFinanceError::DivisionByZero {
            context: "EMI annuity factor".into(),
        });
    }

    Ok(principal * monthly_rate * growth / denominator)
}

/// Walk the declining balance month by month.
fn build_schedule(
    principal: Money,
    monthly_rate: Rate,
    total_payments: u32,
    monthly_payment: Money,
) -> Vec<AmortizationEntry> {
    let mut balance = principal;
    let mut schedule = Vec::with_capacity(total_payments as usize);

    for month in 1..=total_payments {
        let interest_component = balance * monthly_rate;
        let principal_component = monthly_payment - interest_component;
        balance -= principal_component;
        schedule.push(AmortizationEntry {
            month,
            payment: monthly_payment,
            principal_component,
            interest_component,
            balance,
        });
    }

    schedule
}

/// Iterative power: base^exp where exp is a non-negative integer.
/// Avoids `powd()` precision drift.
fn decimal_pow(base: Decimal, exp: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..exp {
        result *= base;
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // Helper: the reference loan — 300k at 7.5% over 20 years
    fn basic_loan() -> HousingLoanInput {
        HousingLoanInput {
            principal: dec!(300000),
            annual_interest_rate: dec!(7.5),
            loan_term_years: 20,
        }
    }

    fn zero_rate_loan() -> HousingLoanInput {
        HousingLoanInput {
            principal: dec!(120000),
            annual_interest_rate: Decimal::ZERO,
            loan_term_years: 10,
        }
    }

    // -----------------------------------------------------------------------
    // EMI tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_emi_known_value() {
        // 300k at 7.5% over 240 months has an EMI just under 2416.80
        let result = calculate_emi(&basic_loan()).unwrap();
        let emi = result.result.monthly_payment;
        let diff = (emi - dec!(2416.78)).abs();
        assert!(diff < dec!(0.05), "EMI should be ~2416.78, got {}", emi);
    }

    #[test]
    fn test_emi_is_positive() {
        let result = calculate_emi(&basic_loan()).unwrap();
        assert!(result.result.monthly_payment > Decimal::ZERO);
    }

    #[test]
    fn test_emi_derived_fields() {
        let input = basic_loan();
        let result = calculate_emi(&input).unwrap();
        let out = &result.result;

        assert_eq!(out.total_payments, 240);
        // monthly rate = 7.5 / 12 / 100 = 0.00625
        assert_eq!(out.monthly_interest_rate, dec!(0.00625));
        assert_eq!(
            out.total_amount_paid,
            out.monthly_payment * dec!(240)
        );
        assert_eq!(out.total_interest, out.total_amount_paid - input.principal);
    }

    #[test]
    fn test_emi_zero_rate_is_straight_line() {
        let result = calculate_emi(&zero_rate_loan()).unwrap();
        // 120000 over 120 months, no interest
        assert_eq!(result.result.monthly_payment, dec!(1000));
        assert_eq!(result.result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_emi_zero_principal_rejected() {
        let mut input = basic_loan();
        input.principal = Decimal::ZERO;
        assert!(calculate_emi(&input).is_err());
    }

    #[test]
    fn test_emi_negative_principal_rejected() {
        let mut input = basic_loan();
        input.principal = dec!(-1000);
        assert!(calculate_emi(&input).is_err());
    }

    #[test]
    fn test_emi_zero_term_rejected() {
        let mut input = basic_loan();
        input.loan_term_years = 0;
        assert!(calculate_emi(&input).is_err());
    }

    #[test]
    fn test_emi_negative_rate_rejected() {
        let mut input = basic_loan();
        input.annual_interest_rate = dec!(-1);
        assert!(calculate_emi(&input).is_err());
    }

    // -----------------------------------------------------------------------
    // Amortization schedule tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_schedule_has_one_entry_per_month() {
        let result = generate_amortization_schedule(&basic_loan()).unwrap();
        let schedule = &result.result.schedule;

        assert_eq!(schedule.len(), 240);
        for (i, entry) in schedule.iter().enumerate() {
            assert_eq!(entry.month, (i + 1) as u32);
        }
    }

    #[test]
    fn test_schedule_payment_is_constant() {
        let result = generate_amortization_schedule(&basic_loan()).unwrap();
        let emi = result.result.monthly_payment;
        for entry in &result.result.schedule {
            assert_eq!(entry.payment, emi);
        }
    }

    #[test]
    fn test_principal_components_sum_to_principal() {
        let input = basic_loan();
        let result = generate_amortization_schedule(&input).unwrap();

        let diff = (result.result.total_principal_paid - input.principal).abs();
        assert!(
            diff < dec!(0.01),
            "Principal components should sum to the principal, off by {}",
            diff
        );
    }

    #[test]
    fn test_final_balance_near_zero() {
        let result = generate_amortization_schedule(&basic_loan()).unwrap();
        assert!(
            result.result.final_balance.abs() < dec!(0.01),
            "Final balance should be ~0, got {}",
            result.result.final_balance
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_balance_strictly_decreases() {
        let input = basic_loan();
        let result = generate_amortization_schedule(&input).unwrap();

        let mut previous = input.principal;
        for entry in &result.result.schedule {
            assert!(
                entry.balance < previous,
                "Balance should strictly decrease, month {}: {} -> {}",
                entry.month,
                previous,
                entry.balance
            );
            previous = entry.balance;
        }
    }

    #[test]
    fn test_schedule_components_sum_to_payment() {
        let result = generate_amortization_schedule(&basic_loan()).unwrap();
        for entry in &result.result.schedule {
            assert_eq!(
                entry.principal_component + entry.interest_component,
                entry.payment
            );
        }
    }

    #[test]
    fn test_schedule_interest_declines_over_time() {
        let result = generate_amortization_schedule(&basic_loan()).unwrap();
        let schedule = &result.result.schedule;
        assert!(
            schedule.first().unwrap().interest_component
                > schedule.last().unwrap().interest_component
        );
    }

    #[test]
    fn test_schedule_zero_rate_no_interest() {
        let result = generate_amortization_schedule(&zero_rate_loan()).unwrap();
        for entry in &result.result.schedule {
            assert_eq!(entry.interest_component, Decimal::ZERO);
            assert_eq!(entry.principal_component, dec!(1000));
        }
        assert_eq!(result.result.final_balance, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_totals_reconcile() {
        let input = basic_loan();
        let result = generate_amortization_schedule(&input).unwrap();
        let out = &result.result;

        let total_paid = out.monthly_payment * dec!(240);
        let diff =
            (out.total_principal_paid + out.total_interest_paid - total_paid).abs();
        assert!(diff < dec!(0.01), "Totals should reconcile, off by {}", diff);
    }

    // -----------------------------------------------------------------------
    // Early closure tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_early_closure_remaining_months() {
        // Closing after 5 years of a 20-year loan leaves 15 years
        let input = EarlyClosureInput {
            loan: basic_loan(),
            closure_month: 60,
        };
        let result = calculate_early_closure(&input).unwrap();
        assert_eq!(result.result.remaining_months, 180);
    }

    #[test]
    fn test_early_closure_matches_schedule_slice() {
        let loan = basic_loan();
        let schedule = generate_amortization_schedule(&loan).unwrap();
        let expected: Money = schedule.result.schedule[60..]
            .iter()
            .map(|e| e.interest_component)
            .sum();

        let input = EarlyClosureInput {
            loan,
            closure_month: 60,
        };
        let result = calculate_early_closure(&input).unwrap();
        assert_eq!(result.result.interest_lost, expected);
    }

    #[test]
    fn test_early_closure_at_zero_loses_all_interest() {
        let loan = basic_loan();
        let schedule = generate_amortization_schedule(&loan).unwrap();

        let input = EarlyClosureInput {
            loan,
            closure_month: 0,
        };
        let result = calculate_early_closure(&input).unwrap();
        assert_eq!(
            result.result.interest_lost,
            schedule.result.total_interest_paid
        );
        assert_eq!(result.result.remaining_months, 240);
    }

    #[test]
    fn test_early_closure_per_month_figure() {
        let input = EarlyClosureInput {
            loan: basic_loan(),
            closure_month: 60,
        };
        let result = calculate_early_closure(&input).unwrap();
        let expected = result.result.interest_lost / dec!(180);
        assert_eq!(result.result.interest_lost_per_remaining_month, expected);
    }

    #[test]
    fn test_early_closure_at_maturity_rejected() {
        // Zero remaining months would divide by zero downstream
        let input = EarlyClosureInput {
            loan: basic_loan(),
            closure_month: 240,
        };
        assert!(calculate_early_closure(&input).is_err());
    }

    #[test]
    fn test_early_closure_beyond_term_rejected() {
        let input = EarlyClosureInput {
            loan: basic_loan(),
            closure_month: 241,
        };
        assert!(calculate_early_closure(&input).is_err());
    }

    // -----------------------------------------------------------------------
    // Utility tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_decimal_pow() {
        // (1.00625)^12 = 1.077632...
        let result = decimal_pow(dec!(1.00625), 12);
        let diff = (result - dec!(1.077633)).abs();
        assert!(
            diff < dec!(0.00001),
            "(1.00625)^12 should be ~1.077633, got {}",
            result
        );
    }

    #[test]
    fn test_decimal_pow_zero_exponent() {
        assert_eq!(decimal_pow(dec!(1.05), 0), Decimal::ONE);
    }

    #[test]
    fn test_level_payment_zero_rate() {
        let result = level_payment(dec!(12000), Decimal::ZERO, 12).unwrap();
        assert_eq!(result, dec!(1000));
    }
}
