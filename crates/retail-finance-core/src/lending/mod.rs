//! Retail lending models.

pub mod amortization;
