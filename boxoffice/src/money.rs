//! Monetary amounts with validation.
//!
//! `Money` is always non-negative and has at most 2 decimal places, enforced
//! at construction time. Booking totals are snapshotted with
//! [`Money::times`] at reservation time and never recomputed.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

use crate::types::TicketCount;

/// Errors that can occur when working with `Money`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is negative, which is not allowed.
    #[error("money amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// The amount has too many decimal places.
    #[error("money can only have up to 2 decimal places, got: {0}")]
    TooManyDecimalPlaces(Decimal),

    /// The amount exceeds the maximum allowed value.
    #[error("money amount {0} exceeds maximum allowed value of {1}")]
    ExceedsMaximum(Decimal, Decimal),
}

/// Maximum amount of money that can be represented (1 billion).
pub const MAX_MONEY_AMOUNT: Decimal = dec!(1_000_000_000.00);

/// A monetary amount: non-negative, at most 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new `Money` value from a `Decimal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than 2 decimal
    /// places, or exceeds [`MAX_MONEY_AMOUNT`].
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() {
            return Err(MoneyError::NegativeAmount(amount));
        }

        if amount.scale() > 2 {
            return Err(MoneyError::TooManyDecimalPlaces(amount));
        }

        if amount > MAX_MONEY_AMOUNT {
            return Err(MoneyError::ExceedsMaximum(amount, MAX_MONEY_AMOUNT));
        }

        Ok(Self(amount))
    }

    /// Creates `Money` from cents (e.g., 1234 = 12.34).
    pub fn from_cents(cents: u64) -> Result<Self, MoneyError> {
        let amount = Decimal::from(cents) / dec!(100);
        Self::new(amount)
    }

    /// Returns the amount as a `Decimal`.
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the amount in cents.
    pub fn to_cents(&self) -> u64 {
        (self.0 * dec!(100)).to_u64().unwrap_or(0)
    }

    /// Multiplies a per-ticket price into a booking total.
    pub fn times(&self, tickets: TicketCount) -> Result<Self, MoneyError> {
        let count: u32 = tickets.into();
        Self::new(self.0 * Decimal::from(count))
    }

    /// Zero money value.
    pub const fn zero() -> Self {
        Self(dec!(0))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
