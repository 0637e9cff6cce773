//! Core identifier and quantity types for the booking system.
//!
//! All types use smart constructors to ensure validity at construction time,
//! following the "parse, don't validate" principle. Identifiers are prefixed,
//! UUIDv7-backed strings so they sort roughly by creation time and are
//! recognizable in logs.

use chrono::{DateTime, Utc};
use nutype::nutype;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a published event.
///
/// `EventId` values are guaranteed non-empty, at most 50 characters, and
/// shaped like `EVT-<uppercase hex>`.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 50, regex = r"^EVT-[A-Z0-9]+$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct EventId(String);

impl EventId {
    /// Generates a new unique `EventId`.
    pub fn generate() -> Self {
        let uuid = Uuid::now_v7();
        Self::try_new(format!("EVT-{}", uuid.simple().to_string().to_uppercase()))
            .expect("generated id matches the EVT- pattern")
    }
}

/// Identifier of a booking.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 50, regex = r"^BKG-[A-Z0-9]+$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct BookingId(String);

impl BookingId {
    /// Generates a new unique `BookingId`.
    pub fn generate() -> Self {
        let uuid = Uuid::now_v7();
        Self::try_new(format!("BKG-{}", uuid.simple().to_string().to_uppercase()))
            .expect("generated id matches the BKG- pattern")
    }
}

/// Identifier of a payment.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 50, regex = r"^PAY-[A-Z0-9]+$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct PaymentId(String);

impl PaymentId {
    /// Generates a new unique `PaymentId`.
    pub fn generate() -> Self {
        let uuid = Uuid::now_v7();
        Self::try_new(format!("PAY-{}", uuid.simple().to_string().to_uppercase()))
            .expect("generated id matches the PAY- pattern")
    }
}

/// Identifier of a user, supplied by the authentication collaborator.
///
/// The core never creates users; it only receives their ids alongside a role.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 50),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct UserId(String);

/// Opaque transaction identifier attached to a payment at creation.
///
/// Generated locally; no payment gateway is involved.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 50, regex = r"^TXN-[A-Z0-9]+$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generates a new globally unique `TransactionId`.
    pub fn generate() -> Self {
        let uuid = Uuid::now_v7();
        Self::try_new(format!("TXN-{}", uuid.simple().to_string().to_uppercase()))
            .expect("generated id matches the TXN- pattern")
    }
}

/// Number of tickets in a single booking.
///
/// Always at least 1; a booking for zero tickets is unrepresentable.
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 10_000),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Display,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct TicketCount(u32);

/// Total seat capacity of an event.
///
/// Immutable once bookings exist against the event; resizing is out of scope.
#[nutype(
    validate(less_or_equal = 1_000_000),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Display,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct Capacity(u32);

/// Version of an event's seat ledger, used for optimistic concurrency.
///
/// Every mutation of the event's active booking set (reserve or release)
/// bumps the version, so a conditional write based on a stale read fails
/// and the caller retries against fresh state.
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize
))]
pub struct SeatVersion(u64);

impl SeatVersion {
    /// The version of an event before any booking has touched it.
    pub fn initial() -> Self {
        Self::new(0)
    }

    /// Returns the next version after this one.
    #[must_use]
    pub fn next(self) -> Self {
        let current: u64 = self.into();
        Self::new(current + 1)
    }
}

/// A timestamp recording when an entity was created or an action occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a new timestamp from a UTC `DateTime`.
    pub const fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Creates a timestamp representing the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying `DateTime`.
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::new(datetime)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
