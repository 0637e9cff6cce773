//! Error types for the booking core.
//!
//! Two layers of errors mirror the two layers of the crate:
//!
//! - [`StoreError`] is returned by [`BookingStore`](crate::store::BookingStore)
//!   implementations and speaks in storage terms (missing rows, version
//!   conflicts, violated conditional writes).
//! - [`BookingError`] is returned by the services and speaks in domain terms.
//!   Its [`ErrorKind`] projection is what the API collaborator maps to
//!   response codes: not-found, conflict, forbidden, validation, retryable.
//!
//! No error is swallowed: a failed capacity check never falls through to
//! creating the booking anyway, and nothing is retried beyond the bounded
//! optimistic loop in the inventory manager.

use std::time::Duration;

use thiserror::Error;

use crate::money::MoneyError;
use crate::types::{BookingId, EventId, PaymentId, SeatVersion, UserId};

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result alias for service operations.
pub type BookingResult<T> = Result<T, BookingError>;

/// Errors raised by `BookingStore` implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested event does not exist.
    #[error("event '{0}' not found")]
    EventNotFound(EventId),

    /// The requested booking does not exist.
    #[error("booking '{0}' not found")]
    BookingNotFound(BookingId),

    /// The requested payment does not exist.
    #[error("payment '{0}' not found")]
    PaymentNotFound(PaymentId),

    /// No payment has been recorded for the booking.
    #[error("no payment recorded for booking '{0}'")]
    NoPaymentForBooking(BookingId),

    /// A conditional write observed a seat version other than the one the
    /// caller based its decision on.
    #[error("seat version conflict on event '{event}': expected {expected}, current {current}")]
    VersionConflict {
        /// The contended event.
        event: EventId,
        /// The version the caller expected.
        expected: SeatVersion,
        /// The version actually found.
        current: SeatVersion,
    },

    /// A payment already exists for the booking.
    #[error("payment already recorded for booking '{0}'")]
    PaymentExists(BookingId),

    /// The booking is not in the `Pending` state required by the operation.
    #[error("booking '{0}' is not pending")]
    BookingNotPending(BookingId),

    /// The event still has non-cancelled bookings.
    #[error("event '{0}' has active bookings")]
    ActiveBookings(EventId),

    /// An entity with the given identifier already exists.
    #[error("identifier '{0}' already exists")]
    DuplicateId(String),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The operation did not complete within its time budget.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors raised by the booking services.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BookingError {
    /// Malformed input that survived the caller's validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced event does not exist.
    #[error("event '{0}' not found")]
    EventNotFound(EventId),

    /// The referenced booking does not exist.
    #[error("booking '{0}' not found")]
    BookingNotFound(BookingId),

    /// The referenced payment does not exist.
    #[error("payment '{0}' not found")]
    PaymentNotFound(PaymentId),

    /// No payment has been recorded for the booking.
    #[error("no payment recorded for booking '{0}'")]
    NoPaymentForBooking(BookingId),

    /// Fewer seats remain than were requested.
    #[error("event '{event}' is overbooked: {requested} requested, {available} available")]
    Overbooked {
        /// The event that ran out of seats.
        event: EventId,
        /// Seats the caller asked for.
        requested: u32,
        /// Seats actually remaining.
        available: u32,
    },

    /// A payment already exists for the booking.
    #[error("duplicate payment for booking '{0}'")]
    DuplicatePayment(BookingId),

    /// The booking is not in the state the operation requires.
    #[error("booking '{0}' is not pending")]
    NotPending(BookingId),

    /// The event cannot be deleted while non-cancelled bookings reference it.
    #[error("event '{0}' still has active bookings")]
    EventHasActiveBookings(EventId),

    /// The actor lacks permission for the operation.
    #[error("actor '{actor}' lacks permission for this operation")]
    Forbidden {
        /// The actor that was refused.
        actor: UserId,
    },

    /// Reservation retries were exhausted under contention; safe to retry.
    #[error("reservation contention on event '{0}': retries exhausted")]
    Contention(EventId),

    /// The operation hit its time budget; safe to retry.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// An unclassified store failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

/// Coarse error taxonomy the API collaborator maps to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown event, booking, or payment id.
    NotFound,
    /// Overbooked, duplicate payment, or wrong lifecycle state.
    Conflict,
    /// Actor lacks permission.
    Forbidden,
    /// Malformed quantities or amounts.
    Validation,
    /// Transient contention or timeout; the caller may retry.
    Retryable,
    /// Anything else; log and investigate.
    Internal,
}

impl BookingError {
    /// Projects this error onto the coarse taxonomy.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::EventNotFound(_)
            | Self::BookingNotFound(_)
            | Self::PaymentNotFound(_)
            | Self::NoPaymentForBooking(_) => ErrorKind::NotFound,
            Self::Overbooked { .. }
            | Self::DuplicatePayment(_)
            | Self::NotPending(_)
            | Self::EventHasActiveBookings(_) => ErrorKind::Conflict,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Contention(_) | Self::Timeout(_) => ErrorKind::Retryable,
            Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may safely retry the operation as-is.
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Retryable)
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound(id) => Self::EventNotFound(id),
            StoreError::BookingNotFound(id) => Self::BookingNotFound(id),
            StoreError::PaymentNotFound(id) => Self::PaymentNotFound(id),
            StoreError::NoPaymentForBooking(id) => Self::NoPaymentForBooking(id),
            StoreError::PaymentExists(id) => Self::DuplicatePayment(id),
            StoreError::BookingNotPending(id) => Self::NotPending(id),
            StoreError::ActiveBookings(id) => Self::EventHasActiveBookings(id),
            // A version conflict that escapes the retry loop surfaces as
            // retryable contention on the affected event.
            StoreError::VersionConflict { event, .. } => Self::Contention(event),
            StoreError::Timeout(elapsed) => Self::Timeout(elapsed),
            other @ (StoreError::DuplicateId(_) | StoreError::Unavailable(_)) => Self::Store(other),
        }
    }
}

impl From<MoneyError> for BookingError {
    fn from(err: MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}
