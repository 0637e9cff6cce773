//! Persistence port for the booking core.
//!
//! [`BookingStore`] is the backend-independent interface the services are
//! written against. Plain reads and inserts are ordinary CRUD; the four
//! compound operations are the ones with atomicity obligations:
//!
//! - [`insert_booking`](BookingStore::insert_booking) is conditional on the
//!   event's [`SeatVersion`], making check-and-reserve a single unit;
//! - [`cancel_booking`](BookingStore::cancel_booking) flips the status and
//!   releases the seats together, idempotently;
//! - [`settle_payment`](BookingStore::settle_payment) performs the
//!   no-prior-payment check, the payment insert, and the `Confirmed`
//!   transition as one unit;
//! - [`remove_event`](BookingStore::remove_event) is conditional on the event
//!   having no active bookings.
//!
//! Implementations must scope their synchronization so that operations on
//! distinct events, and payments on distinct bookings, never contend.

use async_trait::async_trait;

use crate::errors::StoreResult;
use crate::model::{Booking, Event, Payment, PaymentStatus};
use crate::types::{BookingId, EventId, PaymentId, SeatVersion, UserId};

/// Snapshot of an event's seat accounting at a point in time.
///
/// `reserved` is the sum of ticket counts over the event's non-cancelled
/// bookings; `version` identifies the state of the active booking set that
/// produced it. Pass the version back to
/// [`BookingStore::insert_booking`] to make a reservation conditional on the
/// snapshot still being current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatUsage {
    /// Sum of tickets across `Pending` and `Confirmed` bookings.
    pub reserved: u32,
    /// Version of the active booking set this snapshot was taken at.
    pub version: SeatVersion,
}

/// Backend-independent storage interface for events, bookings, and payments.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persists a new event.
    ///
    /// Fails with `DuplicateId` if the id is already in use.
    async fn insert_event(&self, event: Event) -> StoreResult<()>;

    /// Fetches an event by id.
    async fn get_event(&self, id: &EventId) -> StoreResult<Event>;

    /// Removes an event, atomically verifying that no non-cancelled booking
    /// references it.
    ///
    /// Fails with `ActiveBookings` while any `Pending` or `Confirmed`
    /// booking exists against the event.
    async fn remove_event(&self, id: &EventId) -> StoreResult<()>;

    /// Returns the event's current seat usage and version.
    async fn seat_usage(&self, event: &EventId) -> StoreResult<SeatUsage>;

    /// Persists a new `Pending` booking, conditional on the event's seat
    /// version still being `expected`.
    ///
    /// Fails with `VersionConflict` if any reservation or release on the
    /// same event committed since the caller observed `expected`. On success
    /// the event's version is bumped.
    async fn insert_booking(&self, booking: Booking, expected: SeatVersion) -> StoreResult<()>;

    /// Fetches a booking by id.
    async fn get_booking(&self, id: &BookingId) -> StoreResult<Booking>;

    /// Marks a booking `Cancelled` and returns its seats to the event's pool
    /// in one atomic step.
    ///
    /// Idempotent: cancelling an already-cancelled booking succeeds without
    /// touching the ledger. Returns the booking after the operation.
    async fn cancel_booking(&self, id: &BookingId) -> StoreResult<Booking>;

    /// Lists all bookings owned by a user.
    async fn bookings_for_user(&self, user: &UserId) -> StoreResult<Vec<Booking>>;

    /// Lists all bookings against an event.
    async fn bookings_for_event(&self, event: &EventId) -> StoreResult<Vec<Booking>>;

    /// Records a payment and transitions its booking to `Confirmed` as one
    /// atomic unit.
    ///
    /// Fails with `PaymentExists` if any payment is already attached to the
    /// booking, and with `BookingNotPending` if the booking is not `Pending`.
    /// Concurrent calls for the same booking must yield exactly one success.
    async fn settle_payment(&self, payment: Payment) -> StoreResult<()>;

    /// Fetches a payment by id.
    async fn get_payment(&self, id: &PaymentId) -> StoreResult<Payment>;

    /// Fetches the payment attached to a booking.
    ///
    /// Fails with `NoPaymentForBooking` if the booking has no payment yet.
    async fn payment_for_booking(&self, booking: &BookingId) -> StoreResult<Payment>;

    /// Lists payments across all of a user's bookings.
    async fn payments_for_user(&self, user: &UserId) -> StoreResult<Vec<Payment>>;

    /// Updates a payment's status, leaving the booking pairing untouched.
    async fn set_payment_status(
        &self,
        id: &PaymentId,
        status: PaymentStatus,
    ) -> StoreResult<Payment>;
}
