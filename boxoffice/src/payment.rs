//! Payment processor: one payment per booking, confirmed atomically.
//!
//! `process` is the only way a booking reaches `Confirmed`. The
//! no-prior-payment check, the payment insert, and the status transition are
//! delegated to the store's `settle_payment` as a single atomic unit, so two
//! racing calls for one booking yield exactly one success and one
//! `DuplicatePayment` failure. Every store call runs under a per-call time
//! budget, so a wedged adapter surfaces as a retryable `Timeout` instead of
//! hanging the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::errors::{BookingError, BookingResult, StoreError};
use crate::model::{Actor, BookingStatus, Payment, PaymentMethod, PaymentStatus};
use crate::money::Money;
use crate::store::BookingStore;
use crate::types::{BookingId, PaymentId, UserId};

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// A validated payment request.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// The booking being paid for.
    pub booking_id: BookingId,
    /// Amount as submitted; recorded, not recomputed.
    pub amount: Money,
    /// Opaque payment method label.
    pub method: PaymentMethod,
}

/// Enforces the one-booking-one-payment invariant.
#[derive(Debug)]
pub struct PaymentProcessor<S> {
    store: Arc<S>,
    op_timeout: Duration,
}

impl<S> Clone for PaymentProcessor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            op_timeout: self.op_timeout,
        }
    }
}

impl<S> PaymentProcessor<S>
where
    S: BookingStore,
{
    /// Creates a payment processor over the given store.
    pub const fn new(store: Arc<S>) -> Self {
        Self {
            store,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// Sets the time budget for a single call against the store.
    #[must_use]
    pub const fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Processes a payment for a `Pending` booking.
    ///
    /// On success the payment is recorded with status `Success` and a fresh
    /// opaque transaction id, and the booking becomes `Confirmed` in the
    /// same atomic unit.
    ///
    /// # Errors
    ///
    /// - [`BookingError::BookingNotFound`] if the booking id is unknown.
    /// - [`BookingError::DuplicatePayment`] if a payment already exists for
    ///   the booking (a `Confirmed` booking signals a duplicate attempt).
    /// - [`BookingError::NotPending`] if the booking was cancelled.
    /// - [`BookingError::Timeout`] if a store call exceeded its time budget
    ///   (retryable).
    #[instrument(skip(self, request), fields(booking = %request.booking_id))]
    pub async fn process(&self, request: PaymentRequest) -> BookingResult<Payment> {
        let booking = self.timed(self.store.get_booking(&request.booking_id)).await??;

        // Pre-flight check for a friendly error; the store re-checks under
        // its own synchronization, which is what racing callers hit.
        match booking.status {
            BookingStatus::Confirmed => {
                return Err(BookingError::DuplicatePayment(booking.id));
            }
            BookingStatus::Cancelled => {
                return Err(BookingError::NotPending(booking.id));
            }
            BookingStatus::Pending => {}
        }

        let payment = Payment::succeeded(request.booking_id, request.amount, request.method);
        self.timed(self.store.settle_payment(payment.clone())).await??;

        debug!(
            payment = %payment.id,
            transaction = %payment.transaction_id,
            "payment settled, booking confirmed"
        );
        Ok(payment)
    }

    /// Updates a payment's status. Admin only; the booking's state and the
    /// booking/payment pairing are never altered.
    #[instrument(skip(self, actor), fields(user = %actor.id))]
    pub async fn update_status(
        &self,
        actor: &Actor,
        payment_id: &PaymentId,
        status: PaymentStatus,
    ) -> BookingResult<Payment> {
        if !actor.is_admin() {
            return Err(BookingError::Forbidden {
                actor: actor.id.clone(),
            });
        }
        Ok(self
            .timed(self.store.set_payment_status(payment_id, status))
            .await??)
    }

    /// Fetches a payment by id.
    pub async fn get(&self, payment_id: &PaymentId) -> BookingResult<Payment> {
        Ok(self.timed(self.store.get_payment(payment_id)).await??)
    }

    /// Fetches the payment attached to a booking.
    pub async fn for_booking(&self, booking_id: &BookingId) -> BookingResult<Payment> {
        Ok(self.timed(self.store.payment_for_booking(booking_id)).await??)
    }

    /// Lists payments across all of a user's bookings.
    pub async fn list_for_user(&self, user: &UserId) -> BookingResult<Vec<Payment>> {
        Ok(self.timed(self.store.payments_for_user(user)).await??)
    }

    async fn timed<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, StoreError>>,
    ) -> BookingResult<Result<T, StoreError>> {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| BookingError::Timeout(self.op_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use crate::errors::{ErrorKind, StoreResult};
    use crate::model::{Booking, Event, EventTitle};
    use crate::store::SeatUsage;
    use crate::types::{Capacity, EventId, SeatVersion, TicketCount, Timestamp};

    // A store whose settlement never completes, as a wedged adapter would.
    struct StalledStore {
        booking: Booking,
    }

    #[async_trait]
    impl BookingStore for StalledStore {
        async fn insert_event(&self, _event: Event) -> StoreResult<()> {
            unreachable!()
        }

        async fn get_event(&self, _id: &EventId) -> StoreResult<Event> {
            unreachable!()
        }

        async fn remove_event(&self, _id: &EventId) -> StoreResult<()> {
            unreachable!()
        }

        async fn seat_usage(&self, _event: &EventId) -> StoreResult<SeatUsage> {
            unreachable!()
        }

        async fn insert_booking(
            &self,
            _booking: Booking,
            _expected: SeatVersion,
        ) -> StoreResult<()> {
            unreachable!()
        }

        async fn get_booking(&self, _id: &BookingId) -> StoreResult<Booking> {
            Ok(self.booking.clone())
        }

        async fn cancel_booking(&self, _id: &BookingId) -> StoreResult<Booking> {
            unreachable!()
        }

        async fn bookings_for_user(&self, _user: &UserId) -> StoreResult<Vec<Booking>> {
            unreachable!()
        }

        async fn bookings_for_event(&self, _event: &EventId) -> StoreResult<Vec<Booking>> {
            unreachable!()
        }

        async fn settle_payment(&self, _payment: Payment) -> StoreResult<()> {
            std::future::pending().await
        }

        async fn get_payment(&self, _id: &PaymentId) -> StoreResult<Payment> {
            unreachable!()
        }

        async fn payment_for_booking(&self, _booking: &BookingId) -> StoreResult<Payment> {
            unreachable!()
        }

        async fn payments_for_user(&self, _user: &UserId) -> StoreResult<Vec<Payment>> {
            unreachable!()
        }

        async fn set_payment_status(
            &self,
            _id: &PaymentId,
            _status: PaymentStatus,
        ) -> StoreResult<Payment> {
            unreachable!()
        }
    }

    fn pending_booking() -> Booking {
        let event = Event {
            id: EventId::generate(),
            title: EventTitle::try_new("Jazz Brunch").unwrap(),
            description: String::new(),
            starts_at: Timestamp::now(),
            location: "Rooftop".to_string(),
            capacity: Capacity::try_new(10).unwrap(),
            price: Money::new(dec!(40.00)).unwrap(),
        };
        Booking::pending(
            UserId::try_new("user-1").unwrap(),
            &event,
            TicketCount::try_new(1).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn process_times_out_instead_of_hanging_on_a_wedged_store() {
        let booking = pending_booking();
        let store = Arc::new(StalledStore {
            booking: booking.clone(),
        });
        let payments =
            PaymentProcessor::new(store).with_op_timeout(Duration::from_millis(50));

        let err = payments
            .process(PaymentRequest {
                booking_id: booking.id,
                amount: booking.total_amount,
                method: PaymentMethod::try_new("card").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Timeout(_)));
        assert_eq!(err.kind(), ErrorKind::Retryable);
        assert!(err.is_retryable());
    }
}
