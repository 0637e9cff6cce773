//! Inventory manager: atomic check-and-reserve over event capacity.
//!
//! The original sin this module exists to avoid is check-then-act: reading a
//! seat count, comparing it, and inserting the booking as separate steps lets
//! two racing requests both win the last seat. Here the decision is made
//! against a [`SeatUsage`] snapshot and committed with a conditional write on
//! the snapshot's [`SeatVersion`]; if anything touched the event's active
//! booking set in between, the write fails with a version conflict and the
//! whole attempt is retried with backoff. Reservations on distinct events
//! never contend.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::errors::{BookingError, BookingResult, StoreError};
use crate::model::{Actor, Booking};
use crate::retry::RetryConfig;
use crate::store::{BookingStore, SeatUsage};
use crate::types::{BookingId, EventId, TicketCount};

/// A validated reservation request.
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    /// The event to reserve seats on.
    pub event_id: EventId,
    /// How many seats to reserve.
    pub tickets: TicketCount,
}

/// Computes and reserves available seats; owns the no-oversell invariant.
#[derive(Debug)]
pub struct InventoryManager<S> {
    store: Arc<S>,
    retry: RetryConfig,
}

impl<S> Clone for InventoryManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            retry: self.retry.clone(),
        }
    }
}

impl<S> InventoryManager<S>
where
    S: BookingStore,
{
    /// Creates an inventory manager with the default retry configuration.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the retry configuration.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Reserves `tickets` seats on an event for the acting user, creating a
    /// `Pending` booking.
    ///
    /// # Errors
    ///
    /// - [`BookingError::EventNotFound`] if the event id is unknown.
    /// - [`BookingError::Overbooked`] if fewer seats remain than requested.
    /// - [`BookingError::Contention`] if retries were exhausted under
    ///   concurrent load (retryable).
    /// - [`BookingError::Timeout`] if an attempt exceeded its time budget
    ///   (retryable).
    #[instrument(skip(self, actor), fields(user = %actor.id))]
    pub async fn reserve(&self, actor: &Actor, request: ReserveRequest) -> BookingResult<Booking> {
        let event = self.timed(self.store.get_event(&request.event_id)).await??;

        for attempt in 0..self.retry.max_attempts {
            let usage = self.timed(self.store.seat_usage(&event.id)).await??;

            let requested: u32 = request.tickets.into();
            let available = available_seats(&usage, event.capacity.into());
            if requested > available {
                return Err(BookingError::Overbooked {
                    event: event.id,
                    requested,
                    available,
                });
            }

            let booking = Booking::pending(actor.id.clone(), &event, request.tickets)?;
            match self
                .timed(self.store.insert_booking(booking.clone(), usage.version))
                .await?
            {
                Ok(()) => {
                    debug!(booking = %booking.id, tickets = requested, "seats reserved");
                    return Ok(booking);
                }
                Err(StoreError::VersionConflict { .. }) => {
                    let delay = self.retry.delay_for(attempt);
                    debug!(
                        event = %event.id,
                        attempt,
                        ?delay,
                        "seat version conflict, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(other) => return Err(other.into()),
            }
        }

        warn!(event = %event.id, "reservation retries exhausted");
        Err(BookingError::Contention(event.id))
    }

    /// Releases a booking's seats back to its event by marking it
    /// `Cancelled`.
    ///
    /// Idempotent: releasing an already-cancelled booking is a successful
    /// no-op. Returns the booking after the operation.
    #[instrument(skip(self))]
    pub async fn release(&self, booking_id: &BookingId) -> BookingResult<Booking> {
        let booking = self.timed(self.store.cancel_booking(booking_id)).await??;
        debug!(event = %booking.event_id, "seats released");
        Ok(booking)
    }

    async fn timed<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, StoreError>>,
    ) -> BookingResult<Result<T, StoreError>> {
        tokio::time::timeout(self.retry.op_timeout, op)
            .await
            .map_err(|_| BookingError::Timeout(self.retry.op_timeout))
    }
}

const fn available_seats(usage: &SeatUsage, capacity: u32) -> u32 {
    capacity.saturating_sub(usage.reserved)
}
