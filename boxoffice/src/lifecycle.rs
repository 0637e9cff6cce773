//! Booking lifecycle: the Pending → Confirmed | Cancelled state machine.
//!
//! The `Confirmed` transition belongs to the payment processor alone; this
//! module owns explicit cancellation and the projection reads. Policy
//! adopted: a `Confirmed` booking may still be cancelled — that triggers a
//! compensating seat release but never an automatic refund.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::{BookingError, BookingResult};
use crate::inventory::InventoryManager;
use crate::model::{Actor, Booking, BookingStatus};
use crate::store::BookingStore;
use crate::types::{BookingId, EventId, UserId};

/// Owns booking state transitions and projection reads.
#[derive(Debug)]
pub struct BookingLifecycle<S> {
    store: Arc<S>,
    inventory: InventoryManager<S>,
}

impl<S> Clone for BookingLifecycle<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            inventory: self.inventory.clone(),
        }
    }
}

impl<S> BookingLifecycle<S>
where
    S: BookingStore,
{
    /// Creates a lifecycle service sharing a store with the given inventory
    /// manager.
    pub fn new(store: Arc<S>, inventory: InventoryManager<S>) -> Self {
        Self { store, inventory }
    }

    /// Cancels a booking on behalf of `actor`.
    ///
    /// Only the booking's owner or an admin may cancel. Cancelling an
    /// already-cancelled booking is a successful no-op; the seat count is
    /// unaffected. Cancelling a `Confirmed` booking releases its seats but
    /// performs no refund accounting.
    ///
    /// # Errors
    ///
    /// - [`BookingError::BookingNotFound`] if the id is unknown.
    /// - [`BookingError::Forbidden`] if the actor is neither owner nor admin.
    #[instrument(skip(self, actor), fields(user = %actor.id))]
    pub async fn cancel(&self, actor: &Actor, booking_id: &BookingId) -> BookingResult<Booking> {
        let booking = self.store.get_booking(booking_id).await?;

        if !actor.may_manage(&booking.user_id) {
            return Err(BookingError::Forbidden {
                actor: actor.id.clone(),
            });
        }

        if booking.status == BookingStatus::Cancelled {
            debug!(booking = %booking.id, "already cancelled, nothing to do");
            return Ok(booking);
        }

        self.inventory.release(booking_id).await
    }

    /// Fetches a booking by id.
    pub async fn get(&self, booking_id: &BookingId) -> BookingResult<Booking> {
        Ok(self.store.get_booking(booking_id).await?)
    }

    /// Lists all bookings owned by a user.
    pub async fn list_for_user(&self, user: &UserId) -> BookingResult<Vec<Booking>> {
        Ok(self.store.bookings_for_user(user).await?)
    }

    /// Lists all bookings against an event.
    pub async fn list_for_event(&self, event: &EventId) -> BookingResult<Vec<Booking>> {
        Ok(self.store.bookings_for_event(event).await?)
    }
}
