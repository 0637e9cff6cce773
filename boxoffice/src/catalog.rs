//! Event catalog: publication and retirement of events.
//!
//! Pure metadata plus capacity; the catalog itself has no concurrency
//! concerns beyond deletion, which must atomically verify that no active
//! booking still references the event.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::{BookingError, BookingResult};
use crate::model::{Actor, Event, EventTitle};
use crate::money::Money;
use crate::store::BookingStore;
use crate::types::{Capacity, EventId, Timestamp};

/// Input for publishing a new event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Human-readable title.
    pub title: EventTitle,
    /// Free-form description.
    pub description: String,
    /// When the event takes place.
    pub starts_at: Timestamp,
    /// Venue or location description.
    pub location: String,
    /// Total seat capacity.
    pub capacity: Capacity,
    /// Price per ticket.
    pub price: Money,
}

/// Holds event metadata and capacity.
#[derive(Debug)]
pub struct EventCatalog<S> {
    store: Arc<S>,
}

impl<S> Clone for EventCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> EventCatalog<S>
where
    S: BookingStore,
{
    /// Creates a catalog over the given store.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Publishes a new event. Admin only.
    #[instrument(skip(self, actor, new_event), fields(user = %actor.id))]
    pub async fn create(&self, actor: &Actor, new_event: NewEvent) -> BookingResult<Event> {
        if !actor.is_admin() {
            return Err(BookingError::Forbidden {
                actor: actor.id.clone(),
            });
        }

        let event = Event {
            id: EventId::generate(),
            title: new_event.title,
            description: new_event.description,
            starts_at: new_event.starts_at,
            location: new_event.location,
            capacity: new_event.capacity,
            price: new_event.price,
        };
        self.store.insert_event(event.clone()).await?;

        debug!(event = %event.id, capacity = %event.capacity, "event published");
        Ok(event)
    }

    /// Fetches an event by id.
    pub async fn get(&self, event_id: &EventId) -> BookingResult<Event> {
        Ok(self.store.get_event(event_id).await?)
    }

    /// Deletes an event. Admin only.
    ///
    /// Fails with [`BookingError::EventHasActiveBookings`] while any
    /// non-cancelled booking references the event, so historical bookings
    /// always resolve to a real event.
    #[instrument(skip(self, actor), fields(user = %actor.id))]
    pub async fn delete(&self, actor: &Actor, event_id: &EventId) -> BookingResult<()> {
        if !actor.is_admin() {
            return Err(BookingError::Forbidden {
                actor: actor.id.clone(),
            });
        }

        self.store.remove_event(event_id).await?;
        debug!(event = %event_id, "event deleted");
        Ok(())
    }
}
