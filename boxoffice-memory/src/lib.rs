//! In-memory adapter for the `boxoffice` booking core.
//!
//! This crate provides an in-memory implementation of the `BookingStore`
//! trait, useful for testing and development scenarios where persistence is
//! not required. Synchronization is scoped the way the core requires it:
//! each event carries its own seat ledger lock and each booking its own
//! slot lock, so reservations on distinct events and payments on distinct
//! bookings never contend, and plain reads never block writers for long.
//!
//! Lock ordering (coarse to fine): booking slot, then the events map, then a
//! seat ledger, then the bookings map, then the payments map. Map guards are
//! dropped before the next lock in the chain is taken wherever possible.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use boxoffice::errors::{StoreError, StoreResult};
use boxoffice::model::{Booking, BookingStatus, Event, Payment, PaymentStatus};
use boxoffice::store::{BookingStore, SeatUsage};
use boxoffice::types::{BookingId, EventId, PaymentId, SeatVersion, UserId};

/// Per-event seat accounting: the active holds and the version every
/// mutation of the set bumps.
struct SeatLedger {
    version: SeatVersion,
    holds: HashMap<BookingId, u32>,
    // Set when the event is removed, so an insert racing the removal via a
    // stale ledger handle fails instead of reserving seats on a dead event.
    retired: bool,
}

impl SeatLedger {
    fn new() -> Self {
        Self {
            version: SeatVersion::initial(),
            holds: HashMap::new(),
            retired: false,
        }
    }

    fn reserved(&self) -> u32 {
        self.holds.values().sum()
    }
}

struct EventEntry {
    event: Event,
    seats: Arc<Mutex<SeatLedger>>,
}

/// A booking together with the id of its payment, if one was settled.
struct BookingSlot {
    booking: Booking,
    payment: Option<PaymentId>,
}

/// Thread-safe in-memory booking store for testing.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    events: Arc<RwLock<HashMap<EventId, EventEntry>>>,
    bookings: Arc<RwLock<HashMap<BookingId, Arc<Mutex<BookingSlot>>>>>,
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryBookingStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn seat_ledger(&self, event: &EventId) -> StoreResult<Arc<Mutex<SeatLedger>>> {
        let events = self.events.read();
        events
            .get(event)
            .map(|entry| Arc::clone(&entry.seats))
            .ok_or_else(|| StoreError::EventNotFound(event.clone()))
    }

    fn booking_slot(&self, id: &BookingId) -> StoreResult<Arc<Mutex<BookingSlot>>> {
        let bookings = self.bookings.read();
        bookings
            .get(id)
            .map(Arc::clone)
            .ok_or_else(|| StoreError::BookingNotFound(id.clone()))
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert_event(&self, event: Event) -> StoreResult<()> {
        let mut events = self.events.write();
        if events.contains_key(&event.id) {
            return Err(StoreError::DuplicateId(event.id.to_string()));
        }
        events.insert(
            event.id.clone(),
            EventEntry {
                event,
                seats: Arc::new(Mutex::new(SeatLedger::new())),
            },
        );
        Ok(())
    }

    async fn get_event(&self, id: &EventId) -> StoreResult<Event> {
        let events = self.events.read();
        events
            .get(id)
            .map(|entry| entry.event.clone())
            .ok_or_else(|| StoreError::EventNotFound(id.clone()))
    }

    async fn remove_event(&self, id: &EventId) -> StoreResult<()> {
        let mut events = self.events.write();
        let entry = events
            .get(id)
            .ok_or_else(|| StoreError::EventNotFound(id.clone()))?;

        {
            let mut seats = entry.seats.lock();
            if !seats.holds.is_empty() {
                return Err(StoreError::ActiveBookings(id.clone()));
            }
            seats.retired = true;
        }

        events.remove(id);
        Ok(())
    }

    async fn seat_usage(&self, event: &EventId) -> StoreResult<SeatUsage> {
        let ledger = self.seat_ledger(event)?;
        let seats = ledger.lock();
        Ok(SeatUsage {
            reserved: seats.reserved(),
            version: seats.version,
        })
    }

    async fn insert_booking(&self, booking: Booking, expected: SeatVersion) -> StoreResult<()> {
        let ledger = self.seat_ledger(&booking.event_id)?;
        let mut seats = ledger.lock();

        if seats.retired {
            return Err(StoreError::EventNotFound(booking.event_id.clone()));
        }
        if seats.version != expected {
            return Err(StoreError::VersionConflict {
                event: booking.event_id.clone(),
                expected,
                current: seats.version,
            });
        }

        let mut bookings = self.bookings.write();
        if bookings.contains_key(&booking.id) {
            return Err(StoreError::DuplicateId(booking.id.to_string()));
        }

        seats.holds.insert(booking.id.clone(), booking.tickets.into());
        seats.version = seats.version.next();
        bookings.insert(
            booking.id.clone(),
            Arc::new(Mutex::new(BookingSlot {
                booking,
                payment: None,
            })),
        );
        Ok(())
    }

    async fn get_booking(&self, id: &BookingId) -> StoreResult<Booking> {
        let slot = self.booking_slot(id)?;
        let guard = slot.lock();
        Ok(guard.booking.clone())
    }

    async fn cancel_booking(&self, id: &BookingId) -> StoreResult<Booking> {
        let slot = self.booking_slot(id)?;
        let mut guard = slot.lock();

        if guard.booking.status == BookingStatus::Cancelled {
            return Ok(guard.booking.clone());
        }

        let ledger = self.seat_ledger(&guard.booking.event_id)?;
        {
            let mut seats = ledger.lock();
            seats.holds.remove(id);
            seats.version = seats.version.next();
        }

        guard.booking.status = BookingStatus::Cancelled;
        Ok(guard.booking.clone())
    }

    async fn bookings_for_user(&self, user: &UserId) -> StoreResult<Vec<Booking>> {
        let slots: Vec<_> = self.bookings.read().values().map(Arc::clone).collect();
        Ok(slots
            .iter()
            .map(|slot| slot.lock().booking.clone())
            .filter(|booking| &booking.user_id == user)
            .collect())
    }

    async fn bookings_for_event(&self, event: &EventId) -> StoreResult<Vec<Booking>> {
        let slots: Vec<_> = self.bookings.read().values().map(Arc::clone).collect();
        Ok(slots
            .iter()
            .map(|slot| slot.lock().booking.clone())
            .filter(|booking| &booking.event_id == event)
            .collect())
    }

    async fn settle_payment(&self, payment: Payment) -> StoreResult<()> {
        let slot = self.booking_slot(&payment.booking_id)?;
        let mut guard = slot.lock();

        if guard.payment.is_some() {
            return Err(StoreError::PaymentExists(payment.booking_id.clone()));
        }
        if guard.booking.status != BookingStatus::Pending {
            return Err(StoreError::BookingNotPending(payment.booking_id.clone()));
        }

        let mut payments = self.payments.write();
        if payments.contains_key(&payment.id) {
            return Err(StoreError::DuplicateId(payment.id.to_string()));
        }

        guard.payment = Some(payment.id.clone());
        guard.booking.status = BookingStatus::Confirmed;
        payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    async fn get_payment(&self, id: &PaymentId) -> StoreResult<Payment> {
        let payments = self.payments.read();
        payments
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::PaymentNotFound(id.clone()))
    }

    async fn payment_for_booking(&self, booking: &BookingId) -> StoreResult<Payment> {
        let payments = self.payments.read();
        payments
            .values()
            .find(|payment| &payment.booking_id == booking)
            .cloned()
            .ok_or_else(|| StoreError::NoPaymentForBooking(booking.clone()))
    }

    async fn payments_for_user(&self, user: &UserId) -> StoreResult<Vec<Payment>> {
        let owned: Vec<BookingId> = self
            .bookings_for_user(user)
            .await?
            .into_iter()
            .map(|booking| booking.id)
            .collect();

        let payments = self.payments.read();
        Ok(payments
            .values()
            .filter(|payment| owned.contains(&payment.booking_id))
            .cloned()
            .collect())
    }

    async fn set_payment_status(
        &self,
        id: &PaymentId,
        status: PaymentStatus,
    ) -> StoreResult<Payment> {
        let mut payments = self.payments.write();
        let payment = payments
            .get_mut(id)
            .ok_or_else(|| StoreError::PaymentNotFound(id.clone()))?;
        payment.status = status;
        Ok(payment.clone())
    }
}
