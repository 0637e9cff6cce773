//! `boxoffice` - event inventory, booking lifecycle, and payment core.
//!
//! Organizers publish events with finite capacity; users reserve tickets and
//! pay for them. This crate is the part with invariants to protect under
//! concurrency: a venue is never oversold, a booking moves through a
//! well-defined lifecycle, and at most one payment ever attaches to a
//! booking. The surrounding HTTP/auth/search surface lives elsewhere and
//! talks to this crate through [`model::Actor`] and validated inputs.
//!
//! Storage is abstracted behind [`store::BookingStore`]; reservations use
//! optimistic concurrency over a per-event [`types::SeatVersion`] with a
//! bounded, jittered retry loop. See `boxoffice-memory` for the reference
//! in-memory adapter.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod errors;
pub mod inventory;
pub mod lifecycle;
pub mod model;
pub mod money;
pub mod payment;
pub mod retry;
pub mod store;
pub mod types;

pub use catalog::{EventCatalog, NewEvent};
pub use errors::{BookingError, BookingResult, ErrorKind, StoreError, StoreResult};
pub use inventory::{InventoryManager, ReserveRequest};
pub use lifecycle::BookingLifecycle;
pub use model::{
    Actor, Booking, BookingStatus, Event, EventTitle, Payment, PaymentMethod, PaymentStatus, Role,
};
pub use money::{Money, MoneyError};
pub use payment::{PaymentProcessor, PaymentRequest};
pub use retry::RetryConfig;
pub use store::{BookingStore, SeatUsage};
pub use types::{
    BookingId, Capacity, EventId, PaymentId, SeatVersion, TicketCount, Timestamp, TransactionId,
    UserId,
};
