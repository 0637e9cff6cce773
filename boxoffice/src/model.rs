//! Domain entities: events, bookings, payments, and the acting principal.

use nutype::nutype;
use serde::{Deserialize, Serialize};

use crate::money::{Money, MoneyError};
use crate::types::{
    BookingId, Capacity, EventId, PaymentId, TicketCount, Timestamp, TransactionId, UserId,
};

/// Title of a published event.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 200),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct EventTitle(String);

/// Payment method as submitted by the caller (e.g. "card", "upi").
///
/// Opaque to the core; no gateway routing happens here.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 50),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct PaymentMethod(String);

/// Role of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// May manage the catalog and any booking or payment.
    Admin,
    /// May create bookings and manage only their own.
    User,
}

/// The authenticated principal a request acts as.
///
/// Supplied per request by the authentication collaborator; the core trusts
/// it as given and never re-validates the underlying credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The principal's user id.
    pub id: UserId,
    /// The principal's role.
    pub role: Role,
}

impl Actor {
    /// Creates a new actor.
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns whether this actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns whether this actor may manage a booking owned by `owner`.
    pub fn may_manage(&self, owner: &UserId) -> bool {
        self.is_admin() || &self.id == owner
    }
}

/// Lifecycle state of a booking.
///
/// `Pending` is the initial state set at reservation time. `Confirmed` is
/// reached only through a successful payment. `Cancelled` is reached through
/// explicit cancellation and is never left again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Seats reserved, payment outstanding.
    Pending,
    /// Payment recorded; terminal success.
    Confirmed,
    /// Cancelled; seats released, never resurrected.
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this state counts toward its event's reserved
    /// seat total.
    pub const fn holds_seats(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Status of a recorded payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Recorded but not yet settled.
    Pending,
    /// Settled successfully.
    Success,
    /// Marked failed by out-of-band reconciliation.
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A published event with finite seat capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: EventId,
    /// Human-readable title.
    pub title: EventTitle,
    /// Free-form description.
    pub description: String,
    /// When the event takes place.
    pub starts_at: Timestamp,
    /// Venue or location description.
    pub location: String,
    /// Total seat capacity; immutable once bookings exist.
    pub capacity: Capacity,
    /// Price per ticket at the time of publication.
    pub price: Money,
}

/// A reservation of seats on an event by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier.
    pub id: BookingId,
    /// Owning user.
    pub user_id: UserId,
    /// The event the seats belong to.
    pub event_id: EventId,
    /// Number of seats held.
    pub tickets: TicketCount,
    /// Price × tickets, snapshotted at creation; never recomputed.
    pub total_amount: Money,
    /// Current lifecycle state.
    pub status: BookingStatus,
    /// When the booking was created.
    pub created_at: Timestamp,
}

impl Booking {
    /// Creates a new `Pending` booking for `tickets` seats on `event`,
    /// snapshotting the total from the event's current price.
    pub fn pending(
        user_id: UserId,
        event: &Event,
        tickets: TicketCount,
    ) -> Result<Self, MoneyError> {
        let total_amount = event.price.times(tickets)?;
        Ok(Self {
            id: BookingId::generate(),
            user_id,
            event_id: event.id.clone(),
            tickets,
            total_amount,
            status: BookingStatus::Pending,
            created_at: Timestamp::now(),
        })
    }
}

/// A payment attached to exactly one booking.
///
/// The payment references its booking, not vice versa; the pairing is
/// immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// The booking this payment settles.
    pub booking_id: BookingId,
    /// Amount as submitted by the caller.
    pub amount: Money,
    /// Opaque payment method label.
    pub method: PaymentMethod,
    /// Current status.
    pub status: PaymentStatus,
    /// Locally generated, globally unique transaction reference.
    pub transaction_id: TransactionId,
    /// When the payment was recorded.
    pub created_at: Timestamp,
}

impl Payment {
    /// Creates a successful payment for `booking_id` with a fresh
    /// transaction id.
    pub fn succeeded(booking_id: BookingId, amount: Money, method: PaymentMethod) -> Self {
        Self {
            id: PaymentId::generate(),
            booking_id,
            amount,
            method,
            status: PaymentStatus::Success,
            transaction_id: TransactionId::generate(),
            created_at: Timestamp::now(),
        }
    }
}
