//! Race tests: the store must hold its invariants under genuinely concurrent
//! callers, not just interleaved awaits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Barrier;

use boxoffice::{
    Actor, BookingError, BookingLifecycle, BookingStatus, BookingStore, Capacity, EventCatalog,
    EventId,
    EventTitle, InventoryManager, Money, NewEvent, PaymentMethod, PaymentProcessor, PaymentRequest,
    ReserveRequest, RetryConfig, Role, TicketCount, Timestamp, UserId,
};
use boxoffice_memory::InMemoryBookingStore;

fn admin() -> Actor {
    Actor::new(UserId::try_new("admin-1").unwrap(), Role::Admin)
}

fn user(id: &str) -> Actor {
    Actor::new(UserId::try_new(id).unwrap(), Role::User)
}

// Retry hard enough that contention alone never fails a reservation; only a
// genuine sell-out should.
fn patient_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 64,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(20),
        backoff_multiplier: 2.0,
        op_timeout: Duration::from_secs(5),
    }
}

async fn seeded_event(
    catalog: &EventCatalog<InMemoryBookingStore>,
    capacity: u32,
) -> EventId {
    catalog
        .create(
            &admin(),
            NewEvent {
                title: EventTitle::try_new("Stress Night").unwrap(),
                description: String::new(),
                starts_at: Timestamp::now(),
                location: "Arena".to_string(),
                capacity: Capacity::try_new(capacity).unwrap(),
                price: Money::from_cents(2500).unwrap(),
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_reservations_never_oversell() {
    let store = Arc::new(InMemoryBookingStore::new());
    let catalog = EventCatalog::new(Arc::clone(&store));
    let inventory =
        InventoryManager::new(Arc::clone(&store)).with_retry_config(patient_retry());

    let capacity = 10u32;
    let contenders = 25usize;
    let event_id = seeded_event(&catalog, capacity).await;

    let barrier = Arc::new(Barrier::new(contenders));
    let mut handles = Vec::with_capacity(contenders);
    for i in 0..contenders {
        let inventory = inventory.clone();
        let event_id = event_id.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            let actor = user(&format!("user-{i}"));
            barrier.wait().await;
            inventory
                .reserve(
                    &actor,
                    ReserveRequest {
                        event_id,
                        tickets: TicketCount::try_new(1).unwrap(),
                    },
                )
                .await
        }));
    }

    let mut succeeded = 0u32;
    let mut overbooked = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(booking) => {
                assert_eq!(booking.status, BookingStatus::Pending);
                succeeded += 1;
            }
            Err(BookingError::Overbooked { .. }) => overbooked += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, capacity);
    assert_eq!(overbooked, contenders as u32 - capacity);
    assert_eq!(
        store.seat_usage(&event_id).await.unwrap().reserved,
        capacity
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_multi_ticket_reservations_never_exceed_capacity() {
    let store = Arc::new(InMemoryBookingStore::new());
    let catalog = EventCatalog::new(Arc::clone(&store));
    let inventory =
        InventoryManager::new(Arc::clone(&store)).with_retry_config(patient_retry());

    let capacity = 12u32;
    let event_id = seeded_event(&catalog, capacity).await;

    // 10 contenders wanting 3 seats each: at most 4 can win.
    let barrier = Arc::new(Barrier::new(10));
    let mut handles = Vec::new();
    for i in 0..10 {
        let inventory = inventory.clone();
        let event_id = event_id.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            let actor = user(&format!("user-{i}"));
            barrier.wait().await;
            inventory
                .reserve(
                    &actor,
                    ReserveRequest {
                        event_id,
                        tickets: TicketCount::try_new(3).unwrap(),
                    },
                )
                .await
        }));
    }

    let mut reserved = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => reserved += 3,
            Err(BookingError::Overbooked { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(reserved <= capacity);
    assert_eq!(reserved, 12, "all 4 fitting reservations should land");
    assert_eq!(store.seat_usage(&event_id).await.unwrap().reserved, reserved);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_payments_settle_exactly_once() {
    let store = Arc::new(InMemoryBookingStore::new());
    let catalog = EventCatalog::new(Arc::clone(&store));
    let inventory = InventoryManager::new(Arc::clone(&store));
    let payments = PaymentProcessor::new(Arc::clone(&store));

    let event_id = seeded_event(&catalog, 10).await;
    let booking = inventory
        .reserve(
            &user("alice"),
            ReserveRequest {
                event_id,
                tickets: TicketCount::try_new(2).unwrap(),
            },
        )
        .await
        .unwrap();

    let racers = 8usize;
    let barrier = Arc::new(Barrier::new(racers));
    let mut handles = Vec::with_capacity(racers);
    for _ in 0..racers {
        let payments = payments.clone();
        let booking_id = booking.id.clone();
        let amount = booking.total_amount;
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            payments
                .process(PaymentRequest {
                    booking_id,
                    amount,
                    method: PaymentMethod::try_new("card").unwrap(),
                })
                .await
        }));
    }

    let mut winners = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(BookingError::DuplicatePayment(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1);
    let recorded = payments.for_booking(&booking.id).await.unwrap();
    assert_eq!(recorded.booking_id, booking.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn reservations_racing_cancellations_keep_the_ledger_consistent() {
    let store = Arc::new(InMemoryBookingStore::new());
    let catalog = EventCatalog::new(Arc::clone(&store));
    let inventory =
        InventoryManager::new(Arc::clone(&store)).with_retry_config(patient_retry());
    let lifecycle = BookingLifecycle::new(Arc::clone(&store), inventory.clone());

    let capacity = 6u32;
    let event_id = seeded_event(&catalog, capacity).await;

    // Fill the event, then race cancellations of the original bookings
    // against fresh reservations for the freed seats.
    let mut originals = Vec::new();
    for i in 0..capacity {
        let actor = user(&format!("orig-{i}"));
        let booking = inventory
            .reserve(
                &actor,
                ReserveRequest {
                    event_id: event_id.clone(),
                    tickets: TicketCount::try_new(1).unwrap(),
                },
            )
            .await
            .unwrap();
        originals.push((actor, booking));
    }

    let barrier = Arc::new(Barrier::new(capacity as usize * 2));
    let mut cancels = Vec::new();
    for (actor, booking) in originals {
        let lifecycle = lifecycle.clone();
        let barrier = Arc::clone(&barrier);
        cancels.push(tokio::spawn(async move {
            barrier.wait().await;
            lifecycle.cancel(&actor, &booking.id).await
        }));
    }
    let mut reserves = Vec::new();
    for i in 0..capacity {
        let inventory = inventory.clone();
        let event_id = event_id.clone();
        let barrier = Arc::clone(&barrier);
        reserves.push(tokio::spawn(async move {
            let actor = user(&format!("late-{i}"));
            barrier.wait().await;
            inventory
                .reserve(
                    &actor,
                    ReserveRequest {
                        event_id,
                        tickets: TicketCount::try_new(1).unwrap(),
                    },
                )
                .await
        }));
    }

    for handle in cancels {
        let cancelled = handle.await.unwrap().unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
    }
    let mut late_wins = 0u32;
    for handle in reserves {
        match handle.await.unwrap() {
            Ok(_) => late_wins += 1,
            Err(BookingError::Overbooked { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    // Every original booking was cancelled, so the final reserved count is
    // exactly the number of late winners, and never above capacity.
    let usage = store.seat_usage(&event_id).await.unwrap();
    assert_eq!(usage.reserved, late_wins);
    assert!(usage.reserved <= capacity);

    let bookings = lifecycle.list_for_event(&event_id).await.unwrap();
    let holding: u32 = bookings
        .iter()
        .filter(|b| b.status.holds_seats())
        .count()
        .try_into()
        .unwrap();
    assert_eq!(holding, usage.reserved);
}
