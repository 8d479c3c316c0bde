//! Concurrency stress tests for last-slot races.
//!
//! Many tasks race for the same slot; the ledger must admit exactly one.
//!
//! Run with: `cargo test --test concurrency_stress_test -- --nocapture`

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use futures::future::join_all;
use slotbook_core::types::Role;
use slotbook_core::{BookingError, ConflictKind};
use slotbook_testing::fixtures::Harness;

const CONTENDERS: usize = 100;

fn tally(results: &[Result<(), BookingError>], expected: ConflictKind) -> (usize, usize) {
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(BookingError::Conflict(kind)) if *kind == expected))
        .count();
    (successes, conflicts)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn one_attendee_many_companies_same_slot() {
    let harness = Harness::new("10:00", "11:00", 30);
    let alice = harness.add_attendee("Alice", "Initech");

    let handles = (0..CONTENDERS).map(|i| {
        let service = harness.service.clone();
        let request = harness.request(alice.id, &format!("Company {i}"), "10:00");
        tokio::spawn(async move { service.book(Role::Manager, request).await.map(|_| ()) })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let (successes, conflicts) = tally(&results, ConflictKind::AttendeeConflict);
    println!("attendee race: {successes} success, {conflicts} conflicts");
    assert_eq!(successes, 1);
    assert_eq!(conflicts, CONTENDERS - 1);
    assert_eq!(harness.ledger.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn one_company_many_attendees_same_slot() {
    let harness = Harness::new("10:00", "11:00", 30);
    let attendees: Vec<_> = (0..CONTENDERS)
        .map(|i| harness.add_attendee(&format!("Attendee {i}"), "Initech"))
        .collect();

    let handles = attendees.iter().map(|attendee| {
        let service = harness.service.clone();
        let request = harness.request(attendee.id, "Acme", "10:30");
        tokio::spawn(async move { service.book(Role::Manager, request).await.map(|_| ()) })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let (successes, conflicts) = tally(&results, ConflictKind::CompanyConflict);
    println!("company race: {successes} success, {conflicts} conflicts");
    assert_eq!(successes, 1);
    assert_eq!(conflicts, CONTENDERS - 1);
    assert_eq!(harness.ledger.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn disjoint_slots_all_succeed() {
    let harness = Harness::new("09:00", "17:00", 15);
    let alice = harness.add_attendee("Alice", "Initech");
    let slots: Vec<String> = harness
        .service
        .slots(harness.event.id)
        .await
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(slots.len(), 32);

    let handles = slots.iter().map(|slot| {
        let service = harness.service.clone();
        let request = harness.request(alice.id, "Acme", slot);
        tokio::spawn(async move { service.book(Role::Manager, request).await })
    });
    for joined in join_all(handles).await {
        joined.unwrap().unwrap();
    }
    assert_eq!(harness.ledger.len(), 32);
}
