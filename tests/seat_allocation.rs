mod common;

use std::collections::HashSet;
use std::sync::Arc;

use banquet_hall::error::AppError;
use banquet_hall::services::{guests, inventory};
use banquet_hall::store::{GuestStore, SeatStore};
use fake::faker::name::en::FirstName;
use fake::Fake;
use proptest::prelude::*;

use common::{create_event_in, guest_info, test_app, test_app_with, test_config};

const OWNER: i64 = 1;

#[tokio::test]
async fn event_gets_one_free_seat_per_hall_place() {
    let app = test_app();
    let hole = app.store.insert_hole("Small room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;

    let seats = inventory::list_seats(&app.state, OWNER, event.id).await.unwrap();
    let numbers: Vec<i32> = seats.iter().map(|seat| seat.number).collect();
    assert_eq!(numbers, (1..=10).collect::<Vec<_>>());
    assert!(seats.iter().all(|seat| !seat.is_engaged));
    assert!(seats.iter().all(|seat| seat.event_id == event.id));
}

#[tokio::test]
async fn event_for_unknown_hall_is_not_created() {
    let app = test_app();
    let result = banquet_hall::services::events::create_event(
        &app.state,
        banquet_hall::models::NewEvent {
            owner: OWNER,
            hole_id: 999_999,
            description: String::new(),
            event_type: banquet_hall::models::EventType::Other,
            date_planned: None,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn taken_seat_is_refused_and_released_by_guest_deletion() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;

    let first = guests::register_guest(&app.state, OWNER, event.id, 5, guest_info("Ana"))
        .await
        .unwrap();
    assert_eq!(first.seat_number, Some(5));

    let second = guests::register_guest(&app.state, OWNER, event.id, 5, guest_info("Ion")).await;
    assert!(matches!(second, Err(AppError::SeatUnavailable { number: 5 })));
    // No guest record survives the failed registration.
    assert_eq!(app.store.guest_count(event.id).await.unwrap(), 1);

    guests::delete_guest(&app.state, OWNER, first.id).await.unwrap();
    let seat = app.store.seat_by_number(event.id, 5).await.unwrap();
    assert!(!seat.is_engaged);

    let again = guests::register_guest(&app.state, OWNER, event.id, 5, guest_info("Ion")).await;
    assert!(again.is_ok());
}

#[tokio::test]
async fn unknown_seat_number_is_not_found() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 3).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;

    let result = guests::register_guest(&app.state, OWNER, event.id, 4, guest_info("Ana")).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    let result = guests::register_guest(&app.state, OWNER, event.id, 0, guest_info("Ana")).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn only_the_owner_may_seat_guests() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 3).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;

    let result = guests::register_guest(&app.state, OWNER + 1, event.id, 1, guest_info("Ana")).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    let seat = app.store.seat_by_number(event.id, 1).await.unwrap();
    assert!(!seat.is_engaged);
}

#[tokio::test]
async fn freeing_a_seat_is_idempotent() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 4).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let guest = guests::register_guest(&app.state, OWNER, event.id, 2, guest_info("Ana"))
        .await
        .unwrap();

    let freed = guests::free_seat(&app.state, OWNER, guest.id).await.unwrap();
    assert_eq!(freed.seat_id, None);
    let freed_again = guests::free_seat(&app.state, OWNER, guest.id).await.unwrap();
    assert_eq!(freed_again.seat_id, None);

    let seat = app.store.seat_by_number(event.id, 2).await.unwrap();
    assert!(!seat.is_engaged);
    // The guest record stays.
    assert_eq!(app.store.guest_count(event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn release_is_idempotent_and_occupy_is_exclusive() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 2).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let seat = app.store.seat_by_number(event.id, 1).await.unwrap();

    assert!(!app.store.release(seat.id).await.unwrap().is_engaged);
    assert!(app.store.occupy(seat.id).await.unwrap().is_engaged);
    assert!(matches!(
        app.store.occupy(seat.id).await,
        Err(AppError::SeatUnavailable { number: 1 })
    ));
    assert!(!app.store.release(seat.id).await.unwrap().is_engaged);
    assert!(!app.store.release(seat.id).await.unwrap().is_engaged);
}

#[tokio::test]
async fn changing_seat_keeps_the_previous_seat_engaged_by_default() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 6).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let guest = guests::register_guest(&app.state, OWNER, event.id, 1, guest_info("Ana"))
        .await
        .unwrap();

    let moved = guests::change_seat(&app.state, OWNER, guest.id, 3, None).await.unwrap();
    assert_eq!(moved.seat_number, Some(3));

    assert!(app.store.seat_by_number(event.id, 1).await.unwrap().is_engaged);
    assert!(app.store.seat_by_number(event.id, 3).await.unwrap().is_engaged);
}

#[tokio::test]
async fn changing_seat_releases_the_previous_seat_when_enabled() {
    let mut config = test_config();
    config.features.release_previous_seat_on_change = true;
    let app = test_app_with(config);
    let hole = app.store.insert_hole("Room", 6).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let guest = guests::register_guest(&app.state, OWNER, event.id, 1, guest_info("Ana"))
        .await
        .unwrap();

    guests::change_seat(&app.state, OWNER, guest.id, 3, Some(event.id))
        .await
        .unwrap();

    assert!(!app.store.seat_by_number(event.id, 1).await.unwrap().is_engaged);
    assert!(app.store.seat_by_number(event.id, 3).await.unwrap().is_engaged);
}

#[tokio::test]
async fn changing_to_a_taken_seat_leaves_the_guest_unchanged() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 6).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let ana = guests::register_guest(&app.state, OWNER, event.id, 1, guest_info("Ana"))
        .await
        .unwrap();
    guests::register_guest(&app.state, OWNER, event.id, 2, guest_info("Ion"))
        .await
        .unwrap();

    let result = guests::change_seat(&app.state, OWNER, ana.id, 2, None).await;
    assert!(matches!(result, Err(AppError::SeatUnavailable { number: 2 })));
    assert_eq!(app.store.guest(ana.id).await.unwrap().seat_number, Some(1));
}

#[tokio::test]
async fn changing_to_the_held_seat_is_a_no_op() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 6).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let guest = guests::register_guest(&app.state, OWNER, event.id, 4, guest_info("Ana"))
        .await
        .unwrap();

    let same = guests::change_seat(&app.state, OWNER, guest.id, 4, None).await.unwrap();
    assert_eq!(same.seat_number, Some(4));
    assert!(app.store.seat_by_number(event.id, 4).await.unwrap().is_engaged);
}

#[tokio::test]
async fn change_seat_rejects_another_event_id() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 6).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let guest = guests::register_guest(&app.state, OWNER, event.id, 4, guest_info("Ana"))
        .await
        .unwrap();

    let result = guests::change_seat(&app.state, OWNER, guest.id, 5, Some(event.id + 100)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn deleting_event_drops_its_seats_and_guests() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 3).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let guest = guests::register_guest(&app.state, OWNER, event.id, 1, guest_info("Ana"))
        .await
        .unwrap();

    banquet_hall::services::events::delete_event(&app.state, OWNER, event.id)
        .await
        .unwrap();

    assert!(matches!(app.store.seats(event.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(app.store.guest(guest.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_for_one_seat_have_one_winner() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let state = Arc::clone(&app.state);
        let name: String = FirstName().fake();
        handles.push(tokio::spawn(async move {
            guests::register_guest(&state, OWNER, event.id, 7, guest_info(&name)).await
        }));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(AppError::SeatUnavailable { number: 7 }) => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(app.store.guest_count(event.id).await.unwrap(), 1);
}

#[derive(Debug, Clone)]
enum Op {
    Register(i32),
    Change(usize, i32),
    Free(usize),
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..=8i32).prop_map(Op::Register),
        (0..8usize, 1..=8i32).prop_map(|(g, s)| Op::Change(g, s)),
        (0..8usize).prop_map(Op::Free),
        (0..8usize).prop_map(Op::Delete),
    ]
}

async fn check_seat_invariants(ops: Vec<Op>, release_previous: bool) {
    let mut config = test_config();
    config.features.release_previous_seat_on_change = release_previous;
    let app = test_app_with(config);
    let hole = app.store.insert_hole("Room", 8).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let mut live = Vec::new();

    for op in ops {
        match op {
            Op::Register(number) => {
                if let Ok(guest) =
                    guests::register_guest(&app.state, OWNER, event.id, number, guest_info("G")).await
                {
                    live.push(guest.id);
                }
            }
            Op::Change(i, number) if !live.is_empty() => {
                let id = live[i % live.len()];
                let _ = guests::change_seat(&app.state, OWNER, id, number, None).await;
            }
            Op::Free(i) if !live.is_empty() => {
                let id = live[i % live.len()];
                guests::free_seat(&app.state, OWNER, id).await.unwrap();
            }
            Op::Delete(i) if !live.is_empty() => {
                let id = live.remove(i % live.len());
                guests::delete_guest(&app.state, OWNER, id).await.unwrap();
            }
            _ => {}
        }

        let seats = app.store.seats(event.id).await.unwrap();
        let seated = app.store.guests(event.id).await.unwrap();

        // Inventory never changes shape.
        assert_eq!(
            seats.iter().map(|s| s.number).collect::<Vec<_>>(),
            (1..=8).collect::<Vec<_>>()
        );

        // No two guests share a seat, and every held seat is engaged.
        let mut held = HashSet::new();
        for guest in &seated {
            if let Some(seat_id) = guest.seat_id {
                assert!(held.insert(seat_id), "seat {seat_id} held twice");
                let seat = seats.iter().find(|s| s.id == seat_id).unwrap();
                assert!(seat.is_engaged);
            }
        }

        // Without the legacy change-seat behavior every engaged seat has a holder.
        if release_previous {
            for seat in seats.iter().filter(|s| s.is_engaged) {
                assert!(held.contains(&seat.id), "seat {} engaged without a guest", seat.number);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn seat_invariants_hold_for_any_operation_sequence(
        ops in prop::collection::vec(op(), 1..40),
        release_previous in any::<bool>(),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(check_seat_invariants(ops, release_previous));
    }
}
