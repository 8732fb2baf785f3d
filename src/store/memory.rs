//! In-process store.
//!
//! All state lives behind one `tokio::sync::Mutex`; every trait method takes
//! the lock once and finishes its whole unit of work before releasing it, which
//! gives the same all-or-nothing behavior the Postgres transactions provide.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;
use tracing::info;

use super::{
    demo_catalog, CatalogStore, CommentStore, EventFilter, EventStore, GuestStore, OrderStore,
    SeatStore, UserStore,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdditionalOption, Comment, CommentId, Dish, DishId, Event, EventId, Guest, GuestId, Hole,
    HoleId, NewComment, NewEvent, NewGuest, NewOrder, NewUser, OptionId, OrderId, OrderedDish,
    Seat, SeatId, User, UserId,
};
use crate::services::inventory;

#[derive(Debug, Clone)]
struct GuestRow {
    id: GuestId,
    user_id: UserId,
    event_id: EventId,
    first_name: String,
    last_name: String,
    email: Option<String>,
    seat_id: Option<SeatId>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    holes: BTreeMap<HoleId, Hole>,
    dishes: BTreeMap<DishId, Dish>,
    options: BTreeMap<OptionId, AdditionalOption>,
    events: BTreeMap<EventId, Event>,
    event_options: BTreeMap<EventId, BTreeSet<OptionId>>,
    seats: BTreeMap<SeatId, Seat>,
    guests: BTreeMap<GuestId, GuestRow>,
    orders: BTreeMap<OrderId, OrderedDish>,
    comments: BTreeMap<CommentId, Comment>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn event(&self, id: EventId) -> AppResult<&Event> {
        self.events
            .get(&id)
            .ok_or_else(|| AppError::not_found("event", id))
    }

    fn seats_of(&self, event_id: EventId) -> Vec<Seat> {
        let mut seats: Vec<Seat> = self
            .seats
            .values()
            .filter(|seat| seat.event_id == event_id)
            .cloned()
            .collect();
        seats.sort_by_key(|seat| seat.number);
        seats
    }

    fn seat_id_by_number(&self, event_id: EventId, number: i32) -> AppResult<SeatId> {
        self.event(event_id)?;
        self.seats
            .values()
            .find(|seat| seat.event_id == event_id && seat.number == number)
            .map(|seat| seat.id)
            .ok_or_else(|| AppError::NotFound(format!("seat {number} of event {event_id}")))
    }

    fn seat_mut(&mut self, id: SeatId) -> AppResult<&mut Seat> {
        self.seats
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("seat", id))
    }

    fn guest_row(&self, id: GuestId) -> AppResult<&GuestRow> {
        self.guests
            .get(&id)
            .ok_or_else(|| AppError::not_found("guest", id))
    }

    fn guest_view(&self, row: &GuestRow) -> Guest {
        Guest {
            id: row.id,
            user_id: row.user_id,
            event_id: row.event_id,
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            email: row.email.clone(),
            seat_id: row.seat_id,
            seat_number: row
                .seat_id
                .and_then(|id| self.seats.get(&id))
                .map(|seat| seat.number),
        }
    }
}

/// Store kept entirely in memory. Used by the test-suite and by
/// `STORAGE_BACKEND=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the demo catalog.
    pub fn seeded() -> Self {
        let (holes, dishes, options) = demo_catalog();
        let mut inner = Inner {
            next_id: 1000,
            ..Inner::default()
        };
        inner.holes = holes.into_iter().map(|h| (h.id, h)).collect();
        inner.dishes = dishes.into_iter().map(|d| (d.id, d)).collect();
        inner.options = options.into_iter().map(|o| (o.id, o)).collect();
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub async fn insert_hole(&self, name: &str, number_of_seats: i32) -> Hole {
        let mut inner = self.inner.lock().await;
        let hole = Hole {
            id: inner.next_id(),
            name: name.to_string(),
            description: "Hole".to_string(),
            number_of_seats,
        };
        inner.holes.insert(hole.id, hole.clone());
        hole
    }

    pub async fn insert_dish(&self, dish: Dish) -> Dish {
        let mut inner = self.inner.lock().await;
        let dish = Dish {
            id: inner.next_id(),
            ..dish
        };
        inner.dishes.insert(dish.id, dish.clone());
        dish
    }

    pub async fn insert_option(&self, name: &str, price: f64) -> AppResult<AdditionalOption> {
        if price < 0.0 {
            return Err(AppError::Validation(format!(
                "option price must be non-negative, got {price}"
            )));
        }
        let mut inner = self.inner.lock().await;
        let option = AdditionalOption {
            id: inner.next_id(),
            name: name.to_string(),
            description: String::new(),
            price,
        };
        inner.options.insert(option.id, option.clone());
        Ok(option)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn holes(&self) -> AppResult<Vec<Hole>> {
        Ok(self.inner.lock().await.holes.values().cloned().collect())
    }

    async fn hole(&self, id: HoleId) -> AppResult<Hole> {
        self.inner
            .lock()
            .await
            .holes
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("hole", id))
    }

    async fn dishes(&self) -> AppResult<Vec<Dish>> {
        Ok(self.inner.lock().await.dishes.values().cloned().collect())
    }

    async fn dish(&self, id: DishId) -> AppResult<Dish> {
        self.inner
            .lock()
            .await
            .dishes
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("dish", id))
    }

    async fn options(&self) -> AppResult<Vec<AdditionalOption>> {
        Ok(self.inner.lock().await.options.values().cloned().collect())
    }

    async fn missing_options(&self, ids: &[OptionId]) -> AppResult<Vec<OptionId>> {
        let inner = self.inner.lock().await;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !inner.options.contains_key(id))
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.lock().await;
        let taken = inner
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(AppError::Validation(format!(
                "user with email {} already exists",
                user.email
            )));
        }
        let user = User {
            id: inner.next_id(),
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .inner
            .lock()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, new: NewEvent) -> AppResult<(Event, Vec<Seat>)> {
        let mut inner = self.inner.lock().await;
        let seat_count = inner
            .holes
            .get(&new.hole_id)
            .map(|hole| hole.number_of_seats)
            .ok_or_else(|| AppError::not_found("hole", new.hole_id))?;

        let event = Event {
            id: inner.next_id(),
            user_id: new.owner,
            hole_id: new.hole_id,
            description: new.description,
            event_type: new.event_type,
            date_created: Utc::now(),
            date_planned: new.date_planned,
            is_passed: false,
        };

        let mut seats = Vec::with_capacity(seat_count.max(0) as usize);
        for number in inventory::seat_numbers(seat_count) {
            seats.push(Seat {
                id: inner.next_id(),
                event_id: event.id,
                number,
                is_engaged: false,
                description: String::new(),
            });
        }
        // Verified before anything is inserted, so a failure leaves no trace.
        inventory::verify_inventory(event.id, &seats, seat_count)?;

        inner.events.insert(event.id, event.clone());
        inner.event_options.insert(event.id, BTreeSet::new());
        for seat in &seats {
            inner.seats.insert(seat.id, seat.clone());
        }

        info!(event_id = event.id, seats = seats.len(), "event created with seat inventory");
        Ok((event, seats))
    }

    async fn event(&self, id: EventId) -> AppResult<Event> {
        self.inner.lock().await.event(id).cloned()
    }

    async fn events_for_owner(&self, owner: UserId, filter: &EventFilter) -> AppResult<Vec<Event>> {
        Ok(self
            .inner
            .lock()
            .await
            .events
            .values()
            .filter(|event| event.user_id == owner && filter.matches(event))
            .cloned()
            .collect())
    }

    async fn delete_event(&self, id: EventId) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.event(id)?;
        inner.events.remove(&id);
        inner.event_options.remove(&id);
        inner.seats.retain(|_, seat| seat.event_id != id);
        inner.guests.retain(|_, guest| guest.event_id != id);
        inner.orders.retain(|_, order| order.event_id != id);
        Ok(())
    }

    async fn mark_passed(&self, id: EventId) -> AppResult<Event> {
        let mut inner = self.inner.lock().await;
        let event = inner
            .events
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("event", id))?;
        event.is_passed = true;
        Ok(event.clone())
    }

    async fn add_options(&self, event: EventId, ids: &[OptionId]) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.event(event)?;
        if let Some(missing) = ids.iter().find(|id| !inner.options.contains_key(*id)) {
            return Err(AppError::Validation(format!("unknown option id {missing}")));
        }
        inner
            .event_options
            .entry(event)
            .or_default()
            .extend(ids.iter().copied());
        Ok(())
    }

    async fn remove_options(&self, event: EventId, ids: &[OptionId]) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.event(event)?;
        if let Some(set) = inner.event_options.get_mut(&event) {
            for id in ids {
                set.remove(id);
            }
        }
        Ok(())
    }

    async fn event_options(&self, event: EventId) -> AppResult<Vec<AdditionalOption>> {
        let inner = self.inner.lock().await;
        inner.event(event)?;
        Ok(inner
            .event_options
            .get(&event)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.options.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl SeatStore for MemoryStore {
    async fn seats(&self, event: EventId) -> AppResult<Vec<Seat>> {
        let inner = self.inner.lock().await;
        inner.event(event)?;
        Ok(inner.seats_of(event))
    }

    async fn seat_by_number(&self, event: EventId, number: i32) -> AppResult<Seat> {
        let inner = self.inner.lock().await;
        let id = inner.seat_id_by_number(event, number)?;
        Ok(inner.seats[&id].clone())
    }

    async fn occupy(&self, seat: SeatId) -> AppResult<Seat> {
        let mut inner = self.inner.lock().await;
        let seat = inner.seat_mut(seat)?;
        seat.occupy()?;
        Ok(seat.clone())
    }

    async fn release(&self, seat: SeatId) -> AppResult<Seat> {
        let mut inner = self.inner.lock().await;
        let seat = inner.seat_mut(seat)?;
        seat.release();
        Ok(seat.clone())
    }
}

#[async_trait]
impl GuestStore for MemoryStore {
    async fn register_guest(&self, new: NewGuest) -> AppResult<Guest> {
        let mut inner = self.inner.lock().await;
        let seat_id = inner.seat_id_by_number(new.event_id, new.seat_number)?;
        inner.seat_mut(seat_id)?.occupy()?;

        let row = GuestRow {
            id: inner.next_id(),
            user_id: new.owner,
            event_id: new.event_id,
            first_name: new.info.first_name,
            last_name: new.info.last_name,
            email: new.info.email,
            seat_id: Some(seat_id),
        };
        inner.guests.insert(row.id, row.clone());
        Ok(inner.guest_view(&row))
    }

    async fn change_seat(
        &self,
        guest: GuestId,
        seat_number: i32,
        release_previous: bool,
    ) -> AppResult<Guest> {
        let mut inner = self.inner.lock().await;
        let row = inner.guest_row(guest)?.clone();
        let new_seat = inner.seat_id_by_number(row.event_id, seat_number)?;
        if row.seat_id == Some(new_seat) {
            return Ok(inner.guest_view(&row));
        }

        inner.seat_mut(new_seat)?.occupy()?;
        if release_previous {
            if let Some(previous) = row.seat_id {
                inner.seat_mut(previous)?.release();
            }
        }

        let updated = GuestRow {
            seat_id: Some(new_seat),
            ..row
        };
        inner.guests.insert(updated.id, updated.clone());
        Ok(inner.guest_view(&updated))
    }

    async fn free_seat(&self, guest: GuestId) -> AppResult<Guest> {
        let mut inner = self.inner.lock().await;
        let row = inner.guest_row(guest)?.clone();
        if let Some(seat) = row.seat_id {
            inner.seat_mut(seat)?.release();
        }
        let updated = GuestRow {
            seat_id: None,
            ..row
        };
        inner.guests.insert(updated.id, updated.clone());
        Ok(inner.guest_view(&updated))
    }

    async fn delete_guest(&self, guest: GuestId) -> AppResult<Guest> {
        let mut inner = self.inner.lock().await;
        let row = inner.guest_row(guest)?.clone();
        let view = inner.guest_view(&row);
        if let Some(seat) = row.seat_id {
            inner.seat_mut(seat)?.release();
        }
        inner.guests.remove(&guest);
        Ok(view)
    }

    async fn guest(&self, id: GuestId) -> AppResult<Guest> {
        let inner = self.inner.lock().await;
        let row = inner.guest_row(id)?;
        Ok(inner.guest_view(row))
    }

    async fn guests(&self, event: EventId) -> AppResult<Vec<Guest>> {
        let inner = self.inner.lock().await;
        inner.event(event)?;
        Ok(inner
            .guests
            .values()
            .filter(|row| row.event_id == event)
            .map(|row| inner.guest_view(row))
            .collect())
    }

    async fn guests_for_owner(&self, owner: UserId) -> AppResult<Vec<Guest>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .guests
            .values()
            .filter(|row| row.user_id == owner)
            .map(|row| inner.guest_view(row))
            .collect())
    }

    async fn guest_count(&self, event: EventId) -> AppResult<i64> {
        let inner = self.inner.lock().await;
        inner.event(event)?;
        Ok(inner.guests.values().filter(|row| row.event_id == event).count() as i64)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, new: NewOrder) -> AppResult<OrderedDish> {
        let mut inner = self.inner.lock().await;
        inner.event(new.event_id)?;
        if !inner.dishes.contains_key(&new.dish_id) {
            return Err(AppError::not_found("dish", new.dish_id));
        }
        let order = OrderedDish {
            id: inner.next_id(),
            user_id: new.user_id,
            dish_id: new.dish_id,
            event_id: new.event_id,
            amount: new.amount,
        };
        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn order(&self, id: OrderId) -> AppResult<OrderedDish> {
        self.inner
            .lock()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("ordered dish", id))
    }

    async fn orders_for_user(&self, user: UserId) -> AppResult<Vec<OrderedDish>> {
        Ok(self
            .inner
            .lock()
            .await
            .orders
            .values()
            .filter(|order| order.user_id == user)
            .cloned()
            .collect())
    }

    async fn delete_order(&self, id: OrderId) -> AppResult<()> {
        self.inner
            .lock()
            .await
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("ordered dish", id))
    }

    async fn dish_total(&self, event: EventId, user: UserId) -> AppResult<f64> {
        let inner = self.inner.lock().await;
        inner.event(event)?;
        Ok(inner
            .orders
            .values()
            .filter(|order| order.event_id == event && order.user_id == user)
            .filter_map(|order| {
                inner
                    .dishes
                    .get(&order.dish_id)
                    .map(|dish| f64::from(order.amount) * dish.price)
            })
            .sum())
    }

    async fn options_total(&self, event: EventId) -> AppResult<f64> {
        let inner = self.inner.lock().await;
        inner.event(event)?;
        Ok(inner
            .event_options
            .get(&event)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.options.get(id))
            .map(|option| option.price)
            .sum())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_comment(&self, new: NewComment) -> AppResult<Comment> {
        let mut inner = self.inner.lock().await;
        if !inner.users.contains_key(&new.user_id) {
            return Err(AppError::not_found("user", new.user_id));
        }
        let comment = Comment {
            id: inner.next_id(),
            user_id: new.user_id,
            text: new.text,
        };
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn comment(&self, id: CommentId) -> AppResult<Comment> {
        self.inner
            .lock()
            .await
            .comments
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("comment", id))
    }

    async fn comments(&self) -> AppResult<Vec<Comment>> {
        Ok(self.inner.lock().await.comments.values().cloned().collect())
    }

    async fn delete_comment(&self, id: CommentId) -> AppResult<()> {
        self.inner
            .lock()
            .await
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("comment", id))
    }
}
