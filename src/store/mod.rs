//! Storage seams.
//!
//! Each trait covers one component of the booking system. Operations that
//! touch more than one record (event + inventory, guest + seat) are single
//! methods so that every implementation can run them as one unit of work.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    AdditionalOption, Comment, CommentId, Dish, DishId, DishType, Event, EventId, EventType, Guest,
    GuestId, Hole, HoleId, NewComment, NewEvent, NewGuest, NewOrder, NewUser, OptionId, OrderId,
    OrderedDish, Seat, SeatId, User, UserId,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Read-only venue and menu catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn holes(&self) -> AppResult<Vec<Hole>>;
    async fn hole(&self, id: HoleId) -> AppResult<Hole>;
    async fn dishes(&self) -> AppResult<Vec<Dish>>;
    async fn dish(&self, id: DishId) -> AppResult<Dish>;
    async fn options(&self) -> AppResult<Vec<AdditionalOption>>;
    /// Returns the ids from `ids` that have no catalog entry.
    async fn missing_options(&self, ids: &[OptionId]) -> AppResult<Vec<OptionId>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with a validation error when the email is already registered.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn user(&self, id: UserId) -> AppResult<Option<User>>;
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub is_passed: Option<bool>,
    pub search: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        self.event_type.map_or(true, |t| event.event_type == t)
            && self.is_passed.map_or(true, |p| event.is_passed == p)
            && self.search.as_deref().map_or(true, |needle| {
                event
                    .description
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Inserts the event and materializes its full seat inventory in one unit
    /// of work. Nothing is visible if either step fails.
    async fn create_event(&self, event: NewEvent) -> AppResult<(Event, Vec<Seat>)>;
    async fn event(&self, id: EventId) -> AppResult<Event>;
    async fn events_for_owner(&self, owner: UserId, filter: &EventFilter) -> AppResult<Vec<Event>>;
    /// Cascades to seats, guests, option membership and orders.
    async fn delete_event(&self, id: EventId) -> AppResult<()>;
    async fn mark_passed(&self, id: EventId) -> AppResult<Event>;
    async fn add_options(&self, event: EventId, ids: &[OptionId]) -> AppResult<()>;
    async fn remove_options(&self, event: EventId, ids: &[OptionId]) -> AppResult<()>;
    async fn event_options(&self, event: EventId) -> AppResult<Vec<AdditionalOption>>;
}

/// Seat inventory primitives.
#[async_trait]
pub trait SeatStore: Send + Sync {
    /// Seats of the event ordered by number.
    async fn seats(&self, event: EventId) -> AppResult<Vec<Seat>>;
    async fn seat_by_number(&self, event: EventId, number: i32) -> AppResult<Seat>;
    /// Atomic check-and-set: fails with `SeatUnavailable` if already engaged.
    async fn occupy(&self, seat: SeatId) -> AppResult<Seat>;
    /// Idempotent.
    async fn release(&self, seat: SeatId) -> AppResult<Seat>;
}

#[async_trait]
pub trait GuestStore: Send + Sync {
    /// Resolves the seat number, occupies the seat and inserts the guest, all
    /// or nothing.
    async fn register_guest(&self, guest: NewGuest) -> AppResult<Guest>;
    /// Occupies the seat `seat_number` of the guest's event and points the guest
    /// at it. The previously held seat is released only when `release_previous`.
    async fn change_seat(
        &self,
        guest: GuestId,
        seat_number: i32,
        release_previous: bool,
    ) -> AppResult<Guest>;
    async fn free_seat(&self, guest: GuestId) -> AppResult<Guest>;
    /// Releases the held seat and removes the guest in one unit of work.
    async fn delete_guest(&self, guest: GuestId) -> AppResult<Guest>;
    async fn guest(&self, id: GuestId) -> AppResult<Guest>;
    async fn guests(&self, event: EventId) -> AppResult<Vec<Guest>>;
    async fn guests_for_owner(&self, owner: UserId) -> AppResult<Vec<Guest>>;
    async fn guest_count(&self, event: EventId) -> AppResult<i64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> AppResult<OrderedDish>;
    async fn order(&self, id: OrderId) -> AppResult<OrderedDish>;
    async fn orders_for_user(&self, user: UserId) -> AppResult<Vec<OrderedDish>>;
    async fn delete_order(&self, id: OrderId) -> AppResult<()>;
    /// Sum of `amount * dish.price` for the user's orders on the event; 0 when none.
    async fn dish_total(&self, event: EventId, user: UserId) -> AppResult<f64>;
    /// Sum of the prices of the options attached to the event; 0 when none.
    async fn options_total(&self, event: EventId) -> AppResult<f64>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Fails with not-found when the author does not exist.
    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment>;
    async fn comment(&self, id: CommentId) -> AppResult<Comment>;
    async fn comments(&self) -> AppResult<Vec<Comment>>;
    async fn delete_comment(&self, id: CommentId) -> AppResult<()>;
}

pub trait BanquetStore:
    CatalogStore + UserStore + EventStore + SeatStore + GuestStore + OrderStore + CommentStore
{
}

impl<T> BanquetStore for T where
    T: CatalogStore
        + UserStore
        + EventStore
        + SeatStore
        + GuestStore
        + OrderStore
        + CommentStore
{
}

/// Catalog rows shipped with a fresh installation. The Postgres seed migration
/// inserts the same rows.
pub fn demo_catalog() -> (Vec<Hole>, Vec<Dish>, Vec<AdditionalOption>) {
    let holes = vec![
        Hole {
            id: 1,
            name: "Grand Hall".to_string(),
            description: "Main banquet hall with a stage".to_string(),
            number_of_seats: 120,
        },
        Hole {
            id: 2,
            name: "Garden Terrace".to_string(),
            description: "Covered terrace for summer events".to_string(),
            number_of_seats: 60,
        },
        Hole {
            id: 3,
            name: "Chamber Room".to_string(),
            description: "Small room for family dinners".to_string(),
            number_of_seats: 24,
        },
    ];

    let dishes = vec![
        dish(1, "Cheese platter", 12.5, DishType::Cold),
        dish(2, "Roast lamb", 24.0, DishType::Warm),
        dish(3, "Bruschetta", 6.0, DishType::Snack),
        dish(4, "Caesar salad", 8.5, DishType::Salad),
        dish(5, "House lemonade", 3.0, DishType::Drink),
    ];

    let options = vec![
        option(1, "Live music", "Band for four hours", 300.0),
        option(2, "Photographer", "Full event coverage", 250.0),
        option(3, "Flower decoration", "Table and arch flowers", 120.0),
        option(4, "Candy bar", "Dessert table", 90.0),
    ];

    (holes, dishes, options)
}

fn dish(id: DishId, name: &str, price: f64, dish_type: DishType) -> Dish {
    Dish {
        id,
        name: name.to_string(),
        price,
        description: "Dish".to_string(),
        dish_type,
    }
}

fn option(id: OptionId, name: &str, description: &str, price: f64) -> AdditionalOption {
    AdditionalOption {
        id,
        name: name.to_string(),
        description: description.to_string(),
        price,
    }
}
