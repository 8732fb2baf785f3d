pub mod comment;
pub mod dish;
pub mod event;
pub mod guest;
pub mod hole;
pub mod option;
pub mod order;
pub mod seat;
pub mod user;

pub use comment::{Comment, NewComment};
pub use dish::{Dish, DishType};
pub use event::{Event, EventStatus, EventType, NewEvent};
pub use guest::{Guest, GuestInfo, NewGuest};
pub use hole::Hole;
pub use option::AdditionalOption;
pub use order::{NewOrder, OrderedDish};
pub use seat::Seat;
pub use user::{NewUser, User};

pub type UserId = i64;
pub type HoleId = i64;
pub type EventId = i64;
pub type SeatId = i64;
pub type GuestId = i64;
pub type DishId = i64;
pub type OptionId = i64;
pub type OrderId = i64;
pub type CommentId = i64;
