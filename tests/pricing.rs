mod common;

use banquet_hall::error::AppError;
use banquet_hall::models::{Dish, DishType};
use banquet_hall::services::{events, guests, orders, pricing};
use banquet_hall::store::MemoryStore;

use common::{create_event_in, guest_info, test_app};

const OWNER: i64 = 1;
const FRIEND: i64 = 2;

async fn dish(store: &MemoryStore, price: f64) -> Dish {
    store
        .insert_dish(Dish {
            id: 0,
            name: "Plov".to_string(),
            price,
            description: String::new(),
            dish_type: DishType::Warm,
        })
        .await
}

#[tokio::test]
async fn total_is_user_dishes_plus_event_options() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let ten = app.store.insert_option("Balloons", 10.0).await.unwrap();
    let fifteen = app.store.insert_option("Cake", 15.0).await.unwrap();
    let plov = dish(&app.store, 7.0).await;

    events::add_options(&app.state, OWNER, event.id, &[ten.id, fifteen.id])
        .await
        .unwrap();

    let empty = pricing::compute_total_price(app.state.store.as_ref(), event.id, OWNER)
        .await
        .unwrap();
    assert_eq!(empty.dishes, 0.0);
    assert_eq!(empty.total, 25.0);

    orders::create_order(&app.state, OWNER, plov.id, event.id, 3)
        .await
        .unwrap();
    let price = pricing::compute_total_price(app.state.store.as_ref(), event.id, OWNER)
        .await
        .unwrap();
    assert_eq!(price.dishes, 21.0);
    assert_eq!(price.options, 25.0);
    assert_eq!(price.total, 46.0);
}

#[tokio::test]
async fn dish_total_is_scoped_to_the_requesting_user() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let option = app.store.insert_option("Music", 100.0).await.unwrap();
    let plov = dish(&app.store, 5.0).await;

    events::add_options(&app.state, OWNER, event.id, &[option.id])
        .await
        .unwrap();
    orders::create_order(&app.state, OWNER, plov.id, event.id, 2)
        .await
        .unwrap();
    orders::create_order(&app.state, FRIEND, plov.id, event.id, 10)
        .await
        .unwrap();

    let owner = pricing::compute_total_price(app.state.store.as_ref(), event.id, OWNER)
        .await
        .unwrap();
    let friend = pricing::compute_total_price(app.state.store.as_ref(), event.id, FRIEND)
        .await
        .unwrap();
    assert_eq!(owner.total, 110.0);
    assert_eq!(friend.total, 150.0);
}

#[tokio::test]
async fn option_changes_have_set_semantics() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let option = app.store.insert_option("Flowers", 40.0).await.unwrap();

    events::add_options(&app.state, OWNER, event.id, &[option.id])
        .await
        .unwrap();
    let twice = events::add_options(&app.state, OWNER, event.id, &[option.id, option.id])
        .await
        .unwrap();
    assert_eq!(twice.len(), 1);
    let price = pricing::compute_total_price(app.state.store.as_ref(), event.id, OWNER)
        .await
        .unwrap();
    assert_eq!(price.options, 40.0);

    let removed = events::remove_options(&app.state, OWNER, event.id, &[option.id])
        .await
        .unwrap();
    assert!(removed.is_empty());
    let removed_again = events::remove_options(&app.state, OWNER, event.id, &[option.id])
        .await
        .unwrap();
    assert!(removed_again.is_empty());
}

#[tokio::test]
async fn unknown_option_ids_are_rejected() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;

    let result = events::add_options(&app.state, OWNER, event.id, &[424_242]).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    let options = events::add_options(&app.state, OWNER, event.id, &[]).await.unwrap();
    assert!(options.is_empty());
}

#[tokio::test]
async fn negative_prices_and_amounts_are_rejected() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let plov = dish(&app.store, 5.0).await;

    assert!(matches!(
        app.store.insert_option("Refund", -1.0).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        orders::create_order(&app.state, OWNER, plov.id, event.id, -2).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn guest_count_includes_guests_without_seat() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;

    let ana = guests::register_guest(&app.state, OWNER, event.id, 1, guest_info("Ana"))
        .await
        .unwrap();
    guests::register_guest(&app.state, OWNER, event.id, 2, guest_info("Ion"))
        .await
        .unwrap();
    guests::free_seat(&app.state, OWNER, ana.id).await.unwrap();

    assert_eq!(
        pricing::guest_count(app.state.store.as_ref(), event.id).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn orders_are_private_to_their_user() {
    let app = test_app();
    let hole = app.store.insert_hole("Room", 10).await;
    let event = create_event_in(&app.state, OWNER, hole.id).await;
    let plov = dish(&app.store, 4.5).await;

    let line = orders::create_order(&app.state, FRIEND, plov.id, event.id, 2)
        .await
        .unwrap();
    assert_eq!(line.line_total, 9.0);

    assert!(matches!(
        orders::get_order(&app.state, OWNER, line.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert_eq!(orders::my_orders(&app.state, FRIEND).await.unwrap().len(), 1);
    assert!(orders::my_orders(&app.state, OWNER).await.unwrap().is_empty());

    orders::delete_order(&app.state, FRIEND, line.id).await.unwrap();
    assert!(matches!(
        orders::get_order(&app.state, FRIEND, line.id).await,
        Err(AppError::NotFound(_))
    ));
}
