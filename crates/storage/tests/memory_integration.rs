use seer_core::Money;
use seer_core::model::{CartItem, ProductId, ReaderId, ServiceId, UserId};
use seer_core::time::fixed_now;
use storage::repository::{
    AccountRepository, BookingRepository, NewBooking, NewOrder, OrderRepository,
    ProductRepository, ReaderRepository, Storage,
};
use storage::seed::seed_demo;

#[tokio::test]
async fn seeded_storage_lists_online_readers_and_products() {
    let storage = Storage::in_memory();
    let ids = seed_demo(&storage, Money::from_units(50)).await.unwrap();

    let client = storage.accounts.get_account(ids.client).await.unwrap().unwrap();
    assert_eq!(client.balance(), Money::from_units(50));

    let online = storage.readers.list_readers(true).await.unwrap();
    assert_eq!(online.len(), 1);
    assert_eq!(online[0].id(), ReaderId::new(1));
    assert_eq!(storage.readers.list_readers(false).await.unwrap().len(), 2);

    let tarot = storage.products.list_products(Some("Tarot")).await.unwrap();
    assert_eq!(tarot.len(), 1);
    assert_eq!(storage.products.list_products(None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn bookings_and_orders_get_sequential_ids() {
    let storage = Storage::in_memory();
    let now = fixed_now();

    for hours in [48, 24] {
        storage
            .bookings
            .insert_booking(NewBooking {
                client_id: UserId::new(1),
                reader_id: ReaderId::new(1),
                service_id: ServiceId::new(1),
                scheduled_at: now + chrono::Duration::hours(hours),
                duration_minutes: 30,
                amount: Money::from_units(40),
                created_at: now,
            })
            .await
            .unwrap();
    }
    let bookings = storage
        .bookings
        .list_client_bookings(UserId::new(1))
        .await
        .unwrap();
    assert_eq!(bookings.len(), 2);
    // ordered by schedule, not insertion
    assert_eq!(bookings[0].id.value(), 2);

    let order_id = storage
        .orders
        .insert_order(NewOrder {
            user_id: UserId::new(1),
            items: vec![CartItem {
                product_id: ProductId::new(3),
                name: "White Sage Bundle".into(),
                unit_price: Money::from_cents(899),
                quantity: 2,
            }],
            subtotal: Money::from_cents(1798),
            shipping: Money::from_cents(599),
            shipping_address: "1 Moon St".into(),
            checkout_session: None,
            created_at: now,
        })
        .await
        .unwrap();
    let order = storage.orders.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(order.total, Money::from_cents(2397));
    assert_eq!(order.item_count, 2);
}
