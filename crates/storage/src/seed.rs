//! Demo catalog used by the CLI and integration tests.

use seer_core::{Money, RatePerMinute};
use seer_core::model::{Account, Product, ProductId, Reader, ReaderId, Role, UserId};

use crate::repository::{
    AccountRepository, ProductRepository, ReaderRepository, Storage, StorageError,
};

/// IDs of the seeded records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoIds {
    pub client: UserId,
    pub reader_user: UserId,
    pub reader: ReaderId,
    pub offline_reader: ReaderId,
}

const READERS: &[(u64, &str, &str, bool, f32, &[&str])] = &[
    (1, "Mystic Mae", "3.99", true, 4.9, &["tarot", "love"]),
    (2, "Oracle Orin", "2.49", false, 4.6, &["astrology"]),
];

const PRODUCTS: &[(u64, &str, &str, i64, u32)] = &[
    (1, "Amethyst Cluster", "crystals", 2499, 12),
    (2, "Rider-Waite Tarot Deck", "tarot", 1999, 30),
    (3, "White Sage Bundle", "incense", 899, 50),
    (4, "Moon Phase Journal", "books", 1500, 20),
];

fn invalid(err: impl Into<seer_core::Error>) -> StorageError {
    StorageError::Serialization(err.into().to_string())
}

/// Seed one client with `client_balance`, two readers and a small shop.
///
/// # Errors
///
/// Returns `StorageError` if any write fails.
pub async fn seed_demo(storage: &Storage, client_balance: Money) -> Result<DemoIds, StorageError> {
    let client = Account::new(
        UserId::new(1),
        "Sky Client",
        "sky@example.com",
        Role::Client,
        client_balance,
    )
    .map_err(invalid)?;
    storage.accounts.upsert_account(&client).await?;

    for &(id, name, rate, online, rating, specialties) in READERS {
        let user_id = UserId::new(100 + id);
        let account = Account::new(
            user_id,
            name,
            format!("reader{id}@example.com"),
            Role::Reader,
            Money::ZERO,
        )
        .map_err(invalid)?;
        storage.accounts.upsert_account(&account).await?;

        let rate = rate.parse::<RatePerMinute>().map_err(invalid)?;
        let reader = Reader::new(ReaderId::new(id), user_id, name, rate)
            .map_err(invalid)?
            .with_online(online)
            .with_rating(rating)
            .map_err(invalid)?
            .with_specialties(specialties.iter().copied());
        storage.readers.upsert_reader(&reader).await?;
    }

    for &(id, name, category, cents, inventory) in PRODUCTS {
        storage
            .products
            .upsert_product(&Product {
                id: ProductId::new(id),
                name: name.to_owned(),
                description: None,
                price: Money::from_cents(cents),
                category: category.to_owned(),
                inventory,
            })
            .await?;
    }

    Ok(DemoIds {
        client: client.id(),
        reader_user: UserId::new(101),
        reader: ReaderId::new(1),
        offline_reader: ReaderId::new(2),
    })
}
