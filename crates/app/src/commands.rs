use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use seer_core::display::{format_clock, format_elapsed, is_urgent};
use seer_core::model::{GiftCatalog, Reader, ReadingKind};
use seer_core::{BillingConfig, BillingSnapshot, BillingState, EndReason, Money, RatePerMinute};
use services::{
    AppServices, BillingObserver, Clock, ContentGenerator, RandomChatter, ServicesConfig,
    SimulatedGateway,
};
use storage::repository::Storage;
use storage::seed::seed_demo;
use tracing::info;

/// Seconds between simulated reader lines in the demo chat.
const CHAT_EVERY_SECONDS: u64 = 15;

/// Prints billing callbacks as they happen.
struct ConsoleObserver;

impl BillingObserver for ConsoleObserver {
    fn on_balance_update(&mut self, balance: Money) {
        println!("  balance now {}", balance.clamp_zero());
    }

    fn on_low_balance(&mut self, snapshot: &BillingSnapshot) {
        println!(
            "  low balance: {} left ({} of reading time)",
            snapshot.remaining_balance.clamp_zero(),
            format_clock(snapshot.remaining_seconds)
        );
    }

    fn on_session_end(&mut self, reason: EndReason, _snapshot: &BillingSnapshot) {
        match reason {
            EndReason::Depleted => println!("  session ended: balance depleted"),
            EndReason::Manual => println!("  session ended"),
        }
    }
}

pub async fn run_reading(
    rate: RatePerMinute,
    balance: Money,
    kind: ReadingKind,
    mut config: ServicesConfig,
    tick: Option<Duration>,
) -> anyhow::Result<()> {
    if let Some(tick) = tick {
        config.tick = tick;
    }

    let storage = Storage::in_memory();
    let ids = seed_demo(&storage, balance).await?;
    let reader = Reader::new(ids.reader, ids.reader_user, "Mystic Mae", rate)?.with_online(true);
    storage.readers.upsert_reader(&reader).await?;

    let app = AppServices::new(
        &storage,
        Clock::system(),
        Arc::new(SimulatedGateway::new()),
        config,
    );
    let readings = app.readings();
    let mut session = readings
        .start_reading(ids.client, ids.reader, kind, Box::new(ConsoleObserver))
        .await?;

    println!(
        "{} reading with {} at {rate}, balance {balance}, time available {}",
        kind.as_str(),
        session.reader_name(),
        format_clock(session.snapshot().remaining_seconds)
    );

    let mut chatter = RandomChatter::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = session.changed() => {
                let Some(snapshot) = changed else { break };
                if snapshot.state == BillingState::Ended {
                    break;
                }
                print_progress(&snapshot, session.reader_name(), &mut chatter);
            }
            _ = &mut ctrl_c => {
                info!("interrupted, ending reading");
                session.end();
                break;
            }
        }
    }

    let receipt = readings.finish_reading(session).await?;
    println!(
        "elapsed {}, billed {}, balance {}",
        format_elapsed(receipt.elapsed_seconds),
        receipt.billed,
        receipt.new_balance.clamp_zero()
    );
    Ok(())
}

fn print_progress(snapshot: &BillingSnapshot, reader: &str, chatter: &mut RandomChatter) {
    let elapsed = snapshot.elapsed_seconds;
    if elapsed == 0 {
        return;
    }
    if elapsed % CHAT_EVERY_SECONDS == 0 {
        println!("  {reader}: {}", chatter.reader_reply());
    }
    if elapsed % 10 == 0 || (is_urgent(snapshot.remaining_seconds) && elapsed % 5 == 0) {
        println!(
            "[{}] remaining {}{} accrued {}",
            format_elapsed(elapsed),
            format_clock(snapshot.remaining_seconds),
            if is_urgent(snapshot.remaining_seconds) { " !" } else { "" },
            snapshot.accrued_cost
        );
    }
}

pub async fn run_readers(
    config: &ServicesConfig,
    online_only: bool,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    seed_demo(&storage, Money::ZERO).await?;
    let app = AppServices::new(
        &storage,
        Clock::system(),
        Arc::new(SimulatedGateway::new()),
        *config,
    );

    let readers = app.readers().list_readers(online_only, limit).await?;
    if readers.is_empty() {
        println!("no readers {}", if online_only { "online" } else { "listed" });
        return Ok(());
    }
    for reader in readers {
        let rating = reader
            .rating()
            .map_or_else(|| "new".to_owned(), |r| format!("{r:.1}"));
        println!(
            "  {} {:<14} {}  rating {rating}  {}",
            if reader.is_online() { "*" } else { " " },
            reader.name(),
            reader.rate(),
            reader.specialties().join(", ")
        );
    }
    Ok(())
}

pub fn run_slots(config: &ServicesConfig, date: Option<NaiveDate>) {
    let storage = Storage::in_memory();
    let app = AppServices::new(
        &storage,
        Clock::system(),
        Arc::new(SimulatedGateway::new()),
        *config,
    );
    let bookings = app.bookings();
    let date = date.unwrap_or_else(|| Clock::system().today() + chrono::Duration::days(1));

    let slots = bookings.available_slots(date);
    if slots.is_empty() {
        println!("no bookable slots on {date}");
        return;
    }
    println!(
        "{} slots on {date} ({} minutes each):",
        slots.len(),
        bookings.policy().session_minutes()
    );
    for slot in slots {
        println!("  {:>8}", slot.label());
    }
}

pub fn run_gifts(balance: Option<Money>) {
    let catalog = GiftCatalog::default();
    let gifts: Vec<_> = match balance {
        Some(balance) => catalog.affordable(balance),
        None => catalog.gifts().iter().collect(),
    };
    if gifts.is_empty() {
        println!("no gifts affordable");
    }
    for gift in gifts {
        println!("  {} {:<14} {}", gift.icon, gift.name, gift.value);
    }
}

pub fn run_remaining(rate: RatePerMinute, balance: Money) -> anyhow::Result<()> {
    let config = BillingConfig::new(rate, balance)?;
    let seconds = config.max_session_seconds();
    println!(
        "{balance} at {rate} lasts {} ({} full minutes)",
        format_clock(seconds),
        seconds / 60
    );
    Ok(())
}
