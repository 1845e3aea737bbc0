mod observer;
mod ticker;

// Public API of the billing driver.
pub use observer::{BillingObserver, ChannelObserver, NoopObserver};
pub use ticker::{DEFAULT_TICK, SessionTicker};
