#![forbid(unsafe_code)]

pub mod billing;
pub mod display;
pub mod error;
pub mod model;
pub mod money;
pub mod time;

pub use billing::{
    BillingConfig, BillingEvent, BillingSnapshot, BillingState, EndReason, SessionBillingTimer,
};
pub use error::Error;
pub use money::{Money, RatePerMinute};
pub use time::Clock;
