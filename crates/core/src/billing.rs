//! Pay-per-minute billing for a live reading.
//!
//! `SessionBillingTimer` is a pure state machine: the caller feeds it one
//! `tick()` per elapsed second while it is running and receives the billing
//! events that tick produced. It performs no I/O and owns no timer; see the
//! services crate for the tokio driver.
//!
//! Deduction is stepped: the balance only changes on whole-minute
//! boundaries. `BillingSnapshot::accrued_cost` reports the continuous
//! per-second cost separately so a display can show both without the two
//! being confused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{Money, RatePerMinute};

/// Default number of minutes of remaining time that triggers the warning.
pub const DEFAULT_LOW_BALANCE_MINUTES: u32 = 2;

const SECONDS_PER_MINUTE: u64 = 60;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BillingConfigError {
    #[error("initial balance cannot be negative: {0}")]
    NegativeBalance(Money),

    #[error("low balance threshold must be at least one minute")]
    InvalidLowBalanceMinutes,
}

/// Explicit inputs for one billed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingConfig {
    rate: RatePerMinute,
    initial_balance: Money,
    low_balance_minutes: u32,
}

impl BillingConfig {
    /// # Errors
    ///
    /// Returns `BillingConfigError::NegativeBalance` if `initial_balance < 0`.
    pub fn new(rate: RatePerMinute, initial_balance: Money) -> Result<Self, BillingConfigError> {
        if initial_balance.is_negative() {
            return Err(BillingConfigError::NegativeBalance(initial_balance));
        }
        Ok(Self {
            rate,
            initial_balance,
            low_balance_minutes: DEFAULT_LOW_BALANCE_MINUTES,
        })
    }

    /// Override how many minutes of remaining time count as "low".
    ///
    /// # Errors
    ///
    /// Returns `BillingConfigError::InvalidLowBalanceMinutes` for zero.
    pub fn with_low_balance_minutes(mut self, minutes: u32) -> Result<Self, BillingConfigError> {
        if minutes == 0 {
            return Err(BillingConfigError::InvalidLowBalanceMinutes);
        }
        self.low_balance_minutes = minutes;
        Ok(self)
    }

    #[must_use]
    pub fn rate(&self) -> RatePerMinute {
        self.rate
    }

    #[must_use]
    pub fn initial_balance(&self) -> Money {
        self.initial_balance
    }

    #[must_use]
    pub fn low_balance_minutes(&self) -> u32 {
        self.low_balance_minutes
    }

    /// Balance below which the low-balance warning fires.
    #[must_use]
    pub fn low_balance_threshold(&self) -> Money {
        self.rate.cost_for_minutes(u64::from(self.low_balance_minutes))
    }

    /// Session length the initial balance pays for, in whole seconds.
    #[must_use]
    pub fn max_session_seconds(&self) -> i64 {
        self.rate.seconds_affordable(self.initial_balance)
    }
}

//
// ─── STATE & EVENTS ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingState {
    Idle,
    Running,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// Balance reached zero on a minute boundary.
    Depleted,
    /// The end action was invoked.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingEvent {
    BalanceUpdated(Money),
    LowBalance(Money),
    SessionEnded(EndReason),
}

/// Derived view of a session, recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSnapshot {
    pub state: BillingState,
    pub elapsed_seconds: u64,
    /// Amount deducted so far (whole minutes only).
    pub cost_so_far: Money,
    /// Continuous per-second cost, rounded down to the cent.
    pub accrued_cost: Money,
    pub remaining_balance: Money,
    /// May be negative once the session has overspent.
    pub remaining_seconds: i64,
    pub low_balance: bool,
    pub end_reason: Option<EndReason>,
}

impl BillingSnapshot {
    #[must_use]
    pub fn elapsed_minutes(&self) -> u64 {
        self.elapsed_seconds / SECONDS_PER_MINUTE
    }
}

//
// ─── TIMER ─────────────────────────────────────────────────────────────────────
//

/// Tracks elapsed time for one reading and derives its running cost.
#[derive(Debug, Clone)]
pub struct SessionBillingTimer {
    config: BillingConfig,
    state: BillingState,
    elapsed_seconds: u64,
    remaining_balance: Money,
    low_balance_warned: bool,
    end_reason: Option<EndReason>,
}

impl SessionBillingTimer {
    #[must_use]
    pub fn new(config: BillingConfig) -> Self {
        Self {
            config,
            state: BillingState::Idle,
            elapsed_seconds: 0,
            remaining_balance: config.initial_balance(),
            low_balance_warned: false,
            end_reason: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> BillingState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == BillingState::Running
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.state == BillingState::Ended
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Elapsed time as `(minutes, seconds)` with seconds in `0..60`.
    #[must_use]
    pub fn elapsed(&self) -> (u64, u64) {
        (
            self.elapsed_seconds / SECONDS_PER_MINUTE,
            self.elapsed_seconds % SECONDS_PER_MINUTE,
        )
    }

    /// Balance after the last whole-minute deduction.
    #[must_use]
    pub fn remaining_balance(&self) -> Money {
        self.remaining_balance
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> i64 {
        let elapsed = i64::try_from(self.elapsed_seconds).unwrap_or(i64::MAX);
        self.config.max_session_seconds().saturating_sub(elapsed)
    }

    #[must_use]
    pub fn low_balance_warned(&self) -> bool {
        self.low_balance_warned
    }

    /// Apply the externally supplied activity flag.
    ///
    /// Returns `true` if the state changed. Ended sessions ignore the flag.
    pub fn set_active(&mut self, active: bool) -> bool {
        let next = match (self.state, active) {
            (BillingState::Idle, true) => BillingState::Running,
            (BillingState::Running, false) => BillingState::Idle,
            _ => return false,
        };
        self.state = next;
        true
    }

    /// Advance one second. Does nothing unless running.
    pub fn tick(&mut self) -> Vec<BillingEvent> {
        if self.state != BillingState::Running {
            return Vec::new();
        }

        self.elapsed_seconds += 1;
        if self.elapsed_seconds % SECONDS_PER_MINUTE != 0 {
            return Vec::new();
        }

        self.on_minute_boundary()
    }

    fn on_minute_boundary(&mut self) -> Vec<BillingEvent> {
        let minutes = self.elapsed_seconds / SECONDS_PER_MINUTE;
        let cost = self.config.rate().cost_for_minutes(minutes);
        self.remaining_balance = self.config.initial_balance() - cost;

        let mut events = vec![BillingEvent::BalanceUpdated(self.remaining_balance)];

        if !self.low_balance_warned && self.remaining_balance < self.config.low_balance_threshold()
        {
            self.low_balance_warned = true;
            events.push(BillingEvent::LowBalance(self.remaining_balance));
        }

        if !self.remaining_balance.is_positive() {
            self.finish(EndReason::Depleted);
            events.push(BillingEvent::SessionEnded(EndReason::Depleted));
        }

        events
    }

    /// Manual end. Returns the end event the first time only.
    pub fn end(&mut self) -> Option<BillingEvent> {
        if self.is_ended() {
            return None;
        }
        self.finish(EndReason::Manual);
        Some(BillingEvent::SessionEnded(EndReason::Manual))
    }

    fn finish(&mut self, reason: EndReason) {
        self.state = BillingState::Ended;
        self.end_reason = Some(reason);
    }

    #[must_use]
    pub fn snapshot(&self) -> BillingSnapshot {
        BillingSnapshot {
            state: self.state,
            elapsed_seconds: self.elapsed_seconds,
            cost_so_far: self.config.initial_balance() - self.remaining_balance,
            accrued_cost: self.config.rate().cost_for_seconds(self.elapsed_seconds),
            remaining_balance: self.remaining_balance,
            remaining_seconds: self.remaining_seconds(),
            low_balance: self.low_balance_warned,
            end_reason: self.end_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(raw: &str) -> Money {
        raw.parse().unwrap()
    }

    fn timer(rate: &str, balance: &str) -> SessionBillingTimer {
        let config = BillingConfig::new(rate.parse().unwrap(), money(balance)).unwrap();
        SessionBillingTimer::new(config)
    }

    fn run_for(timer: &mut SessionBillingTimer, seconds: u64) -> Vec<BillingEvent> {
        (0..seconds).flat_map(|_| timer.tick()).collect()
    }

    fn count_ends(events: &[BillingEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, BillingEvent::SessionEnded(_)))
            .count()
    }

    #[test]
    fn negative_initial_balance_is_rejected() {
        let err = BillingConfig::new("1.00".parse().unwrap(), money("-0.01")).unwrap_err();
        assert_eq!(err, BillingConfigError::NegativeBalance(money("-0.01")));
    }

    #[test]
    fn starts_idle_and_ignores_ticks() {
        let mut t = timer("3.00", "6.00");
        assert_eq!(t.state(), BillingState::Idle);
        assert!(run_for(&mut t, 90).is_empty());
        assert_eq!(t.elapsed_seconds(), 0);
    }

    #[test]
    fn remaining_seconds_decrease_one_per_tick() {
        let mut t = timer("3.99", "25.00");
        let start = t.remaining_seconds();
        assert_eq!(start, 375);

        t.set_active(true);
        for n in 1..=200 {
            t.tick();
            assert_eq!(t.remaining_seconds(), start - n);
        }
    }

    #[test]
    fn seconds_roll_into_minutes() {
        let mut t = timer("1.00", "100.00");
        t.set_active(true);
        run_for(&mut t, 59);
        assert_eq!(t.elapsed(), (0, 59));
        t.tick();
        assert_eq!(t.elapsed(), (1, 0));
        run_for(&mut t, 5);
        assert_eq!(t.elapsed(), (1, 5));
    }

    #[test]
    fn balance_updates_only_on_minute_boundaries() {
        let mut t = timer("1.50", "30.00");
        t.set_active(true);

        let events = run_for(&mut t, 59);
        assert!(events.is_empty());
        assert_eq!(t.remaining_balance(), money("30.00"));

        let events = t.tick();
        assert_eq!(events, vec![BillingEvent::BalanceUpdated(money("28.50"))]);

        let events = run_for(&mut t, 60);
        assert_eq!(events, vec![BillingEvent::BalanceUpdated(money("27.00"))]);
    }

    #[test]
    fn depletes_exactly_at_boundary() {
        let mut t = timer("3.00", "6.00");
        t.set_active(true);

        let events = run_for(&mut t, 119);
        assert_eq!(count_ends(&events), 0);
        assert!(t.is_running());

        let events = t.tick();
        assert_eq!(t.remaining_balance(), Money::ZERO);
        assert_eq!(count_ends(&events), 1);
        assert_eq!(
            events.last(),
            Some(&BillingEvent::SessionEnded(EndReason::Depleted))
        );
        assert_eq!(t.state(), BillingState::Ended);

        // terminal
        assert!(run_for(&mut t, 120).is_empty());
        assert_eq!(t.elapsed_seconds(), 120);
        assert!(t.end().is_none());
    }

    #[test]
    fn low_balance_warns_once() {
        let mut t = timer("5.00", "12.00");
        t.set_active(true);

        let events = run_for(&mut t, 60);
        assert_eq!(
            events,
            vec![
                BillingEvent::BalanceUpdated(money("7.00")),
                BillingEvent::LowBalance(money("7.00")),
            ]
        );
        assert!(t.low_balance_warned());

        let events = run_for(&mut t, 60);
        assert_eq!(
            events,
            vec![
                BillingEvent::BalanceUpdated(money("2.00")),
            ]
        );

        let events = run_for(&mut t, 60);
        let warnings = events
            .iter()
            .filter(|e| matches!(e, BillingEvent::LowBalance(_)))
            .count();
        assert_eq!(warnings, 0);
        assert_eq!(count_ends(&events), 1);
    }

    #[test]
    fn balance_under_one_minute_ends_on_first_boundary() {
        let mut t = timer("2.00", "1.00");
        assert_eq!(t.remaining_seconds(), 30);
        t.set_active(true);

        let events = run_for(&mut t, 60);
        assert_eq!(t.remaining_balance(), money("-1.00"));
        assert_eq!(t.remaining_seconds(), -30);
        assert_eq!(
            events,
            vec![
                BillingEvent::BalanceUpdated(money("-1.00")),
                BillingEvent::LowBalance(money("-1.00")),
                BillingEvent::SessionEnded(EndReason::Depleted),
            ]
        );
    }

    #[test]
    fn manual_end_before_first_minute_keeps_balance() {
        let mut t = timer("4.00", "20.00");
        t.set_active(true);
        let events = run_for(&mut t, 45);
        assert!(events.is_empty());

        assert_eq!(
            t.end(),
            Some(BillingEvent::SessionEnded(EndReason::Manual))
        );
        let snap = t.snapshot();
        assert_eq!(snap.remaining_balance, money("20.00"));
        assert_eq!(snap.cost_so_far, Money::ZERO);
        assert_eq!(snap.accrued_cost, money("3.00"));
        assert_eq!(snap.end_reason, Some(EndReason::Manual));

        assert_eq!(t.end(), None);
    }

    #[test]
    fn manual_end_from_idle_is_allowed() {
        let mut t = timer("1.00", "5.00");
        assert!(t.end().is_some());
        assert!(!t.set_active(true));
        assert_eq!(t.state(), BillingState::Ended);
    }

    #[test]
    fn pause_keeps_state() {
        let mut t = timer("1.00", "10.00");
        assert!(t.set_active(true));
        run_for(&mut t, 70);
        assert!(t.set_active(false));
        assert_eq!(t.state(), BillingState::Idle);

        let before = t.snapshot();
        assert!(run_for(&mut t, 30).is_empty());
        assert_eq!(t.snapshot(), before);

        assert!(!t.set_active(false));
        assert!(t.set_active(true));
        run_for(&mut t, 50);
        assert_eq!(t.remaining_balance(), money("8.00"));
    }

    #[test]
    fn custom_threshold_changes_warning_point() {
        let config = BillingConfig::new("1.00".parse().unwrap(), money("10.00"))
            .unwrap()
            .with_low_balance_minutes(5)
            .unwrap();
        let mut t = SessionBillingTimer::new(config);
        t.set_active(true);

        let events = run_for(&mut t, 5 * 60);
        assert!(!events.contains(&BillingEvent::LowBalance(money("5.00"))));
        let events = run_for(&mut t, 60);
        assert!(events.contains(&BillingEvent::LowBalance(money("4.00"))));
    }

    #[test]
    fn zero_minute_threshold_is_rejected() {
        let config = BillingConfig::new("1.00".parse().unwrap(), money("1.00")).unwrap();
        assert_eq!(
            config.with_low_balance_minutes(0).unwrap_err(),
            BillingConfigError::InvalidLowBalanceMinutes
        );
    }
}
