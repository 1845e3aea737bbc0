//! Configuration loading (TOML file plus `SEER_*` environment overrides).

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use seer_core::Money;
use seer_core::model::BookingPolicy;
use serde::{Deserialize, Serialize};
use services::ServicesConfig;

pub const DEFAULT_CONFIG_FILE: &str = "seer.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub billing: BillingSection,
    pub wallet: WalletSection,
    pub shop: ShopSection,
    pub booking: BookingSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            billing: BillingSection::default(),
            wallet: WalletSection::default(),
            shop: ShopSection::default(),
            booking: BookingSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingSection {
    /// Milliseconds per billed second.
    pub tick_ms: u64,
    pub low_balance_minutes: u32,
}

impl Default for BillingSection {
    fn default() -> Self {
        Self {
            tick_ms: 1_000,
            low_balance_minutes: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletSection {
    pub min_deposit: String,
}

impl Default for WalletSection {
    fn default() -> Self {
        Self {
            min_deposit: "5.00".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSection {
    pub flat_shipping: String,
}

impl Default for ShopSection {
    fn default() -> Self {
        Self {
            flat_shipping: "5.99".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSection {
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_minutes: u32,
    pub session_minutes: u32,
    pub horizon_days: u32,
}

impl Default for BookingSection {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 21,
            slot_minutes: 30,
            session_minutes: 30,
            horizon_days: 30,
        }
    }
}

impl AppConfig {
    /// Load `path` if given (it must exist), otherwise `seer.toml` in the
    /// working directory when present, otherwise defaults. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_from(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Apply `SEER_LOG`, `SEER_TICK_MS` and `SEER_MIN_DEPOSIT`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(level) = var("SEER_LOG") {
            self.log_level = level;
        }
        if let Some(raw) = var("SEER_TICK_MS") {
            self.billing.tick_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("SEER_TICK_MS is not a number: {raw}"))?;
        }
        if let Some(raw) = var("SEER_MIN_DEPOSIT") {
            self.wallet.min_deposit = raw;
        }
        Ok(())
    }

    /// Validate and convert into the services' settings.
    pub fn services_config(&self) -> anyhow::Result<ServicesConfig> {
        let min_deposit: Money = self
            .wallet
            .min_deposit
            .parse()
            .context("wallet.min_deposit")?;
        let shipping_fee: Money = self
            .shop
            .flat_shipping
            .parse()
            .context("shop.flat_shipping")?;
        let b = &self.booking;
        let booking = BookingPolicy::new(
            b.open_hour,
            b.close_hour,
            b.slot_minutes,
            b.session_minutes,
            b.horizon_days,
        )
        .context("booking")?;
        anyhow::ensure!(
            self.billing.low_balance_minutes > 0,
            "billing.low_balance_minutes must be at least 1"
        );

        Ok(ServicesConfig {
            tick: Duration::from_millis(self.billing.tick_ms.max(1)),
            low_balance_minutes: self.billing.low_balance_minutes,
            min_deposit,
            shipping_fee,
            booking,
        })
    }
}
