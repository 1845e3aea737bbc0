//! CLI definition (clap derive).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use seer_core::model::ReadingKind;
use seer_core::{Money, RatePerMinute};

#[derive(Parser)]
#[command(name = "seer", about = "Pay-per-minute psychic reading demo", version)]
pub struct Cli {
    /// Config file path (defaults to ./seer.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a simulated reading until the balance runs out or Ctrl-C
    Reading {
        /// Reader rate per minute, e.g. 3.99
        #[arg(long)]
        rate: RatePerMinute,
        /// Starting client balance, e.g. 20.00
        #[arg(long)]
        balance: Money,
        /// Milliseconds per billed second (overrides config)
        #[arg(long)]
        tick_ms: Option<u64>,
        #[arg(long, value_enum, default_value_t = KindArg::Chat)]
        kind: KindArg,
    },
    /// Browse the reader directory
    Readers {
        /// Only readers online now
        #[arg(long)]
        online: bool,
        /// Show at most this many readers
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List bookable slots for a date
    Slots {
        /// YYYY-MM-DD, defaults to tomorrow
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the live-stream gift catalog
    Gifts {
        /// Only show gifts this balance can pay for
        #[arg(long)]
        balance: Option<Money>,
    },
    /// How long a balance lasts at a rate
    Remaining {
        #[arg(long)]
        rate: RatePerMinute,
        #[arg(long)]
        balance: Money,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Chat,
    Phone,
    Video,
}

impl From<KindArg> for ReadingKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Chat => ReadingKind::Chat,
            KindArg::Phone => ReadingKind::Phone,
            KindArg::Video => ReadingKind::Video,
        }
    }
}
