//! Scripted chat lines for demo readings and live streams.
//!
//! Nothing here affects billing; the generator only fills a chat view.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

pub const MIN_VIEWERS: u32 = 20;
const HOST_MESSAGE_PROBABILITY: f64 = 0.3;
const VIEWER_DRIFT_PROBABILITY: f64 = 0.2;

pub const WELCOME_MESSAGE: &str =
    "Welcome to my live stream! Feel free to ask questions in the chat.";

const READER_REPLIES: &[&str] = &[
    "I'm sensing a strong energy around you related to your question.",
    "The cards are showing a period of transition in your life.",
    "I see a new opportunity coming your way soon.",
    "There's someone from your past who still thinks about you.",
    "Your spiritual guides are trying to communicate an important message.",
    "I'm feeling that you've been worried about a specific situation lately.",
    "The energy I'm receiving suggests you should trust your intuition on this matter.",
    "There's a significant change coming in the next few months.",
    "I sense that you've been feeling uncertain about a decision.",
    "The spiritual realm is showing me that you have untapped potential.",
];

const HOST_MESSAGES: &[&str] = &[
    "I'm sensing a strong collective energy today.",
    "Remember to focus on your intentions as we continue.",
    "The cards are showing a period of transformation for many of you.",
    "Thank you for all the gifts and support!",
    "I'll be taking questions from the chat in a few minutes.",
    "I'm feeling a powerful spiritual presence with us right now.",
    "Don't forget to follow me for notifications about future streams.",
    "The energy in this stream is absolutely beautiful today.",
];

const VIEWER_MESSAGES: &[&str] = &[
    "Thank you for the insights!",
    "Can you do a card pull for me?",
    "This resonates with me so much.",
    "I've been feeling exactly what you're describing.",
    "Your energy is so calming.",
    "Will you be streaming again tomorrow?",
    "I had a dream about this last night!",
    "Sending positive vibes to everyone here.",
    "This is exactly what I needed to hear today.",
];

const VIEWER_NAMES: &[&str] = &[
    "SpiritSeeker",
    "MysticMoon",
    "StarGazer",
    "CosmicSoul",
    "EnergyFlow",
    "LightWorker",
    "SoulJourney",
    "AstralWanderer",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: String,
    pub content: String,
    pub is_host: bool,
}

/// Source of simulated chat content.
pub trait ContentGenerator: Send {
    fn reader_reply(&mut self) -> &'static str;
    fn host_message(&mut self) -> &'static str;
    fn viewer_message(&mut self) -> &'static str;
    fn viewer_name(&mut self) -> &'static str;

    /// Starting audience, in `20..120`.
    fn initial_viewer_count(&mut self) -> u32;

    /// Move the audience by at most two, never below `MIN_VIEWERS`.
    fn drift_viewer_count(&mut self, current: u32) -> u32;

    /// Whether the next stream line comes from the host.
    fn next_is_host(&mut self) -> bool;

    /// Next line of a live stream hosted by `host`.
    fn stream_message(&mut self, host: &str) -> ChatMessage {
        if self.next_is_host() {
            ChatMessage {
                sender: host.to_owned(),
                content: self.host_message().to_owned(),
                is_host: true,
            }
        } else {
            ChatMessage {
                sender: self.viewer_name().to_owned(),
                content: self.viewer_message().to_owned(),
                is_host: false,
            }
        }
    }
}

/// `ContentGenerator` drawing uniformly from fixed pools.
pub struct RandomChatter {
    rng: StdRng,
}

impl RandomChatter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, pool: &'static [&'static str]) -> &'static str {
        pool.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

impl Default for RandomChatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentGenerator for RandomChatter {
    fn reader_reply(&mut self) -> &'static str {
        self.pick(READER_REPLIES)
    }

    fn host_message(&mut self) -> &'static str {
        self.pick(HOST_MESSAGES)
    }

    fn viewer_message(&mut self) -> &'static str {
        self.pick(VIEWER_MESSAGES)
    }

    fn viewer_name(&mut self) -> &'static str {
        self.pick(VIEWER_NAMES)
    }

    fn initial_viewer_count(&mut self) -> u32 {
        self.rng.random_range(MIN_VIEWERS..MIN_VIEWERS + 100)
    }

    fn drift_viewer_count(&mut self, current: u32) -> u32 {
        if !self.rng.random_bool(VIEWER_DRIFT_PROBABILITY) {
            return current.max(MIN_VIEWERS);
        }
        let change: i64 = self.rng.random_range(-2..=2);
        let next = i64::from(current) + change;
        u32::try_from(next.max(i64::from(MIN_VIEWERS))).unwrap_or(MIN_VIEWERS)
    }

    fn next_is_host(&mut self) -> bool {
        self.rng.random_bool(HOST_MESSAGE_PROBABILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_come_from_their_pools() {
        let mut chatter = RandomChatter::seeded(11);
        for _ in 0..50 {
            assert!(READER_REPLIES.contains(&chatter.reader_reply()));
            assert!(HOST_MESSAGES.contains(&chatter.host_message()));
            assert!(VIEWER_MESSAGES.contains(&chatter.viewer_message()));
            assert!(VIEWER_NAMES.contains(&chatter.viewer_name()));
        }
    }

    #[test]
    fn viewer_counts_stay_in_range() {
        let mut chatter = RandomChatter::seeded(3);
        for _ in 0..200 {
            let start = chatter.initial_viewer_count();
            assert!((20..120).contains(&start));
        }

        let mut count = MIN_VIEWERS;
        for _ in 0..500 {
            let next = chatter.drift_viewer_count(count);
            assert!(next >= MIN_VIEWERS);
            assert!(next.abs_diff(count) <= 2);
            count = next;
        }
    }

    #[test]
    fn stream_messages_attribute_host_lines() {
        let mut chatter = RandomChatter::seeded(21);
        let messages: Vec<_> = (0..100).map(|_| chatter.stream_message("Mae")).collect();
        assert!(messages.iter().any(|m| m.is_host));
        assert!(messages.iter().any(|m| !m.is_host));
        for message in messages {
            if message.is_host {
                assert_eq!(message.sender, "Mae");
                assert!(HOST_MESSAGES.contains(&message.content.as_str()));
            } else {
                assert!(VIEWER_NAMES.contains(&message.sender.as_str()));
            }
        }
    }
}
