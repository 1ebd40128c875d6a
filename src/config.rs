//! Decoder configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Every channel enabled
const ALL_CHANNELS: u16 = 0xFFFF;

/// Options controlling how a sequence is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    /// Fail when the header chunk declares a length other than 6, instead of logging it
    pub strict_header_length: bool,
    /// Bitmask of the channels to collect notes for, bit `n` being channel `n`
    pub channels: u16,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strict_header_length: false,
            channels: ALL_CHANNELS,
        }
    }
}

impl DecoderConfig {
    /// Sets whether the header chunk length is enforced
    pub fn with_strict_header_length(mut self, strict: bool) -> Self {
        self.strict_header_length = strict;
        self
    }

    /// Restricts note collection to the given channels
    pub fn with_channels<I>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        self.channels = channels
            .into_iter()
            .filter(|channel| *channel < 16)
            .fold(0, |mask, channel| mask | 1 << channel);
        self
    }

    /// Returns true if notes on `channel` are collected
    pub fn channel_enabled(&self, channel: u8) -> bool {
        channel < 16 && self.channels & (1 << channel) != 0
    }
}
