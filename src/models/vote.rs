//! Up/down votes on an entry's rating.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A vote cast on a [`GuestbookEntry`](super::entry::GuestbookEntry).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vote {
    Up,
    Down,
}

/// Returned when a vote is decoded from anything but `UP` or `DOWN`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown vote `{0}`, expected UP or DOWN")]
pub struct UnknownVote(pub String);

impl Vote {
    /// Amount to add to the current rating.
    pub const fn rating(self) -> i32 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }
}

impl FromStr for Vote {
    type Err = UnknownVote;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("up") {
            Ok(Vote::Up)
        } else if trimmed.eq_ignore_ascii_case("down") {
            Ok(Vote::Down)
        } else {
            Err(UnknownVote(value.to_string()))
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Up => f.write_str("UP"),
            Vote::Down => f.write_str("DOWN"),
        }
    }
}
