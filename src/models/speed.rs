//! Playback speed multipliers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a free-text playback speed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeedError {
    #[error("Playback speed is not a number: {0:?}")]
    NotANumber(String),

    #[error("Playback speed must be greater than zero, got {0}")]
    NotPositive(f64),

    #[error("Unsupported playback speed {0} (use 0.25 to 2 in 0.25 steps)")]
    Unsupported(f64),
}

/// Selectable playback speed. Display-only divisor for a total duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlaybackSpeed {
    Quarter,
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    OneAndThreeQuarters,
    Double,
}

impl PlaybackSpeed {
    /// Every selectable speed, slowest first.
    pub const ALL: [PlaybackSpeed; 8] = [
        PlaybackSpeed::Quarter,
        PlaybackSpeed::Half,
        PlaybackSpeed::ThreeQuarters,
        PlaybackSpeed::Normal,
        PlaybackSpeed::OneAndQuarter,
        PlaybackSpeed::OneAndHalf,
        PlaybackSpeed::OneAndThreeQuarters,
        PlaybackSpeed::Double,
    ];

    /// Numeric multiplier. Never zero.
    pub fn multiplier(self) -> f64 {
        match self {
            PlaybackSpeed::Quarter => 0.25,
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::ThreeQuarters => 0.75,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::OneAndQuarter => 1.25,
            PlaybackSpeed::OneAndHalf => 1.5,
            PlaybackSpeed::OneAndThreeQuarters => 1.75,
            PlaybackSpeed::Double => 2.0,
        }
    }

    /// Look up the speed for an exact multiplier value.
    pub fn from_multiplier(value: f64) -> Result<Self, SpeedError> {
        if !value.is_finite() {
            return Err(SpeedError::Unsupported(value));
        }
        if value <= 0.0 {
            return Err(SpeedError::NotPositive(value));
        }
        Self::ALL
            .into_iter()
            .find(|s| (s.multiplier() - value).abs() < f64::EPSILON)
            .ok_or(SpeedError::Unsupported(value))
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x", self.multiplier())
    }
}

/// Accepts `"1.5 x"`, `"1.5x"` and `"1.5"`.
impl FromStr for PlaybackSpeed {
    type Err = SpeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_suffix(['x', 'X'])
            .unwrap_or(trimmed)
            .trim_end();
        let value: f64 = number
            .parse()
            .map_err(|_| SpeedError::NotANumber(s.to_string()))?;
        Self::from_multiplier(value)
    }
}

impl TryFrom<String> for PlaybackSpeed {
    type Error = SpeedError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PlaybackSpeed> for String {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.to_string()
    }
}
