//! Duration codec.
//!
//! Decodes the compact designator encoding used by the metadata service
//! (`PT1H2M3S`) into whole seconds, and formats seconds back into the
//! `1h 2m 3.00s` display form.
//!
//! Grammar accepted by [`parse_duration`]:
//!
//! ```text
//! duration := "P" [days "D"] ( "T" [hours "H"] [minutes "M"] [seconds "S"] )?
//! ```
//!
//! Every group is optional, groups must appear in that order, and either the
//! day group or the `T` section must be present. `PT` alone is zero.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Canonical elapsed-time unit.
pub type DurationSeconds = u64;

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 3600;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Errors from decoding a duration encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed duration encoding: {0:?}")]
    Malformed(String),

    #[error("Duration out of range: {0:?}")]
    Overflow(String),
}

fn grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^P(?:(?P<d>\d+)D)?(?P<t>T(?:(?P<h>\d+)H)?(?:(?P<m>\d+)M)?(?:(?P<s>\d+)(?:[.,]\d+)?S)?)?$",
        )
        .unwrap()
    })
}

/// Parse a duration encoding into whole seconds.
///
/// Fractional seconds are truncated.
pub fn parse_duration(encoding: &str) -> Result<DurationSeconds, DecodeError> {
    let encoding = encoding.trim();
    let caps = grammar()
        .captures(encoding)
        .ok_or_else(|| DecodeError::Malformed(encoding.to_string()))?;

    if caps.name("d").is_none() && caps.name("t").is_none() {
        return Err(DecodeError::Malformed(encoding.to_string()));
    }

    let component = |name: &str, unit: u64| -> Result<u64, DecodeError> {
        match caps.name(name) {
            None => Ok(0),
            Some(m) => m
                .as_str()
                .parse::<u64>()
                .ok()
                .and_then(|n| n.checked_mul(unit))
                .ok_or_else(|| DecodeError::Overflow(encoding.to_string())),
        }
    };

    [
        component("d", SECONDS_PER_DAY)?,
        component("h", SECONDS_PER_HOUR)?,
        component("m", SECONDS_PER_MINUTE)?,
        component("s", 1)?,
    ]
    .into_iter()
    .try_fold(0u64, |acc, part| acc.checked_add(part))
    .ok_or_else(|| DecodeError::Overflow(encoding.to_string()))
}

/// Format seconds as `{hours}h {minutes}m {seconds}s`.
///
/// Seconds keep two decimals so speed-adjusted values render faithfully.
/// Negative and non-finite inputs render as zero.
pub fn format_seconds(total: f64) -> String {
    let total = if total.is_finite() && total > 0.0 {
        total
    } else {
        0.0
    };
    let hours = (total / SECONDS_PER_HOUR as f64).floor();
    let minutes = ((total % SECONDS_PER_HOUR as f64) / SECONDS_PER_MINUTE as f64).floor();
    let seconds = total % SECONDS_PER_MINUTE as f64;
    format!("{}h {}m {:.2}s", hours as u64, minutes as u64, seconds)
}
