//!
//! Time helpers for ledger timestamps. Ledgers speak nanoseconds since the
//! UNIX epoch; inside a canister the clock is `ic0.time`, on the host it is
//! the system clock.
//!

use std::time::{Duration, SystemTime};

pub const NANOS_PER_SEC: u64 = 1_000_000_000;
pub const NANOS_PER_MILLI: u64 = 1_000_000;

// time_nanos
#[allow(unreachable_code)]
fn time_nanos() -> u128 {
    #[cfg(target_arch = "wasm32")]
    {
        return u128::from(crate::api::time());
    }

    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_nanos(),
        Err(_) => 0,
    }
}

/// Returns the current UNIX epoch time in nanoseconds.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn now_nanos() -> u64 {
    time_nanos() as u64
}

/// Returns the current UNIX epoch time in seconds.
#[must_use]
pub fn now_secs() -> u64 {
    now_nanos() / NANOS_PER_SEC
}

/// Converts a ledger nanosecond timestamp into a `SystemTime`.
#[must_use]
pub fn nanos_to_system_time(nanos: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_nanos(nanos)
}

/// Converts a ledger nanosecond timestamp into whole milliseconds.
#[must_use]
pub const fn nanos_to_millis(nanos: u64) -> u64 {
    nanos / NANOS_PER_MILLI
}

/// Adds a duration to a nanosecond timestamp, saturating at `u64::MAX`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn nanos_after(nanos: u64, delta: Duration) -> u64 {
    let delta = delta.as_nanos().min(u128::from(u64::MAX)) as u64;

    nanos.saturating_add(delta)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_nanos_is_after_2023() {
        let now = now_secs();
        let oct_2023_secs = 1_700_000_000;
        assert!(now > oct_2023_secs);
    }

    #[test]
    fn nanos_convert_to_system_time_and_millis() {
        let nanos = 1_700_000_000_123_456_789;

        let t = nanos_to_system_time(nanos);
        let since = t.duration_since(SystemTime::UNIX_EPOCH).unwrap();

        assert_eq!(since.as_nanos(), u128::from(nanos));
        assert_eq!(nanos_to_millis(nanos), 1_700_000_000_123);
    }

    #[test]
    fn nanos_after_saturates() {
        assert_eq!(nanos_after(10, Duration::from_nanos(5)), 15);
        assert_eq!(nanos_after(u64::MAX - 1, Duration::from_secs(1)), u64::MAX);
    }
}
