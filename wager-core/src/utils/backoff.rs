use std::time::Duration;

/// Largest exponent used for reconnect delays (2^6 = 64 seconds).
const MAX_RECONNECT_EXPONENT: u32 = 6;

/// Delay before the next reconnect attempt.
///
/// `attempt` counts consecutive failures since the last healthy session,
/// starting at 0.
pub fn reconnect_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt.min(MAX_RECONNECT_EXPONENT)))
}
