pub mod backoff;

/// Current wall-clock time as a unix timestamp in seconds.
pub fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
