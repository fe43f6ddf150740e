use std::time::Duration;

/// How long every invocation is suspended before the event is inspected.
pub const WAIT: Duration = Duration::from_millis(100);

/// Suspends the calling task for [`WAIT`], then resumes unconditionally.
pub async fn just_wait() {
    tokio::time::sleep(WAIT).await;
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
