//! Per-page TTL decisions for paginated history.

use std::time::Duration;

use chrono::{DateTime, Days, Utc};

/// Fixed history page size for the securities-exchange provider.
pub const PAGE_SIZE: usize = 100;

/// Time remaining until the next UTC midnight boundary.
pub fn until_utc_midnight(now: DateTime<Utc>) -> Duration {
    let tomorrow = (now.date_naive() + Days::new(1))
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc();
    (tomorrow - now).to_std().unwrap_or_default()
}

/// TTL for a freshly fetched history page.
///
/// A page of exactly [`PAGE_SIZE`] rows may still be growing, so it expires
/// at the next UTC midnight. A shorter page is the final one and can never
/// change again, so it is cached without expiry.
pub fn page_ttl(page_len: usize) -> Option<Duration> {
    if page_len == PAGE_SIZE {
        Some(until_utc_midnight(Utc::now()))
    } else {
        None
    }
}
