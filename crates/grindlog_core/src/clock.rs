//! Time source for "now" and "today".
//!
//! # Responsibility
//! - Provide epoch-millisecond instants for last-modified stamps.
//! - Map instants and calendar dates to the host's local timezone.
//!
//! # Invariants
//! - `Clock::today()` is always the local date of `Clock::now_ms()`.
//! - Clones of a `FixedClock` share one instant.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current instant.
pub trait Clock {
    /// Current instant in Unix epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Current calendar date in the host's local timezone.
    fn today(&self) -> NaiveDate {
        local_date_of_ms(self.now_ms())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now_ms: Arc<AtomicI64>,
}

impl FixedClock {
    pub fn at_ms(now_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(now_ms)),
        }
    }

    /// Pins the clock to `hour:minute` local time on `date`.
    ///
    /// Out-of-range wall times fall back to local midnight.
    pub fn at_local(date: NaiveDate, hour: u32, minute: u32) -> Self {
        Self::at_ms(local_wall_time_ms(date, hour, minute))
    }

    pub fn set_ms(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn set_local(&self, date: NaiveDate, hour: u32, minute: u32) {
        self.set_ms(local_wall_time_ms(date, hour, minute));
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Moves to the same wall time `days` calendar days later.
    pub fn advance_days(&self, days: i64) {
        let current = DateTime::<Utc>::from_timestamp_millis(self.now_ms())
            .unwrap_or_default()
            .with_timezone(&Local)
            .naive_local();
        self.set_ms(local_naive_to_ms(current + Duration::days(days)));
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Local calendar date of an epoch-millisecond instant.
///
/// Instants outside chrono's range clamp to the Unix epoch.
pub fn local_date_of_ms(ms: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or_default()
        .with_timezone(&Local)
        .date_naive()
}

/// First millisecond of `date` in local time.
pub fn local_day_start_ms(date: NaiveDate) -> i64 {
    local_naive_to_ms(date.and_time(NaiveTime::MIN))
}

/// Last millisecond of `date` in local time (inclusive bound).
pub fn local_day_end_ms(date: NaiveDate) -> i64 {
    let next_midnight = date.and_time(NaiveTime::MIN) + Duration::days(1);
    local_naive_to_ms(next_midnight) - 1
}

/// Converts a local wall time to epoch milliseconds.
///
/// Ambiguous wall times (DST fall-back) resolve to the earlier instant.
/// Wall times skipped by a DST jump are shifted by the current offset.
pub fn local_naive_to_ms(naive: NaiveDateTime) -> i64 {
    match naive.and_local_timezone(Local).earliest() {
        Some(local) => local.timestamp_millis(),
        None => {
            let offset_secs = Local.offset_from_utc_datetime(&naive).local_minus_utc();
            naive.and_utc().timestamp_millis() - i64::from(offset_secs) * 1000
        }
    }
}

fn local_wall_time_ms(date: NaiveDate, hour: u32, minute: u32) -> i64 {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    local_naive_to_ms(date.and_time(time))
}
