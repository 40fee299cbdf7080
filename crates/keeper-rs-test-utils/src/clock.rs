use chrono::{DateTime, Duration, TimeZone, Utc};
use keeper_rs_store::Clock;
use parking_lot::Mutex;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// 2024-01-01T00:00:00Z.
    pub fn epoch() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default())
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock();
        *now += Duration::seconds(seconds);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::epoch()
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
