//! Time source used to stamp records and mint ids.

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Supplies the current instant.
pub trait Clock: Send + Sync + Debug {
    /// Return the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
