use time::OffsetDateTime;

/// Source of "now" for the date addon.
pub trait Clock: Send + Sync {
    /// Current instant, in the offset it should be displayed in.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock. Local offset with the `localtime` feature, UTC otherwise.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        #[cfg(feature = "localtime")]
        {
            // the local offset is unavailable in some multi-threaded processes
            OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
        }
        #[cfg(not(feature = "localtime"))]
        {
            OffsetDateTime::now_utc()
        }
    }
}

/// A clock stopped at one instant.
#[derive(Copy, Clone, Debug)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
