use std::time::Duration;

/// Wall-clock length of one logical second.
///
/// Everything the worker measures (tick, pause poll, phase lengths, displayed
/// remaining time) is expressed in logical seconds, so a shorter second runs
/// the whole state machine faster without changing its behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timescale {
    second: Duration,
}

impl Default for Timescale {
    fn default() -> Self {
        Self::REAL
    }
}

impl Timescale {
    pub const REAL: Timescale = Timescale {
        second: Duration::from_secs(1),
    };

    /// A zero-length second is clamped to one microsecond.
    pub fn new(second: Duration) -> Self {
        Self {
            second: second.max(Duration::from_micros(1)),
        }
    }

    pub fn second(&self) -> Duration {
        self.second
    }

    pub fn seconds(&self, n: u64) -> Duration {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        self.second.saturating_mul(n)
    }

    pub fn minutes(&self, n: u64) -> Duration {
        self.seconds(n.saturating_mul(60))
    }

    /// Interval between remaining-time updates.
    pub fn tick(&self) -> Duration {
        self.second
    }

    /// Poll interval while paused.
    pub fn pause_poll(&self) -> Duration {
        self.second / 2
    }

    /// Whole logical seconds in `d`, floored.
    pub fn whole_seconds(&self, d: Duration) -> u64 {
        let secs = d.as_nanos() / self.second.as_nanos();
        u64::try_from(secs).unwrap_or(u64::MAX)
    }
}
