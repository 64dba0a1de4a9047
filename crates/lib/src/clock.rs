//! Time source for binder timestamps.
//!
//! Every timestamp the engine stores (`lastModified`, `lastSynced`, history
//! entry times, binder metadata) is read through the [`Clock`] trait so tests
//! can drive time deterministically.
//!
//! # Example
//!
//! ```
//! use binderkit::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let millis = clock.now_millis();
//! assert!(millis > 0);
//! ```

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// Milliseconds since the Unix epoch.
pub type Millis = u64;

/// A provider of wall-clock timestamps in milliseconds.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> Millis;

    /// Formats a millisecond timestamp as RFC3339 for display.
    fn format_rfc3339(&self, millis: Millis) -> String {
        format_millis(millis)
    }
}

/// Formats milliseconds since the epoch as an RFC3339 string.
///
/// Out-of-range values render as the epoch.
pub fn format_millis(millis: Millis) -> String {
    chrono::DateTime::from_timestamp_millis(millis as i64)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "1970-01-01T00:00:00+00:00".to_string())
}

/// Production clock backed by [`std::time::SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as Millis)
            .unwrap_or(0)
    }
}

/// Deterministic clock for tests.
///
/// Each `now_millis()` call returns the current value and then moves the
/// clock forward by one millisecond, so consecutive mutations always get
/// strictly increasing timestamps. `hold()` freezes it while the guard lives.
///
/// ```
/// use binderkit::{Clock, FixedClock};
///
/// let clock = FixedClock::new(10);
/// assert_eq!(clock.now_millis(), 10);
/// assert_eq!(clock.now_millis(), 11);
/// {
///     let _hold = clock.hold();
///     assert_eq!(clock.now_millis(), clock.now_millis());
/// }
/// ```
#[cfg(any(test, feature = "testing"))]
pub struct FixedClock {
    state: Mutex<FixedClockState>,
}

#[cfg(any(test, feature = "testing"))]
#[derive(Debug)]
struct FixedClockState {
    millis: Millis,
    held: bool,
}

/// Guard returned by [`FixedClock::hold`]; releases the hold on drop.
#[cfg(any(test, feature = "testing"))]
pub struct ClockHold<'a>(&'a FixedClock);

#[cfg(any(test, feature = "testing"))]
impl Drop for ClockHold<'_> {
    fn drop(&mut self) {
        self.0.state.lock().unwrap().held = false;
    }
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a clock starting at `millis`.
    pub fn new(millis: Millis) -> Self {
        Self {
            state: Mutex::new(FixedClockState {
                millis,
                held: false,
            }),
        }
    }

    /// Freeze the clock until the returned guard is dropped.
    pub fn hold(&self) -> ClockHold<'_> {
        self.state.lock().unwrap().held = true;
        ClockHold(self)
    }

    /// Move the clock forward by `ms`.
    pub fn advance(&self, ms: Millis) {
        self.state.lock().unwrap().millis += ms;
    }

    /// Jump the clock to an absolute value.
    pub fn set(&self, ms: Millis) {
        self.state.lock().unwrap().millis = ms;
    }

    /// Read the clock without advancing it.
    pub fn get(&self) -> Millis {
        self.state.lock().unwrap().millis
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> Millis {
        let mut state = self.state.lock().unwrap();
        let t = state.millis;
        if !state.held {
            state.millis += 1;
        }
        t
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("FixedClock")
            .field("millis", &state.millis)
            .field("held", &state.held)
            .finish()
    }
}
