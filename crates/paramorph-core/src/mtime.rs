//! Modification times
//!
//! Every object that caches derived data, or whose changes must be seen by
//! something that caches derived data, carries a [`TimeStamp`]. Stamps are
//! drawn from one process-wide counter, so stamps taken from different
//! objects can be compared: the larger stamp was taken later.

use std::sync::atomic::{AtomicU64, Ordering};

static GLOBAL_TIME: AtomicU64 = AtomicU64::new(0);

/// A point in the global modification order
///
/// `TimeStamp::default()` is older than every stamp returned by
/// [`TimeStamp::now`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeStamp(u64);

impl TimeStamp {
    /// Take a new stamp, strictly later than every stamp taken before
    pub fn now() -> Self {
        Self(GLOBAL_TIME.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Advance this stamp to the current time
    #[inline]
    pub fn modified(&mut self) {
        *self = Self::now();
    }

    /// Raw counter value
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// The most recent of several stamps
    pub fn latest(stamps: impl IntoIterator<Item = TimeStamp>) -> TimeStamp {
        stamps.into_iter().max().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_strictly_increasing() {
        let a = TimeStamp::now();
        let b = TimeStamp::now();
        assert!(b > a);
        assert!(a > TimeStamp::default());
    }

    #[test]
    fn test_modified_advances() {
        let mut stamp = TimeStamp::now();
        let before = stamp;
        stamp.modified();
        assert!(stamp > before);
    }

    #[test]
    fn test_latest() {
        let a = TimeStamp::now();
        let b = TimeStamp::now();
        assert_eq!(TimeStamp::latest([b, a]), b);
        assert_eq!(TimeStamp::latest([]), TimeStamp::default());
    }
}
