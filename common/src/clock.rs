//! [`Clock`]-related definitions.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use crate::{Date, DateTime};

/// Source of the current moment for date-dependent operations.
///
/// Cloning a [`Clock`] yields a handle to the same underlying source.
#[derive(Clone, Debug, Default)]
pub struct Clock(Source);

/// Underlying source of a [`Clock`].
#[derive(Clone, Debug, Default)]
enum Source {
    /// System wall clock.
    #[default]
    System,

    /// Manually driven clock, storing a Unix timestamp.
    Fixed(Arc<AtomicI64>),
}

impl Clock {
    /// Creates a new [`Clock`] following the system time.
    #[must_use]
    pub fn system() -> Self {
        Self(Source::System)
    }

    /// Creates a new [`Clock`] frozen at the provided moment, advanced only
    /// via [`Clock::set()`].
    #[must_use]
    pub fn fixed(at: DateTime) -> Self {
        Self(Source::Fixed(Arc::new(AtomicI64::new(at.unix_timestamp()))))
    }

    /// Returns the current moment of this [`Clock`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn now(&self) -> DateTime {
        match &self.0 {
            Source::System => DateTime::now(),
            Source::Fixed(at) => {
                DateTime::from_unix_timestamp(at.load(Ordering::Relaxed))
                    .expect("infallible")
            }
        }
    }

    /// Returns the current UTC calendar date of this [`Clock`].
    #[must_use]
    pub fn today(&self) -> Date {
        self.now().date()
    }

    /// Moves this [`Clock`] to the provided moment.
    ///
    /// Has no effect on a system [`Clock`].
    pub fn set(&self, to: DateTime) {
        if let Source::Fixed(at) = &self.0 {
            at.store(to.unix_timestamp(), Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::Date;

    use super::Clock;

    fn date(s: &str) -> Date {
        Date::from_iso8601(s).unwrap()
    }

    #[test]
    fn fixed_clock_is_driven_manually() {
        let clock = Clock::fixed(date("2025-01-15").midnight_utc());
        assert_eq!(clock.today(), date("2025-01-15"));

        clock.set(date("2025-02-01").midnight_utc());
        assert_eq!(clock.today(), date("2025-02-01"));
    }

    #[test]
    fn fixed_clock_is_shared_between_clones() {
        let clock = Clock::fixed(date("2025-01-15").midnight_utc());
        let other = clock.clone();

        clock.set(date("2025-03-03").midnight_utc());
        assert_eq!(other.today(), date("2025-03-03"));
    }
}
