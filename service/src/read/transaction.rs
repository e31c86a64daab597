//! [`Transaction`] read model definition.
//!
//! [`Transaction`]: crate::domain::Transaction

use common::Date;

use crate::domain::transaction::{self, Occupancy};
#[cfg(doc)]
use crate::domain::{Listing, Transaction};

/// Calendar days booked on a [`Listing`], collected from the [`Occupancy`]
/// windows of its rent [`Transaction`]s.
#[derive(Clone, Debug, Default)]
pub struct BookedDates(Vec<Date>);

impl BookedDates {
    /// Collects a new [`BookedDates`] from the provided [`Occupancy`]
    /// windows, expanding each inclusively, sorted and de-duplicated.
    #[must_use]
    pub fn collect<I>(windows: I) -> Self
    where
        I: IntoIterator<Item = Occupancy>,
    {
        let mut days =
            windows.into_iter().flat_map(|w| w.days()).collect::<Vec<_>>();
        days.sort_unstable();
        days.dedup();
        Self(days)
    }

    /// Returns the booked days, in chronological order.
    #[must_use]
    pub fn as_slice(&self) -> &[Date] {
        &self.0
    }
}

impl IntoIterator for BookedDates {
    type Item = Date;
    type IntoIter = std::vec::IntoIter<Date>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Transition of an unpaid [`Transaction`] into a paid one.
///
/// Applies only while the [`Transaction`] is still unpaid, so concurrent
/// attempts cannot both succeed.
#[derive(Clone, Copy, Debug)]
pub struct MarkPaid {
    /// ID of the [`Transaction`] being paid.
    pub id: transaction::Id,

    /// Moment the payment is recorded at.
    pub at: transaction::PaymentDateTime,
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::domain::transaction::Occupancy;

    use super::BookedDates;

    fn occupancy(check_in: &str, check_out: &str) -> Occupancy {
        Occupancy::new(
            Date::from_iso8601(check_in).unwrap().coerce(),
            Date::from_iso8601(check_out).unwrap().coerce(),
        )
        .unwrap()
    }

    #[test]
    fn merges_windows_sorted_and_unique() {
        let booked = BookedDates::collect(vec![
            occupancy("2025-06-05", "2025-06-07"),
            occupancy("2025-06-01", "2025-06-03"),
            occupancy("2025-06-02", "2025-06-05"),
        ]);

        let days = booked
            .into_iter()
            .map(|d| d.to_iso8601())
            .collect::<Vec<_>>();
        assert_eq!(
            days,
            [
                "2025-06-01",
                "2025-06-02",
                "2025-06-03",
                "2025-06-04",
                "2025-06-05",
                "2025-06-06",
                "2025-06-07",
            ],
        );
    }

    #[test]
    fn empty_without_windows() {
        assert!(BookedDates::collect([]).as_slice().is_empty());
    }
}
