//! [`Query`] collection related to the multiple [`Transaction`]s.

use common::operations::By;

use crate::{
    domain::{listing, user, Transaction},
    read,
};
#[cfg(doc)]
use crate::{domain::Listing, Query};

use super::DatabaseQuery;

/// Queries the [`Transaction`]s involving a user as a buyer or a seller,
/// newest first.
pub type OfUser = DatabaseQuery<By<Vec<Transaction>, user::Id>>;

/// Queries the calendar days booked on a [`Listing`], in chronological
/// order.
pub type BookedDates =
    DatabaseQuery<By<read::transaction::BookedDates, listing::Id>>;
