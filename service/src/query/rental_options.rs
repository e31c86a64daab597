//! [`Query`] collection related to the multiple [`RentalOption`]s.

use common::operations::By;

use crate::{domain::RentalOption, read};
#[cfg(doc)]
use crate::{domain::Listing, Query};

use super::DatabaseQuery;

/// Queries the active [`RentalOption`]s of a [`Listing`].
///
/// A sell-kind [`Listing`] owns no options, so yields an empty list.
pub type Active =
    DatabaseQuery<By<Vec<RentalOption>, read::rental_option::ActiveOf>>;
