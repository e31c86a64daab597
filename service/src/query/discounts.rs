//! [`Query`] collection related to the multiple [`Discount`]s.

use common::operations::By;

use crate::{domain::Discount, read};
#[cfg(doc)]
use crate::{domain::Listing, Query};

use super::DatabaseQuery;

/// Queries the currently active [`Discount`]s of a [`Listing`].
pub type Active = DatabaseQuery<By<Vec<Discount>, read::discount::ActiveOf>>;
