//! [`Query`] collection related to a single [`RentalOption`].

use common::operations::By;

use crate::domain::{rental_option, RentalOption};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`RentalOption`] by its [`rental_option::Id`].
pub type ById = DatabaseQuery<By<Option<RentalOption>, rental_option::Id>>;
