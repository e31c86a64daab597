//! [`Query`] collection related to a single [`Discount`].

use common::operations::By;

use crate::domain::{discount, Discount};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Discount`] by its [`discount::Id`].
pub type ById = DatabaseQuery<By<Option<Discount>, discount::Id>>;
