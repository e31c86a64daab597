//! [`Discount`] read model definition.
//!
//! [`Discount`]: crate::domain::Discount

use common::Date;
use derive_more::{From, Into};

use crate::domain::listing;
#[cfg(doc)]
use crate::domain::{discount::Status, Discount, Listing, Transaction};

/// Activation pass of the [`Discount`] statuses sweep.
///
/// Turns [`Status::Inactive`] discounts whose window contains `today` into
/// [`Status::Active`] ones.
#[derive(Clone, Copy, Debug)]
pub struct Activation {
    /// Day the pass is evaluated against.
    pub today: Date,
}

/// Expiration pass of the [`Discount`] statuses sweep.
///
/// Turns discounts whose window fully precedes `today` into
/// [`Status::Expired`] ones, except the terminal ([`Status::Expired`],
/// [`Status::Deactivated`]) ones.
#[derive(Clone, Copy, Debug)]
pub struct Expiration {
    /// Day the pass is evaluated against.
    pub today: Date,
}

/// Number of [`Transaction`]s referencing a [`Discount`].
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct Usage(i64);

impl Usage {
    /// Indicates whether any [`Transaction`] references the [`Discount`].
    #[must_use]
    pub fn any(&self) -> bool {
        self.0 > 0
    }
}

/// Selector of the currently [`Status::Active`] [`Discount`]s of a
/// [`Listing`].
#[derive(Clone, Copy, Debug)]
pub struct ActiveOf {
    /// ID of the [`Listing`] owning the discounts.
    pub listing_id: listing::Id,
}
