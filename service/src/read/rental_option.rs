//! [`RentalOption`] read model definition.
//!
//! [`RentalOption`]: crate::domain::RentalOption

use crate::domain::{listing, rental_option};
#[cfg(doc)]
use crate::domain::{Listing, RentalOption};

/// Selector of the currently active [`RentalOption`]s of a [`Listing`].
#[derive(Clone, Copy, Debug)]
pub struct ActiveOf {
    /// ID of the [`Listing`] owning the options.
    pub listing_id: listing::Id,
}

/// Selector of an active base tier [`RentalOption`] anchoring the given
/// [`Unit`] of a [`Listing`].
///
/// [`Unit`]: rental_option::Unit
#[derive(Clone, Copy, Debug)]
pub struct BaseTier {
    /// ID of the [`Listing`] owning the options.
    pub listing_id: listing::Id,

    /// [`Unit`] the base tier must anchor.
    pub unit: rental_option::Unit,

    /// ID of the [`RentalOption`] to leave out of consideration.
    pub excluding: Option<rental_option::Id>,
}

/// Selector of any active sibling [`RentalOption`] of the given [`Unit`] of
/// a [`Listing`].
///
/// [`Unit`]: rental_option::Unit
#[derive(Clone, Copy, Debug)]
pub struct Sibling {
    /// ID of the [`Listing`] owning the options.
    pub listing_id: listing::Id,

    /// [`Unit`] the sibling must be of.
    pub unit: rental_option::Unit,

    /// ID of the [`RentalOption`] to leave out of consideration.
    pub excluding: rental_option::Id,
}
