//! [`Listing`] definitions.

use common::{define_kind, unit, DateTimeOf, Price};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::RentalOption;

/// Property listed on the marketplace, for sale or for rent.
///
/// [`Listing`]s themselves are managed by an external collaborator. This
/// engine reads them to validate rental options, discounts and transactions
/// created upon them.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// [`Kind`] of this [`Listing`].
    pub kind: Kind,

    /// [`Status`] of this [`Listing`].
    pub status: Status,

    /// Authoritative price of a [`Kind::Sell`] [`Listing`].
    ///
    /// [`None`] for [`Kind::Rent`] [`Listing`]s, where the per-tier
    /// [`RentalOption`] prices are authoritative instead.
    pub price: Option<Price>,

    /// Indicator whether this [`Listing`] is available for deals.
    pub is_available: bool,

    /// ID of the [`User`] owning this [`Listing`].
    pub owner_id: user::Id,

    /// [`DateTime`] when this [`Listing`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Kind of a [`Listing`]."]
    enum Kind {
        #[doc = "The [`Listing`] is sold as a whole."]
        Sell = 1,

        #[doc = "The [`Listing`] is rented out per [`RentalOption`] tiers."]
        Rent = 2,
    }
}

define_kind! {
    #[doc = "Status of a [`Listing`]."]
    enum Status {
        #[doc = "The [`Listing`] is being drafted by its owner."]
        Draft = 1,

        #[doc = "The [`Listing`] is published on the marketplace."]
        Published = 2,
    }
}

/// [`DateTime`] when a [`Listing`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;
