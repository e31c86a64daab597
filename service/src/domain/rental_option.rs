//! [`RentalOption`] definitions.

use common::{define_kind, unit, DateTimeOf, Price};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::listing;
#[cfg(doc)]
use crate::domain::Listing;

/// Purchasable time-tier of a rent-kind [`Listing`].
///
/// Every [`Unit`] present among a [`Listing`]'s active options must be
/// anchored by an active option of that [`Unit`] with [`Duration::BASE`]
/// (the base tier), since longer tiers are priced as derivatives of it.
#[derive(Clone, Debug)]
pub struct RentalOption {
    /// ID of this [`RentalOption`].
    pub id: Id,

    /// ID of the [`Listing`] exclusively owning this [`RentalOption`].
    pub listing_id: listing::Id,

    /// Number of [`Unit`]s this [`RentalOption`] covers.
    pub duration: Duration,

    /// [`Unit`] this [`RentalOption`] is measured in.
    pub unit: Unit,

    /// Price of a single booking of this [`RentalOption`].
    pub price: Price,

    /// Indicator whether this [`RentalOption`] is currently bookable.
    ///
    /// Cancelled options keep their row, but don't participate in pricing or
    /// invariant checks anymore.
    pub is_active: bool,

    /// [`DateTime`] when this [`RentalOption`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

impl RentalOption {
    /// Indicates whether this [`RentalOption`] is the base tier of its
    /// [`Unit`].
    #[must_use]
    pub fn is_base_tier(&self) -> bool {
        self.duration.is_base()
    }
}

/// ID of a [`RentalOption`].
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

/// Number of [`Unit`]s a [`RentalOption`] covers.
///
/// Always positive.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Duration(i32);

impl Duration {
    /// Base tier [`Duration`] of `1`, anchoring per-[`Unit`] pricing.
    pub const BASE: Self = Self(1);

    /// Creates a new [`Duration`] by checking the provided value is positive.
    #[must_use]
    pub fn new(value: i32) -> Option<Self> {
        (value >= 1).then_some(Self(value))
    }

    /// Indicates whether this is the base (`1`) [`Duration`].
    #[must_use]
    pub fn is_base(self) -> bool {
        self.0 == 1
    }
}

define_kind! {
    #[doc = "Unit of time a [`RentalOption`] is measured in."]
    enum Unit {
        #[doc = "A single day."]
        Day = 1,

        #[doc = "A single week."]
        Week = 2,

        #[doc = "A single month."]
        Month = 3,

        #[doc = "A single year."]
        Year = 4,
    }
}

/// [`DateTime`] when a [`RentalOption`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(RentalOption, unit::Creation)>;
