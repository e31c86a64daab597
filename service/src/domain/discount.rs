//! [`Discount`] definitions.

use common::{define_kind, unit, Date, DateOf, DateTimeOf, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{listing, rental_option};
#[cfg(doc)]
use crate::domain::{Listing, RentalOption, Transaction};

/// Time-windowed percentage [`Discount`] of a [`Listing`].
#[derive(Clone, Debug)]
pub struct Discount {
    /// ID of this [`Discount`].
    pub id: Id,

    /// ID of the [`Listing`] owning this [`Discount`].
    pub listing_id: listing::Id,

    /// ID of the single [`RentalOption`] this [`Discount`] is narrowed to.
    ///
    /// [`None`] means the [`Discount`] applies to all rental options of the
    /// [`Listing`].
    pub rental_option_id: Option<rental_option::Id>,

    /// [`Name`] of this [`Discount`].
    pub name: Name,

    /// Percentage this [`Discount`] takes off.
    pub percentage: Percent,

    /// Calendar window this [`Discount`] is meant to be active in.
    pub period: Period,

    /// [`Status`] of this [`Discount`].
    pub status: Status,

    /// [`DateTime`] when this [`Discount`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

/// ID of a [`Discount`].
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

/// Name of a [`Discount`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Inclusive calendar window a [`Discount`] is meant to be active in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Period {
    /// First day of the window.
    start: StartDate,

    /// Last day of the window (inclusive).
    end: EndDate,
}

impl Period {
    /// Creates a new [`Period`] by checking its `end` day doesn't precede
    /// its `start` day.
    #[must_use]
    pub fn new(start: StartDate, end: EndDate) -> Option<Self> {
        (start.coerce::<()>() <= end.coerce()).then_some(Self { start, end })
    }

    /// Returns the first day of this [`Period`].
    #[must_use]
    pub fn start(&self) -> StartDate {
        self.start
    }

    /// Returns the last (inclusive) day of this [`Period`].
    #[must_use]
    pub fn end(&self) -> EndDate {
        self.end
    }

    /// Indicates whether the provided day falls inside this [`Period`].
    #[must_use]
    pub fn contains(&self, day: Date) -> bool {
        self.start.coerce() <= day && day <= self.end.coerce()
    }

    /// Indicates whether this [`Period`] fully precedes the provided day.
    #[must_use]
    pub fn is_past(&self, day: Date) -> bool {
        self.end.coerce() < day
    }
}

define_kind! {
    #[doc = "Status of a [`Discount`]."]
    enum Status {
        #[doc = "The [`Discount`] window hasn't been reached by the sweep \
                 yet."]
        Inactive = 1,

        #[doc = "The [`Discount`] is applied to bookings."]
        Active = 2,

        #[doc = "The [`Discount`] window has fully passed. Terminal."]
        Expired = 3,

        #[doc = "The [`Discount`] was deleted while being referenced by a \
                 [`Transaction`]. Terminal, never swept."]
        Deactivated = 4,
    }
}

/// Marker type indicating the start of a [`Discount`] window.
#[derive(Clone, Copy, Debug)]
pub struct WindowStart;

/// Marker type indicating the end of a [`Discount`] window.
#[derive(Clone, Copy, Debug)]
pub struct WindowEnd;

/// First [`Date`] of a [`Discount`] window.
pub type StartDate = DateOf<(Discount, WindowStart)>;

/// Last (inclusive) [`Date`] of a [`Discount`] window.
pub type EndDate = DateOf<(Discount, WindowEnd)>;

/// [`DateTime`] when a [`Discount`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Discount, unit::Creation)>;
