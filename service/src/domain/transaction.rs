//! [`Transaction`] definitions.

use std::iter;

use common::{define_kind, unit, Date, DateOf, DateTimeOf, Price};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{discount, listing, rental_option, user};
#[cfg(doc)]
use crate::domain::{Discount, Listing, RentalOption};

/// Deal committed on a [`Listing`]: a purchase or a rental booking.
#[derive(Clone, Debug, From)]
pub enum Transaction {
    #[doc(hidden)]
    Sale(Sale),
    #[doc(hidden)]
    Rent(Rent),
}

impl Transaction {
    /// Returns ID of this [`Transaction`].
    #[must_use]
    pub fn id(&self) -> Id {
        match self {
            Self::Sale(t) => t.id,
            Self::Rent(t) => t.id,
        }
    }

    /// Returns [`Kind`] of this [`Transaction`].
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Sale(_) => Kind::Sell,
            Self::Rent(_) => Kind::Rent,
        }
    }

    /// Returns ID of the [`Listing`] this [`Transaction`] was committed on.
    #[must_use]
    pub fn listing_id(&self) -> listing::Id {
        match self {
            Self::Sale(t) => t.listing_id,
            Self::Rent(t) => t.listing_id,
        }
    }

    /// Returns ID of the [`User`] paying in this [`Transaction`].
    #[must_use]
    pub fn buyer_id(&self) -> user::Id {
        match self {
            Self::Sale(t) => t.buyer_id,
            Self::Rent(t) => t.buyer_id,
        }
    }

    /// Returns ID of the [`User`] being paid in this [`Transaction`].
    #[must_use]
    pub fn seller_id(&self) -> user::Id {
        match self {
            Self::Sale(t) => t.seller_id,
            Self::Rent(t) => t.seller_id,
        }
    }

    /// Returns the full price of this [`Transaction`].
    #[must_use]
    pub fn total_price(&self) -> Price {
        match self {
            Self::Sale(t) => t.total_price,
            Self::Rent(t) => t.total_price,
        }
    }

    /// Returns the amount already paid in this [`Transaction`].
    #[must_use]
    pub fn amount_paid(&self) -> Price {
        match self {
            Self::Sale(t) => t.amount_paid,
            Self::Rent(t) => t.amount_paid,
        }
    }

    /// Returns [`PaymentStatus`] of this [`Transaction`].
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        match self {
            Self::Sale(t) => t.payment_status,
            Self::Rent(t) => t.payment_status,
        }
    }

    /// Returns [`PaymentMethod`] of this [`Transaction`].
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        match self {
            Self::Sale(t) => t.payment_method,
            Self::Rent(t) => t.payment_method,
        }
    }

    /// Returns [`DateTime`] when this [`Transaction`] was paid, if it was.
    ///
    /// [`DateTime`]: common::DateTime
    #[must_use]
    pub fn payment_date(&self) -> Option<PaymentDateTime> {
        match self {
            Self::Sale(t) => t.payment_date,
            Self::Rent(t) => t.payment_date,
        }
    }

    /// Returns ID of the [`Discount`] applied to this [`Transaction`].
    #[must_use]
    pub fn discount_id(&self) -> Option<discount::Id> {
        match self {
            Self::Sale(t) => t.discount_id,
            Self::Rent(t) => t.discount_id,
        }
    }

    /// Returns ID of the [`RentalOption`] this [`Transaction`] was priced
    /// by.
    #[must_use]
    pub fn rental_option_id(&self) -> Option<rental_option::Id> {
        match self {
            Self::Sale(t) => t.rental_option_id,
            Self::Rent(t) => t.rental_option_id,
        }
    }

    /// Returns the check-in day of this [`Transaction`].
    ///
    /// For a [`Sale`] this is the nominal handover day.
    #[must_use]
    pub fn check_in(&self) -> CheckInDate {
        match self {
            Self::Sale(t) => t.check_in,
            Self::Rent(t) => t.occupancy.check_in(),
        }
    }

    /// Returns the [`Occupancy`] window claimed by this [`Transaction`].
    ///
    /// [`None`] is returned for a [`Sale`], which claims no window.
    #[must_use]
    pub fn occupancy(&self) -> Option<Occupancy> {
        match self {
            Self::Sale(_) => None,
            Self::Rent(t) => Some(t.occupancy),
        }
    }

    /// Returns [`DateTime`] when this [`Transaction`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[must_use]
    pub fn created_at(&self) -> CreationDateTime {
        match self {
            Self::Sale(t) => t.created_at,
            Self::Rent(t) => t.created_at,
        }
    }

    /// Records the payment of this [`Transaction`] at the provided moment.
    pub fn mark_paid(&mut self, at: PaymentDateTime) {
        let (status, date) = match self {
            Self::Sale(t) => (&mut t.payment_status, &mut t.payment_date),
            Self::Rent(t) => (&mut t.payment_status, &mut t.payment_date),
        };
        *status = PaymentStatus::Paid;
        *date = Some(at);
    }
}

/// Purchase of a sell-kind [`Listing`].
#[derive(Clone, Debug)]
pub struct Sale {
    /// ID of this [`Sale`] transaction.
    pub id: Id,

    /// ID of the purchased [`Listing`].
    pub listing_id: listing::Id,

    /// ID of the purchasing [`User`].
    pub buyer_id: user::Id,

    /// ID of the [`User`] selling the [`Listing`].
    pub seller_id: user::Id,

    /// Nominal handover day of the purchase.
    pub check_in: CheckInDate,

    /// Full price of the purchase.
    pub total_price: Price,

    /// Amount already paid.
    pub amount_paid: Price,

    /// [`PaymentStatus`] of this [`Sale`] transaction.
    pub payment_status: PaymentStatus,

    /// [`PaymentMethod`] of this [`Sale`] transaction.
    pub payment_method: PaymentMethod,

    /// [`DateTime`] when this [`Sale`] transaction was paid, if it was.
    ///
    /// [`DateTime`]: common::DateTime
    pub payment_date: Option<PaymentDateTime>,

    /// ID of the [`Discount`] applied, if any.
    pub discount_id: Option<discount::Id>,

    /// ID of the [`RentalOption`] this purchase was priced by, if any.
    pub rental_option_id: Option<rental_option::Id>,

    /// [`DateTime`] when this [`Sale`] transaction was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

/// Rental booking of a rent-kind [`Listing`].
#[derive(Clone, Debug)]
pub struct Rent {
    /// ID of this [`Rent`] transaction.
    pub id: Id,

    /// ID of the booked [`Listing`].
    pub listing_id: listing::Id,

    /// ID of the booking [`User`].
    pub buyer_id: user::Id,

    /// ID of the [`User`] renting the [`Listing`] out.
    pub seller_id: user::Id,

    /// [`Occupancy`] window claimed by this booking.
    pub occupancy: Occupancy,

    /// Full price of the booking.
    pub total_price: Price,

    /// Amount already paid.
    pub amount_paid: Price,

    /// [`PaymentStatus`] of this [`Rent`] transaction.
    pub payment_status: PaymentStatus,

    /// [`PaymentMethod`] of this [`Rent`] transaction.
    pub payment_method: PaymentMethod,

    /// [`DateTime`] when this [`Rent`] transaction was paid, if it was.
    ///
    /// [`DateTime`]: common::DateTime
    pub payment_date: Option<PaymentDateTime>,

    /// ID of the [`Discount`] applied, if any.
    pub discount_id: Option<discount::Id>,

    /// ID of the [`RentalOption`] this booking was priced by, if any.
    pub rental_option_id: Option<rental_option::Id>,

    /// [`DateTime`] when this [`Rent`] transaction was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

/// ID of a [`Transaction`].
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

/// Inclusive calendar window claimed by a [`Rent`] transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Occupancy {
    /// Day the occupancy starts.
    check_in: CheckInDate,

    /// Day the occupancy ends.
    check_out: CheckOutDate,
}

impl Occupancy {
    /// Creates a new [`Occupancy`] by checking its check-out day strictly
    /// follows its check-in day.
    #[must_use]
    pub fn new(check_in: CheckInDate, check_out: CheckOutDate) -> Option<Self> {
        (check_in.coerce::<()>() < check_out.coerce())
            .then_some(Self { check_in, check_out })
    }

    /// Returns the day this [`Occupancy`] starts.
    #[must_use]
    pub fn check_in(&self) -> CheckInDate {
        self.check_in
    }

    /// Returns the day this [`Occupancy`] ends.
    #[must_use]
    pub fn check_out(&self) -> CheckOutDate {
        self.check_out
    }

    /// Indicates whether this [`Occupancy`] overlaps the `other` one.
    ///
    /// A check-out day coinciding with another booking's check-in day is not
    /// an overlap (same-day turnover allowance).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in.coerce::<()>() < other.check_out.coerce()
            && self.check_out.coerce::<()>() > other.check_in.coerce()
    }

    /// Returns the first of the provided windows this [`Occupancy`]
    /// overlaps, if any.
    pub fn first_conflict<I>(&self, existing: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        existing.into_iter().find(|o| self.overlaps(o))
    }

    /// Returns all the calendar days covered by this [`Occupancy`],
    /// check-in and check-out days included.
    pub fn days(&self) -> impl Iterator<Item = Date> {
        let last: Date = self.check_out.coerce();
        let mut day = Some(self.check_in.coerce());
        iter::from_fn(move || {
            let current = day.take().filter(|d| *d <= last)?;
            day = current.next();
            Some(current)
        })
    }
}

define_kind! {
    #[doc = "Kind of a [`Transaction`]."]
    enum Kind {
        #[doc = "Purchase of a [`Listing`] as a whole."]
        Sell = 1,

        #[doc = "Rental booking of a [`Listing`]."]
        Rent = 2,
    }
}

define_kind! {
    #[doc = "Payment status of a [`Transaction`]."]
    enum PaymentStatus {
        #[doc = "The [`Transaction`] hasn't been paid yet."]
        Unpaid = 1,

        #[doc = "The [`Transaction`] has been paid. Never reverts."]
        Paid = 2,
    }
}

define_kind! {
    #[doc = "Payment method of a [`Transaction`]."]
    enum PaymentMethod {
        #[doc = "Paid in cash on handover."]
        Cash = 1,

        #[doc = "Paid via Stripe."]
        Stripe = 2,
    }
}

/// Marker type indicating a check-in.
#[derive(Clone, Copy, Debug)]
pub struct CheckIn;

/// Marker type indicating a check-out.
#[derive(Clone, Copy, Debug)]
pub struct CheckOut;

/// Marker type indicating a payment.
#[derive(Clone, Copy, Debug)]
pub struct Payment;

/// [`Date`] a [`Transaction`]'s occupancy (or handover) starts on.
pub type CheckInDate = DateOf<(Transaction, CheckIn)>;

/// [`Date`] a [`Transaction`]'s occupancy ends on.
pub type CheckOutDate = DateOf<(Transaction, CheckOut)>;

/// [`DateTime`] when a [`Transaction`] was paid.
///
/// [`DateTime`]: common::DateTime
pub type PaymentDateTime = DateTimeOf<(Transaction, Payment)>;

/// [`DateTime`] when a [`Transaction`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Transaction, unit::Creation)>;
