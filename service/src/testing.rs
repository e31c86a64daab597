//! Fixtures shared by the unit tests of this crate.

use std::time;

use common::{Clock, Date, DateTime, Price};

use crate::{
    domain::{
        discount, listing, rental_option, transaction, user, Discount,
        Listing, RentalOption,
    },
    infra::database::Mock,
    task, Config, Service,
};

/// Creates a new [`Service`] running on the provided [`Mock`] database and
/// [`Clock`].
///
/// The background environment is dropped right away: its tasks never run
/// unless awaited, so sweeps won't interfere with the test.
pub(crate) fn service(db: &Mock, clock: Clock) -> Service<Mock> {
    let (service, _) = Service::new(
        Config {
            update_discount_statuses: task::update_discount_statuses::Config {
                interval: time::Duration::from_secs(3600),
            },
        },
        db.clone(),
        clock,
    );
    service
}

/// Creates a new manually driven [`Clock`], frozen at the UTC midnight of
/// the provided ISO 8601 day.
pub(crate) fn clock_at(day: &str) -> Clock {
    Clock::fixed(date(day).midnight_utc())
}

/// Parses the provided ISO 8601 day into a [`Date`].
pub(crate) fn date(s: &str) -> Date {
    Date::from_iso8601(s).unwrap()
}

/// Parses the provided decimal string into a [`Price`].
pub(crate) fn price(s: &str) -> Price {
    s.parse().unwrap()
}

/// Creates a published and available [`Listing`] of the provided [`Kind`],
/// with a random ID and owner.
///
/// [`Kind`]: listing::Kind
pub(crate) fn listing(kind: listing::Kind) -> Listing {
    Listing {
        id: listing::Id::new(),
        kind,
        status: listing::Status::Published,
        price: (kind == listing::Kind::Sell).then(|| price("100000")),
        is_available: true,
        owner_id: user::Id::new(),
        created_at: DateTime::UNIX_EPOCH.coerce(),
    }
}

/// Creates a [`RentalOption`] of the provided [`Listing`], with a random ID.
///
/// [`Listing`]: crate::domain::Listing
pub(crate) fn rental_option(
    listing_id: listing::Id,
    duration: i32,
    unit: rental_option::Unit,
    is_active: bool,
) -> RentalOption {
    RentalOption {
        id: rental_option::Id::new(),
        listing_id,
        duration: rental_option::Duration::new(duration).unwrap(),
        unit,
        price: price("100"),
        is_active,
        created_at: DateTime::UNIX_EPOCH.coerce(),
    }
}

/// Creates a [`Discount`] of the provided [`Listing`] over the provided
/// window, with a random ID.
///
/// [`Listing`]: crate::domain::Listing
pub(crate) fn discount(
    listing_id: listing::Id,
    window: (&str, &str),
    status: discount::Status,
) -> Discount {
    Discount {
        id: discount::Id::new(),
        listing_id,
        rental_option_id: None,
        name: "Summer promo".parse().unwrap(),
        percentage: "10".parse().unwrap(),
        period: discount::Period::new(
            date(window.0).coerce(),
            date(window.1).coerce(),
        )
        .unwrap(),
        status,
        created_at: DateTime::UNIX_EPOCH.coerce(),
    }
}

/// Creates an unpaid rent booking of the provided [`Listing`] over the
/// provided window, with random IDs.
///
/// [`Listing`]: crate::domain::Listing
pub(crate) fn rent_booking(
    listing_id: listing::Id,
    window: (&str, &str),
) -> transaction::Rent {
    transaction::Rent {
        id: transaction::Id::new(),
        listing_id,
        buyer_id: user::Id::new(),
        seller_id: user::Id::new(),
        occupancy: transaction::Occupancy::new(
            date(window.0).coerce(),
            date(window.1).coerce(),
        )
        .unwrap(),
        total_price: price("500"),
        amount_paid: Price::ZERO,
        payment_status: transaction::PaymentStatus::Unpaid,
        payment_method: transaction::PaymentMethod::Stripe,
        payment_date: None,
        discount_id: None,
        rental_option_id: None,
        created_at: DateTime::UNIX_EPOCH.coerce(),
    }
}
