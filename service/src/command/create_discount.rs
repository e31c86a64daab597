//! [`Command`] for creating a new [`Discount`].

use common::{
    operations::{By, Insert, Select},
    Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        discount::{self, Period},
        listing, rental_option, Discount, Listing, RentalOption,
    },
    event,
    infra::{database, Database},
    Event, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Discount`] of a [`Listing`].
///
/// The created [`Discount`] always starts out `inactive`, even when its
/// window opens today. The periodic sweep activates it.
#[derive(Clone, Debug)]
pub struct CreateDiscount {
    /// ID of the [`Listing`] to discount.
    pub listing_id: listing::Id,

    /// ID of the single [`RentalOption`] to narrow the [`Discount`] to.
    pub rental_option_id: Option<rental_option::Id>,

    /// [`Name`] of the new [`Discount`].
    ///
    /// [`Name`]: discount::Name
    pub name: discount::Name,

    /// Percentage the new [`Discount`] takes off.
    pub percentage: Percent,

    /// First day of the [`Discount`] window.
    pub start: discount::StartDate,

    /// Last (inclusive) day of the [`Discount`] window.
    pub end: discount::EndDate,
}

impl<Db> Command<CreateDiscount> for Service<Db>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<RentalOption>, rental_option::Id>>,
            Ok = Option<RentalOption>,
            Err = Traced<database::Error>,
        > + Database<Insert<Discount>, Err = Traced<database::Error>>,
{
    type Ok = Discount;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateDiscount,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateDiscount {
            listing_id,
            rental_option_id,
            name,
            percentage,
            start,
            end,
        } = cmd;

        if percentage.is_zero() {
            return Err(tracerr::new!(E::ZeroPercentage));
        }
        let period = Period::new(start, end)
            .ok_or(E::InvalidPeriod { start, end })
            .map_err(tracerr::wrap!())?;
        if period.start().coerce() < self.clock().today() {
            return Err(tracerr::new!(E::StartInPast(start)));
        }

        let listing = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        if let Some(option_id) = rental_option_id {
            let option = self
                .database()
                .execute(Select(By::<Option<RentalOption>, _>::new(option_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::OptionNotExists(option_id))
                .map_err(tracerr::wrap!())?;
            if option.listing_id != listing.id {
                return Err(tracerr::new!(E::OptionNotOfListing {
                    option_id,
                    listing_id: listing.id,
                }));
            }
        }

        let discount = Discount {
            id: discount::Id::new(),
            listing_id: listing.id,
            rental_option_id,
            name,
            percentage,
            period,
            status: discount::Status::Inactive,
            created_at: self.clock().now().coerce(),
        };
        self.database()
            .execute(Insert(discount.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.publish(Event::DiscountCreated(event::DiscountCreated {
            discount_id: discount.id,
            listing_id: discount.listing_id,
            name: discount.name.clone(),
            percentage: discount.percentage,
        }));

        Ok(discount)
    }
}

/// Error of [`CreateDiscount`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`RentalOption`] with the provided ID does not exist.
    #[display("`RentalOption(id: {_0})` does not exist")]
    OptionNotExists(#[error(not(source))] rental_option::Id),

    /// [`RentalOption`] belongs to another [`Listing`].
    #[display(
        "`RentalOption(id: {option_id})` doesn't belong to \
         `Listing(id: {listing_id})`"
    )]
    OptionNotOfListing {
        /// ID of the [`RentalOption`].
        option_id: rental_option::Id,

        /// ID of the [`Listing`] being discounted.
        listing_id: listing::Id,
    },

    /// [`Discount`] percentage is zero.
    #[display("`Discount` percentage must be greater than zero")]
    ZeroPercentage,

    /// [`Discount`] window ends before it starts.
    #[display("`Discount` window ends before it starts: {start}..{end}")]
    InvalidPeriod {
        /// First day of the window.
        start: discount::StartDate,

        /// Last day of the window.
        end: discount::EndDate,
    },

    /// [`Discount`] window starts in the past.
    #[display("`Discount` window may not start in the past: {_0}")]
    StartInPast(#[error(not(source))] discount::StartDate),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{listing::Kind, rental_option::Unit},
        infra::database::Mock,
        testing,
    };

    use super::*;

    fn cmd(listing_id: listing::Id, window: (&str, &str)) -> CreateDiscount {
        CreateDiscount {
            listing_id,
            rental_option_id: None,
            name: "Summer promo".parse().unwrap(),
            percentage: "10".parse().unwrap(),
            start: testing::date(window.0).coerce(),
            end: testing::date(window.1).coerce(),
        }
    }

    #[tokio::test]
    async fn creates_an_inactive_discount() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());

        let discount = service
            .execute(cmd(listing.id, ("2025-07-01", "2025-07-31")))
            .await
            .unwrap();

        assert_eq!(discount.status, discount::Status::Inactive);
        assert_eq!(
            db.discount(discount.id).unwrap().status,
            discount::Status::Inactive,
        );
    }

    #[tokio::test]
    async fn allows_windows_opening_today() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());

        let discount = service
            .execute(cmd(listing.id, ("2025-06-15", "2025-06-20")))
            .await
            .unwrap();

        // Activation is the sweep's job, not the creation's.
        assert_eq!(discount.status, discount::Status::Inactive);
    }

    #[tokio::test]
    async fn rejects_unknown_listings() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));

        let err = service
            .execute(cmd(listing::Id::new(), ("2025-07-01", "2025-07-31")))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(_),
        ));
    }

    #[tokio::test]
    async fn rejects_zero_percentages() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());

        let err = service
            .execute(CreateDiscount {
                percentage: "0".parse().unwrap(),
                ..cmd(listing.id, ("2025-07-01", "2025-07-31"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ZeroPercentage));
    }

    #[tokio::test]
    async fn rejects_inverted_windows() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());

        let err = service
            .execute(cmd(listing.id, ("2025-07-31", "2025-07-01")))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidPeriod { .. },
        ));
    }

    #[tokio::test]
    async fn rejects_windows_starting_in_the_past() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());

        let err = service
            .execute(cmd(listing.id, ("2025-06-14", "2025-07-31")))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::StartInPast(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_options() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());

        let err = service
            .execute(CreateDiscount {
                rental_option_id: Some(rental_option::Id::new()),
                ..cmd(listing.id, ("2025-07-01", "2025-07-31"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::OptionNotExists(_)));
    }

    #[tokio::test]
    async fn rejects_options_of_other_listings() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let other = testing::listing(Kind::Rent);
        let foreign = testing::rental_option(other.id, 1, Unit::Day, true);
        db.given_listing(listing.clone());
        db.given_listing(other);
        db.given_rental_option(foreign.clone());

        let err = service
            .execute(CreateDiscount {
                rental_option_id: Some(foreign.id),
                ..cmd(listing.id, ("2025-07-01", "2025-07-31"))
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::OptionNotOfListing { .. },
        ));
    }

    #[tokio::test]
    async fn publishes_a_creation_event() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        let mut events = service.subscribe();

        let discount = service
            .execute(cmd(listing.id, ("2025-07-01", "2025-07-31")))
            .await
            .unwrap();

        assert!(matches!(
            events.try_recv().unwrap(),
            Event::DiscountCreated(ev) if ev.discount_id == discount.id,
        ));
    }
}
