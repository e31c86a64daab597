//! [`Command`] for creating a new [`RentalOption`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Price,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, rental_option, Listing, RentalOption},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating a new [`RentalOption`] of a [`Listing`].
#[derive(Clone, Copy, Debug)]
pub struct CreateRentalOption {
    /// ID of the [`Listing`] to create a [`RentalOption`] of.
    pub listing_id: listing::Id,

    /// [`Duration`] of the new [`RentalOption`], in `unit`s.
    ///
    /// [`Duration`]: rental_option::Duration
    pub duration: rental_option::Duration,

    /// Calendar [`Unit`] the `duration` is measured in.
    ///
    /// [`Unit`]: rental_option::Unit
    pub unit: rental_option::Unit,

    /// [`Price`] of the whole rental period.
    pub price: Price,
}

impl<Db> Command<CreateRentalOption> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<
                By<Option<rental_option::Id>, read::rental_option::BaseTier>,
            >,
            Ok = Option<rental_option::Id>,
            Err = Traced<database::Error>,
        > + Database<Insert<RentalOption>, Err = Traced<database::Error>>
        + Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = RentalOption;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateRentalOption,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRentalOption {
            listing_id,
            duration,
            unit,
            price,
        } = cmd;

        let listing = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;
        if listing.kind != listing::Kind::Rent {
            return Err(tracerr::new!(E::ListingNotRent(listing.id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Listing`.
        tx.execute(Lock(By::new(listing.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // A longer tier is only meaningful on top of an active base one.
        if !duration.is_base() {
            tx.execute(Select(By::<Option<rental_option::Id>, _>::new(
                read::rental_option::BaseTier {
                    listing_id: listing.id,
                    unit,
                    excluding: None,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NoBaseTier {
                listing_id: listing.id,
                unit,
            })
            .map_err(tracerr::wrap!())
            .map(drop)?;
        }

        let option = RentalOption {
            id: rental_option::Id::new(),
            listing_id: listing.id,
            duration,
            unit,
            price,
            is_active: true,
            created_at: self.clock().now().coerce(),
        };
        tx.execute(Insert(option.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(option)
    }
}

/// Error of [`CreateRentalOption`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID is not rented out.
    #[display("`Listing(id: {_0})` is not a rent listing")]
    ListingNotRent(#[error(not(source))] listing::Id),

    /// [`Listing`] has no active base [`RentalOption`] for the unit.
    #[display(
        "`Listing(id: {listing_id})` has no active base `RentalOption` \
         priced per 1 {unit}"
    )]
    NoBaseTier {
        /// ID of the [`Listing`].
        listing_id: listing::Id,

        /// [`Unit`] missing a base [`RentalOption`].
        ///
        /// [`Unit`]: rental_option::Unit
        unit: rental_option::Unit,
    },
}

#[cfg(test)]
mod spec {
    use crate::{domain::listing::Kind, infra::database::Mock, testing};

    use super::*;

    #[tokio::test]
    async fn creates_a_base_tier() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());

        let option = service
            .execute(CreateRentalOption {
                listing_id: listing.id,
                duration: rental_option::Duration::BASE,
                unit: rental_option::Unit::Day,
                price: testing::price("100"),
            })
            .await
            .unwrap();

        assert!(option.is_base_tier());
        assert!(option.is_active);
        assert_eq!(db.rental_option(option.id).unwrap().id, option.id);
    }

    #[tokio::test]
    async fn rejects_unknown_listings() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let unknown = listing::Id::new();

        let err = service
            .execute(CreateRentalOption {
                listing_id: unknown,
                duration: rental_option::Duration::BASE,
                unit: rental_option::Unit::Day,
                price: testing::price("100"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(id) if *id == unknown,
        ));
    }

    #[tokio::test]
    async fn rejects_sale_listings() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Sell);
        db.given_listing(listing.clone());

        let err = service
            .execute(CreateRentalOption {
                listing_id: listing.id,
                duration: rental_option::Duration::BASE,
                unit: rental_option::Unit::Day,
                price: testing::price("100"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotRent(_),
        ));
    }

    #[tokio::test]
    async fn rejects_longer_tiers_without_a_base_one() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());

        let err = service
            .execute(CreateRentalOption {
                listing_id: listing.id,
                duration: rental_option::Duration::new(7).unwrap(),
                unit: rental_option::Unit::Day,
                price: testing::price("600"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoBaseTier { .. }));
    }

    #[tokio::test]
    async fn allows_longer_tiers_on_top_of_a_base_one() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        db.given_rental_option(testing::rental_option(
            listing.id,
            1,
            rental_option::Unit::Day,
            true,
        ));

        let option = service
            .execute(CreateRentalOption {
                listing_id: listing.id,
                duration: rental_option::Duration::new(7).unwrap(),
                unit: rental_option::Unit::Day,
                price: testing::price("600"),
            })
            .await
            .unwrap();

        assert!(!option.is_base_tier());
    }

    #[tokio::test]
    async fn ignores_cancelled_base_tiers() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        db.given_rental_option(testing::rental_option(
            listing.id,
            1,
            rental_option::Unit::Day,
            false,
        ));

        let err = service
            .execute(CreateRentalOption {
                listing_id: listing.id,
                duration: rental_option::Duration::new(7).unwrap(),
                unit: rental_option::Unit::Day,
                price: testing::price("600"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoBaseTier { .. }));
    }

    #[tokio::test]
    async fn rechecks_the_base_tier_under_the_listing_lock() {
        use futures::FutureExt as _;

        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        let base = testing::rental_option(
            listing.id,
            1,
            rental_option::Unit::Day,
            true,
        );
        db.given_rental_option(base.clone());

        let held = db.hold_listing_lock(listing.id).await;
        let mut creating = Box::pin(service.execute(CreateRentalOption {
            listing_id: listing.id,
            duration: rental_option::Duration::new(7).unwrap(),
            unit: rental_option::Unit::Day,
            price: testing::price("600"),
        }));
        assert!((&mut creating).now_or_never().is_none());

        // The concurrent cancellation of the base tier commits first.
        db.given_rental_option(RentalOption {
            is_active: false,
            ..base
        });
        drop(held);

        let err = creating.await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NoBaseTier { .. }));
    }

    #[tokio::test]
    async fn scopes_base_tiers_to_their_unit() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        db.given_rental_option(testing::rental_option(
            listing.id,
            1,
            rental_option::Unit::Day,
            true,
        ));

        let err = service
            .execute(CreateRentalOption {
                listing_id: listing.id,
                duration: rental_option::Duration::new(2).unwrap(),
                unit: rental_option::Unit::Week,
                price: testing::price("1200"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NoBaseTier {
                unit: rental_option::Unit::Week,
                ..
            },
        ));
    }
}
