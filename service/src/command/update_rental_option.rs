//! [`Command`] for updating an existing [`RentalOption`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
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

/// [`Command`] for updating an existing [`RentalOption`].
///
/// Replaces the duration, unit and price of the [`RentalOption`] as a whole.
#[derive(Clone, Copy, Debug)]
pub struct UpdateRentalOption {
    /// ID of the [`RentalOption`] to update.
    pub id: rental_option::Id,

    /// New [`Duration`] of the [`RentalOption`], in `unit`s.
    ///
    /// [`Duration`]: rental_option::Duration
    pub duration: rental_option::Duration,

    /// New calendar [`Unit`] the `duration` is measured in.
    ///
    /// [`Unit`]: rental_option::Unit
    pub unit: rental_option::Unit,

    /// New [`Price`] of the whole rental period.
    pub price: Price,
}

impl<Db> Command<UpdateRentalOption> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<RentalOption>, rental_option::Id>>,
            Ok = Option<RentalOption>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<RentalOption>, rental_option::Id>>,
            Ok = Option<RentalOption>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<Option<rental_option::Id>, read::rental_option::BaseTier>,
            >,
            Ok = Option<rental_option::Id>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<rental_option::Id>, read::rental_option::Sibling>>,
            Ok = Option<rental_option::Id>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<RentalOption>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = RentalOption;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateRentalOption,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateRentalOption {
            id,
            duration,
            unit,
            price,
        } = cmd;

        let listing_id = self
            .database()
            .execute(Select(By::<Option<RentalOption>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OptionNotExists(id))
            .map_err(tracerr::wrap!())?
            .listing_id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Listing`.
        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let option = tx
            .execute(Select(By::<Option<RentalOption>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OptionNotExists(id))
            .map_err(tracerr::wrap!())?;

        // Cancelled options neither anchor nor require a base tier.
        if option.is_active {
            // The updated option must end up anchored by an active base tier
            // of its new unit.
            if !duration.is_base() {
                tx.execute(Select(By::<Option<rental_option::Id>, _>::new(
                    read::rental_option::BaseTier {
                        listing_id,
                        unit,
                        excluding: Some(option.id),
                    },
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::NoBaseTier { listing_id, unit })
                .map_err(tracerr::wrap!())
                .map(drop)?;
            }

            // Moving the base tier to another unit must not strand active
            // options of the old one.
            if option.is_base_tier() && unit != option.unit {
                let stranded = tx
                    .execute(Select(By::<Option<rental_option::Id>, _>::new(
                        read::rental_option::Sibling {
                            listing_id,
                            unit: option.unit,
                            excluding: option.id,
                        },
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if stranded.is_some() {
                    tx.execute(Select(
                        By::<Option<rental_option::Id>, _>::new(
                            read::rental_option::BaseTier {
                                listing_id,
                                unit: option.unit,
                                excluding: Some(option.id),
                            },
                        ),
                    ))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::LastBaseTier {
                        id: option.id,
                        unit: option.unit,
                    })
                    .map_err(tracerr::wrap!())
                    .map(drop)?;
                }
            }
        }

        let updated = RentalOption {
            duration,
            unit,
            price,
            ..option
        };
        tx.execute(Update(updated.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(updated)
    }
}

/// Error of [`UpdateRentalOption`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`RentalOption`] with the provided ID does not exist.
    #[display("`RentalOption(id: {_0})` does not exist")]
    OptionNotExists(#[error(not(source))] rental_option::Id),

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

    /// [`RentalOption`] is the last active base tier backing other options.
    #[display(
        "`RentalOption(id: {id})` is the last active base tier backing \
         other {unit} options"
    )]
    LastBaseTier {
        /// ID of the [`RentalOption`].
        id: rental_option::Id,

        /// [`Unit`] anchored by the [`RentalOption`].
        ///
        /// [`Unit`]: rental_option::Unit
        unit: rental_option::Unit,
    },
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{
            listing::Kind,
            rental_option::{Duration, Unit},
        },
        infra::database::Mock,
        testing,
    };

    use super::*;

    #[tokio::test]
    async fn updates_the_price_in_place() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let base = testing::rental_option(listing.id, 1, Unit::Day, true);
        db.given_listing(listing);
        db.given_rental_option(base.clone());

        let updated = service
            .execute(UpdateRentalOption {
                id: base.id,
                duration: base.duration,
                unit: base.unit,
                price: testing::price("120"),
            })
            .await
            .unwrap();

        assert_eq!(updated.price, testing::price("120"));
        assert_eq!(
            db.rental_option(base.id).unwrap().price,
            testing::price("120"),
        );
    }

    #[tokio::test]
    async fn rejects_unknown_options() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let unknown = rental_option::Id::new();

        let err = service
            .execute(UpdateRentalOption {
                id: unknown,
                duration: Duration::BASE,
                unit: Unit::Day,
                price: testing::price("100"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::OptionNotExists(id) if *id == unknown,
        ));
    }

    #[tokio::test]
    async fn requires_a_base_for_the_new_duration() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let base = testing::rental_option(listing.id, 1, Unit::Day, true);
        db.given_listing(listing);
        db.given_rental_option(base.clone());

        let err = service
            .execute(UpdateRentalOption {
                id: base.id,
                duration: Duration::new(7).unwrap(),
                unit: Unit::Day,
                price: testing::price("600"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoBaseTier { .. }));
    }

    #[tokio::test]
    async fn allows_stretching_on_top_of_a_second_base() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let base = testing::rental_option(listing.id, 1, Unit::Day, true);
        db.given_listing(listing.clone());
        db.given_rental_option(base.clone());
        db.given_rental_option(testing::rental_option(
            listing.id,
            1,
            Unit::Day,
            true,
        ));

        let updated = service
            .execute(UpdateRentalOption {
                id: base.id,
                duration: Duration::new(7).unwrap(),
                unit: Unit::Day,
                price: testing::price("600"),
            })
            .await
            .unwrap();

        assert!(!updated.is_base_tier());
    }

    #[tokio::test]
    async fn guards_the_abandoned_unit() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let base = testing::rental_option(listing.id, 1, Unit::Day, true);
        db.given_listing(listing.clone());
        db.given_rental_option(base.clone());
        db.given_rental_option(testing::rental_option(
            listing.id,
            7,
            Unit::Day,
            true,
        ));

        let err = service
            .execute(UpdateRentalOption {
                id: base.id,
                duration: Duration::BASE,
                unit: Unit::Week,
                price: testing::price("550"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::LastBaseTier {
                unit: Unit::Day,
                ..
            },
        ));
    }

    #[tokio::test]
    async fn allows_leaving_a_unit_with_no_other_active_options() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let base = testing::rental_option(listing.id, 1, Unit::Day, true);
        db.given_listing(listing.clone());
        db.given_rental_option(base.clone());
        db.given_rental_option(testing::rental_option(
            listing.id,
            7,
            Unit::Day,
            false,
        ));

        let updated = service
            .execute(UpdateRentalOption {
                id: base.id,
                duration: Duration::BASE,
                unit: Unit::Week,
                price: testing::price("550"),
            })
            .await
            .unwrap();

        assert_eq!(updated.unit, Unit::Week);
        assert!(updated.is_base_tier());
    }

    #[tokio::test]
    async fn leaves_cancelled_options_unchecked() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let cancelled = testing::rental_option(listing.id, 7, Unit::Day, false);
        db.given_listing(listing);
        db.given_rental_option(cancelled.clone());

        let updated = service
            .execute(UpdateRentalOption {
                id: cancelled.id,
                duration: Duration::new(30).unwrap(),
                unit: Unit::Day,
                price: testing::price("2000"),
            })
            .await
            .unwrap();

        assert!(!updated.is_active);
        assert_eq!(updated.duration, Duration::new(30).unwrap());
    }
}
