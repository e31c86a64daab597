//! [`Command`] for cancelling a [`RentalOption`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, rental_option, Listing, RentalOption},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for cancelling a [`RentalOption`].
///
/// Cancelling is a soft operation: the [`RentalOption`] row survives, so the
/// [`Transaction`]s referring to it keep their history.
///
/// [`Transaction`]: crate::domain::Transaction
#[derive(Clone, Copy, Debug)]
pub struct CancelRentalOption {
    /// ID of the [`RentalOption`] to cancel.
    pub id: rental_option::Id,
}

impl<Db> Command<CancelRentalOption> for Service<Db>
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
        cmd: CancelRentalOption,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelRentalOption { id } = cmd;

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

        if !option.is_active {
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            return Ok(option);
        }

        // The base tier may only leave when another one backs the unit, or
        // when nothing is left to back.
        if option.is_base_tier() {
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
                tx.execute(Select(By::<Option<rental_option::Id>, _>::new(
                    read::rental_option::BaseTier {
                        listing_id,
                        unit: option.unit,
                        excluding: Some(option.id),
                    },
                )))
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

        let cancelled = RentalOption {
            is_active: false,
            ..option
        };
        tx.execute(Update(cancelled.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(cancelled)
    }
}

/// Error of [`CancelRentalOption`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`RentalOption`] with the provided ID does not exist.
    #[display("`RentalOption(id: {_0})` does not exist")]
    OptionNotExists(#[error(not(source))] rental_option::Id),

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
        domain::{listing::Kind, rental_option::Unit},
        infra::database::Mock,
        testing,
    };

    use super::*;

    #[tokio::test]
    async fn cancels_a_non_base_tier() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let weekly = testing::rental_option(listing.id, 7, Unit::Day, true);
        db.given_listing(listing.clone());
        db.given_rental_option(testing::rental_option(
            listing.id,
            1,
            Unit::Day,
            true,
        ));
        db.given_rental_option(weekly.clone());

        let cancelled = service
            .execute(CancelRentalOption { id: weekly.id })
            .await
            .unwrap();

        assert!(!cancelled.is_active);
        assert!(!db.rental_option(weekly.id).unwrap().is_active);
    }

    #[tokio::test]
    async fn rejects_unknown_options() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let unknown = rental_option::Id::new();

        let err = service
            .execute(CancelRentalOption { id: unknown })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::OptionNotExists(id) if *id == unknown,
        ));
    }

    #[tokio::test]
    async fn keeps_the_base_backing_other_options() {
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
            .execute(CancelRentalOption { id: base.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::LastBaseTier { id, .. } if *id == base.id,
        ));
        assert!(db.rental_option(base.id).unwrap().is_active);
    }

    #[tokio::test]
    async fn cancels_the_base_when_another_one_backs_the_unit() {
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
        db.given_rental_option(testing::rental_option(
            listing.id,
            7,
            Unit::Day,
            true,
        ));

        let cancelled = service
            .execute(CancelRentalOption { id: base.id })
            .await
            .unwrap();

        assert!(!cancelled.is_active);
    }

    #[tokio::test]
    async fn cancels_the_last_option_of_a_unit() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let base = testing::rental_option(listing.id, 1, Unit::Day, true);
        db.given_listing(listing);
        db.given_rental_option(base.clone());

        let cancelled = service
            .execute(CancelRentalOption { id: base.id })
            .await
            .unwrap();

        assert!(!cancelled.is_active);
    }

    #[tokio::test]
    async fn ignores_already_cancelled_siblings() {
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

        let cancelled = service
            .execute(CancelRentalOption { id: base.id })
            .await
            .unwrap();

        assert!(!cancelled.is_active);
    }

    #[tokio::test]
    async fn is_idempotent() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let base = testing::rental_option(listing.id, 1, Unit::Day, true);
        db.given_listing(listing);
        db.given_rental_option(base.clone());

        let first = service
            .execute(CancelRentalOption { id: base.id })
            .await
            .unwrap();
        let second = service
            .execute(CancelRentalOption { id: base.id })
            .await
            .unwrap();

        assert!(!first.is_active);
        assert!(!second.is_active);
    }
}
