//! [`Command`] for deleting a [`Discount`].

use common::operations::{
    By, Commit, Delete, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{discount, Discount},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting a [`Discount`].
///
/// A [`Discount`] never referenced by a [`Transaction`] is removed entirely.
/// A referenced one is only deactivated, so the [`Transaction`]s' pricing
/// history stays intact.
///
/// [`Transaction`]: crate::domain::Transaction
#[derive(Clone, Copy, Debug)]
pub struct DeleteDiscount {
    /// ID of the [`Discount`] to delete.
    pub id: discount::Id,
}

/// Outcome of a [`DeleteDiscount`] execution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The [`Discount`] row was removed entirely.
    Deleted,

    /// The [`Discount`] was deactivated in place, keeping the pricing
    /// history of the [`Transaction`]s referring to it.
    ///
    /// [`Transaction`]: crate::domain::Transaction
    Deactivated,
}

impl<Db> Command<DeleteDiscount> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Discount>, discount::Id>>,
            Ok = Option<Discount>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::discount::Usage, discount::Id>>,
            Ok = read::discount::Usage,
            Err = Traced<database::Error>,
        > + Database<Update<Discount>, Err = Traced<database::Error>>
        + Database<
            Delete<By<Discount, discount::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Outcome;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteDiscount,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteDiscount { id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let discount = tx
            .execute(Select(By::<Option<Discount>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::DiscountNotExists(id))
            .map_err(tracerr::wrap!())?;

        let usage = tx
            .execute(Select(By::<read::discount::Usage, _>::new(discount.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let outcome = if usage.any() {
            tx.execute(Update(Discount {
                status: discount::Status::Deactivated,
                ..discount
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
            Outcome::Deactivated
        } else {
            tx.execute(Delete(By::<Discount, _>::new(discount.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Outcome::Deleted
        };

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(outcome)
    }
}

/// Error of [`DeleteDiscount`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Discount`] with the provided ID does not exist.
    #[display("`Discount(id: {_0})` does not exist")]
    DiscountNotExists(#[error(not(source))] discount::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{discount::Status, listing::Kind},
        infra::database::Mock,
        testing,
    };

    use super::*;

    #[tokio::test]
    async fn removes_unreferenced_discounts_entirely() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let discount = testing::discount(
            listing.id,
            ("2025-07-01", "2025-07-31"),
            Status::Active,
        );
        db.given_listing(listing);
        db.given_discount(discount.clone());

        let outcome = service
            .execute(DeleteDiscount { id: discount.id })
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Deleted);
        assert!(db.discount(discount.id).is_none());
    }

    #[tokio::test]
    async fn deactivates_referenced_discounts() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let discount = testing::discount(
            listing.id,
            ("2025-06-01", "2025-06-30"),
            Status::Active,
        );
        let mut booking = testing::rent_booking(
            listing.id,
            ("2025-06-20", "2025-06-25"),
        );
        booking.discount_id = Some(discount.id);
        db.given_listing(listing);
        db.given_discount(discount.clone());
        db.given_transaction(booking.into());

        let outcome = service
            .execute(DeleteDiscount { id: discount.id })
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Deactivated);
        assert_eq!(
            db.discount(discount.id).unwrap().status,
            Status::Deactivated,
        );
    }

    #[tokio::test]
    async fn rejects_unknown_discounts() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let unknown = discount::Id::new();

        let err = service
            .execute(DeleteDiscount { id: unknown })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::DiscountNotExists(id) if *id == unknown,
        ));
    }
}
