//! [`Command`] for marking a [`Transaction`] as paid.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{transaction, Transaction},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for marking a [`Transaction`] as paid.
///
/// The transition is one-way: a paid [`Transaction`] never becomes unpaid
/// again, and paying it a second time is rejected.
#[derive(Clone, Copy, Debug)]
pub struct MarkTransactionPaid {
    /// ID of the [`Transaction`] to mark as paid.
    pub id: transaction::Id,
}

impl<Db> Command<MarkTransactionPaid> for Service<Db>
where
    Db: Database<
            Select<By<Option<Transaction>, transaction::Id>>,
            Ok = Option<Transaction>,
            Err = Traced<database::Error>,
        > + Database<
            Update<read::transaction::MarkPaid>,
            Ok = Option<Transaction>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkTransactionPaid,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let transaction = self
            .database()
            .execute(Select(By::<Option<Transaction>, _>::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TransactionNotExists(cmd.id))
            .map_err(tracerr::wrap!())?;
        if transaction.payment_status() == transaction::PaymentStatus::Paid {
            return Err(tracerr::new!(E::AlreadyPaid(cmd.id)));
        }

        // The update applies only while the `Transaction` is still unpaid,
        // so a concurrent payment surfaces here as `None`.
        self.database()
            .execute(Update(read::transaction::MarkPaid {
                id: cmd.id,
                at: self.clock().now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AlreadyPaid(cmd.id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`MarkTransactionPaid`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Transaction`] with the provided ID does not exist.
    #[display("`Transaction(id: {_0})` does not exist")]
    TransactionNotExists(#[error(not(source))] transaction::Id),

    /// [`Transaction`] with the provided ID is paid already.
    #[display("`Transaction(id: {_0})` is paid already")]
    AlreadyPaid(#[error(not(source))] transaction::Id),
}

#[cfg(test)]
mod spec {
    use crate::{infra::database::Mock, testing};

    use super::*;

    #[tokio::test]
    async fn marks_an_unpaid_transaction_as_paid() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-20"));
        let booking =
            testing::rent_booking(crate::domain::listing::Id::new(), (
                "2025-06-01",
                "2025-06-10",
            ));
        db.given_transaction(booking.clone().into());

        let paid = service
            .execute(MarkTransactionPaid { id: booking.id })
            .await
            .unwrap();

        assert_eq!(
            paid.payment_status(),
            transaction::PaymentStatus::Paid,
        );
        assert_eq!(
            paid.payment_date().map(|at| at.date().coerce()),
            Some(testing::date("2025-06-20")),
        );
        assert_eq!(
            db.transaction(booking.id).unwrap().payment_status(),
            transaction::PaymentStatus::Paid,
        );
    }

    #[tokio::test]
    async fn rejects_a_paid_transaction() {
        let db = Mock::new();
        let clock = testing::clock_at("2025-06-20");
        let service = testing::service(&db, clock.clone());
        let booking =
            testing::rent_booking(crate::domain::listing::Id::new(), (
                "2025-06-01",
                "2025-06-10",
            ));
        db.given_transaction(booking.clone().into());
        _ = service
            .execute(MarkTransactionPaid { id: booking.id })
            .await
            .unwrap();

        clock.set(testing::date("2025-07-01").midnight_utc());
        let err = service
            .execute(MarkTransactionPaid { id: booking.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyPaid(id) if *id == booking.id,
        ));
        // The original payment moment survives the rejected retry.
        assert_eq!(
            db.transaction(booking.id)
                .unwrap()
                .payment_date()
                .map(|at| at.date().coerce()),
            Some(testing::date("2025-06-20")),
        );
    }

    #[tokio::test]
    async fn rejects_an_unknown_transaction() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-20"));
        let unknown = transaction::Id::new();

        let err = service
            .execute(MarkTransactionPaid { id: unknown })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::TransactionNotExists(id) if *id == unknown,
        ));
    }
}
