//! [`Command`] for creating a new [`Transaction`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Price,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        discount, listing, rental_option,
        transaction::{self, Occupancy},
        user, Discount, Listing, RentalOption, Transaction,
    },
    event,
    infra::{database, Database},
    Event, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Transaction`].
///
/// A `sell` [`Transaction`] claims no calendar window and is persisted
/// directly. A `rent` one claims an [`Occupancy`] window, which must not
/// overlap any other booking of the same [`Listing`].
#[derive(Clone, Copy, Debug)]
pub struct CreateTransaction {
    /// [`Kind`] of the new [`Transaction`].
    ///
    /// [`Kind`]: transaction::Kind
    pub kind: transaction::Kind,

    /// ID of the [`Listing`] to transact upon.
    pub listing_id: listing::Id,

    /// ID of the paying [`User`].
    ///
    /// [`User`]: crate::domain::user
    pub buyer_id: user::Id,

    /// ID of the [`User`] being paid.
    ///
    /// [`User`]: crate::domain::user
    pub seller_id: user::Id,

    /// Day the occupancy (or nominal handover) starts.
    pub check_in: transaction::CheckInDate,

    /// Day the occupancy ends.
    ///
    /// Required for a `rent` [`Transaction`], ignored for a `sell` one.
    pub check_out: Option<transaction::CheckOutDate>,

    /// ID of the [`Discount`] applied, if any.
    pub discount_id: Option<discount::Id>,

    /// ID of the [`RentalOption`] the price was derived from, if any.
    pub rental_option_id: Option<rental_option::Id>,

    /// Full price of the new [`Transaction`].
    pub total_price: Price,

    /// Amount paid upfront.
    pub amount_paid: Price,

    /// [`PaymentStatus`] of the new [`Transaction`].
    ///
    /// [`PaymentStatus`]: transaction::PaymentStatus
    pub payment_status: transaction::PaymentStatus,

    /// [`PaymentMethod`] of the new [`Transaction`].
    ///
    /// [`PaymentMethod`]: transaction::PaymentMethod
    pub payment_method: transaction::PaymentMethod,
}

impl<Db> Command<CreateTransaction> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Vec<user::Id>, [user::Id; 2]>>,
            Ok = Vec<user::Id>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Discount>, discount::Id>>,
            Ok = Option<Discount>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<RentalOption>, rental_option::Id>>,
            Ok = Option<RentalOption>,
            Err = Traced<database::Error>,
        > + Database<Insert<Transaction>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Vec<Occupancy>, listing::Id>>,
            Ok = Vec<Occupancy>,
            Err = Traced<database::Error>,
        > + Database<Insert<Transaction>, Err = Traced<database::Error>>
        + Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateTransaction,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateTransaction {
            kind,
            listing_id,
            buyer_id,
            seller_id,
            check_in,
            check_out,
            discount_id,
            rental_option_id,
            total_price,
            amount_paid,
            payment_status,
            payment_method,
        } = cmd;

        let users = self
            .database()
            .execute(Select(By::<Vec<user::Id>, _>::new([buyer_id, seller_id])))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for id in [buyer_id, seller_id] {
            if !users.contains(&id) {
                return Err(tracerr::new!(E::UserNotExists(id)));
            }
        }

        let listing = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        if let Some(id) = discount_id {
            let discount = self
                .database()
                .execute(Select(By::<Option<Discount>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::DiscountNotExists(id))
                .map_err(tracerr::wrap!())?;
            if discount.listing_id != listing.id {
                return Err(tracerr::new!(E::DiscountNotOfListing {
                    discount_id: id,
                    listing_id: listing.id,
                }));
            }
        }
        if let Some(id) = rental_option_id {
            let option = self
                .database()
                .execute(Select(By::<Option<RentalOption>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::OptionNotExists(id))
                .map_err(tracerr::wrap!())?;
            if option.listing_id != listing.id {
                return Err(tracerr::new!(E::OptionNotOfListing {
                    option_id: id,
                    listing_id: listing.id,
                }));
            }
        }

        let payment_date = (payment_status == transaction::PaymentStatus::Paid)
            .then(|| self.clock().now().coerce());
        let created_at = self.clock().now().coerce();

        let created = match kind {
            transaction::Kind::Sell => {
                let sale = Transaction::from(transaction::Sale {
                    id: transaction::Id::new(),
                    listing_id: listing.id,
                    buyer_id,
                    seller_id,
                    check_in,
                    total_price,
                    amount_paid,
                    payment_status,
                    payment_method,
                    payment_date,
                    discount_id,
                    rental_option_id,
                    created_at,
                });
                self.database()
                    .execute(Insert(sale.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                sale
            }
            transaction::Kind::Rent => {
                if listing.kind != listing::Kind::Rent {
                    return Err(tracerr::new!(E::ListingNotRent(listing.id)));
                }
                let check_out = check_out
                    .ok_or(E::MissingCheckOut)
                    .map_err(tracerr::wrap!())?;
                let occupancy = Occupancy::new(check_in, check_out)
                    .ok_or(E::InvalidOccupancy { check_in, check_out })
                    .map_err(tracerr::wrap!())?;

                let tx = self
                    .database()
                    .execute(Transact)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                // Avoid concurrent bookings upon the same `Listing`.
                tx.execute(Lock(By::new(listing.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                let booked = tx
                    .execute(Select(By::<Vec<Occupancy>, _>::new(listing.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if let Some(conflict) = occupancy.first_conflict(booked) {
                    return Err(tracerr::new!(E::BookingConflict {
                        listing_id: listing.id,
                        check_in: conflict.check_in(),
                        check_out: conflict.check_out(),
                    }));
                }

                let booking = Transaction::from(transaction::Rent {
                    id: transaction::Id::new(),
                    listing_id: listing.id,
                    buyer_id,
                    seller_id,
                    occupancy,
                    total_price,
                    amount_paid,
                    payment_status,
                    payment_method,
                    payment_date,
                    discount_id,
                    rental_option_id,
                    created_at,
                });
                tx.execute(Insert(booking.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                tx.execute(Commit)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                booking
            }
        };

        self.publish(Event::TransactionCreated(event::TransactionCreated {
            transaction_id: created.id(),
            listing_id: created.listing_id(),
            buyer_id: created.buyer_id(),
            seller_id: created.seller_id(),
        }));

        Ok(created)
    }
}

/// Error of [`CreateTransaction`] [`Command`] execution.
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

    /// User with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`Discount`] with the provided ID does not exist.
    #[display("`Discount(id: {_0})` does not exist")]
    DiscountNotExists(#[error(not(source))] discount::Id),

    /// [`Discount`] belongs to another [`Listing`].
    #[display(
        "`Discount(id: {discount_id})` doesn't belong to \
         `Listing(id: {listing_id})`"
    )]
    DiscountNotOfListing {
        /// ID of the [`Discount`].
        discount_id: discount::Id,

        /// ID of the [`Listing`] being transacted upon.
        listing_id: listing::Id,
    },

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

        /// ID of the [`Listing`] being transacted upon.
        listing_id: listing::Id,
    },

    /// `rent` [`Transaction`] is missing its check-out day.
    #[display("`rent` transaction requires a check-out day")]
    MissingCheckOut,

    /// Check-out day doesn't strictly follow the check-in day.
    #[display(
        "check-out day must strictly follow the check-in one: \
         {check_in}..{check_out}"
    )]
    InvalidOccupancy {
        /// Day the occupancy starts.
        check_in: transaction::CheckInDate,

        /// Day the occupancy ends.
        check_out: transaction::CheckOutDate,
    },

    /// [`Listing`] is already booked over the window.
    #[display(
        "`Listing(id: {listing_id})` is already occupied from {check_in} \
         to {check_out}"
    )]
    BookingConflict {
        /// ID of the [`Listing`].
        listing_id: listing::Id,

        /// Day the conflicting occupancy starts.
        check_in: transaction::CheckInDate,

        /// Day the conflicting occupancy ends.
        check_out: transaction::CheckOutDate,
    },
}

#[cfg(test)]
mod spec {
    use crate::{domain::listing::Kind, infra::database::Mock, testing};

    use super::*;

    fn booking(
        listing_id: listing::Id,
        window: (&str, &str),
    ) -> CreateTransaction {
        CreateTransaction {
            kind: transaction::Kind::Rent,
            listing_id,
            buyer_id: user::Id::new(),
            seller_id: user::Id::new(),
            check_in: testing::date(window.0).coerce(),
            check_out: Some(testing::date(window.1).coerce()),
            discount_id: None,
            rental_option_id: None,
            total_price: testing::price("500"),
            amount_paid: Price::ZERO,
            payment_status: transaction::PaymentStatus::Unpaid,
            payment_method: transaction::PaymentMethod::Stripe,
        }
    }

    fn with_users(db: &Mock, cmd: &CreateTransaction) {
        db.given_user(cmd.buyer_id);
        db.given_user(cmd.seller_id);
    }

    #[tokio::test]
    async fn books_a_free_window() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        let cmd = booking(listing.id, ("2025-06-01", "2025-06-10"));
        with_users(&db, &cmd);

        let created = service.execute(cmd).await.unwrap();

        assert_eq!(created.kind(), transaction::Kind::Rent);
        assert!(db.transaction(created.id()).is_some());
    }

    #[tokio::test]
    async fn rejects_overlapping_bookings() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        db.given_transaction(
            testing::rent_booking(listing.id, ("2025-06-01", "2025-06-10"))
                .into(),
        );
        let cmd = booking(listing.id, ("2025-06-05", "2025-06-07"));
        with_users(&db, &cmd);

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::BookingConflict { .. },
        ));
    }

    #[tokio::test]
    async fn serializes_bookings_behind_the_listing_lock() {
        use futures::FutureExt as _;

        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        let cmd = booking(listing.id, ("2025-06-05", "2025-06-07"));
        with_users(&db, &cmd);

        let held = db.hold_listing_lock(listing.id).await;
        let mut booking = Box::pin(service.execute(cmd));
        assert!((&mut booking).now_or_never().is_none());

        // The competing overlapping booking commits while the lock is held.
        db.given_transaction(
            testing::rent_booking(listing.id, ("2025-06-01", "2025-06-10"))
                .into(),
        );
        drop(held);

        let err = booking.await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::BookingConflict { .. },
        ));
    }

    #[tokio::test]
    async fn allows_same_day_turnover() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        db.given_transaction(
            testing::rent_booking(listing.id, ("2025-06-01", "2025-06-10"))
                .into(),
        );
        let cmd = booking(listing.id, ("2025-06-10", "2025-06-15"));
        with_users(&db, &cmd);

        let created = service.execute(cmd).await.unwrap();

        assert!(db.transaction(created.id()).is_some());
    }

    #[tokio::test]
    async fn keeps_committed_windows_disjoint() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());

        for window in [
            ("2025-06-01", "2025-06-10"),
            ("2025-06-05", "2025-06-07"),
            ("2025-06-10", "2025-06-15"),
            ("2025-06-09", "2025-06-11"),
            ("2025-06-20", "2025-06-25"),
        ] {
            let cmd = booking(listing.id, window);
            with_users(&db, &cmd);
            _ = service.execute(cmd).await;
        }

        let committed = db
            .transactions()
            .into_iter()
            .filter_map(|t| t.occupancy())
            .collect::<Vec<_>>();
        for (i, a) in committed.iter().enumerate() {
            for b in &committed[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[tokio::test]
    async fn creates_sales_without_conflict_checks() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Sell);
        db.given_listing(listing.clone());
        let cmd = CreateTransaction {
            kind: transaction::Kind::Sell,
            check_out: None,
            ..booking(listing.id, ("2025-06-01", "2025-06-10"))
        };
        with_users(&db, &cmd);

        let created = service.execute(cmd).await.unwrap();

        assert_eq!(created.kind(), transaction::Kind::Sell);
        assert_eq!(created.occupancy(), None);
    }

    #[tokio::test]
    async fn rejects_bookings_of_sale_listings() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Sell);
        db.given_listing(listing.clone());
        let cmd = booking(listing.id, ("2025-06-01", "2025-06-10"));
        with_users(&db, &cmd);

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ListingNotRent(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_listings() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let cmd = booking(listing::Id::new(), ("2025-06-01", "2025-06-10"));
        with_users(&db, &cmd);

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(_),
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_users() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        let cmd = booking(listing.id, ("2025-06-01", "2025-06-10"));
        db.given_user(cmd.seller_id);

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == cmd.buyer_id,
        ));
    }

    #[tokio::test]
    async fn requires_a_check_out_for_bookings() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        let cmd = CreateTransaction {
            check_out: None,
            ..booking(listing.id, ("2025-06-01", "2025-06-10"))
        };
        with_users(&db, &cmd);

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::MissingCheckOut));
    }

    #[tokio::test]
    async fn rejects_inverted_occupancies() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        let cmd = booking(listing.id, ("2025-06-10", "2025-06-01"));
        with_users(&db, &cmd);

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidOccupancy { .. },
        ));
    }

    #[tokio::test]
    async fn rejects_foreign_discounts() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        let other = testing::listing(Kind::Rent);
        let foreign = testing::discount(
            other.id,
            ("2025-06-01", "2025-06-30"),
            crate::domain::discount::Status::Active,
        );
        db.given_listing(listing.clone());
        db.given_listing(other);
        db.given_discount(foreign.clone());
        let cmd = CreateTransaction {
            discount_id: Some(foreign.id),
            ..booking(listing.id, ("2025-06-01", "2025-06-10"))
        };
        with_users(&db, &cmd);

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::DiscountNotOfListing { .. },
        ));
    }

    #[tokio::test]
    async fn stamps_the_payment_date_of_upfront_payments() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        let cmd = CreateTransaction {
            payment_status: transaction::PaymentStatus::Paid,
            ..booking(listing.id, ("2025-06-01", "2025-06-10"))
        };
        with_users(&db, &cmd);

        let created = service.execute(cmd).await.unwrap();

        assert_eq!(
            created.payment_status(),
            transaction::PaymentStatus::Paid,
        );
        assert!(created.payment_date().is_some());
    }

    #[tokio::test]
    async fn publishes_a_creation_event() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-05-01"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        let cmd = booking(listing.id, ("2025-06-01", "2025-06-10"));
        with_users(&db, &cmd);
        let mut events = service.subscribe();

        let created = service.execute(cmd).await.unwrap();

        assert!(matches!(
            events.try_recv().unwrap(),
            Event::TransactionCreated(ev)
                if ev.transaction_id == created.id(),
        ));
    }
}
