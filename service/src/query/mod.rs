//! [`Query`] definition.

pub mod discount;
pub mod discounts;
pub mod listing;
pub mod rental_option;
pub mod rental_options;
pub mod transaction;
pub mod transactions;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{
            discount::Status, listing::Kind, rental_option::Unit, user,
            Transaction,
        },
        infra::database::Mock,
        read, testing,
    };

    use super::*;

    #[tokio::test]
    async fn lists_only_active_options_of_the_listing() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let other = testing::listing(Kind::Rent);
        let base = testing::rental_option(listing.id, 1, Unit::Day, true);
        let weekly = testing::rental_option(listing.id, 7, Unit::Day, true);
        let cancelled =
            testing::rental_option(listing.id, 30, Unit::Day, false);
        let foreign = testing::rental_option(other.id, 1, Unit::Day, true);
        db.given_listing(listing.clone());
        db.given_listing(other);
        for o in [&base, &weekly, &cancelled, &foreign] {
            db.given_rental_option(o.clone());
        }

        let active = service
            .execute(rental_options::Active::by(
                read::rental_option::ActiveOf {
                    listing_id: listing.id,
                },
            ))
            .await
            .unwrap();

        assert_eq!(
            active.iter().map(|o| o.id).collect::<Vec<_>>(),
            [base.id, weekly.id],
        );
    }

    #[tokio::test]
    async fn sell_listings_own_no_options() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Sell);
        db.given_listing(listing.clone());

        let active = service
            .execute(rental_options::Active::by(
                read::rental_option::ActiveOf {
                    listing_id: listing.id,
                },
            ))
            .await
            .unwrap();

        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn lists_only_currently_active_discounts() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let active = testing::discount(
            listing.id,
            ("2025-06-01", "2025-06-30"),
            Status::Active,
        );
        let inactive = testing::discount(
            listing.id,
            ("2025-07-01", "2025-07-31"),
            Status::Inactive,
        );
        let expired = testing::discount(
            listing.id,
            ("2025-05-01", "2025-05-31"),
            Status::Expired,
        );
        db.given_listing(listing.clone());
        for d in [&active, &inactive, &expired] {
            db.given_discount(d.clone());
        }

        let listed = service
            .execute(discounts::Active::by(read::discount::ActiveOf {
                listing_id: listing.id,
            }))
            .await
            .unwrap();

        assert_eq!(
            listed.iter().map(|d| d.id).collect::<Vec<_>>(),
            [active.id],
        );
    }

    #[tokio::test]
    async fn lists_transactions_of_a_user_newest_first() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        let user_id = user::Id::new();
        let mut earlier =
            testing::rent_booking(listing.id, ("2025-06-01", "2025-06-05"));
        earlier.buyer_id = user_id;
        earlier.created_at =
            testing::date("2025-06-01").midnight_utc().coerce();
        let mut later =
            testing::rent_booking(listing.id, ("2025-06-10", "2025-06-15"));
        later.seller_id = user_id;
        later.created_at = testing::date("2025-06-10").midnight_utc().coerce();
        let unrelated =
            testing::rent_booking(listing.id, ("2025-06-20", "2025-06-25"));
        db.given_listing(listing);
        db.given_transaction(earlier.clone().into());
        db.given_transaction(later.clone().into());
        db.given_transaction(unrelated.into());

        let involved = service
            .execute(transactions::OfUser::by(user_id))
            .await
            .unwrap();

        assert_eq!(
            involved.iter().map(Transaction::id).collect::<Vec<_>>(),
            [later.id, earlier.id],
        );
    }

    #[tokio::test]
    async fn collects_booked_dates_of_a_listing() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));
        let listing = testing::listing(Kind::Rent);
        db.given_listing(listing.clone());
        db.given_transaction(
            testing::rent_booking(listing.id, ("2025-06-01", "2025-06-03"))
                .into(),
        );
        db.given_transaction(
            testing::rent_booking(listing.id, ("2025-06-03", "2025-06-05"))
                .into(),
        );

        let booked = service
            .execute(transactions::BookedDates::by(listing.id))
            .await
            .unwrap();

        assert_eq!(
            booked
                .into_iter()
                .map(|d| d.to_iso8601())
                .collect::<Vec<_>>(),
            [
                "2025-06-01",
                "2025-06-02",
                "2025-06-03",
                "2025-06-04",
                "2025-06-05",
            ],
        );
    }

    #[tokio::test]
    async fn misses_unknown_ids() {
        let db = Mock::new();
        let service = testing::service(&db, testing::clock_at("2025-06-15"));

        let found = service
            .execute(transaction::ById::by(
                crate::domain::transaction::Id::new(),
            ))
            .await
            .unwrap();

        assert!(found.is_none());
    }
}
