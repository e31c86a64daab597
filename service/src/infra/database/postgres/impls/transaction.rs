//! [`Transaction`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Insert, Select, Update},
    Price,
};
use tracerr::Traced;

use crate::{
    domain::{
        discount, listing, rental_option,
        transaction::{self, Occupancy},
        user, Transaction,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<transaction::Id, Transaction>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[transaction::Id]>,
{
    type Ok = HashMap<transaction::Id, Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<transaction::Id, Transaction>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[transaction::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, kind, \
                   listing_id, buyer_id, seller_id, \
                   check_in, check_out, \
                   total_price, amount_paid, \
                   payment_status, payment_method, payment_date, \
                   discount_id, rental_option_id, \
                   created_at \
            FROM transactions \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                let listing_id = row.get("listing_id");
                let buyer_id = row.get("buyer_id");
                let seller_id = row.get("seller_id");
                let total_price = row.get("total_price");
                let amount_paid = row.get("amount_paid");
                let payment_status = row.get("payment_status");
                let payment_method = row.get("payment_method");
                let payment_date = row.get("payment_date");
                let discount_id = row.get("discount_id");
                let rental_option_id = row.get("rental_option_id");
                let created_at = row.get("created_at");
                let transaction = match row.get("kind") {
                    transaction::Kind::Sell => transaction::Sale {
                        id,
                        listing_id,
                        buyer_id,
                        seller_id,
                        check_in: row.get("check_in"),
                        total_price,
                        amount_paid,
                        payment_status,
                        payment_method,
                        payment_date,
                        discount_id,
                        rental_option_id,
                        created_at,
                    }
                    .into(),
                    transaction::Kind::Rent => transaction::Rent {
                        id,
                        listing_id,
                        buyer_id,
                        seller_id,
                        occupancy: Occupancy::new(
                            row.get("check_in"),
                            row.get::<_, Option<_>>("check_out")
                                .expect("rent row has a check-out day"),
                        )
                        .expect("persisted window is valid"),
                        total_price,
                        amount_paid,
                        payment_status,
                        payment_method,
                        payment_date,
                        discount_id,
                        rental_option_id,
                        created_at,
                    }
                    .into(),
                };
                (id, transaction)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Transaction>, transaction::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<transaction::Id, Transaction>, [transaction::Id; 1]>>,
        Ok = HashMap<transaction::Id, Transaction>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Transaction>, transaction::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Transaction>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<transaction::Id, Transaction>, Vec<transaction::Id>>>,
        Ok = HashMap<transaction::Id, Transaction>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Transaction>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM transactions \
            WHERE buyer_id = $1::UUID \
               OR seller_id = $1::UUID \
            ORDER BY created_at DESC";
        let ids = self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| {
                rows.into_iter()
                    .map(|row| row.get("id"))
                    .collect::<Vec<_>>()
            })?;

        let mut transactions = self
            .execute(Select(
                By::<HashMap<transaction::Id, Transaction>, _>::new(
                    ids.clone(),
                ),
            ))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(ids
            .into_iter()
            .filter_map(|id| transactions.remove(&id))
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Occupancy>, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Occupancy>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Occupancy>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let listing_id: listing::Id = by.into_inner();

        const SQL: &str = "\
            SELECT check_in, check_out \
            FROM transactions \
            WHERE listing_id = $1::UUID \
              AND kind = $2::INT2";
        Ok(self
            .query(SQL, &[&listing_id, &transaction::Kind::Rent])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                Occupancy::new(
                    row.get("check_in"),
                    row.get::<_, Option<_>>("check_out")
                        .expect("rent row has a check-out day"),
                )
                .expect("persisted window is valid")
            })
            .collect())
    }
}

impl<C> Database<Select<By<read::transaction::BookedDates, listing::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Vec<Occupancy>, listing::Id>>,
        Ok = Vec<Occupancy>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::transaction::BookedDates;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::transaction::BookedDates, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let listing_id = by.into_inner();
        self.execute(Select(By::<Vec<Occupancy>, _>::new(listing_id)))
            .await
            .map_err(tracerr::wrap!())
            .map(read::transaction::BookedDates::collect)
    }
}

impl<C> Database<Insert<Transaction>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(transaction): Insert<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        #[expect(clippy::type_complexity, reason = "still readable")]
        let (
            id,
            kind,
            listing_id,
            buyer_id,
            seller_id,
            check_in,
            check_out,
            total_price,
            amount_paid,
            payment_status,
            payment_method,
            payment_date,
            discount_id,
            rental_option_id,
            created_at,
        ): (
            transaction::Id,
            transaction::Kind,
            listing::Id,
            user::Id,
            user::Id,
            transaction::CheckInDate,
            Option<transaction::CheckOutDate>,
            Price,
            Price,
            transaction::PaymentStatus,
            transaction::PaymentMethod,
            Option<transaction::PaymentDateTime>,
            Option<discount::Id>,
            Option<rental_option::Id>,
            transaction::CreationDateTime,
        ) = match transaction {
            Transaction::Sale(t) => (
                t.id,
                transaction::Kind::Sell,
                t.listing_id,
                t.buyer_id,
                t.seller_id,
                t.check_in,
                None,
                t.total_price,
                t.amount_paid,
                t.payment_status,
                t.payment_method,
                t.payment_date,
                t.discount_id,
                t.rental_option_id,
                t.created_at,
            ),
            Transaction::Rent(t) => (
                t.id,
                transaction::Kind::Rent,
                t.listing_id,
                t.buyer_id,
                t.seller_id,
                t.occupancy.check_in(),
                Some(t.occupancy.check_out()),
                t.total_price,
                t.amount_paid,
                t.payment_status,
                t.payment_method,
                t.payment_date,
                t.discount_id,
                t.rental_option_id,
                t.created_at,
            ),
        };

        const SQL: &str = "\
            INSERT INTO transactions (\
                id, kind, \
                listing_id, buyer_id, seller_id, \
                check_in, check_out, \
                total_price, amount_paid, \
                payment_status, payment_method, payment_date, \
                discount_id, rental_option_id, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::INT2, \
                $3::UUID, $4::UUID, $5::UUID, \
                $6::DATE, $7::DATE, \
                $8::NUMERIC, $9::NUMERIC, \
                $10::INT2, $11::INT2, $12::TIMESTAMPTZ, \
                $13::UUID, $14::UUID, \
                $15::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &kind,
                &listing_id,
                &buyer_id,
                &seller_id,
                &check_in,
                &check_out,
                &total_price,
                &amount_paid,
                &payment_status,
                &payment_method,
                &payment_date,
                &discount_id,
                &rental_option_id,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<read::transaction::MarkPaid>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Transaction>, transaction::Id>>,
        Ok = Option<Transaction>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(mark): Update<read::transaction::MarkPaid>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::transaction::MarkPaid { id, at } = mark;

        const SQL: &str = "\
            UPDATE transactions \
            SET payment_status = $1::INT2, \
                payment_date = $2::TIMESTAMPTZ \
            WHERE id = $3::UUID \
              AND payment_status = $4::INT2 \
            RETURNING id";
        if self
            .query_opt(
                SQL,
                &[
                    &transaction::PaymentStatus::Paid,
                    &at,
                    &id,
                    &transaction::PaymentStatus::Unpaid,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .is_none()
        {
            return Ok(None);
        }

        self.execute(Select(By::new(id))).await.map_err(tracerr::wrap!())
    }
}
