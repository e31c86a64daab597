//! [`Discount`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{discount, Discount},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<discount::Id, Discount>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[discount::Id]>,
{
    type Ok = HashMap<discount::Id, Discount>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<discount::Id, Discount>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[discount::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, listing_id, rental_option_id, \
                   name, percentage, \
                   window_start, window_end, \
                   status, created_at \
            FROM listing_discounts \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    Discount {
                        id,
                        listing_id: row.get("listing_id"),
                        rental_option_id: row.get("rental_option_id"),
                        name: row.get("name"),
                        percentage: row.get("percentage"),
                        period: discount::Period::new(
                            row.get("window_start"),
                            row.get("window_end"),
                        )
                        .expect("persisted window is valid"),
                        status: row.get("status"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Discount>, discount::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<discount::Id, Discount>, [discount::Id; 1]>>,
        Ok = HashMap<discount::Id, Discount>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Discount>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Discount>, discount::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Discount>, read::discount::ActiveOf>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<discount::Id, Discount>, Vec<discount::Id>>>,
        Ok = HashMap<discount::Id, Discount>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Discount>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Discount>, read::discount::ActiveOf>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::discount::ActiveOf { listing_id } = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM listing_discounts \
            WHERE listing_id = $1::UUID \
              AND status = $2::INT2 \
            ORDER BY created_at ASC";
        let ids = self
            .query(SQL, &[&listing_id, &discount::Status::Active])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| {
                rows.into_iter()
                    .map(|row| row.get("id"))
                    .collect::<Vec<_>>()
            })?;

        let mut discounts = self
            .execute(Select(By::<HashMap<discount::Id, Discount>, _>::new(
                ids.clone(),
            )))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(ids.into_iter().filter_map(|id| discounts.remove(&id)).collect())
    }
}

impl<C> Database<Insert<Discount>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Discount>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(discount): Insert<Discount>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(discount)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Discount>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(discount): Update<Discount>,
    ) -> Result<Self::Ok, Self::Err> {
        let Discount {
            id,
            listing_id,
            rental_option_id,
            name,
            percentage,
            period,
            status,
            created_at,
        } = discount;

        const SQL: &str = "\
            INSERT INTO listing_discounts (\
                id, listing_id, rental_option_id, \
                name, percentage, \
                window_start, window_end, \
                status, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::VARCHAR, $5::NUMERIC, \
                $6::DATE, $7::DATE, \
                $8::INT2, $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET listing_id = EXCLUDED.listing_id, \
                rental_option_id = EXCLUDED.rental_option_id, \
                name = EXCLUDED.name, \
                percentage = EXCLUDED.percentage, \
                window_start = EXCLUDED.window_start, \
                window_end = EXCLUDED.window_end, \
                status = EXCLUDED.status, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &listing_id,
                &rental_option_id,
                &name,
                &percentage,
                &period.start(),
                &period.end(),
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Discount, discount::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Discount, discount::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: discount::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM listing_discounts \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::discount::Usage, discount::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::discount::Usage;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::discount::Usage, discount::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: discount::Id = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*)::INT8 \
            FROM transactions \
            WHERE discount_id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i64>(0).into())
    }
}

impl<C> Database<Update<read::discount::Activation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(activation): Update<read::discount::Activation>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::discount::Activation { today } = activation;

        const SQL: &str = "\
            UPDATE listing_discounts \
            SET status = $1::INT2 \
            WHERE status = $2::INT2 \
              AND window_start <= $3::DATE \
              AND window_end >= $3::DATE";
        self.exec(
            SQL,
            &[&discount::Status::Active, &discount::Status::Inactive, &today],
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<read::discount::Expiration>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(expiration): Update<read::discount::Expiration>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::discount::Expiration { today } = expiration;

        const SQL: &str = "\
            UPDATE listing_discounts \
            SET status = $1::INT2 \
            WHERE status NOT IN (SELECT unnest($2::INT2[]) LIMIT $3::INT4) \
              AND window_end < $4::DATE";
        self.exec(
            SQL,
            &[
                &discount::Status::Expired,
                &[discount::Status::Expired, discount::Status::Deactivated]
                    .as_slice(),
                &2i32,
                &today,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
    }
}
