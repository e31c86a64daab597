//! [`RentalOption`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{rental_option, RentalOption},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C, IDs>
    Database<Select<By<HashMap<rental_option::Id, RentalOption>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[rental_option::Id]>,
{
    type Ok = HashMap<rental_option::Id, RentalOption>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<rental_option::Id, RentalOption>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[rental_option::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, listing_id, \
                   duration, unit, price, \
                   is_active, created_at \
            FROM rental_options \
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
                    RentalOption {
                        id,
                        listing_id: row.get("listing_id"),
                        duration: row.get("duration"),
                        unit: row.get("unit"),
                        price: row.get("price"),
                        is_active: row.get("is_active"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<RentalOption>, rental_option::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<
            By<
                HashMap<rental_option::Id, RentalOption>,
                [rental_option::Id; 1],
            >,
        >,
        Ok = HashMap<rental_option::Id, RentalOption>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<RentalOption>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RentalOption>, rental_option::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C>
    Database<Select<By<Vec<RentalOption>, read::rental_option::ActiveOf>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<
            By<
                HashMap<rental_option::Id, RentalOption>,
                Vec<rental_option::Id>,
            >,
        >,
        Ok = HashMap<rental_option::Id, RentalOption>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<RentalOption>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<RentalOption>, read::rental_option::ActiveOf>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_option::ActiveOf { listing_id } = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM rental_options \
            WHERE listing_id = $1::UUID \
              AND is_active \
            ORDER BY unit ASC, duration ASC";
        let ids = self
            .query(SQL, &[&listing_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| {
                rows.into_iter()
                    .map(|row| row.get("id"))
                    .collect::<Vec<_>>()
            })?;

        let mut options = self
            .execute(Select(
                By::<HashMap<rental_option::Id, RentalOption>, _>::new(
                    ids.clone(),
                ),
            ))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(ids.into_iter().filter_map(|id| options.remove(&id)).collect())
    }
}

impl<C>
    Database<
        Select<By<Option<rental_option::Id>, read::rental_option::BaseTier>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<rental_option::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<rental_option::Id>, read::rental_option::BaseTier>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_option::BaseTier { listing_id, unit, excluding } =
            by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM rental_options \
            WHERE listing_id = $1::UUID \
              AND unit = $2::INT2 \
              AND duration = $3::INT4 \
              AND is_active \
              AND id IS DISTINCT FROM $4::UUID \
            LIMIT 1";
        self.query_opt(
            SQL,
            &[&listing_id, &unit, &rental_option::Duration::BASE, &excluding],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| row.map(|r| r.get("id")))
    }
}

impl<C>
    Database<
        Select<By<Option<rental_option::Id>, read::rental_option::Sibling>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<rental_option::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<rental_option::Id>, read::rental_option::Sibling>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_option::Sibling { listing_id, unit, excluding } =
            by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM rental_options \
            WHERE listing_id = $1::UUID \
              AND unit = $2::INT2 \
              AND is_active \
              AND id <> $3::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&listing_id, &unit, &excluding])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map(|r| r.get("id")))
    }
}

impl<C> Database<Insert<RentalOption>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<RentalOption>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(option): Insert<RentalOption>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(option)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<RentalOption>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(option): Update<RentalOption>,
    ) -> Result<Self::Ok, Self::Err> {
        let RentalOption {
            id,
            listing_id,
            duration,
            unit,
            price,
            is_active,
            created_at,
        } = option;

        const SQL: &str = "\
            INSERT INTO rental_options (\
                id, listing_id, \
                duration, unit, price, \
                is_active, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::INT4, $4::INT2, $5::NUMERIC, \
                $6::BOOLEAN, $7::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET listing_id = EXCLUDED.listing_id, \
                duration = EXCLUDED.duration, \
                unit = EXCLUDED.unit, \
                price = EXCLUDED.price, \
                is_active = EXCLUDED.is_active, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &listing_id,
                &duration,
                &unit,
                &price,
                &is_active,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
