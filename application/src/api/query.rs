//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the active `RentalOption`s of the specified `Listing`.
    ///
    /// A sell-kind `Listing` owns no options, so yields an empty list.
    #[tracing::instrument(
        skip_all,
        fields(
            listing_id = %listing_id,
            gql.name = "rentalOptions",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn rental_options(
        listing_id: api::listing::Id,
        ctx: &Context,
    ) -> Result<Vec<api::RentalOption>, Error> {
        ctx.service()
            .execute(query::rental_options::Active::by(
                read::rental_option::ActiveOf {
                    listing_id: listing_id.into(),
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|options| options.into_iter().map(Into::into).collect())
    }

    /// Returns the `Discount`s of the specified `Listing` being active today.
    #[tracing::instrument(
        skip_all,
        fields(
            listing_id = %listing_id,
            gql.name = "discounts",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn discounts(
        listing_id: api::listing::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Discount>, Error> {
        ctx.service()
            .execute(query::discounts::Active::by(read::discount::ActiveOf {
                listing_id: listing_id.into(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|discounts| discounts.into_iter().map(Into::into).collect())
    }

    /// Returns the calendar days occupied by the bookings of the specified
    /// `Listing`, in chronological order.
    #[tracing::instrument(
        skip_all,
        fields(
            listing_id = %listing_id,
            gql.name = "bookedDates",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn booked_dates(
        listing_id: api::listing::Id,
        ctx: &Context,
    ) -> Result<Vec<Date>, Error> {
        ctx.service()
            .execute(query::transactions::BookedDates::by(listing_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|dates| dates.into_iter().collect())
    }

    /// Returns the `Transaction` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `TRANSACTION_NOT_EXISTS` - the `Transaction` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "transaction",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn transaction(
        id: api::transaction::Id,
        ctx: &Context,
    ) -> Result<api::TransactionValue, Error> {
        ctx.service()
            .execute(query::transaction::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| TransactionError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Transaction`s involving the specified user as a buyer or
    /// a seller, newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            user_id = %user_id,
            gql.name = "transactions",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn transactions(
        user_id: api::user::Id,
        ctx: &Context,
    ) -> Result<Vec<api::TransactionValue>, Error> {
        ctx.service()
            .execute(query::transactions::OfUser::by(user_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|transactions| {
                transactions.into_iter().map(Into::into).collect()
            })
    }
}

define_error! {
    enum DiscountError {
        #[code = "DISCOUNT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Discount` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum ListingError {
        #[code = "LISTING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum RentalOptionError {
        #[code = "RENTAL_OPTION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`RentalOption` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum TransactionError {
        #[code = "TRANSACTION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Transaction` with the specified ID does not exist"]
        NotExists,
    }
}
