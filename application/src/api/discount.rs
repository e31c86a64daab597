//! [`Discount`]-related definitions.

use common::{Date, DateTime, Handler as _, Percent};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{command, domain, query};
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// Named percentage cut off a `Listing` price within a calendar window.
#[derive(Clone, Debug, From)]
pub struct Discount(domain::Discount);

/// Named percentage cut off a `Listing` price within a calendar window.
#[graphql_object(context = Context)]
impl Discount {
    /// Unique identifier of this `Discount`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Discount.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `Listing` this `Discount` applies to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Discount.listing",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn listing(&self) -> api::Listing {
        #[expect(
            unsafe_code,
            reason = "`Discount` loaded from repository guarantees `Listing` \
                      existence"
        )]
        unsafe {
            api::Listing::new_unchecked(self.0.listing_id)
        }
    }

    /// `RentalOption` this `Discount` is narrowed to.
    ///
    /// `null` means the `Discount` applies to all rental options of the
    /// `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Discount.rentalOption",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn rental_option(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::RentalOption>, Error> {
        let Some(id) = self.0.rental_option_id else {
            return Ok(None);
        };
        ctx.service()
            .execute(query::rental_option::ById::by(id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::query::RentalOptionError::NotExists.into())
            .map(|option| Some(option.into()))
    }

    /// Name of this `Discount`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Discount.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Percentage this `Discount` takes off.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Discount.percentage",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn percentage(&self) -> Percent {
        self.0.percentage
    }

    /// First day of the window this `Discount` is meant to be active in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Discount.startDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn start_date(&self) -> Date {
        self.0.period.start().coerce()
    }

    /// Last (inclusive) day of the window this `Discount` is meant to be
    /// active in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Discount.endDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn end_date(&self) -> Date {
        self.0.period.end().coerce()
    }

    /// Status of this `Discount`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Discount.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Discount` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Discount.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Discount`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::discount::Id)]
#[into(domain::discount::Id)]
#[graphql(name = "DiscountId", transparent)]
pub struct Id(Uuid);

/// Name of a `Discount`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DiscountName",
    with = scalar::Via::<domain::discount::Name>,
)]
pub struct Name(domain::discount::Name);

/// Status of a `Discount` lifecycle.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "DiscountStatus")]
pub enum Status {
    /// The `Discount` is created, but its window hasn't been entered yet.
    Inactive,

    /// The `Discount` window is entered, so it applies to the pricing.
    Active,

    /// The `Discount` window is over.
    Expired,

    /// The `Discount` was switched off manually, keeping the pricing history
    /// of the `Transaction`s referring to it.
    Deactivated,
}

impl From<domain::discount::Status> for Status {
    fn from(status: domain::discount::Status) -> Self {
        use domain::discount::Status as S;

        match status {
            S::Inactive => Self::Inactive,
            S::Active => Self::Active,
            S::Expired => Self::Expired,
            S::Deactivated => Self::Deactivated,
        }
    }
}

/// Result of a `Discount` deletion.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(context = Context, name = "DeleteDiscountResult")]
pub struct DeleteResult {
    /// Indicator whether the `Discount` was deactivated in place instead of
    /// being removed, because some `Transaction`s already refer to it.
    pub deactivated: bool,
}

impl From<command::delete_discount::Outcome> for DeleteResult {
    fn from(outcome: command::delete_discount::Outcome) -> Self {
        use command::delete_discount::Outcome;

        Self {
            deactivated: matches!(outcome, Outcome::Deactivated),
        }
    }
}
