//! [`RentalOption`]-related definitions.

use common::{DateTime, Price};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// Bookable duration tier of a rent-kind `Listing`.
#[derive(Clone, Debug, From)]
pub struct RentalOption(domain::RentalOption);

/// Bookable duration tier of a rent-kind `Listing`.
#[graphql_object(context = Context)]
impl RentalOption {
    /// Unique identifier of this `RentalOption`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalOption.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `Listing` this `RentalOption` belongs to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalOption.listing",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn listing(&self) -> api::Listing {
        #[expect(
            unsafe_code,
            reason = "`RentalOption` loaded from repository guarantees \
                      `Listing` existence"
        )]
        unsafe {
            api::Listing::new_unchecked(self.0.listing_id)
        }
    }

    /// Number of `unit`s this `RentalOption` covers.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalOption.duration",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn duration(&self) -> i32 {
        self.0.duration.into()
    }

    /// Calendar unit the `duration` is measured in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalOption.unit",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn unit(&self) -> Unit {
        self.0.unit.into()
    }

    /// Price of a single booking of this `RentalOption`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalOption.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn price(&self) -> Price {
        self.0.price
    }

    /// Indicator whether this `RentalOption` is currently bookable.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalOption.isActive",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn is_active(&self) -> bool {
        self.0.is_active
    }

    /// `DateTime` when this `RentalOption` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalOption.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `RentalOption`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::rental_option::Id)]
#[into(domain::rental_option::Id)]
#[graphql(name = "RentalOptionId", transparent)]
pub struct Id(Uuid);

/// Calendar unit a `RentalOption` duration is measured in.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "RentalOptionUnit")]
pub enum Unit {
    /// Calendar day.
    Day,

    /// Calendar week.
    Week,

    /// Calendar month.
    Month,

    /// Calendar year.
    Year,
}

impl From<domain::rental_option::Unit> for Unit {
    fn from(unit: domain::rental_option::Unit) -> Self {
        use domain::rental_option::Unit as U;

        match unit {
            U::Day => Self::Day,
            U::Week => Self::Week,
            U::Month => Self::Month,
            U::Year => Self::Year,
        }
    }
}

impl From<Unit> for domain::rental_option::Unit {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Day => Self::Day,
            Unit::Week => Self::Week,
            Unit::Month => Self::Month,
            Unit::Year => Self::Year,
        }
    }
}
