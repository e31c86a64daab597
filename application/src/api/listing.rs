//! [`Listing`]-related definitions.

use std::future;

use common::{Date, DateTime, Handler as _, Price};
use derive_more::{Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, read};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// A marketplace listing.
///
/// Listings themselves are managed by an external collaborator: this engine
/// only reads them to drive availability and pricing.
#[derive(Clone, Debug, From)]
pub struct Listing {
    /// ID of this [`Listing`].
    id: Id,

    /// Underlying [`domain::Listing`].
    listing: OnceCell<domain::Listing>,
}

impl From<domain::Listing> for Listing {
    fn from(listing: domain::Listing) -> Self {
        Self {
            id: listing.id.into(),
            listing: OnceCell::new_with(Some(listing)),
        }
    }
}

impl Listing {
    /// Creates a new [`Listing`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Listing`] with the provided ID exists,
    /// otherwise accessing this [`Listing`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            listing: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Listing`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Listing`] doesn't exist.
    async fn listing(&self, ctx: &Context) -> Result<&domain::Listing, Error> {
        let id = self.id.into();
        self.listing
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::listing::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|l| {
                        future::ready(l.ok_or_else(|| {
                            api::query::ListingError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A marketplace listing.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Kind of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.kind",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn kind(&self, ctx: &Context) -> Result<Kind, Error> {
        Ok(self.listing(ctx).await?.kind.into())
    }

    /// Status of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.listing(ctx).await?.status.into())
    }

    /// Sale price of this `Listing`, if it has one.
    ///
    /// Rent-kind `Listing`s are priced per `RentalOption` instead.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price(&self, ctx: &Context) -> Result<Option<Price>, Error> {
        Ok(self.listing(ctx).await?.price)
    }

    /// Indicator whether this `Listing` is available on the marketplace.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.isAvailable",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_available(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.listing(ctx).await?.is_available)
    }

    /// ID of the user owning this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.ownerId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn owner_id(
        &self,
        ctx: &Context,
    ) -> Result<api::user::Id, Error> {
        Ok(self.listing(ctx).await?.owner_id.into())
    }

    /// Active `RentalOption`s of this `Listing`.
    ///
    /// Empty for a sell-kind `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.rentalOptions",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn rental_options(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::RentalOption>, Error> {
        ctx.service()
            .execute(query::rental_options::Active::by(
                read::rental_option::ActiveOf {
                    listing_id: self.id.into(),
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|options| options.into_iter().map(Into::into).collect())
    }

    /// `Discount`s of this `Listing` being active today.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.discounts",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn discounts(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Discount>, Error> {
        ctx.service()
            .execute(query::discounts::Active::by(read::discount::ActiveOf {
                listing_id: self.id.into(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|discounts| discounts.into_iter().map(Into::into).collect())
    }

    /// Calendar days occupied by the bookings of this `Listing`, in
    /// chronological order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.bookedDates",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn booked_dates(
        &self,
        ctx: &Context,
    ) -> Result<Vec<Date>, Error> {
        ctx.service()
            .execute(query::transactions::BookedDates::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|dates| dates.into_iter().collect())
    }

    /// `DateTime` when this `Listing` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.listing(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Listing`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::listing::Id)]
#[into(domain::listing::Id)]
#[graphql(name = "ListingId", transparent)]
pub struct Id(Uuid);

/// Kind of a `Listing`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ListingKind")]
pub enum Kind {
    /// The `Listing` is sold as a whole.
    Sell,

    /// The `Listing` is rented out per `RentalOption` tiers.
    Rent,
}

impl From<domain::listing::Kind> for Kind {
    fn from(kind: domain::listing::Kind) -> Self {
        use domain::listing::Kind as K;

        match kind {
            K::Sell => Self::Sell,
            K::Rent => Self::Rent,
        }
    }
}

/// Status of a `Listing`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ListingStatus")]
pub enum Status {
    /// The `Listing` is being drafted by its owner.
    Draft,

    /// The `Listing` is published on the marketplace.
    Published,
}

impl From<domain::listing::Status> for Status {
    fn from(status: domain::listing::Status) -> Self {
        use domain::listing::Status as S;

        match status {
            S::Draft => Self::Draft,
            S::Published => Self::Published,
        }
    }
}
