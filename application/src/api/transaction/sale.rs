use common::{Date, DateTime, DateTimeOf, Handler as _, Price};
use derive_more::From;
use juniper::graphql_object;
use service::{domain, query};

#[cfg(doc)]
use crate::api::{Listing, Transaction};
use crate::{api, AsError, Context, Error};

use super::{Id, PaymentMethod, PaymentStatus, TransactionValue};

/// [`Transaction`] purchasing a sell-kind [`Listing`] as a whole.
#[derive(Clone, Debug, From)]
pub struct Sale(domain::transaction::Sale);

/// `Transaction` purchasing a sell-kind `Listing` as a whole.
#[graphql_object(
    name = "SaleTransaction",
    context = Context,
    impl = TransactionValue,
)]
impl Sale {
    /// Unique identifier of this `Transaction`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `Listing` purchased by this `Transaction`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.listing",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn listing(&self) -> api::Listing {
        #[expect(
            unsafe_code,
            reason = "`Transaction` loaded from repository guarantees \
                      `Listing` existence"
        )]
        unsafe {
            api::Listing::new_unchecked(self.0.listing_id)
        }
    }

    /// ID of the purchasing user.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.buyerId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn buyer_id(&self) -> api::user::Id {
        self.0.buyer_id.into()
    }

    /// ID of the user being paid.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.sellerId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn seller_id(&self) -> api::user::Id {
        self.0.seller_id.into()
    }

    /// Nominal handover day of the purchase.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.checkIn",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn check_in(&self) -> Date {
        self.0.check_in.coerce()
    }

    /// Full price of this `Transaction`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.totalPrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn total_price(&self) -> Price {
        self.0.total_price
    }

    /// Amount already paid.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.amountPaid",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn amount_paid(&self) -> Price {
        self.0.amount_paid
    }

    /// Payment status of this `Transaction`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.paymentStatus",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn payment_status(&self) -> PaymentStatus {
        self.0.payment_status.into()
    }

    /// Payment method of this `Transaction`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.paymentMethod",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn payment_method(&self) -> PaymentMethod {
        self.0.payment_method.into()
    }

    /// `DateTime` when this `Transaction` was paid, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.paymentDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn payment_date(&self) -> Option<DateTime> {
        self.0.payment_date.map(DateTimeOf::coerce)
    }

    /// `Discount` applied to this `Transaction`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.discount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn discount(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Discount>, Error> {
        let Some(id) = self.0.discount_id else {
            return Ok(None);
        };
        ctx.service()
            .execute(query::discount::ById::by(id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::query::DiscountError::NotExists.into())
            .map(|discount| Some(discount.into()))
    }

    /// `RentalOption` this `Transaction` was priced by, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.rentalOption",
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

    /// `DateTime` when this `Transaction` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "SaleTransaction.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}
