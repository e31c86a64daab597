//! GraphQL [`Subscription`]s definitions.

use common::Percent;
use futures::{
    stream::{self, BoxStream},
    StreamExt as _,
};
use juniper::{graphql_subscription, GraphQLObject};
use service::{event, Event};
use tokio::sync::broadcast;

use crate::{api, Context, Error};

/// Root of all GraphQL subscriptions.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription notifying about every created `Transaction`.
    ///
    /// A subscriber lagging behind the events channel capacity loses the
    /// oldest notifications.
    pub async fn transaction_created(
        &self,
        ctx: &Context,
    ) -> BoxStream<'static, Result<TransactionCreated, Error>> {
        stream::unfold(ctx.service().subscribe(), |mut events| async move {
            loop {
                match events.recv().await {
                    Ok(Event::TransactionCreated(ev)) => {
                        return Some((Ok(ev.into()), events));
                    }
                    Ok(Event::DiscountCreated(_))
                    | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }

    /// Subscription notifying about every created `Discount`.
    ///
    /// A subscriber lagging behind the events channel capacity loses the
    /// oldest notifications.
    pub async fn discount_created(
        &self,
        ctx: &Context,
    ) -> BoxStream<'static, Result<DiscountCreated, Error>> {
        stream::unfold(ctx.service().subscribe(), |mut events| async move {
            loop {
                match events.recv().await {
                    Ok(Event::DiscountCreated(ev)) => {
                        return Some((Ok(ev.into()), events));
                    }
                    Ok(Event::TransactionCreated(_))
                    | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

/// Notification about a created `Transaction`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(context = Context, name = "TransactionCreatedEvent")]
pub struct TransactionCreated {
    /// ID of the created `Transaction`.
    pub transaction_id: api::transaction::Id,

    /// ID of the `Listing` transacted upon.
    pub listing_id: api::listing::Id,

    /// ID of the buying `User`.
    pub buyer_id: api::user::Id,

    /// ID of the selling `User`.
    pub seller_id: api::user::Id,
}

impl From<event::TransactionCreated> for TransactionCreated {
    fn from(ev: event::TransactionCreated) -> Self {
        Self {
            transaction_id: ev.transaction_id.into(),
            listing_id: ev.listing_id.into(),
            buyer_id: ev.buyer_id.into(),
            seller_id: ev.seller_id.into(),
        }
    }
}

/// Notification about a created `Discount`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "DiscountCreatedEvent")]
pub struct DiscountCreated {
    /// ID of the created `Discount`.
    pub discount_id: api::discount::Id,

    /// ID of the discounted `Listing`.
    pub listing_id: api::listing::Id,

    /// Name of the created `Discount`.
    pub name: api::discount::Name,

    /// Percentage the created `Discount` takes off.
    pub percentage: Percent,
}

impl From<event::DiscountCreated> for DiscountCreated {
    fn from(ev: event::DiscountCreated) -> Self {
        Self {
            discount_id: ev.discount_id.into(),
            listing_id: ev.listing_id.into(),
            name: ev.name.into(),
            percentage: ev.percentage,
        }
    }
}
