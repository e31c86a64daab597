//! Domain [`Event`]s emitted by the [`Service`].
//!
//! [`Service`]: crate::Service

use std::convert::Infallible;

use common::Percent;
use tokio::sync::broadcast;
use tracing as log;

use crate::domain::{discount, listing, transaction, user};
#[cfg(doc)]
use crate::{
    domain::{Discount, Transaction},
    Service,
};

/// Event published by the [`Service`] after a successful commit.
///
/// Consumed by the external notification collaborator. Delivery is
/// best-effort: a missing or slow consumer never affects the committed
/// operation.
#[derive(Clone, Debug)]
pub enum Event {
    #[doc(hidden)]
    TransactionCreated(TransactionCreated),
    #[doc(hidden)]
    DiscountCreated(DiscountCreated),
}

/// [`Event`] of a [`Transaction`] creation.
#[derive(Clone, Copy, Debug)]
pub struct TransactionCreated {
    /// ID of the created [`Transaction`].
    pub transaction_id: transaction::Id,

    /// ID of the [`Listing`] transacted upon.
    ///
    /// [`Listing`]: crate::domain::Listing
    pub listing_id: listing::Id,

    /// ID of the buying user.
    pub buyer_id: user::Id,

    /// ID of the selling user.
    pub seller_id: user::Id,
}

/// [`Event`] of a [`Discount`] creation.
#[derive(Clone, Debug)]
pub struct DiscountCreated {
    /// ID of the created [`Discount`].
    pub discount_id: discount::Id,

    /// ID of the discounted [`Listing`].
    ///
    /// [`Listing`]: crate::domain::Listing
    pub listing_id: listing::Id,

    /// Name of the [`Discount`].
    pub name: discount::Name,

    /// Percentage the [`Discount`] takes off.
    pub percentage: Percent,
}

/// Capacity of the [`Event`]s channel.
///
/// A consumer lagging behind more than this many [`Event`]s loses the oldest
/// ones.
pub(crate) const CHANNEL_CAPACITY: usize = 256;

/// Relays [`Event`]s of the provided channel into the log, as the handoff
/// point for the external notification collaborator.
///
/// Runs until every [`broadcast::Sender`] of the channel is dropped.
pub(crate) async fn relay(
    mut events: broadcast::Receiver<Event>,
) -> Result<(), Infallible> {
    loop {
        match events.recv().await {
            Ok(Event::TransactionCreated(ev)) => {
                log::info!(
                    "`Transaction(id: {})` created upon \
                     `Listing(id: {})` by `User(id: {})` \
                     from `User(id: {})`",
                    ev.transaction_id,
                    ev.listing_id,
                    ev.buyer_id,
                    ev.seller_id,
                );
            }
            Ok(Event::DiscountCreated(ev)) => {
                log::info!(
                    "`Discount(id: {}, name: {}, percentage: {})` created \
                     upon `Listing(id: {})`",
                    ev.discount_id,
                    ev.name,
                    ev.percentage,
                    ev.listing_id,
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("{skipped} `Event`(s) skipped by a lagging relay");
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}
