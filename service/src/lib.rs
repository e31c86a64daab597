//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod event;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;
#[cfg(test)]
mod testing;

use common::{
    operations::{By, Start},
    Clock,
};
use derive_more::Error;
use tokio::sync::broadcast;

#[cfg(doc)]
use infra::Database;

pub use self::{
    command::Command, event::Event, query::Query, task::Task,
};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// [`task::UpdateDiscountStatuses`] configuration.
    pub update_discount_statuses: task::update_discount_statuses::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Clock`] driving all the calendar decisions of this [`Service`].
    clock: Clock,

    /// Channel publishing domain [`Event`]s of this [`Service`].
    events: broadcast::Sender<Event>,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        clock: Clock,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::UpdateDiscountStatuses<Self>,
                        task::update_discount_statuses::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let (events, relayed) = broadcast::channel(event::CHANNEL_CAPACITY);
        let this = Service {
            config,
            database,
            clock,
            events,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().update_discount_statuses)))
                .await
        });
        bg.spawn(event::relay(relayed));

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Clock`] of this [`Service`].
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Subscribes to domain [`Event`]s of this [`Service`].
    ///
    /// Only [`Event`]s published after this call are received.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Publishes the provided [`Event`].
    ///
    /// Delivery is best-effort: the [`Event`] is lost if no subscriber is
    /// listening at the moment.
    pub(crate) fn publish(&self, event: Event) {
        _ = self.events.send(event);
    }
}
