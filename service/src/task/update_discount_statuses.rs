//! [`UpdateDiscountStatuses`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start, Update};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Discount;
use crate::{
    infra::{database, Database},
    read, Service,
};

use super::Task;

/// Configuration for [`UpdateDiscountStatuses`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`Discount`] statuses sweeps.
    pub interval: time::Duration,
}

/// [`Task`] for advancing [`Discount`] statuses along the calendar.
///
/// Activates `inactive` [`Discount`]s once their window is reached, and
/// expires any non-terminal ones whose window has fully passed. Soft-deleted
/// [`Discount`]s are terminal and so are never touched.
#[derive(Clone, Copy, Debug)]
pub struct UpdateDiscountStatuses<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<UpdateDiscountStatuses<Self>, Config>>> for Service<Db>
where
    UpdateDiscountStatuses<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<UpdateDiscountStatuses<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = UpdateDiscountStatuses {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::UpdateDiscountStatuses` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for UpdateDiscountStatuses<Service<Db>>
where
    Db: Database<
            Update<read::discount::Activation>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<
            Update<read::discount::Expiration>,
            Ok = u64,
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let today = self.service.clock().today();

        let activated = self
            .service
            .database()
            .execute(Update(read::discount::Activation { today }))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if activated > 0 {
            log::info!("{activated} `Discount`(s) activated");
        }

        let expired = self
            .service
            .database()
            .execute(Update(read::discount::Expiration { today }))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if expired > 0 {
            log::info!("{expired} `Discount`(s) expired");
        }

        Ok(())
    }
}

/// Error of [`UpdateDiscountStatuses`] execution.
pub type ExecutionError = Traced<database::Error>;
