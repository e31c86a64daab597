//! Background [`Task`]s definitions.

mod background;
pub mod update_discount_statuses;

pub use common::Handler as Task;

pub use self::{
    background::Background, update_discount_statuses::UpdateDiscountStatuses,
};
