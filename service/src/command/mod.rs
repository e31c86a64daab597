//! [`Command`] definition.

pub mod cancel_rental_option;
pub mod create_discount;
pub mod create_rental_option;
pub mod create_transaction;
pub mod delete_discount;
pub mod mark_transaction_paid;
pub mod update_rental_option;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_rental_option::CancelRentalOption, create_discount::CreateDiscount,
    create_rental_option::CreateRentalOption,
    create_transaction::CreateTransaction, delete_discount::DeleteDiscount,
    mark_transaction_paid::MarkTransactionPaid,
    update_rental_option::UpdateRentalOption,
};
