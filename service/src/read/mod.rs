//! Read entities definitions.

pub mod discount;
pub mod rental_option;
pub mod transaction;
