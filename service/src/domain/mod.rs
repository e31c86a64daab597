//! Domain definitions.

pub mod discount;
pub mod listing;
pub mod rental_option;
pub mod transaction;
pub mod user;

pub use self::{
    discount::Discount, listing::Listing, rental_option::RentalOption,
    transaction::Transaction,
};
