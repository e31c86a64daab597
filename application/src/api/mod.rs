//! GraphQL API definitions.

pub mod discount;
pub mod listing;
mod mutation;
mod query;
pub mod rental_option;
pub mod scalar;
mod subscription;
pub mod transaction;
pub mod user;

pub use self::{
    discount::Discount,
    listing::Listing,
    mutation::Mutation,
    query::Query,
    rental_option::RentalOption,
    subscription::Subscription,
    transaction::{Transaction, TransactionValue},
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;
