//! User-related definitions.
//!
//! Users are managed by an external collaborator, so their [`Id`] is the
//! whole GraphQL surface here: buyers, sellers and listing owners are
//! referenced by it.

use derive_more::{Display, From, Into};
use juniper::GraphQLScalar;
use service::domain;
use uuid::Uuid;

/// Unique identifier of a user.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);
