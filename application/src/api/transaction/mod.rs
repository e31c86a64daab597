//! [`Transaction`]-related definitions.

mod rent;
mod sale;

use common::{Date, DateTime, Price};
use derive_more::{Display, From, Into};
use juniper::{GraphQLEnum, GraphQLInterface, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::Context;

pub use self::{rent::Rent, sale::Sale};

/// Deal committed upon a `Listing`: a purchase or a rental booking.
#[derive(Clone, Debug, GraphQLInterface)]
#[graphql(context = Context, for = [Rent, Sale])]
pub struct Transaction {
    /// Unique identifier of the `Transaction`.
    id: Id,

    /// Full price of the `Transaction`.
    total_price: Price,

    /// Amount already paid.
    amount_paid: Price,

    /// Payment status of the `Transaction`.
    payment_status: PaymentStatus,

    /// Payment method of the `Transaction`.
    payment_method: PaymentMethod,

    /// `DateTime` when the `Transaction` was paid, if it was.
    payment_date: Option<DateTime>,

    /// Day the occupancy (or nominal handover) starts.
    check_in: Date,

    /// `DateTime` when the `Transaction` was created.
    created_at: DateTime,
}

impl From<domain::Transaction> for TransactionValue {
    fn from(transaction: domain::Transaction) -> Self {
        use domain::Transaction;

        match transaction {
            Transaction::Rent(t) => Self::Rent(t.into()),
            Transaction::Sale(t) => Self::Sale(t.into()),
        }
    }
}

/// Unique identifier of a `Transaction`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::transaction::Id)]
#[into(domain::transaction::Id)]
#[graphql(name = "TransactionId", transparent)]
pub struct Id(Uuid);

/// Kind of a `Transaction`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "TransactionKind")]
pub enum Kind {
    /// Purchase of a `Listing` as a whole.
    Sell,

    /// Rental booking of a `Listing`.
    Rent,
}

impl From<Kind> for domain::transaction::Kind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Sell => Self::Sell,
            Kind::Rent => Self::Rent,
        }
    }
}

/// Payment status of a `Transaction`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "TransactionPaymentStatus")]
pub enum PaymentStatus {
    /// The `Transaction` hasn't been fully paid yet.
    Unpaid,

    /// The `Transaction` is fully paid.
    Paid,
}

impl From<domain::transaction::PaymentStatus> for PaymentStatus {
    fn from(status: domain::transaction::PaymentStatus) -> Self {
        use domain::transaction::PaymentStatus as S;

        match status {
            S::Unpaid => Self::Unpaid,
            S::Paid => Self::Paid,
        }
    }
}

impl From<PaymentStatus> for domain::transaction::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Unpaid => Self::Unpaid,
            PaymentStatus::Paid => Self::Paid,
        }
    }
}

/// Payment method of a `Transaction`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "TransactionPaymentMethod")]
pub enum PaymentMethod {
    /// The `Transaction` is paid in cash.
    Cash,

    /// The `Transaction` is paid via Stripe.
    Stripe,
}

impl From<domain::transaction::PaymentMethod> for PaymentMethod {
    fn from(method: domain::transaction::PaymentMethod) -> Self {
        use domain::transaction::PaymentMethod as M;

        match method {
            M::Cash => Self::Cash,
            M::Stripe => Self::Stripe,
        }
    }
}

impl From<PaymentMethod> for domain::transaction::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Stripe => Self::Stripe,
        }
    }
}
