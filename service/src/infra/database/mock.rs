//! In-memory [`Database`] for exercising the domain logic in tests.

use std::{
    cmp::Reverse,
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tokio::sync::OwnedMutexGuard;
use tracerr::Traced;

use crate::{
    domain::{
        discount, listing, rental_option,
        transaction::{self, Occupancy},
        user, Discount, Listing, RentalOption, Transaction,
    },
    read,
};

use super::{Database, Error};

/// In-memory [`Database`] backed by plain collections.
///
/// Cloning a [`Mock`] yields a handle to the same storage. A [`Transact`]ed
/// handle serves as its own transaction: the per-[`Listing`] locks it takes
/// are held until its [`Commit`], or released on drop.
#[derive(Clone, Debug, Default)]
pub(crate) struct Mock {
    /// Storage shared by every handle.
    state: Arc<Mutex<State>>,

    /// Per-[`Listing`] locks shared by every handle.
    locks: Arc<Mutex<HashMap<listing::Id, Arc<tokio::sync::Mutex<()>>>>>,

    /// [`Listing`] locks held by this handle.
    held: Arc<Mutex<Vec<OwnedMutexGuard<()>>>>,
}

/// Storage of a [`Mock`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`Listing`]s.
    listings: HashMap<listing::Id, Listing>,

    /// Stored [`RentalOption`]s.
    rental_options: HashMap<rental_option::Id, RentalOption>,

    /// Stored [`Discount`]s.
    discounts: HashMap<discount::Id, Discount>,

    /// Stored [`Transaction`]s.
    transactions: HashMap<transaction::Id, Transaction>,

    /// IDs of the existing users.
    users: HashSet<user::Id>,
}

impl Mock {
    /// Creates a new empty [`Mock`] database.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Locks the storage of this [`Mock`] database.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Returns the lock serializing mutations upon the [`Listing`] with the
    /// provided ID.
    fn listing_lock(&self, id: listing::Id) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.locks.lock().unwrap().entry(id).or_default())
    }

    /// Takes the lock upon the [`Listing`] with the provided ID, the way a
    /// concurrent transaction holds it until its commit.
    pub(crate) async fn hold_listing_lock(
        &self,
        id: listing::Id,
    ) -> OwnedMutexGuard<()> {
        self.listing_lock(id).lock_owned().await
    }

    /// Seeds this [`Mock`] database with the provided [`Listing`].
    pub(crate) fn given_listing(&self, listing: Listing) {
        _ = self.state().listings.insert(listing.id, listing);
    }

    /// Seeds this [`Mock`] database with the provided [`RentalOption`].
    pub(crate) fn given_rental_option(&self, option: RentalOption) {
        _ = self.state().rental_options.insert(option.id, option);
    }

    /// Seeds this [`Mock`] database with the provided [`Discount`].
    pub(crate) fn given_discount(&self, discount: Discount) {
        _ = self.state().discounts.insert(discount.id, discount);
    }

    /// Seeds this [`Mock`] database with the provided [`Transaction`].
    pub(crate) fn given_transaction(&self, transaction: Transaction) {
        _ = self
            .state()
            .transactions
            .insert(transaction.id(), transaction);
    }

    /// Seeds this [`Mock`] database with a user having the provided ID.
    pub(crate) fn given_user(&self, id: user::Id) {
        _ = self.state().users.insert(id);
    }

    /// Returns the stored [`RentalOption`] with the provided ID.
    pub(crate) fn rental_option(
        &self,
        id: rental_option::Id,
    ) -> Option<RentalOption> {
        self.state().rental_options.get(&id).cloned()
    }

    /// Returns the stored [`Discount`] with the provided ID.
    pub(crate) fn discount(&self, id: discount::Id) -> Option<Discount> {
        self.state().discounts.get(&id).cloned()
    }

    /// Returns the stored [`Transaction`] with the provided ID.
    pub(crate) fn transaction(
        &self,
        id: transaction::Id,
    ) -> Option<Transaction> {
        self.state().transactions.get(&id).cloned()
    }

    /// Returns all the stored [`Transaction`]s.
    pub(crate) fn transactions(&self) -> Vec<Transaction> {
        self.state().transactions.values().cloned().collect()
    }
}

impl Database<Transact> for Mock {
    type Ok = Self;
    type Err = Traced<Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Self {
            state: Arc::clone(&self.state),
            locks: Arc::clone(&self.locks),
            held: Arc::default(),
        })
    }
}

impl Database<Commit> for Mock {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.held.lock().unwrap().clear();
        Ok(())
    }
}

impl Database<Lock<By<Listing, listing::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let guard = self.listing_lock(by.into_inner()).lock_owned().await;
        self.held.lock().unwrap().push(guard);
        Ok(())
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Mock {
    type Ok = Option<Listing>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().listings.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<user::Id>, [user::Id; 2]>>> for Mock {
    type Ok = Vec<user::Id>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<user::Id>, [user::Id; 2]>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        Ok(self
            .state()
            .users
            .iter()
            .copied()
            .filter(|id| ids.contains(id))
            .collect())
    }
}

impl Database<Select<By<Option<RentalOption>, rental_option::Id>>> for Mock {
    type Ok = Option<RentalOption>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RentalOption>, rental_option::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().rental_options.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<RentalOption>, read::rental_option::ActiveOf>>>
    for Mock
{
    type Ok = Vec<RentalOption>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<RentalOption>, read::rental_option::ActiveOf>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_option::ActiveOf { listing_id } = by.into_inner();
        let mut options = self
            .state()
            .rental_options
            .values()
            .filter(|o| o.listing_id == listing_id && o.is_active)
            .cloned()
            .collect::<Vec<_>>();
        options.sort_unstable_by_key(|o| (o.unit.u8(), o.duration));
        Ok(options)
    }
}

impl
    Database<
        Select<By<Option<rental_option::Id>, read::rental_option::BaseTier>>,
    > for Mock
{
    type Ok = Option<rental_option::Id>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<rental_option::Id>, read::rental_option::BaseTier>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_option::BaseTier {
            listing_id,
            unit,
            excluding,
        } = by.into_inner();
        Ok(self
            .state()
            .rental_options
            .values()
            .find(|o| {
                o.listing_id == listing_id
                    && o.unit == unit
                    && o.is_active
                    && o.is_base_tier()
                    && Some(o.id) != excluding
            })
            .map(|o| o.id))
    }
}

impl
    Database<
        Select<By<Option<rental_option::Id>, read::rental_option::Sibling>>,
    > for Mock
{
    type Ok = Option<rental_option::Id>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<rental_option::Id>, read::rental_option::Sibling>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_option::Sibling {
            listing_id,
            unit,
            excluding,
        } = by.into_inner();
        Ok(self
            .state()
            .rental_options
            .values()
            .find(|o| {
                o.listing_id == listing_id
                    && o.unit == unit
                    && o.is_active
                    && o.id != excluding
            })
            .map(|o| o.id))
    }
}

impl Database<Insert<RentalOption>> for Mock {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(option): Insert<RentalOption>,
    ) -> Result<Self::Ok, Self::Err> {
        self.given_rental_option(option);
        Ok(())
    }
}

impl Database<Update<RentalOption>> for Mock {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(option): Update<RentalOption>,
    ) -> Result<Self::Ok, Self::Err> {
        self.given_rental_option(option);
        Ok(())
    }
}

impl Database<Select<By<Option<Discount>, discount::Id>>> for Mock {
    type Ok = Option<Discount>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Discount>, discount::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().discounts.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<Discount>, read::discount::ActiveOf>>> for Mock {
    type Ok = Vec<Discount>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Discount>, read::discount::ActiveOf>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::discount::ActiveOf { listing_id } = by.into_inner();
        let mut active = self
            .state()
            .discounts
            .values()
            .filter(|d| {
                d.listing_id == listing_id
                    && d.status == discount::Status::Active
            })
            .cloned()
            .collect::<Vec<_>>();
        active.sort_unstable_by_key(|d| d.created_at);
        Ok(active)
    }
}

impl Database<Insert<Discount>> for Mock {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(discount): Insert<Discount>,
    ) -> Result<Self::Ok, Self::Err> {
        self.given_discount(discount);
        Ok(())
    }
}

impl Database<Update<Discount>> for Mock {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(discount): Update<Discount>,
    ) -> Result<Self::Ok, Self::Err> {
        self.given_discount(discount);
        Ok(())
    }
}

impl Database<Delete<By<Discount, discount::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Discount, discount::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.state().discounts.remove(&by.into_inner());
        Ok(())
    }
}

impl Database<Select<By<read::discount::Usage, discount::Id>>> for Mock {
    type Ok = read::discount::Usage;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::discount::Usage, discount::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let count = self
            .state()
            .transactions
            .values()
            .filter(|t| t.discount_id() == Some(id))
            .count();
        Ok(read::discount::Usage::from(i64::try_from(count).unwrap()))
    }
}

impl Database<Update<read::discount::Activation>> for Mock {
    type Ok = u64;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(pass): Update<read::discount::Activation>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut updated = 0;
        for d in self.state().discounts.values_mut() {
            if d.status == discount::Status::Inactive
                && d.period.contains(pass.today)
            {
                d.status = discount::Status::Active;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

impl Database<Update<read::discount::Expiration>> for Mock {
    type Ok = u64;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(pass): Update<read::discount::Expiration>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut updated = 0;
        for d in self.state().discounts.values_mut() {
            if !matches!(
                d.status,
                discount::Status::Expired | discount::Status::Deactivated,
            ) && d.period.is_past(pass.today)
            {
                d.status = discount::Status::Expired;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

impl Database<Select<By<Vec<Occupancy>, listing::Id>>> for Mock {
    type Ok = Vec<Occupancy>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Occupancy>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state()
            .transactions
            .values()
            .filter(|t| t.listing_id() == id)
            .filter_map(Transaction::occupancy)
            .collect())
    }
}

impl Database<Select<By<read::transaction::BookedDates, listing::Id>>>
    for Mock
{
    type Ok = read::transaction::BookedDates;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::transaction::BookedDates, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(read::transaction::BookedDates::collect(
            self.state()
                .transactions
                .values()
                .filter(|t| t.listing_id() == id)
                .filter_map(Transaction::occupancy),
        ))
    }
}

impl Database<Insert<Transaction>> for Mock {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(transaction): Insert<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        self.given_transaction(transaction);
        Ok(())
    }
}

impl Database<Select<By<Option<Transaction>, transaction::Id>>> for Mock {
    type Ok = Option<Transaction>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Transaction>, transaction::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().transactions.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<Transaction>, user::Id>>> for Mock {
    type Ok = Vec<Transaction>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Transaction>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut involved = self
            .state()
            .transactions
            .values()
            .filter(|t| t.buyer_id() == id || t.seller_id() == id)
            .cloned()
            .collect::<Vec<_>>();
        involved.sort_unstable_by_key(|t| Reverse(t.created_at()));
        Ok(involved)
    }
}

impl Database<Update<read::transaction::MarkPaid>> for Mock {
    type Ok = Option<Transaction>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(update): Update<read::transaction::MarkPaid>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::transaction::MarkPaid { id, at } = update;
        let mut state = self.state();
        Ok(state.transactions.get_mut(&id).and_then(|t| {
            (t.payment_status() == transaction::PaymentStatus::Unpaid).then(
                || {
                    t.mark_paid(at);
                    t.clone()
                },
            )
        }))
    }
}
