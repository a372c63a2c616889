//! Defines the transaction store trait.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    Error,
    models::{DatabaseID, Transaction, TransactionBuilder, TransactionKind, UserID},
};

/// Handles the creation and retrieval of transactions.
///
/// All read and write operations are scoped to an owner: a transaction is
/// only ever visible to the user that created it, and lookups for another
/// user's rows answer [Error::NotFound].
pub trait TransactionStore {
    /// Create a new transaction in the store.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve one of `user_id`'s transactions by its ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the transaction does not exist or belongs
    /// to another user.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<Transaction, Error>;

    /// Retrieve transactions from the store in the way defined by `query`.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error>;

    /// Apply `update` to one of `user_id`'s transactions.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the transaction does not exist or belongs
    /// to another user.
    fn update(
        &mut self,
        id: DatabaseID,
        user_id: UserID,
        update: TransactionUpdate,
    ) -> Result<Transaction, Error>;

    /// Delete one of `user_id`'s transactions.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the transaction does not exist or belongs
    /// to another user.
    fn delete(&mut self, id: DatabaseID, user_id: UserID) -> Result<(), Error>;
}

/// Defines how transactions should be fetched from [TransactionStore::get_query].
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    /// Only include transactions owned by this user.
    pub user_id: UserID,
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Only include transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Orders transactions by date in the order `sort_date`. None returns
    /// transactions in the order they are stored.
    pub sort_date: Option<SortOrder>,
}

impl TransactionQuery {
    /// A query for all of `user_id`'s transactions, in store order.
    pub fn for_user(user_id: UserID) -> Self {
        Self {
            user_id,
            date_range: None,
            kind: None,
            sort_date: None,
        }
    }

    /// Restrict the query to transactions within `date_range` (inclusive).
    pub fn date_range(mut self, date_range: RangeInclusive<Date>) -> Self {
        self.date_range = Some(date_range);
        self
    }

    /// Restrict the query to transactions of `kind`.
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sort the results by date in `order`.
    pub fn sort_date(mut self, order: SortOrder) -> Self {
        self.sort_date = Some(order);
        self
    }
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// A partial update to an existing transaction.
///
/// Fields left as `None` keep their current value. Callers are responsible
/// for validating new values (positive amount, no future date, visible
/// category) before applying the update.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    /// Move the transaction to a different category.
    pub category_id: Option<DatabaseID>,
    /// Change the amount.
    pub amount: Option<f64>,
    /// Change the direction of the money flow.
    pub kind: Option<TransactionKind>,
    /// Change the date the transaction happened.
    pub date: Option<Date>,
    /// Replace the note.
    pub note: Option<String>,
}
