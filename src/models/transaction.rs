//! This file defines the type `Transaction`, the core type of the finance
//! tracking part of the application, and its builder.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    models::{DatabaseID, UserID},
};

/// Whether a transaction records money earned or money spent.
///
/// Transaction amounts are always non-negative; the direction of the money
/// flow is carried by this kind, never by the sign of the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in, e.g. wages.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
}

impl TransactionKind {
    /// The lowercase string form used in the database and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(format!("unknown transaction kind: {s}")),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|text| text.parse().map_err(|_| FromSqlError::InvalidType))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build] and pass the
/// builder to the transaction store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: DatabaseID,
    user_id: UserID,
    category_id: DatabaseID,
    amount: f64,
    kind: TransactionKind,
    date: Date,
    note: String,
    created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder::new] for discoverability.
    pub fn build(
        amount: f64,
        kind: TransactionKind,
        category_id: DatabaseID,
        user_id: UserID,
    ) -> Result<TransactionBuilder, Error> {
        TransactionBuilder::new(amount, kind, category_id, user_id)
    }

    /// Create a transaction from its parts without validation.
    ///
    /// This is intended for store implementations mapping database rows,
    /// where the parts were validated on the way in.
    pub fn new_unchecked(
        id: DatabaseID,
        user_id: UserID,
        category_id: DatabaseID,
        amount: f64,
        kind: TransactionKind,
        date: Date,
        note: String,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            user_id,
            category_id,
            amount,
            kind,
            date,
            note,
            created_at,
        }
    }

    /// The ID of the transaction.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user that owns this transaction.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The category that describes this transaction.
    pub fn category_id(&self) -> DatabaseID {
        self.category_id
    }

    /// The amount of money spent or earned. Always non-negative.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether the transaction is income or an expense.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// When the transaction happened.
    pub fn date(&self) -> Date {
        self.date
    }

    /// A free-text note on what the transaction was for.
    pub fn note(&self) -> &str {
        &self.note
    }

    /// When the transaction was recorded.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

/// Builder for creating a new [Transaction].
///
/// The builder is finalized by passing it to
/// [TransactionStore::create](crate::stores::TransactionStore::create).
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    pub(crate) user_id: UserID,
    pub(crate) category_id: DatabaseID,
    pub(crate) amount: f64,
    pub(crate) kind: TransactionKind,
    pub(crate) date: Date,
    pub(crate) note: String,
}

impl TransactionBuilder {
    /// Create a builder with the given amount, kind, category, and owner.
    ///
    /// The date defaults to today (UTC) and the note to an empty string.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `amount` is zero, negative, or not
    /// finite.
    pub fn new(
        amount: f64,
        kind: TransactionKind,
        category_id: DatabaseID,
        user_id: UserID,
    ) -> Result<Self, Error> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        Ok(Self {
            user_id,
            category_id,
            amount,
            kind,
            date: OffsetDateTime::now_utc().date(),
            note: String::new(),
        })
    }

    /// Set the date of the transaction.
    ///
    /// # Errors
    ///
    /// Returns [Error::FutureDate] if `date` is after today (UTC), since
    /// transactions record events that have already happened.
    pub fn date(mut self, date: Date) -> Result<Self, Error> {
        if date > OffsetDateTime::now_utc().date() {
            return Err(Error::FutureDate(date));
        }

        self.date = date;
        Ok(self)
    }

    /// Set the note of the transaction.
    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }
}
