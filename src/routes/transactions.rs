//! This file defines the API routes for transactions.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::Claims,
    models::{DatabaseID, Transaction, TransactionKind, UserID},
    stores::{
        CategoryStore, SortOrder, TransactionQuery, TransactionStore, TransactionUpdate, UserStore,
    },
};

/// The JSON body for creating a transaction.
///
/// The category may be given by ID or by name; exactly one is required. The
/// date defaults to today when absent.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionData {
    /// The ID of a category visible to the user.
    pub category_id: Option<DatabaseID>,
    /// The name of a category visible to the user, matched
    /// case-insensitively.
    pub category_name: Option<String>,
    /// The amount of money. Must be greater than zero.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened. Defaults to today.
    pub date: Option<Date>,
    /// A free-text note.
    pub note: Option<String>,
}

/// The JSON body for updating a transaction. All fields are optional; absent
/// fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionData {
    /// Move the transaction to the category with this ID.
    pub category_id: Option<DatabaseID>,
    /// Move the transaction to the category with this name.
    pub category_name: Option<String>,
    /// Change the amount. Must be greater than zero.
    pub amount: Option<f64>,
    /// Change the direction of the money flow.
    pub kind: Option<TransactionKind>,
    /// Change the date the transaction happened.
    pub date: Option<Date>,
    /// Replace the note.
    pub note: Option<String>,
}

/// The response to listing transactions.
#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    /// The user's transactions, most recent first.
    pub transactions: Vec<Transaction>,
    /// How many transactions were found.
    pub count: usize,
}

/// Resolve a category reference (by ID or by name) to a category ID that is
/// visible to `user_id`.
fn resolve_category<C>(
    categories: &C,
    user_id: UserID,
    category_id: Option<DatabaseID>,
    category_name: Option<&str>,
) -> Result<DatabaseID, Error>
where
    C: CategoryStore,
{
    if let Some(id) = category_id {
        let category = categories.get(id).map_err(|error| match error {
            Error::NotFound => Error::InvalidCategory,
            error => error,
        })?;

        if !category.is_visible_to(user_id) {
            return Err(Error::InvalidCategory);
        }

        Ok(id)
    } else if let Some(name) = category_name {
        categories
            .find_by_name(name, user_id)?
            .map(|category| category.id())
            .ok_or(Error::InvalidCategory)
    } else {
        Err(Error::InvalidCategory)
    }
}

/// A route handler for listing the user's transactions, most recent first.
pub async fn get_transactions<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
) -> Result<Json<TransactionListResponse>, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let transactions = state.transaction_store.get_query(
        TransactionQuery::for_user(claims.user_id()).sort_date(SortOrder::Descending),
    )?;

    let count = transactions.len();

    Ok(Json(TransactionListResponse {
        transactions,
        count,
    }))
}

/// A route handler for creating a new transaction.
///
/// # Errors
///
/// This function will return an error if:
/// - neither a category ID nor a category name resolves to a category
///   visible to the user,
/// - the amount is not greater than zero,
/// - or the date is in the future.
pub async fn create_transaction<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Json(data): Json<CreateTransactionData>,
) -> Result<impl IntoResponse, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let user_id = claims.user_id();

    let category_id = resolve_category(
        &state.category_store,
        user_id,
        data.category_id,
        data.category_name.as_deref(),
    )?;

    let mut builder = Transaction::build(data.amount, data.kind, category_id, user_id)?;

    if let Some(date) = data.date {
        builder = builder.date(date)?;
    }

    if let Some(note) = &data.note {
        builder = builder.note(note);
    }

    let mut transaction_store = state.transaction_store;
    let transaction = transaction_store.create(builder)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for updating an existing transaction.
///
/// This function will return the status code 404 if the transaction does not
/// exist or belongs to another user.
pub async fn update_transaction<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(data): Json<UpdateTransactionData>,
) -> Result<Json<Transaction>, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let user_id = claims.user_id();

    if let Some(amount) = data.amount
        && (!amount.is_finite() || amount <= 0.0)
    {
        return Err(Error::InvalidAmount);
    }

    if let Some(date) = data.date
        && date > OffsetDateTime::now_utc().date()
    {
        return Err(Error::FutureDate(date));
    }

    let category_id = if data.category_id.is_some() || data.category_name.is_some() {
        Some(resolve_category(
            &state.category_store,
            user_id,
            data.category_id,
            data.category_name.as_deref(),
        )?)
    } else {
        None
    };

    let mut transaction_store = state.transaction_store;
    let transaction = transaction_store.update(
        transaction_id,
        user_id,
        TransactionUpdate {
            category_id,
            amount: data.amount,
            kind: data.kind,
            date: data.date,
            note: data.note,
        },
    )?;

    Ok(Json(transaction))
}

/// A route handler for deleting a transaction.
///
/// This function will return the status code 404 if the transaction does not
/// exist or belongs to another user.
pub async fn delete_transaction<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<impl IntoResponse, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let mut transaction_store = state.transaction_store;
    transaction_store.delete(transaction_id, claims.user_id())?;

    Ok(Json(json!({ "deleted_id": transaction_id })))
}
