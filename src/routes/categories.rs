//! This file defines the API routes for categories.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::Claims,
    models::{Category, CategoryName, DatabaseID, TransactionKind},
    stores::{CategoryStore, CategoryUsage, TransactionStore, UserStore},
};

/// The JSON body for creating a custom category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryData {
    /// The category's display name.
    pub name: String,
    /// Whether the category tracks income or expenses.
    pub kind: TransactionKind,
}

/// A category together with how the user's transactions use it.
#[derive(Debug, Serialize)]
pub struct CategoryWithUsage {
    /// The category itself.
    #[serde(flatten)]
    pub category: Category,
    /// The number of the user's transactions in the category.
    pub transaction_count: i64,
    /// The summed amount of those transactions.
    pub total_amount: f64,
}

/// The response to listing categories.
#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    /// The categories visible to the user, with usage counts.
    pub categories: Vec<CategoryWithUsage>,
    /// How many categories were found.
    pub count: usize,
}

/// A route handler for listing the categories visible to the user: the
/// global defaults plus their own custom categories, each with usage counts.
pub async fn get_categories<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
) -> Result<Json<CategoryListResponse>, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let user_id = claims.user_id();
    let categories = state.category_store.get_for_user(user_id)?;

    let categories = categories
        .into_iter()
        .map(|category| {
            let CategoryUsage {
                transaction_count,
                total_amount,
            } = state.category_store.usage(category.id(), user_id)?;

            Ok(CategoryWithUsage {
                category,
                transaction_count,
                total_amount,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let count = categories.len();

    Ok(Json(CategoryListResponse { categories, count }))
}

/// A route handler for creating a new custom category.
///
/// # Errors
///
/// This function will return an error if the name is empty or a category
/// with the same (case-insensitive) name is already visible to the user.
pub async fn create_category<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Json(data): Json<CreateCategoryData>,
) -> Result<impl IntoResponse, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let name = CategoryName::new(&data.name)?;

    let mut category_store = state.category_store;
    let category = category_store.create(name, data.kind, claims.user_id())?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// A route handler for deleting a custom category.
///
/// Global default categories cannot be deleted; they answer 404 like
/// categories owned by other users. A category that still has transactions
/// answers 400.
pub async fn delete_category<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<StatusCode, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let mut category_store = state.category_store;
    category_store.delete(category_id, claims.user_id())?;

    Ok(StatusCode::NO_CONTENT)
}
