//! Defines the category store trait.

use crate::{
    Error,
    models::{Category, CategoryName, DatabaseID, TransactionKind, UserID},
};

/// Creates and retrieves transaction categories.
///
/// Categories form a two-tier namespace: a global table of defaults with no
/// owner, unioned at query time with each user's custom entries. Stores must
/// never mutate the global tier through this trait; [CategoryStore::create]
/// and [CategoryStore::delete] operate on custom categories only.
pub trait CategoryStore {
    /// Create a new custom category owned by `user_id`.
    ///
    /// # Errors
    /// Returns [Error::DuplicateCategoryName] if a category with the same
    /// case-insensitive name is already visible to the user.
    fn create(
        &mut self,
        name: CategoryName,
        kind: TransactionKind,
        user_id: UserID,
    ) -> Result<Category, Error>;

    /// Get a category by its ID, regardless of owner.
    ///
    /// Callers are responsible for checking visibility via
    /// [Category::is_visible_to](crate::models::Category::is_visible_to).
    fn get(&self, category_id: DatabaseID) -> Result<Category, Error>;

    /// Get all categories visible to `user_id`: the global defaults plus
    /// their own custom categories.
    fn get_for_user(&self, user_id: UserID) -> Result<Vec<Category>, Error>;

    /// Find a category visible to `user_id` by case-insensitive name.
    fn find_by_name(&self, name: &str, user_id: UserID) -> Result<Option<Category>, Error>;

    /// How `user_id`'s transactions use the category.
    fn usage(&self, category_id: DatabaseID, user_id: UserID) -> Result<CategoryUsage, Error>;

    /// Delete one of `user_id`'s custom categories.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the category does not exist, is a global
    /// default, or belongs to another user, and [Error::CategoryInUse] if any
    /// of the user's transactions still reference it.
    fn delete(&mut self, category_id: DatabaseID, user_id: UserID) -> Result<(), Error>;
}

/// How a user's transactions use a category.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CategoryUsage {
    /// The number of the user's transactions in the category.
    pub transaction_count: i64,
    /// The summed amount of those transactions.
    pub total_amount: f64,
}
