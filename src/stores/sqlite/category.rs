//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, Row, named_params};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Category, CategoryName, DatabaseID, TransactionKind, UserID},
    stores::{CategoryStore, CategoryUsage},
};

/// Stores transaction categories in a SQLite database.
///
/// Global default categories are rows with a NULL `user_id`; they are seeded
/// at initialization and this store never writes to them.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CategoryStore for SQLiteCategoryStore {
    /// Create a new custom category owned by `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateCategoryName] if a category with the same
    ///   case-insensitive name is already visible to the user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(
        &mut self,
        name: CategoryName,
        kind: TransactionKind,
        user_id: UserID,
    ) -> Result<Category, Error> {
        if self.find_by_name(name.as_ref(), user_id)?.is_some() {
            return Err(Error::DuplicateCategoryName(name.to_string()));
        }

        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO category (user_id, name, kind) VALUES (?1, ?2, ?3)",
            (user_id.as_i64(), name.as_ref(), kind),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Category::new(id, Some(user_id), name, kind))
    }

    /// Get a category by its ID, regardless of owner.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `category_id` does not refer to a category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, category_id: DatabaseID) -> Result<Category, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, user_id, name, kind FROM category WHERE id = :id")?
            .query_row(&[(":id", &category_id)], Self::map_row)?;

        Ok(category)
    }

    /// Get all categories visible to `user_id`: the global defaults plus the
    /// user's own, ordered by kind then name.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn get_for_user(&self, user_id: UserID) -> Result<Vec<Category>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, name, kind FROM category
                 WHERE user_id IS NULL OR user_id = :user_id
                 ORDER BY kind, name",
            )?
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(Error::SqlError))
            .collect()
    }

    /// Find a category visible to `user_id` by case-insensitive name.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn find_by_name(&self, name: &str, user_id: UserID) -> Result<Option<Category>, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, name, kind FROM category
                 WHERE LOWER(name) = LOWER(:name)
                   AND (user_id IS NULL OR user_id = :user_id)
                 LIMIT 1",
            )?
            .query_row(
                named_params! {
                    ":name": name,
                    ":user_id": user_id.as_i64(),
                },
                Self::map_row,
            )
            .optional()?;

        Ok(category)
    }

    /// How `user_id`'s transactions use the category.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn usage(&self, category_id: DatabaseID, user_id: UserID) -> Result<CategoryUsage, Error> {
        let usage = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT COUNT(*), COALESCE(SUM(amount), 0)
                 FROM \"transaction\"
                 WHERE category_id = :category_id AND user_id = :user_id",
            )?
            .query_row(
                named_params! {
                    ":category_id": category_id,
                    ":user_id": user_id.as_i64(),
                },
                |row| {
                    Ok(CategoryUsage {
                        transaction_count: row.get(0)?,
                        total_amount: row.get(1)?,
                    })
                },
            )?;

        Ok(usage)
    }

    /// Delete one of `user_id`'s custom categories.
    ///
    /// Global defaults cannot be deleted; they answer [Error::NotFound] so
    /// that the store does not reveal which rows are shared.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the category does not exist, is a global
    ///   default, or belongs to another user,
    /// - [Error::CategoryInUse] if the user still has transactions in it,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, category_id: DatabaseID, user_id: UserID) -> Result<(), Error> {
        let category = self.get(category_id)?;

        if category.user_id() != Some(user_id) {
            return Err(Error::NotFound);
        }

        let usage = self.usage(category_id, user_id)?;
        if usage.transaction_count > 0 {
            return Err(Error::CategoryInUse(usage.transaction_count));
        }

        self.connection.lock().unwrap().execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (category_id, user_id.as_i64()),
        )?;

        Ok(())
    }
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER,
                    name TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;

        let raw_user_id: Option<i64> = row.get(offset + 1)?;
        let user_id = raw_user_id.map(UserID::new);

        let raw_name: String = row.get(offset + 2)?;
        let name = CategoryName::new_unchecked(&raw_name);

        let kind = row.get(offset + 3)?;

        Ok(Category::new(id, user_id, name, kind))
    }
}

#[cfg(test)]
mod category_store_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        models::{CategoryName, PasswordHash, Transaction, TransactionKind, UserID},
        stores::{
            CategoryStore, TransactionStore, UserStore,
            sqlite::{SQLiteCategoryStore, SQLiteTransactionStore, SQLiteUserStore},
        },
    };

    fn get_test_stores() -> (SQLiteCategoryStore, SQLiteTransactionStore, UserID) {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");

        let connection = Arc::new(Mutex::new(connection));

        let user = SQLiteUserStore::new(connection.clone())
            .create(
                "Test",
                EmailAddress::from_str("test@test.com").unwrap(),
                PasswordHash::new_unchecked("hunter2"),
            )
            .unwrap();

        (
            SQLiteCategoryStore::new(connection.clone()),
            SQLiteTransactionStore::new(connection),
            user.id(),
        )
    }

    #[test]
    fn create_category_succeeds() {
        let (mut store, _, user_id) = get_test_stores();

        let name = CategoryName::new("Board games").unwrap();

        let category = store
            .create(name.clone(), TransactionKind::Expense, user_id)
            .unwrap();

        assert!(category.id() > 0);
        assert_eq!(category.name(), &name);
        assert_eq!(category.user_id(), Some(user_id));
        assert_eq!(category.kind(), TransactionKind::Expense);
    }

    #[test]
    fn create_category_fails_on_duplicate_of_global_default() {
        let (mut store, _, user_id) = get_test_stores();

        // "Food" is seeded as a global default; "food" collides
        // case-insensitively.
        let result = store.create(
            CategoryName::new("food").unwrap(),
            TransactionKind::Expense,
            user_id,
        );

        assert_eq!(
            result,
            Err(Error::DuplicateCategoryName("food".to_string()))
        );
    }

    #[test]
    fn create_category_fails_on_duplicate_custom_name() {
        let (mut store, _, user_id) = get_test_stores();

        store
            .create(
                CategoryName::new("Vinyl").unwrap(),
                TransactionKind::Expense,
                user_id,
            )
            .unwrap();

        let result = store.create(
            CategoryName::new("VINYL").unwrap(),
            TransactionKind::Expense,
            user_id,
        );

        assert_eq!(
            result,
            Err(Error::DuplicateCategoryName("VINYL".to_string()))
        );
    }

    #[test]
    fn get_for_user_includes_globals_and_own_but_not_others() {
        let (mut store, _, user_id) = get_test_stores();

        let own = store
            .create(
                CategoryName::new("Vinyl").unwrap(),
                TransactionKind::Expense,
                user_id,
            )
            .unwrap();

        let other_user = UserID::new(user_id.as_i64() + 1);
        let categories = store.get_for_user(user_id).unwrap();
        let other_categories = store.get_for_user(other_user).unwrap();

        assert!(categories.iter().any(|category| category.id() == own.id()));
        assert!(categories.iter().any(|category| category.is_global()));
        assert!(
            !other_categories
                .iter()
                .any(|category| category.id() == own.id())
        );
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        let (store, _, user_id) = get_test_stores();

        let category = store.find_by_name("fOoD", user_id).unwrap().unwrap();

        assert_eq!(category.name().as_ref(), "Food");
    }

    #[test]
    fn find_by_name_returns_none_for_unknown_name() {
        let (store, _, user_id) = get_test_stores();

        assert_eq!(store.find_by_name("Yachts", user_id).unwrap(), None);
    }

    #[test]
    fn delete_fails_on_global_default() {
        let (mut store, _, user_id) = get_test_stores();

        let food = store.find_by_name("Food", user_id).unwrap().unwrap();

        assert_eq!(store.delete(food.id(), user_id), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_while_category_is_in_use() {
        let (mut store, mut transaction_store, user_id) = get_test_stores();

        let category = store
            .create(
                CategoryName::new("Vinyl").unwrap(),
                TransactionKind::Expense,
                user_id,
            )
            .unwrap();

        transaction_store
            .create(
                Transaction::build(25.0, TransactionKind::Expense, category.id(), user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 10))
                    .unwrap(),
            )
            .unwrap();

        assert_eq!(
            store.delete(category.id(), user_id),
            Err(Error::CategoryInUse(1))
        );
    }

    #[test]
    fn delete_succeeds_on_unused_custom_category() {
        let (mut store, _, user_id) = get_test_stores();

        let category = store
            .create(
                CategoryName::new("Vinyl").unwrap(),
                TransactionKind::Expense,
                user_id,
            )
            .unwrap();

        store.delete(category.id(), user_id).unwrap();

        assert_eq!(store.get(category.id()), Err(Error::NotFound));
    }

    #[test]
    fn usage_counts_only_the_users_transactions() {
        let (store, mut transaction_store, user_id) = get_test_stores();

        let food = store.find_by_name("Food", user_id).unwrap().unwrap();

        transaction_store
            .create(
                Transaction::build(10.0, TransactionKind::Expense, food.id(), user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 10))
                    .unwrap(),
            )
            .unwrap();
        transaction_store
            .create(
                Transaction::build(15.5, TransactionKind::Expense, food.id(), user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 12))
                    .unwrap(),
            )
            .unwrap();

        let usage = store.usage(food.id(), user_id).unwrap();

        assert_eq!(usage.transaction_count, 2);
        assert_eq!(usage.total_amount, 25.5);
    }
}
