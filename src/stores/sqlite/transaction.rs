//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Transaction, TransactionBuilder, UserID},
    stores::{
        TransactionStore,
        transaction::{SortOrder, TransactionQuery, TransactionUpdate},
    },
};

const COLUMNS: &str = "id, user_id, category_id, amount, kind, date, note, created_at";

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction references the
/// [User](crate::models::User) and [Category](crate::models::Category)
/// models, their tables must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCategory] if the builder's category does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let connection = self.connection.lock().unwrap();
        let created_at = OffsetDateTime::now_utc();

        let transaction = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\" (user_id, category_id, amount, kind, date, note, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    builder.user_id.as_i64(),
                    builder.category_id,
                    builder.amount,
                    builder.kind,
                    builder.date,
                    builder.note,
                    created_at,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve one of `user_id`'s transactions by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction does not exist or belongs to
    ///   another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row((id, user_id.as_i64()), Self::map_row)?;

        Ok(transaction)
    }

    /// Query for transactions in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts =
            vec![format!("SELECT {COLUMNS} FROM \"transaction\"")];
        let mut where_clause_parts = vec!["user_id = ?1".to_string()];
        let mut query_parameters = vec![Value::Integer(query.user_id.as_i64())];

        if let Some(date_range) = query.date_range {
            where_clause_parts.push(format!(
                "date BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Text(date_range.start().to_string()));
            query_parameters.push(Value::Text(date_range.end().to_string()));
        }

        if let Some(kind) = query.kind {
            where_clause_parts.push(format!("kind = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(kind.as_str().to_string()));
        }

        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));

        match query.sort_date {
            Some(SortOrder::Ascending) => {
                query_string_parts.push("ORDER BY date ASC, created_at ASC".to_string())
            }
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY date DESC, created_at DESC".to_string())
            }
            None => {}
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Apply `update` to one of `user_id`'s transactions.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction does not exist or belongs to
    ///   another user,
    /// - [Error::InvalidCategory] if the new category does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        id: DatabaseID,
        user_id: UserID,
        update: TransactionUpdate,
    ) -> Result<Transaction, Error> {
        let existing = self.get(id, user_id)?;

        let category_id = update.category_id.unwrap_or(existing.category_id());
        let amount = update.amount.unwrap_or(existing.amount());
        let kind = update.kind.unwrap_or(existing.kind());
        let date = update.date.unwrap_or(existing.date());
        let note = update.note.unwrap_or_else(|| existing.note().to_string());

        self.connection.lock().unwrap().execute(
            "UPDATE \"transaction\"
             SET category_id = ?1, amount = ?2, kind = ?3, date = ?4, note = ?5
             WHERE id = ?6 AND user_id = ?7",
            (
                category_id,
                amount,
                kind,
                date,
                &note,
                id,
                user_id.as_i64(),
            ),
        )?;

        Ok(Transaction::new_unchecked(
            id,
            user_id,
            category_id,
            amount,
            kind,
            date,
            note,
            existing.created_at(),
        ))
    }

    /// Delete one of `user_id`'s transactions.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction does not exist or belongs to
    ///   another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID, user_id: UserID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection
                .execute(
                    "CREATE TABLE IF NOT EXISTS \"transaction\" (
                            id INTEGER PRIMARY KEY,
                            user_id INTEGER NOT NULL,
                            category_id INTEGER NOT NULL,
                            amount REAL NOT NULL,
                            kind TEXT NOT NULL,
                            date TEXT NOT NULL,
                            note TEXT NOT NULL,
                            created_at TEXT NOT NULL,
                            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
                            )",
                    (),
                )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Transaction::new_unchecked(
            row.get(offset)?,
            UserID::new(row.get(offset + 1)?),
            row.get(offset + 2)?,
            row.get(offset + 3)?,
            row.get(offset + 4)?,
            row.get(offset + 5)?,
            row.get(offset + 6)?,
            row.get(offset + 7)?,
        ))
    }
}

#[cfg(test)]
mod transaction_store_tests {
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
        models::{DatabaseID, PasswordHash, Transaction, TransactionKind, UserID},
        stores::{
            CategoryStore, SortOrder, TransactionQuery, TransactionStore, TransactionUpdate,
            UserStore,
            sqlite::{SQLiteCategoryStore, SQLiteTransactionStore, SQLiteUserStore},
        },
    };

    fn get_test_store() -> (SQLiteTransactionStore, UserID, DatabaseID, DatabaseID) {
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

        let category_store = SQLiteCategoryStore::new(connection.clone());
        let food = category_store.find_by_name("Food", user.id()).unwrap().unwrap();
        let salary = category_store
            .find_by_name("Salary", user.id())
            .unwrap()
            .unwrap();

        (
            SQLiteTransactionStore::new(connection),
            user.id(),
            food.id(),
            salary.id(),
        )
    }

    #[test]
    fn create_transaction_succeeds() {
        let (mut store, user_id, food, _) = get_test_store();

        let transaction = store
            .create(
                Transaction::build(12.5, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 10))
                    .unwrap()
                    .note("lunch"),
            )
            .unwrap();

        assert!(transaction.id() > 0);
        assert_eq!(transaction.user_id(), user_id);
        assert_eq!(transaction.category_id(), food);
        assert_eq!(transaction.amount(), 12.5);
        assert_eq!(transaction.kind(), TransactionKind::Expense);
        assert_eq!(transaction.date(), date!(2024 - 01 - 10));
        assert_eq!(transaction.note(), "lunch");
    }

    #[test]
    fn create_transaction_fails_on_unknown_category() {
        let (mut store, user_id, _, _) = get_test_store();

        let result = store.create(
            Transaction::build(12.5, TransactionKind::Expense, 9999, user_id).unwrap(),
        );

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn get_transaction_fails_for_other_user() {
        let (mut store, user_id, food, _) = get_test_store();

        let transaction = store
            .create(
                Transaction::build(12.5, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 10))
                    .unwrap(),
            )
            .unwrap();

        let other_user = UserID::new(user_id.as_i64() + 1);

        assert_eq!(
            store.get(transaction.id(), other_user),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_query_filters_by_date_range_and_kind() {
        let (mut store, user_id, food, salary) = get_test_store();

        let in_range = store
            .create(
                Transaction::build(40.0, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 10))
                    .unwrap(),
            )
            .unwrap();
        // Income in range, filtered out by kind.
        store
            .create(
                Transaction::build(100.0, TransactionKind::Income, salary, user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 05))
                    .unwrap(),
            )
            .unwrap();
        // Expense out of range.
        store
            .create(
                Transaction::build(55.0, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 02 - 15))
                    .unwrap(),
            )
            .unwrap();

        let results = store
            .get_query(
                TransactionQuery::for_user(user_id)
                    .date_range(date!(2024 - 01 - 01)..=date!(2024 - 01 - 31))
                    .kind(TransactionKind::Expense),
            )
            .unwrap();

        assert_eq!(results, vec![in_range]);
    }

    #[test]
    fn get_query_sorts_by_date() {
        let (mut store, user_id, food, _) = get_test_store();

        let later = store
            .create(
                Transaction::build(1.0, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 03 - 01))
                    .unwrap(),
            )
            .unwrap();
        let earlier = store
            .create(
                Transaction::build(2.0, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 01))
                    .unwrap(),
            )
            .unwrap();

        let ascending = store
            .get_query(TransactionQuery::for_user(user_id).sort_date(SortOrder::Ascending))
            .unwrap();
        let descending = store
            .get_query(TransactionQuery::for_user(user_id).sort_date(SortOrder::Descending))
            .unwrap();

        assert_eq!(ascending, vec![earlier.clone(), later.clone()]);
        assert_eq!(descending, vec![later, earlier]);
    }

    #[test]
    fn update_transaction_applies_partial_changes() {
        let (mut store, user_id, food, _) = get_test_store();

        let transaction = store
            .create(
                Transaction::build(12.5, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 10))
                    .unwrap()
                    .note("lunch"),
            )
            .unwrap();

        let updated = store
            .update(
                transaction.id(),
                user_id,
                TransactionUpdate {
                    amount: Some(15.0),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount(), 15.0);
        assert_eq!(updated.note(), "lunch");
        assert_eq!(updated.date(), date!(2024 - 01 - 10));

        let retrieved = store.get(transaction.id(), user_id).unwrap();
        assert_eq!(retrieved.amount(), 15.0);
    }

    #[test]
    fn update_transaction_fails_for_other_user() {
        let (mut store, user_id, food, _) = get_test_store();

        let transaction = store
            .create(
                Transaction::build(12.5, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 10))
                    .unwrap(),
            )
            .unwrap();

        let result = store.update(
            transaction.id(),
            UserID::new(user_id.as_i64() + 1),
            TransactionUpdate::default(),
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_succeeds() {
        let (mut store, user_id, food, _) = get_test_store();

        let transaction = store
            .create(
                Transaction::build(12.5, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 10))
                    .unwrap(),
            )
            .unwrap();

        store.delete(transaction.id(), user_id).unwrap();

        assert_eq!(store.get(transaction.id(), user_id), Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_fails_for_other_user() {
        let (mut store, user_id, food, _) = get_test_store();

        let transaction = store
            .create(
                Transaction::build(12.5, TransactionKind::Expense, food, user_id)
                    .unwrap()
                    .date(date!(2024 - 01 - 10))
                    .unwrap(),
            )
            .unwrap();

        let result = store.delete(transaction.id(), UserID::new(user_id.as_i64() + 1));

        assert_eq!(result, Err(Error::NotFound));
    }
}
