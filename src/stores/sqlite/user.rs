//! Implements a SQLite backed user store.

use std::sync::{Arc, Mutex};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{PasswordHash, User, UserID},
    stores::UserStore,
};

/// Stores users in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    /// Register a new user in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateEmail] if `email` is already registered,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(
        &mut self,
        name: &str,
        email: EmailAddress,
        password_hash: PasswordHash,
    ) -> Result<User, Error> {
        let connection = self.connection.lock().unwrap();
        let created_at = OffsetDateTime::now_utc();

        connection.execute(
            "INSERT INTO user (name, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
            (
                name,
                email.to_string(),
                password_hash.to_string(),
                created_at,
            ),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User::new(
            id,
            name.to_string(),
            email,
            password_hash,
            created_at,
        ))
    }

    /// Get the user registered with `email`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no user has this email address,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, email, password, created_at FROM user WHERE email = :email")?
            .query_row(&[(":email", &email.to_string())], Self::map_row)?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no user has this ID,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_by_id(&self, id: UserID) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, email, password, created_at FROM user WHERE id = :id")?
            .query_row(&[(":id", &id.as_i64())], Self::map_row)?;

        Ok(user)
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = UserID::new(row.get(offset)?);
        let name = row.get(offset + 1)?;

        let raw_email: String = row.get(offset + 2)?;
        let email = EmailAddress::new_unchecked(raw_email);

        let raw_password_hash: String = row.get(offset + 3)?;
        let password_hash = PasswordHash::new_unchecked(&raw_password_hash);

        let created_at = row.get(offset + 4)?;

        Ok(User::new(id, name, email, password_hash, created_at))
    }
}

#[cfg(test)]
mod user_store_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::PasswordHash,
        stores::{UserStore, sqlite::SQLiteUserStore},
    };

    fn get_test_store() -> SQLiteUserStore {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");

        SQLiteUserStore::new(Arc::new(Mutex::new(connection)))
    }

    #[test]
    fn create_user_succeeds() {
        let mut store = get_test_store();

        let email = EmailAddress::from_str("hello@world.com").unwrap();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let user = store
            .create("Hello", email.clone(), password_hash.clone())
            .unwrap();

        assert!(user.id().as_i64() > 0);
        assert_eq!(user.name(), "Hello");
        assert_eq!(user.email(), &email);
        assert_eq!(user.password_hash(), &password_hash);
    }

    #[test]
    fn create_user_fails_on_duplicate_email() {
        let mut store = get_test_store();

        let email = EmailAddress::from_str("hello@world.com").unwrap();

        store
            .create("Hello", email.clone(), PasswordHash::new_unchecked("a"))
            .unwrap();

        let result = store.create("World", email, PasswordHash::new_unchecked("b"));

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_by_email_returns_inserted_user() {
        let mut store = get_test_store();

        let email = EmailAddress::from_str("foo@bar.baz").unwrap();
        let inserted = store
            .create("Foo", email.clone(), PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        let retrieved = store.get_by_email(&email).unwrap();

        assert_eq!(retrieved, inserted);
    }

    #[test]
    fn get_by_email_fails_with_unknown_email() {
        let store = get_test_store();

        let email = EmailAddress::from_str("nobody@nowhere.com").unwrap();

        assert_eq!(store.get_by_email(&email), Err(Error::NotFound));
    }

    #[test]
    fn get_by_id_fails_with_unknown_id() {
        let store = get_test_store();

        assert_eq!(
            store.get_by_id(crate::models::UserID::new(1337)),
            Err(Error::NotFound)
        );
    }
}
