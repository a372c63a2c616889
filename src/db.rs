/*! This module defines and implements traits for interacting with the application's database. */

use rusqlite::{Connection, Row, Transaction as SqlTransaction};

use crate::{
    Error,
    models::TransactionKind,
    stores::sqlite::{SQLiteCategoryStore, SQLiteTransactionStore, SQLiteUserStore},
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type that rows are mapped to.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the
    /// table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading from the column at
    /// `offset`.
    ///
    /// This is useful in cases where tables have been joined and you want to
    /// construct two different types from the one query.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// The global default categories seeded into every fresh database.
///
/// These rows have no owner and are visible to every user; user-facing
/// operations must never mutate them.
const DEFAULT_CATEGORIES: [(&str, TransactionKind); 12] = [
    ("Salary", TransactionKind::Income),
    ("Freelance", TransactionKind::Income),
    ("Investment", TransactionKind::Income),
    ("Other Income", TransactionKind::Income),
    ("Food", TransactionKind::Expense),
    ("Transport", TransactionKind::Expense),
    ("Housing", TransactionKind::Expense),
    ("Utilities", TransactionKind::Expense),
    ("Entertainment", TransactionKind::Expense),
    ("Healthcare", TransactionKind::Expense),
    ("Shopping", TransactionKind::Expense),
    ("Other Expense", TransactionKind::Expense),
];

/// Create the application tables and seed the global default categories.
///
/// Safe to call on an existing database: tables are created `IF NOT EXISTS`
/// and default categories are only inserted once.
///
/// # Errors
/// Returns an error if the schema could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    SQLiteUserStore::create_table(&transaction)?;
    SQLiteCategoryStore::create_table(&transaction)?;
    SQLiteTransactionStore::create_table(&transaction)?;

    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let already_seeded: bool = connection.query_row(
        "SELECT EXISTS (SELECT 1 FROM category WHERE user_id IS NULL)",
        [],
        |row| row.get(0),
    )?;

    if already_seeded {
        return Ok(());
    }

    let mut statement =
        connection.prepare("INSERT INTO category (user_id, name, kind) VALUES (NULL, ?1, ?2)")?;

    for (name, kind) in DEFAULT_CATEGORIES {
        statement.execute((name, kind))?;
    }

    Ok(())
}
