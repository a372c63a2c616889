use std::{
    error::Error,
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use moneylens::{
    initialize_db,
    models::{PasswordHash, Transaction, TransactionKind},
    stores::{
        CategoryStore, TransactionStore, UserStore,
        sqlite::{SQLiteCategoryStore, SQLiteTransactionStore, SQLiteUserStore},
    },
};

/// A utility for creating a database with demo data for the moneylens server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    let connection = Arc::new(Mutex::new(connection));

    println!("Creating demo user...");

    let password_hash = PasswordHash::from_raw_password("ademopasswordthatworks", 4)?;
    let user = SQLiteUserStore::new(connection.clone()).create(
        "Demo",
        "demo@example.com".parse()?,
        password_hash,
    )?;

    println!("Creating demo transactions...");

    let category_store = SQLiteCategoryStore::new(connection.clone());
    let mut transaction_store = SQLiteTransactionStore::new(connection);

    let today = OffsetDateTime::now_utc().date();

    // Three months of wages plus a scattering of spending.
    let samples = [
        (2600.0, TransactionKind::Income, "Salary", 75, "June wages"),
        (2600.0, TransactionKind::Income, "Salary", 45, "July wages"),
        (2600.0, TransactionKind::Income, "Salary", 15, "August wages"),
        (320.0, TransactionKind::Expense, "Housing", 70, "Rent"),
        (320.0, TransactionKind::Expense, "Housing", 40, "Rent"),
        (320.0, TransactionKind::Expense, "Housing", 10, "Rent"),
        (84.5, TransactionKind::Expense, "Food", 52, "Groceries"),
        (61.2, TransactionKind::Expense, "Food", 33, "Groceries"),
        (18.0, TransactionKind::Expense, "Food", 12, "Takeaways"),
        (42.0, TransactionKind::Expense, "Transport", 28, "Fuel"),
        (19.9, TransactionKind::Expense, "Entertainment", 6, "Cinema"),
        (150.0, TransactionKind::Income, "Freelance", 20, "Logo design"),
    ];

    for (amount, kind, category_name, days_ago, note) in samples {
        let category = category_store
            .find_by_name(category_name, user.id())?
            .expect("demo data uses default categories");

        transaction_store.create(
            Transaction::build(amount, kind, category.id(), user.id())?
                .date(today - Duration::days(days_ago))?
                .note(note),
        )?;
    }

    println!("Success!");

    Ok(())
}
