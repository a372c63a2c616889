//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).

mod category;
mod transaction;
mod user;

pub mod sqlite;

pub use category::{CategoryStore, CategoryUsage};
pub use transaction::{SortOrder, TransactionQuery, TransactionStore, TransactionUpdate};
pub use user::UserStore;
