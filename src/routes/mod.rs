//! The HTTP request handlers, grouped by resource.

pub mod analytics;
pub mod auth;
pub mod categories;
pub mod transactions;
