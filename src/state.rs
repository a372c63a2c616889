//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;

use crate::{
    auth::AuthKeys,
    stores::{CategoryStore, TransactionStore, UserStore},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<C, T, U>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    /// The keys used for signing and verifying auth tokens.
    pub auth_keys: AuthKeys,
    /// The store for managing [categories](crate::models::Category).
    pub category_store: C,
    /// The store for managing [transactions](crate::models::Transaction).
    pub transaction_store: T,
    /// The store for managing [users](crate::models::User).
    pub user_store: U,
}

impl<C, T, U> AppState<C, T, U>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    /// Create a new [AppState].
    ///
    /// `token_secret` is used to derive the JWT signing keys.
    pub fn new(token_secret: &str, category_store: C, transaction_store: T, user_store: U) -> Self {
        Self {
            auth_keys: AuthKeys::new(token_secret),
            category_store,
            transaction_store,
            user_store,
        }
    }
}

// This impl tells the `Claims` extractor how to access the token keys from
// our state.
impl<C, T, U> FromRef<AppState<C, T, U>> for AuthKeys
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    fn from_ref(state: &AppState<C, T, U>) -> Self {
        state.auth_keys.clone()
    }
}
