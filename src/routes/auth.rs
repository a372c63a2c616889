//! This file defines the sign-up and log-in routes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::encode_token,
    models::{PasswordHash, User},
    stores::{CategoryStore, TransactionStore, UserStore},
};

/// The JSON body for registering a new user.
#[derive(Debug, Deserialize)]
pub struct SignUpData {
    /// The new user's display name.
    pub name: String,
    /// The new user's email address.
    pub email: EmailAddress,
    /// The new user's password in plain text.
    pub password: String,
}

/// The JSON body for signing in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Email entered during sign-in.
    pub email: EmailAddress,
    /// Password entered during sign-in.
    pub password: String,
}

/// A user as reported to clients, without the password hash.
#[derive(Debug, Serialize)]
pub struct UserView {
    /// The user's database ID.
    pub id: i64,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_i64(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            created_at: user.created_at(),
        }
    }
}

/// The response to a successful sign-up or log-in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The bearer token to use on protected routes.
    pub token: String,
    /// The signed-in user.
    pub user: UserView,
}

/// A route handler for registering a new user.
///
/// # Errors
///
/// This function will return an error if:
/// - the name is empty,
/// - the password is too weak,
/// - or the email address is already registered.
pub async fn sign_up<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    Json(sign_up_data): Json<SignUpData>,
) -> Result<impl IntoResponse, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let name = sign_up_data.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let password_hash =
        PasswordHash::from_raw_password(&sign_up_data.password, PasswordHash::DEFAULT_COST)?;

    let mut user_store = state.user_store;
    let user = user_store.create(name, sign_up_data.email, password_hash)?;

    let token = encode_token(user.id(), &state.auth_keys)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserView::from(&user),
        }),
    ))
}

/// A route handler for signing in with an email and password.
///
/// # Errors
///
/// This function will return an error if the email does not belong to a
/// registered user or the password is not correct. Both cases answer the
/// same error so that the handler does not reveal which emails are
/// registered.
pub async fn log_in<C, T, U>(
    State(state): State<AppState<C, T, U>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>, Error>
where
    C: CategoryStore + Send + Sync,
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let user = state
        .user_store
        .get_by_email(&credentials.email)
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?;

    let password_is_correct = user
        .password_hash()
        .verify(&credentials.password)
        .map_err(|error| {
            tracing::error!("Error verifying password: {}", error);
            Error::HashingError(error.to_string())
        })?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(user.id(), &state.auth_keys)?;

    Ok(Json(AuthResponse {
        token,
        user: UserView::from(&user),
    }))
}
