//! Defines the user store trait.

use email_address::EmailAddress;

use crate::{
    Error,
    models::{PasswordHash, User, UserID},
};

/// Handles the creation and retrieval of users.
pub trait UserStore {
    /// Register a new user.
    ///
    /// # Errors
    /// Returns [Error::DuplicateEmail] if the email address is already
    /// registered.
    fn create(
        &mut self,
        name: &str,
        email: EmailAddress,
        password_hash: PasswordHash,
    ) -> Result<User, Error>;

    /// Get the user registered with `email`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no user has this email address.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error>;

    /// Get a user by their ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no user has this ID.
    fn get_by_id(&self, id: UserID) -> Result<User, Error>;
}
