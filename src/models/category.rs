//! This file defines the `Category` type and the types needed to create one.
//!
//! Categories come in two tiers: global defaults with no owner that every
//! user can see, and custom categories owned by a single user. User-facing
//! operations never mutate the global tier.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{DatabaseID, TransactionKind, UserID},
};

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// Leading and trailing whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// This function will return an error if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for expenses and income, e.g., 'Groceries', 'Rent', 'Salary'.
///
/// A category with no owner is a global default visible to all users; a
/// category with an owner is visible only to that user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    id: DatabaseID,
    user_id: Option<UserID>,
    name: CategoryName,
    kind: TransactionKind,
}

impl Category {
    /// Create a new category.
    pub fn new(
        id: DatabaseID,
        user_id: Option<UserID>,
        name: CategoryName,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            kind,
        }
    }

    /// The id of the category.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The user that owns the category, or `None` for a global default.
    pub fn user_id(&self) -> Option<UserID> {
        self.user_id
    }

    /// The name of the category.
    pub fn name(&self) -> &CategoryName {
        &self.name
    }

    /// Whether the category tracks income or expenses.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Whether the category is a global default.
    pub fn is_global(&self) -> bool {
        self.user_id.is_none()
    }

    /// Whether the category is visible to `user_id`, i.e. global or owned by
    /// them.
    pub fn is_visible_to(&self, user_id: UserID) -> bool {
        match self.user_id {
            None => true,
            Some(owner) => owner == user_id,
        }
    }
}
