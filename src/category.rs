//! Category names and the preset categories offered by the HTML forms.

use std::fmt::Display;

use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::Error;

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Categories offered for expenses and budgets.
pub const EXPENSE_CATEGORIES: [&str; 8] = [
    "Food",
    "Transportation",
    "Shopping",
    "Bills",
    "Entertainment",
    "Healthcare",
    "Education",
    "Other",
];

/// Categories offered for income.
pub const INCOME_CATEGORIES: [&str; 11] = [
    "Salary",
    "Freelance",
    "Investment",
    "Food",
    "Transportation",
    "Shopping",
    "Bills",
    "Entertainment",
    "Healthcare",
    "Education",
    "Other",
];

/// A validated category label, e.g. "Food".
///
/// Categories are free-form: the presets are suggestions for the forms, and
/// budgets match transactions by exact, case-sensitive equality.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from user input.
    ///
    /// Surrounding whitespace is removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategory] if `name` is empty or only whitespace,
    /// or [Error::CategoryTooLong] if it has more than [MAX_CATEGORY_LENGTH]
    /// characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyCategory);
        }

        let length = name.graphemes(true).count();
        if length > MAX_CATEGORY_LENGTH {
            return Err(Error::CategoryTooLong(length));
        }

        Ok(Self(name.to_owned()))
    }

    /// Create a category name without validation.
    ///
    /// Used for names read back from the database, which were validated on the way in.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
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
