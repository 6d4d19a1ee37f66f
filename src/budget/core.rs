//! Defines the budget model and its database queries.

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, auth::OwnerId, category::CategoryName, money::Amount, window::Period};

/// A spending ceiling for one expense category over a recurring period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// A UUID string.
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    /// Matched against transaction categories exactly, including case.
    pub category: CategoryName,
    pub amount: Amount,
    pub period: Period,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated fields for a new budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub category: CategoryName,
    pub amount: Amount,
    pub period: Period,
}

/// Changes to apply to a budget, `None` fields are left as they are.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BudgetUpdate {
    pub category: Option<CategoryName>,
    pub amount: Option<Amount>,
    pub period: Option<Period>,
}

impl ToSql for Period {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Period {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

const SELECT_COLUMNS: &str = "id, user_id, category, amount, period, created_at, updated_at";

/// Create a budget owned by `owner` and return it with its generated ID.
pub fn create_budget(
    owner: &OwnerId,
    new_budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    let now = OffsetDateTime::now_utc();
    let budget = Budget {
        id: Uuid::new_v4().to_string(),
        owner_id: owner.as_str().to_owned(),
        category: new_budget.category,
        amount: new_budget.amount,
        period: new_budget.period,
        created_at: now,
        updated_at: now,
    };

    connection.execute(
        "INSERT INTO budgets (id, user_id, category, amount, period, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &budget.id,
            &budget.owner_id,
            budget.category.as_ref(),
            budget.amount,
            budget.period,
            budget.created_at,
            budget.updated_at,
        ),
    )?;

    Ok(budget)
}

/// Retrieve one of `owner`'s budgets.
///
/// # Errors
/// Returns [Error::NotFound] if no budget with `id` belongs to `owner`.
pub fn get_budget(owner: &OwnerId, id: &str, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM budgets WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, owner.as_str()), map_budget_row)
        .map_err(|error| error.into())
}

/// Retrieve all of `owner`'s budgets, ordered by category.
pub fn get_budgets(owner: &OwnerId, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM budgets WHERE user_id = ?1
             ORDER BY category ASC, created_at ASC"
        ))?
        .query_map([owner.as_str()], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Apply `update` to one of `owner`'s budgets and return the result.
///
/// # Errors
/// Returns [Error::UpdateMissingBudget] if no budget with `id` belongs to `owner`.
pub fn update_budget(
    owner: &OwnerId,
    id: &str,
    update: BudgetUpdate,
    connection: &Connection,
) -> Result<Budget, Error> {
    let existing = get_budget(owner, id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingBudget,
        error => error,
    })?;

    let budget = Budget {
        category: update.category.unwrap_or(existing.category),
        amount: update.amount.unwrap_or(existing.amount),
        period: update.period.unwrap_or(existing.period),
        updated_at: OffsetDateTime::now_utc(),
        ..existing
    };

    let rows_affected = connection.execute(
        "UPDATE budgets SET category = ?1, amount = ?2, period = ?3, updated_at = ?4
         WHERE id = ?5 AND user_id = ?6",
        (
            budget.category.as_ref(),
            budget.amount,
            budget.period,
            budget.updated_at,
            id,
            owner.as_str(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(budget)
}

/// Delete one of `owner`'s budgets.
///
/// # Errors
/// Returns [Error::DeleteMissingBudget] if no budget with `id` belongs to `owner`.
pub fn delete_budget(owner: &OwnerId, id: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budgets WHERE id = ?1 AND user_id = ?2",
        (id, owner.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budgets (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            category TEXT NOT NULL,
            amount TEXT NOT NULL,
            period TEXT NOT NULL DEFAULT 'monthly'
                CHECK (period IN ('weekly', 'monthly', 'yearly')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_budgets_user ON budgets(user_id);",
    )?;

    Ok(())
}

pub fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_category: String = row.get(2)?;

    Ok(Budget {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        category: CategoryName::new_unchecked(&raw_category),
        amount: row.get(3)?,
        period: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
