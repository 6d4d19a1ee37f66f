//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize, Serializer};
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};
use uuid::Uuid;

use crate::{Error, auth::OwnerId, category::CategoryName, money::Amount};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidTransactionKind(other.to_owned())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An income or expense recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// A UUID string.
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Amount,
    pub category: CategoryName,
    pub description: Option<String>,
    /// The local date and time the transaction is attributed to.
    #[serde(rename = "date", serialize_with = "serialize_occurred_at")]
    pub occurred_at: PrimitiveDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated fields for a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Amount,
    pub category: CategoryName,
    pub description: Option<String>,
    pub occurred_at: PrimitiveDateTime,
}

/// Changes to apply to a transaction, `None` fields are left as they are.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionUpdate {
    pub kind: Option<TransactionKind>,
    pub amount: Option<Amount>,
    pub category: Option<CategoryName>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub occurred_at: Option<PrimitiveDateTime>,
}

/// Turn an optional free-text description into `None` when it is blank.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .map(str::to_owned)
}

// ============================================================================
// DATES
// ============================================================================

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DATE_TIME_MINUTES_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");
const DATE_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATE_TIME_SUBSECOND_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

/// Parse a transaction date.
///
/// Accepts `YYYY-MM-DD` (midnight), `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS`
/// with optional fractional seconds, or an RFC 3339 timestamp which is
/// converted to `local_offset`.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `text` matches none of the formats.
pub fn parse_occurred_at(text: &str, local_offset: UtcOffset) -> Result<PrimitiveDateTime, Error> {
    let text = text.trim();

    if let Ok(date) = time::Date::parse(text, DATE_FORMAT) {
        return Ok(date.midnight());
    }

    for format in [
        DATE_TIME_FORMAT,
        DATE_TIME_MINUTES_FORMAT,
        DATE_TIME_SUBSECOND_FORMAT,
    ] {
        if let Ok(date_time) = PrimitiveDateTime::parse(text, format) {
            return Ok(date_time);
        }
    }

    OffsetDateTime::parse(text, &Rfc3339)
        .map(|date_time| {
            let local = date_time.to_offset(local_offset);
            PrimitiveDateTime::new(local.date(), local.time())
        })
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

fn serialize_occurred_at<S: Serializer>(
    occurred_at: &PrimitiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let text = occurred_at
        .format(DATE_TIME_FORMAT)
        .map_err(serde::ser::Error::custom)?;

    serializer.serialize_str(&text)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str =
    "id, user_id, type, amount, category, description, date, created_at, updated_at";

/// Create a transaction owned by `owner` and return it with its generated ID.
pub fn create_transaction(
    owner: &OwnerId,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();
    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        owner_id: owner.as_str().to_owned(),
        kind: new_transaction.kind,
        amount: new_transaction.amount,
        category: new_transaction.category,
        description: new_transaction.description,
        occurred_at: new_transaction.occurred_at,
        created_at: now,
        updated_at: now,
    };

    connection.execute(
        "INSERT INTO transactions
            (id, user_id, type, amount, category, description, date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            &transaction.id,
            &transaction.owner_id,
            transaction.kind,
            transaction.amount,
            transaction.category.as_ref(),
            &transaction.description,
            transaction.occurred_at,
            transaction.created_at,
            transaction.updated_at,
        ),
    )?;

    Ok(transaction)
}

/// Retrieve one of `owner`'s transactions.
///
/// # Errors
/// Returns [Error::NotFound] if no transaction with `id` belongs to `owner`.
pub fn get_transaction(
    owner: &OwnerId,
    id: &str,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, owner.as_str()), map_transaction_row)
        .map_err(|error| error.into())
}

/// Retrieve all of `owner`'s transactions, most recent date first.
pub fn get_transactions(owner: &OwnerId, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE user_id = ?1
             ORDER BY date DESC, created_at DESC"
        ))?
        .query_map([owner.as_str()], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Apply `update` to one of `owner`'s transactions and return the result.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if no transaction with `id` belongs to `owner`.
pub fn update_transaction(
    owner: &OwnerId,
    id: &str,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let existing = get_transaction(owner, id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })?;

    let transaction = Transaction {
        kind: update.kind.unwrap_or(existing.kind),
        amount: update.amount.unwrap_or(existing.amount),
        category: update.category.unwrap_or(existing.category),
        description: update.description.unwrap_or(existing.description),
        occurred_at: update.occurred_at.unwrap_or(existing.occurred_at),
        updated_at: OffsetDateTime::now_utc(),
        ..existing
    };

    let rows_affected = connection.execute(
        "UPDATE transactions
         SET type = ?1, amount = ?2, category = ?3, description = ?4, date = ?5, updated_at = ?6
         WHERE id = ?7 AND user_id = ?8",
        (
            transaction.kind,
            transaction.amount,
            transaction.category.as_ref(),
            &transaction.description,
            transaction.occurred_at,
            transaction.updated_at,
            id,
            owner.as_str(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(transaction)
}

/// Delete one of `owner`'s transactions.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if no transaction with `id` belongs to `owner`.
pub fn delete_transaction(owner: &OwnerId, id: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
        (id, owner.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Initialize the transactions table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            amount TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);",
    )?;

    Ok(())
}

/// Map a row of [SELECT_COLUMNS] to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category: String = row.get(4)?;

    Ok(Transaction {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        category: CategoryName::new_unchecked(&raw_category),
        description: row.get(5)?,
        occurred_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod parse_occurred_at_tests {
    use time::{UtcOffset, macros::datetime};

    use crate::{Error, transaction::parse_occurred_at};

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(
            parse_occurred_at("2025-01-15", UtcOffset::UTC),
            Ok(datetime!(2025-01-15 00:00))
        );
    }

    #[test]
    fn accepts_local_date_times() {
        assert_eq!(
            parse_occurred_at("2025-01-15T08:30", UtcOffset::UTC),
            Ok(datetime!(2025-01-15 08:30))
        );
        assert_eq!(
            parse_occurred_at("2025-01-15T08:30:15", UtcOffset::UTC),
            Ok(datetime!(2025-01-15 08:30:15))
        );
    }

    #[test]
    fn converts_rfc3339_to_local_time() {
        let offset = UtcOffset::from_hms(13, 0, 0).unwrap();

        assert_eq!(
            parse_occurred_at("2025-01-31T12:00:00.000Z", offset),
            Ok(datetime!(2025-02-01 01:00))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_occurred_at("last tuesday", UtcOffset::UTC),
            Err(Error::InvalidDate("last tuesday".to_owned()))
        );
    }
}

#[cfg(test)]
mod transaction_query_tests {
    use std::str::FromStr;

    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        auth::OwnerId,
        category::CategoryName,
        money::Amount,
        transaction::{
            NewTransaction, TransactionKind, TransactionUpdate, core::get_transaction,
            create_transaction, create_transaction_table, delete_transaction, get_transactions,
            update_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_transaction_table(&connection).expect("Could not create transactions table");
        connection
    }

    fn owner(id: &str) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    fn new_expense(amount: &str, occurred_at: time::PrimitiveDateTime) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Expense,
            amount: Amount::from_str(amount).unwrap(),
            category: CategoryName::new_unchecked("Food"),
            description: Some("Lunch".to_owned()),
            occurred_at,
        }
    }

    #[test]
    fn create_then_get_round_trips() {
        let connection = get_test_connection();
        let alice = owner("alice");

        let created = create_transaction(
            &alice,
            new_expense("12.30", datetime!(2025-01-15 12:00)),
            &connection,
        )
        .expect("Could not create transaction");
        let fetched = get_transaction(&alice, &created.id, &connection);

        assert_eq!(fetched, Ok(created));
    }

    #[test]
    fn amounts_are_stored_exactly() {
        let connection = get_test_connection();
        let alice = owner("alice");
        create_transaction(
            &alice,
            new_expense("0.10", datetime!(2025-01-15 12:00)),
            &connection,
        )
        .unwrap();

        let stored: String = connection
            .query_row("SELECT amount FROM transactions", [], |row| row.get(0))
            .unwrap();

        assert_eq!(stored, "0.10");
    }

    #[test]
    fn lists_newest_date_first() {
        let connection = get_test_connection();
        let alice = owner("alice");
        for occurred_at in [
            datetime!(2025-01-10 00:00),
            datetime!(2025-03-01 00:00),
            datetime!(2025-02-20 09:15),
        ] {
            create_transaction(&alice, new_expense("1.00", occurred_at), &connection).unwrap();
        }

        let dates: Vec<_> = get_transactions(&alice, &connection)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.occurred_at)
            .collect();

        assert_eq!(
            dates,
            vec![
                datetime!(2025-03-01 00:00),
                datetime!(2025-02-20 09:15),
                datetime!(2025-01-10 00:00),
            ]
        );
    }

    #[test]
    fn other_owners_rows_are_invisible() {
        let connection = get_test_connection();
        let alice = owner("alice");
        let bob = owner("bob");
        let alices = create_transaction(
            &alice,
            new_expense("5.00", datetime!(2025-01-15 12:00)),
            &connection,
        )
        .unwrap();

        assert_eq!(get_transactions(&bob, &connection), Ok(vec![]));
        assert_eq!(
            get_transaction(&bob, &alices.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            update_transaction(&bob, &alices.id, TransactionUpdate::default(), &connection),
            Err(Error::UpdateMissingTransaction)
        );
        assert_eq!(
            delete_transaction(&bob, &alices.id, &connection),
            Err(Error::DeleteMissingTransaction)
        );
        assert_eq!(get_transactions(&alice, &connection).unwrap().len(), 1);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let connection = get_test_connection();
        let alice = owner("alice");
        let created = create_transaction(
            &alice,
            new_expense("5.00", datetime!(2025-01-15 12:00)),
            &connection,
        )
        .unwrap();

        let updated = update_transaction(
            &alice,
            &created.id,
            TransactionUpdate {
                amount: Some(Amount::from_str("7.25").unwrap()),
                description: Some(None),
                ..Default::default()
            },
            &connection,
        )
        .expect("Could not update transaction");

        assert_eq!(updated.amount.to_string(), "7.25");
        assert_eq!(updated.description, None);
        assert_eq!(updated.kind, created.kind);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.occurred_at, created.occurred_at);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(get_transaction(&alice, &created.id, &connection), Ok(updated));
    }

    #[test]
    fn delete_removes_row() {
        let connection = get_test_connection();
        let alice = owner("alice");
        let created = create_transaction(
            &alice,
            new_expense("5.00", datetime!(2025-01-15 12:00)),
            &connection,
        )
        .unwrap();

        assert_eq!(delete_transaction(&alice, &created.id, &connection), Ok(()));
        assert_eq!(
            get_transaction(&alice, &created.id, &connection),
            Err(Error::NotFound)
        );
    }
}

#[cfg(test)]
mod transaction_json_tests {
    use std::str::FromStr;

    use serde_json::json;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        category::CategoryName,
        money::Amount,
        transaction::{Transaction, TransactionKind},
    };

    #[test]
    fn serializes_with_wire_names() {
        let transaction = Transaction {
            id: "abc".to_owned(),
            owner_id: "alice".to_owned(),
            kind: TransactionKind::Income,
            amount: Amount::from_str("1000").unwrap(),
            category: CategoryName::new_unchecked("Salary"),
            description: None,
            occurred_at: datetime!(2025-01-15 00:00),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };

        let value = serde_json::to_value(&transaction).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "abc",
                "userId": "alice",
                "type": "income",
                "amount": "1000.00",
                "category": "Salary",
                "description": null,
                "date": "2025-01-15T00:00:00",
                "createdAt": "1970-01-01T00:00:00Z",
                "updatedAt": "1970-01-01T00:00:00Z",
            })
        );
    }
}
