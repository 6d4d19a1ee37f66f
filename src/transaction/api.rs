//! JSON API handlers for listing, creating, updating and deleting transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::UtcOffset;

use crate::{
    AppState, Error,
    auth::OwnerId,
    category::CategoryName,
    error::ValidationErrors,
    money::{Amount, deserialize_amount_text},
    timezone::local_offset,
    transaction::{
        NewTransaction, TransactionKind, TransactionUpdate, create_transaction, delete_transaction,
        get_transactions, normalize_description, parse_occurred_at, update_transaction,
    },
};

/// The state needed by the transaction handlers.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw fields of a transaction as sent by a client, either as JSON or as a form.
///
/// Every field is optional here so that missing and malformed fields can be
/// reported together.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount_text")]
    pub amount: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

fn required(value: Option<String>) -> Result<String, Error> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(Error::MissingField)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl TransactionPayload {
    /// Validate a payload for a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] listing every missing or malformed field.
    pub fn into_new_transaction(self, local_offset: UtcOffset) -> Result<NewTransaction, Error> {
        let mut errors = ValidationErrors::default();

        let kind = errors.check(
            "type",
            required(self.kind).and_then(|kind| kind.trim().parse::<TransactionKind>()),
        );
        let amount = errors.check(
            "amount",
            required(self.amount).and_then(|amount| amount.parse::<Amount>()),
        );
        let category = errors.check(
            "category",
            required(self.category).and_then(|category| CategoryName::new(&category)),
        );
        let occurred_at = errors.check(
            "date",
            required(self.date).and_then(|date| parse_occurred_at(&date, local_offset)),
        );

        match (kind, amount, category, occurred_at) {
            (Some(kind), Some(amount), Some(category), Some(occurred_at)) => Ok(NewTransaction {
                kind,
                amount,
                category,
                description: normalize_description(self.description.as_deref()),
                occurred_at,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }

    /// Validate a payload for a partial update.
    ///
    /// Blank type, amount, category and date fields are treated as absent. A
    /// present description replaces the stored one, and a blank one clears it.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] listing every malformed field.
    pub fn into_update(self, local_offset: UtcOffset) -> Result<TransactionUpdate, Error> {
        let mut errors = ValidationErrors::default();

        let kind = non_empty(self.kind)
            .and_then(|kind| errors.check("type", kind.trim().parse::<TransactionKind>()));
        let amount = non_empty(self.amount)
            .and_then(|amount| errors.check("amount", amount.parse::<Amount>()));
        let category = non_empty(self.category)
            .and_then(|category| errors.check("category", CategoryName::new(&category)));
        let occurred_at = non_empty(self.date)
            .and_then(|date| errors.check("date", parse_occurred_at(&date, local_offset)));

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(TransactionUpdate {
            kind,
            amount,
            category,
            description: self
                .description
                .map(|description| normalize_description(Some(&description))),
            occurred_at,
        })
    }
}

/// Return the owner's transactions as JSON, most recent first.
pub async fn get_transactions_api(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
) -> Response {
    const ACTION: &str = "fetch transactions";

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(ACTION);
        }
    };

    match get_transactions(&owner, &connection) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_json_response(ACTION),
    }
}

/// Create a transaction from a JSON body and return it with status 201.
pub async fn create_transaction_api(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Response {
    const ACTION: &str = "create transaction";

    let new_transaction = match local_offset(&state.local_timezone).and_then(|offset| {
        payload
            .map_err(Error::from)
            .and_then(|Json(payload)| payload.into_new_transaction(offset))
    }) {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_json_response(ACTION),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(ACTION);
        }
    };

    match create_transaction(&owner, new_transaction, &connection) {
        Ok(transaction) => {
            tracing::info!("Created transaction {} for {owner}", transaction.id);
            (StatusCode::CREATED, Json(transaction)).into_response()
        }
        Err(error) => error.into_json_response(ACTION),
    }
}

/// Apply a partial update from a JSON body and return the updated transaction.
pub async fn update_transaction_api(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
    Path(transaction_id): Path<String>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Response {
    const ACTION: &str = "update transaction";

    let update = match local_offset(&state.local_timezone).and_then(|offset| {
        payload
            .map_err(Error::from)
            .and_then(|Json(payload)| payload.into_update(offset))
    }) {
        Ok(update) => update,
        Err(error) => return error.into_json_response(ACTION),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(ACTION);
        }
    };

    match update_transaction(&owner, &transaction_id, update, &connection) {
        Ok(transaction) => Json(transaction).into_response(),
        Err(error) => error.into_json_response(ACTION),
    }
}

/// Delete a transaction. Deleting a transaction that does not exist also succeeds.
pub async fn delete_transaction_api(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
    Path(transaction_id): Path<String>,
) -> Response {
    const ACTION: &str = "delete transaction";

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(ACTION);
        }
    };

    match delete_transaction(&owner, &transaction_id, &connection) {
        Ok(()) | Err(Error::DeleteMissingTransaction) => {
            Json(json!({ "success": true })).into_response()
        }
        Err(error) => error.into_json_response(ACTION),
    }
}
