//! Form endpoints used by the dashboard to add and delete transactions.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    auth::OwnerId,
    endpoints,
    timezone::local_offset,
    transaction::{
        TransactionPayload, TransactionState, create_transaction, delete_transaction,
    },
};

/// A route handler for creating a transaction from the dashboard form, redirects to the dashboard on success.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
    Form(form): Form<TransactionPayload>,
) -> Response {
    let new_transaction = match local_offset(&state.local_timezone)
        .and_then(|offset| form.into_new_transaction(offset))
    {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction(&owner, new_transaction, &connection) {
        tracing::error!("Could not create transaction for {owner}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for deleting a transaction, redirects to the dashboard on success.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<String>,
    State(state): State<TransactionState>,
    Extension(owner): Extension<OwnerId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(&owner, &transaction_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DeleteMissingTransaction) => {
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
