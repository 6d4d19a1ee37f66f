//! JSON API handlers for budgets and their status.

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

use crate::{
    AppState, Error,
    auth::OwnerId,
    budget::{
        BudgetUpdate, BudgetWithStatus, NewBudget, budget_status, create_budget, delete_budget,
        get_budgets, update_budget,
    },
    category::CategoryName,
    error::ValidationErrors,
    money::{Amount, deserialize_amount_text},
    timezone::local_now,
    transaction::get_transactions,
    window::Period,
};

/// The state needed by the budget handlers.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw fields of a budget as sent by a client, either as JSON or as a form.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetPayload {
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount_text")]
    pub amount: Option<String>,
    pub period: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

impl BudgetPayload {
    /// Validate a payload for a new budget, the period defaults to monthly.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] listing every missing or malformed field.
    pub fn into_new_budget(self) -> Result<NewBudget, Error> {
        let mut errors = ValidationErrors::default();

        let category = errors.check(
            "category",
            non_empty(self.category)
                .ok_or(Error::MissingField)
                .and_then(|category| CategoryName::new(&category)),
        );
        let amount = errors.check(
            "amount",
            non_empty(self.amount)
                .ok_or(Error::MissingField)
                .and_then(|amount| amount.parse::<Amount>()),
        );
        let period = match non_empty(self.period) {
            Some(period) => errors.check("period", period.parse::<Period>()),
            None => Some(Period::default()),
        };

        match (category, amount, period) {
            (Some(category), Some(amount), Some(period)) => Ok(NewBudget {
                category,
                amount,
                period,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }

    /// Validate a payload for a partial update, blank fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] listing every malformed field.
    pub fn into_update(self) -> Result<BudgetUpdate, Error> {
        let mut errors = ValidationErrors::default();

        let category = non_empty(self.category)
            .and_then(|category| errors.check("category", CategoryName::new(&category)));
        let amount = non_empty(self.amount)
            .and_then(|amount| errors.check("amount", amount.parse::<Amount>()));
        let period = non_empty(self.period)
            .and_then(|period| errors.check("period", period.parse::<Period>()));

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(BudgetUpdate {
            category,
            amount,
            period,
        })
    }
}

/// Return the owner's budgets as JSON.
pub async fn get_budgets_api(
    State(state): State<BudgetState>,
    Extension(owner): Extension<OwnerId>,
) -> Response {
    const ACTION: &str = "fetch budgets";

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(ACTION);
        }
    };

    match get_budgets(&owner, &connection) {
        Ok(budgets) => Json(budgets).into_response(),
        Err(error) => error.into_json_response(ACTION),
    }
}

/// Create a budget from a JSON body and return it with status 201.
pub async fn create_budget_api(
    State(state): State<BudgetState>,
    Extension(owner): Extension<OwnerId>,
    payload: Result<Json<BudgetPayload>, JsonRejection>,
) -> Response {
    const ACTION: &str = "create budget";

    let new_budget = match payload
        .map_err(Error::from)
        .and_then(|Json(payload)| payload.into_new_budget())
    {
        Ok(new_budget) => new_budget,
        Err(error) => return error.into_json_response(ACTION),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(ACTION);
        }
    };

    match create_budget(&owner, new_budget, &connection) {
        Ok(budget) => {
            tracing::info!("Created {} budget for {owner}", budget.category);
            (StatusCode::CREATED, Json(budget)).into_response()
        }
        Err(error) => error.into_json_response(ACTION),
    }
}

/// Apply a partial update from a JSON body and return the updated budget.
pub async fn update_budget_api(
    State(state): State<BudgetState>,
    Extension(owner): Extension<OwnerId>,
    Path(budget_id): Path<String>,
    payload: Result<Json<BudgetPayload>, JsonRejection>,
) -> Response {
    const ACTION: &str = "update budget";

    let update = match payload
        .map_err(Error::from)
        .and_then(|Json(payload)| payload.into_update())
    {
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

    match update_budget(&owner, &budget_id, update, &connection) {
        Ok(budget) => Json(budget).into_response(),
        Err(error) => error.into_json_response(ACTION),
    }
}

/// Delete a budget. Deleting a budget that does not exist also succeeds.
pub async fn delete_budget_api(
    State(state): State<BudgetState>,
    Extension(owner): Extension<OwnerId>,
    Path(budget_id): Path<String>,
) -> Response {
    const ACTION: &str = "delete budget";

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(ACTION);
        }
    };

    match delete_budget(&owner, &budget_id, &connection) {
        Ok(()) | Err(Error::DeleteMissingBudget) => {
            Json(json!({ "success": true })).into_response()
        }
        Err(error) => error.into_json_response(ACTION),
    }
}

/// Return each of the owner's budgets with how much has been spent in its current period.
pub async fn get_budget_status_api(
    State(state): State<BudgetState>,
    Extension(owner): Extension<OwnerId>,
) -> Response {
    const ACTION: &str = "fetch budget status";

    let now = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error.into_json_response(ACTION),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(ACTION);
        }
    };

    let budgets_and_transactions = get_budgets(&owner, &connection).and_then(|budgets| {
        get_transactions(&owner, &connection).map(|transactions| (budgets, transactions))
    });

    match budgets_and_transactions {
        Ok((budgets, transactions)) => {
            let statuses: Vec<BudgetWithStatus> = budgets
                .into_iter()
                .map(|budget| BudgetWithStatus {
                    status: budget_status(&budget, &transactions, now),
                    budget,
                })
                .collect();

            Json(statuses).into_response()
        }
        Err(error) => error.into_json_response(ACTION),
    }
}

#[cfg(test)]
mod budget_api_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        auth::OwnerId,
        budget::{
            BudgetPayload, create_budget_api, delete_budget_api, get_budget_status_api,
            get_budgets_api, update_budget_api,
        },
        db::initialize,
        test_utils::parse_json,
        timezone::local_now,
        transaction::{TransactionPayload, create_transaction_api},
    };

    use super::BudgetState;

    fn get_test_state() -> BudgetState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        BudgetState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn owner(id: &str) -> Extension<OwnerId> {
        Extension(OwnerId::new(id).unwrap())
    }

    fn food_payload(period: Option<&str>) -> BudgetPayload {
        BudgetPayload {
            category: Some("Food".to_owned()),
            amount: Some("100".to_owned()),
            period: period.map(str::to_owned),
        }
    }

    async fn create(state: &BudgetState, owner_id: &str) -> serde_json::Value {
        let response = create_budget_api(
            State(state.clone()),
            owner(owner_id),
            Ok(Json(food_payload(None))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        parse_json(response).await
    }

    #[tokio::test]
    async fn create_defaults_to_monthly() {
        let state = get_test_state();

        let body = create(&state, "alice").await;

        assert_eq!(body["category"], "Food");
        assert_eq!(body["amount"], "100.00");
        assert_eq!(body["period"], "monthly");
        assert_eq!(body["userId"], "alice");
    }

    #[tokio::test]
    async fn create_rejects_unknown_period() {
        let state = get_test_state();

        let response = create_budget_api(
            State(state),
            owner("alice"),
            Ok(Json(food_payload(Some("daily")))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_json(response).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Validation error: period: "), "{message}");
    }

    #[tokio::test]
    async fn lists_only_own_budgets() {
        let state = get_test_state();
        create(&state, "alice").await;
        create(&state, "bob").await;

        let response = get_budgets_api(State(state), owner("bob")).await;

        let body = parse_json(response).await;
        let budgets = body.as_array().unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0]["userId"], "bob");
    }

    #[tokio::test]
    async fn patch_updates_period() {
        let state = get_test_state();
        let created = create(&state, "alice").await;
        let id = created["id"].as_str().unwrap().to_owned();
        let payload = BudgetPayload {
            period: Some("yearly".to_owned()),
            ..Default::default()
        };

        let response =
            update_budget_api(State(state), owner("alice"), Path(id), Ok(Json(payload))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_json(response).await;
        assert_eq!(body["period"], "yearly");
        assert_eq!(body["amount"], "100.00");
    }

    #[tokio::test]
    async fn patch_missing_budget_is_not_found() {
        let state = get_test_state();

        let response = update_budget_api(
            State(state),
            owner("alice"),
            Path("nope".to_owned()),
            Ok(Json(BudgetPayload::default())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            parse_json(response).await,
            json!({ "error": "Budget not found" })
        );
    }

    #[tokio::test]
    async fn delete_returns_success() {
        let state = get_test_state();
        let created = create(&state, "alice").await;
        let id = created["id"].as_str().unwrap().to_owned();

        let response = delete_budget_api(State(state.clone()), owner("alice"), Path(id)).await;

        assert_eq!(parse_json(response).await, json!({ "success": true }));
        let response = get_budgets_api(State(state), owner("alice")).await;
        assert_eq!(parse_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn status_includes_spending_this_period() {
        let state = get_test_state();
        create(&state, "alice").await;
        let today = local_now("Etc/UTC").unwrap().date().to_string();
        let transaction_state = crate::transaction::TransactionState {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        };
        let lunch = TransactionPayload {
            kind: Some("expense".to_owned()),
            amount: Some("25".to_owned()),
            category: Some("Food".to_owned()),
            description: None,
            date: Some(today),
        };
        create_transaction_api(State(transaction_state), owner("alice"), Ok(Json(lunch))).await;

        let response = get_budget_status_api(State(state), owner("alice")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_json(response).await;
        let statuses = body.as_array().unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0]["category"], "Food");
        assert_eq!(
            statuses[0]["status"],
            json!({
                "spent": "25.00",
                "remaining": "75.00",
                "percentageUsed": 25.0,
                "isOverBudget": false,
            })
        );
    }
}
