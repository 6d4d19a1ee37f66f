//! The JSON API behind the charts.

use std::collections::BTreeMap;

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer};

use crate::{
    Error,
    aggregation::{CategoryTotals, MonthTotals},
    auth::OwnerId,
    charts::page::{ChartData, ChartsQuery, ChartsState, load_chart_data},
    error::ValidationErrors,
    money::to_decimal_string,
};

fn serialize_category_totals<S: Serializer>(
    totals: &CategoryTotals,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let formatted: BTreeMap<&str, String> = totals
        .iter()
        .map(|(category, total)| (category.as_str(), to_decimal_string(*total)))
        .collect();

    formatted.serialize(serializer)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartsResponse {
    #[serde(serialize_with = "serialize_category_totals")]
    expense_by_category: CategoryTotals,
    #[serde(serialize_with = "serialize_category_totals")]
    income_by_category: CategoryTotals,
    monthly: Vec<MonthTotals>,
}

impl From<ChartData> for ChartsResponse {
    fn from(data: ChartData) -> Self {
        Self {
            expense_by_category: data.expense_by_category,
            income_by_category: data.income_by_category,
            monthly: data.monthly,
        }
    }
}

/// Return the category and monthly totals for the range in the query string.
pub async fn get_charts_api(
    State(state): State<ChartsState>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<ChartsQuery>,
) -> Response {
    const ACTION: &str = "fetch chart data";

    let range = match query.time_range() {
        Ok(range) => range,
        Err(error) => {
            let mut errors = ValidationErrors::default();
            errors.push("range", error);
            return Error::Validation(errors).into_json_response(ACTION);
        }
    };

    match load_chart_data(&state, &owner, range) {
        Ok(data) => Json(ChartsResponse::from(data)).into_response(),
        Err(error) => error.into_json_response(ACTION),
    }
}

#[cfg(test)]
mod charts_api_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        auth::OwnerId,
        category::CategoryName,
        charts::{
            get_charts_api,
            page::{ChartsQuery, ChartsState},
        },
        db::initialize,
        money::Amount,
        test_utils::parse_json,
        transaction::{NewTransaction, TransactionKind, create_transaction},
    };

    fn get_test_state() -> ChartsState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        ChartsState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn add(state: &ChartsState, kind: TransactionKind, amount: &str, category: &str) {
        create_transaction(
            &OwnerId::new("alice").unwrap(),
            NewTransaction {
                kind,
                amount: Amount::from_str(amount).unwrap(),
                category: CategoryName::new_unchecked(category),
                description: None,
                occurred_at: datetime!(2025-01-05 10:00),
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn returns_all_time_totals() {
        let state = get_test_state();
        add(&state, TransactionKind::Income, "1000.00", "Salary");
        add(&state, TransactionKind::Expense, "200.00", "Food");
        add(&state, TransactionKind::Expense, "0.10", "Food");

        let response = get_charts_api(
            State(state),
            Extension(OwnerId::new("alice").unwrap()),
            Query(ChartsQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            parse_json(response).await,
            json!({
                "expenseByCategory": { "Food": "200.10" },
                "incomeByCategory": { "Salary": "1000.00" },
                "monthly": [
                    { "month": "2025-01", "income": "1000.00", "expense": "200.10" }
                ],
            })
        );
    }

    #[tokio::test]
    async fn other_owners_see_nothing() {
        let state = get_test_state();
        add(&state, TransactionKind::Expense, "200.00", "Food");

        let response = get_charts_api(
            State(state),
            Extension(OwnerId::new("bob").unwrap()),
            Query(ChartsQuery::default()),
        )
        .await;

        assert_eq!(
            parse_json(response).await,
            json!({ "expenseByCategory": {}, "incomeByCategory": {}, "monthly": [] })
        );
    }

    #[tokio::test]
    async fn rejects_unknown_range() {
        let state = get_test_state();

        let response = get_charts_api(
            State(state),
            Extension(OwnerId::new("alice").unwrap()),
            Query(ChartsQuery {
                range: Some("week".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Validation error: range: ")
        );
    }
}
