//! Application router configuration.
//!
//! Every route, the HTML pages and the JSON API alike, sits behind
//! [owner_guard] so handlers always know which user made the request.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, patch, post},
};

use crate::{
    AppState,
    auth::owner_guard,
    budget::{
        create_budget_api, create_budget_endpoint, delete_budget_api, delete_budget_endpoint,
        get_budget_status_api, get_budgets_api, get_budgets_page, update_budget_api,
    },
    charts::{get_charts_api, get_charts_page},
    dashboard::get_dashboard_page,
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_api, create_transaction_endpoint, delete_transaction_api,
        delete_transaction_endpoint, get_transactions_api, update_transaction_api,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::BUDGETS_VIEW,
            get(get_budgets_page).post(create_budget_endpoint),
        )
        .route(endpoints::CHARTS_VIEW, get(get_charts_page));

    let forms = Router::new()
        .route(
            endpoints::POST_TRANSACTION,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .route(endpoints::DELETE_BUDGET, delete(delete_budget_endpoint));

    let api = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(get_transactions_api).post(create_transaction_api),
        )
        .route(
            endpoints::TRANSACTION_API,
            patch(update_transaction_api).delete(delete_transaction_api),
        )
        .route(
            endpoints::BUDGETS_API,
            get(get_budgets_api).post(create_budget_api),
        )
        .route(endpoints::BUDGET_STATUS_API, get(get_budget_status_api))
        .route(
            endpoints::BUDGET_API,
            patch(update_budget_api).delete(delete_budget_api),
        )
        .route(endpoints::CHARTS_API, get(get_charts_api));

    pages
        .merge(forms)
        .merge(api)
        .route_layer(middleware::from_fn_with_state(state.clone(), owner_guard))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum::http::{HeaderName, StatusCode};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, endpoints, endpoints::format_endpoint, routing::build_router};

    const OWNER_HEADER: &str = "x-forwarded-user";

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(
            connection,
            "Etc/UTC",
            HeaderName::from_static(OWNER_HEADER),
        )
        .expect("Could not create app state.");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn api_without_owner_is_unauthorized() {
        let server = get_test_server();

        let response = server.get(endpoints::TRANSACTIONS_API).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn page_without_owner_is_unauthorized() {
        let server = get_test_server();

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server
            .get("/does-not-exist")
            .add_header(OWNER_HEADER, "alice")
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn pages_render_for_owner() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::CHARTS_VIEW,
        ] {
            let response = server.get(page).add_header(OWNER_HEADER, "alice").await;

            response.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn created_transaction_is_listed_for_its_owner_only() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(OWNER_HEADER, "alice")
            .json(&json!({
                "type": "expense",
                "amount": "12.50",
                "category": "Food",
                "date": "2025-03-01"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let alice: Value = server
            .get(endpoints::TRANSACTIONS_API)
            .add_header(OWNER_HEADER, "alice")
            .await
            .json();
        let bob: Value = server
            .get(endpoints::TRANSACTIONS_API)
            .add_header(OWNER_HEADER, "bob")
            .await
            .json();

        assert_eq!(alice.as_array().map(Vec::len), Some(1));
        assert_eq!(alice[0]["amount"], "12.50");
        assert_eq!(bob, json!([]));
    }

    #[tokio::test]
    async fn status_route_is_not_taken_as_budget_id() {
        let server = get_test_server();

        let response = server
            .get(endpoints::BUDGET_STATUS_API)
            .add_header(OWNER_HEADER, "alice")
            .await;

        response.assert_status_ok();
        response.assert_json(&json!([]));
    }

    #[tokio::test]
    async fn budget_can_be_updated_and_deleted() {
        let server = get_test_server();

        let created: Value = server
            .post(endpoints::BUDGETS_API)
            .add_header(OWNER_HEADER, "alice")
            .json(&json!({ "category": "Food", "amount": "200" }))
            .await
            .json();
        let id = created["id"].as_str().unwrap().to_owned();
        let route = format_endpoint(endpoints::BUDGET_API, &id);

        let updated: Value = server
            .patch(&route)
            .add_header(OWNER_HEADER, "alice")
            .json(&json!({ "amount": "250.00" }))
            .await
            .json();
        assert_eq!(updated["amount"], "250.00");
        assert_eq!(updated["period"], "monthly");

        let response = server.delete(&route).add_header(OWNER_HEADER, "alice").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "success": true }));
    }
}
