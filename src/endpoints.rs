//! The endpoint URIs for the HTML pages, form handlers and JSON API.
//!
//! For endpoints that take a parameter, e.g., '/budgets/{budget_id}', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The page with the summary cards and the transaction table.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing budgets and how much of each has been spent.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page with the category and monthly charts.
pub const CHARTS_VIEW: &str = "/charts";

/// The form route to create a transaction.
pub const POST_TRANSACTION: &str = "/transactions";
/// The form route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/transactions/{transaction_id}";
/// The form route to create a budget.
pub const POST_BUDGET: &str = "/budgets";
/// The form route to delete a budget.
pub const DELETE_BUDGET: &str = "/budgets/{budget_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION_API: &str = "/api/transactions/{transaction_id}";
/// The route to list and create budgets.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to update or delete a single budget.
pub const BUDGET_API: &str = "/api/budgets/{budget_id}";
/// The route to get every budget with its current spending.
pub const BUDGET_STATUS_API: &str = "/api/budgets/status";
/// The route to get the chart data for a time range.
pub const CHARTS_API: &str = "/api/charts";

/// The path prefix shared by the JSON API routes.
pub const API_PREFIX: &str = "/api/";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/budgets/{budget_id}', '{budget_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
