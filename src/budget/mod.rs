//! Spending limits per category and how much of each has been used.
//!
//! - `core`: the `Budget` model and its owner-scoped database functions
//! - `status`: spending against a budget within its current period
//! - `api`: the JSON API under `/api/budgets`
//! - `page`: the budgets page and its form endpoints

mod api;
mod core;
mod page;
mod status;

pub use api::{
    BudgetPayload, BudgetState, create_budget_api, delete_budget_api, get_budget_status_api,
    get_budgets_api, update_budget_api,
};
pub use core::{
    Budget, BudgetUpdate, NewBudget, create_budget, create_budget_table, delete_budget,
    get_budgets, update_budget,
};
pub use page::{create_budget_endpoint, delete_budget_endpoint, get_budgets_page};
pub use status::{BudgetWithStatus, budget_status};
