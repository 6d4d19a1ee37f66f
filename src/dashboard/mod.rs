//! Dashboard module
//!
//! Provides an overview page with the owner's totals, a form to add
//! transactions and the table of every transaction.

mod cards;
mod handlers;
mod tables;
mod transaction_form;

pub use handlers::get_dashboard_page;
