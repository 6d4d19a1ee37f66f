//! Income and expense records.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its owner-scoped database functions
//! - The JSON API handlers under `/api/transactions`
//! - The form endpoints used by the dashboard

mod api;
mod core;
mod form;

pub use api::{
    TransactionPayload, TransactionState, create_transaction_api, delete_transaction_api,
    get_transactions_api, update_transaction_api,
};
pub use core::{
    NewTransaction, Transaction, TransactionKind, TransactionUpdate, create_transaction,
    create_transaction_table, delete_transaction, get_transactions, normalize_description,
    parse_occurred_at, update_transaction,
};
pub use form::{create_transaction_endpoint, delete_transaction_endpoint};
