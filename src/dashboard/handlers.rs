//! Dashboard HTTP handler and page layout.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    aggregation::{Summary, summarize},
    auth::OwnerId,
    dashboard::{
        cards::summary_cards_view, tables::transactions_table_view,
        transaction_form::transaction_form_view,
    },
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    timezone::local_now,
    transaction::{Transaction, get_transactions},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with the owner's totals and transactions.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)?.date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(&owner, &connection)
        .inspect_err(|error| tracing::error!("Could not get transactions for {owner}: {error}"))?;
    let summary = summarize(&transactions);

    Ok(dashboard_view(&summary, &transactions, today).into_response())
}

fn dashboard_view(summary: &Summary, transactions: &[Transaction], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full space-y-6"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                (summary_cards_view(summary))
                (transaction_form_view(today))
                (transactions_table_view(transactions))
            }
        }
    };

    base("Dashboard", &[dollar_input_styles()], &content)
}
