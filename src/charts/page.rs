//! The charts page: spending and income by category, and totals per month.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::PrimitiveDateTime;

use crate::{
    AppState, Error,
    aggregation::{CategoryTotals, MonthTotals, group_by_category, group_by_month},
    auth::OwnerId,
    charts::options::{PageChart, category_pie_chart, charts_script, charts_view, monthly_bar_chart},
    endpoints,
    html::{CARD_STYLE, ECHARTS_URL, HeadElement, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_now,
    transaction::{Transaction, TransactionKind, get_transactions},
    window::TimeRange,
};

/// The state needed for the charts page and chart API.
#[derive(Debug, Clone)]
pub struct ChartsState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ChartsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the charts page and API, e.g. `?range=month`.
#[derive(Debug, Default, Deserialize)]
pub struct ChartsQuery {
    pub range: Option<String>,
}

impl ChartsQuery {
    /// The requested time range, all time when no range is given.
    pub fn time_range(&self) -> Result<TimeRange, Error> {
        match self.range.as_deref().map(str::trim) {
            None | Some("") => Ok(TimeRange::default()),
            Some(range) => range.parse(),
        }
    }
}

/// The totals shown on the charts page.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub expense_by_category: CategoryTotals,
    pub income_by_category: CategoryTotals,
    pub monthly: Vec<MonthTotals>,
}

impl ChartData {
    pub fn new(transactions: &[Transaction], range: TimeRange, now: PrimitiveDateTime) -> Self {
        Self {
            expense_by_category: group_by_category(
                transactions,
                TransactionKind::Expense,
                range,
                now,
            ),
            income_by_category: group_by_category(transactions, TransactionKind::Income, range, now),
            monthly: group_by_month(transactions, range, now),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expense_by_category.is_empty()
            && self.income_by_category.is_empty()
            && self.monthly.is_empty()
    }
}

/// Load the owner's transactions and total them for `range`.
pub(super) fn load_chart_data(
    state: &ChartsState,
    owner: &OwnerId,
    range: TimeRange,
) -> Result<ChartData, Error> {
    let now = local_now(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(owner, &connection)
        .inspect_err(|error| tracing::error!("Could not get transactions for {owner}: {error}"))?;

    Ok(ChartData::new(&transactions, range, now))
}

/// Display the charts page for the time range in the query string.
///
/// An unknown range falls back to all time.
pub async fn get_charts_page(
    State(state): State<ChartsState>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<ChartsQuery>,
) -> Result<Response, Error> {
    let range = query.time_range().unwrap_or_else(|error| {
        tracing::warn!("{error}, showing all time instead");
        TimeRange::default()
    });

    let data = load_chart_data(&state, &owner, range)?;

    Ok(charts_page_view(&data, range).into_response())
}

fn build_charts(data: &ChartData, range: TimeRange) -> Vec<PageChart> {
    let subtitle = range.label();

    vec![
        PageChart {
            id: "expense-category-chart",
            options: category_pie_chart(
                "Expenses by Category",
                subtitle,
                &data.expense_by_category,
            )
            .to_string(),
        },
        PageChart {
            id: "income-category-chart",
            options: category_pie_chart("Income by Category", subtitle, &data.income_by_category)
                .to_string(),
        },
        PageChart {
            id: "monthly-chart",
            options: monthly_bar_chart(subtitle, &data.monthly).to_string(),
        },
    ]
}

fn range_selector_view(selected: TimeRange) -> Markup {
    const SELECTED_STYLE: &str = "px-4 py-2 text-sm font-medium rounded bg-blue-600 text-white";
    const UNSELECTED_STYLE: &str = "px-4 py-2 text-sm font-medium rounded bg-white \
        text-gray-900 border border-gray-200 hover:bg-gray-100 dark:bg-gray-800 \
        dark:text-white dark:border-gray-600 dark:hover:bg-gray-700";

    html! {
        nav id="range-selector" class="flex gap-2" aria-label="Time range"
        {
            @for range in TimeRange::ALL {
                @let url = format!("{}?range={}", endpoints::CHARTS_VIEW, range.as_str());
                @if range == selected {
                    a href=(url) class=(SELECTED_STYLE) aria-current="page" { (range.label()) }
                } @else {
                    a href=(url) class=(UNSELECTED_STYLE) { (range.label()) }
                }
            }
        }
    }
}

fn charts_page_view(data: &ChartData, range: TimeRange) -> Markup {
    let nav_bar = NavBar::new(endpoints::CHARTS_VIEW).into_html();
    let charts = if data.is_empty() {
        Vec::new()
    } else {
        build_charts(data, range)
    };

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full space-y-6"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Charts" }
                    (range_selector_view(range))
                }

                @if charts.is_empty() {
                    div class={ (CARD_STYLE) " text-center text-gray-500 dark:text-gray-400" }
                    {
                        p { "No transactions in this time range." }
                        p { "Add transactions on the dashboard to see them charted here." }
                    }
                } @else {
                    (charts_view(&charts))
                }
            }
        }
    };

    let head_elements = if charts.is_empty() {
        vec![]
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
            charts_script(&charts),
        ]
    };

    base("Charts", &head_elements, &content)
}
