//! The budgets page and the form endpoints behind it.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    auth::OwnerId,
    budget::{
        BudgetPayload, BudgetState, BudgetWithStatus, budget_status, create_budget, delete_budget,
        get_budgets,
    },
    category::EXPENSE_CATEGORIES,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles, format_money,
    },
    money::to_display_float,
    navigation::NavBar,
    timezone::local_now,
    transaction::get_transactions,
    window::Period,
};

/// Render the budgets page with a card for each of the owner's budgets.
pub async fn get_budgets_page(
    State(state): State<BudgetState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(&owner, &connection)?;
    let transactions = get_transactions(&owner, &connection)?;

    let budgets: Vec<BudgetWithStatus> = budgets
        .into_iter()
        .map(|budget| BudgetWithStatus {
            status: budget_status(&budget, &transactions, now),
            budget,
        })
        .collect();

    Ok(budgets_view(&budgets).into_response())
}

/// A route handler for creating a budget from the budgets page form.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(owner): Extension<OwnerId>,
    Form(form): Form<BudgetPayload>,
) -> Response {
    let new_budget = match form.into_new_budget() {
        Ok(new_budget) => new_budget,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_budget(&owner, new_budget, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a budget, redirects to the budgets page on success.
pub async fn delete_budget_endpoint(
    Path(budget_id): Path<String>,
    State(state): State<BudgetState>,
    Extension(owner): Extension<OwnerId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_budget(&owner, &budget_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DeleteMissingBudget) => Error::DeleteMissingBudget.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn budgets_view(budgets: &[BudgetWithStatus]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-6"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }
                }

                details class=(CARD_STYLE)
                {
                    summary class="cursor-pointer font-semibold" { "Add Budget" }

                    div class="mt-4" { (budget_form_view()) }
                }

                @if budgets.is_empty() {
                    div class={ (CARD_STYLE) " text-center text-gray-500 dark:text-gray-400" }
                    {
                        p { "No budgets yet." }
                        p { "Add a budget to start tracking your spending by category." }
                    }
                } @else {
                    div class="grid gap-4 md:grid-cols-2 lg:grid-cols-3"
                    {
                        @for budget in budgets {
                            (budget_card_view(budget))
                        }
                    }
                }
            }
        }
    };

    base("Budgets", &[dollar_input_styles()], &content)
}

fn budget_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_BUDGET)
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for category in EXPENSE_CATEGORIES {
                        option value=(category) { (category) }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="period" class=(FORM_LABEL_STYLE) { "Period" }

                select id="period" name="period" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for period in Period::ALL {
                        option value=(period.as_str()) selected[period == Period::default()]
                        {
                            (period.label())
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Budget" }
        }
    }
}

fn progress_bar_style(percentage_used: f64, is_over_budget: bool) -> &'static str {
    if is_over_budget {
        "h-2.5 rounded-full bg-red-600"
    } else if percentage_used > 80.0 {
        "h-2.5 rounded-full bg-yellow-400"
    } else {
        "h-2.5 rounded-full bg-green-600"
    }
}

fn budget_card_view(budget_with_status: &BudgetWithStatus) -> Markup {
    let BudgetWithStatus { budget, status } = budget_with_status;
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_BUDGET, &budget.id);
    let confirm_message = format!(
        "Are you sure you want to delete the {} budget?",
        budget.category
    );
    let percentage_used = to_display_float(status.percentage_used);
    let remaining_style = if status.remaining.is_sign_negative() {
        "font-semibold text-red-600 dark:text-red-400"
    } else {
        "font-semibold text-green-600 dark:text-green-400"
    };
    let spent_style = if status.is_over_budget {
        "font-semibold text-red-600 dark:text-red-400"
    } else {
        "font-semibold"
    };

    html! {
        article class={ (CARD_STYLE) " space-y-3" } data-budget-id=(budget.id)
        {
            header class="flex justify-between items-start"
            {
                div
                {
                    h2 class="text-lg font-semibold" { (budget.category) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (budget.period.label()) }
                }

                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-confirm=(confirm_message)
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }

            dl class="grid grid-cols-3 gap-2 text-sm"
            {
                div
                {
                    dt class="text-gray-500 dark:text-gray-400" { "Budget" }
                    dd class="font-semibold" { (format_money(budget.amount.as_decimal())) }
                }
                div
                {
                    dt class="text-gray-500 dark:text-gray-400" { "Spent" }
                    dd class=(spent_style) { (format_money(status.spent)) }
                }
                div
                {
                    dt class="text-gray-500 dark:text-gray-400" { "Remaining" }
                    dd class=(remaining_style) { (format_money(status.remaining.abs())) }
                }
            }

            div class="w-full h-2.5 bg-gray-200 rounded-full dark:bg-gray-700"
            {
                div
                    class=(progress_bar_style(percentage_used, status.is_over_budget))
                    style={ "width: " (percentage_used) "%" }
                {}
            }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                (format!("{percentage_used:.1}% used"))
            }
        }
    }
}
