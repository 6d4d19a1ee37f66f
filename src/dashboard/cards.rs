//! The summary cards at the top of the dashboard.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    aggregation::Summary,
    html::{CARD_STYLE, format_money},
};

const AMOUNT_GREEN_STYLE: &str = "text-2xl font-bold text-green-600 dark:text-green-400";
const AMOUNT_RED_STYLE: &str = "text-2xl font-bold text-red-600 dark:text-red-400";

fn summary_card(title: &str, amount: Decimal, amount_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class=(amount_style) { (format_money(amount)) }
        }
    }
}

/// Renders the total income, total expenses and balance cards.
pub(super) fn summary_cards_view(summary: &Summary) -> Markup {
    let balance_style = if summary.balance.is_sign_negative() {
        AMOUNT_RED_STYLE
    } else {
        AMOUNT_GREEN_STYLE
    };

    html! {
        section id="summary" class="grid grid-cols-1 md:grid-cols-3 gap-4 w-full"
        {
            (summary_card("Total Income", summary.total_income, AMOUNT_GREEN_STYLE))
            (summary_card("Total Expenses", summary.total_expenses, AMOUNT_RED_STYLE))
            (summary_card("Balance", summary.balance, balance_style))
        }
    }
}
