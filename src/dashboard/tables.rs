//! The transaction table on the dashboard.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_money,
        truncate,
    },
    transaction::{Transaction, TransactionKind},
};

/// Descriptions longer than this are cut short, the full text is kept in the tooltip.
const MAX_DESCRIPTION_LENGTH: usize = 40;

fn transaction_row(transaction: &Transaction) -> Markup {
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, &transaction.id);
    let (sign, amount_style) = match transaction.kind {
        TransactionKind::Income => ("+", "text-green-600 dark:text-green-400"),
        TransactionKind::Expense => ("-", "text-red-600 dark:text-red-400"),
    };
    let description = transaction.description.as_deref().unwrap_or_default();
    let date = transaction.occurred_at.date();

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(date) { (date) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.kind.label()) }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class=(TABLE_CELL_STYLE) title=(description)
            {
                (truncate(description, MAX_DESCRIPTION_LENGTH))
            }
            td class={ (TABLE_CELL_STYLE) " text-right font-semibold " (amount_style) }
            {
                (sign) (format_money(transaction.amount.as_decimal()))
            }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-confirm="Are you sure you want to delete this transaction?"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

/// Renders the owner's transactions, or a prompt to add one when there are none.
pub(super) fn transactions_table_view(transactions: &[Transaction]) -> Markup {
    html! {
        section id="transactions" class="w-full overflow-x-auto"
        {
            h2 class="text-xl font-semibold mb-4" { "Transactions" }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan="6"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transactions yet. Add your first transaction above."
                            }
                        }
                    }
                }
            }
        }
    }
}
