//! The toggleable "Add Transaction" form on the dashboard.

use maud::{Markup, html};
use time::Date;

use crate::{
    category::{EXPENSE_CATEGORIES, INCOME_CATEGORIES},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::TransactionKind,
};

/// Renders the add transaction form with the date defaulting to `today`.
pub(super) fn transaction_form_view(today: Date) -> Markup {
    let income_only_categories = INCOME_CATEGORIES
        .iter()
        .filter(|category| !EXPENSE_CATEGORIES.contains(category));

    html! {
        details class={ (CARD_STYLE) " w-full" }
        {
            summary class="cursor-pointer font-semibold" { "Add Transaction" }

            form
                hx-post=(endpoints::POST_TRANSACTION)
                hx-target-error="#alert-container"
                class="mt-4 grid grid-cols-1 md:grid-cols-2 gap-4"
            {
                div
                {
                    label for="type" class=(FORM_LABEL_STYLE) { "Type" }

                    select id="type" name="type" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for kind in [TransactionKind::Expense, TransactionKind::Income] {
                            option value=(kind.as_str()) { (kind.label()) }
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
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    select id="category" name="category" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in EXPENSE_CATEGORIES {
                            option value=(category) { (category) }
                        }

                        optgroup label="Income"
                        {
                            @for category in income_only_categories {
                                option value=(category) { (category) }
                            }
                        }
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id="date"
                        type="date"
                        name="date"
                        value=(today)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="md:col-span-2"
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        id="description"
                        type="text"
                        name="description"
                        placeholder="Optional"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="md:col-span-2"
                {
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
                }
            }
        }
    }
}
