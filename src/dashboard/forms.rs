//! Forms for adding transactions and for filtering the transaction list.

use maud::{Markup, html};
use time::Date;

use crate::{
    aggregation::{ListQuery, SortKey},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::format_date,
};

const SORT_OPTIONS: [(SortKey, &str); 3] = [
    (SortKey::Date, "Newest first"),
    (SortKey::Amount, "Largest amount"),
    (SortKey::Unsorted, "As entered"),
];

/// Renders the form for adding a transaction, with the date defaulting to `today`.
pub(super) fn new_transaction_form(today: Date) -> Markup {
    html! {
        form
            id="new-transaction"
            method="post"
            action=(endpoints::DASHBOARD_TRANSACTIONS)
            class={(CARD_STYLE) " w-full grid grid-cols-1 md:grid-cols-6 gap-4 items-end mb-4"}
        {
            div {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                select id="type" name="type" class=(FORM_TEXT_INPUT_STYLE) required {
                    option value="expense" selected { "Expense" }
                    option value="income" { "Income" }
                }
            }

            div {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input
                    type="number"
                    id="amount"
                    name="amount"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            div {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                input
                    type="text"
                    id="category"
                    name="category"
                    placeholder="food"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            div {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                input
                    type="text"
                    id="description"
                    name="description"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                input
                    type="date"
                    id="date"
                    name="date"
                    value=(format_date(today))
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
        }
    }
}

/// Renders the GET form that drives the `type`, `category` and `sort` query parameters.
///
/// `categories` lists the choices for the category filter, the current
/// selections are taken from `query`.
pub(super) fn filter_form(query: &ListQuery, categories: &[String]) -> Markup {
    let type_filter = query.type_filter.as_str();
    let category_filter = query.category_filter.as_str();

    html! {
        form
            id="filters"
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="w-full flex flex-wrap gap-4 items-end mb-4"
        {
            div {
                label for="type-filter" class=(FORM_LABEL_STYLE) { "Type" }
                select id="type-filter" name="type" class=(FORM_TEXT_INPUT_STYLE) {
                    option value="all" selected[type_filter == "all"] { "All" }
                    option value="income" selected[type_filter == "income"] { "Income" }
                    option value="expense" selected[type_filter == "expense"] { "Expense" }
                }
            }

            div {
                label for="category-filter" class=(FORM_LABEL_STYLE) { "Category" }
                select id="category-filter" name="category" class=(FORM_TEXT_INPUT_STYLE) {
                    option value="all" selected[category_filter == "all"] { "All" }
                    @for category in categories {
                        option
                            value=(category)
                            selected[category.to_lowercase() == category_filter]
                        {
                            (category)
                        }
                    }
                }
            }

            div {
                label for="sort" class=(FORM_LABEL_STYLE) { "Sort by" }
                select id="sort" name="sort" class=(FORM_TEXT_INPUT_STYLE) {
                    @for (key, label) in SORT_OPTIONS {
                        option value=(key.as_str()) selected[key == query.sort] { (label) }
                    }
                }
            }

            div {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
            }
        }
    }
}
