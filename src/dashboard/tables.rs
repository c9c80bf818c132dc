//! The transaction list shown under the dashboard cards.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, format_currency,
    },
    transaction::{Transaction, TransactionType, format_date},
};

const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Income is shown as a positive amount and expenses as a negative amount,
/// whatever sign the amount was stored with.
fn signed_amount(transaction: &Transaction) -> (f64, &'static str) {
    match transaction.transaction_type {
        TransactionType::Income => (transaction.amount.abs(), TABLE_CELL_GREEN_STYLE),
        TransactionType::Expense => (-transaction.amount.abs(), TABLE_CELL_RED_STYLE),
        TransactionType::Other(_) => (transaction.amount, ""),
    }
}

/// Renders the transactions in the given order with a delete button per row.
pub(super) fn transactions_table(transactions: &[&Transaction]) -> Markup {
    if transactions.is_empty() {
        return html! {
            p id="no-transactions" class="text-gray-600 dark:text-gray-400" {
                "No transactions match. Add one above or change the filters."
            }
        };
    }

    html! {
        div class="overflow-x-auto rounded-lg shadow w-full" {
            table id="transactions" class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                thead class=(TABLE_HEADER_STYLE) {
                    tr {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody {
                    @for transaction in transactions {
                        (transaction_row(transaction))
                    }
                }
            }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let (amount, amount_style) = signed_amount(transaction);
    let date = transaction.date.map(format_date).unwrap_or_default();
    let delete_url = format_endpoint(endpoints::DASHBOARD_DELETE_TRANSACTION, transaction.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id) {
            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"} { (date) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) {
                @if let Some(category) = &transaction.category {
                    span class=(CATEGORY_BADGE_STYLE) { (category) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.transaction_type.as_str()) }
            td class={(TABLE_CELL_STYLE) " text-right whitespace-nowrap " (amount_style)} {
                (format_currency(amount))
            }
            td class=(TABLE_CELL_STYLE) {
                form method="post" action=(delete_url) {
                    button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                }
            }
        }
    }
}
