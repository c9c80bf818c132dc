//! Card components for the figures at the top of the dashboard.
//!
//! - Balance, income and expense totals
//! - The current month at a glance
//! - The insight sentences

use maud::{Markup, html};

use crate::{
    aggregation::{CurrentMonthSnapshot, Totals},
    dashboard::insights::Insights,
    html::{CARD_STYLE, format_currency},
};

const AMOUNT_STYLE: &str = "text-2xl sm:text-3xl font-extrabold tabular-nums";
const CARD_LABEL_STYLE: &str =
    "text-xs font-semibold tracking-wide uppercase text-gray-500 dark:text-gray-400";
const GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Gets the CSS class for coloring a balance (green for positive, red for negative).
fn balance_color_class(amount: f64) -> &'static str {
    if amount >= 0.0 { GREEN_STYLE } else { RED_STYLE }
}

fn amount_card(id: &str, label: &str, amount: f64, color_class: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE) {
            span class=(CARD_LABEL_STYLE) { (label) }
            p class={(AMOUNT_STYLE) " " (color_class)} {
                (format_currency(amount))
            }
        }
    }
}

/// Renders the balance, income and expense cards.
pub(super) fn totals_cards_view(totals: &Totals) -> Markup {
    html! {
        section class="w-full mx-auto mb-4" {
            div class="grid grid-cols-1 sm:grid-cols-3 gap-4" {
                (amount_card("balance-card", "Balance", totals.balance, balance_color_class(totals.balance)))
                (amount_card("income-card", "Income", totals.income, GREEN_STYLE))
                (amount_card("expense-card", "Expenses", totals.expense, RED_STYLE))
            }
        }
    }
}

/// Renders the "this month" card and the insight card side by side.
pub(super) fn insight_cards_view(snapshot: &CurrentMonthSnapshot, insights: &Insights) -> Markup {
    html! {
        section class="w-full mx-auto mb-4" {
            div class="grid grid-cols-1 md:grid-cols-2 gap-4" {
                div id="this-month-card" class=(CARD_STYLE) {
                    div class="flex items-center justify-between mb-2" {
                        h3 class="text-sm font-semibold" { "This month" }
                        span class=(CARD_LABEL_STYLE) { (snapshot.month.to_string()) }
                    }

                    p class="text-sm text-gray-600 dark:text-gray-300" {
                        "You earned " (format_currency(snapshot.income))
                        " and spent " (format_currency(snapshot.expense)) "."
                    }

                    p class="text-sm mt-1 text-gray-600 dark:text-gray-300" {
                        "You saved " (format_currency(snapshot.savings)) "."
                    }

                    p class="text-sm mt-1 text-gray-600 dark:text-gray-300" {
                        "Expenses are " (snapshot.expense_percent) "% of income."
                    }

                    @if let Some(category) = &snapshot.top_category {
                        p class="mt-2 text-xs text-gray-500 dark:text-gray-400" {
                            "Highest spending category: " (category)
                            " (" (format_currency(snapshot.top_amount)) ")"
                        }
                    }
                }

                div id="insights-card" class=(CARD_STYLE) {
                    h3 class="text-sm font-semibold mb-2" { "Insights" }

                    ul class="space-y-1 text-sm text-gray-600 dark:text-gray-300" {
                        li { (insights.category) }
                        li { (insights.monthly) }
                        li { (insights.trend) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::datetime;

    use crate::{
        aggregation::{
            Totals, compute_category_breakdown, compute_current_month_snapshot,
            compute_monthly_series, compute_trend, test_data::sample,
        },
        dashboard::insights::Insights,
    };

    use super::{insight_cards_view, totals_cards_view};

    fn text_of(document: &Html, selector: &str) -> String {
        document
            .select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("no element matches {selector}"))
            .text()
            .collect::<String>()
    }

    #[test]
    fn totals_cards_show_formatted_amounts() {
        let totals = Totals {
            income: 400.0,
            expense: 900.0,
            balance: -500.0,
        };

        let document = Html::parse_fragment(&totals_cards_view(&totals).into_string());

        assert!(text_of(&document, "#balance-card p").contains("-$500.00"));
        assert!(text_of(&document, "#income-card p").contains("$400.00"));
        assert!(text_of(&document, "#expense-card p").contains("$900.00"));
        let balance_class = document
            .select(&Selector::parse("#balance-card p").unwrap())
            .next()
            .unwrap()
            .value()
            .attr("class")
            .unwrap()
            .to_owned();
        assert!(balance_class.contains("text-red-600"));
    }

    #[test]
    fn insight_cards_show_snapshot_and_insights() {
        let transactions = sample();
        let snapshot =
            compute_current_month_snapshot(&transactions, datetime!(2024-01-31 09:00 UTC));
        let monthly = compute_monthly_series(&transactions);
        let trend = compute_trend(&monthly);
        let insights = Insights::new(
            &compute_category_breakdown(&transactions),
            &monthly,
            trend.as_ref(),
        );

        let document =
            Html::parse_fragment(&insight_cards_view(&snapshot, &insights).into_string());

        let this_month = text_of(&document, "#this-month-card");
        assert!(this_month.contains("2024-01"));
        assert!(this_month.contains("and spent $300.00."));
        assert!(this_month.contains("You saved $700.00."));
        assert!(this_month.contains("Expenses are 30% of income."));
        assert!(this_month.contains("Highest spending category: food ($300.00)"));
        assert!(text_of(&document, "#insights-card").contains(&insights.trend));
    }
}
