use std::collections::HashMap;

use serde::Serialize;

use crate::{
    aggregation::{Flow, round_half_up},
    transaction::Transaction,
};

/// The category used for transactions that do not have one.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Income and expenses for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBucket {
    /// The category label.
    pub category: String,
    /// Total income in this category.
    pub income: f64,
    /// Total expenses in this category.
    pub expense: f64,
}

/// Per-category totals plus the category with the most spending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// One bucket per category, in the order each category first appears.
    pub categories: Vec<CategoryBucket>,
    /// `None` when there are no expenses.
    pub top_expense_category: Option<String>,
    /// Expenses in the top category, zero when there is none.
    pub top_expense_amount: f64,
    /// The top category's share of all expenses as a whole percentage.
    pub percentage: u32,
}

/// Group `transactions` by category in first-seen order.
pub(super) fn group_by_category<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<CategoryBucket> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut flows: Vec<(&str, Flow)> = Vec::new();

    for transaction in transactions {
        let category = transaction
            .category
            .as_deref()
            .unwrap_or(UNKNOWN_CATEGORY);

        let position = *positions.entry(category).or_insert_with(|| {
            flows.push((category, Flow::default()));
            flows.len() - 1
        });

        flows[position].1.record(transaction);
    }

    flows
        .into_iter()
        .map(|(category, flow)| CategoryBucket {
            category: category.to_owned(),
            income: flow.income,
            expense: flow.expense,
        })
        .collect()
}

/// The bucket with the largest expense, the earliest bucket winning ties.
///
/// Returns `None` if no bucket has a positive expense.
pub(super) fn top_by_expense(buckets: &[CategoryBucket]) -> Option<&CategoryBucket> {
    let mut ranked: Vec<&CategoryBucket> = buckets.iter().collect();
    // Stable, so equal expenses keep their first-seen order.
    ranked.sort_by(|a, b| b.expense.total_cmp(&a.expense));

    ranked.into_iter().next().filter(|bucket| bucket.expense > 0.0)
}

/// Group `transactions` by category and find where most money was spent.
pub fn compute_category_breakdown(transactions: &[Transaction]) -> CategoryBreakdown {
    let categories = group_by_category(transactions);
    let total_expense: f64 = categories.iter().map(|bucket| bucket.expense).sum();

    let (top_expense_category, top_expense_amount, percentage) =
        match top_by_expense(&categories) {
            Some(top) if total_expense > 0.0 => (
                Some(top.category.clone()),
                top.expense,
                round_half_up(top.expense / total_expense * 100.0) as u32,
            ),
            _ => (None, 0.0, 0),
        };

    CategoryBreakdown {
        categories,
        top_expense_category,
        top_expense_amount,
        percentage,
    }
}
