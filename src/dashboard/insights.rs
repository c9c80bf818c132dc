//! Plain-language statements derived from the dashboard aggregates.

use serde::Serialize;

use crate::{
    aggregation::{CategoryBreakdown, MonthlyBucket, Trend, TrendDirection},
    html::format_currency,
};

/// The sentences shown in the insight cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insights {
    /// Which category most of the money went to.
    pub category: String,
    /// Income, expenses and savings for the latest month with any data.
    pub monthly: String,
    /// How expenses moved compared to the month before.
    pub trend: String,
}

impl Insights {
    /// Describe the aggregates in words.
    ///
    /// `monthly` should be sorted oldest first and `trend` computed from it.
    pub fn new(
        categories: &CategoryBreakdown,
        monthly: &[MonthlyBucket],
        trend: Option<&Trend>,
    ) -> Self {
        Self {
            category: category_summary(categories),
            monthly: monthly_summary(monthly),
            trend: trend_summary(trend),
        }
    }
}

fn category_summary(categories: &CategoryBreakdown) -> String {
    match &categories.top_expense_category {
        Some(category) => format!(
            "Most of your spending is on {category}. It accounts for {}% of total expenses.",
            categories.percentage
        ),
        None if categories.categories.is_empty() => "No transactions available yet.".to_owned(),
        None => "No expenses recorded yet.".to_owned(),
    }
}

fn monthly_summary(monthly: &[MonthlyBucket]) -> String {
    let Some(latest) = monthly.last() else {
        return "No monthly data available yet.".to_owned();
    };

    format!(
        "In {} you earned {} and spent {}. Your net savings are {}.",
        latest.month,
        format_currency(latest.income),
        format_currency(latest.expense),
        format_currency(latest.income - latest.expense)
    )
}

fn trend_summary(trend: Option<&Trend>) -> String {
    match trend {
        None => "No previous month data to compare.".to_owned(),
        Some(trend) => match trend.direction {
            TrendDirection::Increased => format!(
                "Your expenses increased by {}% compared to last month.",
                trend.percent
            ),
            TrendDirection::Decreased => format!(
                "Your expenses decreased by {}% compared to last month.",
                trend.percent
            ),
            TrendDirection::Unchanged => "Your expenses stayed the same as last month.".to_owned(),
        },
    }
}
