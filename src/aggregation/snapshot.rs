use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    aggregation::{
        Flow, MonthKey,
        category::{group_by_category, top_by_expense},
        round_to_one_decimal,
    },
    transaction::{Transaction, TransactionType},
};

/// How the month containing `now` is going so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentMonthSnapshot {
    /// The month the snapshot covers.
    pub month: MonthKey,
    /// Income this month.
    pub income: f64,
    /// Expenses this month.
    pub expense: f64,
    /// `income - expense`
    pub savings: f64,
    /// Expenses as a percentage of income to one decimal place, zero without income.
    pub expense_percent: f64,
    /// The category with the most spending this month.
    pub top_category: Option<String>,
    /// Spending in [Self::top_category], zero if there is none.
    pub top_amount: f64,
}

/// Summarise the transactions dated in the same year and month as `now`.
///
/// `now` should already be in the user's local timezone.
pub fn compute_current_month_snapshot(
    transactions: &[Transaction],
    now: OffsetDateTime,
) -> CurrentMonthSnapshot {
    let month = MonthKey::from_date(now.date());
    let this_month: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.date.map(MonthKey::from_date) == Some(month))
        .collect();

    let Flow { income, expense } = Flow::from_transactions(this_month.iter().copied());

    let expense_percent = if income > 0.0 {
        round_to_one_decimal(expense / income * 100.0)
    } else {
        0.0
    };

    let expense_categories = group_by_category(
        this_month
            .iter()
            .copied()
            .filter(|transaction| transaction.transaction_type == TransactionType::Expense),
    );
    let (top_category, top_amount) = match top_by_expense(&expense_categories) {
        Some(top) => (Some(top.category.clone()), top.expense),
        None => (None, 0.0),
    };

    CurrentMonthSnapshot {
        month,
        income,
        expense,
        savings: income - expense,
        expense_percent,
        top_category,
        top_amount,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use crate::aggregation::{
        compute_current_month_snapshot,
        test_data::{sample, transaction},
    };

    #[test]
    fn only_counts_current_month() {
        let now = datetime!(2024-01-31 23:59:59 UTC);

        let got = compute_current_month_snapshot(&sample(), now);

        assert_eq!(got.month.to_string(), "2024-01");
        assert_eq!(got.income, 1000.0);
        assert_eq!(got.expense, 300.0);
        assert_eq!(got.savings, 700.0);
        assert_eq!(got.expense_percent, 30.0);
        assert_eq!(got.top_category.as_deref(), Some("food"));
        assert_eq!(got.top_amount, 300.0);
    }

    #[test]
    fn same_month_of_another_year_is_excluded() {
        let now = datetime!(2025-02-10 12:00:00 UTC);

        let got = compute_current_month_snapshot(&sample(), now);

        assert_eq!(got.expense, 0.0);
        assert_eq!(got.top_category, None);
    }

    #[test]
    fn no_income_means_zero_percent() {
        let now = datetime!(2024-02-15 08:00:00 UTC);

        let got = compute_current_month_snapshot(&sample(), now);

        assert_eq!(got.income, 0.0);
        assert_eq!(got.expense, 200.0);
        assert_eq!(got.savings, -200.0);
        assert_eq!(got.expense_percent, 0.0);
        assert_eq!(got.top_category.as_deref(), Some("rent"));
    }

    #[test]
    fn empty_month() {
        let now = datetime!(2024-06-01 00:00:00 UTC);

        let got = compute_current_month_snapshot(&[], now);

        assert_eq!(got.income, 0.0);
        assert_eq!(got.expense, 0.0);
        assert_eq!(got.expense_percent, 0.0);
        assert_eq!(got.top_category, None);
        assert_eq!(got.top_amount, 0.0);
    }

    #[test]
    fn expense_percent_has_one_decimal() {
        let now = datetime!(2024-03-20 09:30:00 UTC);
        let transactions = vec![
            transaction(1, "income", 300.0, Some("salary"), Some(date!(2024 - 03 - 01))),
            transaction(2, "expense", 100.0, Some("food"), Some(date!(2024 - 03 - 02))),
        ];

        let got = compute_current_month_snapshot(&transactions, now);

        assert_eq!(got.expense_percent, 33.3);
    }

    #[test]
    fn top_category_ignores_income_and_prefers_first_seen() {
        let now = datetime!(2024-03-20 09:30:00 UTC);
        let transactions = vec![
            transaction(1, "income", 500.0, Some("food"), Some(date!(2024 - 03 - 01))),
            transaction(2, "expense", 40.0, Some("transport"), Some(date!(2024 - 03 - 02))),
            transaction(3, "expense", 40.0, Some("food"), Some(date!(2024 - 03 - 03))),
            transaction(4, "expense", 90.0, Some("rent"), None),
        ];

        let got = compute_current_month_snapshot(&transactions, now);

        assert_eq!(got.top_category.as_deref(), Some("transport"));
        assert_eq!(got.top_amount, 40.0);
    }

    #[test]
    fn zero_amount_expense_is_not_a_top_category() {
        let now = datetime!(2024-03-20 09:30:00 UTC);
        let transactions = vec![transaction(
            1,
            "expense",
            0.0,
            Some("food"),
            Some(date!(2024 - 03 - 02)),
        )];

        let got = compute_current_month_snapshot(&transactions, now);

        assert_eq!(got.top_category, None);
        assert_eq!(got.top_amount, 0.0);
    }
}
