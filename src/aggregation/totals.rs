use serde::Serialize;

use crate::{aggregation::Flow, transaction::Transaction};

/// Income, expenses and the resulting balance over a set of transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    /// The sum of all income, always non-negative.
    pub income: f64,
    /// The sum of all expenses, always non-negative.
    pub expense: f64,
    /// `income - expense`
    pub balance: f64,
}

/// Sum income and expenses over all `transactions`, dated or not.
pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let Flow { income, expense } = Flow::from_transactions(transactions);

    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::aggregation::{
        Totals, compute_totals,
        test_data::{sample, transaction},
    };

    #[test]
    fn sample_totals() {
        let got = compute_totals(&sample());

        assert_eq!(
            got,
            Totals {
                income: 1000.0,
                expense: 500.0,
                balance: 500.0
            }
        );
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(compute_totals(&[]), Totals::default());
    }

    // Producers disagree on the sign of stored amounts, so income is summed as
    // `abs(amount)` like expenses are. This keeps income non-negative and
    // `balance == income - expense` whatever sign a record was written with.
    #[test]
    fn sign_of_amount_does_not_matter() {
        let transactions = vec![
            transaction(1, "income", -50.0, Some("refund"), None),
            transaction(2, "expense", 20.0, Some("food"), None),
            transaction(3, "expense", -30.0, Some("food"), None),
        ];

        let got = compute_totals(&transactions);

        assert_eq!(got.income, 50.0);
        assert_eq!(got.expense, 50.0);
        assert_eq!(got.balance, 0.0);
    }

    #[test]
    fn undated_and_unknown_types() {
        let transactions = vec![
            transaction(1, "income", 100.0, Some("salary"), None),
            transaction(2, "Income", 999.0, Some("salary"), Some(date!(2024 - 01 - 01))),
            transaction(3, "transfer", 999.0, None, Some(date!(2024 - 01 - 01))),
        ];

        let got = compute_totals(&transactions);

        assert_eq!(got.income, 100.0);
        assert_eq!(got.expense, 0.0);
    }

    #[test]
    fn balance_is_income_minus_expense() {
        let mut transactions = sample();
        transactions.push(transaction(4, "expense", 1234.5, None, None));
        transactions.push(transaction(5, "income", 0.25, Some("interest"), None));

        let got = compute_totals(&transactions);

        assert!(got.income >= 0.0 && got.expense >= 0.0);
        assert_eq!(got.balance, got.income - got.expense);
        assert_eq!(compute_totals(&transactions), got);
    }
}
