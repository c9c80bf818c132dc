//! Aggregates a user's transactions into the figures shown on the dashboard.
//!
//! Every function here is pure: it takes a slice of [Transaction]s, returns
//! freshly built values and never reads the clock or any other ambient state.
//! Records with a missing or unparsable date are skipped by the date-bucketed
//! aggregations but still count towards the totals. Amounts are classified by
//! [TransactionType] and normalised with `abs`, so the sign used by whoever
//! wrote the record does not matter.

mod category;
mod monthly;
mod snapshot;
mod totals;
mod trend;
mod view;

pub use category::{
    CategoryBreakdown, CategoryBucket, UNKNOWN_CATEGORY, compute_category_breakdown,
};
pub use monthly::{MonthKey, MonthlyBucket, compute_monthly_series};
pub use snapshot::{CurrentMonthSnapshot, compute_current_month_snapshot};
pub use totals::{Totals, compute_totals};
pub use trend::{Trend, TrendDirection, compute_trend};
pub use view::{ListQuery, SortKey, TextFilter, sort_transactions};

use crate::transaction::{Transaction, TransactionType};

/// Running income and expense sums.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Flow {
    income: f64,
    expense: f64,
}

impl Flow {
    fn record(&mut self, transaction: &Transaction) {
        match transaction.transaction_type {
            TransactionType::Income => self.income += transaction.amount.abs(),
            TransactionType::Expense => self.expense += transaction.amount.abs(),
            TransactionType::Other(_) => {}
        }
    }

    fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut flow = Flow::default();
        for transaction in transactions {
            flow.record(transaction);
        }
        flow
    }
}

/// Round half up to a whole number, so 32.5 becomes 33 and -32.5 becomes -32.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to one decimal place.
pub(crate) fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
