use std::{collections::BTreeMap, fmt::Display};

use serde::{Serialize, Serializer};
use time::Date;

use crate::{aggregation::Flow, transaction::Transaction};

/// A calendar month, ordered by year and then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u8,
}

impl MonthKey {
    /// The month that `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Income and expenses within one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// Serialised as "YYYY-MM".
    pub month: MonthKey,
    /// Total income for the month.
    pub income: f64,
    /// Total expenses for the month.
    pub expense: f64,
}

/// Group dated transactions by month, oldest month first.
///
/// Transactions without a date are skipped.
pub fn compute_monthly_series(transactions: &[Transaction]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<MonthKey, Flow> = BTreeMap::new();

    for transaction in transactions {
        if let Some(date) = transaction.date {
            months
                .entry(MonthKey::from_date(date))
                .or_default()
                .record(transaction);
        }
    }

    months
        .into_iter()
        .map(|(month, flow)| MonthlyBucket {
            month,
            income: flow.income,
            expense: flow.expense,
        })
        .collect()
}
