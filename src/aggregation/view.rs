//! Filtering and sorting of the transaction list shown on the dashboard.

use serde::Deserialize;

use crate::transaction::Transaction;

/// A case-insensitive equality filter on a text field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum TextFilter {
    /// Everything matches.
    #[default]
    All,
    /// Only values equal to this lowercase string match.
    Only(String),
}

impl TextFilter {
    /// Parse a filter from a query string value.
    ///
    /// A missing or empty value, or "all" in any case, matches everything.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => TextFilter::All,
            Some(value) if value.eq_ignore_ascii_case("all") => TextFilter::All,
            Some(value) => TextFilter::Only(value.to_lowercase()),
        }
    }

    /// Whether `value` passes the filter. A missing value only passes [TextFilter::All].
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            TextFilter::All => true,
            TextFilter::Only(wanted) => value.is_some_and(|value| value.to_lowercase() == *wanted),
        }
    }

    /// The value to show in a form, "all" when not filtering.
    pub fn as_str(&self) -> &str {
        match self {
            TextFilter::All => "all",
            TextFilter::Only(value) => value,
        }
    }
}

/// How to order the transaction list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first, undated transactions last.
    #[default]
    Date,
    /// Largest absolute amount first.
    Amount,
    /// Keep the input order.
    Unsorted,
}

impl SortKey {
    /// Parse a sort key, any unrecognised value keeps the input order.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "date" => SortKey::Date,
            "amount" => SortKey::Amount,
            _ => SortKey::Unsorted,
        }
    }

    /// The query string value for this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Amount => "amount",
            SortKey::Unsorted => "none",
        }
    }
}

#[derive(Deserialize)]
struct RawListQuery {
    #[serde(rename = "type")]
    transaction_type: Option<String>,
    category: Option<String>,
    sort: Option<String>,
}

impl From<RawListQuery> for ListQuery {
    fn from(raw: RawListQuery) -> Self {
        Self {
            type_filter: TextFilter::parse(raw.transaction_type.as_deref()),
            category_filter: TextFilter::parse(raw.category.as_deref()),
            sort: raw.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
        }
    }
}

/// The filters and ordering chosen for the transaction list.
///
/// Deserialises from `?type=&category=&sort=`. Without a `sort` parameter the
/// list is ordered by date.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawListQuery")]
pub struct ListQuery {
    /// Filter on the transaction type.
    pub type_filter: TextFilter,
    /// Filter on the category.
    pub category_filter: TextFilter,
    /// The order of the resulting list.
    pub sort: SortKey,
}

impl ListQuery {
    /// Whether `transaction` passes both filters.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.type_filter
            .matches(Some(transaction.transaction_type.as_str()))
            && self.category_filter.matches(transaction.category.as_deref())
    }

    /// The filtered and sorted view of `transactions`. The slice itself is left untouched.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        sort_transactions(
            transactions
                .iter()
                .filter(|transaction| self.matches(transaction)),
            self.sort,
        )
    }
}

/// Collect `transactions` into a new list ordered by `key`.
///
/// The sort is stable, so transactions that compare equal keep their input order.
pub fn sort_transactions<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    key: SortKey,
) -> Vec<&'a Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.into_iter().collect();

    match key {
        // `None` orders before `Some`, so reversing the comparison puts undated transactions last.
        SortKey::Date => sorted.sort_by(|a, b| b.date.cmp(&a.date)),
        SortKey::Amount => sorted.sort_by(|a, b| b.amount.abs().total_cmp(&a.amount.abs())),
        SortKey::Unsorted => {}
    }

    sorted
}
