//! Dashboard module
//!
//! Summarises a user's transactions as JSON for API clients, and as an
//! overview page with cards, insights, the transaction list and charts for
//! browsers. Transactions are added and deleted from the page with plain
//! HTML forms.

mod cards;
mod charts;
mod forms;
mod handlers;
mod insights;
mod summary;
mod tables;

pub use handlers::{
    get_dashboard_page, post_dashboard_delete_transaction, post_dashboard_transaction,
};
pub use insights::Insights;
pub use summary::{DashboardSummary, get_dashboard_summary};
