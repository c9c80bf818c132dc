use serde::Serialize;

use crate::aggregation::{MonthKey, MonthlyBucket, round_half_up};

/// Which way expenses moved between the last two months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// More was spent in the latest month.
    Increased,
    /// Less was spent in the latest month.
    Decreased,
    /// Spending did not change.
    Unchanged,
}

/// Month-over-month change in expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trend {
    /// Whether spending went up or down.
    pub direction: TrendDirection,
    /// Size of the change relative to the previous month as a whole
    /// percentage. Always non-negative, [Trend::direction] carries the sign.
    /// Capped at `u32::MAX`, which a near-zero previous month can reach.
    pub percent: u32,
    /// The latest month in the series.
    pub month: MonthKey,
    /// The month before [Trend::month] in the series.
    pub previous_month: MonthKey,
}

/// Compare expenses in the last two buckets of `monthly`.
///
/// `monthly` should be sorted oldest first, as returned by
/// [crate::aggregation::compute_monthly_series]. Returns `None` when there
/// are fewer than two months to compare. The percentage is zero when the
/// previous month had no expenses.
pub fn compute_trend(monthly: &[MonthlyBucket]) -> Option<Trend> {
    let [.., previous, current] = monthly else {
        return None;
    };

    let delta = current.expense - previous.expense;
    let percent = if previous.expense > 0.0 {
        round_half_up(delta / previous.expense * 100.0)
    } else {
        0.0
    };

    let direction = if delta > 0.0 {
        TrendDirection::Increased
    } else if delta < 0.0 {
        TrendDirection::Decreased
    } else {
        TrendDirection::Unchanged
    };

    Some(Trend {
        direction,
        percent: percent.abs().min(f64::from(u32::MAX)) as u32,
        month: current.month,
        previous_month: previous.month,
    })
}
