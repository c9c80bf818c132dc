//! ECharts visualisations for the dashboard.
//!
//! - **Income vs Expenses**: monthly income and expense bars side by side
//! - **Expenses by Category**: total expenses per category
//!
//! Each chart is serialised to an ECharts option object by `charming` and
//! initialised by a script in the page head.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, ItemStyle, JsFunction, Tooltip, Trigger,
    },
    series::bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{
    aggregation::{CategoryBreakdown, MonthlyBucket},
    html::HeadElement,
};

/// The ECharts build loaded by the dashboard page.
pub(super) const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

const INCOME_COLOR: &str = "#16a34a";
const EXPENSE_COLOR: &str = "#dc2626";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Build the charts for the monthly series and category breakdown.
pub(super) fn dashboard_charts(
    monthly: &[MonthlyBucket],
    categories: &CategoryBreakdown,
) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "monthly-chart",
            options: monthly_chart(monthly).to_string(),
        },
        DashboardChart {
            id: "category-chart",
            options: category_chart(categories).to_string(),
        },
    ]
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Each chart follows the system colour scheme and resizes with the window.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

fn monthly_chart(monthly: &[MonthlyBucket]) -> Chart {
    let labels: Vec<String> = monthly.iter().map(|bucket| bucket.month.to_string()).collect();
    let income: Vec<f64> = monthly.iter().map(|bucket| bucket.income).collect();
    let expense: Vec<f64> = monthly.iter().map(|bucket| bucket.expense).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Income vs Expenses")
                .subtext("Per month"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(70)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Income")
                .item_style(ItemStyle::new().color(INCOME_COLOR))
                .data(income),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color(EXPENSE_COLOR))
                .data(expense),
        )
}

fn category_chart(categories: &CategoryBreakdown) -> Chart {
    let (labels, values): (Vec<String>, Vec<f64>) = categories
        .categories
        .iter()
        .filter(|bucket| bucket.expense > 0.0)
        .map(|bucket| (bucket.category.clone(), bucket.expense))
        .unzip();

    Chart::new()
        .title(
            Title::new()
                .text("Expenses by Category")
                .subtext("All time"),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color(EXPENSE_COLOR))
                .data(values),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use crate::{
        aggregation::{compute_category_breakdown, compute_monthly_series, test_data::sample},
        html::HeadElement,
    };

    use super::{category_chart, charts_script, dashboard_charts, monthly_chart};

    #[test]
    fn monthly_chart_has_labels_and_both_series() {
        let options = monthly_chart(&compute_monthly_series(&sample())).to_string();

        assert!(options.contains(r#""2024-01""#));
        assert!(options.contains(r#""2024-02""#));
        assert!(options.contains(r#""Income""#));
        assert!(options.contains(r#""Expenses""#));
    }

    #[test]
    fn category_chart_only_lists_expense_categories() {
        let options = category_chart(&compute_category_breakdown(&sample())).to_string();

        assert!(options.contains(r#""food""#));
        assert!(options.contains(r#""rent""#));
        assert!(!options.contains(r#""salary""#));
    }

    #[test]
    fn script_initialises_every_chart() {
        let monthly = compute_monthly_series(&sample());
        let categories = compute_category_breakdown(&sample());
        let charts = dashboard_charts(&monthly, &categories);

        let HeadElement::ScriptSource(script) = charts_script(&charts) else {
            panic!("expected an inline script");
        };

        assert!(script.0.starts_with("document.addEventListener('DOMContentLoaded'"));
        for chart in &charts {
            assert!(script.0.contains(&format!(r#"getElementById("{}")"#, chart.id)));
        }
    }
}
