//! ECharts options for the charts page.
//!
//! Each chart is built with charming, serialized to JSON and initialized by a
//! small script in the page head.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, ItemStyle, JsFunction, Tooltip,
        Trigger,
    },
    series::{Bar, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    aggregation::{CategoryTotals, MonthTotals},
    html::HeadElement,
    money::to_display_float,
};

const INCOME_COLOR: &str = "#16a34a";
const EXPENSE_COLOR: &str = "#dc2626";

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct PageChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders a container for each chart.
pub(super) fn charts_view(charts: &[PageChart]) -> Markup {
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
                        class="min-h-[380px] rounded bg-white dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates the script that initializes an ECharts instance for each chart,
/// following the system dark mode setting and resizing with the window.
pub(super) fn charts_script(charts: &[PageChart]) -> HeadElement {
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

/// A pie chart with one slice per category.
pub(super) fn category_pie_chart(title: &str, subtitle: &str, totals: &CategoryTotals) -> Chart {
    let slices: Vec<(f64, &str)> = totals
        .iter()
        .map(|(category, total)| (to_display_float(*total), category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text(title).subtext(subtitle))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name(title)
                .radius(vec!["35%", "65%"])
                .data(slices),
        )
}

/// Side by side income and expense bars for each month.
pub(super) fn monthly_bar_chart(subtitle: &str, months: &[MonthTotals]) -> Chart {
    let labels: Vec<String> = months.iter().map(|totals| totals.month.label()).collect();
    let income: Vec<f64> = months
        .iter()
        .map(|totals| to_display_float(totals.income))
        .collect();
    let expenses: Vec<f64> = months
        .iter()
        .map(|totals| to_display_float(totals.expense))
        .collect();

    Chart::new()
        .title(Title::new().text("Monthly Income vs Expenses").subtext(subtitle))
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%").right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Bar::new()
                .name("Income")
                .item_style(ItemStyle::new().color(INCOME_COLOR))
                .data(income),
        )
        .series(
            Bar::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color(EXPENSE_COLOR))
                .data(expenses),
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
mod chart_options_tests {
    use std::{collections::BTreeMap, str::FromStr};

    use rust_decimal::Decimal;

    use crate::{
        aggregation::{MonthKey, MonthTotals},
        charts::options::{PageChart, category_pie_chart, charts_script, monthly_bar_chart},
        html::HeadElement,
    };

    #[test]
    fn pie_chart_has_a_slice_per_category() {
        let totals = BTreeMap::from([
            ("Food".to_owned(), Decimal::from_str("12.50").unwrap()),
            ("Bills".to_owned(), Decimal::from_str("80.00").unwrap()),
        ]);

        let options = category_pie_chart("Expenses by Category", "All Time", &totals).to_string();

        assert!(options.contains("\"Food\""), "{options}");
        assert!(options.contains("12.5"), "{options}");
        assert!(options.contains("\"Bills\""), "{options}");
    }

    #[test]
    fn bar_chart_labels_months() {
        let months = vec![
            MonthTotals {
                month: MonthKey {
                    year: 2024,
                    month: 12,
                },
                income: Decimal::from(1000),
                expense: Decimal::ZERO,
            },
            MonthTotals {
                month: MonthKey {
                    year: 2025,
                    month: 1,
                },
                income: Decimal::ZERO,
                expense: Decimal::from(200),
            },
        ];

        let options = monthly_bar_chart("All Time", &months).to_string();

        assert!(options.contains("Dec 2024"), "{options}");
        assert!(options.contains("Jan 2025"), "{options}");
    }

    #[test]
    fn script_initializes_every_chart() {
        let charts = [
            PageChart {
                id: "first-chart",
                options: "{}".to_owned(),
            },
            PageChart {
                id: "second-chart",
                options: "{}".to_owned(),
            },
        ];

        let HeadElement::ScriptSource(script) = charts_script(&charts) else {
            panic!("expected an inline script");
        };

        assert!(script.0.contains("getElementById(\"first-chart\")"));
        assert!(script.0.contains("getElementById(\"second-chart\")"));
    }
}
