//! Totals over a user's transactions.
//!
//! Every function here takes the full list of transactions and scans it once.
//! Amounts are summed as [Decimal] so totals are exact; callers format them
//! to strings or floats only when rendering.

use std::{collections::BTreeMap, fmt::Display};

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use time::PrimitiveDateTime;

use crate::{
    money::serialize_decimal,
    transaction::{Transaction, TransactionKind},
    window::{TimeRange, Window},
};

/// Summed amounts keyed by exact category name, in name order.
pub type CategoryTotals = BTreeMap<String, Decimal>;

/// Sum the expenses in `category` that happened inside `window`.
pub fn sum_expenses(transactions: &[Transaction], category: &str, window: Window) -> Decimal {
    transactions
        .iter()
        .filter(|transaction| {
            transaction.kind == TransactionKind::Expense
                && transaction.category.as_ref() == category
                && window.contains(transaction.occurred_at)
        })
        .map(|transaction| transaction.amount.as_decimal())
        .sum()
}

/// Sum the transactions of `kind` within `range` per category.
///
/// Categories without any matching transaction are left out.
pub fn group_by_category(
    transactions: &[Transaction],
    kind: TransactionKind,
    range: TimeRange,
    now: PrimitiveDateTime,
) -> CategoryTotals {
    let mut totals = CategoryTotals::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.kind == kind)
        .filter(|transaction| range.includes(transaction.occurred_at, now))
    {
        *totals
            .entry(transaction.category.to_string())
            .or_default() += transaction.amount.as_decimal();
    }

    totals
}

/// A calendar month, ordered by year then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u8,
}

impl MonthKey {
    pub fn of(date_time: PrimitiveDateTime) -> Self {
        Self {
            year: date_time.year(),
            month: date_time.month() as u8,
        }
    }

    /// A short label for chart axes, e.g. "Jan 2025".
    pub fn label(&self) -> String {
        const MONTH_NAMES: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];

        let name = MONTH_NAMES
            .get(usize::from(self.month).saturating_sub(1))
            .copied()
            .unwrap_or("???");

        format!("{name} {}", self.year)
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
    pub month: MonthKey,
    #[serde(serialize_with = "serialize_decimal")]
    pub income: Decimal,
    #[serde(serialize_with = "serialize_decimal")]
    pub expense: Decimal,
}

/// Sum income and expenses within `range` per calendar month, oldest month first.
pub fn group_by_month(
    transactions: &[Transaction],
    range: TimeRange,
    now: PrimitiveDateTime,
) -> Vec<MonthTotals> {
    let mut months: BTreeMap<MonthKey, (Decimal, Decimal)> = BTreeMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| range.includes(transaction.occurred_at, now))
    {
        let (income, expense) = months.entry(MonthKey::of(transaction.occurred_at)).or_default();

        match transaction.kind {
            TransactionKind::Income => *income += transaction.amount.as_decimal(),
            TransactionKind::Expense => *expense += transaction.amount.as_decimal(),
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expense))| MonthTotals {
            month,
            income,
            expense,
        })
        .collect()
}

/// All-time totals for the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(serialize_with = "serialize_decimal")]
    pub total_income: Decimal,
    #[serde(serialize_with = "serialize_decimal")]
    pub total_expenses: Decimal,
    /// Income minus expenses, may be negative.
    #[serde(serialize_with = "serialize_decimal")]
    pub balance: Decimal,
}

/// Total up all income and expenses.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let (total_income, total_expenses) = transactions.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expenses), transaction| match transaction.kind {
            TransactionKind::Income => (income + transaction.amount.as_decimal(), expenses),
            TransactionKind::Expense => (income, expenses + transaction.amount.as_decimal()),
        },
    );

    Summary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
    }
}


#[cfg(test)]
mod sum_expenses_tests {
    use rust_decimal::Decimal;
    use time::macros::{date, datetime};

    use crate::{
        aggregation::{
            sum_expenses,
            test_transactions::{expense, income},
        },
        window::{Period, Window, resolve_window},
    };

    fn march_2025() -> Window {
        Window {
            start: date!(2025 - 03 - 01),
            end: date!(2025 - 03 - 31),
        }
    }

    #[test]
    fn empty_list_sums_to_zero() {
        assert_eq!(sum_expenses(&[], "Food", march_2025()), Decimal::ZERO);
    }

    #[test]
    fn sums_matching_expenses_only() {
        let transactions = vec![
            expense("40.00", "Food", datetime!(2025-03-02 12:00)),
            expense("70.00", "Food", datetime!(2025-03-20 19:30)),
            expense("10.00", "Food", datetime!(2025-02-28 23:59)),
            expense("99.99", "Bills", datetime!(2025-03-05 09:00)),
            income("500.00", "Food", datetime!(2025-03-05 09:00)),
        ];

        let total = sum_expenses(&transactions, "Food", march_2025());

        assert_eq!(total, Decimal::new(11000, 2));
    }

    #[test]
    fn category_match_is_case_sensitive() {
        let transactions = vec![expense("5.00", "food", datetime!(2025-03-02 12:00))];

        assert_eq!(
            sum_expenses(&transactions, "Food", march_2025()),
            Decimal::ZERO
        );
    }

    #[test]
    fn includes_both_window_edges() {
        let transactions = vec![
            expense("1.00", "Food", datetime!(2025-03-01 00:00)),
            expense("2.00", "Food", datetime!(2025-03-31 23:59:59.999)),
        ];

        assert_eq!(
            sum_expenses(&transactions, "Food", march_2025()),
            Decimal::new(300, 2)
        );
    }

    #[test]
    fn order_does_not_change_the_sum() {
        let mut transactions = vec![
            expense("0.10", "Food", datetime!(2025-03-02 12:00)),
            expense("0.20", "Food", datetime!(2025-03-03 12:00)),
            expense("0.30", "Food", datetime!(2025-03-04 12:00)),
            expense("19.99", "Food", datetime!(2025-03-05 12:00)),
        ];
        let window = resolve_window(datetime!(2025-03-10 08:00), Period::Monthly);

        let forwards = sum_expenses(&transactions, "Food", window);
        transactions.reverse();
        let backwards = sum_expenses(&transactions, "Food", window);
        transactions.swap(0, 2);
        let shuffled = sum_expenses(&transactions, "Food", window);

        assert_eq!(forwards, Decimal::new(2059, 2));
        assert_eq!(forwards, backwards);
        assert_eq!(forwards, shuffled);
    }
}
