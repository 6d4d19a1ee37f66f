//! How much of a budget has been spent in its current period.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use time::PrimitiveDateTime;

use crate::{
    aggregation::sum_expenses,
    budget::Budget,
    money::{serialize_decimal, to_display_float},
    transaction::Transaction,
    window::resolve_window,
};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Spending against a budget in the period containing `now`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    #[serde(serialize_with = "serialize_decimal")]
    pub spent: Decimal,
    /// The budget amount minus `spent`, negative when over budget.
    #[serde(serialize_with = "serialize_decimal")]
    pub remaining: Decimal,
    /// Capped at 100 and rounded to two decimal places.
    #[serde(serialize_with = "serialize_percentage")]
    pub percentage_used: Decimal,
    pub is_over_budget: bool,
}

fn serialize_percentage<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(to_display_float(*value))
}

/// Work out the status of `budget` from all of its owner's transactions.
///
/// A zero budget counts as fully used as soon as anything is spent against it.
pub fn budget_status(
    budget: &Budget,
    transactions: &[Transaction],
    now: PrimitiveDateTime,
) -> BudgetStatus {
    let window = resolve_window(now, budget.period);
    let spent = sum_expenses(transactions, budget.category.as_ref(), window);
    let amount = budget.amount.as_decimal();

    let percentage_used = if amount.is_zero() {
        if spent > Decimal::ZERO {
            ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    } else {
        spent
            .checked_div(amount)
            .and_then(|ratio| ratio.checked_mul(ONE_HUNDRED))
            .unwrap_or(ONE_HUNDRED)
            .min(ONE_HUNDRED)
            .round_dp(2)
    };

    BudgetStatus {
        spent,
        remaining: amount - spent,
        percentage_used,
        is_over_budget: spent > amount,
    }
}

/// A budget alongside its current status, as returned by the status API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetWithStatus {
    #[serde(flatten)]
    pub budget: Budget,
    pub status: BudgetStatus,
}
