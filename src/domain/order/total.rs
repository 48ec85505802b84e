use rust_decimal::Decimal;

use super::model::OrderItem;

/// Total cost of an order: the sum of `price` over every item that currently
/// references it. Each item's price is already the line total, so quantity is
/// not multiplied in. An order without items totals zero.
pub fn order_total<'a>(order_id: i64, items: impl IntoIterator<Item = &'a OrderItem>) -> Decimal {
    money(
        items
            .into_iter()
            .filter(|item| item.order_id == Some(order_id))
            .map(|item| item.price)
            .sum(),
    )
}

/// Totals always carry two fractional digits, so zero reads `0.00`.
pub fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(2);
    amount
}
