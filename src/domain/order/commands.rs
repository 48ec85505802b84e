// ============================================================================
// Order Commands - Represent staff intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    /// "Cancel" button on the order detail view.
    CancelOrder { order_id: i64 },
    /// "Cancel Orders" bulk action over the selected rows.
    CancelOrders { order_ids: Vec<i64> },
}
