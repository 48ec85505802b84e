// ============================================================================
// Order Domain - Business Logic for Orders and Line Items
// ============================================================================
//
// - Value objects (OrderStatus, Price, Quantity)
// - Errors (OrderError)
// - Model (Order, OrderItem, forms, read models)
// - Total calculator (sum of line item prices)
// - Cost buckets (fixed upper-threshold list filter)
// - Commands + handler (cancel one order, cancel a selection)
//
// ============================================================================

pub mod command_handler;
pub mod commands;
pub mod cost_bucket;
pub mod errors;
pub mod model;
pub mod total;
pub mod value_objects;

pub use command_handler::*;
pub use commands::*;
pub use cost_bucket::*;
pub use model::*;
pub use total::*;
pub use value_objects::*;
