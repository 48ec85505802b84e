// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// One subdirectory per entity:
// - Value objects (validated input types)
// - Errors (field-level validation failures)
// - Model (persisted rows, raw forms, validated inserts)
//
// Orders additionally own the total calculator, the cost-bucket filter and
// the cancel command handler.
//
// This layer knows nothing about HTTP or SQL.
//
// ============================================================================

pub mod customer;
pub mod order;
pub mod product;

/// A validation failure that belongs to a single form field.
pub trait FieldError: std::fmt::Display {
    /// Name of the offending form field, as it appears in the input payload.
    fn field(&self) -> &'static str;
}

