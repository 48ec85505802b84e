// ============================================================================
// Customer Domain
// ============================================================================
//
// - Value objects (PhoneNumber, Email)
// - Errors (CustomerError)
// - Model (Customer row, CustomerForm input, NewCustomer insert)
//
// ============================================================================

pub mod errors;
pub mod model;
pub mod value_objects;

pub use errors::*;
pub use model::*;
