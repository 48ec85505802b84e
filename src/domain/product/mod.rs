pub mod errors;
pub mod model;

pub use model::*;
