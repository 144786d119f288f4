//! Club members and rentals.

mod types;

pub use types::*;
