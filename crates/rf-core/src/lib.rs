//! rf-core: stable foundation for resflow.
//!
//! Contains:
//! - units (field unit conversions backed by uom)
//! - numeric (Real + float helpers)
//! - ids (compact IDs for network components)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{RfError, RfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
