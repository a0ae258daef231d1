//! nf-core: shared foundation for netflux.
//!
//! Contains:
//! - ids (compact ids for nodes and links)
//! - numeric (Real, tolerances, float checks)
//! - table (read-only lookup tables injected into links)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod table;

pub use error::{NfError, NfResult};
pub use ids::*;
pub use numeric::*;
pub use table::LinearTable;
