//! Sift Types
//!
//! This crate defines the value type shared across the Sift workspace. Facts in a
//! knowledge element and the test expressions inside rule conditions are both
//! expressed as [`FactValue`], so the matcher in `sift-core` and any embedding
//! application agree on a single closed value domain.

#![deny(warnings)]
#![deny(missing_docs)]

mod types;
pub use types::FactValue;
