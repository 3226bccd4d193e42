//! Shared model for composite market-analysis records.

pub mod decode;
pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
