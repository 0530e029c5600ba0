//! Remote data boundaries.
//!
//! - commodity price source (`prices`)
//! - hosted vision model for leaf diagnosis (`vision`)

pub mod prices;
pub mod vision;

pub use prices::*;
pub use vision::*;
