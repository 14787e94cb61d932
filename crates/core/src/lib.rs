#![forbid(unsafe_code)]

pub mod config;
pub mod dynamics;
pub mod math;
pub mod options;
pub mod problem;
pub mod solution;
pub mod traits;

pub use config::*;
pub use dynamics::*;
pub use math::*;
pub use options::*;
pub use problem::*;
pub use solution::*;
pub use traits::*;
