#![forbid(unsafe_code)]

pub mod interior_point;

pub use interior_point::ClarabelBackend;
