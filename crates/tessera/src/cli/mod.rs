//! CLI command implementations.

mod display;

pub mod extract;
pub mod key;
