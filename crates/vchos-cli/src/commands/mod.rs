//! CLI command implementations.

pub mod basis;
pub mod common;
pub mod minima;
pub mod params;
pub mod scan;
pub mod version;
