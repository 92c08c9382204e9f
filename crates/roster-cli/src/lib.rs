//! CLI library components for the roster column mapper.

pub mod export;
pub mod logging;
pub mod sample;
