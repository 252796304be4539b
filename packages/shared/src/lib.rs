//! Utilities shared by the greenroom binaries and tests.

pub mod logger;
pub mod time;
