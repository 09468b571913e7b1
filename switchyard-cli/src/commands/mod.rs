//! Command implementations.

pub mod traffic;
