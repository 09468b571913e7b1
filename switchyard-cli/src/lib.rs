//! Switchyard command-line interface.
//!
//! Wires the weight engine to a record source, sink, and version
//! registry, parses arguments, and renders the human-facing traffic
//! report. The shipped provider is a JSON state file; anything
//! implementing the `switchyard-api` traits plugs in the same way.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod report;
pub mod store;
