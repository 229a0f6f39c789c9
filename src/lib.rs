//! snapkeep: point-in-time snapshots of single files.
//!
//! The [`store`] module is the persistence layer; everything else is the
//! command-line surface built on top of it.

pub mod actions;
pub mod cli;
pub mod config;
pub mod logging;
pub mod platform;
pub mod report;
pub mod store;
pub mod util;
pub mod workspace;
