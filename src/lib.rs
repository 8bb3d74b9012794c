//! matrixnet: referral network tree model
//!
//! Layers, innermost first:
//! - `domain`: tree store, navigator and aggregator (pure, no I/O)
//! - `application`: services that load tree files and answer queries
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing, command dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
