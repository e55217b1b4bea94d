//! The core library of dacu, a local test harness for competitive programming
//! solutions.
//!
//! A project registers [tasks][task::Task] in its [store][store::Store], each
//! task binds a source file to a sequence of datasets. The [runner][runner]
//! compiles a task once using the [language adapter][language] of its
//! extension, runs it against each dataset and [compares][compare] the
//! produced output with the expected one.

pub mod compare;
pub mod config;
pub mod exec;
pub mod language;
pub mod runner;
pub mod stdx;
pub mod store;
pub mod task;

/// The name of this tool, used for temporary directories.
pub const TOOL_NAME: &str = "dacu";

#[cfg(test)]
pub mod _dev;
