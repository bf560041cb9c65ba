//! Command tests for db-backup-manager
//!
//! These tests drive the run, list, restore and validate flows through the
//! library with a mocked command executor.

mod list;
mod run;
mod validate;
