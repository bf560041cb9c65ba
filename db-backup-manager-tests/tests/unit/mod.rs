//! Unit tests for db-backup-manager
//!
//! These tests exercise library modules in isolation, with no external tools.

mod config;
