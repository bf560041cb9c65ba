pub mod artifacts;
pub mod command;
pub mod environment;
pub mod locker;
pub mod preflight;
pub mod selector;

// Trait-based abstractions for testability
pub mod executor;

// Re-export commonly used types and traits (used by test crate)
pub use environment::{Environment, ExecContext};
pub use executor::{CommandExecutor, RealExecutor};
