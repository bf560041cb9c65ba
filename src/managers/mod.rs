pub mod backup;
pub mod logging;
pub mod restore;
pub mod scheduler;
