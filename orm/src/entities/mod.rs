pub mod loan;
pub mod config;
pub mod system;

// Re-export all entities
pub use loan::*;
pub use config::*;
pub use system::*;
