// Main lib.rs file that exports our modules
pub mod config;
pub mod directories;
pub mod generate;
pub mod providers;
pub mod session;

// Re-export commonly used items for convenience
pub use config::Config;
pub use session::pipeline::{ChatInput, ChatOutput, ChatPipeline};
