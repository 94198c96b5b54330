pub mod ask;
pub mod chat;
pub mod config;
pub mod generate;

// Re-export all the command structs and enums
pub use ask::AskArgs;
pub use chat::ChatArgs;
pub use config::ConfigArgs;
pub use generate::{PptArgs, QuizArgs};
