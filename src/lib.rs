pub mod core;
pub mod llm;
pub mod prompt;
pub mod search;
pub mod server;
pub mod state;
