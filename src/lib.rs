pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod history;
pub mod idea;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod response;
pub mod server;
pub mod types;
