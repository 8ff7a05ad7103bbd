//! Remote side of the AG bot: the Gemini completion client, the prompt it
//! sends and the configuration it is built from.

pub mod config;
pub mod gemini_api_client;
pub mod prompt;

pub use config::{AgbotConfig, GeminiSettings, SessionSettings};
pub use gemini_api_client::GeminiCompletionClient;
pub use prompt::{SYSTEM_INSTRUCTION, build_prompt};
