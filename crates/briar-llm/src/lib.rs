pub mod client;
pub mod prompt;
pub mod provider;

pub use client::LlmClient;
pub use provider::{ProviderConfig, ProviderKind};
