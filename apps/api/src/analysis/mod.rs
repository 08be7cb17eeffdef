// Career analysis: profile in, four-section report out.
// All text generation goes through llm_client::ProviderChain and all search through
// search::WebSearch; nothing here talks to an HTTP API directly.

pub mod assembler;
pub mod handlers;
pub mod navigator;
pub mod normalizer;
pub mod profile;
pub mod prompts;
pub mod query_builder;
pub mod render;
pub mod report;

pub use navigator::{CareerNavigator, NavigatorOptions};
